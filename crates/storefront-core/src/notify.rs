//! Notification Port
//!
//! Outbound message delivery abstraction. Implement this for each mail
//! transport; the checkout pipeline only sees this trait.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::DeliveryError;

/// Transport acknowledgement for an accepted message
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ack {
    /// Transport-assigned message id, when the transport returns one
    pub message_id: Option<String>,
}

impl Ack {
    pub const fn accepted() -> Self {
        Self { message_id: None }
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            message_id: Some(id.into()),
        }
    }
}

/// Mail transport trait (Strategy pattern)
///
/// One attempt per call. Retry policy, if any, belongs to the caller.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a plain-text message to one recipient
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<Ack, DeliveryError>;

    /// Transport name, for logs
    fn name(&self) -> &str;
}
