//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Payment gateway errors
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Gateway unreachable
    #[error("Gateway request failed: {0}")]
    Http(String),

    /// No answer within the configured deadline
    #[error("Gateway request timed out")]
    Timeout,

    /// Gateway answered with a non-success status
    #[error("Gateway rejected request ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },

    /// Gateway answered with a body we could not use
    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    /// Amount cannot be charged
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Transaction reference unusable
    #[error("Invalid transaction reference: {0}")]
    InvalidReference(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Get user-friendly message; the gateway's own message when it sent one
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            Self::InvalidAmount(reason) => format!("Invalid amount: {reason}"),
            _ => fallback.to_string(),
        }
    }

    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err.to_string())
        }
    }
}
