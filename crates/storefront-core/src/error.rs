//! Error Types

use rust_decimal::Decimal;
use thiserror::Error;

use crate::checkout::CheckoutReport;

/// Result type alias for checkout operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Malformed or incomplete request data. Always detected before any side effect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent or blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The cart has no lines
    #[error("Cart is empty")]
    EmptyCart,

    /// A field is present but unusable
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The client-declared total matches neither the computed subtotal nor grand total
    #[error("Declared total {declared} does not match computed total {computed}")]
    TotalMismatch { declared: Decimal, computed: Decimal },
}

impl ValidationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Notification transport failure for a single message
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Network-level failure reaching the transport
    #[error("Mail transport unreachable: {0}")]
    Transport(String),

    /// The transport answered but refused the message (auth, bad recipient, ...)
    #[error("Mail rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// No answer within the configured deadline
    #[error("Mail transport timed out")]
    Timeout,

    /// No transport credentials configured
    #[error("Mail transport not configured: {0}")]
    NotConfigured(String),
}

/// Ledger read/write failure
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store exists but could not be read
    #[error("Ledger read failed: {0}")]
    Read(String),

    /// The record could not be written
    #[error("Ledger write failed: {0}")]
    Write(String),

    /// Record (de)serialization failed
    #[error("Ledger serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Outcome of a checkout that did not complete cleanly
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Rejected before any side effect
    #[error("Invalid checkout request: {0}")]
    Validation(#[from] ValidationError),

    /// The order could not be recorded; no notification was sent
    #[error("Failed to record transaction: {0}")]
    Storage(#[from] StorageError),

    /// The order was recorded but at least one notification failed
    #[error(
        "Transaction {} recorded but {} notification(s) failed",
        .report.transaction_id,
        .failures.len()
    )]
    Incomplete {
        report: CheckoutReport,
        failures: Vec<DeliveryError>,
    },
}

impl CheckoutError {
    /// Whether the caller supplied bad input
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => format!("Invalid checkout request: {e}"),
            Self::Storage(_) => "Failed to process checkout.".into(),
            Self::Incomplete { report, .. } => format!(
                "Order {} was saved but confirmation emails could not all be sent.",
                report.transaction_id
            ),
        }
    }
}
