//! # storefront-runtime
//!
//! Concrete adapters for the storefront core ports.
//!
//! ## Mailers
//!
//! - **HttpMailer**: JSON mail-relay API over HTTPS (production)
//! - **LogMailer**: writes messages to the log (explicit development opt-in)
//! - **UnconfiguredMailer**: fails every send when no transport is set up
//!
//! ## Ledgers
//!
//! - **FileLedger**: append-only JSON-lines file with a single writer
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_runtime::{FileLedger, HttpMailer, MailerConfig};
//!
//! let mailer = HttpMailer::from_config(MailerConfig::from_env()?)?;
//! let ledger = FileLedger::open("transactions.jsonl").await?;
//! ```

pub mod ledger;
pub mod mailer;

pub use ledger::FileLedger;
pub use mailer::{HttpMailer, LogMailer, MailerConfig, UnconfiguredMailer};

// Re-export core types for convenience
pub use storefront_core::{Ack, DeliveryError, Ledger, Mailer, StorageError, TransactionRecord};
