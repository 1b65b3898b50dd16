//! # storefront-payments
//!
//! Payment gateway coordination for the storefront.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐  initialize   ┌─────────────────┐  redirect   ┌─────────────┐
//! │  Storefront │──────────────▶│  Gateway hosted │────────────▶│  Storefront │
//! │  (checkout) │  reference    │  payment page   │  reference  │  (verify)   │
//! └─────────────┘               └─────────────────┘             └─────────────┘
//! ```
//!
//! The client application calls `initialize` before checkout and `verify`
//! afterwards with the same reference. Both calls are single attempts; the
//! gateway's verification payload is passed through unmodified.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_payments::{GatewayClient, GatewayConfig};
//! use rust_decimal_macros::dec;
//!
//! let client = GatewayClient::new(GatewayConfig::from_env()?)?;
//!
//! // amount in major units; the gateway receives 25000
//! let session = client.initialize("user@example.com", dec!(250)).await?;
//!
//! // Redirect user to: session.authorization_url
//! let outcome = client.verify(&session.reference).await?;
//! ```

mod error;
mod gateway;

pub use error::{GatewayError, Result};
pub use gateway::{
    GatewayClient, GatewayConfig, GatewaySession, VerificationOutcome, to_minor_units,
};
