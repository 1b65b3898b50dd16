//! Application State

use std::sync::Arc;

use storefront_core::{CheckoutService, Mailer};
use storefront_payments::GatewayClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Checkout pipeline (owns the ledger)
    pub checkout: Arc<CheckoutService>,

    /// Mail transport for contact and booking relays
    pub mailer: Arc<dyn Mailer>,

    /// Whether `mailer` actually delivers mail
    pub mail_configured: bool,

    /// Payment gateway client (optional - None if not configured)
    pub gateway: Option<Arc<GatewayClient>>,
}

impl AppState {
    /// Store mailbox receiving relays and order notices
    pub fn admin_email(&self) -> &str {
        &self.checkout.store().admin_email
    }
}
