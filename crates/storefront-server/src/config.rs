//! Application Configuration
//!
//! Read once from the environment at startup and handed to the components
//! that need it.

use std::path::PathBuf;

use storefront_core::StoreProfile;
use storefront_payments::GatewayConfig;
use storefront_runtime::MailerConfig;

pub const DEFAULT_PORT: u16 = 10000;

/// How outgoing mail is delivered
#[derive(Clone, Debug)]
pub enum MailSetup {
    /// Send through the HTTP mail relay
    Relay(MailerConfig),

    /// Log messages without sending (`MAIL_TRANSPORT=log`)
    Log,

    /// Nothing configured; every send fails with the given reason
    Disabled(String),
}

impl MailSetup {
    /// Relay when configured, log-only on explicit opt-in, otherwise disabled
    pub fn from_env() -> Self {
        let transport = std::env::var("MAIL_TRANSPORT").unwrap_or_default();
        if transport.trim().eq_ignore_ascii_case("log") {
            tracing::warn!("⚠ MAIL_TRANSPORT=log - emails will only be logged, not sent");
            return Self::Log;
        }

        match MailerConfig::from_env() {
            Ok(config) => Self::Relay(config),
            Err(e) => {
                tracing::error!("✗ {} - email delivery will fail until configured", e);
                Self::Disabled(e.to_string())
            }
        }
    }
}

/// Everything the server needs to start
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Socket address to listen on
    pub bind_addr: String,

    /// Store identity and admin mailbox
    pub store: StoreProfile,

    /// Ledger file location
    pub ledger_path: PathBuf,

    /// Mail delivery
    pub mail: MailSetup,

    /// Payment gateway (None = payment endpoints disabled)
    pub gateway: Option<GatewayConfig>,
}

impl AppConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let host = std::env::var("BIND_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let mut store = StoreProfile::default();
        if let Ok(name) = std::env::var("STORE_NAME") {
            store.name = name;
        }
        if let Ok(admin) = std::env::var("EMAIL_USER") {
            store.admin_email = admin;
        }

        let ledger_path = std::env::var("LEDGER_PATH")
            .map_or_else(|_| PathBuf::from("transactions.jsonl"), PathBuf::from);

        let gateway = match GatewayConfig::from_env() {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("⚠ {} - payment endpoints disabled", e);
                None
            }
        };

        Self {
            bind_addr: format!("{host}:{port}"),
            store,
            ledger_path,
            mail: MailSetup::from_env(),
            gateway,
        }
    }
}
