//! Storefront HTTP Server
//!
//! Axum-based server for checkout, payment gateway proxying and the
//! contact/booking relays.

mod config;
mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_core::{CheckoutService, Mailer};
use storefront_payments::GatewayClient;
use storefront_runtime::{FileLedger, HttpMailer, LogMailer, UnconfiguredMailer};

use crate::config::{AppConfig, MailSetup};
use crate::handlers::{
    book_service, checkout, health_check, initialize_payment, send_email, verify_payment,
};
use crate::state::AppState;

/// Build the router with all routes and middleware
fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // Relays
        .route("/send-email", post(send_email))
        .route("/book-service", post(book_service))
        // Payments
        .route("/initialize-payment", post(initialize_payment))
        .route("/verify-payment/{reference}", get(verify_payment))
        // Orders
        .route("/checkout", post(checkout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let mailer: Arc<dyn Mailer> = match &config.mail {
        MailSetup::Relay(mail) => {
            tracing::info!("✓ Mail relay configured (sender: {})", mail.from);
            Arc::new(HttpMailer::from_config(mail.clone())?)
        }
        MailSetup::Log => Arc::new(LogMailer),
        MailSetup::Disabled(reason) => Arc::new(UnconfiguredMailer::new(reason.clone())),
    };
    let mail_configured = matches!(config.mail, MailSetup::Relay(_));

    let ledger = Arc::new(FileLedger::open(&config.ledger_path).await?);
    tracing::info!("✓ Ledger at {}", config.ledger_path.display());

    let gateway = match &config.gateway {
        Some(gw) => {
            tracing::info!("✓ Payment gateway configured ({})", gw.currency);
            Some(Arc::new(GatewayClient::new(gw.clone())?))
        }
        None => None,
    };

    if config.store.admin_email.is_empty() {
        tracing::warn!("⚠ EMAIL_USER not set - order notices have no recipient");
    }

    let checkout = CheckoutService::new(mailer.clone(), ledger, config.store.clone());

    Ok(AppState {
        checkout: Arc::new(checkout),
        mailer,
        mail_configured,
        gateway,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    let state = build_state(&config).await?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 {} backend running on http://{}", config.store.name, config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                   - Health check");
    tracing::info!("  POST /send-email               - Contact form");
    tracing::info!("  POST /book-service             - Booking request");
    tracing::info!("  POST /initialize-payment       - Start gateway payment");
    tracing::info!("  GET  /verify-payment/:reference - Verify gateway payment");
    tracing::info!("  POST /checkout                 - Place order & send invoice");

    axum::serve(listener, app).await?;

    Ok(())
}
