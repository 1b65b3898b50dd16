//! HTTP Handlers

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use storefront_core::{
    BookingForm, CheckoutError, CheckoutForm, ContactForm, RelayMessage, TransactionId,
};
use storefront_payments::{GatewayClient, GatewayError};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub mail_configured: bool,
    pub payments_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub message: String,
    pub transaction_id: TransactionId,
}

/// Checkout that was recorded but not fully notified
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompleteCheckoutResponse {
    pub error: String,
    pub code: String,
    pub transaction_id: TransactionId,
    pub persisted: bool,
    pub customer_notified: bool,
    pub admin_notified: bool,
}

#[derive(Debug, Deserialize)]
pub struct InitializePaymentRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn bad_body(rejection: &JsonRejection) -> ApiError {
    tracing::debug!("Rejected request body: {}", rejection.body_text());
    api_error(StatusCode::BAD_REQUEST, "INVALID_BODY", rejection.body_text())
}

fn gateway(state: &AppState) -> Result<&GatewayClient, ApiError> {
    state.gateway.as_deref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "PAYMENTS_DISABLED",
            "Payments not configured",
        )
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        mail_configured: state.mail_configured,
        payments_configured: state.gateway.is_some(),
    })
}

async fn relay(
    state: &AppState,
    message: RelayMessage,
    kind: &str,
    failure: &str,
) -> Result<(), ApiError> {
    match state
        .mailer
        .send(state.admin_email(), &message.subject, &message.body)
        .await
    {
        Ok(_) => {
            tracing::info!("✓ {} email sent", kind);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Error sending {} email: {}", kind, e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "MAIL_FAILED", failure))
        }
    }
}

/// Contact form relay
pub async fn send_email(
    State(state): State<AppState>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(form) = payload.map_err(|e| bad_body(&e))?;
    let message = form
        .to_message()
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "VALIDATION", "All fields are required."))?;

    relay(&state, message, "contact", "Failed to send email").await?;

    Ok(Json(MessageResponse {
        message: "Email sent successfully!".into(),
    }))
}

/// Booking request relay
pub async fn book_service(
    State(state): State<AppState>,
    payload: Result<Json<BookingForm>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(form) = payload.map_err(|e| bad_body(&e))?;
    let message = form.to_message().map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION",
            "All required fields must be filled.",
        )
    })?;

    relay(&state, message, "booking", "Failed to send booking request.").await?;

    Ok(Json(MessageResponse {
        message: "Booking request sent successfully!".into(),
    }))
}

/// Start a gateway payment session; returns the gateway's body as received
pub async fn initialize_payment(
    State(state): State<AppState>,
    payload: Result<Json<InitializePaymentRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) = payload.map_err(|e| bad_body(&e))?;
    let gateway = gateway(&state)?;

    let email = payload.email.filter(|e| !e.trim().is_empty());
    let (Some(email), Some(amount)) = (email, payload.amount) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION",
            "Email and amount are required.",
        ));
    };

    match gateway.initialize(&email, amount).await {
        Ok(session) => Ok(Json(session.raw)),
        Err(e @ GatewayError::InvalidAmount(_)) => Err(api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_AMOUNT",
            e.user_message("Invalid amount."),
        )),
        Err(e) => {
            tracing::error!("Error initializing payment: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "PAYMENT_INIT_FAILED",
                e.user_message("Payment initialization failed."),
            ))
        }
    }
}

/// Verify a gateway transaction; returns the gateway's body as received
pub async fn verify_payment(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let gateway = gateway(&state)?;

    let outcome = gateway.verify(&reference).await.map_err(|e| {
        tracing::error!(reference = %reference, "Error verifying payment: {}", e);
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "VERIFY_FAILED",
            e.user_message("Verification failed."),
        )
    })?;

    Ok(Json(outcome.raw))
}

/// Checkout: record the order and send invoice + order notice
pub async fn checkout(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutForm>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, Response> {
    let Json(form) = payload.map_err(|e| bad_body(&e).into_response())?;

    match state.checkout.process(form).await {
        Ok(report) => Ok(Json(CheckoutResponse {
            message: "Invoice sent!".into(),
            transaction_id: report.transaction_id,
        })),
        Err(e @ CheckoutError::Validation(_)) => {
            tracing::warn!("Invalid checkout request: {}", e);
            Err(api_error(StatusCode::BAD_REQUEST, "VALIDATION", e.user_message()).into_response())
        }
        Err(e @ CheckoutError::Storage(_)) => {
            tracing::error!("Error processing checkout: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "CHECKOUT_FAILED",
                e.user_message(),
            )
            .into_response())
        }
        Err(ref e @ CheckoutError::Incomplete { ref report, .. }) => {
            tracing::error!("Checkout incomplete: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(IncompleteCheckoutResponse {
                    error: e.user_message(),
                    code: "CHECKOUT_INCOMPLETE".into(),
                    transaction_id: report.transaction_id.clone(),
                    persisted: report.persisted,
                    customer_notified: report.customer_notified,
                    admin_notified: report.admin_notified,
                }),
            )
                .into_response())
        }
    }
}
