//! Checkout Pipeline
//!
//! Sequences one checkout: validate, price, identify, persist, notify the
//! customer, notify the store.
//!
//! ```text
//! form ──▶ validate ──▶ price ──▶ id ──▶ ledger.append ──▶ mail customer
//!             │                              │         └──▶ mail admin
//!             ▼                              ▼
//!        Validation                      Storage          Incomplete
//!      (no side effects)            (nothing sent)     (saved, mail failed)
//! ```
//!
//! The record is written before any message goes out, so a confirmation
//! email never refers to an order that is not on record. Once the record
//! exists both messages are attempted; a failed customer message must not
//! hide the order from the store.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::error::{CheckoutError, DeliveryError, Result, ValidationError};
use crate::invoice::{Invoice, StoreProfile};
use crate::ledger::Ledger;
use crate::model::{
    CheckoutForm, CheckoutRequest, TransactionId, TransactionIdGenerator, TransactionRecord,
};
use crate::notify::Mailer;
use crate::pricing::Quote;

/// Which steps of a checkout took effect
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReport {
    pub transaction_id: TransactionId,
    pub quote: Quote,
    pub persisted: bool,
    pub customer_notified: bool,
    pub admin_notified: bool,
}

impl CheckoutReport {
    pub const fn is_complete(&self) -> bool {
        self.persisted && self.customer_notified && self.admin_notified
    }
}

/// Checkout orchestrator
pub struct CheckoutService {
    mailer: Arc<dyn Mailer>,
    ledger: Arc<dyn Ledger>,
    store: StoreProfile,
    ids: TransactionIdGenerator,
}

impl CheckoutService {
    pub fn new(mailer: Arc<dyn Mailer>, ledger: Arc<dyn Ledger>, store: StoreProfile) -> Self {
        Self {
            mailer,
            ledger,
            store,
            ids: TransactionIdGenerator::new(),
        }
    }

    pub const fn store(&self) -> &StoreProfile {
        &self.store
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    /// Validate a wire form and run the full pipeline
    pub async fn process(&self, form: CheckoutForm) -> Result<CheckoutReport> {
        let request = CheckoutRequest::try_from(form)?;
        self.checkout(&request).await
    }

    /// Run the pipeline for an already-validated request
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutReport> {
        let quote = Quote::compute(request);
        if !quote.accepts_declared(request.declared_total) {
            return Err(ValidationError::TotalMismatch {
                declared: request.declared_total,
                computed: quote.grand_total,
            }
            .into());
        }

        let transaction_id = self.ids.next_id();
        let invoice = Invoice::render(request, quote, &transaction_id, &self.store);

        let record = TransactionRecord {
            transaction_id: transaction_id.clone(),
            email: request.email.clone(),
            name: request.name.clone(),
            phone: request.phone.clone(),
            cart: request.cart.clone(),
            subtotal: invoice.quote.subtotal,
            shipping_fee: invoice.quote.shipping_fee,
            total: invoice.quote.grand_total,
            shipping_address: request.shipping_address.clone(),
            shipping_option: request.shipping_option,
            payment_method: request.payment_method,
            date: Utc::now(),
        };

        if let Err(e) = self.ledger.append(&record).await {
            tracing::error!(
                transaction_id = %transaction_id,
                error = %e,
                "Failed to record transaction"
            );
            return Err(CheckoutError::Storage(e));
        }
        tracing::info!(
            transaction_id = %transaction_id,
            total = %record.total,
            lines = record.cart.len(),
            "Recorded transaction"
        );

        let mut failures: Vec<DeliveryError> = Vec::new();

        let customer_notified = self
            .notify(
                &request.email,
                &self.store.customer_subject(),
                &invoice.customer_document,
                &transaction_id,
                &mut failures,
            )
            .await;

        let admin_notified = self
            .notify(
                &self.store.admin_email,
                &self.store.admin_subject(&transaction_id),
                &invoice.admin_document,
                &transaction_id,
                &mut failures,
            )
            .await;

        let report = CheckoutReport {
            transaction_id,
            quote: invoice.quote,
            persisted: true,
            customer_notified,
            admin_notified,
        };

        if failures.is_empty() {
            tracing::info!(transaction_id = %report.transaction_id, "Invoice & order notice sent");
            Ok(report)
        } else {
            Err(CheckoutError::Incomplete { report, failures })
        }
    }

    async fn notify(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
        transaction_id: &TransactionId,
        failures: &mut Vec<DeliveryError>,
    ) -> bool {
        match self.mailer.send(recipient, subject, body).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    transaction_id = %transaction_id,
                    recipient,
                    mailer = self.mailer.name(),
                    error = %e,
                    "Notification failed"
                );
                failures.push(e);
                false
            }
        }
    }
}
