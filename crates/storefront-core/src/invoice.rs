//! Invoice Documents
//!
//! Plain-text customer invoice and admin order notice. Both share the
//! line-item block and totals block; the admin notice adds customer details.

use std::fmt::Write as _;

use rust_decimal::Decimal;

use crate::model::{CartLine, CheckoutRequest, TransactionId};
use crate::pricing::{Quote, line_total};

/// Store identity used in documents and subjects
#[derive(Clone, Debug)]
pub struct StoreProfile {
    /// Store name shown in greetings and subjects
    pub name: String,

    /// Currency symbol prefixed to amounts
    pub currency_symbol: String,

    /// Mailbox receiving order notices
    pub admin_email: String,
}

impl Default for StoreProfile {
    fn default() -> Self {
        Self {
            name: "Horti Couture".into(),
            currency_symbol: "R".into(),
            admin_email: String::new(),
        }
    }
}

impl StoreProfile {
    pub fn money(&self, amount: Decimal) -> String {
        format!("{}{:.2}", self.currency_symbol, amount)
    }

    pub fn customer_subject(&self) -> String {
        format!("Your Order Confirmation - {}", self.name)
    }

    pub fn admin_subject(&self, transaction_id: &TransactionId) -> String {
        format!("New Order Received ({transaction_id})")
    }
}

/// Totals plus the two rendered documents
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invoice {
    pub quote: Quote,
    pub customer_document: String,
    pub admin_document: String,
}

impl Invoice {
    /// Price the request and render both documents. Pure; identical inputs give identical output.
    pub fn generate(
        request: &CheckoutRequest,
        transaction_id: &TransactionId,
        store: &StoreProfile,
    ) -> Self {
        let quote = Quote::compute(request);
        Self::render(request, quote, transaction_id, store)
    }

    pub fn render(
        request: &CheckoutRequest,
        quote: Quote,
        transaction_id: &TransactionId,
        store: &StoreProfile,
    ) -> Self {
        let body = order_body(request, &quote, transaction_id, store);
        let greeting = request.name.as_deref().unwrap_or("there");

        let customer_document = format!(
            "Hello {greeting},\n\n\
             Thank you for your order! Here is your order summary:\n\n\
             {body}\n\
             Best regards,\n\
             {} Team\n",
            store.name
        );

        let mut customer = format!("Customer: {}\n", request.email);
        if let Some(name) = &request.name {
            let _ = writeln!(customer, "Name: {name}");
        }
        if let Some(notes) = &request.notes {
            let _ = writeln!(customer, "Notes: {notes}");
        }
        let admin_document = format!("New order received.\n\n{customer}\n{body}");

        Self {
            quote,
            customer_document,
            admin_document,
        }
    }
}

/// Description of one cart line, e.g. `2 x Vase (Line Art) - Color: Red - Size: M`
pub fn describe_line(line: &CartLine) -> String {
    let extras: Vec<String> = [
        line.line_art.as_ref().and_then(|a| a.label("Line Art")),
        line.stand.as_ref().and_then(|a| a.label("Wooden Stand")),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut text = format!("{} x {}", line.quantity, line.title);
    if !extras.is_empty() {
        let _ = write!(text, " ({})", extras.join(", "));
    }
    let color = line
        .color
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("N/A");
    let _ = write!(text, " - Color: {color}");
    if let Some(size) = line.size.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = write!(text, " - Size: {size}");
    }
    text
}

fn order_body(
    request: &CheckoutRequest,
    quote: &Quote,
    transaction_id: &TransactionId,
    store: &StoreProfile,
) -> String {
    let mut out = String::new();
    for line in &request.cart {
        let _ = writeln!(
            out,
            "- {} - {}",
            describe_line(line),
            store.money(line_total(line))
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Shipping Method: {}", request.shipping_option.describe());
    let _ = writeln!(out, "Payment Method: {}", request.payment_method.describe());
    let _ = writeln!(out, "Shipping Address: {}", request.shipping_address);
    if let Some(phone) = &request.phone {
        let _ = writeln!(out, "Contact: {phone}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Subtotal: {}", store.money(quote.subtotal));
    let _ = writeln!(out, "Shipping: {}", store.money(quote.shipping_fee));
    let _ = writeln!(out, "Total: {}", store.money(quote.grand_total));
    let _ = writeln!(out, "Transaction ID: {transaction_id}");
    out
}
