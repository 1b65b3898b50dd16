//! Domain Models
//!
//! Cart, checkout request and transaction record types.
//! Uses `rust_decimal` for all monetary values.

use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::pricing::{COURIER_FEE, round_money};

/// Optional extra on a cart line. Older frontends send a flag, newer ones a choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddOn {
    Flag(bool),
    Choice(String),
}

impl AddOn {
    /// Human-readable label, or `None` when the add-on was not chosen
    pub fn label(&self, flag_label: &str) -> Option<String> {
        match self {
            Self::Flag(true) => Some(flag_label.to_string()),
            Self::Flag(false) => None,
            Self::Choice(choice) => {
                let choice = choice.trim();
                if choice.is_empty() || choice.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(choice.to_string())
                }
            }
        }
    }
}

/// One purchased item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub title: String,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_art: Option<AddOn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stand: Option<AddOn>,
}

impl CartLine {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::invalid("cart", "item title is empty"));
        }
        if self.quantity == 0 {
            return Err(ValidationError::invalid(
                "cart",
                format!("quantity for '{}' must be positive", self.title),
            ));
        }
        if self.price.is_sign_negative() {
            return Err(ValidationError::invalid(
                "cart",
                format!("price for '{}' must not be negative", self.title),
            ));
        }
        Ok(())
    }
}

/// Delivery choice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingOption {
    Pickup,
    Courier,
}

impl ShippingOption {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Courier => "courier",
        }
    }

    /// Wording used in invoices
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Pickup => "Collection (pickup)",
            Self::Courier => "Courier delivery",
        }
    }
}

impl FromStr for ShippingOption {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pickup" | "collect" | "collection" => Ok(Self::Pickup),
            "courier" | "delivery" => Ok(Self::Courier),
            other => Err(ValidationError::invalid(
                "shippingOption",
                format!("unknown option '{other}'"),
            )),
        }
    }
}

/// How the customer pays
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Gateway,
    OfflineTransfer,
}

impl PaymentMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::OfflineTransfer => "offline-transfer",
        }
    }

    /// Wording used in invoices
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Gateway => "Card payment (online)",
            Self::OfflineTransfer => "Bank transfer (EFT)",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gateway" | "card" | "paystack" => Ok(Self::Gateway),
            "offline-transfer" | "eft" | "bank-transfer" => Ok(Self::OfflineTransfer),
            other => Err(ValidationError::invalid(
                "paymentMethod",
                format!("unknown method '{other}'"),
            )),
        }
    }
}

/// Checkout body as it arrives on the wire. Every field is optional so that
/// absent fields surface as validation errors rather than parse errors.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub email: Option<String>,
    pub cart: Option<Vec<CartLine>>,
    pub total: Option<Decimal>,
    pub shipping_address: Option<String>,
    #[serde(alias = "shippingMethod")]
    pub shipping_option: Option<String>,
    pub payment_method: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// A validated checkout request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub email: String,
    pub cart: Vec<CartLine>,
    pub declared_total: Decimal,
    pub shipping_address: String,
    pub shipping_option: ShippingOption,
    pub payment_method: PaymentMethod,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Largest possible grand total, or `None` if pricing the cart would overflow
fn checked_total(cart: &[CartLine]) -> Option<Decimal> {
    let subtotal = cart.iter().try_fold(Decimal::ZERO, |acc, line| {
        let extended = line.price.checked_mul(Decimal::from(line.quantity))?;
        acc.checked_add(round_money(extended))
    })?;
    subtotal.checked_add(COURIER_FEE)
}

impl TryFrom<CheckoutForm> for CheckoutRequest {
    type Error = ValidationError;

    fn try_from(form: CheckoutForm) -> Result<Self, Self::Error> {
        let email = required(form.email, "email")?;
        let cart = form.cart.ok_or(ValidationError::MissingField("cart"))?;
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        for line in &cart {
            line.validate()?;
        }
        if checked_total(&cart).is_none() {
            return Err(ValidationError::invalid("cart", "order amount is too large"));
        }

        let declared_total = form.total.ok_or(ValidationError::MissingField("total"))?;
        if declared_total <= Decimal::ZERO {
            return Err(ValidationError::invalid("total", "must be positive"));
        }

        let shipping_address = required(form.shipping_address, "shippingAddress")?;
        let shipping_option = required(form.shipping_option, "shippingOption")?.parse()?;
        let payment_method = required(form.payment_method, "paymentMethod")?.parse()?;

        Ok(Self {
            email,
            cart,
            declared_total,
            shipping_address,
            shipping_option,
            payment_method,
            name: optional(form.name),
            phone: optional(form.phone),
            notes: optional(form.notes),
        })
    }
}

/// Transaction identifier (formatted: TXN-<unix millis>)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub const PREFIX: &'static str = "TXN-";

    pub fn from_millis(millis: i64) -> Self {
        Self(format!("{}{millis}", Self::PREFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out time-based transaction ids, never the same millisecond twice.
///
/// Two checkouts in the same millisecond get consecutive values instead of colliding.
#[derive(Debug, Default)]
pub struct TransactionIdGenerator {
    last: AtomicI64,
}

impl TransactionIdGenerator {
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    pub fn next_id(&self) -> TransactionId {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return TransactionId::from_millis(candidate),
                Err(actual) => prev = actual,
            }
        }
    }
}

/// A completed checkout as stored in the ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub transaction_id: TransactionId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub cart: Vec<CartLine>,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    /// Grand total (subtotal + shipping fee)
    pub total: Decimal,
    pub shipping_address: String,
    pub shipping_option: ShippingOption,
    pub payment_method: PaymentMethod,
    pub date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn form() -> CheckoutForm {
        serde_json::from_value(serde_json::json!({
            "email": "a@b.com",
            "cart": [{"title": "Vase", "quantity": 2, "price": 50.00, "color": "Red"}],
            "total": 220,
            "shippingAddress": "1 Main St",
            "shippingMethod": "courier",
            "paymentMethod": "gateway"
        }))
        .unwrap()
    }

    #[test]
    fn test_form_to_request() {
        let request = CheckoutRequest::try_from(form()).unwrap();
        assert_eq!(request.shipping_option, ShippingOption::Courier);
        assert_eq!(request.payment_method, PaymentMethod::Gateway);
        assert_eq!(request.cart[0].price, dec!(50));
        assert_eq!(request.declared_total, dec!(220));
    }

    #[test]
    fn test_missing_shipping_address() {
        let mut form = form();
        form.shipping_address = Some("   ".into());
        assert_eq!(
            CheckoutRequest::try_from(form),
            Err(ValidationError::MissingField("shippingAddress"))
        );
    }

    #[test]
    fn test_bad_cart_lines() {
        let mut empty = form();
        empty.cart = Some(Vec::new());
        assert_eq!(CheckoutRequest::try_from(empty), Err(ValidationError::EmptyCart));

        let mut zero = form();
        zero.cart.as_mut().unwrap()[0].quantity = 0;
        assert!(CheckoutRequest::try_from(zero).is_err());

        let mut negative = form();
        negative.cart.as_mut().unwrap()[0].price = dec!(-1);
        assert!(CheckoutRequest::try_from(negative).is_err());
    }

    #[test]
    fn test_cart_too_large_to_price() {
        let mut doubled = form();
        doubled.cart.as_mut().unwrap()[0].price = Decimal::MAX;
        doubled.cart.as_mut().unwrap()[0].quantity = 2;
        assert!(matches!(
            CheckoutRequest::try_from(doubled),
            Err(ValidationError::Invalid { field: "cart", .. })
        ));

        // fits on its own, overflows once the courier fee is added
        let mut single = form();
        single.cart.as_mut().unwrap()[0].price = Decimal::MAX;
        single.cart.as_mut().unwrap()[0].quantity = 1;
        assert!(matches!(
            CheckoutRequest::try_from(single),
            Err(ValidationError::Invalid { field: "cart", .. })
        ));
    }

    #[test]
    fn test_unknown_shipping_option() {
        let mut form = form();
        form.shipping_option = Some("drone".into());
        assert!(matches!(
            CheckoutRequest::try_from(form),
            Err(ValidationError::Invalid { field: "shippingOption", .. })
        ));
    }

    #[test]
    fn test_add_on_labels() {
        assert_eq!(AddOn::Flag(true).label("Line Art").as_deref(), Some("Line Art"));
        assert_eq!(AddOn::Flag(false).label("Line Art"), None);
        assert_eq!(AddOn::Choice("None".into()).label("Stand"), None);
        assert_eq!(AddOn::Choice("Oak".into()).label("Stand").as_deref(), Some("Oak"));
    }

    #[test]
    fn test_id_generator_is_strictly_increasing() {
        let ids = TransactionIdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("TXN-"));
        let digits = |id: &TransactionId| id.as_str()[4..].parse::<i64>().unwrap();
        assert!(digits(&b) > digits(&a));
    }
}
