//! Pricing
//!
//! Turns a validated checkout request into per-line amounts and totals.
//! Each line is rounded to cents before summation so the subtotal never
//! depends on accumulated sub-cent remainders.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::model::{CartLine, CheckoutRequest, ShippingOption};

/// Flat courier fee in the store currency
pub const COURIER_FEE: Decimal = dec!(120);

/// Round a monetary amount to cents
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Shipping fee for a delivery choice
pub const fn shipping_fee(option: ShippingOption) -> Decimal {
    match option {
        ShippingOption::Courier => COURIER_FEE,
        ShippingOption::Pickup => Decimal::ZERO,
    }
}

/// Extended price of one cart line (unit price × quantity, in cents)
pub fn line_total(line: &CartLine) -> Decimal {
    round_money(line.price * Decimal::from(line.quantity))
}

/// Computed amounts for one checkout
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub line_totals: Vec<Decimal>,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub grand_total: Decimal,
}

impl Quote {
    pub fn compute(request: &CheckoutRequest) -> Self {
        let line_totals: Vec<Decimal> = request.cart.iter().map(line_total).collect();
        let subtotal: Decimal = line_totals.iter().copied().sum();
        let shipping_fee = shipping_fee(request.shipping_option);

        Self {
            line_totals,
            subtotal,
            shipping_fee,
            grand_total: subtotal + shipping_fee,
        }
    }

    /// Whether a client-declared total agrees with this quote.
    ///
    /// Accepts either the grand total or the subtotal, to the cent.
    pub fn accepts_declared(&self, declared: Decimal) -> bool {
        let declared = round_money(declared);
        declared == self.grand_total || declared == self.subtotal
    }
}
