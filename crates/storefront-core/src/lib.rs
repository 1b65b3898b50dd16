//! # storefront-core
//!
//! Order-processing core for the storefront backend: cart pricing, invoice
//! generation and the checkout pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      CheckoutService                          │
//! │  ┌─────────────┐  ┌─────────────┐  ┌──────────┐  ┌─────────┐  │
//! │  │   Quote /   │  │  Invoice    │  │  Ledger  │  │ Mailer  │  │
//! │  │   pricing   │──│  documents  │──│  (port)  │──│ (port)  │  │
//! │  └─────────────┘  └─────────────┘  └──────────┘  └─────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Mailer` and `Ledger` are traits; concrete transports and stores live in
//! `storefront-runtime`.

pub mod checkout;
pub mod error;
pub mod invoice;
pub mod ledger;
pub mod model;
pub mod notify;
pub mod pricing;
pub mod relay;

pub use checkout::{CheckoutReport, CheckoutService};
pub use error::{CheckoutError, DeliveryError, Result, StorageError, ValidationError};
pub use invoice::{Invoice, StoreProfile};
pub use ledger::{Ledger, MemoryLedger};
pub use model::{
    AddOn, CartLine, CheckoutForm, CheckoutRequest, PaymentMethod, ShippingOption,
    TransactionId, TransactionRecord,
};
pub use notify::{Ack, Mailer};
pub use pricing::Quote;
pub use relay::{BookingForm, ContactForm, RelayMessage};
