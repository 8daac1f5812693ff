//! # bridge-core
//!
//! Order pipeline between the payment provider's order schema and the
//! license backend's schema.
//!
//! ## Pipeline
//!
//! ```text
//! products ──▶ OrderBuilder ──▶ Order ──▶ OrderValidator ──▶ (gateway)
//!                  │                                             │
//!            MoneyFormatter                  direct: LicenseBundle
//!                                            webhook: LicenseRepacker ──▶ Order
//! ```
//!
//! The provider allows aggregated line items of any quantity. The backend
//! issues one key per unit, so in webhook mode every item is split into
//! quantity-1 items whose `sku` carries `base64(code;key)`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bridge_core::{OrderBuilder, OrderValidator, Product};
//!
//! let order = OrderBuilder::new("USD").build("cart-42", vec![
//!     Product::new("Pro license", 2, 29.0, "PRO"),
//! ]);
//! OrderValidator::validate(&order)?;
//! ```

pub mod builder;
pub mod error;
pub mod model;
pub mod money;
pub mod repack;
pub mod validator;

pub use builder::OrderBuilder;
pub use error::{Result, SchemaError};
pub use model::{
    Amount, Breakdown, LicenseBundle, LicenseEntry, LineItem, Money, Order, Price, Product,
    PurchaseUnit,
};
pub use money::MoneyFormatter;
pub use repack::{LicenseRepacker, LicenseSku, REPACK_DROPPED_FIELDS};
pub use validator::OrderValidator;
