//! Schema Error Types

use thiserror::Error;

/// Result type alias for order pipeline operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Structural problems detected locally, before anything goes over the wire
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Order has no `purchase_units` key
    #[error("Order is missing purchase_units")]
    MissingPurchaseUnits,

    /// `purchase_units` is present but empty
    #[error("Order has no purchase units")]
    EmptyPurchaseUnits,

    /// First purchase unit has no `items` key
    #[error("Purchase unit is missing items")]
    MissingItems,

    #[error("Item {index} is missing name")]
    MissingItemName { index: usize },

    #[error("Item {index} is missing quantity")]
    MissingItemQuantity { index: usize },

    #[error("Item {index} is missing code")]
    MissingItemCode { index: usize },

    /// Item returned by the backend without its issued keys
    #[error("Item {index} is missing licenses")]
    MissingItemLicenses { index: usize },

    /// Backend issued a different number of keys than the item's quantity
    #[error("Item {index} has {licenses} licenses for quantity {quantity}")]
    LicenseCountMismatch {
        index: usize,
        quantity: u32,
        licenses: usize,
    },

    /// SKU value that does not decode to `code;key`
    #[error("Malformed SKU: {0}")]
    MalformedSku(String),
}

impl SchemaError {
    /// Name of the offending field, if the error is about a single missing field
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SchemaError::MissingPurchaseUnits | SchemaError::EmptyPurchaseUnits => {
                Some("purchase_units")
            }
            SchemaError::MissingItems => Some("items"),
            SchemaError::MissingItemName { .. } => Some("name"),
            SchemaError::MissingItemQuantity { .. } => Some("quantity"),
            SchemaError::MissingItemCode { .. } => Some("code"),
            SchemaError::MissingItemLicenses { .. } | SchemaError::LicenseCountMismatch { .. } => {
                Some("licenses")
            }
            SchemaError::MalformedSku(_) => Some("sku"),
        }
    }
}
