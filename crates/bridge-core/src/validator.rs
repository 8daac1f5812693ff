//! Order Validation
//!
//! Structural check against the fields the license backend requires.
//! Only key presence is checked, never types or value ranges.

use crate::error::{Result, SchemaError};
use crate::model::{LineItem, Order};

pub struct OrderValidator;

impl OrderValidator {
    /// Reject orders the backend cannot issue licenses for
    pub fn validate(order: &Order) -> Result<()> {
        let units = order
            .purchase_units
            .as_ref()
            .ok_or(SchemaError::MissingPurchaseUnits)?;
        let unit = units.first().ok_or(SchemaError::EmptyPurchaseUnits)?;
        let items = unit.items.as_ref().ok_or(SchemaError::MissingItems)?;

        items
            .iter()
            .enumerate()
            .try_for_each(|(index, item)| Self::validate_item(index, item))
    }

    fn validate_item(index: usize, item: &LineItem) -> Result<()> {
        if item.name.is_none() {
            return Err(SchemaError::MissingItemName { index });
        }
        if item.quantity.is_none() {
            return Err(SchemaError::MissingItemQuantity { index });
        }
        if item.code.is_none() {
            return Err(SchemaError::MissingItemCode { index });
        }
        Ok(())
    }
}
