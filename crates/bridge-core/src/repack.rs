//! License Repacking
//!
//! Webhook-mode transformation. The backend hands back the order with a
//! `licenses` array on each item; the provider only carries one key per
//! line item, so every item of quantity N becomes N items of quantity 1
//! whose `sku` encodes `code;key`.

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::model::{LineItem, Order};

/// Fields consumed by repacking and never copied onto expanded items
pub const REPACK_DROPPED_FIELDS: &[&str] = &["code", "licenses"];

/// Separator between code and key inside a decoded SKU
pub const SKU_SEPARATOR: char = ';';

/// Reversible `base64(code;key)` encoding carried in the SKU field
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LicenseSku {
    pub code: String,
    pub license: String,
}

impl LicenseSku {
    pub fn new(code: impl Into<String>, license: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            license: license.into(),
        }
    }

    /// Encode a code/key pair. `code` must not contain the separator.
    pub fn encode(code: &str, license: &str) -> String {
        general_purpose::STANDARD.encode(format!("{code}{SKU_SEPARATOR}{license}"))
    }

    /// Recover the pair by splitting on the first separator
    pub fn decode(sku: &str) -> Result<Self> {
        let bytes = general_purpose::STANDARD
            .decode(sku)
            .map_err(|e| SchemaError::MalformedSku(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| SchemaError::MalformedSku(e.to_string()))?;
        let (code, license) = text
            .split_once(SKU_SEPARATOR)
            .ok_or_else(|| SchemaError::MalformedSku(format!("no separator in {sku}")))?;

        Ok(Self::new(code, license))
    }

    pub fn to_sku(&self) -> String {
        Self::encode(&self.code, &self.license)
    }
}

pub struct LicenseRepacker;

impl LicenseRepacker {
    /// Expand every item into one quantity-1 item per issued license.
    ///
    /// Replacements appear contiguously at the original item's position.
    /// Everything outside the first unit's `items` is left untouched.
    pub fn repack(order: &Order) -> Result<Order> {
        let units = order
            .purchase_units
            .as_ref()
            .ok_or(SchemaError::MissingPurchaseUnits)?;
        let unit = units.first().ok_or(SchemaError::EmptyPurchaseUnits)?;
        let items = unit.items.as_ref().ok_or(SchemaError::MissingItems)?;

        let mut expanded = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            expanded.extend(Self::expand_item(index, item)?);
        }

        tracing::debug!(
            reference_id = ?unit.reference_id,
            items = items.len(),
            expanded = expanded.len(),
            "Repacked licenses into line items"
        );

        let mut repacked = order.clone();
        if let Some(first) = repacked
            .purchase_units
            .as_mut()
            .and_then(|units| units.first_mut())
        {
            first.items = Some(expanded);
        }
        Ok(repacked)
    }

    fn expand_item(index: usize, item: &LineItem) -> Result<Vec<LineItem>> {
        let quantity = item
            .quantity
            .ok_or(SchemaError::MissingItemQuantity { index })?;
        let code = item
            .code
            .as_deref()
            .ok_or(SchemaError::MissingItemCode { index })?;
        let licenses = item
            .licenses
            .as_ref()
            .ok_or(SchemaError::MissingItemLicenses { index })?;

        if usize::try_from(quantity).ok() != Some(licenses.len()) {
            return Err(SchemaError::LicenseCountMismatch {
                index,
                quantity,
                licenses: licenses.len(),
            });
        }

        let mut template = item.clone();
        for field in REPACK_DROPPED_FIELDS {
            template.strip(field);
        }

        Ok(licenses
            .iter()
            .map(|license| LineItem {
                quantity: Some(1),
                sku: Some(LicenseSku::encode(code, license)),
                ..template.clone()
            })
            .collect())
    }
}
