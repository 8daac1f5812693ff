//! Order Models
//!
//! Provider-side order schema plus the backend's license bundle.
//!
//! Every schema field is optional so that structurally incomplete orders
//! can be represented and rejected by the validator instead of failing at
//! deserialization. Fields the schema does not name are kept in `extra`
//! and pass through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unknown fields carried alongside the typed ones
pub type Passthrough = Map<String, Value>;

/// Unit price as the catalogue supplies it.
///
/// Catalogues send numbers or numeric strings. Anything else is kept as
/// is so that it surfaces as a malformed amount instead of failing the
/// request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
    Other(Value),
}

impl From<f64> for Price {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Price {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Price {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A product in the internal catalogue, as handed to the order builder
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Display name
    pub name: String,

    /// Units purchased
    pub quantity: u32,

    /// Unit price, unformatted
    pub price: Price,

    /// Opaque license template identifier used by the backend
    pub code: String,

    /// Any other product fields
    #[serde(flatten)]
    pub extra: Passthrough,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        quantity: u32,
        price: impl Into<Price>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            quantity,
            price: price.into(),
            code: code.into(),
            extra: Passthrough::new(),
        }
    }

    /// Attach a passthrough field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Currency and formatted value pair
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub currency_code: String,
    pub value: String,

    #[serde(flatten)]
    pub extra: Passthrough,
}

impl Money {
    pub fn new(currency_code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            currency_code: currency_code.into(),
            value: value.into(),
            extra: Passthrough::new(),
        }
    }
}

/// Itemized totals; only `item_total` is typed, `tax_total`, `shipping`
/// and the rest ride along in `extra`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub item_total: Money,

    #[serde(flatten)]
    pub extra: Passthrough,
}

/// Purchase-unit total with its breakdown
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub currency_code: String,
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Breakdown>,

    #[serde(flatten)]
    pub extra: Passthrough,
}

impl Amount {
    /// Total whose breakdown replicates the same value as `item_total`
    pub fn with_item_total(currency_code: impl Into<String>, value: impl Into<String>) -> Self {
        let currency_code = currency_code.into();
        let value = value.into();
        Self {
            breakdown: Some(Breakdown {
                item_total: Money::new(currency_code.clone(), value.clone()),
                extra: Passthrough::new(),
            }),
            currency_code,
            value,
            extra: Passthrough::new(),
        }
    }

    pub fn item_total(&self) -> Option<&Money> {
        self.breakdown.as_ref().map(|breakdown| &breakdown.item_total)
    }
}

/// One line item of a purchase unit
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount: Option<Money>,

    /// License template identifier, required by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Encoded `code;key`, only present on repacked items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    /// Keys issued by the backend, only present on backend responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licenses: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Passthrough,
}

impl LineItem {
    /// Remove a field by its wire name, typed or passthrough
    pub fn strip(&mut self, field: &str) {
        match field {
            "name" => self.name = None,
            "quantity" => self.quantity = None,
            "unit_amount" => self.unit_amount = None,
            "code" => self.code = None,
            "sku" => self.sku = None,
            "licenses" => self.licenses = None,
            other => {
                self.extra.remove(other);
            }
        }
    }
}

impl From<(Product, Money)> for LineItem {
    fn from((product, unit_amount): (Product, Money)) -> Self {
        Self {
            name: Some(product.name),
            quantity: Some(product.quantity),
            unit_amount: Some(unit_amount),
            code: Some(product.code),
            sku: None,
            licenses: None,
            extra: product.extra,
        }
    }
}

/// Provider grouping of line items and totals
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseUnit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,

    #[serde(flatten)]
    pub extra: Passthrough,
}

/// Provider order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_units: Option<Vec<PurchaseUnit>>,

    #[serde(flatten)]
    pub extra: Passthrough,
}

impl Order {
    /// The purchase unit the backend reads from
    pub fn first_unit(&self) -> Option<&PurchaseUnit> {
        self.purchase_units.as_ref().and_then(|units| units.first())
    }

    /// Items of the first purchase unit
    pub fn items(&self) -> &[LineItem] {
        self.first_unit()
            .and_then(|unit| unit.items.as_deref())
            .unwrap_or_default()
    }

    pub fn reference_id(&self) -> Option<&str> {
        self.first_unit().and_then(|unit| unit.reference_id.as_deref())
    }
}

/// Keys issued for one submitted product
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseEntry {
    pub name: String,
    pub licenses: Vec<String>,
}

/// Backend response in direct mode, one entry per submitted product
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseBundle(pub Vec<LicenseEntry>);

impl LicenseBundle {
    pub fn entries(&self) -> &[LicenseEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of keys across all entries
    pub fn license_count(&self) -> usize {
        self.0.iter().map(|entry| entry.licenses.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_passthrough_fields_survive_roundtrip() {
        let raw = json!({
            "name": "Pro",
            "quantity": 2,
            "code": "PRO",
            "description": "Yearly seat",
            "category": "DIGITAL_GOODS"
        });

        let item: LineItem = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(item.code.as_deref(), Some("PRO"));
        assert_eq!(item.extra.len(), 2);
        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let order: Order = serde_json::from_value(json!({ "intent": "CAPTURE" })).unwrap();
        assert!(order.purchase_units.is_none());
        assert_eq!(order.extra["intent"], "CAPTURE");
        assert!(order.items().is_empty());
    }

    #[test]
    fn test_strip_removes_typed_and_extra_fields() {
        let mut item = LineItem {
            code: Some("X".into()),
            licenses: Some(vec!["k1".into()]),
            ..Default::default()
        };
        item.extra.insert("note".into(), json!("gift"));

        item.strip("code");
        item.strip("licenses");
        item.strip("note");

        assert_eq!(item, LineItem::default());
    }

    #[test]
    fn test_amount_keeps_provider_fields() {
        let raw = json!({
            "currency_code": "USD",
            "value": "3.30",
            "breakdown": {
                "item_total": { "currency_code": "USD", "value": "3.00" },
                "tax_total": { "currency_code": "USD", "value": "0.30" }
            },
            "note": "incl. VAT"
        });

        let amount: Amount = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(amount.item_total().unwrap().value, "3.00");
        assert_eq!(amount.breakdown.as_ref().unwrap().extra["tax_total"]["value"], "0.30");
        assert_eq!(serde_json::to_value(&amount).unwrap(), raw);
    }

    #[test]
    fn test_amount_without_breakdown() {
        let amount: Amount =
            serde_json::from_value(json!({ "currency_code": "USD", "value": "1.00" })).unwrap();
        assert!(amount.breakdown.is_none());
        assert!(amount.item_total().is_none());
    }

    #[test]
    fn test_price_accepts_numbers_and_strings() {
        let product: Product = serde_json::from_value(
            json!({ "name": "A", "quantity": 1, "price": "19.99", "code": "X" }),
        )
        .unwrap();
        assert_eq!(product.price, Price::Text("19.99".into()));

        let product: Product = serde_json::from_value(
            json!({ "name": "A", "quantity": 1, "price": 5, "code": "X" }),
        )
        .unwrap();
        assert_eq!(product.price, Price::Number(5.0));

        let product: Product = serde_json::from_value(
            json!({ "name": "A", "quantity": 1, "price": null, "code": "X" }),
        )
        .unwrap();
        assert_eq!(product.price, Price::Other(Value::Null));
    }

    #[test]
    fn test_bundle_is_a_plain_array_on_the_wire() {
        let bundle: LicenseBundle = serde_json::from_value(json!([
            { "name": "A", "licenses": ["k1", "k2"] },
            { "name": "B", "licenses": ["k3"] }
        ]))
        .unwrap();

        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.license_count(), 3);
    }
}
