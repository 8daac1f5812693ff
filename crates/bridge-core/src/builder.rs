//! Order Builder
//!
//! Turns a flat product list into a single-unit provider order.

use crate::model::{Amount, LineItem, Money, Order, Product, PurchaseUnit};
use crate::money::MoneyFormatter;

/// Builds provider orders in one currency
#[derive(Clone, Debug)]
pub struct OrderBuilder {
    currency: String,
}

impl OrderBuilder {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Build an order with one purchase unit.
    ///
    /// Every product becomes one line item with a formatted `unit_amount`;
    /// `price` is consumed and every other product field passes through.
    /// Malformed prices are not rejected, they surface as malformed values.
    pub fn build(&self, reference_id: impl Into<String>, products: Vec<Product>) -> Order {
        let items: Vec<LineItem> = products
            .into_iter()
            .map(|product| {
                let unit_amount = Money::new(&self.currency, MoneyFormatter::format_price(&product.price));
                LineItem::from((product, unit_amount))
            })
            .collect();

        let lines: Vec<(&str, u32)> = items
            .iter()
            .filter_map(|item| {
                let unit_amount = item.unit_amount.as_ref()?;
                Some((unit_amount.value.as_str(), item.quantity.unwrap_or_default()))
            })
            .collect();
        let total = MoneyFormatter::sum(&lines);

        let reference_id = reference_id.into();
        tracing::debug!(
            reference_id = %reference_id,
            items = items.len(),
            total = %total,
            currency = %self.currency,
            "Built order"
        );

        Order {
            purchase_units: Some(vec![PurchaseUnit {
                reference_id: Some(reference_id),
                amount: Some(Amount::with_item_total(&self.currency, total)),
                items: Some(items),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }
}

impl Default for OrderBuilder {
    fn default() -> Self {
        Self::new("USD")
    }
}
