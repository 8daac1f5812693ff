//! Money Formatting
//!
//! Normalizes monetary values to the two-decimal strings the payment
//! provider expects and sums line totals. All arithmetic happens in
//! `rust_decimal`; `f64` only appears at the input boundary.
//!
//! Rounding is half-away-from-zero on the shortest decimal form of the
//! input, so `0.005` becomes `"0.01"` and `1.005` becomes `"1.01"`.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::model::Price;

/// Digits after the decimal point in every provider amount
pub const SCALE: u32 = 2;

/// Marker produced when a line total cannot be computed
pub const INVALID_AMOUNT: &str = "NaN";

/// Stateless formatter for provider amounts
pub struct MoneyFormatter;

impl MoneyFormatter {
    /// Render `amount` with exactly two decimals.
    ///
    /// Non-finite inputs are not rejected here: their textual form passes
    /// through unchanged and the provider rejects the order. Finite values
    /// beyond `Decimal`'s range fall back to the float's own two-decimal
    /// rendering.
    pub fn format(amount: f64) -> String {
        if !amount.is_finite() {
            return amount.to_string();
        }

        match Decimal::from_str(&amount.to_string()) {
            Ok(value) => Self::format_decimal(value),
            Err(_) => format!("{amount:.2}"),
        }
    }

    /// Render a catalogue price.
    ///
    /// Numeric strings are formatted like numbers. Any other text, or a
    /// non-numeric JSON value, passes through as its textual form.
    pub fn format_price(price: &Price) -> String {
        match price {
            Price::Number(amount) => Self::format(*amount),
            Price::Text(text) => Decimal::from_str(text.trim())
                .map_or_else(|_| text.clone(), Self::format_decimal),
            Price::Other(value) => value.to_string(),
        }
    }

    /// Render an exact decimal with exactly two decimals
    pub fn format_decimal(value: Decimal) -> String {
        let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(SCALE);
        if rounded.is_zero() {
            rounded.set_sign_positive(true);
        }
        rounded.to_string()
    }

    /// Sum `unit_price * quantity` over pre-formatted unit prices.
    ///
    /// Any unit price that is not a decimal string makes the whole total
    /// [`INVALID_AMOUNT`].
    pub fn sum<S: AsRef<str>>(lines: &[(S, u32)]) -> String {
        let mut total = Decimal::ZERO;
        for (unit_price, quantity) in lines {
            let Ok(price) = Decimal::from_str(unit_price.as_ref()) else {
                return INVALID_AMOUNT.to_string();
            };
            let Some(line) = price.checked_mul(Decimal::from(*quantity)) else {
                return INVALID_AMOUNT.to_string();
            };
            let Some(next) = total.checked_add(line) else {
                return INVALID_AMOUNT.to_string();
            };
            total = next;
        }
        Self::format_decimal(total)
    }
}
