//! Price text normalization and the listing markup.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::PriceError;

/// Convert locale-formatted price text into a decimal.
///
/// Everything except digits, `.` and `,` is dropped. When both separators
/// are present the one appearing last is the decimal point and the other is
/// a group separator. A lone `,` is a decimal point. A lone `.` is kept.
///
/// Known limitation: `"1,234"` parses as `1.234`, not `1234`.
pub fn normalize_price(raw: &str) -> Result<Decimal, PriceError> {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    let mut canonical = match (kept.rfind('.'), kept.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => kept.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => kept.replace(',', ""),
        (None, Some(_)) => kept.replace(',', "."),
        _ => kept,
    };

    if !canonical.chars().any(|c| c.is_ascii_digit()) || canonical.matches('.').count() > 1 {
        return Err(PriceError::NotANumber(raw.to_string()));
    }
    // "19," as rendered by split whole/fraction price widgets.
    if canonical.ends_with('.') {
        canonical.pop();
    }

    Decimal::from_str(&canonical).map_err(|_| PriceError::NotANumber(raw.to_string()))
}

/// Fixed markup applied to the source price to produce the listing price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    markup: Decimal,
}

impl PricingPolicy {
    /// The standard +20% markup.
    pub fn standard() -> Self {
        Self {
            markup: Decimal::new(12, 1),
        }
    }

    pub fn markup(&self) -> Decimal {
        self.markup
    }

    /// `price * markup`, rounded to cents with midpoints away from zero.
    pub fn apply_markup(&self, price: Decimal) -> Decimal {
        (price * self.markup).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
