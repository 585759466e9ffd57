//! Fixed-point money and tax-rate types.
//!
//! All arithmetic is carried out on [`Decimal`] so that long bills never
//! accumulate floating-point drift. Rounding to two places happens only for
//! the tax amount and at presentation time.

use crate::error::BillError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Number of decimal places shown on bills and receipts.
pub const DISPLAY_SCALE: u32 = 2;

/// A currency amount.
///
/// Serialized as a JSON number, the shape the backend payload uses.
/// `+` and [`Sum`] are unchecked; values reaching them have already passed
/// [`Money::checked_add`] or [`Money::checked_times`] on the way into a ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Money(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Parse raw form input. Rejects blanks, non-numbers and negative amounts.
    pub fn parse(input: &str) -> Result<Self, BillError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(BillError::validation("unit_price", "is required"));
        }

        let amount = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| {
                BillError::validation("unit_price", format!("'{}' is not a number", trimmed))
            })?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(BillError::validation("unit_price", "must not be negative"));
        }

        Ok(Money(amount.normalize()))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Half-away-from-zero rounding to [`DISPLAY_SCALE`] places.
    pub fn round_2dp(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// `self * quantity`, or `None` when the product does not fit a [`Decimal`].
    pub fn checked_times(&self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(Decimal::from(quantity)).map(Money)
    }

    pub fn checked_add(&self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round_2dp().0;
        write!(f, "{:.2}", rounded)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Number(value) if value.is_finite() => value.to_string(),
            Raw::Number(value) => {
                return Err(serde::de::Error::custom(format!(
                    "amount must be finite, got {}",
                    value
                )))
            }
            Raw::Text(text) => text,
        };

        let amount = Decimal::from_str(text.trim()).map_err(serde::de::Error::custom)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(serde::de::Error::custom(format!(
                "amount must not be negative, got {}",
                amount
            )));
        }
        Ok(Money(amount))
    }
}

/// Tax rate applied to a bill subtotal, stored as a fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxRate(Decimal);

impl TaxRate {
    pub fn new(fraction: Decimal) -> Result<Self, BillError> {
        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            return Err(BillError::validation(
                "tax_rate",
                format!("must be between 0 and 1, got {}", fraction),
            ));
        }
        Ok(TaxRate(fraction))
    }

    /// `18` means 18%.
    pub fn from_percent(percent: Decimal) -> Result<Self, BillError> {
        Self::new(percent / Decimal::ONE_HUNDRED)
    }

    pub fn fraction(&self) -> Decimal {
        self.0
    }

    pub fn percent(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).normalize()
    }

    /// Tax owed on `amount`, rounded to two places.
    ///
    /// The rate never exceeds 1, so the product is never larger than `amount`.
    pub fn apply(&self, amount: Money) -> Money {
        Money(amount.0 * self.0).round_2dp()
    }
}

impl Default for TaxRate {
    /// 18% GST.
    fn default() -> Self {
        TaxRate(Decimal::new(18, 2))
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}
