//! Line items on a bill.

use crate::error::BillError;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque line-item identifier.
///
/// Backed by a UUIDv7: a millisecond timestamp followed by counter and random
/// bits, so items created within the same millisecond still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(Uuid);

impl LineItemId {
    pub fn generate() -> Self {
        LineItemId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for LineItemId {
    fn from(id: Uuid) -> Self {
        LineItemId(id)
    }
}

impl FromStr for LineItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(LineItemId)
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One priced entry on a bill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    id: LineItemId,
    description: String,
    quantity: u32,
    unit_price: Money,
    line_total: Money,
}

impl LineItem {
    /// Build a validated line item.
    pub fn new(
        description: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, BillError> {
        let description = description.into().trim().to_string();
        if description.is_empty() {
            return Err(BillError::validation("description", "is required"));
        }
        if quantity < 1 {
            return Err(BillError::validation("quantity", "must be at least 1"));
        }
        if unit_price.is_negative() {
            return Err(BillError::validation("unit_price", "must not be negative"));
        }
        let line_total = unit_price.checked_times(quantity).ok_or_else(|| {
            BillError::validation("line_total", "exceeds the largest supported amount")
        })?;

        Ok(Self {
            id: LineItemId::generate(),
            description,
            quantity,
            unit_price,
            line_total,
        })
    }

    /// Build a line item from raw form input.
    ///
    /// Quantity must be a whole number (`"2.5"` is rejected rather than
    /// truncated); price must be a non-negative number.
    pub fn parse(description: &str, quantity: &str, unit_price: &str) -> Result<Self, BillError> {
        let quantity = parse_quantity(quantity)?;
        let unit_price = Money::parse(unit_price)?;
        Self::new(description, quantity, unit_price)
    }

    pub fn id(&self) -> LineItemId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// `quantity * unit_price`, checked for overflow at construction.
    pub fn line_total(&self) -> Money {
        self.line_total
    }
}

fn parse_quantity(input: &str) -> Result<u32, BillError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(BillError::validation("quantity", "is required"));
    }

    let quantity: i64 = trimmed.parse().map_err(|_| {
        BillError::validation("quantity", format!("'{}' is not a whole number", trimmed))
    })?;
    if quantity < 1 {
        return Err(BillError::validation("quantity", "must be at least 1"));
    }

    u32::try_from(quantity).map_err(|_| BillError::validation("quantity", "is too large"))
}
