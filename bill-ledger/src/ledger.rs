//! The ordered item list of a bill under construction and its derived totals.

use crate::error::BillError;
use crate::line_item::{LineItem, LineItemId};
use crate::money::{Money, TaxRate};
use serde::Serialize;
use tracing::debug;

/// Derived totals of a ledger at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub grand_total: Money,
}

/// Insertion-ordered line items plus the tax rate applied to them.
///
/// Totals are never cached; every read recomputes them from `items`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillLedger {
    items: Vec<LineItem>,
    tax_rate: TaxRate,
}

impl BillLedger {
    pub fn new(tax_rate: TaxRate) -> Self {
        Self {
            items: Vec::new(),
            tax_rate,
        }
    }

    /// Append an item. Items with the same description are kept separate.
    ///
    /// An item that would push the subtotal or grand total past what a
    /// [`Money`] can hold is rejected and the ledger stays as it was. Every
    /// item in the ledger has passed this check, so totals never overflow.
    pub fn add_item(&mut self, item: LineItem) -> Result<(), BillError> {
        let subtotal = self
            .subtotal()
            .checked_add(item.line_total())
            .ok_or_else(|| {
                BillError::validation("subtotal", "exceeds the largest supported amount")
            })?;
        subtotal
            .checked_add(self.tax_rate.apply(subtotal))
            .ok_or_else(|| {
                BillError::validation("grand_total", "exceeds the largest supported amount")
            })?;

        debug!(
            item_id = %item.id(),
            description = %item.description(),
            quantity = item.quantity(),
            "Line item added"
        );
        self.items.push(item);
        Ok(())
    }

    /// Remove the item with `id`. Unknown ids are ignored.
    pub fn remove_item(&mut self, id: &LineItemId) -> Option<LineItem> {
        let position = self.items.iter().position(|item| &item.id() == id)?;
        let removed = self.items.remove(position);
        debug!(item_id = %id, "Line item removed");
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, id: &LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// `subtotal * tax_rate`, rounded to two places.
    pub fn tax_amount(&self) -> Money {
        self.tax_rate.apply(self.subtotal())
    }

    pub fn grand_total(&self) -> Money {
        self.totals().grand_total
    }

    pub fn totals(&self) -> BillTotals {
        let subtotal = self.subtotal();
        let tax = self.tax_rate.apply(subtotal);
        BillTotals {
            subtotal,
            tax,
            grand_total: subtotal + tax,
        }
    }
}
