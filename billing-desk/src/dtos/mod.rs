//! Request and response bodies of the bill API.

use bill_ledger::{BillDraft, BillMetadata, BillState, LineItem};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A form value as typed by the user; numbers are accepted as well.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Text(String),
    Number(serde_json::Number),
}

impl RawField {
    pub fn as_text(&self) -> String {
        match self {
            RawField::Text(text) => text.clone(),
            RawField::Number(number) => number.to_string(),
        }
    }
}

fn raw_text(field: &Option<RawField>) -> String {
    field.as_ref().map(RawField::as_text).unwrap_or_default()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddItemRequest {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: Option<RawField>,
    #[serde(default)]
    pub price: Option<RawField>,
}

impl AddItemRequest {
    pub fn quantity_text(&self) -> String {
        raw_text(&self.quantity)
    }

    pub fn price_text(&self) -> String {
        raw_text(&self.price)
    }
}

#[derive(Debug, Serialize)]
pub struct ItemView {
    pub id: String,
    pub description: String,
    pub quantity: u32,
    pub price: String,
    pub total: String,
}

impl From<&LineItem> for ItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id().to_string(),
            description: item.description().to_string(),
            quantity: item.quantity(),
            price: item.unit_price().to_string(),
            total: item.line_total().to_string(),
        }
    }
}

/// Everything the UI needs to redraw a bill.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillView {
    pub bill_id: Uuid,
    pub state: BillState,
    pub items: Vec<ItemView>,
    pub metadata: BillMetadata,
    pub subtotal: String,
    pub tax: String,
    pub grand_total: String,
    pub tax_rate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_as: Option<String>,
}

impl BillView {
    pub fn of(bill_id: Uuid, draft: &BillDraft) -> Self {
        let ledger = draft.ledger();
        let totals = ledger.totals();
        Self {
            bill_id,
            state: draft.state(),
            items: ledger.items().iter().map(ItemView::from).collect(),
            metadata: draft.metadata().clone(),
            subtotal: totals.subtotal.to_string(),
            tax: totals.tax.to_string(),
            grand_total: totals.grand_total.to_string(),
            tax_rate: ledger.tax_rate().to_string(),
            submitted_as: draft.submitted_as().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemResponse {
    pub item_id: String,
    pub bill: BillView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub bill_number: String,
    pub bill: BillView,
}
