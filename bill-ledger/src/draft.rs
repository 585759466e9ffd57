//! A bill being built by one session, and its lifecycle.

use crate::error::BillError;
use crate::ledger::BillLedger;
use crate::line_item::{LineItem, LineItemId};
use crate::money::TaxRate;
use crate::snapshot::{BillMetadata, BillSnapshot};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Where a draft stands on its way to submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillState {
    Empty,
    Building,
    Ready,
    Submitted,
}

impl BillState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillState::Empty => "empty",
            BillState::Building => "building",
            BillState::Ready => "ready",
            BillState::Submitted => "submitted",
        }
    }
}

impl std::fmt::Display for BillState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ledger plus metadata for a bill under construction.
///
/// Submission is two-phase: take a [`snapshot`](Self::snapshot), hand it to the
/// backend, and call [`complete_submission`](Self::complete_submission) only
/// once the backend accepted it. A failed submission therefore leaves the
/// draft exactly as it was.
#[derive(Debug, Clone, Default)]
pub struct BillDraft {
    ledger: BillLedger,
    metadata: BillMetadata,
    submitted_as: Option<String>,
}

impl BillDraft {
    pub fn new(tax_rate: TaxRate) -> Self {
        Self {
            ledger: BillLedger::new(tax_rate),
            metadata: BillMetadata::default(),
            submitted_as: None,
        }
    }

    pub fn state(&self) -> BillState {
        if self.submitted_as.is_some() {
            BillState::Submitted
        } else if self.ledger.is_empty() && self.metadata.is_blank() {
            BillState::Empty
        } else if !self.ledger.is_empty() && self.metadata.problems().is_empty() {
            BillState::Ready
        } else {
            BillState::Building
        }
    }

    pub fn ledger(&self) -> &BillLedger {
        &self.ledger
    }

    pub fn metadata(&self) -> &BillMetadata {
        &self.metadata
    }

    /// Bill number the backend confirmed for the last submission.
    pub fn submitted_as(&self) -> Option<&str> {
        self.submitted_as.as_deref()
    }

    /// Add `item`; on error the draft is unchanged.
    pub fn add_item(&mut self, item: LineItem) -> Result<LineItemId, BillError> {
        let id = item.id();
        self.ledger.add_item(item)?;
        self.submitted_as = None;
        Ok(id)
    }

    pub fn remove_item(&mut self, id: &LineItemId) -> Option<LineItem> {
        let removed = self.ledger.remove_item(id);
        if removed.is_some() {
            self.submitted_as = None;
        }
        removed
    }

    pub fn set_metadata(&mut self, metadata: BillMetadata) {
        self.submitted_as = None;
        self.metadata = metadata;
    }

    pub fn auto_fill(&mut self, now: NaiveDateTime) {
        self.submitted_as = None;
        self.metadata.auto_fill(now);
    }

    /// Snapshot the current contents.
    ///
    /// When no bill number was supplied, the number generated for the first
    /// snapshot is kept in the metadata, so reprints and the final submission
    /// all carry the same number.
    pub fn snapshot(&mut self) -> Result<BillSnapshot, BillError> {
        self.snapshot_at(chrono::Local::now().naive_local())
    }

    pub fn snapshot_at(&mut self, now: NaiveDateTime) -> Result<BillSnapshot, BillError> {
        let snapshot = BillSnapshot::take_at(&self.ledger, &self.metadata, now)?;
        if self.metadata.bill_number.as_deref() != Some(snapshot.bill_number()) {
            self.metadata.bill_number = Some(snapshot.bill_number().to_string());
        }
        Ok(snapshot)
    }

    /// Record a backend-accepted submission and clear the bill.
    pub fn complete_submission(&mut self, confirmed_bill_number: impl Into<String>) {
        let confirmed = confirmed_bill_number.into();
        info!(
            bill_number = %confirmed,
            item_count = self.ledger.len(),
            "Bill submitted, clearing draft"
        );
        self.ledger.clear();
        self.metadata = BillMetadata::default();
        self.submitted_as = Some(confirmed);
    }

    /// Discard items and metadata.
    pub fn cancel(&mut self) {
        self.ledger.clear();
        self.metadata = BillMetadata::default();
        self.submitted_as = None;
    }
}
