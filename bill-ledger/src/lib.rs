//! bill-ledger: line items, totals and snapshots for restaurant bills.
//!
//! The crate is synchronous and does no I/O. Callers own a [`BillDraft`] (or a
//! bare [`BillLedger`]), mutate it through add/remove operations, read totals
//! for display, and take a [`BillSnapshot`] to hand to a persistence or
//! printing collaborator.

pub mod draft;
pub mod error;
pub mod ledger;
pub mod line_item;
pub mod money;
pub mod snapshot;

pub use draft::{BillDraft, BillState};
pub use error::{BillError, SubmissionError};
pub use ledger::{BillLedger, BillTotals};
pub use line_item::{LineItem, LineItemId};
pub use money::{Money, TaxRate};
pub use snapshot::{auto_bill_number, BillMetadata, BillSnapshot, SnapshotItem};
