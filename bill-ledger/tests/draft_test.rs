//! Bill lifecycle tests for bill-ledger.

use bill_ledger::{BillDraft, BillMetadata, BillState, LineItem, Money};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal_macros::dec;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 3)
        .unwrap()
        .and_hms_opt(13, 5, 0)
        .unwrap()
}

fn ready_draft() -> BillDraft {
    let mut draft = BillDraft::default();
    draft.set_metadata(BillMetadata {
        customer_name: "Ravi".to_string(),
        table_number: "2".to_string(),
        ..Default::default()
    });
    draft.auto_fill(now());
    draft.add_item(LineItem::parse("Pav bhaji", "1", "90").unwrap()).unwrap();
    draft
}

#[test]
fn new_draft_is_empty() {
    assert_eq!(BillDraft::default().state(), BillState::Empty);
}

#[test]
fn adding_items_moves_to_building_then_ready() {
    let mut draft = BillDraft::default();
    draft.add_item(LineItem::parse("Tea", "1", "15").unwrap()).unwrap();
    assert_eq!(draft.state(), BillState::Building);

    draft.set_metadata(BillMetadata {
        customer_name: "Ravi".to_string(),
        table_number: "2".to_string(),
        ..Default::default()
    });
    assert_eq!(draft.state(), BillState::Building);

    draft.auto_fill(now());
    assert_eq!(draft.state(), BillState::Ready);
    assert_eq!(draft.metadata().date, "2025-05-03");
    assert_eq!(draft.metadata().time, "13:05");
    assert_eq!(draft.metadata().bill_number.as_deref(), Some("BILL-20250503-130500000"));
}

#[test]
fn removing_last_item_returns_ready_to_building() {
    let mut draft = ready_draft();
    let id = draft.ledger().items()[0].id();

    draft.remove_item(&id);
    assert_eq!(draft.state(), BillState::Building);
}

#[test]
fn failed_submission_leaves_draft_ready_and_unchanged() {
    let mut draft = ready_draft();
    let before_items = draft.ledger().clone();
    let before_metadata = draft.metadata().clone();

    // The backend rejects the snapshot, so the submission is never completed.
    let _rejected = draft.snapshot_at(now()).expect("ready draft snapshots");

    assert_eq!(draft.state(), BillState::Ready);
    assert_eq!(draft.ledger(), &before_items);
    assert_eq!(draft.metadata(), &before_metadata);
}

#[test]
fn successful_submission_clears_draft() {
    let mut draft = ready_draft();
    let snapshot = draft.snapshot_at(now()).unwrap();
    assert_eq!(snapshot.grand_total(), Money::new(dec!(106.20)));

    draft.complete_submission("B-1001");
    assert_eq!(draft.state(), BillState::Submitted);
    assert_eq!(draft.submitted_as(), Some("B-1001"));
    assert!(draft.ledger().is_empty());
    assert_eq!(draft.metadata(), &BillMetadata::default());

    // The snapshot handed to the backend is unaffected.
    assert_eq!(snapshot.items().len(), 1);
}

#[test]
fn editing_after_submission_starts_a_new_bill() {
    let mut draft = ready_draft();
    draft.complete_submission("B-1001");

    draft.add_item(LineItem::parse("Tea", "2", "15").unwrap()).unwrap();
    assert_eq!(draft.state(), BillState::Building);
    assert_eq!(draft.submitted_as(), None);
}

#[test]
fn cancel_discards_everything() {
    let mut draft = ready_draft();
    draft.cancel();
    assert_eq!(draft.state(), BillState::Empty);
    assert!(draft.snapshot().is_err());
}

#[test]
fn unnumbered_bill_keeps_its_first_number() {
    let mut draft = BillDraft::default();
    draft
        .add_item(LineItem::parse("Tea", "1", "15").unwrap())
        .unwrap();
    draft.set_metadata(BillMetadata {
        date: "2025-05-03".to_string(),
        time: "13:05".to_string(),
        customer_name: "Ravi".to_string(),
        table_number: "2".to_string(),
        ..Default::default()
    });

    let first = draft.snapshot_at(now()).unwrap();
    let later = now() + chrono::Duration::milliseconds(250);
    let reprint = draft.snapshot_at(later).unwrap();

    assert_eq!(first.bill_number(), "BILL-20250503-130500000");
    assert_eq!(reprint.bill_number(), first.bill_number());
    assert_eq!(draft.metadata().bill_number.as_deref(), Some(first.bill_number()));
}

#[test]
fn incomplete_snapshot_assigns_no_number() {
    let mut draft = BillDraft::default();
    draft
        .add_item(LineItem::parse("Tea", "1", "15").unwrap())
        .unwrap();

    assert!(draft.snapshot_at(now()).is_err());
    assert_eq!(draft.metadata().bill_number, None);
    assert_eq!(draft.state(), BillState::Building);
}

#[test]
fn rejected_item_leaves_draft_unchanged() {
    let mut draft = ready_draft();
    draft.complete_submission("B-1001");
    draft
        .add_item(LineItem::parse("Caviar", "1", "7e28").unwrap())
        .unwrap_err();

    assert_eq!(draft.state(), BillState::Submitted);
    assert!(draft.ledger().is_empty());
}
