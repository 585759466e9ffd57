//! Ledger add/remove and totals tests for bill-ledger.

use bill_ledger::{BillError, BillLedger, BillTotals, LineItem, LineItemId, Money, TaxRate};
use rust_decimal_macros::dec;

fn item(description: &str, quantity: &str, price: &str) -> LineItem {
    LineItem::parse(description, quantity, price).expect("valid test item")
}

#[test]
fn vadapav_and_tea_totals() {
    let mut ledger = BillLedger::default();
    ledger.add_item(item("Vadapav", "2", "20.00")).unwrap();
    ledger.add_item(item("Tea", "1", "15.00")).unwrap();

    assert_eq!(ledger.subtotal(), Money::new(dec!(55.00)));
    assert_eq!(ledger.tax_amount(), Money::new(dec!(9.90)));
    assert_eq!(ledger.grand_total(), Money::new(dec!(64.90)));
    assert_eq!(ledger.grand_total().to_string(), "64.90");
}

#[test]
fn add_then_remove_returns_to_empty() {
    let mut ledger = BillLedger::default();
    let added = item("Samosa", "1", "12");
    let id = added.id();
    ledger.add_item(added).unwrap();

    let removed = ledger.remove_item(&id).expect("item should be removed");
    assert_eq!(removed.description(), "Samosa");
    assert!(ledger.is_empty());
    assert_eq!(ledger.subtotal(), Money::ZERO);
    assert_eq!(ledger.subtotal().to_string(), "0.00");
    assert_eq!(ledger.grand_total(), Money::ZERO);
}

#[test]
fn removing_unknown_id_is_a_noop() {
    let mut ledger = BillLedger::default();
    ledger.add_item(item("Tea", "1", "15")).unwrap();
    let before = ledger.clone();

    assert!(ledger.remove_item(&LineItemId::generate()).is_none());
    assert_eq!(ledger, before);
}

#[test]
fn insertion_order_is_preserved_and_duplicates_are_not_merged() {
    let mut ledger = BillLedger::default();
    ledger.add_item(item("Tea", "1", "15")).unwrap();
    ledger.add_item(item("Vadapav", "2", "20")).unwrap();
    ledger.add_item(item("Tea", "1", "15")).unwrap();

    let descriptions: Vec<&str> = ledger.items().iter().map(|i| i.description()).collect();
    assert_eq!(descriptions, vec!["Tea", "Vadapav", "Tea"]);
    assert_eq!(ledger.len(), 3);
}

#[test]
fn removing_one_duplicate_keeps_the_other() {
    let mut ledger = BillLedger::default();
    let first = item("Tea", "1", "15");
    let first_id = first.id();
    ledger.add_item(first).unwrap();
    ledger.add_item(item("Tea", "1", "15")).unwrap();

    ledger.remove_item(&first_id);
    assert_eq!(ledger.len(), 1);
    assert!(ledger.get(&first_id).is_none());
    assert_eq!(ledger.subtotal(), Money::new(dec!(15)));
}

#[test]
fn subtotal_matches_sum_of_lines_after_any_sequence() {
    let mut ledger = BillLedger::default();
    let mut ids = Vec::new();

    for (n, price) in ["0.10", "0.20", "19.99", "7.35", "120", "0.05"].iter().enumerate() {
        let added = item("Dish", &(n + 1).to_string(), price);
        ids.push(added.id());
        ledger.add_item(added).unwrap();
    }
    ledger.remove_item(&ids[1]);
    ledger.remove_item(&ids[4]);
    ledger.add_item(item("Lassi", "4", "45.50")).unwrap();

    let expected: Money = ledger
        .items()
        .iter()
        .map(|i| i.unit_price().checked_times(i.quantity()).unwrap())
        .sum();
    assert_eq!(ledger.subtotal(), expected);
    assert_eq!(ledger.subtotal(), Money::new(dec!(271.77)));
}

#[test]
fn tax_is_rounded_and_grand_total_adds_up() {
    let mut ledger = BillLedger::default();
    ledger.add_item(item("Chai", "3", "12.35")).unwrap();

    // 37.05 * 0.18 = 6.669
    assert_eq!(ledger.tax_amount(), Money::new(dec!(6.67)));
    assert_eq!(ledger.grand_total(), ledger.subtotal() + ledger.tax_amount());
    assert_eq!(
        ledger.totals(),
        BillTotals {
            subtotal: Money::new(dec!(37.05)),
            tax: Money::new(dec!(6.67)),
            grand_total: Money::new(dec!(43.72)),
        }
    );
}

#[test]
fn custom_tax_rate_is_applied() {
    let mut ledger = BillLedger::new(TaxRate::from_percent(dec!(5)).unwrap());
    ledger.add_item(item("Thali", "2", "150")).unwrap();

    assert_eq!(ledger.tax_amount(), Money::new(dec!(15)));
    assert_eq!(ledger.grand_total(), Money::new(dec!(315)));
}

#[test]
fn clear_empties_the_ledger() {
    let mut ledger = BillLedger::default();
    ledger.add_item(item("Tea", "1", "15")).unwrap();
    ledger.add_item(item("Bun", "2", "10")).unwrap();

    ledger.clear();
    assert!(ledger.is_empty());
    assert_eq!(ledger.totals().grand_total, Money::ZERO);
}

#[test]
fn item_overflowing_the_subtotal_is_rejected() {
    let mut ledger = BillLedger::default();
    ledger.add_item(item("Caviar", "1", "5e28")).unwrap();
    let before = ledger.clone();

    let err = ledger.add_item(item("Caviar", "1", "5e28")).unwrap_err();
    assert!(matches!(err, BillError::Validation { field: "subtotal", .. }));
    assert_eq!(ledger, before);
    assert_eq!(ledger.len(), 1);
}

#[test]
fn item_overflowing_the_grand_total_is_rejected() {
    let mut ledger = BillLedger::default();

    // Fits as a subtotal, but not once 18% tax is added on top.
    let err = ledger
        .add_item(item("Caviar", "1", "7e28"))
        .unwrap_err();
    assert!(matches!(err, BillError::Validation { field: "grand_total", .. }));
    assert!(ledger.is_empty());
    assert_eq!(ledger.totals().grand_total, Money::ZERO);
}
