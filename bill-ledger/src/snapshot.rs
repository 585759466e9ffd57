//! Immutable, finalized copies of a bill for submission and printing.

use crate::error::BillError;
use crate::ledger::BillLedger;
use crate::money::Money;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Header fields of a bill as entered by the user.
///
/// Blank strings count as missing. Unknown fields are rejected on
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BillMetadata {
    #[serde(default)]
    pub bill_number: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub table_number: String,
}

impl BillMetadata {
    /// Fill date, time and (when absent) the bill number from `now`.
    pub fn auto_fill(&mut self, now: NaiveDateTime) {
        self.date = now.format(DATE_FORMAT).to_string();
        self.time = now.format(TIME_FORMAT).to_string();
        if self.supplied_bill_number().is_none() {
            self.bill_number = Some(auto_bill_number(now));
        }
    }

    pub fn is_blank(&self) -> bool {
        self.supplied_bill_number().is_none()
            && self.date.trim().is_empty()
            && self.time.trim().is_empty()
            && self.customer_name.trim().is_empty()
            && self.table_number.trim().is_empty()
    }

    /// Problems that would prevent a snapshot, in field order.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        match self.date.trim() {
            "" => problems.push("date is required".to_string()),
            date if NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() => {
                problems.push(format!("date '{}' must be YYYY-MM-DD", date))
            }
            _ => {}
        }
        match self.time.trim() {
            "" => problems.push("time is required".to_string()),
            time if NaiveTime::parse_from_str(time, TIME_FORMAT).is_err() => {
                problems.push(format!("time '{}' must be HH:MM", time))
            }
            _ => {}
        }
        if self.customer_name.trim().is_empty() {
            problems.push("customer_name is required".to_string());
        }
        if self.table_number.trim().is_empty() {
            problems.push("table_number is required".to_string());
        }

        problems
    }

    fn supplied_bill_number(&self) -> Option<&str> {
        self.bill_number
            .as_deref()
            .map(str::trim)
            .filter(|number| !number.is_empty())
    }
}

/// Reference number derived from the clock, e.g. `BILL-20250503-141502123`.
///
/// A display convenience; the backend assigns the canonical number.
pub fn auto_bill_number(now: NaiveDateTime) -> String {
    format!("BILL-{}", now.format("%Y%m%d-%H%M%S%3f"))
}

/// One item line as frozen in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub description: String,
    pub quantity: u32,
    pub price: Money,
    pub total: Money,
}

/// Point-in-time copy of a bill: metadata, items and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillSnapshot {
    bill_number: String,
    #[serde(with = "date_format")]
    date: NaiveDate,
    #[serde(with = "time_format")]
    time: NaiveTime,
    customer_name: String,
    table_number: String,
    items: Vec<SnapshotItem>,
    subtotal: Money,
    tax: Money,
    grand_total: Money,
    #[serde(with = "rust_decimal::serde::float")]
    tax_rate: Decimal,
}

impl BillSnapshot {
    /// Snapshot `ledger` with `metadata`, auto-numbering from the local clock.
    pub fn take(ledger: &BillLedger, metadata: &BillMetadata) -> Result<Self, BillError> {
        Self::take_at(ledger, metadata, chrono::Local::now().naive_local())
    }

    /// Snapshot using `now` for the auto-generated bill number.
    pub fn take_at(
        ledger: &BillLedger,
        metadata: &BillMetadata,
        now: NaiveDateTime,
    ) -> Result<Self, BillError> {
        let mut problems = metadata.problems();
        if ledger.is_empty() {
            problems.push("at least one item is required".to_string());
        }
        if !problems.is_empty() {
            return Err(BillError::IncompleteBill(problems));
        }

        let date = NaiveDate::parse_from_str(metadata.date.trim(), DATE_FORMAT)
            .map_err(|_| BillError::IncompleteBill(vec!["date must be YYYY-MM-DD".into()]))?;
        let time = NaiveTime::parse_from_str(metadata.time.trim(), TIME_FORMAT)
            .map_err(|_| BillError::IncompleteBill(vec!["time must be HH:MM".into()]))?;

        let bill_number = metadata
            .supplied_bill_number()
            .map(str::to_string)
            .unwrap_or_else(|| auto_bill_number(now));

        let items = ledger
            .items()
            .iter()
            .map(|item| SnapshotItem {
                description: item.description().to_string(),
                quantity: item.quantity(),
                price: item.unit_price(),
                total: item.line_total(),
            })
            .collect();
        let totals = ledger.totals();

        debug!(
            bill_number = %bill_number,
            item_count = ledger.len(),
            grand_total = %totals.grand_total,
            "Bill snapshot taken"
        );

        Ok(Self {
            bill_number,
            date,
            time,
            customer_name: metadata.customer_name.trim().to_string(),
            table_number: metadata.table_number.trim().to_string(),
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            grand_total: totals.grand_total,
            tax_rate: ledger.tax_rate().percent(),
        })
    }

    pub fn bill_number(&self) -> &str {
        &self.bill_number
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn table_number(&self) -> &str {
        &self.table_number
    }

    pub fn items(&self) -> &[SnapshotItem] {
        &self.items
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn tax(&self) -> Money {
        self.tax
    }

    pub fn grand_total(&self) -> Money {
        self.grand_total
    }

    /// Tax rate in percent, e.g. `18`.
    pub fn tax_rate_percent(&self) -> Decimal {
        self.tax_rate
    }
}

mod date_format {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

mod time_format {
    use super::TIME_FORMAT;
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 3)
            .unwrap()
            .and_hms_milli_opt(h, m, s, ms)
            .unwrap()
    }

    #[test]
    fn auto_bill_number_carries_millisecond_suffix() {
        assert_eq!(auto_bill_number(at(14, 15, 2, 123)), "BILL-20250503-141502123");
        assert_ne!(
            auto_bill_number(at(14, 15, 2, 123)),
            auto_bill_number(at(14, 15, 2, 124))
        );
    }

    #[test]
    fn auto_fill_keeps_a_supplied_bill_number() {
        let mut metadata = BillMetadata {
            bill_number: Some("B-77".into()),
            ..Default::default()
        };
        metadata.auto_fill(at(9, 5, 0, 0));
        assert_eq!(metadata.date, "2025-05-03");
        assert_eq!(metadata.time, "09:05");
        assert_eq!(metadata.bill_number.as_deref(), Some("B-77"));
    }

    #[test]
    fn problems_flag_malformed_date_and_time() {
        let metadata = BillMetadata {
            bill_number: None,
            date: "03/05/2025".into(),
            time: "9pm".into(),
            customer_name: "Asha".into(),
            table_number: "4".into(),
        };
        let problems = metadata.problems();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("YYYY-MM-DD"));
        assert!(problems[1].contains("HH:MM"));
    }

    #[test]
    fn metadata_rejects_unknown_fields() {
        let raw = r#"{"customerName":"Asha","tableNumber":"4","waiter":"Ravi"}"#;
        assert!(serde_json::from_str::<BillMetadata>(raw).is_err());
    }
}
