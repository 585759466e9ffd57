//! Printable plain-text receipts.

use crate::config::RestaurantProfile;
use askama::Template;
use bill_ledger::{BillSnapshot, Money};
use service_core::error::AppError;

const WIDTH: usize = 40;
const DESCRIPTION_WIDTH: usize = 18;

#[derive(Template)]
#[template(path = "receipt.txt")]
struct ReceiptTemplate {
    header: Vec<String>,
    rule: String,
    bill_number: String,
    date: String,
    time: String,
    customer: String,
    table: String,
    column_header: String,
    item_lines: Vec<String>,
    total_lines: Vec<String>,
    footer: Vec<String>,
}

fn centered(text: &str) -> String {
    format!("{:^width$}", text.trim(), width = WIDTH)
        .trim_end()
        .to_string()
}

fn item_row(description: &str, qty: &str, price: &str, total: &str) -> String {
    format!(
        "{:<dw$}{:>4}{:>9}{:>9}",
        description,
        qty,
        price,
        total,
        dw = DESCRIPTION_WIDTH
    )
}

fn total_row(label: &str, currency: &str, amount: Money) -> String {
    let value = format!("{}{}", currency, amount);
    format!("{:<20}{:>20}", label, value)
}

/// Render `snapshot` as a 40-column text receipt.
pub fn render_receipt(
    snapshot: &BillSnapshot,
    profile: &RestaurantProfile,
    currency: &str,
) -> Result<String, AppError> {
    let mut header = vec![centered(&profile.name)];
    if let Some(address) = &profile.address {
        header.push(centered(address));
    }
    if let Some(phone) = &profile.phone {
        header.push(centered(&format!("Phone: {}", phone)));
    }
    if let Some(gst) = &profile.gst_number {
        header.push(centered(&format!("GST No: {}", gst)));
    }

    let mut item_lines = Vec::with_capacity(snapshot.items().len());
    for item in snapshot.items() {
        let qty = item.quantity.to_string();
        let price = item.price.to_string();
        let total = item.total.to_string();
        if item.description.chars().count() < DESCRIPTION_WIDTH {
            item_lines.push(item_row(&item.description, &qty, &price, &total));
        } else {
            // Long names get their own line.
            item_lines.push(item.description.clone());
            item_lines.push(item_row("", &qty, &price, &total));
        }
    }

    let tax_label = format!("Tax ({}%):", snapshot.tax_rate_percent().normalize());
    let total_lines = vec![
        total_row("Subtotal:", currency, snapshot.subtotal()),
        total_row(&tax_label, currency, snapshot.tax()),
        total_row("Grand Total:", currency, snapshot.grand_total()),
    ];

    let template = ReceiptTemplate {
        header,
        rule: "-".repeat(WIDTH),
        bill_number: snapshot.bill_number().to_string(),
        date: snapshot.date().format("%d/%m/%Y").to_string(),
        time: snapshot.time().format("%H:%M").to_string(),
        customer: snapshot.customer_name().to_string(),
        table: snapshot.table_number().to_string(),
        column_header: item_row("Item", "Qty", "Price", "Total"),
        item_lines,
        total_lines,
        footer: vec![
            centered(&profile.receipt_footer),
            centered("Please visit again"),
        ],
    };

    template
        .render()
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Receipt rendering failed: {}", e)))
}
