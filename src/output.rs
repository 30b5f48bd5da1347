//! Console rendering and export writers.
//!
//! Previews are markdown-style tables cut off after a caller-chosen number of
//! rows; the full data always goes to the export files. Export rows come from
//! the typed structs via serde, except the filtered-data artifact, which
//! streams each record's raw cells so every original column survives at
//! source precision.

use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::error::PipelineError;
use crate::metrics::{RankedEntry, ReconciliationRow, SupplierKpi};
use crate::types::{OrderRecord, OrderTable};
use crate::util::format_number;

/// Console view of one order line: typed columns only, dates and amounts
/// re-rendered for alignment. Blank means the cell was missing or did not
/// parse.
#[derive(Debug, Tabled, Clone)]
pub struct OrderRow {
    #[tabled(rename = "Sales Order No")]
    pub sales_order_no: String,
    #[tabled(rename = "Customer Name")]
    pub customer_name: String,
    #[tabled(rename = "Supplier")]
    pub supplier: String,
    #[tabled(rename = "PO Number")]
    pub po_number: String,
    #[tabled(rename = "PO Total Amount (EGP)")]
    pub po_total_amount: String,
    #[tabled(rename = "PO Date")]
    pub po_date: String,
    #[tabled(rename = "Delivery Date")]
    pub delivery_date: String,
    #[tabled(rename = "Estimated Delivery Date")]
    pub estimated_delivery_date: String,
}

impl From<&OrderRecord> for OrderRow {
    fn from(r: &OrderRecord) -> Self {
        OrderRow {
            sales_order_no: r.sales_order_no.clone(),
            customer_name: r.customer_name.clone(),
            supplier: r.supplier.clone(),
            po_number: r.po_number.clone(),
            po_total_amount: amount_text(r.po_total_amount),
            po_date: date_text(r.po_date),
            delivery_date: date_text(r.delivery_date),
            estimated_delivery_date: date_text(r.estimated_delivery_date),
        }
    }
}

#[derive(Debug, Tabled, Clone)]
pub struct SupplierKpiRow {
    #[tabled(rename = "Supplier")]
    pub supplier: String,
    #[tabled(rename = "Total Orders")]
    pub total_orders: usize,
    #[tabled(rename = "Total Procurement (EGP)")]
    pub total_procurement: String,
    #[tabled(rename = "On-Time")]
    pub on_time_deliveries: usize,
    #[tabled(rename = "Delayed")]
    pub delayed_deliveries: usize,
    #[tabled(rename = "On-Time Rate (%)")]
    pub on_time_rate: String,
}

impl From<&SupplierKpi> for SupplierKpiRow {
    fn from(k: &SupplierKpi) -> Self {
        SupplierKpiRow {
            supplier: k.supplier.clone(),
            total_orders: k.total_orders,
            total_procurement: format_number(k.total_procurement, 2),
            on_time_deliveries: k.on_time_deliveries,
            delayed_deliveries: k.delayed_deliveries,
            on_time_rate: format_number(k.on_time_rate, 2),
        }
    }
}

#[derive(Debug, Tabled, Clone)]
pub struct ReconRow {
    #[tabled(rename = "PO Number")]
    pub po_number: String,
    #[tabled(rename = "Total Quantity")]
    pub total_quantity: String,
    #[tabled(rename = "Total Received")]
    pub total_received: String,
    #[tabled(rename = "Difference")]
    pub difference: String,
}

impl From<&ReconciliationRow> for ReconRow {
    fn from(r: &ReconciliationRow) -> Self {
        ReconRow {
            po_number: r.po_number.clone(),
            total_quantity: format_number(r.total_quantity, 2),
            total_received: format_number(r.total_received, 2),
            difference: format_number(r.difference, 2),
        }
    }
}

fn date_text(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn amount_text(v: Option<f64>) -> String {
    v.map(|v| format_number(v, 2)).unwrap_or_default()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn preview_orders(records: &[OrderRecord], max_rows: usize) {
    let rows: Vec<OrderRow> = records.iter().take(max_rows).map(OrderRow::from).collect();
    preview_table_rows(&rows, max_rows);
}

pub fn preview_kpis(kpis: &[SupplierKpi], max_rows: usize) {
    let rows: Vec<SupplierKpiRow> = kpis.iter().take(max_rows).map(SupplierKpiRow::from).collect();
    preview_table_rows(&rows, max_rows);
}

pub fn preview_reconciliation(rows: &[ReconciliationRow], max_rows: usize) {
    let rows: Vec<ReconRow> = rows.iter().take(max_rows).map(ReconRow::from).collect();
    preview_table_rows(&rows, max_rows);
}

/// Per-supplier on-time gauge: one `#` per five percentage points, so a full
/// bar is twenty characters.
pub fn render_rate_chart(kpis: &[SupplierKpi]) {
    if kpis.is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!(
        "  {:20} {:>10} {:>9}  {}",
        "Supplier", "Orders", "Rate", "Visual"
    );
    println!("  {}", "-".repeat(60));
    for k in kpis {
        let bar_len = (k.on_time_rate / 5.0) as usize;
        let bar: String = "#".repeat(bar_len);
        println!(
            "  {:20} {:>10} {:>8.1}% {}",
            k.supplier, k.total_orders, k.on_time_rate, bar
        );
    }
    println!();
}

/// Ranking bars scaled against the largest amount (thirty characters at
/// full scale).
pub fn render_amount_chart(entries: &[RankedEntry]) {
    if entries.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let max_amount = entries.iter().map(|e| e.amount).fold(f64::MIN, f64::max);
    for e in entries {
        let bar_len = if max_amount > 0.0 {
            ((e.amount / max_amount) * 30.0).round() as usize
        } else {
            0
        };
        println!(
            "  {:20} {:>18} {}",
            e.name,
            format_number(e.amount, 2),
            "#".repeat(bar_len)
        );
    }
    println!();
}

pub fn write_csv<T, P>(path: P, rows: &[T]) -> Result<(), PipelineError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T, P>(path: P, value: &T) -> Result<(), PipelineError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write the trimmed header plus each record's raw cells. Unknown extra
/// columns and original cell text pass through untouched, and no index
/// column is added.
pub fn write_filtered_csv<P: AsRef<Path>>(path: P, table: &OrderTable) -> Result<(), PipelineError> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    wtr.write_record(&table.columns)?;
    for record in &table.records {
        wtr.write_record(&record.raw)?;
    }
    wtr.flush()?;
    Ok(())
}
