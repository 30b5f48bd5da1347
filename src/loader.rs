//! Container readers and the row normalizer.
//!
//! CSV and Excel workbooks converge on one normalization routine: trim the
//! header, validate it against the column registry, drop summary/footer rows
//! and rows without a sales-order id, then parse date and amount cells into
//! typed fields. A cell that fails to parse downgrades to a missing value;
//! the row itself is kept.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader as SpreadsheetReader};
use chrono::NaiveDate;
use csv::ReaderBuilder;

use crate::error::PipelineError;
use crate::schema::{Column, ColumnMap};
use crate::types::{OrderRecord, OrderTable};
use crate::util::{parse_date_flexible, parse_f64_safe};

/// Ingestion diagnostics surfaced to the user after every load.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Data rows in the container, including ones later dropped.
    pub total_rows: usize,
    /// Rows that survived normalization.
    pub kept_rows: usize,
    /// Rows dropped because the order id contains the `Summary` marker.
    pub summary_rows: usize,
    /// Rows dropped because the order id cell is empty.
    pub missing_order_no: usize,
    /// Date cells downgraded to the unparseable marker.
    pub unparseable_dates: usize,
    /// Rows the CSV reader could not decode at all.
    pub read_errors: usize,
}

/// Load a data file, picking the container by extension.
///
/// Excel workbooks (`.xlsx`, `.xlsm`, `.xls`, `.ods`) go through the
/// spreadsheet reader; everything else is treated as CSV.
pub fn load_table(path: &Path) -> Result<(OrderTable, LoadReport), PipelineError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods") => load_workbook(path),
        _ => load_csv_file(path),
    }
}

pub fn load_csv_file(path: &Path) -> Result<(OrderTable, LoadReport), PipelineError> {
    load_csv_reader(File::open(path)?)
}

/// Read CSV from any source; rows the reader cannot decode are counted and
/// skipped rather than aborting the load.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<(OrderTable, LoadReport), PipelineError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut read_errors = 0usize;
    for result in rdr.records() {
        match result {
            Ok(record) => rows.push(record.iter().map(String::from).collect()),
            Err(_) => read_errors += 1,
        }
    }
    normalize(headers, rows, read_errors)
}

fn load_workbook(path: &Path) -> Result<(OrderTable, LoadReport), PipelineError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .unwrap_or(Err(calamine::Error::Msg("workbook has no worksheets")))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(row) => row.iter().map(|c| cell_text(c).trim().to_string()).collect(),
        None => Vec::new(),
    };
    let rows: Vec<Vec<String>> = rows_iter
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    normalize(headers, rows, 0)
}

/// Stringify a workbook cell. Date/time cells surface as their serial
/// number, which the date parser understands.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn normalize(
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    read_errors: usize,
) -> Result<(OrderTable, LoadReport), PipelineError> {
    let map = ColumnMap::from_headers(&headers)?;

    let mut report = LoadReport {
        total_rows: rows.len() + read_errors,
        read_errors,
        ..LoadReport::default()
    };
    let mut records: Vec<OrderRecord> = Vec::with_capacity(rows.len());

    for mut cells in rows {
        // Keep raw cells aligned with the header for export.
        if cells.len() < headers.len() {
            cells.resize(headers.len(), String::new());
        }

        let sales_order_no = map.cell(&cells, Column::SalesOrderNo).trim().to_string();
        if sales_order_no.contains("Summary") {
            report.summary_rows += 1;
            continue;
        }
        if sales_order_no.is_empty() {
            report.missing_order_no += 1;
            continue;
        }

        let customer_name = map.cell(&cells, Column::CustomerName).trim().to_string();
        let supplier = map.cell(&cells, Column::Supplier).trim().to_string();
        let po_number = map.cell(&cells, Column::PoNumber).trim().to_string();

        let po_total_amount = parse_f64_safe(map.cell(&cells, Column::PoTotalAmount));
        let invoice_amount = parse_f64_safe(map.cell(&cells, Column::InvoiceAmount));
        let quantity = parse_f64_safe(map.cell(&cells, Column::Quantity));
        let received_quantity = parse_f64_safe(map.cell(&cells, Column::ReceivedQuantity));

        let po_date = date_cell(&map, &cells, Column::PoDate, &mut report);
        let delivery_date = date_cell(&map, &cells, Column::DeliveryDate, &mut report);
        let estimated_delivery_date =
            date_cell(&map, &cells, Column::EstimatedDeliveryDate, &mut report);

        records.push(OrderRecord {
            sales_order_no,
            customer_name,
            supplier,
            po_number,
            po_total_amount,
            invoice_amount,
            quantity,
            received_quantity,
            po_date,
            delivery_date,
            estimated_delivery_date,
            raw: cells,
        });
    }

    report.kept_rows = records.len();
    Ok((OrderTable::new(headers, records), report))
}

/// Parse a date cell, counting non-empty cells that fail to parse. An empty
/// cell is simply missing, not a parse failure.
fn date_cell(
    map: &ColumnMap,
    cells: &[String],
    col: Column,
    report: &mut LoadReport,
) -> Option<NaiveDate> {
    let text = map.cell(cells, col).trim();
    if text.is_empty() {
        return None;
    }
    let parsed = parse_date_flexible(text);
    if parsed.is_none() {
        report.unparseable_dates += 1;
    }
    parsed
}
