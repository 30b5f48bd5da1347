//! Canonical column registry and upfront schema validation.
//!
//! Every capability of the dashboard is declared here as a required column,
//! so a bad upload is rejected in one place with every missing name listed
//! together, instead of failing deep inside an aggregation.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::PipelineError;

/// Currency code carried by the amount column header.
pub const CURRENCY: &str = "EGP";

/// The canonical procurement columns, by exact header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    SalesOrderNo,
    CustomerName,
    Supplier,
    PoNumber,
    PoTotalAmount,
    InvoiceAmount,
    Quantity,
    ReceivedQuantity,
    PoDate,
    DeliveryDate,
    EstimatedDeliveryDate,
}

impl Column {
    /// Registry order doubles as reporting order for missing columns.
    pub const ALL: [Column; 11] = [
        Column::SalesOrderNo,
        Column::CustomerName,
        Column::Supplier,
        Column::PoNumber,
        Column::PoTotalAmount,
        Column::InvoiceAmount,
        Column::Quantity,
        Column::ReceivedQuantity,
        Column::PoDate,
        Column::DeliveryDate,
        Column::EstimatedDeliveryDate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::SalesOrderNo => "Sales Order No",
            Column::CustomerName => "Customer Name",
            Column::Supplier => "Supplier",
            Column::PoNumber => "PO Number",
            Column::PoTotalAmount => "PO Total Amount (EGP)",
            Column::InvoiceAmount => "Invoice Amount",
            Column::Quantity => "Quantity",
            Column::ReceivedQuantity => "Received Quantity",
            Column::PoDate => "PO Date",
            Column::DeliveryDate => "Delivery Date",
            Column::EstimatedDeliveryDate => "Estimated Delivery Date",
        }
    }
}

static BY_NAME: Lazy<HashMap<&'static str, Column>> =
    Lazy::new(|| Column::ALL.iter().map(|c| (c.name(), *c)).collect());

/// Required names absent from an (already trimmed) header row, in registry
/// order. Empty means the table is fit for the whole pipeline.
pub fn missing_columns(headers: &[String]) -> Vec<&'static str> {
    Column::ALL
        .iter()
        .map(|c| c.name())
        .filter(|name| !headers.iter().any(|h| h == name))
        .collect()
}

/// Maps canonical columns to their positions in a validated header row, so
/// cell access never depends on the column order of the upload.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    positions: HashMap<Column, usize>,
}

impl ColumnMap {
    /// Validate the header and build the position map.
    ///
    /// Fails with [`PipelineError::MissingColumns`] naming every absent
    /// required column; the caller must not proceed to row processing.
    pub fn from_headers(headers: &[String]) -> Result<Self, PipelineError> {
        let missing = missing_columns(headers);
        if !missing.is_empty() {
            return Err(PipelineError::MissingColumns {
                missing: missing.into_iter().map(String::from).collect(),
            });
        }
        let mut positions = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(col) = BY_NAME.get(header.as_str()) {
                // First occurrence wins if a header is duplicated.
                positions.entry(*col).or_insert(idx);
            }
        }
        Ok(ColumnMap { positions })
    }

    pub fn position(&self, col: Column) -> Option<usize> {
        self.positions.get(&col).copied()
    }

    /// Cell text for a canonical column; empty string when the row is short.
    pub fn cell<'a>(&self, cells: &'a [String], col: Column) -> &'a str {
        self.position(col)
            .and_then(|idx| cells.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn full_headers() -> Vec<String> {
        Column::ALL.iter().map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn complete_header_has_no_missing_columns() {
        assert!(missing_columns(&full_headers()).is_empty());
    }

    #[test]
    fn reports_every_missing_column_together() {
        let partial = headers(&["Sales Order No", "Customer Name", "PO Number"]);
        let missing = missing_columns(&partial);
        assert_eq!(missing.len(), 8);
        assert!(missing.contains(&"Supplier"));
        assert!(missing.contains(&"Quantity"));
        assert!(missing.contains(&"Estimated Delivery Date"));

        let err = ColumnMap::from_headers(&partial).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Missing columns in the uploaded file:"));
        for name in missing {
            assert!(message.contains(name), "message should name {name}");
        }
    }

    #[test]
    fn supplier_is_required() {
        let mut names = full_headers();
        names.retain(|n| n != "Supplier");
        assert_eq!(missing_columns(&names), vec!["Supplier"]);
    }

    #[test]
    fn positions_follow_the_upload_order() {
        let shuffled = headers(&[
            "Supplier",
            "Estimated Delivery Date",
            "Sales Order No",
            "Customer Name",
            "PO Number",
            "PO Total Amount (EGP)",
            "Invoice Amount",
            "Quantity",
            "Received Quantity",
            "PO Date",
            "Delivery Date",
        ]);
        let map = ColumnMap::from_headers(&shuffled).unwrap();
        assert_eq!(map.position(Column::Supplier), Some(0));
        assert_eq!(map.position(Column::SalesOrderNo), Some(2));
        assert_eq!(map.position(Column::DeliveryDate), Some(10));
    }

    #[test]
    fn cell_access_tolerates_short_rows() {
        let map = ColumnMap::from_headers(&full_headers()).unwrap();
        let row = vec!["SO-1".to_string()];
        assert_eq!(map.cell(&row, Column::SalesOrderNo), "SO-1");
        assert_eq!(map.cell(&row, Column::DeliveryDate), "");
    }
}
