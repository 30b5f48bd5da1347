use chrono::NaiveDate;

/// One procurement-order line with typed views of the canonical columns.
///
/// String attributes may be empty (the group-by computations skip empty
/// keys); `None` in an amount or date field is the explicit marker for a
/// missing or unparseable cell. `raw` retains the source cells aligned with
/// the table's column list, so exports reproduce the upload byte-for-byte.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub sales_order_no: String,
    pub customer_name: String,
    pub supplier: String,
    pub po_number: String,
    pub po_total_amount: Option<f64>,
    pub invoice_amount: Option<f64>,
    pub quantity: Option<f64>,
    pub received_quantity: Option<f64>,
    pub po_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub estimated_delivery_date: Option<NaiveDate>,
    pub raw: Vec<String>,
}

/// An ordered set of records under one trimmed header row.
///
/// Tables are values: every pipeline stage builds a fresh one and no stage
/// mutates its input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderTable {
    pub columns: Vec<String>,
    pub records: Vec<OrderRecord>,
}

impl OrderTable {
    pub fn new(columns: Vec<String>, records: Vec<OrderRecord>) -> Self {
        OrderTable { columns, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Distinct sales-order identifiers, sorted; used by the filter prompts.
    pub fn distinct_sales_orders(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.sales_order_no.as_str()))
    }

    pub fn distinct_customers(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.customer_name.as_str()))
    }

    pub fn distinct_suppliers(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.supplier.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = values
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(order: &str, customer: &str, supplier: &str) -> OrderRecord {
        OrderRecord {
            sales_order_no: order.to_string(),
            customer_name: customer.to_string(),
            supplier: supplier.to_string(),
            po_number: String::new(),
            po_total_amount: None,
            invoice_amount: None,
            quantity: None,
            received_quantity: None,
            po_date: None,
            delivery_date: None,
            estimated_delivery_date: None,
            raw: Vec::new(),
        }
    }

    #[test]
    fn distinct_values_are_sorted_and_deduplicated() {
        let table = OrderTable::new(
            vec!["Sales Order No".to_string()],
            vec![
                record("SO-2", "Beta", "Zenith"),
                record("SO-1", "Alpha", "Acme"),
                record("SO-2", "Beta", ""),
            ],
        );
        assert_eq!(table.distinct_sales_orders(), vec!["SO-1", "SO-2"]);
        assert_eq!(table.distinct_customers(), vec!["Alpha", "Beta"]);
        // Empty keys never show up as selectable values.
        assert_eq!(table.distinct_suppliers(), vec!["Acme", "Zenith"]);
    }

    #[test]
    fn column_lookup_is_exact() {
        let table = OrderTable::new(
            vec!["Quantity".to_string(), "Received Quantity".to_string()],
            Vec::new(),
        );
        assert!(table.has_column("Quantity"));
        assert!(!table.has_column("quantity"));
        assert!(!table.has_column("Supplier"));
    }
}
