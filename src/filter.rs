//! Equality-membership filtering over the normalized table.

use std::collections::HashSet;

use crate::types::{OrderRecord, OrderTable};

/// Accepted-value sets for the three filterable attributes. An empty set
/// imposes no restriction on its attribute, so the default spec accepts
/// every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub sales_orders: HashSet<String>,
    pub customers: HashSet<String>,
    pub suppliers: HashSet<String>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.sales_orders.is_empty() && self.customers.is_empty() && self.suppliers.is_empty()
    }

    pub fn matches(&self, record: &OrderRecord) -> bool {
        accepts(&self.sales_orders, &record.sales_order_no)
            && accepts(&self.customers, &record.customer_name)
            && accepts(&self.suppliers, &record.supplier)
    }
}

fn accepts(set: &HashSet<String>, value: &str) -> bool {
    set.is_empty() || set.contains(value)
}

/// Parse a comma-separated accepted-value list. CSV quoting applies, so a
/// value containing a comma stays whole when wrapped in double quotes
/// (`"Acme, Inc.",Zenith`). Blank entries are dropped; empty input yields
/// the no-restriction set.
pub fn parse_accepted_values(input: &str) -> HashSet<String> {
    let mut values = HashSet::new();
    if input.trim().is_empty() {
        return values;
    }
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(input.as_bytes());
    for record in rdr.records().flatten() {
        for field in record.iter() {
            let field = field.trim();
            if !field.is_empty() {
                values.insert(field.to_string());
            }
        }
    }
    values
}

/// Pure subset selection: records matching every non-empty accepted-value
/// set, under the same header. The input table is untouched.
pub fn apply(table: &OrderTable, spec: &FilterSpec) -> OrderTable {
    OrderTable::new(
        table.columns.clone(),
        table
            .records
            .iter()
            .filter(|r| spec.matches(r))
            .cloned()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_csv_reader;

    const CSV: &str = "\
Sales Order No,Customer Name,Supplier,PO Number,PO Total Amount (EGP),Invoice Amount,Quantity,Received Quantity,PO Date,Delivery Date,Estimated Delivery Date
SO-1,Alpha,Acme,PO-1,100,90,10,10,2024-01-02,2024-01-20,2024-01-25
SO-2,Beta,Zenith,PO-2,200,180,5,5,2024-01-03,2024-01-21,2024-01-26
SO-3,Alpha,Zenith,PO-3,300,270,7,7,2024-01-04,2024-01-22,2024-01-27
SO-4,Gamma,Acme,PO-4,400,360,2,2,2024-01-05,2024-01-23,2024-01-28
";

    fn table() -> OrderTable {
        load_csv_reader(CSV.as_bytes()).unwrap().0
    }

    fn set(values: &[&str]) -> HashSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn empty_spec_returns_the_full_table() {
        let table = table();
        let filtered = apply(&table, &FilterSpec::default());
        assert_eq!(filtered, table);
    }

    #[test]
    fn only_the_default_spec_is_empty() {
        assert!(FilterSpec::default().is_empty());
        let spec = FilterSpec {
            suppliers: set(&["Acme"]),
            ..FilterSpec::default()
        };
        assert!(!spec.is_empty());
    }

    #[test]
    fn value_lists_split_on_commas_and_trim() {
        let values = parse_accepted_values(" Alpha , Beta ,, ");
        assert_eq!(values, set(&["Alpha", "Beta"]));
    }

    #[test]
    fn quoted_values_keep_their_commas() {
        let values = parse_accepted_values("\"Acme, Inc.\",Zenith");
        assert_eq!(values, set(&["Acme, Inc.", "Zenith"]));
    }

    #[test]
    fn blank_value_lists_impose_no_restriction() {
        assert!(parse_accepted_values("").is_empty());
        assert!(parse_accepted_values("   ").is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let table = table();
        let spec = FilterSpec {
            customers: set(&["Alpha"]),
            ..FilterSpec::default()
        };
        let once = apply(&table, &spec);
        let twice = apply(&once, &spec);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn sets_combine_conjunctively() {
        let table = table();
        let spec = FilterSpec {
            customers: set(&["Alpha"]),
            suppliers: set(&["Zenith"]),
            ..FilterSpec::default()
        };
        let filtered = apply(&table, &spec);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.records[0].sales_order_no, "SO-3");
    }

    #[test]
    fn a_set_accepts_any_of_its_members() {
        let table = table();
        let spec = FilterSpec {
            sales_orders: set(&["SO-1", "SO-4"]),
            ..FilterSpec::default()
        };
        let filtered = apply(&table, &spec);
        let orders: Vec<&str> = filtered
            .records
            .iter()
            .map(|r| r.sales_order_no.as_str())
            .collect();
        assert_eq!(orders, vec!["SO-1", "SO-4"]);
    }

    #[test]
    fn unmatched_values_yield_an_empty_table() {
        let table = table();
        let spec = FilterSpec {
            suppliers: set(&["Nobody"]),
            ..FilterSpec::default()
        };
        let filtered = apply(&table, &spec);
        assert!(filtered.is_empty());
        assert_eq!(filtered.columns, table.columns);
    }
}
