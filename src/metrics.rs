//! Derived metrics over the filtered table.
//!
//! Every computation here takes the table it is given and returns fresh
//! values; an empty table yields empty or zero-valued results. The only hard
//! failure is the reconciliation column guard.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::PipelineError;
use crate::schema::{Column, CURRENCY};
use crate::types::{OrderRecord, OrderTable};
use crate::util::format_number;

/// Delayed-shipment count above which the caller must surface the
/// critical-delay warning.
pub const CRITICAL_DELAY_LIMIT: usize = 5;

/// Ranking depth for the top-supplier and top-customer views.
pub const TOP_N: usize = 5;

/// Result of the threshold-based delay scan.
#[derive(Debug, Clone)]
pub struct DelayAnalysis {
    pub threshold_days: i64,
    pub shipments: Vec<OrderRecord>,
}

impl DelayAnalysis {
    pub fn count(&self) -> usize {
        self.shipments.len()
    }

    /// True when more than [`CRITICAL_DELAY_LIMIT`] shipments matched.
    pub fn is_critical(&self) -> bool {
        self.shipments.len() > CRITICAL_DELAY_LIMIT
    }
}

/// Records whose estimated delivery date runs more than `threshold_days`
/// whole days past the actual delivery date. Records with either date
/// unparseable never match.
pub fn delayed_shipments(table: &OrderTable, threshold_days: i64) -> DelayAnalysis {
    let shipments = table
        .records
        .iter()
        .filter(|r| match (r.estimated_delivery_date, r.delivery_date) {
            (Some(estimated), Some(actual)) => (estimated - actual).num_days() > threshold_days,
            _ => false,
        })
        .cloned()
        .collect();
    DelayAnalysis {
        threshold_days,
        shipments,
    }
}

/// Per-supplier aggregate. `total_orders` counts distinct PO numbers; the
/// delivery counts classify each record against its own estimated date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierKpi {
    #[serde(rename = "Supplier")]
    pub supplier: String,
    pub total_orders: usize,
    pub total_procurement: f64,
    pub on_time_deliveries: usize,
    pub delayed_deliveries: usize,
    #[serde(rename = "On-Time Delivery Rate (%)")]
    pub on_time_rate: f64,
}

/// Group the table by supplier name and derive the KPI row for each group,
/// sorted by supplier name. Records with an empty supplier are skipped.
pub fn supplier_performance(table: &OrderTable) -> Vec<SupplierKpi> {
    #[derive(Default)]
    struct Acc {
        po_numbers: HashSet<String>,
        total_procurement: f64,
        on_time: usize,
        delayed: usize,
    }

    let mut map: HashMap<String, Acc> = HashMap::new();
    for r in &table.records {
        if r.supplier.is_empty() {
            continue;
        }
        let e = map.entry(r.supplier.clone()).or_default();
        if !r.po_number.is_empty() {
            e.po_numbers.insert(r.po_number.clone());
        }
        if let Some(amount) = r.po_total_amount {
            e.total_procurement += amount;
        }
        // A record joins the on-time/delayed counts only when both of its
        // own dates parsed; there is no cross-record alignment.
        if let (Some(delivery), Some(estimated)) = (r.delivery_date, r.estimated_delivery_date) {
            if delivery <= estimated {
                e.on_time += 1;
            } else {
                e.delayed += 1;
            }
        }
    }

    let mut kpis: Vec<SupplierKpi> = map
        .into_iter()
        .map(|(supplier, acc)| {
            let total_orders = acc.po_numbers.len();
            let on_time_rate = if total_orders == 0 {
                0.0
            } else {
                // Distinct POs form the denominator, so several on-time
                // lines on one PO can push the raw quotient past 100;
                // the rate stays within [0, 100].
                ((acc.on_time as f64 / total_orders as f64) * 100.0).min(100.0)
            };
            SupplierKpi {
                supplier,
                total_orders,
                total_procurement: acc.total_procurement,
                on_time_deliveries: acc.on_time,
                delayed_deliveries: acc.delayed,
                on_time_rate,
            }
        })
        .collect();
    kpis.sort_by(|a, b| a.supplier.cmp(&b.supplier));
    kpis
}

/// One entry of a top-N ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub name: String,
    pub amount: f64,
}

/// Top suppliers by total procurement amount, from the KPI rows.
pub fn top_suppliers(kpis: &[SupplierKpi]) -> Vec<RankedEntry> {
    rank_desc(kpis.iter().map(|k| (k.supplier.clone(), k.total_procurement)))
}

/// Top customers by summed PO total amount. Records with an empty customer
/// name are skipped; customers whose amounts are all missing rank at zero.
pub fn top_customers(table: &OrderTable) -> Vec<RankedEntry> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for r in &table.records {
        if r.customer_name.is_empty() {
            continue;
        }
        let entry = totals.entry(r.customer_name.clone()).or_insert(0.0);
        if let Some(amount) = r.po_total_amount {
            *entry += amount;
        }
    }
    rank_desc(totals.into_iter())
}

/// Largest-first by amount; ties fall back to name order so rankings are
/// reproducible run to run.
fn rank_desc(entries: impl Iterator<Item = (String, f64)>) -> Vec<RankedEntry> {
    let mut ranked: Vec<RankedEntry> = entries
        .map(|(name, amount)| RankedEntry { name, amount })
        .collect();
    ranked.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(TOP_N);
    ranked
}

/// Per-PO quantity reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationRow {
    #[serde(rename = "PO Number")]
    pub po_number: String,
    pub total_quantity: f64,
    pub total_received: f64,
    #[serde(rename = "Difference")]
    pub difference: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationReport {
    pub rows: Vec<ReconciliationRow>,
}

impl ReconciliationReport {
    /// POs whose ordered and received quantities disagree.
    pub fn mismatches(&self) -> Vec<ReconciliationRow> {
        self.rows
            .iter()
            .filter(|r| r.difference != 0.0)
            .cloned()
            .collect()
    }
}

/// Group by PO number and compare summed ordered quantity against summed
/// received quantity. Fails up front when the table lacks the quantity
/// columns; the other metrics are unaffected by that condition.
pub fn reconciliation(table: &OrderTable) -> Result<ReconciliationReport, PipelineError> {
    let missing: Vec<String> = [Column::Quantity, Column::ReceivedQuantity]
        .iter()
        .filter(|c| !table.has_column(c.name()))
        .map(|c| c.name().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::ReconciliationColumns { missing });
    }

    #[derive(Default)]
    struct Acc {
        total_quantity: f64,
        total_received: f64,
    }

    let mut map: HashMap<String, Acc> = HashMap::new();
    for r in &table.records {
        if r.po_number.is_empty() {
            continue;
        }
        let e = map.entry(r.po_number.clone()).or_default();
        if let Some(q) = r.quantity {
            e.total_quantity += q;
        }
        if let Some(q) = r.received_quantity {
            e.total_received += q;
        }
    }

    let mut rows: Vec<ReconciliationRow> = map
        .into_iter()
        .map(|(po_number, acc)| ReconciliationRow {
            po_number,
            total_quantity: acc.total_quantity,
            total_received: acc.total_received,
            difference: acc.total_quantity - acc.total_received,
        })
        .collect();
    rows.sort_by(|a, b| a.po_number.cmp(&b.po_number));
    Ok(ReconciliationReport { rows })
}

/// The three scalar figures shown as summary cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_sales_orders: usize,
    pub total_po_amount: f64,
    pub delayed_shipments: usize,
}

impl SummaryMetrics {
    /// `1,234,567.89 EGP` style rendering of the amount card.
    pub fn total_po_amount_display(&self) -> String {
        format!("{} {}", format_number(self.total_po_amount, 2), CURRENCY)
    }
}

/// Distinct sales-order count, summed PO amount, and the count of records
/// delivered after their estimated date (unparseable dates never count as
/// late).
pub fn summary(table: &OrderTable) -> SummaryMetrics {
    let orders: HashSet<&str> = table
        .records
        .iter()
        .map(|r| r.sales_order_no.as_str())
        .collect();
    let total_po_amount = table.records.iter().filter_map(|r| r.po_total_amount).sum();
    let delayed_shipments = table
        .records
        .iter()
        .filter(|r| {
            matches!(
                (r.delivery_date, r.estimated_delivery_date),
                (Some(delivery), Some(estimated)) if delivery > estimated
            )
        })
        .count();
    SummaryMetrics {
        total_sales_orders: orders.len(),
        total_po_amount,
        delayed_shipments,
    }
}
