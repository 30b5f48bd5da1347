//! Procurement analytics over sales/purchase-order exports.
//!
//! The pipeline is a chain of pure stages: load a CSV or Excel export into an
//! [`types::OrderTable`] (validating the schema up front), restrict it with a
//! [`filter::FilterSpec`], then derive shipment-delay flags, supplier KPIs,
//! top-N rankings, quantity reconciliation, and summary scalars from the
//! filtered table. [`output`] renders previews and charts to the console and
//! writes the CSV/JSON artifacts.

pub mod error;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod schema;
pub mod types;
pub mod util;

pub use error::PipelineError;
pub use filter::FilterSpec;
pub use loader::{load_table, LoadReport};
pub use metrics::{SummaryMetrics, SupplierKpi};
pub use types::{OrderRecord, OrderTable};
