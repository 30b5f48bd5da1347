// Entry point and interactive console flow.
//
// - Option [1] loads a CSV/Excel data file, printing load diagnostics.
// - Options [2] and [3] adjust the filter sets and the delay threshold.
// - Option [4] re-runs the whole pipeline on the session table and renders
//   the dashboard sections.
// - Option [5] writes the export artifacts for the current filtered view.
//
// `--batch` runs load, dashboard, and export once without the menu. All
// state lives in a `Session` value owned by `main`; nothing survives the
// process.

use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use scm_dashboard::filter::{self, FilterSpec};
use scm_dashboard::loader::{self, LoadReport};
use scm_dashboard::metrics;
use scm_dashboard::output;
use scm_dashboard::types::OrderTable;
use scm_dashboard::util;

/// Rows shown by each console preview; exports always carry the full data.
const PREVIEW_ROWS: usize = 10;

/// Console procurement-analytics dashboard over CSV/Excel order exports.
#[derive(Debug, Parser)]
#[command(name = "scm_dashboard", version, about)]
struct Args {
    /// Data file to load on startup (CSV or Excel workbook).
    #[arg(long)]
    file: Option<PathBuf>,

    /// Shipment-delay threshold in days.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(i64).range(0..=90))]
    delay_threshold: i64,

    /// Directory receiving the export artifacts.
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// Load the file, render the dashboard once, export, and exit.
    #[arg(long, requires = "file")]
    batch: bool,
}

/// Per-run state. Each load replaces the table wholesale and clears the
/// filters; the threshold and export directory persist for the session.
struct Session {
    table: Option<OrderTable>,
    filters: FilterSpec,
    delay_threshold: i64,
    export_dir: PathBuf,
}

/// Read a single line of input after printing the given prompt.
fn read_line(prompt: &str) -> String {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    read_line("Enter choice: ")
}

fn print_load_notes(report: &LoadReport) {
    if report.summary_rows > 0 || report.missing_order_no > 0 {
        println!(
            "Note: dropped {} summary rows and {} rows without a sales-order id.",
            util::format_int(report.summary_rows),
            util::format_int(report.missing_order_no)
        );
    }
    if report.unparseable_dates > 0 {
        println!(
            "Note: {} date cells could not be parsed and were left blank.",
            util::format_int(report.unparseable_dates)
        );
    }
    if report.read_errors > 0 {
        println!(
            "Note: {} rows could not be read and were skipped.",
            util::format_int(report.read_errors)
        );
    }
}

/// Handle option [1]: load a data file into the session.
///
/// On success the previous table and its filters are discarded; value-based
/// filters from one upload are meaningless against the next.
fn handle_load(session: &mut Session, path: Option<&Path>) {
    let path: PathBuf = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let input = read_line("Data file path (CSV or Excel): ");
            if input.is_empty() {
                println!("No file given.\n");
                return;
            }
            PathBuf::from(input)
        }
    };
    match loader::load_table(&path) {
        Ok((table, report)) => {
            info!(
                "loaded {}: {} rows read, {} kept",
                path.display(),
                report.total_rows,
                report.kept_rows
            );
            println!(
                "Processing {}... ({} rows read, {} kept)",
                path.display(),
                util::format_int(report.total_rows),
                util::format_int(report.kept_rows)
            );
            print_load_notes(&report);
            println!();
            session.table = Some(table);
            session.filters = FilterSpec::default();
        }
        Err(e) => {
            error!("failed to load {}: {e}", path.display());
            eprintln!("Failed to load file: {e}\n");
        }
    }
}

/// Show the distinct values of one attribute and read a comma-separated
/// accepted-value set. Values containing a comma can be wrapped in double
/// quotes; empty input clears the restriction.
fn prompt_values(attribute: &str, available: &[String]) -> HashSet<String> {
    const SHOWN: usize = 8;
    let preview: Vec<&str> = available.iter().take(SHOWN).map(String::as_str).collect();
    let suffix = if available.len() > SHOWN { ", ..." } else { "" };
    println!("{} values: {}{}", attribute, preview.join(", "), suffix);
    filter::parse_accepted_values(&read_line(&format!("{attribute} filter: ")))
}

/// Handle option [2]: rebuild the three accepted-value sets.
fn handle_filters(session: &mut Session) {
    let Some(table) = session.table.as_ref() else {
        println!("Error: No data loaded. Please load a data file first (option 1).\n");
        return;
    };
    println!(
        "Comma-separated values; wrap a value containing a comma in double \
         quotes (\"Acme, Inc.\"). Empty input clears the restriction.\n"
    );
    session.filters.sales_orders = prompt_values("Sales Order No", &table.distinct_sales_orders());
    session.filters.customers = prompt_values("Customer Name", &table.distinct_customers());
    session.filters.suppliers = prompt_values("Supplier", &table.distinct_suppliers());

    let matching = filter::apply(table, &session.filters).len();
    println!(
        "Filters set. {} of {} records currently match.\n",
        util::format_int(matching),
        util::format_int(table.len())
    );
}

/// Handle option [3]: set the delay threshold, validated to 0-90 days.
fn handle_threshold(session: &mut Session) {
    let input = read_line("Delay threshold in days (0-90): ");
    match input.parse::<i64>() {
        Ok(days) if (0..=90).contains(&days) => {
            session.delay_threshold = days;
            println!("Delay threshold set to {days} days.\n");
        }
        _ => println!("Invalid threshold. Please enter a whole number between 0 and 90.\n"),
    }
}

/// Handle option [4]: re-run the pipeline and render every section.
fn handle_dashboard(session: &Session) {
    let Some(table) = session.table.as_ref() else {
        println!("Error: No data loaded. Please load a data file first (option 1).\n");
        return;
    };
    let filtered = filter::apply(table, &session.filters);
    println!("\n{}", "=".repeat(75));
    println!("                SUPPLY CHAIN PROCUREMENT DASHBOARD");
    println!("{}\n", "=".repeat(75));
    if session.filters.is_empty() {
        println!(
            "No filters active; showing all {} records.\n",
            util::format_int(table.len())
        );
    } else {
        println!(
            "{} of {} records match the current filters.\n",
            util::format_int(filtered.len()),
            util::format_int(table.len())
        );
    }
    render_dashboard(&filtered, session.delay_threshold);
}

/// Render every dashboard section for an already-filtered table.
fn render_dashboard(filtered: &OrderTable, threshold_days: i64) {
    println!("FILTERED DATA");
    println!("{}", "-".repeat(60));
    output::preview_orders(&filtered.records, PREVIEW_ROWS);

    let delays = metrics::delayed_shipments(filtered, threshold_days);
    println!("DELAYED SHIPMENTS (more than {} days)", delays.threshold_days);
    println!("{}", "-".repeat(60));
    if delays.is_critical() {
        println!(
            "ALERT: More than {} delayed shipments detected!",
            metrics::CRITICAL_DELAY_LIMIT
        );
    }
    println!(
        "{} delayed shipments.\n",
        util::format_int(delays.count())
    );
    output::preview_orders(&delays.shipments, PREVIEW_ROWS);

    println!("SUPPLIER PERFORMANCE");
    println!("{}", "-".repeat(60));
    let kpis = metrics::supplier_performance(filtered);
    output::preview_kpis(&kpis, PREVIEW_ROWS);

    println!("ON-TIME DELIVERY RATE BY SUPPLIER");
    println!("{}", "-".repeat(60));
    output::render_rate_chart(&kpis);

    println!("TOP 5 SUPPLIERS BY PROCUREMENT VALUE");
    println!("{}", "-".repeat(60));
    output::render_amount_chart(&metrics::top_suppliers(&kpis));

    println!("TOP 5 CUSTOMERS BY ORDER VALUE");
    println!("{}", "-".repeat(60));
    output::render_amount_chart(&metrics::top_customers(filtered));

    println!("RECEIPTS VS. INVOICE COMPARISON");
    println!("{}", "-".repeat(60));
    match metrics::reconciliation(filtered) {
        Ok(report) => {
            output::preview_reconciliation(&report.rows, PREVIEW_ROWS);
            let mismatches = report.mismatches();
            if mismatches.is_empty() {
                println!("All purchase orders reconcile.\n");
            } else {
                println!("MISMATCHED PURCHASE ORDERS");
                println!("{}", "-".repeat(60));
                output::preview_reconciliation(&mismatches, PREVIEW_ROWS);
            }
        }
        Err(e) => println!("{e}\n"),
    }

    let summary = metrics::summary(filtered);
    println!("SUMMARY");
    println!("{}", "-".repeat(60));
    println!(
        "  Total Sales Orders:  {}",
        util::format_int(summary.total_sales_orders)
    );
    println!("  Total PO Amount:     {}", summary.total_po_amount_display());
    println!(
        "  Delayed Shipments:   {}",
        util::format_int(summary.delayed_shipments)
    );
    println!();
}

/// Write the three export artifacts for the filtered view.
fn export_artifacts(filtered: &OrderTable, export_dir: &Path) -> Result<(), scm_dashboard::PipelineError> {
    let filtered_path = export_dir.join("filtered_data.csv");
    output::write_filtered_csv(&filtered_path, filtered)?;
    println!("Exported {}", filtered_path.display());

    let kpis = metrics::supplier_performance(filtered);
    let kpi_path = export_dir.join("supplier_performance.csv");
    output::write_csv(&kpi_path, &kpis)?;
    println!("Exported {}", kpi_path.display());

    let summary = metrics::summary(filtered);
    let summary_path = export_dir.join("summary.json");
    output::write_json(&summary_path, &summary)?;
    println!("Exported {}", summary_path.display());
    Ok(())
}

/// Handle option [5]: export the current filtered view.
fn handle_export(session: &Session) {
    let Some(table) = session.table.as_ref() else {
        println!("Error: No data loaded. Please load a data file first (option 1).\n");
        return;
    };
    let filtered = filter::apply(table, &session.filters);
    match export_artifacts(&filtered, &session.export_dir) {
        Ok(()) => println!(),
        Err(e) => eprintln!("Export failed: {e}\n"),
    }
}

/// `--batch`: one unfiltered pipeline run, then exit. Hard errors propagate
/// and exit nonzero.
fn run_batch(args: &Args) -> anyhow::Result<()> {
    let path = args.file.as_deref().context("--batch requires --file")?;
    let (table, report) = loader::load_table(path)
        .with_context(|| format!("loading {}", path.display()))?;
    info!(
        "loaded {}: {} rows read, {} kept",
        path.display(),
        report.total_rows,
        report.kept_rows
    );
    println!(
        "Processing {}... ({} rows read, {} kept)",
        path.display(),
        util::format_int(report.total_rows),
        util::format_int(report.kept_rows)
    );
    print_load_notes(&report);
    println!();

    render_dashboard(&table, args.delay_threshold);
    export_artifacts(&table, &args.export_dir)
        .with_context(|| format!("exporting to {}", args.export_dir.display()))?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if args.batch {
        return run_batch(&args);
    }

    let mut session = Session {
        table: None,
        filters: FilterSpec::default(),
        delay_threshold: args.delay_threshold,
        export_dir: args.export_dir.clone(),
    };
    if args.file.is_some() {
        handle_load(&mut session, args.file.as_deref());
    }

    loop {
        println!("Supply Chain Procurement Dashboard");
        println!("[1] Load data file");
        println!("[2] Set filters");
        println!(
            "[3] Set delay threshold (current: {} days)",
            session.delay_threshold
        );
        println!("[4] Show dashboard");
        println!("[5] Export reports");
        println!("[6] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(&mut session, None),
            "2" => handle_filters(&mut session),
            "3" => handle_threshold(&mut session),
            "4" => handle_dashboard(&session),
            "5" => handle_export(&session),
            "6" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter a number from 1 to 6.\n"),
        }
    }
    Ok(())
}
