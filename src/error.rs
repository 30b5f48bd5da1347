use thiserror::Error;

/// Failure conditions of the ingest/metrics pipeline.
///
/// Bad individual cells are never errors: an unparseable date or amount is
/// downgraded to a missing value and counted in the load diagnostics. Only
/// structural problems (absent columns, unreadable containers) surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// One or more required columns are absent from the uploaded table.
    /// Every missing name is reported together; nothing downstream runs.
    #[error("Missing columns in the uploaded file: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// The quantity columns needed by the receipts-vs-invoice comparison are
    /// absent. Only that sub-computation is skipped; the rest of the
    /// dashboard proceeds.
    #[error("The required columns for Receipts vs. Invoice Comparison are missing: {}", missing.join(", "))]
    ReconciliationColumns { missing: Vec<String> },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Spreadsheet(#[from] calamine::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
