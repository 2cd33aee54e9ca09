use thiserror::Error;

/// Fatal stream errors: the whole task fails before or during processing
/// and no further rows are consumed. Row-level problems are not errors of
/// this type, they travel as [`RowError`] values inside the row stream.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV file is empty")]
    EmptyFile,

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A per-row failure: counted, logged and skipped, never aborts the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line in the file, header included
    pub line: u64,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row {}: {}", self.line, self.message)
    }
}
