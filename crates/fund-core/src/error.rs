use thiserror::Error;

/// Failures turning raw file bytes into rows of untyped cells.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Unsupported file type: {0} (expected .xlsx, .xls or .csv)")]
    UnsupportedFileType(String),

    #[error("Spreadsheet has no header row")]
    EmptySheet,

    #[error("Malformed spreadsheet: {0}")]
    Malformed(String),
}

/// Failures turning decoded rows into the typed record set.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Required columns not found: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Column bound more than once: {0}")]
    AmbiguousColumn(String),

    #[error("Spreadsheet has no data rows")]
    EmptyDataset,
}

/// Any failure of a full load attempt, caught at the load boundary and
/// reported as a single status message. Prior state stays untouched.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Build(#[from] BuildError),
}
