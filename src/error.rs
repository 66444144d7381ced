use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads, cleans, or writes a spreadsheet.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the statistics file cannot be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Errors bubbled up from the CSV reader.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when a text pattern used by a cleanup step fails to compile.
    #[error("pattern error: {0}")]
    Pattern(String),

    /// Raised when the workbook holds no worksheet at all.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the requested worksheet does not exist.
    #[error("worksheet '{0}' not found")]
    MissingSheet(String),

    /// Raised when the input extension is not a spreadsheet or CSV file.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
