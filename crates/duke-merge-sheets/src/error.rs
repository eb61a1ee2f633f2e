//! Row source error types

use thiserror::Error;

/// Result type for row source operations
pub type SheetResult<T> = std::result::Result<T, SheetError>;

/// Errors that can occur while loading spreadsheet rows
#[derive(Debug, Error)]
pub enum SheetError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid file format
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// File extension not handled by any reader
    #[error("Unsupported spreadsheet format: {0}")]
    UnsupportedFormat(String),
}
