//! Error types for document generation

use std::path::PathBuf;

use thiserror::Error;

use crate::convert::ConvertError;

/// Result type for generation
pub type MergeResult<T> = std::result::Result<T, MergeError>;

/// Errors that abort a generation run
#[derive(Debug, Error)]
pub enum MergeError {
    /// Output directory could not be created
    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Spreadsheet could not be loaded
    #[error("Failed to load rows from {}: {source}", path.display())]
    Rows {
        path: PathBuf,
        source: duke_merge_sheets::SheetError,
    },

    /// A bound or naming column is missing from the header row
    #[error(transparent)]
    Field(#[from] duke_merge_core::Error),

    /// Template could not be loaded
    #[error("Failed to load template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        source: duke_merge_docx::DocxError,
    },

    /// Filled document could not be written
    #[error("Failed to save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        source: duke_merge_docx::DocxError,
    },

    /// PDF conversion failed
    #[error("PDF conversion failed: {0}")]
    Conversion(#[from] ConvertError),
}
