//! Error types for duke-merge-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in duke-merge-core
#[derive(Debug, Error)]
pub enum Error {
    /// A record was asked for a column its header row does not have
    #[error("Row {row}: column not found: '{column}'")]
    MissingField { row: usize, column: String },

    /// A binding list that cannot be used
    #[error("Invalid binding: {0}")]
    InvalidBinding(String),
}
