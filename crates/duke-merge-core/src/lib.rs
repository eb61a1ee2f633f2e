//! # duke-merge-core
//!
//! Core data structures shared by the duke-merge crates.
//!
//! - [`CellValue`] - A single value read from a spreadsheet cell
//! - [`Record`] - One data row, addressed by header name
//! - [`FieldBinding`] and [`Bindings`] - Which placeholder token is filled from which column
//!
//! ## Example
//!
//! ```rust
//! use duke_merge_core::{Bindings, CellValue, Record};
//!
//! let headers = vec!["Фамилия ученика".to_string(), "Имя ученика".to_string()];
//! let record = Record::new(
//!     0,
//!     headers,
//!     vec![CellValue::from("Ivanov"), CellValue::from("Petr")],
//! );
//!
//! let bindings = Bindings::from_pairs([("{{Фамилия}}", "Фамилия ученика")]);
//! let replacements = bindings.resolve(&record).unwrap();
//! assert_eq!(replacements[0], ("{{Фамилия}}".to_string(), "Ivanov".to_string()));
//! ```

pub mod binding;
pub mod error;
pub mod record;
pub mod value;

pub use binding::{Bindings, FieldBinding};
pub use error::{Error, Result};
pub use record::Record;
pub use value::CellValue;

/// Text rendered for a cell that has no value
pub const MISSING_TEXT: &str = "nan";
