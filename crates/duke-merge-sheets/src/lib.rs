//! # duke-merge-sheets
//!
//! Loads spreadsheet rows as [`Record`]s. The first sheet of an XLSX
//! workbook, or a CSV/TSV file, is read; its first non-empty row is the
//! header.
//!
//! ```rust,no_run
//! let rows = duke_merge_sheets::load("pupils.xlsx").unwrap();
//! for record in rows.records() {
//!     println!("{}: {}", record.index(), record.text("Имя ученика").unwrap());
//! }
//! ```

pub mod address;
pub mod date;
pub mod delimited;
pub mod error;
pub mod source;
pub mod styles;
pub mod xlsx;

pub use delimited::{DelimitedOptions, DelimitedReader};
pub use error::{SheetError, SheetResult};
pub use source::{load, RowSet};
pub use xlsx::XlsxRowReader;

pub use duke_merge_core::{CellValue, Record};
