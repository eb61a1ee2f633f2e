//! # duke-merge
//!
//! Fills a Word template once per spreadsheet row.
//!
//! For every record the template is loaded fresh, each bound placeholder
//! token is replaced with the record's value, and the result is saved as
//! `<prefix>_<last name>_<first name>_<row index>.docx` in the output
//! directory, optionally followed by a PDF with the same stem.
//!
//! ## Example
//!
//! ```rust,no_run
//! use duke_merge::{GenerateRequest, Generator, MergeConfig};
//!
//! let request = GenerateRequest {
//!     spreadsheet: "pupils.xlsx".into(),
//!     template: "certificate.docx".into(),
//!     output_dir: "out".into(),
//!     convert_to_pdf: false,
//! };
//!
//! let report = Generator::new(MergeConfig::default()).generate(&request).unwrap();
//! println!("{} documents written", report.len());
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod generate;
pub mod naming;

pub use config::{ConfigError, ConversionConfig, MergeConfig, OutputConfig};
pub use convert::{ConvertError, DocumentConverter, LibreOfficeConverter};
pub use error::{MergeError, MergeResult};
pub use generate::{GenerateRequest, GeneratedDocument, GenerationReport, Generator};

pub use duke_merge_core::{Bindings, CellValue, FieldBinding, Record};
pub use duke_merge_docx::Document;
pub use duke_merge_sheets::{load as load_rows, RowSet};
