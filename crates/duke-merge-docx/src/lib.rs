//! # duke-merge-docx
//!
//! Word (`.docx`) template handling for duke-merge.
//!
//! A [`Document`] keeps every part of the package as-is and parses only the
//! main document part into an [`XmlElement`] tree. Placeholder substitution
//! works on whole paragraphs, so a token split across several runs is still
//! found; a changed paragraph collapses to a single run carrying the
//! formatting of its first run.
//!
//! ```rust,no_run
//! use duke_merge_docx::fill;
//!
//! let replacements = vec![("{{Имя}}".to_string(), "Petr".to_string())];
//! let document = fill("template.docx", &replacements).unwrap();
//! document.save("Petr.docx").unwrap();
//! ```

pub mod error;
pub mod fill;
pub mod format;
pub mod package;
pub mod paragraph;
pub mod xml;

pub use error::{DocxError, DocxResult};
pub use fill::{fill, fill_document, replace_in_paragraph, FillStats};
pub use format::{RgbColor, RunFormat, Underline};
pub use package::Document;
pub use paragraph::Paragraph;
pub use xml::{XmlElement, XmlNode};
