//! CSV/TSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use duke_merge_core::CellValue;

use crate::error::SheetResult;
use crate::source::RowSet;

/// Options for reading delimited text
#[derive(Debug, Clone)]
pub struct DelimitedOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl DelimitedOptions {
    /// Options for tab-separated files
    pub fn tab_separated() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::default()
        }
    }
}

/// Delimited text reader. Every field is read as text; empty fields are
/// [`CellValue::Empty`].
pub struct DelimitedReader;

impl DelimitedReader {
    /// Read rows from a file
    pub fn read_file<P: AsRef<Path>>(path: P, options: &DelimitedOptions) -> SheetResult<RowSet> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read rows from a reader
    pub fn read<R: Read>(reader: R, options: &DelimitedOptions) -> SheetResult<RowSet> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows: Vec<Vec<CellValue>> = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(Self::field_value).collect());
        }

        Ok(RowSet::from_rows(rows))
    }

    fn field_value(field: &str) -> CellValue {
        if field.is_empty() {
            CellValue::Empty
        } else {
            CellValue::from(field)
        }
    }
}
