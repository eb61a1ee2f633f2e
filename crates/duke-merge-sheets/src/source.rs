//! Format dispatch and the loaded row set

use std::path::Path;
use std::sync::Arc;

use duke_merge_core::{CellValue, Record};

use crate::delimited::{DelimitedOptions, DelimitedReader};
use crate::error::{SheetError, SheetResult};
use crate::xlsx::XlsxRowReader;

/// Rows loaded from one sheet: the header names and the data records in
/// file order
#[derive(Debug, Clone)]
pub struct RowSet {
    headers: Arc<[String]>,
    records: Vec<Record>,
}

impl Default for RowSet {
    fn default() -> Self {
        Self {
            headers: Arc::from(Vec::new()),
            records: Vec::new(),
        }
    }
}

impl RowSet {
    /// Build a row set from dense rows in sheet order.
    ///
    /// The first row holding any value is the header row. Every later row
    /// holding a value becomes a record; blank rows are skipped and do not
    /// consume a record index.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<CellValue>>,
    {
        let mut rows = rows
            .into_iter()
            .filter(|row| row.iter().any(|v| !v.is_empty()));

        let headers: Arc<[String]> = match rows.next() {
            Some(header_row) => header_names(header_row).into(),
            None => return Self::default(),
        };

        let records = rows
            .enumerate()
            .map(|(index, values)| Record::new(index, headers.clone(), values))
            .collect();

        Self { headers, records }
    }

    /// Header names in column order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data records in file order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Header names as written; blank header cells are named `Unnamed: <col>`.
///
/// Only a leading byte-order mark is dropped. Surrounding whitespace stays
/// part of the name, so `"Класс "` and `"Класс"` are different columns.
fn header_names(row: Vec<CellValue>) -> Vec<String> {
    row.into_iter()
        .enumerate()
        .map(|(col, value)| match value {
            CellValue::Empty => format!("Unnamed: {}", col),
            other => {
                let name = other.to_string();
                match name.strip_prefix('\u{feff}') {
                    Some(rest) => rest.to_string(),
                    None => name,
                }
            }
        })
        .collect()
}

/// Load rows from a spreadsheet file, choosing the reader by extension.
///
/// `.xlsx`/`.xlsm` read the first worksheet, `.csv` and `.tsv` read
/// delimited text.
pub fn load<P: AsRef<Path>>(path: P) -> SheetResult<RowSet> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    tracing::debug!(path = %path.display(), "loading rows");

    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => XlsxRowReader::read_file(path),
        Some("csv") => DelimitedReader::read_file(path, &DelimitedOptions::default()),
        Some("tsv") => DelimitedReader::read_file(path, &DelimitedOptions::tab_separated()),
        _ => Err(SheetError::UnsupportedFormat(path.display().to_string())),
    }
}
