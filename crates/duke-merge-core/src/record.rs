//! Spreadsheet records

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::CellValue;

/// One data row of a spreadsheet, addressed by header name.
///
/// Records loaded from the same sheet share one header list.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    index: usize,
    headers: Arc<[String]>,
    values: Vec<CellValue>,
}

impl Record {
    /// Create a record.
    ///
    /// `index` is the 0-based position of the row among the data rows.
    /// Values beyond the header width are dropped; missing trailing values
    /// read as [`CellValue::Empty`].
    pub fn new(
        index: usize,
        headers: impl Into<Arc<[String]>>,
        mut values: Vec<CellValue>,
    ) -> Self {
        let headers = headers.into();
        values.truncate(headers.len());
        Self {
            index,
            headers,
            values,
        }
    }

    /// Position of this record among the data rows (0-based)
    pub fn index(&self) -> usize {
        self.index
    }

    /// Header names, in column order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Check whether the header row has a column with this exact name
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Look up the value of a column by header name
    pub fn get(&self, column: &str) -> Result<&CellValue> {
        static EMPTY: CellValue = CellValue::Empty;

        let col = self
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| Error::MissingField {
                row: self.index,
                column: column.to_string(),
            })?;

        Ok(self.values.get(col).unwrap_or(&EMPTY))
    }

    /// Look up a column and render it as substitution text
    pub fn text(&self, column: &str) -> Result<String> {
        self.get(column).map(|v| v.to_string())
    }

    /// Iterate `(header, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        static EMPTY: CellValue = CellValue::Empty;

        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), self.values.get(i).unwrap_or(&EMPTY)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        vec!["Фамилия ученика".into(), "Имя ученика".into(), "Класс".into()]
    }

    #[test]
    fn test_lookup_by_header() {
        let record = Record::new(
            3,
            headers(),
            vec!["Ivanov".into(), "Petr".into(), 5.0.into()],
        );

        assert_eq!(record.index(), 3);
        assert_eq!(record.text("Имя ученика").unwrap(), "Petr");
        assert_eq!(record.text("Класс").unwrap(), "5");
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let record = Record::new(0, headers(), vec!["Ivanov".into()]);

        match record.get("Классный руководитель") {
            Err(Error::MissingField { row, column }) => {
                assert_eq!(row, 0);
                assert_eq!(column, "Классный руководитель");
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_short_row_reads_as_missing_text() {
        let record = Record::new(1, headers(), vec!["Ivanov".into()]);

        assert_eq!(record.text("Класс").unwrap(), "nan");
        assert_eq!(record.iter().count(), 3);
    }

    #[test]
    fn test_header_lookup_is_exact() {
        let record = Record::new(0, headers(), vec!["Ivanov".into()]);

        assert!(record.has_column("Класс"));
        assert!(!record.has_column("класс"));
        assert!(!record.has_column("Класс "));
    }
}
