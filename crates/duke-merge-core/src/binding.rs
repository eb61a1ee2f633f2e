//! Placeholder token to column bindings

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::record::Record;

/// Binds one placeholder token to the spreadsheet column that fills it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldBinding {
    /// Literal text searched for in the template, e.g. `{{Имя}}`
    pub token: String,
    /// Header name of the column holding the replacement value
    pub column: String,
}

impl FieldBinding {
    pub fn new<T: Into<String>, C: Into<String>>(token: T, column: C) -> Self {
        Self {
            token: token.into(),
            column: column.into(),
        }
    }
}

/// Ordered list of field bindings.
///
/// Replacement happens in list order, so when one token is contained in
/// another the outcome depends on that order. See [`Bindings::overlapping_tokens`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Bindings(Vec<FieldBinding>);

impl Default for Bindings {
    fn default() -> Self {
        Self::from_pairs([
            ("{{Фамилия}}", "Фамилия ученика"),
            ("{{Имя}}", "Имя ученика"),
            ("{{Класс}}", "Класс"),
            ("{{Кл.рук}}", "Классный руководитель"),
        ])
    }
}

impl Bindings {
    /// Build bindings from `(token, column)` pairs
    pub fn from_pairs<I, T, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, C)>,
        T: Into<String>,
        C: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(token, column)| FieldBinding::new(token, column))
                .collect(),
        )
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldBinding> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject bindings that could never match or are ambiguous
    pub fn validate(&self) -> Result<()> {
        for (i, binding) in self.0.iter().enumerate() {
            if binding.token.is_empty() {
                return Err(Error::InvalidBinding(format!(
                    "binding for column '{}' has an empty token",
                    binding.column
                )));
            }
            if self.0[..i].iter().any(|b| b.token == binding.token) {
                return Err(Error::InvalidBinding(format!(
                    "token '{}' is bound more than once",
                    binding.token
                )));
            }
        }
        Ok(())
    }

    /// Token pairs `(inner, outer)` where `inner` is a substring of `outer`.
    ///
    /// Such pairs are not safe under plain substring replacement.
    pub fn overlapping_tokens(&self) -> Vec<(&str, &str)> {
        let mut overlaps = Vec::new();
        for a in &self.0 {
            for b in &self.0 {
                if a.token != b.token && b.token.contains(a.token.as_str()) {
                    overlaps.push((a.token.as_str(), b.token.as_str()));
                }
            }
        }
        overlaps
    }

    /// Resolve every binding against a record, producing ordered
    /// `(token, replacement text)` pairs.
    pub fn resolve(&self, record: &Record) -> Result<Vec<(String, String)>> {
        self.0
            .iter()
            .map(|b| Ok((b.token.clone(), record.text(&b.column)?)))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Bindings {
    type Item = &'a FieldBinding;
    type IntoIter = std::slice::Iter<'a, FieldBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
