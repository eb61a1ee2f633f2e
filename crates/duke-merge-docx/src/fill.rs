//! Placeholder substitution

use std::path::Path;

use crate::error::DocxResult;
use crate::package::Document;
use crate::paragraph::Paragraph;

/// Counters from one substitution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillStats {
    /// Paragraphs inspected
    pub paragraphs: usize,
    /// Paragraphs whose text changed and were rewritten
    pub changed: usize,
}

/// Replace placeholder tokens in one paragraph.
///
/// The paragraph's full text is searched, so tokens split across runs are
/// found. Each `(token, value)` pair is applied in order as a plain
/// substring replacement of every occurrence. When the text changes, the
/// paragraph content is replaced by a single run formatted like the
/// original first run (or a default run if there was none). Returns
/// whether the paragraph was rewritten.
pub fn replace_in_paragraph(paragraph: &mut Paragraph<'_>, replacements: &[(String, String)]) -> bool {
    let full_text = paragraph.text();
    tracing::debug!("paragraph text: '{}'", full_text);

    let mut new_text = full_text.clone();
    for (token, value) in replacements {
        if new_text.contains(token.as_str()) {
            tracing::debug!("found placeholder '{}' in text: '{}'", token, new_text);
            new_text = new_text.replace(token.as_str(), value);
            tracing::debug!("text after replacing '{}' with '{}': '{}'", token, value, new_text);
        } else {
            tracing::debug!("placeholder '{}' not found in text: '{}'", token, new_text);
        }
    }

    if new_text == full_text {
        return false;
    }

    match paragraph.first_run_format() {
        Some(format) => {
            paragraph.clear();
            paragraph.add_run(&new_text, Some(&format));
        }
        None => paragraph.add_run(&new_text, None),
    }
    true
}

/// Apply replacements to every body and table-cell paragraph of a document
pub fn fill_document(document: &mut Document, replacements: &[(String, String)]) -> FillStats {
    let mut stats = FillStats::default();
    document.for_each_paragraph_mut(|mut paragraph| {
        stats.paragraphs += 1;
        if replace_in_paragraph(&mut paragraph, replacements) {
            stats.changed += 1;
        }
    });
    stats
}

/// Load a template and apply replacements to it
pub fn fill<P: AsRef<Path>>(template_path: P, replacements: &[(String, String)]) -> DocxResult<Document> {
    let mut document = Document::open(template_path)?;
    let stats = fill_document(&mut document, replacements);
    tracing::debug!(
        paragraphs = stats.paragraphs,
        changed = stats.changed,
        "template filled"
    );
    Ok(document)
}
