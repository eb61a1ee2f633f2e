//! Output file naming

use std::path::{Path, PathBuf};

/// Characters that cannot appear in a file name on common platforms
const INVALID_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replace path separators, reserved characters and control characters with `_`.
pub fn sanitize_component(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if INVALID_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Build the file stem `<prefix>_<part>_..._<index>`.
///
/// The row index keeps stems unique when two rows share the same names.
pub fn output_stem<S: AsRef<str>>(prefix: &str, parts: &[S], index: usize) -> String {
    let mut stem = sanitize_component(prefix);
    for part in parts {
        stem.push('_');
        stem.push_str(&sanitize_component(part.as_ref()));
    }
    stem.push('_');
    stem.push_str(&index.to_string());
    stem
}

/// Path of the `.docx` for `stem` inside `dir`
pub fn docx_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.docx"))
}

/// Path of the `.pdf` for `stem` inside `dir`
pub fn pdf_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.pdf"))
}
