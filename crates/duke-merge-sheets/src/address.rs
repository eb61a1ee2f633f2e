//! A1-style cell reference helpers

/// Convert column letters to a 0-based column index (`A` = 0, `AA` = 26).
///
/// Returns `None` for empty input, non-letters, or columns past `XFD`.
pub fn letters_to_column(letters: &str) -> Option<u16> {
    if letters.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        if col > 16_384 {
            return None;
        }
    }

    Some((col - 1) as u16)
}

/// Split a cell reference like `B12` into a 0-based `(row, col)` pair
pub fn parse_cell_ref(s: &str) -> Option<(u32, u16)> {
    let s = s.trim().trim_start_matches('$');
    let split = s.find(|c: char| !c.is_ascii_alphabetic())?;
    let (letters, rest) = s.split_at(split);

    let col = letters_to_column(letters)?;
    let row: u32 = rest.trim_start_matches('$').parse().ok()?;
    if row == 0 {
        return None;
    }

    Some((row - 1, col))
}
