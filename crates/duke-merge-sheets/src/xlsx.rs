//! XLSX row reader

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use duke_merge_core::CellValue;

use crate::address::{letters_to_column, parse_cell_ref};
use crate::date::from_excel_serial;
use crate::error::{SheetError, SheetResult};
use crate::source::RowSet;
use crate::styles::read_date_styles;

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("_x") {
        result.push_str(&rest[..start]);
        let candidate = &rest[start..];

        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Workbook-level data needed to interpret cell values
#[derive(Debug)]
struct CellContext {
    shared_strings: Vec<String>,
    /// Indexed by the cell `s` attribute
    date_styles: Vec<bool>,
    date1904: bool,
}

/// Position, `t` and `s` attributes of a `<c>` element
struct CellAttributes {
    pos: (u32, u16),
    cell_type: Option<String>,
    style: usize,
}

/// Reads the first worksheet of an XLSX workbook as rows
pub struct XlsxRowReader;

impl XlsxRowReader {
    /// Read rows from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> SheetResult<RowSet> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read rows from a reader
    pub fn read<R: Read + Seek>(reader: R) -> SheetResult<RowSet> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(SheetError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let date_styles = read_date_styles(&mut archive)?;
        let (sheet_info, date1904) = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let (name, r_id) = sheet_info
            .first()
            .ok_or_else(|| SheetError::InvalidFormat("workbook has no sheets".into()))?;
        let path = sheet_paths
            .get(r_id)
            .ok_or_else(|| SheetError::MissingPart(format!("worksheet for sheet '{}'", name)))?;

        tracing::debug!(sheet = %name, part = %path, "reading first worksheet");

        let context = CellContext {
            shared_strings,
            date_styles,
            date1904,
        };
        let grid = Self::read_worksheet(&mut archive, path, &context)?;
        Ok(RowSet::from_rows(Self::densify(grid)))
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> SheetResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic hints carry their own <t> elements that are not part of the value
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Event::Empty(e) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Event::End(e) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Event::Text(e) if in_t => current_string.push_str(&e.unescape()?),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names and rIds, in tab order, and
    /// whether the workbook uses the 1904 date system
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> SheetResult<(Vec<(String, String)>, bool)> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| SheetError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();
        let mut date1904 = false;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"workbookPr" => {
                    date1904 = e
                        .attributes()
                        .flatten()
                        .find(|attr| attr.key.as_ref() == b"date1904")
                        .and_then(|attr| attr.unescape_value().ok())
                        .map_or(false, |v| v == "1" || v == "true");
                }
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"sheet" => {
                    let mut name = None;
                    let mut r_id = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"r:id" => {
                                r_id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok((sheets, date1904))
    }

    /// Read workbook.xml.rels to get worksheet part paths by rId
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> SheetResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| SheetError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"Relationship" => {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        let value = attr.unescape_value().ok().map(|s| s.to_string());
                        match attr.key.as_ref() {
                            b"Id" => id = value,
                            b"Target" => target = value,
                            b"Type" => rel_type = value,
                            _ => {}
                        }
                    }

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to the xl/ folder unless absolute
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read the cells of a worksheet into a sparse row -> column grid
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        context: &CellContext,
    ) -> SheetResult<BTreeMap<u32, BTreeMap<u16, CellValue>>> {
        let file = archive
            .by_name(path)
            .map_err(|_| SheetError::MissingPart(path.to_string()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);

        let mut buf = Vec::new();
        let mut grid: BTreeMap<u32, BTreeMap<u16, CellValue>> = BTreeMap::new();

        // Rows and cells may omit their `r` attribute; positions then follow
        // the previous element
        let mut next_row: u32 = 0;
        let mut current_row: u32 = 0;
        let mut next_col: u16 = 0;

        let mut cell_pos: Option<(u32, u16)> = None;
        let mut cell_type: Option<String> = None;
        let mut cell_style: usize = 0;
        let mut cell_text = String::new();
        let mut has_value = false;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"row" => {
                        current_row = Self::row_number(&e).unwrap_or(next_row);
                        next_row = current_row + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        let attrs = Self::cell_attributes(&e, current_row, next_col);
                        next_col = attrs.pos.1.saturating_add(1);
                        cell_pos = Some(attrs.pos);
                        cell_type = attrs.cell_type;
                        cell_style = attrs.style;
                        cell_text.clear();
                        has_value = false;
                    }
                    b"v" if cell_pos.is_some() => {
                        in_value = true;
                        has_value = true;
                    }
                    b"is" if cell_pos.is_some() => {
                        in_inline_str = true;
                        has_value = true;
                    }
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"row" => {
                        current_row = Self::row_number(&e).unwrap_or(next_row);
                        next_row = current_row + 1;
                    }
                    b"c" => {
                        // Valueless cell: only advances the column position
                        let attrs = Self::cell_attributes(&e, current_row, next_col);
                        next_col = attrs.pos.1.saturating_add(1);
                    }
                    _ => {}
                },
                Event::End(e) => match e.name().as_ref() {
                    b"c" => {
                        if let Some((row, col)) = cell_pos.take() {
                            let value = if has_value {
                                Self::cell_value(cell_type.as_deref(), cell_style, &cell_text, context)
                            } else {
                                CellValue::Empty
                            };
                            if !value.is_empty() {
                                grid.entry(row).or_default().insert(col, value);
                            }
                        }
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline_str = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Event::Text(e) if in_value || in_inline_text => {
                    cell_text.push_str(&e.unescape()?);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(grid)
    }

    fn row_number(e: &quick_xml::events::BytesStart<'_>) -> Option<u32> {
        e.attributes()
            .flatten()
            .find(|attr| attr.key.as_ref() == b"r")
            .and_then(|attr| attr.unescape_value().ok()?.parse::<u32>().ok())
            .filter(|r| *r > 0)
            .map(|r| r - 1) // 1-based to 0-based
    }

    fn cell_attributes(
        e: &quick_xml::events::BytesStart<'_>,
        row: u32,
        next_col: u16,
    ) -> CellAttributes {
        let mut pos = (row, next_col);
        let mut cell_type = None;
        let mut style = 0;

        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    if let Some(value) = attr.unescape_value().ok() {
                        if let Some(parsed) = parse_cell_ref(&value) {
                            pos = parsed;
                        } else if let Some(col) = letters_to_column(&value) {
                            pos = (row, col);
                        }
                    }
                }
                b"t" => {
                    cell_type = attr.unescape_value().ok().map(|s| s.to_string());
                }
                b"s" => {
                    style = attr
                        .unescape_value()
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0);
                }
                _ => {}
            }
        }

        CellAttributes {
            pos,
            cell_type,
            style,
        }
    }

    /// Interpret the raw text of a cell according to its `t` attribute.
    /// Numbers whose style has a date format become dates.
    fn cell_value(
        cell_type: Option<&str>,
        style: usize,
        raw: &str,
        context: &CellContext,
    ) -> CellValue {
        let text = match cell_type {
            Some("s") => {
                let idx = raw.trim().parse::<usize>().ok();
                match idx.and_then(|i| context.shared_strings.get(i)) {
                    Some(s) => s.clone(),
                    None => {
                        tracing::warn!(index = raw, "shared string index out of range");
                        return CellValue::Empty;
                    }
                }
            }
            Some("inlineStr") | Some("str") | Some("d") => decode_excel_escapes(raw),
            Some("b") => return CellValue::Boolean(raw.trim() == "1" || raw.trim() == "true"),
            Some("e") => return CellValue::Error(raw.to_string()),
            _ => {
                let is_date = context.date_styles.get(style).copied().unwrap_or(false);
                return match raw.trim().parse::<f64>() {
                    Ok(n) if is_date => {
                        from_excel_serial(n, context.date1904).unwrap_or(CellValue::Number(n))
                    }
                    Ok(n) => CellValue::Number(n),
                    Err(_) if raw.trim().is_empty() => CellValue::Empty,
                    Err(_) => CellValue::Text(raw.to_string()),
                };
            }
        };

        // Empty strings read the same as blank cells
        if text.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(text)
        }
    }

    /// Expand the sparse grid into dense rows
    fn densify(grid: BTreeMap<u32, BTreeMap<u16, CellValue>>) -> Vec<Vec<CellValue>> {
        grid.into_values()
            .map(|cells| {
                let width = cells.keys().next_back().map_or(0, |c| *c as usize + 1);
                let mut row = vec![CellValue::Empty; width];
                for (col, value) in cells {
                    row[col as usize] = value;
                }
                row
            })
            .collect()
    }
}
