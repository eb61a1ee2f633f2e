//! Fixture builders shared by the integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use duke_merge::{ConvertError, DocumentConverter};
use zip::write::SimpleFileOptions;

pub const PUPIL_HEADERS: [&str; 4] = [
    "Фамилия ученика",
    "Имя ученика",
    "Класс",
    "Классный руководитель",
];

fn column_letter(col: usize) -> char {
    (b'A' + col as u8) as char
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Write an `.xlsx` whose first sheet holds `rows` as inline strings.
/// A cell that parses as a number is stored as a number.
pub fn write_xlsx(path: &Path, rows: &[Vec<&str>]) {
    let mut sheet_rows = String::new();
    for (r, row) in rows.iter().enumerate() {
        sheet_rows.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            let cell_ref = format!("{}{}", column_letter(c), r + 1);
            if value.is_empty() {
                continue;
            }
            if value.parse::<f64>().is_ok() {
                sheet_rows.push_str(&format!(r#"<c r="{cell_ref}"><v>{value}</v></c>"#));
            } else {
                sheet_rows.push_str(&format!(
                    r#"<c r="{cell_ref}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    escape(value)
                ));
            }
        }
        sheet_rows.push_str("</row>");
    }

    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#).unwrap();

        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#).unwrap();

        zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#).unwrap();

        zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
        let sheet = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{sheet_rows}</sheetData></worksheet>"#
        );
        zip.write_all(sheet.as_bytes()).unwrap();

        zip.finish().unwrap();
    }
    std::fs::write(path, buf).unwrap();
}

/// Write a `.docx` whose body is `body` (raw WordprocessingML).
pub fn write_docx(path: &Path, body: &str) {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#).unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#).unwrap();

        zip.start_file("word/document.xml", options).unwrap();
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
        );
        zip.write_all(document.as_bytes()).unwrap();

        zip.finish().unwrap();
    }
    std::fs::write(path, buf).unwrap();
}

/// Certificate template with the four default placeholders split across
/// formatted runs, plus a table cell and an untouched paragraph.
pub fn certificate_body() -> &'static str {
    concat!(
        r#"<w:p><w:r><w:rPr><w:b/><w:i/><w:sz w:val="28"/></w:rPr><w:t>{{Фам</w:t></w:r>"#,
        r#"<w:r><w:t xml:space="preserve">илия}} {{Имя}}, {{Класс}}, {{Кл.рук}}</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>Награждается за успехи</w:t></w:r></w:p>"#,
        r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Класс: {{Класс}}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
    )
}

/// Converter that writes a placeholder PDF and remembers each call
#[derive(Clone, Default)]
pub struct FakeConverter {
    pub calls: Rc<RefCell<Vec<(PathBuf, PathBuf)>>>,
}

impl DocumentConverter for FakeConverter {
    fn convert_to_pdf(&self, source: &Path, target: &Path) -> Result<(), ConvertError> {
        std::fs::write(target, b"%PDF-1.4\n")?;
        self.calls
            .borrow_mut()
            .push((source.to_path_buf(), target.to_path_buf()));
        Ok(())
    }
}

/// Converter that always fails as if LibreOffice were not installed
pub struct MissingConverter;

impl DocumentConverter for MissingConverter {
    fn convert_to_pdf(&self, _source: &Path, _target: &Path) -> Result<(), ConvertError> {
        Err(ConvertError::NotFound)
    }
}

/// Sorted file names in `dir`
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
