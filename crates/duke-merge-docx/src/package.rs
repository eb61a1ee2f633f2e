//! DOCX package reading and writing

use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::error::{DocxError, DocxResult};
use crate::paragraph::{paragraph_text, Paragraph};
use crate::xml::XmlElement;

const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// One file inside the package, kept as raw bytes
#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
}

/// An in-memory Word document.
///
/// All package parts are carried through unchanged except the main
/// document part, which is held as an editable element tree.
#[derive(Debug, Clone)]
pub struct Document {
    parts: Vec<Part>,
    main_part: String,
    root: XmlElement,
}

impl Document {
    /// Read a document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> DocxResult<Self> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a document from a reader
    pub fn read<R: Read + Seek>(reader: R) -> DocxResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(DocxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let main_part = Self::read_main_part_name(&mut archive)?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.push(Part {
                name: file.name().to_string(),
                data,
            });
        }

        let main = parts
            .iter()
            .find(|p| p.name == main_part)
            .ok_or_else(|| DocxError::MissingPart(main_part.clone()))?;
        let root = XmlElement::parse(&main.data)?;

        if root.local_name() != "document" || root.child("body").is_none() {
            return Err(DocxError::InvalidFormat(format!(
                "{} is not a WordprocessingML document",
                main_part
            )));
        }

        Ok(Self {
            parts,
            main_part,
            root,
        })
    }

    /// Find the main document part through the package relationships
    fn read_main_part_name<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> DocxResult<String> {
        let file = match archive.by_name("_rels/.rels") {
            Ok(f) => f,
            Err(_) => return Ok(DEFAULT_MAIN_PART.to_string()),
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut main_part = None;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"Relationship" => {
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        let value = attr.unescape_value().ok().map(|s| s.to_string());
                        match attr.key.as_ref() {
                            b"Target" => target = value,
                            b"Type" => rel_type = value,
                            _ => {}
                        }
                    }

                    if let (Some(target), Some(rel_type)) = (target, rel_type) {
                        if rel_type.ends_with("/officeDocument") {
                            main_part = Some(target.trim_start_matches('/').to_string());
                            break;
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(main_part.unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()))
    }

    /// Write the document to a file path, replacing any existing file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> DocxResult<()> {
        let file = File::create(path)?;
        self.write(file)
    }

    /// Write the document to a writer
    pub fn write<W: Write + Seek>(&self, writer: W) -> DocxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for part in &self.parts {
            zip.start_file(part.name.as_str(), options)?;
            if part.name == self.main_part {
                zip.write_all(&self.root.to_xml()?)?;
            } else {
                zip.write_all(&part.data)?;
            }
        }

        zip.finish()?;
        Ok(())
    }

    /// Name of the main document part, usually `word/document.xml`
    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    /// Root `w:document` element
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Visit every body paragraph and every paragraph inside table cells
    /// (nested tables included), in document order.
    pub fn for_each_paragraph_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(Paragraph<'_>),
    {
        if let Some(body) = self.root.child_mut("body") {
            visit_block_mut(body, &mut f);
        }
    }

    /// Text of every paragraph visited by [`Document::for_each_paragraph_mut`]
    pub fn paragraph_texts(&self) -> Vec<String> {
        let mut texts = Vec::new();
        if let Some(body) = self.root.child("body") {
            visit_block(body, &mut |p: &XmlElement| texts.push(paragraph_text(p)));
        }
        texts
    }

    /// All paragraph texts joined by newlines
    pub fn text(&self) -> String {
        self.paragraph_texts().join("\n")
    }
}

/// Walk a block container (body or table cell)
fn visit_block_mut<F>(container: &mut XmlElement, f: &mut F)
where
    F: FnMut(Paragraph<'_>),
{
    for child in container.elements_mut() {
        if child.local_name() == "p" {
            f(Paragraph::new(child));
        } else if child.local_name() == "tbl" {
            for cell in table_cells_mut(child) {
                visit_block_mut(cell, f);
            }
        }
    }
}

fn table_cells_mut(table: &mut XmlElement) -> impl Iterator<Item = &mut XmlElement> {
    table
        .elements_mut()
        .filter(|row| row.local_name() == "tr")
        .flat_map(|row| row.elements_mut().filter(|cell| cell.local_name() == "tc"))
}

fn visit_block<F>(container: &XmlElement, f: &mut F)
where
    F: FnMut(&XmlElement),
{
    for child in container.elements() {
        match child.local_name() {
            "p" => f(child),
            "tbl" => {
                for row in child.elements().filter(|e| e.local_name() == "tr") {
                    for cell in row.elements().filter(|e| e.local_name() == "tc") {
                        visit_block(cell, f);
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    /// Build a minimal .docx around the given `w:body` content
    pub(crate) fn docx_bytes(body: &str) -> Vec<u8> {
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

            zip.start_file("word/styles.xml", options).unwrap();
            zip.write_all(b"<w:styles xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"/>").unwrap();

            zip.start_file("word/document.xml", options).unwrap();
            let document = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr/></w:body></w:document>"#,
                body
            );
            zip.write_all(document.as_bytes()).unwrap();

            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_read_paragraphs_in_document_order() {
        let bytes = docx_bytes(
            r#"<w:p><w:r><w:t>first</w:t></w:r></w:p><w:tbl><w:tblPr/><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>nested</w:t></w:r></w:p></w:tc></w:tr></w:tbl></w:tc></w:tr></w:tbl><w:p/>"#,
        );

        let doc = Document::read(Cursor::new(bytes)).unwrap();

        assert_eq!(doc.main_part(), "word/document.xml");
        assert_eq!(doc.paragraph_texts(), vec!["first", "cell", "nested", ""]);
        assert_eq!(doc.text(), "first\ncell\nnested\n");
    }

    #[test]
    fn test_write_keeps_other_parts() {
        let bytes = docx_bytes(r#"<w:p><w:r><w:t>x</w:t></w:r></w:p>"#);
        let doc = Document::read(Cursor::new(bytes)).unwrap();

        let mut out = Vec::new();
        doc.write(Cursor::new(&mut out)).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(&out)).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert_eq!(
            names.len(),
            4,
            "unexpected parts: {:?}",
            names
        );
        let mut styles = String::new();
        archive
            .by_name("word/styles.xml")
            .unwrap()
            .read_to_string(&mut styles)
            .unwrap();
        assert!(styles.contains("w:styles"));

        let reread = Document::read(Cursor::new(out)).unwrap();
        assert_eq!(reread.root(), doc.root());
    }

    #[test]
    fn test_visit_counts_table_paragraphs() {
        let bytes = docx_bytes(
            r#"<w:p/><w:tbl><w:tr><w:tc><w:p/><w:p/></w:tc><w:tc><w:p/></w:tc></w:tr></w:tbl>"#,
        );
        let mut doc = Document::read(Cursor::new(bytes)).unwrap();

        let mut count = 0;
        doc.for_each_paragraph_mut(|_| count += 1);

        assert_eq!(count, 4);
    }

    #[test]
    fn test_not_a_docx() {
        assert!(matches!(
            Document::read(Cursor::new(b"plain text".to_vec())),
            Err(DocxError::Zip(_))
        ));
        assert!(matches!(
            Document::open("/nonexistent/template.docx"),
            Err(DocxError::Io(_))
        ));
    }
}
