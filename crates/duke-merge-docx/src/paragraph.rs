//! Paragraph and run views over `w:p` elements

use crate::format::RunFormat;
use crate::xml::{XmlElement, XmlNode};

/// Containers inside a paragraph whose runs are part of its visible text
const RUN_CONTAINERS: &[&str] = &["hyperlink", "smartTag"];

/// Visible text of a `w:p` element.
///
/// Tabs read as `\t`, line breaks as `\n`. Runs nested in hyperlinks and
/// smart tags are included.
pub fn paragraph_text(p: &XmlElement) -> String {
    let mut out = String::new();
    for child in p.elements() {
        match child.local_name() {
            "r" => push_run_text(child, &mut out),
            name if RUN_CONTAINERS.contains(&name) => {
                for run in child.elements().filter(|e| e.local_name() == "r") {
                    push_run_text(run, &mut out);
                }
            }
            _ => {}
        }
    }
    out
}

fn push_run_text(run: &XmlElement, out: &mut String) {
    for child in run.elements() {
        match child.local_name() {
            "t" => out.push_str(&child.text()),
            "tab" | "ptab" => out.push('\t'),
            "cr" => out.push('\n'),
            // Page and column breaks are not line text
            "br" => match child.attribute("type") {
                None | Some("textWrapping") => out.push('\n'),
                Some(_) => {}
            },
            "noBreakHyphen" => out.push('-'),
            _ => {}
        }
    }
}

/// Mutable view of one `w:p` element
pub struct Paragraph<'a> {
    element: &'a mut XmlElement,
}

impl<'a> Paragraph<'a> {
    pub fn new(element: &'a mut XmlElement) -> Self {
        Self { element }
    }

    /// Visible text of the paragraph
    pub fn text(&self) -> String {
        paragraph_text(&*self.element)
    }

    /// Runs contributing to the paragraph text, in order: direct runs and
    /// runs inside hyperlinks or smart tags
    pub fn runs(&self) -> impl Iterator<Item = &XmlElement> {
        self.element.elements().flat_map(|child| {
            match child.local_name() {
                "r" => vec![child],
                name if RUN_CONTAINERS.contains(&name) => child
                    .elements()
                    .filter(|e| e.local_name() == "r")
                    .collect(),
                _ => Vec::new(),
            }
        })
    }

    pub fn has_runs(&self) -> bool {
        self.runs().next().is_some()
    }

    /// Formatting of the first run, if the paragraph has one
    pub fn first_run_format(&self) -> Option<RunFormat> {
        self.runs().next().map(RunFormat::from_run)
    }

    /// Remove all content except the paragraph properties (`w:pPr`).
    ///
    /// Hyperlinks, bookmarks and other inline content go with the runs.
    pub fn clear(&mut self) {
        self.element.children.retain(|node| match node {
            XmlNode::Element(e) => e.local_name() == "pPr",
            XmlNode::Text(_) => false,
        });
    }

    /// Append a run holding `text`, optionally formatted.
    ///
    /// Tabs become `w:tab` and line breaks `w:br`, as Word writes them.
    pub fn add_run(&mut self, text: &str, format: Option<&RunFormat>) {
        let mut run = XmlElement::new(self.element.sibling_name("r"));

        if let Some(rpr) = format.and_then(|f| f.to_properties(&*self.element)) {
            run.push(rpr);
        }

        let mut pending = String::new();
        for c in text.chars() {
            match c {
                '\t' => {
                    self.flush_text(&mut run, &mut pending);
                    run.push(XmlElement::new(self.element.sibling_name("tab")));
                }
                '\n' | '\r' => {
                    self.flush_text(&mut run, &mut pending);
                    run.push(XmlElement::new(self.element.sibling_name("br")));
                }
                _ => pending.push(c),
            }
        }
        self.flush_text(&mut run, &mut pending);

        self.element.push(run);
    }

    fn flush_text(&self, run: &mut XmlElement, pending: &mut String) {
        if pending.is_empty() {
            return;
        }
        let mut t = XmlElement::new(self.element.sibling_name("t"));
        if pending.starts_with(char::is_whitespace) || pending.ends_with(char::is_whitespace) {
            t.set_attribute("xml:space", "preserve");
        }
        t.children.push(XmlNode::Text(std::mem::take(pending)));
        run.push(t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::RgbColor;
    use pretty_assertions::assert_eq;

    fn parse(xml: &str) -> XmlElement {
        let wrapped = format!(
            r#"<w:p xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{}</w:p>"#,
            xml
        );
        XmlElement::parse(wrapped.as_bytes()).unwrap()
    }

    #[test]
    fn test_text_spans_runs_and_hyperlinks() {
        let p = parse(
            r#"<w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>{{Фам</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>илия}}</w:t></w:r><w:hyperlink><w:r><w:tab/><w:t>link</w:t></w:r></w:hyperlink><w:r><w:br/><w:br w:type="page"/></w:r>"#,
        );

        assert_eq!(paragraph_text(&p), "{{Фамилия}}\tlink\n");
    }

    #[test]
    fn test_clear_keeps_paragraph_properties() {
        let mut p = parse(r#"<w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>x</w:t></w:r>"#);
        let mut paragraph = Paragraph::new(&mut p);

        paragraph.clear();

        assert!(!paragraph.has_runs());
        let names: Vec<&str> = p.elements().map(|e| e.local_name()).collect();
        assert_eq!(names, vec!["pPr"]);
    }

    #[test]
    fn test_add_run_with_format() {
        let mut p = parse("");
        let format = RunFormat {
            bold: Some(true),
            color: Some(RgbColor::new(255, 0, 0)),
            ..Default::default()
        };

        Paragraph::new(&mut p).add_run(" a\tb\nc ", Some(&format));

        let paragraph = Paragraph::new(&mut p);
        assert_eq!(paragraph.text(), " a\tb\nc ");
        assert_eq!(paragraph.first_run_format(), Some(format));

        let run = p.child("r").unwrap();
        let names: Vec<&str> = run.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:rPr", "w:t", "w:tab", "w:t", "w:br", "w:t"]);
        assert_eq!(run.child("t").unwrap().attribute("space"), Some("preserve"));
    }

    #[test]
    fn test_runs_include_hyperlink_runs() {
        let mut p = parse(
            r#"<w:hyperlink><w:r><w:rPr><w:i/></w:rPr><w:t>a</w:t></w:r></w:hyperlink><w:r><w:t>b</w:t></w:r>"#,
        );
        let paragraph = Paragraph::new(&mut p);

        assert_eq!(paragraph.runs().count(), 2);
        assert_eq!(paragraph.first_run_format().unwrap().italic, Some(true));
    }

    #[test]
    fn test_add_run_without_format_has_no_properties() {
        let mut p = parse("");

        Paragraph::new(&mut p).add_run("plain", None);

        let run = p.child("r").unwrap();
        assert!(run.child("rPr").is_none());
        assert_eq!(run.child("t").unwrap().attribute("space"), None);
    }
}
