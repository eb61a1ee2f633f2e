//! Run formatting snapshot

use std::fmt;

use crate::xml::XmlElement;

/// Explicit RGB run color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a 6-digit hex string (e.g. `FF0000`). `auto` and anything
    /// else that is not a plain RGB value yields `None`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Underline style of a run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Underline {
    /// Underline explicitly switched off
    None,
    Single,
    Double,
    /// Any other `w:u` style (`wave`, `dotted`, ...), kept verbatim
    Styled(String),
}

impl Underline {
    fn from_val(val: Option<&str>) -> Self {
        match val {
            None | Some("single") => Underline::Single,
            Some("none") => Underline::None,
            Some("double") => Underline::Double,
            Some(other) => Underline::Styled(other.to_string()),
        }
    }

    fn as_val(&self) -> &str {
        match self {
            Underline::None => "none",
            Underline::Single => "single",
            Underline::Double => "double",
            Underline::Styled(s) => s.as_str(),
        }
    }
}

/// Formatting captured from a run's `w:rPr`.
///
/// Every field is tri-state: `None` means the run does not set the
/// property and inherits it from its paragraph or character style.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunFormat {
    /// Font family (`w:rFonts/@w:ascii`, falling back to `@w:hAnsi`)
    pub font_name: Option<String>,
    /// Size in half-points (`w:sz`), so 28 is 14pt
    pub size_half_points: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<Underline>,
    /// Only explicit RGB colors; `auto` and theme-only colors are not captured
    pub color: Option<RgbColor>,
}

impl RunFormat {
    /// Capture the formatting of a `w:r` element
    pub fn from_run(run: &XmlElement) -> Self {
        match run.child("rPr") {
            Some(rpr) => Self::from_properties(rpr),
            None => Self::default(),
        }
    }

    /// Read formatting from a `w:rPr` element
    pub fn from_properties(rpr: &XmlElement) -> Self {
        let font_name = rpr
            .child("rFonts")
            .and_then(|fonts| fonts.attribute("ascii").or_else(|| fonts.attribute("hAnsi")))
            .map(str::to_string);

        let size_half_points = rpr
            .child("sz")
            .and_then(|sz| sz.attribute("val"))
            .and_then(|val| val.parse::<u32>().ok());

        let underline = rpr
            .child("u")
            .map(|u| Underline::from_val(u.attribute("val")));

        let color = rpr
            .child("color")
            .and_then(|c| c.attribute("val"))
            .and_then(RgbColor::from_hex);

        Self {
            font_name,
            size_half_points,
            bold: toggle(rpr, "b"),
            italic: toggle(rpr, "i"),
            underline,
            color,
        }
    }

    /// Size in points
    pub fn size_points(&self) -> Option<f64> {
        self.size_half_points.map(|hp| hp as f64 / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build a `w:rPr` element, or `None` when nothing is set.
    ///
    /// `prefix_of` supplies the namespace prefix used by the run.
    pub fn to_properties(&self, prefix_of: &XmlElement) -> Option<XmlElement> {
        if self.is_empty() {
            return None;
        }

        let name = |local: &str| prefix_of.sibling_name(local);
        let val = name("val");
        let mut rpr = XmlElement::new(name("rPr"));

        // Child order follows the CT_RPr sequence
        if let Some(font) = &self.font_name {
            rpr.push(
                XmlElement::new(name("rFonts"))
                    .with_attribute(name("ascii"), font.as_str())
                    .with_attribute(name("hAnsi"), font.as_str()),
            );
        }
        if let Some(bold) = self.bold {
            rpr.push(toggle_element(&name("b"), &val, bold));
        }
        if let Some(italic) = self.italic {
            rpr.push(toggle_element(&name("i"), &val, italic));
        }
        if let Some(color) = self.color {
            rpr.push(XmlElement::new(name("color")).with_attribute(val.as_str(), color.to_string()));
        }
        if let Some(size) = self.size_half_points {
            rpr.push(XmlElement::new(name("sz")).with_attribute(val.as_str(), size.to_string()));
        }
        if let Some(underline) = &self.underline {
            rpr.push(XmlElement::new(name("u")).with_attribute(val.as_str(), underline.as_val()));
        }

        Some(rpr)
    }
}

/// Read an on/off property such as `<w:b/>` or `<w:b w:val="0"/>`
fn toggle(rpr: &XmlElement, local: &str) -> Option<bool> {
    rpr.child(local).map(|e| {
        !matches!(
            e.attribute("val"),
            Some("0") | Some("false") | Some("off")
        )
    })
}

fn toggle_element(name: &str, val: &str, on: bool) -> XmlElement {
    let element = XmlElement::new(name);
    if on {
        element
    } else {
        element.with_attribute(val, "0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(xml: &str) -> XmlElement {
        let wrapped = format!(
            r#"<w:r xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{}</w:r>"#,
            xml
        );
        XmlElement::parse(wrapped.as_bytes()).unwrap()
    }

    #[test]
    fn test_capture_full_format() {
        let run = parse(
            r#"<w:rPr><w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman"/><w:b/><w:i w:val="1"/><w:color w:val="C00000"/><w:sz w:val="32"/><w:u w:val="double"/></w:rPr>"#,
        );

        let format = RunFormat::from_run(&run);

        assert_eq!(format.font_name.as_deref(), Some("Times New Roman"));
        assert_eq!(format.size_half_points, Some(32));
        assert_eq!(format.size_points(), Some(16.0));
        assert_eq!(format.bold, Some(true));
        assert_eq!(format.italic, Some(true));
        assert_eq!(format.underline, Some(Underline::Double));
        assert_eq!(format.color, Some(RgbColor::new(0xC0, 0, 0)));
    }

    #[test]
    fn test_explicit_off_and_auto_color() {
        let run = parse(r#"<w:rPr><w:b w:val="0"/><w:color w:val="auto"/><w:u/></w:rPr>"#);

        let format = RunFormat::from_run(&run);

        assert_eq!(format.bold, Some(false));
        assert_eq!(format.italic, None);
        assert_eq!(format.color, None);
        assert_eq!(format.underline, Some(Underline::Single));
    }

    #[test]
    fn test_run_without_properties() {
        let format = RunFormat::from_run(&parse("<w:t>x</w:t>"));

        assert!(format.is_empty());
        assert_eq!(format.to_properties(&XmlElement::new("w:r")), None);
    }

    #[test]
    fn test_properties_round_trip() {
        let format = RunFormat {
            font_name: Some("Arial".into()),
            size_half_points: Some(24),
            bold: Some(true),
            italic: Some(false),
            underline: Some(Underline::Styled("wave".into())),
            color: Some(RgbColor::new(0x12, 0x34, 0x56)),
        };

        let rpr = format.to_properties(&XmlElement::new("w:r")).unwrap();
        let names: Vec<&str> = rpr.elements().map(|e| e.name.as_str()).collect();

        assert_eq!(names, vec!["w:rFonts", "w:b", "w:i", "w:color", "w:sz", "w:u"]);
        assert_eq!(RunFormat::from_properties(&rpr), format);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(RgbColor::from_hex("FF0000"), Some(RgbColor::new(255, 0, 0)));
        assert_eq!(RgbColor::from_hex("auto"), None);
        assert_eq!(RgbColor::new(1, 2, 255).to_string(), "0102FF");
    }
}
