// src/font/convert.rs

//! The three build conversions and their inverses, as pure byte functions.

use log::{debug, info};
use roxmltree::{Document, Node};

use super::path::parse_contours;
use super::sfnt::{self, FontSource, SourceGlyph};
use super::{woff, woff2, ConversionError};

const DEFAULT_UNITS_PER_EM: f64 = 1000.0;

fn find<'a, 'input>(root: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    root.descendants().find(|n| n.has_tag_name(name))
}

/// Reads a numeric attribute, rounding to the nearest integer in `[min, max]`.
fn number(
    node: Node<'_, '_>,
    element: &'static str,
    attribute: &'static str,
    range: (f64, f64),
) -> Result<Option<f64>, ConversionError> {
    let Some(raw) = node.attribute(attribute) else {
        return Ok(None);
    };
    let invalid = || ConversionError::InvalidAttribute {
        element,
        attribute,
        value: raw.to_string(),
    };
    let value = raw.trim().parse::<f64>().map_err(|_| invalid())?.round();
    if !value.is_finite() || value < range.0 || value > range.1 {
        return Err(invalid());
    }
    Ok(Some(value))
}

const U16: (f64, f64) = (0.0, u16::MAX as f64);
const I16: (f64, f64) = (i16::MIN as f64, i16::MAX as f64);

fn glyph_from(
    node: Node<'_, '_>,
    element: &'static str,
    name: String,
    default_advance: u16,
) -> Result<SourceGlyph, ConversionError> {
    let advance = number(node, element, "horiz-adv-x", U16)?.map_or(default_advance, |v| v as u16);
    let contours = match node.attribute("d") {
        Some(d) => parse_contours(d).map_err(|source| ConversionError::Path {
            glyph: name.clone(),
            source,
        })?,
        None => Vec::new(),
    };
    Ok(SourceGlyph {
        name,
        codepoint: None,
        advance,
        contours,
    })
}

/// Reads an SVG font document into a [`FontSource`].
pub fn parse_outline_font(document: &[u8]) -> Result<FontSource, ConversionError> {
    let text = std::str::from_utf8(document)?;
    let doc = Document::parse(text)?;
    let font = find(doc.root(), "font").ok_or(ConversionError::MissingElement("font"))?;
    let face = find(font, "font-face").ok_or(ConversionError::MissingElement("font-face"))?;

    let family = face
        .attribute("font-family")
        .filter(|f| !f.trim().is_empty())
        .ok_or(ConversionError::InvalidAttribute {
            element: "font-face",
            attribute: "font-family",
            value: String::new(),
        })?
        .to_string();
    let units_per_em = number(face, "font-face", "units-per-em", (16.0, 16384.0))?.unwrap_or(DEFAULT_UNITS_PER_EM);
    let ascent = number(face, "font-face", "ascent", I16)?.unwrap_or(units_per_em * 0.8);
    let descent = number(face, "font-face", "descent", I16)?.unwrap_or(-units_per_em * 0.2);
    let default_advance = number(font, "font", "horiz-adv-x", U16)?.unwrap_or(units_per_em / 2.0) as u16;

    let notdef = match font.children().find(|n| n.has_tag_name("missing-glyph")) {
        Some(node) => glyph_from(node, "missing-glyph", ".notdef".to_string(), default_advance)?,
        None => SourceGlyph {
            name: ".notdef".to_string(),
            codepoint: None,
            advance: default_advance,
            contours: Vec::new(),
        },
    };

    let mut glyphs = Vec::new();
    for node in font.children().filter(|n| n.has_tag_name("glyph")) {
        let name = node.attribute("glyph-name").unwrap_or_default().to_string();
        let mut glyph = glyph_from(node, "glyph", name, default_advance)?;
        glyph.codepoint = match node.attribute("unicode") {
            None => None,
            Some(u) => {
                let mut chars = u.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => {
                        return Err(ConversionError::InvalidAttribute {
                            element: "glyph",
                            attribute: "unicode",
                            value: u.to_string(),
                        })
                    }
                }
            }
        };
        glyphs.push(glyph);
    }
    debug!("Parsed outline font '{}' with {} glyphs", family, glyphs.len());

    Ok(FontSource {
        family,
        units_per_em: units_per_em as u16,
        ascent: ascent as i16,
        descent: descent as i16,
        notdef,
        glyphs,
    })
}

/// Compiles an SVG font document into TrueType.
pub fn outline_to_compiled(document: &[u8]) -> Result<Vec<u8>, ConversionError> {
    let source = parse_outline_font(document)?;
    let font = sfnt::compile(&source)?;
    info!("Compiled TrueType font: {} bytes", font.len());
    Ok(font)
}

/// Packs a TrueType font as WOFF2.
pub fn compiled_to_woff2(font: &[u8]) -> Result<Vec<u8>, ConversionError> {
    let out = woff2::encode(font)?;
    info!("WOFF2: {} -> {} bytes", font.len(), out.len());
    Ok(out)
}

/// Packs a TrueType font as WOFF.
pub fn compiled_to_woff(font: &[u8]) -> Result<Vec<u8>, ConversionError> {
    let out = woff::encode(font)?;
    info!("WOFF: {} -> {} bytes", font.len(), out.len());
    Ok(out)
}

pub fn woff2_to_compiled(data: &[u8]) -> Result<Vec<u8>, ConversionError> {
    woff2::decode(data)
}

pub fn woff_to_compiled(data: &[u8]) -> Result<Vec<u8>, ConversionError> {
    woff::decode(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    const DOC: &str = r#"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg"><defs>
<font id="T" horiz-adv-x="420">
<font-face font-family="Tiny" units-per-em="1000" ascent="800" descent="-200"/>
<missing-glyph d="M0 0V700H420V0Z"/>
<glyph glyph-name="I" unicode="I" horiz-adv-x="280" d="M0 0V700H140V0Z"/>
<glyph glyph-name="quotesingle" unicode="&apos;" horiz-adv-x="280" d="M0 420V700H140V420Z"/>
<glyph glyph-name="space" unicode=" "/>
</font></defs></svg>"#;

    #[test]
    fn parses_font_face_and_glyphs() {
        let source = parse_outline_font(DOC.as_bytes()).unwrap();
        assert_eq!(source.family, "Tiny");
        assert_eq!((source.units_per_em, source.ascent, source.descent), (1000, 800, -200));
        assert_eq!(source.notdef.advance, 420);
        assert_eq!(source.notdef.contours.len(), 1);
        assert_eq!(source.glyphs.len(), 3);
        assert_eq!(source.glyphs[1].codepoint, Some('\''));
        assert_eq!(source.glyphs[2].advance, 420);
        assert!(source.glyphs[2].contours.is_empty());
    }

    #[test]
    fn compiles_to_a_readable_font() {
        let ttf = outline_to_compiled(DOC.as_bytes()).unwrap();
        let face = ttf_parser::Face::parse(&ttf, 0).unwrap();
        let gid = face.glyph_index('I').unwrap();
        assert_eq!(face.glyph_hor_advance(gid), Some(280));
        assert_eq!(face.glyph_name(gid), Some("I"));
    }

    #[test]
    fn web_fonts_round_trip() {
        let ttf = outline_to_compiled(DOC.as_bytes()).unwrap();
        let woff2 = compiled_to_woff2(&ttf).unwrap();
        let woff = compiled_to_woff(&ttf).unwrap();
        assert_eq!(woff2_to_compiled(&woff2).unwrap(), ttf);
        assert_eq!(woff_to_compiled(&woff).unwrap(), ttf);
    }

    #[test]
    fn reports_malformed_documents() {
        assert!(matches!(outline_to_compiled(b"<svg"), Err(ConversionError::Xml(_))));
        assert!(matches!(
            outline_to_compiled(b"<svg/>"),
            Err(ConversionError::MissingElement("font"))
        ));
        assert!(matches!(
            outline_to_compiled(&[0xff, 0xfe]),
            Err(ConversionError::InvalidUtf8(_))
        ));

        let bad_path = DOC.replace("M0 0V700H140V0Z", "M0 0Q1 1 2 2Z");
        let err = outline_to_compiled(bad_path.as_bytes()).unwrap_err();
        assert!(err.to_string().starts_with("glyph 'I'"), "{err}");

        let ligature = DOC.replace(r#"unicode="I""#, r#"unicode="fi""#);
        assert!(matches!(
            outline_to_compiled(ligature.as_bytes()),
            Err(ConversionError::InvalidAttribute { attribute: "unicode", .. })
        ));

        let bad_advance = DOC.replace(r#"horiz-adv-x="280""#, r#"horiz-adv-x="wide""#);
        assert!(matches!(
            outline_to_compiled(bad_advance.as_bytes()),
            Err(ConversionError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn converters_reject_the_wrong_input() {
        assert!(compiled_to_woff2(b"not a font").is_err());
        assert!(compiled_to_woff(b"").is_err());
    }
}
