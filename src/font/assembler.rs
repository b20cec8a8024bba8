// src/font/assembler.rs

//! Stitches glyph icons into one SVG font document.
//!
//! Icon outlines live in pixel space (y down, `block_size` per cell). The
//! assembler rescales them to `cell_units` per cell and flips them so the
//! baseline sits at y = 0 and the top grid row ends at the cap height.

use std::fmt::Write as _;

use log::debug;

use crate::config::{FontConfig, CONFIG};
use crate::glyph::GRID_ROWS;
use crate::svg::{escape_xml, GlyphIcon, SVG_NAMESPACE};
use crate::vectorizer::{self, Outline, Point};

/// Width of the `.notdef` box, in cells.
const NOTDEF_COLUMNS: i32 = 3;

/// Naming and metrics written into the `<font-face>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontMetadata {
    pub family: String,
    pub units_per_em: u16,
    pub cell_units: u16,
    pub ascent: i16,
    pub descent: i16,
    pub letter_spacing: u16,
}

impl From<&FontConfig> for FontMetadata {
    fn from(font: &FontConfig) -> Self {
        FontMetadata {
            family: font.family_name.clone(),
            units_per_em: font.units_per_em,
            cell_units: font.cell_units,
            ascent: font.ascent,
            descent: font.descent,
            letter_spacing: font.letter_spacing,
        }
    }
}

impl Default for FontMetadata {
    fn default() -> Self {
        FontMetadata::from(&CONFIG.font)
    }
}

impl FontMetadata {
    fn cell(&self) -> i32 {
        i32::from(self.cell_units)
    }

    pub fn cap_height(&self) -> i32 {
        GRID_ROWS as i32 * self.cell()
    }

    /// Advance for a glyph `columns` wide, spacing included.
    pub fn advance(&self, columns: usize) -> i32 {
        (columns as i32 + i32::from(self.letter_spacing)) * self.cell()
    }
}

/// The serialized SVG font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineFontDocument {
    pub xml: String,
    pub glyph_count: usize,
}

impl OutlineFontDocument {
    pub fn as_bytes(&self) -> &[u8] {
        self.xml.as_bytes()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.xml.into_bytes()
    }
}

/// Converts icon outlines to font units with y up.
fn to_font_space(icon: &GlyphIcon, meta: &FontMetadata) -> Vec<Outline> {
    let block = icon.block_size.max(1) as i32;
    let height = GRID_ROWS as i32 * block;
    let cell = meta.cell();
    icon.outlines
        .iter()
        .map(|outline| {
            let points = outline
                .points
                .iter()
                .map(|p| Point::new(p.x * cell / block, (height - p.y) * cell / block))
                .collect();
            let mut outline = Outline::new(points);
            outline.simplify();
            outline
        })
        .filter(|o| o.points.len() >= 3)
        .collect()
}

/// A hollow box: clockwise outer contour, counter-clockwise inner contour.
fn notdef_outlines(meta: &FontMetadata) -> Vec<Outline> {
    let cell = meta.cell();
    let (w, h) = (NOTDEF_COLUMNS * cell, meta.cap_height());
    let inset = (cell / 2).max(1);
    let outer = Outline::new(vec![
        Point::new(0, 0),
        Point::new(0, h),
        Point::new(w, h),
        Point::new(w, 0),
    ]);
    let inner = Outline::new(vec![
        Point::new(inset, inset),
        Point::new(w - inset, inset),
        Point::new(w - inset, h - inset),
        Point::new(inset, h - inset),
    ]);
    vec![outer, inner]
}

/// `unicode` attribute value: XML-escaped ASCII, a character reference otherwise.
fn unicode_attribute(c: char) -> String {
    if c.is_ascii() && !c.is_ascii_control() {
        escape_xml(c.encode_utf8(&mut [0; 4])).into_owned()
    } else {
        format!("&#x{:X};", c as u32)
    }
}

/// Builds the SVG font for `icons`, one `<glyph>` per icon in order.
pub fn assemble(icons: &[GlyphIcon], meta: &FontMetadata) -> OutlineFontDocument {
    let default_advance = meta.advance(NOTDEF_COLUMNS as usize);
    let family = escape_xml(&meta.family);

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(xml, r#"<svg xmlns="{SVG_NAMESPACE}"><defs>"#);
    let _ = writeln!(xml, r#"<font id="{family}" horiz-adv-x="{default_advance}">"#);
    let _ = writeln!(
        xml,
        r#"<font-face font-family="{family}" units-per-em="{}" ascent="{}" descent="{}" cap-height="{}"/>"#,
        meta.units_per_em,
        meta.ascent,
        meta.descent,
        meta.cap_height()
    );
    let _ = writeln!(
        xml,
        r#"<missing-glyph horiz-adv-x="{default_advance}" d="{}"/>"#,
        vectorizer::path_data(&notdef_outlines(meta))
    );

    for icon in icons {
        let outlines = to_font_space(icon, meta);
        let _ = write!(
            xml,
            r#"<glyph glyph-name="{}" unicode="{}" horiz-adv-x="{}""#,
            escape_xml(&icon.name),
            unicode_attribute(icon.codepoint),
            meta.advance(icon.columns)
        );
        if !outlines.is_empty() {
            let _ = write!(xml, r#" d="{}""#, vectorizer::path_data(&outlines));
        }
        xml.push_str("/>\n");
    }
    xml.push_str("</font>\n</defs></svg>\n");

    debug!("Assembled SVG font with {} glyphs ({} bytes)", icons.len(), xml.len());
    OutlineFontDocument {
        xml,
        glyph_count: icons.len(),
    }
}
