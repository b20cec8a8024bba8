// src/svg.rs

//! SVG output: per-glyph icon documents for the font assembler, themed
//! pixel previews, favicons, and the `<text>`-based `text_to_svg` helper.

use std::borrow::Cow;
use std::fmt::Write as _;

use log::{debug, trace};
use thiserror::Error;

use crate::alphabet::{self, Alphabet};
use crate::config::CONFIG;
use crate::glyph::{Cell, Glyph, GRID_ROWS};
use crate::optimizer::{self, Block};
use crate::theme::Theme;
use crate::vectorizer::{self, Outline, VectorizeOptions, YAxis};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Largest accepted pixels-per-cell value.
pub const MAX_BLOCK_SIZE: u32 = 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("no glyph for character {character:?} (U+{code:04X})", code = u32::from(*.character))]
    MissingGlyph { character: char },
    #[error("block size {block_size} is outside 1..={max}", max = MAX_BLOCK_SIZE)]
    InvalidBlockSize { block_size: u32 },
    #[error("text does not fit in a {max}-pixel canvas", max = i32::MAX)]
    CanvasTooLarge,
}

/// Checks a pixels-per-cell value and converts it for coordinate math.
fn block_unit(block_size: u32) -> Result<i32, RenderError> {
    if (1..=MAX_BLOCK_SIZE).contains(&block_size) {
        Ok(block_size as i32)
    } else {
        Err(RenderError::InvalidBlockSize { block_size })
    }
}

/// What to do with characters that have no glyph.
///
/// `Strict` is the default: font generation and text renders fail on the
/// first unknown character. `BestEffort` must be requested explicitly and
/// drops unknown characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingGlyphPolicy {
    #[default]
    Strict,
    BestEffort,
}

/// Characters XML 1.0 cannot carry, even as references.
fn is_non_xml_char(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
}

/// Escapes the five XML special characters and drops characters XML does
/// not allow.
///
/// Existing character or entity references are left untouched, so escaping
/// twice yields the same string as escaping once.
pub fn escape_xml(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) && !input.contains(is_non_xml_char) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 16);
    for (i, c) in input.char_indices() {
        match c {
            _ if is_non_xml_char(c) => {}
            '&' if starts_with_reference(&input[i..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn starts_with_reference(s: &str) -> bool {
    const NAMED: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"];
    if NAMED.iter().any(|n| s.starts_with(n)) {
        return true;
    }
    let Some(rest) = s.strip_prefix("&#") else {
        return false;
    };
    let (digits, radix) = match rest.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16),
        None => (rest, 10),
    };
    let Some(end) = digits.find(';') else {
        return false;
    };
    end > 0 && digits[..end].chars().all(|c| c.is_digit(radix))
}

/// Formats a number without a trailing `.0`, rounded to two decimals.
fn num(v: f64) -> String {
    let r = (v * 100.0).round() / 100.0;
    format!("{}", r)
}

// --- Glyph icons ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconOptions {
    /// Pixels per grid cell.
    pub block_size: u32,
    pub optimize: bool,
    /// Blank columns after the glyph, counted in the advance.
    pub letter_spacing: u16,
}

impl Default for IconOptions {
    fn default() -> Self {
        IconOptions {
            block_size: CONFIG.render.block_size,
            optimize: CONFIG.render.optimize,
            letter_spacing: CONFIG.font.letter_spacing,
        }
    }
}

/// A standalone vector icon for one glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphIcon {
    /// Unique identifier, the glyph name.
    pub name: String,
    pub codepoint: char,
    /// Width in columns.
    pub columns: usize,
    pub block_size: u32,
    /// Outlines in icon space (y down, `block_size` per cell).
    pub outlines: Vec<Outline>,
    pub path: String,
    /// Horizontal advance in icon units, spacing included.
    pub advance: u32,
    pub svg: String,
}

impl GlyphIcon {
    pub fn file_name(&self) -> String {
        format!("{}.svg", self.name)
    }

    pub fn width(&self) -> u32 {
        self.columns as u32 * self.block_size
    }

    pub fn height(&self) -> u32 {
        GRID_ROWS as u32 * self.block_size
    }
}

/// Renders `glyph` as a standalone SVG document.
pub fn glyph_icon(glyph: &Glyph, options: &IconOptions) -> Result<GlyphIcon, RenderError> {
    let vectorize = VectorizeOptions {
        unit: block_unit(options.block_size)?,
        optimize: options.optimize,
        y_axis: YAxis::Down,
    };
    let outlines = vectorizer::vectorize(glyph, &vectorize);
    let path = vectorizer::path_data(&outlines);
    let width = glyph.width() as u32 * options.block_size;
    let height = glyph.rows() as u32 * options.block_size;

    let mut svg = format!(
        r#"<svg xmlns="{SVG_NAMESPACE}" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    if !path.is_empty() {
        let _ = write!(svg, r#"<path d="{}"/>"#, path);
    }
    svg.push_str("</svg>\n");

    trace!("Icon '{}': {} outlines", glyph.name(), outlines.len());
    Ok(GlyphIcon {
        name: glyph.name().to_string(),
        codepoint: glyph.codepoint(),
        columns: glyph.width(),
        block_size: options.block_size,
        outlines,
        path,
        advance: (glyph.width() as u32 + u32::from(options.letter_spacing)) * options.block_size,
        svg,
    })
}

/// Which glyphs to emit.
#[derive(Debug, Clone, Copy)]
pub enum Selection<'a> {
    /// Every glyph in the alphabet.
    All,
    /// The distinct characters of a text, in order of first appearance.
    /// Control characters are ignored.
    Text(&'a str),
}

/// Emits icons for a selection of the alphabet.
pub fn emit_icons(
    alphabet: &Alphabet,
    selection: Selection<'_>,
    options: &IconOptions,
    policy: MissingGlyphPolicy,
) -> Result<Vec<GlyphIcon>, RenderError> {
    let icons: Vec<GlyphIcon> = match selection {
        Selection::All => alphabet
            .entries()
            .map(|g| glyph_icon(g, options))
            .collect::<Result<_, _>>()?,
        Selection::Text(text) => {
            let mut seen = Vec::new();
            let mut icons = Vec::new();
            for c in text.chars().filter(|c| !c.is_control()) {
                let Some(glyph) = resolve(alphabet, c, policy)? else {
                    continue;
                };
                if seen.contains(&glyph.name()) {
                    continue;
                }
                seen.push(glyph.name());
                icons.push(glyph_icon(glyph, options)?);
            }
            icons
        }
    };
    debug!("Emitted {} glyph icons", icons.len());
    Ok(icons)
}

fn resolve(alphabet: &Alphabet, c: char, policy: MissingGlyphPolicy) -> Result<Option<&Glyph>, RenderError> {
    match (alphabet.glyph_for_char(c), policy) {
        (Some(glyph), _) => Ok(Some(glyph)),
        (None, MissingGlyphPolicy::Strict) => Err(RenderError::MissingGlyph { character: c }),
        (None, MissingGlyphPolicy::BestEffort) => {
            debug!("Skipping {:?}: no glyph", c);
            Ok(None)
        }
    }
}

// --- Themed previews ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub block_size: u32,
    pub optimize: bool,
    pub theme: Theme,
    pub policy: MissingGlyphPolicy,
    pub letter_spacing: u16,
    /// Paint the theme background behind the text.
    pub background: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            block_size: CONFIG.render.block_size,
            optimize: CONFIG.render.optimize,
            theme: Theme::by_name_or_default(&CONFIG.render.theme),
            policy: MissingGlyphPolicy::Strict,
            letter_spacing: CONFIG.font.letter_spacing,
            background: true,
        }
    }
}

/// Blocks of one cell kind, coalesced or per cell.
fn kind_blocks(glyph: &Glyph, kind: Cell, optimize: bool) -> Vec<Block> {
    if optimize {
        optimizer::coalesce_matching(glyph, |c| c == kind)
    } else {
        optimizer::per_cell(glyph)
            .into_iter()
            .filter(|b| glyph.cell(b.row, b.col) == Some(kind))
            .collect()
    }
}

/// Appends `<path>` elements for `glyph` at `(x, y)` in pixels.
fn push_glyph_paths(out: &mut String, glyph: &Glyph, x: i32, y: i32, unit: i32, optimize: bool, theme: &Theme) {
    let options = VectorizeOptions {
        unit,
        optimize,
        y_axis: YAxis::Down,
    };
    let layers = [(Cell::Ink, theme.glyph_color(glyph)), (Cell::Accent, theme.accent)];
    for (kind, color) in layers {
        let outlines: Vec<Outline> = kind_blocks(glyph, kind, optimize)
            .iter()
            .map(|b| {
                let mut o = vectorizer::block_outline(b, glyph.rows(), &options);
                o.translate(x, y);
                o
            })
            .collect();
        if outlines.is_empty() {
            continue;
        }
        let _ = write!(
            out,
            r#"<path fill="{}" d="{}"/>"#,
            color,
            vectorizer::path_data(&outlines)
        );
    }
}

/// Renders text as themed block paths. `\n` starts a new line one blank row below.
pub fn render_text(alphabet: &Alphabet, text: &str, options: &RenderOptions) -> Result<String, RenderError> {
    let bs = block_unit(options.block_size)?;
    let gap = i32::from(options.letter_spacing) * bs;
    let line_height = (GRID_ROWS as i32 + 1) * bs;
    let fits = |v: Option<i32>| v.ok_or(RenderError::CanvasTooLarge);

    let mut body = String::new();
    let mut width = 0;
    let mut y: i32 = 0;
    for (line_no, line) in text.split('\n').enumerate() {
        if line_no > 0 {
            y = fits(y.checked_add(line_height))?;
        }
        let mut x = 0i32;
        let mut placed = false;
        for c in line.chars().filter(|c| !c.is_control()) {
            let Some(glyph) = resolve(alphabet, c, options.policy)? else {
                continue;
            };
            if placed {
                x = fits(x.checked_add(gap))?;
            }
            push_glyph_paths(&mut body, glyph, x, y, bs, options.optimize, &options.theme);
            x = fits(x.checked_add(glyph.width() as i32 * bs))?;
            placed = true;
        }
        width = width.max(x);
    }
    let height = fits(y.checked_add(GRID_ROWS as i32 * bs))?;

    let mut svg = format!(
        r#"<svg xmlns="{SVG_NAMESPACE}" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    if options.background {
        let _ = write!(svg, r#"<rect width="100%" height="100%" fill="{}"/>"#, options.theme.background);
    }
    svg.push_str(&body);
    svg.push_str("</svg>");
    Ok(svg)
}

/// Renders one glyph centered on a rounded square in the theme's background.
pub fn favicon_svg(glyph: &Glyph, theme: &Theme, block_size: u32) -> Result<String, RenderError> {
    let bs = block_unit(block_size)?;
    let cells = glyph.width().max(glyph.rows()) as i32 + 2;
    let side = cells * bs;
    let x = (side - glyph.width() as i32 * bs) / 2;
    let y = (side - glyph.rows() as i32 * bs) / 2;

    let mut svg = format!(
        r#"<svg xmlns="{SVG_NAMESPACE}" width="{side}" height="{side}" viewBox="0 0 {side} {side}"><rect width="{side}" height="{side}" rx="{bs}" fill="{}"/>"#,
        theme.background
    );
    push_glyph_paths(&mut svg, glyph, x, y, bs, true, theme);
    svg.push_str("</svg>");
    Ok(svg)
}

// --- Text elements ---

/// Options for [`text_to_svg`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextSvgOptions {
    pub font_size: f64,
    pub color: String,
    pub font_family: String,
    /// Overrides the estimated width.
    pub width: Option<f64>,
    /// Overrides the estimated height.
    pub height: Option<f64>,
    pub include_namespace: bool,
    pub role: Option<String>,
    pub aria_label: Option<String>,
}

impl Default for TextSvgOptions {
    fn default() -> Self {
        TextSvgOptions {
            font_size: 48.0,
            color: "#000".to_string(),
            font_family: CONFIG.font.family_name.clone(),
            width: None,
            height: None,
            include_namespace: true,
            role: None,
            aria_label: None,
        }
    }
}

/// Advance of `c` in ems, from the alphabet when it has the glyph.
fn advance_em(c: char) -> f64 {
    let font = &CONFIG.font;
    alphabet::alphabet()
        .ok()
        .and_then(|a| a.glyph_for_char(c))
        .map(|g| {
            let columns = g.width() as f64 + f64::from(font.letter_spacing);
            columns * f64::from(font.cell_units) / f64::from(font.units_per_em)
        })
        .unwrap_or(0.6)
}

/// Wraps `text` in an SVG `<text>` element set in the pipeline's font.
///
/// The text and every attribute value are XML-escaped. Without explicit
/// dimensions the width follows the glyph advances and the height spans
/// ascent to descent.
pub fn text_to_svg(text: &str, options: &TextSvgOptions) -> String {
    let font = &CONFIG.font;
    let em = f64::from(font.units_per_em);
    let size = options.font_size;
    let width = options
        .width
        .unwrap_or_else(|| text.chars().map(advance_em).sum::<f64>() * size);
    let height = options
        .height
        .unwrap_or_else(|| f64::from(i32::from(font.ascent) - i32::from(font.descent)) / em * size);
    let baseline = f64::from(font.ascent) / em * size;

    let mut svg = String::from("<svg");
    if options.include_namespace {
        let _ = write!(svg, r#" xmlns="{SVG_NAMESPACE}""#);
    }
    let (w, h) = (num(width), num(height));
    let _ = write!(svg, r#" width="{w}" height="{h}" viewBox="0 0 {w} {h}""#);
    if let Some(role) = &options.role {
        let _ = write!(svg, r#" role="{}""#, escape_xml(role));
    }
    if let Some(label) = &options.aria_label {
        let _ = write!(svg, r#" aria-label="{}""#, escape_xml(label));
    }
    let _ = write!(
        svg,
        r#"><text x="0" y="{}" font-family="{}" font-size="{}" fill="{}">{}</text></svg>"#,
        num(baseline),
        escape_xml(&options.font_family),
        num(size),
        escape_xml(&options.color),
        escape_xml(text)
    );
    svg
}
