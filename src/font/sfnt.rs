// src/font/sfnt.rs

//! TrueType (sfnt) table builders and the table-directory container.
//!
//! `compile` turns a [`FontSource`] into a complete font with the ten tables
//! a simple static TrueType font needs. `read_tables` and `assemble_sfnt`
//! split and rebuild the container; the web-font decoders rely on
//! `assemble_sfnt` reproducing the exact bytes `compile` produced.

use std::collections::BTreeSet;

use log::debug;

use super::{ConversionError, Reader, Tag};
use crate::vectorizer::Point;

pub const TRUETYPE_FLAVOR: u32 = 0x0001_0000;
const HEAD_MAGIC: u32 = 0x5F0F_3CF5;
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;
/// Offset of `checkSumAdjustment` inside `head`.
const ADJUSTMENT_OFFSET: usize = 8;
const MAX_GLYPH_NAME: usize = 63;
/// Number of standard Macintosh glyph names `post` format 2 indexes before custom names.
const STANDARD_MAC_NAMES: u16 = 258;

/// One glyph to compile, in font units with y up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceGlyph {
    pub name: String,
    pub codepoint: Option<char>,
    pub advance: u16,
    /// Closed contours. Outer contours wind clockwise.
    pub contours: Vec<Vec<Point>>,
}

/// Everything `compile` needs. `notdef` becomes glyph 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSource {
    pub family: String,
    pub units_per_em: u16,
    pub ascent: i16,
    pub descent: i16,
    pub notdef: SourceGlyph,
    pub glyphs: Vec<SourceGlyph>,
}

// --- Big-endian writers ---

trait PutBe {
    fn put_u16(&mut self, v: u16);
    fn put_i16(&mut self, v: i16);
    fn put_u32(&mut self, v: u32);
}

impl PutBe for Vec<u8> {
    fn put_u16(&mut self, v: u16) {
        self.extend_from_slice(&v.to_be_bytes());
    }

    fn put_i16(&mut self, v: i16) {
        self.extend_from_slice(&v.to_be_bytes());
    }

    fn put_u32(&mut self, v: u32) {
        self.extend_from_slice(&v.to_be_bytes());
    }
}

// --- Checksums and the container ---

/// Sum of big-endian u32 words, the final partial word zero-padded.
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

/// A table as found in an sfnt directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord<'a> {
    pub tag: Tag,
    pub checksum: u32,
    pub data: &'a [u8],
}

/// The parsed directory of an sfnt file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfntTables<'a> {
    pub flavor: u32,
    pub tables: Vec<TableRecord<'a>>,
}

impl<'a> SfntTables<'a> {
    pub fn get(&self, tag: &Tag) -> Option<&'a [u8]> {
        self.tables.iter().find(|t| &t.tag == tag).map(|t| t.data)
    }
}

/// Splits an sfnt file into its tables, in directory order.
pub fn read_tables(font: &[u8]) -> Result<SfntTables<'_>, ConversionError> {
    let mut r = Reader::new(font, "sfnt header");
    let flavor = r.u32()?;
    if flavor != TRUETYPE_FLAVOR && &flavor.to_be_bytes() != b"true" {
        return Err(ConversionError::Signature {
            expected: "TrueType".to_string(),
            found: super::tag_str(flavor.to_be_bytes()),
        });
    }
    let count = r.u16()?;
    r.bytes(6)?;

    let mut dir = Reader::new(&font[12..], "sfnt table directory");
    let mut tables = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let tag = dir.tag()?;
        let checksum = dir.u32()?;
        let offset = dir.u32()? as usize;
        let length = dir.u32()? as usize;
        let data = offset
            .checked_add(length)
            .and_then(|end| font.get(offset..end))
            .ok_or(ConversionError::Truncated("sfnt table data"))?;
        tables.push(TableRecord { tag, checksum, data });
    }
    Ok(SfntTables { flavor, tables })
}

/// Lays tables out as an sfnt file: directory sorted by tag, each table
/// 4-byte aligned, checksums and `head.checkSumAdjustment` recomputed.
///
/// The adjustment is cleared before summing, so reassembling the tables of
/// an assembled font reproduces it exactly.
pub fn assemble_sfnt(flavor: u32, mut tables: Vec<(Tag, Vec<u8>)>) -> Vec<u8> {
    tables.sort_by(|a, b| a.0.cmp(&b.0));
    for (tag, data) in &mut tables {
        if tag == b"head" && data.len() >= ADJUSTMENT_OFFSET + 4 {
            data[ADJUSTMENT_OFFSET..ADJUSTMENT_OFFSET + 4].fill(0);
        }
    }

    let count = tables.len() as u16;
    let selector = if count == 0 { 0 } else { (u16::BITS - 1 - count.leading_zeros()) as u16 };
    let search_range = (1u16 << selector) * 16;

    let mut out = Vec::new();
    out.put_u32(flavor);
    out.put_u16(count);
    out.put_u16(search_range);
    out.put_u16(selector);
    out.put_u16((count * 16).saturating_sub(search_range));

    let mut offset = 12 + tables.len() * 16;
    let mut head_offset = None;
    for (tag, data) in &tables {
        if tag == b"head" {
            head_offset = Some(offset);
        }
        out.extend_from_slice(tag);
        out.put_u32(checksum(data));
        out.put_u32(offset as u32);
        out.put_u32(data.len() as u32);
        offset += super::pad4(data.len());
    }
    for (_, data) in &tables {
        out.extend_from_slice(data);
        out.resize(super::pad4(out.len()), 0);
    }

    if let Some(head) = head_offset.filter(|&h| h + ADJUSTMENT_OFFSET + 4 <= out.len()) {
        let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum(&out));
        let at = head + ADJUSTMENT_OFFSET;
        out[at..at + 4].copy_from_slice(&adjustment.to_be_bytes());
    }
    out
}

// --- Compilation ---

/// Per-glyph facts gathered while encoding `glyf`.
#[derive(Debug, Clone, Copy, Default)]
struct GlyphStats {
    x_min: i16,
    y_min: i16,
    x_max: i16,
    y_max: i16,
    points: u16,
    contours: u16,
}

struct Glyf {
    glyf: Vec<u8>,
    loca: Vec<u8>,
    short_loca: bool,
    stats: Vec<Option<GlyphStats>>,
}

fn coordinate(glyph: &str, value: i32) -> Result<i16, ConversionError> {
    i16::try_from(value).map_err(|_| ConversionError::CoordinateOutOfRange {
        glyph: glyph.to_string(),
        value,
    })
}

const ON_CURVE: u8 = 0x01;
const X_SHORT: u8 = 0x02;
const Y_SHORT: u8 = 0x04;
const REPEAT: u8 = 0x08;
const X_SAME_OR_POSITIVE: u8 = 0x10;
const Y_SAME_OR_POSITIVE: u8 = 0x20;

/// Flag bits and coordinate bytes for one delta.
fn delta_encoding(delta: i32, short: u8, same: u8, out: &mut Vec<u8>) -> u8 {
    if delta == 0 {
        same
    } else if (-255..=255).contains(&delta) {
        out.push(delta.unsigned_abs() as u8);
        if delta > 0 {
            short | same
        } else {
            short
        }
    } else {
        out.put_i16(delta as i16);
        0
    }
}

/// Encodes one simple glyph. Empty outlines encode to zero bytes.
fn encode_glyph(glyph: &SourceGlyph) -> Result<(Vec<u8>, Option<GlyphStats>), ConversionError> {
    let contours: Vec<&Vec<Point>> = glyph.contours.iter().filter(|c| !c.is_empty()).collect();
    if contours.is_empty() {
        return Ok((Vec::new(), None));
    }

    let mut stats = GlyphStats {
        x_min: i16::MAX,
        y_min: i16::MAX,
        x_max: i16::MIN,
        y_max: i16::MIN,
        ..GlyphStats::default()
    };
    let mut end_points = Vec::with_capacity(contours.len());
    let mut points = Vec::new();
    for contour in &contours {
        for p in contour.iter() {
            let (x, y) = (coordinate(&glyph.name, p.x)?, coordinate(&glyph.name, p.y)?);
            stats.x_min = stats.x_min.min(x);
            stats.y_min = stats.y_min.min(y);
            stats.x_max = stats.x_max.max(x);
            stats.y_max = stats.y_max.max(y);
            points.push((i32::from(x), i32::from(y)));
        }
        end_points.push(points.len() - 1);
    }
    let point_count = u16::try_from(points.len()).map_err(|_| ConversionError::CoordinateOutOfRange {
        glyph: glyph.name.clone(),
        value: points.len() as i32,
    })?;
    stats.points = point_count;
    stats.contours = contours.len() as u16;

    let mut flags = Vec::with_capacity(points.len());
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let (mut px, mut py) = (0, 0);
    for &(x, y) in &points {
        let fx = delta_encoding(x - px, X_SHORT, X_SAME_OR_POSITIVE, &mut xs);
        let fy = delta_encoding(y - py, Y_SHORT, Y_SAME_OR_POSITIVE, &mut ys);
        flags.push(ON_CURVE | fx | fy);
        (px, py) = (x, y);
    }

    let mut out = Vec::new();
    out.put_i16(stats.contours as i16);
    out.put_i16(stats.x_min);
    out.put_i16(stats.y_min);
    out.put_i16(stats.x_max);
    out.put_i16(stats.y_max);
    for end in end_points {
        out.put_u16(end as u16);
    }
    out.put_u16(0); // instructionLength

    let mut i = 0;
    while i < flags.len() {
        let flag = flags[i];
        let run = flags[i + 1..].iter().take(255).take_while(|&&f| f == flag).count();
        if run > 0 {
            out.push(flag | REPEAT);
            out.push(run as u8);
        } else {
            out.push(flag);
        }
        i += 1 + run;
    }
    out.extend_from_slice(&xs);
    out.extend_from_slice(&ys);
    if out.len() % 2 == 1 {
        out.push(0);
    }
    Ok((out, Some(stats)))
}

fn build_glyf(glyphs: &[&SourceGlyph]) -> Result<Glyf, ConversionError> {
    let mut glyf = Vec::new();
    let mut offsets = Vec::with_capacity(glyphs.len() + 1);
    let mut stats = Vec::with_capacity(glyphs.len());
    for glyph in glyphs {
        offsets.push(glyf.len() as u32);
        let (bytes, glyph_stats) = encode_glyph(glyph)?;
        glyf.extend_from_slice(&bytes);
        stats.push(glyph_stats);
    }
    offsets.push(glyf.len() as u32);

    let short_loca = offsets.last().is_some_and(|&end| end <= 0x1FFFE);
    let mut loca = Vec::new();
    for offset in offsets {
        if short_loca {
            loca.put_u16((offset / 2) as u16);
        } else {
            loca.put_u32(offset);
        }
    }
    Ok(Glyf {
        glyf,
        loca,
        short_loca,
        stats,
    })
}

fn validate(source: &FontSource) -> Result<(), ConversionError> {
    let total = source.glyphs.len() + 1;
    if total > usize::from(u16::MAX) {
        return Err(ConversionError::TooManyGlyphs(total));
    }
    let mut seen = BTreeSet::new();
    for glyph in &source.glyphs {
        let name_ok = !glyph.name.is_empty()
            && glyph.name.len() <= MAX_GLYPH_NAME
            && glyph.name.bytes().all(|b| b.is_ascii_graphic());
        if !name_ok {
            return Err(ConversionError::InvalidGlyphName(glyph.name.clone()));
        }
        if let Some(c) = glyph.codepoint {
            let cp = c as u32;
            if cp >= 0xFFFF {
                return Err(ConversionError::CodepointOutsideBmp {
                    glyph: glyph.name.clone(),
                    codepoint: cp,
                });
            }
            if !seen.insert(cp) {
                return Err(ConversionError::DuplicateCodepoint(cp));
            }
        }
    }
    Ok(())
}

/// Compiles `source` into a TrueType font.
pub fn compile(source: &FontSource) -> Result<Vec<u8>, ConversionError> {
    validate(source)?;
    let glyphs: Vec<&SourceGlyph> = std::iter::once(&source.notdef).chain(&source.glyphs).collect();
    let glyf = build_glyf(&glyphs)?;

    let mut mapping: Vec<(u16, u16)> = glyphs
        .iter()
        .enumerate()
        .filter_map(|(gid, g)| g.codepoint.map(|c| (c as u32 as u16, gid as u16)))
        .collect();
    mapping.sort_unstable();

    let metrics = Metrics::gather(source, &glyphs, &glyf.stats);
    let tables = vec![
        (*b"OS/2", build_os2(source, &mapping, &metrics)),
        (*b"cmap", build_cmap(&mapping)),
        (*b"head", build_head(source, &metrics, glyf.short_loca)),
        (*b"hhea", build_hhea(source, &metrics, glyphs.len() as u16)),
        (*b"hmtx", build_hmtx(&glyphs, &glyf.stats)),
        (*b"maxp", build_maxp(glyphs.len() as u16, &glyf.stats)),
        (*b"name", build_name(&source.family)),
        (*b"post", build_post(source, &glyphs)),
        (*b"glyf", glyf.glyf),
        (*b"loca", glyf.loca),
    ];
    let font = assemble_sfnt(TRUETYPE_FLAVOR, tables);
    debug!(
        "Compiled {} glyphs ({} mapped) into {} bytes",
        glyphs.len(),
        mapping.len(),
        font.len()
    );
    Ok(font)
}

/// Font-wide extents.
#[derive(Debug, Clone, Copy, Default)]
struct Metrics {
    x_min: i16,
    y_min: i16,
    x_max: i16,
    y_max: i16,
    advance_max: u16,
    advance_avg: i16,
    min_lsb: i16,
    min_rsb: i16,
    max_extent: i16,
}

impl Metrics {
    fn gather(source: &FontSource, glyphs: &[&SourceGlyph], stats: &[Option<GlyphStats>]) -> Metrics {
        let mut m = Metrics::default();
        let mut first = true;
        for (glyph, stats) in glyphs.iter().zip(stats) {
            m.advance_max = m.advance_max.max(glyph.advance);
            let Some(s) = stats else { continue };
            let rsb = glyph.advance as i32 - i32::from(s.x_max);
            if first {
                (m.x_min, m.y_min, m.x_max, m.y_max) = (s.x_min, s.y_min, s.x_max, s.y_max);
                (m.min_lsb, m.min_rsb, m.max_extent) = (s.x_min, rsb as i16, s.x_max);
                first = false;
            } else {
                m.x_min = m.x_min.min(s.x_min);
                m.y_min = m.y_min.min(s.y_min);
                m.x_max = m.x_max.max(s.x_max);
                m.y_max = m.y_max.max(s.y_max);
                m.min_lsb = m.min_lsb.min(s.x_min);
                m.min_rsb = m.min_rsb.min(rsb as i16);
                m.max_extent = m.max_extent.max(s.x_max);
            }
        }
        let advances: Vec<u32> = source
            .glyphs
            .iter()
            .filter(|g| g.advance > 0)
            .map(|g| u32::from(g.advance))
            .collect();
        if !advances.is_empty() {
            m.advance_avg = (advances.iter().sum::<u32>() / advances.len() as u32) as i16;
        }
        m
    }
}

fn build_head(source: &FontSource, m: &Metrics, short_loca: bool) -> Vec<u8> {
    let mut t = Vec::with_capacity(54);
    t.put_u32(0x0001_0000); // version
    t.put_u32(0x0001_0000); // fontRevision 1.0
    t.put_u32(0); // checkSumAdjustment
    t.put_u32(HEAD_MAGIC);
    t.put_u16(0x000B); // baseline at y=0, lsb at x=0, integer scaling
    t.put_u16(source.units_per_em);
    t.extend_from_slice(&[0; 16]); // created, modified
    t.put_i16(m.x_min);
    t.put_i16(m.y_min);
    t.put_i16(m.x_max);
    t.put_i16(m.y_max);
    t.put_u16(0); // macStyle
    t.put_u16(8); // lowestRecPPEM
    t.put_i16(2); // fontDirectionHint
    t.put_i16(if short_loca { 0 } else { 1 });
    t.put_i16(0); // glyphDataFormat
    t
}

fn build_hhea(source: &FontSource, m: &Metrics, glyph_count: u16) -> Vec<u8> {
    let mut t = Vec::with_capacity(36);
    t.put_u32(0x0001_0000);
    t.put_i16(source.ascent);
    t.put_i16(source.descent);
    t.put_i16(0); // lineGap
    t.put_u16(m.advance_max);
    t.put_i16(m.min_lsb);
    t.put_i16(m.min_rsb);
    t.put_i16(m.max_extent);
    t.put_i16(1); // caretSlopeRise
    t.put_i16(0); // caretSlopeRun
    t.put_i16(0); // caretOffset
    t.extend_from_slice(&[0; 8]);
    t.put_i16(0); // metricDataFormat
    t.put_u16(glyph_count);
    t
}

fn build_hmtx(glyphs: &[&SourceGlyph], stats: &[Option<GlyphStats>]) -> Vec<u8> {
    let mut t = Vec::with_capacity(glyphs.len() * 4);
    for (glyph, stats) in glyphs.iter().zip(stats) {
        t.put_u16(glyph.advance);
        t.put_i16(stats.map_or(0, |s| s.x_min));
    }
    t
}

fn build_maxp(glyph_count: u16, stats: &[Option<GlyphStats>]) -> Vec<u8> {
    let max_points = stats.iter().flatten().map(|s| s.points).max().unwrap_or(0);
    let max_contours = stats.iter().flatten().map(|s| s.contours).max().unwrap_or(0);
    let mut t = Vec::with_capacity(32);
    t.put_u32(0x0001_0000);
    t.put_u16(glyph_count);
    t.put_u16(max_points);
    t.put_u16(max_contours);
    t.put_u16(0); // maxCompositePoints
    t.put_u16(0); // maxCompositeContours
    t.put_u16(2); // maxZones
    t.extend_from_slice(&[0; 16]); // hinting limits and component limits
    t
}

fn build_os2(source: &FontSource, mapping: &[(u16, u16)], m: &Metrics) -> Vec<u8> {
    let upm = i32::from(source.units_per_em);
    let scaled = |per_mille: i32| (upm * per_mille / 1000) as i16;
    let first = mapping.first().map_or(0, |&(c, _)| c);
    let last = mapping.last().map_or(0, |&(c, _)| c);
    let mut range1 = 0u32;
    let mut range2 = 0u32;
    for &(c, _) in mapping {
        match c {
            0x0000..=0x007F => range1 |= 1,
            0x0080..=0x00FF => range1 |= 1 << 1,
            0xE000..=0xF8FF => range2 |= 1 << 28, // Private Use Area, bit 60
            _ => {}
        }
    }

    let mut t = Vec::with_capacity(96);
    t.put_u16(4); // version
    t.put_i16(m.advance_avg);
    t.put_u16(400); // usWeightClass
    t.put_u16(5); // usWidthClass
    t.put_u16(0); // fsType: installable
    for v in [650, 600, 0, 75, 650, 600, 0, 350] {
        t.put_i16(scaled(v)); // sub/superscript size and offset
    }
    t.put_i16(scaled(50)); // yStrikeoutSize
    t.put_i16(scaled(250)); // yStrikeoutPosition
    t.put_i16(0); // sFamilyClass
    t.extend_from_slice(&[0; 10]); // panose
    t.put_u32(range1);
    t.put_u32(range2);
    t.put_u32(0);
    t.put_u32(0);
    t.extend_from_slice(b"NONE");
    t.put_u16(0x0040 | 0x0080); // REGULAR | USE_TYPO_METRICS
    t.put_u16(first);
    t.put_u16(last);
    t.put_i16(source.ascent);
    t.put_i16(source.descent);
    t.put_i16(0); // sTypoLineGap
    t.put_u16(m.y_max.max(source.ascent).max(0) as u16);
    t.put_u16((-i32::from(m.y_min.min(source.descent))).max(0) as u16);
    t.put_u32(1); // ulCodePageRange1: Latin 1
    t.put_u32(0);
    t.put_i16(m.y_max); // sxHeight: no lowercase, same as caps
    t.put_i16(m.y_max); // sCapHeight
    t.put_u16(0); // usDefaultChar
    t.put_u16(0x20); // usBreakChar
    t.put_u16(0); // usMaxContext
    t
}

/// `cmap` with one format 4 subtable shared by the Unicode and Windows
/// platforms. Each segment maps a run of consecutive codepoints to
/// consecutive glyph ids, so `idDelta` alone describes it.
fn build_cmap(mapping: &[(u16, u16)]) -> Vec<u8> {
    // (start, end, delta)
    let mut segments: Vec<(u16, u16, i16)> = Vec::new();
    let mut prev_gid = 0u16;
    for &(code, gid) in mapping {
        match segments.last_mut() {
            Some(seg) if u32::from(code) == u32::from(seg.1) + 1 && u32::from(gid) == u32::from(prev_gid) + 1 => {
                seg.1 = code;
            }
            _ => segments.push((code, code, gid.wrapping_sub(code) as i16)),
        }
        prev_gid = gid;
    }
    segments.push((0xFFFF, 0xFFFF, 1));

    let seg_count = segments.len() as u16;
    let selector = (u16::BITS - 1 - seg_count.leading_zeros()) as u16;
    let search_range = (1u16 << selector) * 2;

    let mut sub = Vec::new();
    sub.put_u16(4); // format
    sub.put_u16(16 + seg_count * 8); // length
    sub.put_u16(0); // language
    sub.put_u16(seg_count * 2);
    sub.put_u16(search_range);
    sub.put_u16(selector);
    sub.put_u16(seg_count * 2 - search_range);
    for &(_, end, _) in &segments {
        sub.put_u16(end);
    }
    sub.put_u16(0); // reservedPad
    for &(start, _, _) in &segments {
        sub.put_u16(start);
    }
    for &(_, _, delta) in &segments {
        sub.put_i16(delta);
    }
    for _ in &segments {
        sub.put_u16(0); // idRangeOffset
    }

    let mut t = Vec::with_capacity(20 + sub.len());
    t.put_u16(0); // version
    t.put_u16(2); // numTables
    for (platform, encoding) in [(0u16, 3u16), (3, 1)] {
        t.put_u16(platform);
        t.put_u16(encoding);
        t.put_u32(20);
    }
    t.extend_from_slice(&sub);
    t
}

/// PostScript name: printable ASCII minus the characters PostScript reserves.
fn postscript_name(family: &str) -> String {
    let base: String = family
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"[](){}<>/%".contains(*c))
        .collect();
    let base = if base.is_empty() { "Untitled".to_string() } else { base };
    let mut name = format!("{base}-Regular");
    name.truncate(63);
    name
}

fn build_name(family: &str) -> Vec<u8> {
    let ps = postscript_name(family);
    let records = [
        (1u16, family.to_string()),
        (2, "Regular".to_string()),
        (3, format!("1.000;NONE;{ps}")),
        (4, family.to_string()),
        (5, "Version 1.000".to_string()),
        (6, ps),
    ];

    let mut strings = Vec::new();
    let mut t = Vec::new();
    t.put_u16(0); // format
    t.put_u16(records.len() as u16);
    t.put_u16(6 + 12 * records.len() as u16);
    for (id, text) in &records {
        let encoded: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        t.put_u16(3); // Windows
        t.put_u16(1); // Unicode BMP
        t.put_u16(0x0409); // en-US
        t.put_u16(*id);
        t.put_u16(encoded.len() as u16);
        t.put_u16(strings.len() as u16);
        strings.extend_from_slice(&encoded);
    }
    t.extend_from_slice(&strings);
    t
}

/// `post` format 2: `.notdef` uses the standard name, every other glyph a
/// custom Pascal string.
fn build_post(source: &FontSource, glyphs: &[&SourceGlyph]) -> Vec<u8> {
    let upm = i32::from(source.units_per_em);
    let mut t = Vec::new();
    t.put_u32(0x0002_0000);
    t.put_u32(0); // italicAngle
    t.put_i16((-upm / 10) as i16); // underlinePosition
    t.put_i16((upm / 20) as i16); // underlineThickness
    t.put_u32(0); // isFixedPitch
    t.extend_from_slice(&[0; 16]); // memory usage hints
    t.put_u16(glyphs.len() as u16);

    let mut names = Vec::new();
    let mut custom = 0u16;
    for (gid, glyph) in glyphs.iter().enumerate() {
        if gid == 0 {
            t.put_u16(0);
            continue;
        }
        t.put_u16(STANDARD_MAC_NAMES + custom);
        custom += 1;
        names.push(glyph.name.len() as u8);
        names.extend_from_slice(glyph.name.as_bytes());
    }
    t.extend_from_slice(&names);
    t
}
