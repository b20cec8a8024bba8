// src/font/mod.rs

//! Font assembly and binary conversion.
//!
//! ```text
//! GlyphIcon[] → [assembler] → SVG font document
//!             → [convert::outline_to_compiled] → TrueType
//!             → [convert::compiled_to_woff2]   → WOFF2
//!             → [convert::compiled_to_woff]    → WOFF
//! ```
//!
//! Every conversion is a pure function from bytes to bytes.

pub mod assembler;
pub mod convert;
pub mod path;
pub mod sfnt;
pub mod woff;
pub mod woff2;

use std::fmt;

use thiserror::Error;

pub use assembler::{assemble, FontMetadata, OutlineFontDocument};
pub use convert::{
    compiled_to_woff, compiled_to_woff2, outline_to_compiled, woff2_to_compiled, woff_to_compiled,
};

/// A four-byte table or signature tag.
pub type Tag = [u8; 4];

/// Renders a tag for messages, replacing non-printable bytes.
pub fn tag_str(tag: Tag) -> String {
    tag.iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect()
}

/// The three conversions of the build, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionStage {
    OutlineToCompiled,
    CompiledToWoff2,
    CompiledToWoff,
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConversionStage::OutlineToCompiled => "outline font -> TrueType",
            ConversionStage::CompiledToWoff2 => "TrueType -> WOFF2",
            ConversionStage::CompiledToWoff => "TrueType -> WOFF",
        };
        f.write_str(name)
    }
}

/// A malformed or unsupported intermediate.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("document is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("missing <{0}> element")]
    MissingElement(&'static str),
    #[error("<{element}> has an invalid {attribute} value {value:?}")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
    #[error("glyph '{glyph}': {source}")]
    Path {
        glyph: String,
        #[source]
        source: path::PathError,
    },
    #[error("glyph '{glyph}': coordinate {value} does not fit in 16 bits")]
    CoordinateOutOfRange { glyph: String, value: i32 },
    #[error("glyph '{0}': name must be 1-63 printable ASCII characters")]
    InvalidGlyphName(String),
    #[error("glyph '{glyph}': codepoint U+{codepoint:04X} is outside the Basic Multilingual Plane")]
    CodepointOutsideBmp { glyph: String, codepoint: u32 },
    #[error("codepoint U+{0:04X} is mapped by more than one glyph")]
    DuplicateCodepoint(u32),
    #[error("{0} glyphs exceed the TrueType limit")]
    TooManyGlyphs(usize),
    #[error("unexpected signature {found:?}, expected {expected:?}")]
    Signature { expected: String, found: String },
    #[error("truncated data while reading {0}")]
    Truncated(&'static str),
    #[error("table '{0}' is missing")]
    MissingTable(String),
    #[error("table '{tag}' decodes to {found} bytes, expected {expected}")]
    TableLength {
        tag: String,
        expected: usize,
        found: usize,
    },
    #[error("table '{0}' uses an unsupported WOFF2 transform")]
    UnsupportedTransform(String),
    #[error("compression stream error: {0}")]
    Compression(#[from] std::io::Error),
}

/// Big-endian cursor over a byte slice, shared by the container readers.
#[derive(Debug, Clone)]
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    what: &'static str,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8], what: &'static str) -> Self {
        Self { data, pos: 0, what }
    }

    pub(crate) fn bytes(&mut self, n: usize) -> Result<&'a [u8], ConversionError> {
        let end = self.pos.checked_add(n).filter(|&e| e <= self.data.len());
        let end = end.ok_or(ConversionError::Truncated(self.what))?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, ConversionError> {
        Ok(self.bytes(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, ConversionError> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32(&mut self) -> Result<u32, ConversionError> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn tag(&mut self) -> Result<Tag, ConversionError> {
        let b = self.bytes(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }
}

/// Rounds `len` up to a multiple of four.
pub(crate) fn pad4(len: usize) -> usize {
    (len + 3) & !3
}
