// src/font/woff2.rs

//! WOFF 2.0 container with null-transformed tables and a single Brotli
//! stream.
//!
//! Tables are stored as-is: `glyf` and `loca` carry transform version 3
//! (the null transform for those two), every other table version 0. The
//! directory lists tables by tag, except that `loca` immediately follows
//! `glyf`.

use std::io::{Read, Write};

use log::trace;

use super::sfnt::{self, TableRecord, TRUETYPE_FLAVOR};
use super::{pad4, tag_str, ConversionError, Reader, Tag};

pub const SIGNATURE: [u8; 4] = *b"wOF2";
const HEADER_LEN: usize = 48;
const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: u32 = 11;
const BROTLI_WINDOW: u32 = 22;
/// Flag value for a tag written out after the flags byte.
const ARBITRARY_TAG: u8 = 0x3F;
const NULL_GLYF_TRANSFORM: u8 = 3;

/// Tags with a one-byte code in the table directory, in code order.
const KNOWN_TAGS: [&Tag; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm", b"glyf", b"loca",
    b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern", b"LTSH", b"PCLT", b"VDMX", b"vhea",
    b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC", b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL",
    b"SVG ", b"sbix", b"acnt", b"avar", b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar",
    b"gvar", b"hsty", b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];

fn null_transform_version(tag: &Tag) -> u8 {
    if tag == b"glyf" || tag == b"loca" {
        NULL_GLYF_TRANSFORM
    } else {
        0
    }
}

// --- UIntBase128 ---

pub(crate) fn write_base128(mut value: u32, out: &mut Vec<u8>) {
    let mut bytes = [0u8; 5];
    let mut len = 0;
    loop {
        bytes[len] = (value & 0x7F) as u8;
        len += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..len).rev() {
        let continuation = if i > 0 { 0x80 } else { 0 };
        out.push(bytes[i] | continuation);
    }
}

pub(crate) fn read_base128(r: &mut Reader<'_>) -> Result<u32, ConversionError> {
    let mut value = 0u32;
    for i in 0..5 {
        let byte = r.u8()?;
        // Leading zeros and values past 32 bits are invalid encodings.
        if (i == 0 && byte == 0x80) || value & 0xFE00_0000 != 0 {
            return Err(ConversionError::Truncated("UIntBase128 value"));
        }
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(ConversionError::Truncated("UIntBase128 value"))
}

/// Directory order: by tag, with `loca` right after `glyf`.
fn directory_order<'a>(tables: &[TableRecord<'a>]) -> Vec<TableRecord<'a>> {
    let mut sorted = tables.to_vec();
    sorted.sort_by(|a, b| a.tag.cmp(&b.tag));
    if let Some(loca) = sorted.iter().position(|t| &t.tag == b"loca") {
        let loca = sorted.remove(loca);
        let after_glyf = sorted.iter().position(|t| &t.tag == b"glyf").map_or(sorted.len(), |g| g + 1);
        sorted.insert(after_glyf, loca);
    }
    sorted
}

/// Wraps a TrueType font in WOFF2.
pub fn encode(font: &[u8]) -> Result<Vec<u8>, ConversionError> {
    let sfnt = sfnt::read_tables(font)?;
    let tables = directory_order(&sfnt.tables);

    let mut directory = Vec::new();
    let mut stream = Vec::new();
    for table in &tables {
        let code = KNOWN_TAGS
            .iter()
            .position(|known| *known == &table.tag)
            .map_or(ARBITRARY_TAG, |i| i as u8);
        directory.push(code | (null_transform_version(&table.tag) << 6));
        if code == ARBITRARY_TAG {
            directory.extend_from_slice(&table.tag);
        }
        write_base128(table.data.len() as u32, &mut directory);
        stream.extend_from_slice(table.data);
    }

    let mut compressor = brotli::CompressorWriter::new(Vec::new(), BROTLI_BUFFER, BROTLI_QUALITY, BROTLI_WINDOW);
    compressor.write_all(&stream)?;
    let compressed = compressor.into_inner();
    trace!("WOFF2 stream: {} -> {} bytes", stream.len(), compressed.len());

    let total = pad4(HEADER_LEN + directory.len() + compressed.len());
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&SIGNATURE);
    out.extend_from_slice(&sfnt.flavor.to_be_bytes());
    out.extend_from_slice(&(total as u32).to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // reserved
    out.extend_from_slice(&(super::woff::sfnt_size(&tables) as u32).to_be_bytes());
    out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // majorVersion
    out.extend_from_slice(&0u16.to_be_bytes()); // minorVersion
    out.extend_from_slice(&[0; 20]); // no metadata or private data
    out.extend_from_slice(&directory);
    out.extend_from_slice(&compressed);
    out.resize(total, 0);
    Ok(out)
}

struct Entry {
    tag: Tag,
    length: usize,
}

/// Rebuilds the TrueType font stored in a WOFF2 file.
pub fn decode(woff2: &[u8]) -> Result<Vec<u8>, ConversionError> {
    let mut r = Reader::new(woff2, "WOFF2 header");
    let signature = r.tag()?;
    if signature != SIGNATURE {
        return Err(ConversionError::Signature {
            expected: tag_str(SIGNATURE),
            found: tag_str(signature),
        });
    }
    let flavor = r.u32()?;
    if flavor != TRUETYPE_FLAVOR {
        return Err(ConversionError::Signature {
            expected: "TrueType flavor".to_string(),
            found: tag_str(flavor.to_be_bytes()),
        });
    }
    let _length = r.u32()?;
    let count = r.u16()?;
    let _reserved = r.u16()?;
    let _sfnt_size = r.u32()?;
    let compressed_len = r.u32()? as usize;
    r.bytes(HEADER_LEN - 24)?;

    let mut entries = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let flags = r.u8()?;
        let code = flags & ARBITRARY_TAG;
        let tag = if code == ARBITRARY_TAG {
            r.tag()?
        } else {
            *KNOWN_TAGS[usize::from(code)]
        };
        let version = flags >> 6;
        if version != null_transform_version(&tag) {
            return Err(ConversionError::UnsupportedTransform(tag_str(tag)));
        }
        let length = read_base128(&mut r)? as usize;
        entries.push(Entry { tag, length });
    }

    let compressed = r.bytes(compressed_len)?;
    let expected: usize = entries.iter().map(|e| e.length).sum();
    let mut stream = Vec::with_capacity(expected);
    brotli::Decompressor::new(compressed, BROTLI_BUFFER).read_to_end(&mut stream)?;
    if stream.len() != expected {
        return Err(ConversionError::TableLength {
            tag: "*".to_string(),
            expected,
            found: stream.len(),
        });
    }

    let mut tables = Vec::with_capacity(entries.len());
    let mut offset = 0;
    for entry in entries {
        tables.push((entry.tag, stream[offset..offset + entry.length].to_vec()));
        offset += entry.length;
    }
    Ok(sfnt::assemble_sfnt(flavor, tables))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn sample_font() -> Vec<u8> {
        sfnt::assemble_sfnt(
            TRUETYPE_FLAVOR,
            vec![
                (*b"head", vec![0u8; 54]),
                (*b"glyf", vec![7u8; 30]),
                (*b"loca", vec![0, 0, 0, 15]),
                (*b"zzzz", b"custom".to_vec()),
                (*b"cmap", vec![0u8; 20]),
            ],
        )
    }

    #[test]
    fn base128_round_trips_boundaries() {
        for value in [0u32, 1, 127, 128, 16_383, 16_384, u32::MAX] {
            let mut buf = Vec::new();
            write_base128(value, &mut buf);
            let mut r = Reader::new(&buf, "test");
            assert_eq!(read_base128(&mut r).unwrap(), value, "{value}");
        }
        let mut buf = Vec::new();
        write_base128(128, &mut buf);
        assert_eq!(buf, [0x81, 0x00]);
    }

    #[test]
    fn base128_rejects_leading_zeros() {
        let mut r = Reader::new(&[0x80, 0x01], "test");
        assert!(read_base128(&mut r).is_err());
    }

    #[test]
    fn starts_with_magic_and_is_aligned() {
        let woff2 = encode(&sample_font()).unwrap();
        assert_eq!(&woff2[..4], [0x77, 0x4f, 0x46, 0x32]);
        assert_eq!(woff2.len() % 4, 0);
        assert_eq!(u32::from_be_bytes(woff2[8..12].try_into().unwrap()) as usize, woff2.len());
    }

    #[test]
    fn loca_follows_glyf_in_directory() {
        let font = sample_font();
        let sfnt = sfnt::read_tables(&font).unwrap();
        let order: Vec<Tag> = directory_order(&sfnt.tables).iter().map(|t| t.tag).collect();
        assert_eq!(order, [*b"cmap", *b"glyf", *b"loca", *b"head", *b"zzzz"]);
    }

    #[test]
    fn decode_restores_the_exact_font() {
        let font = sample_font();
        assert_eq!(decode(&encode(&font).unwrap()).unwrap(), font);
    }

    #[test]
    fn decode_rejects_transformed_tables() {
        let mut woff2 = encode(&sample_font()).unwrap();
        // First directory entry is cmap (code 0); mark it transformed.
        woff2[HEADER_LEN] |= 1 << 6;
        assert!(matches!(decode(&woff2), Err(ConversionError::UnsupportedTransform(_))));
        assert!(matches!(decode(b"wOFF"), Err(ConversionError::Signature { .. })));
    }
}
