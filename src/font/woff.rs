// src/font/woff.rs

//! WOFF 1.0 container: one zlib stream per table.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::trace;

use super::sfnt::{self, TableRecord};
use super::{pad4, tag_str, ConversionError, Reader};

pub const SIGNATURE: [u8; 4] = *b"wOFF";
const HEADER_LEN: usize = 44;
const DIRECTORY_ENTRY_LEN: usize = 20;

fn deflate(data: &[u8]) -> Result<Vec<u8>, ConversionError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Size of the sfnt the decoder will rebuild.
pub(crate) fn sfnt_size(tables: &[TableRecord<'_>]) -> usize {
    12 + 16 * tables.len() + tables.iter().map(|t| pad4(t.data.len())).sum::<usize>()
}

/// Wraps a TrueType font in WOFF. A table whose zlib stream is not smaller
/// than the table itself is stored raw, as the format requires.
pub fn encode(font: &[u8]) -> Result<Vec<u8>, ConversionError> {
    let sfnt = sfnt::read_tables(font)?;
    let mut tables = sfnt.tables.clone();
    tables.sort_by(|a, b| a.tag.cmp(&b.tag));

    let mut directory = Vec::with_capacity(tables.len() * DIRECTORY_ENTRY_LEN);
    let mut body = Vec::new();
    let data_start = HEADER_LEN + tables.len() * DIRECTORY_ENTRY_LEN;
    for table in &tables {
        let compressed = deflate(table.data)?;
        let stored: &[u8] = if compressed.len() < table.data.len() {
            &compressed
        } else {
            table.data
        };
        trace!(
            "WOFF table '{}': {} -> {} bytes",
            tag_str(table.tag),
            table.data.len(),
            stored.len()
        );
        directory.extend_from_slice(&table.tag);
        directory.extend_from_slice(&((data_start + body.len()) as u32).to_be_bytes());
        directory.extend_from_slice(&(stored.len() as u32).to_be_bytes());
        directory.extend_from_slice(&(table.data.len() as u32).to_be_bytes());
        directory.extend_from_slice(&table.checksum.to_be_bytes());
        body.extend_from_slice(stored);
        body.resize(pad4(body.len()), 0);
    }

    let total = data_start + body.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&SIGNATURE);
    out.extend_from_slice(&sfnt.flavor.to_be_bytes());
    out.extend_from_slice(&(total as u32).to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // reserved
    out.extend_from_slice(&(sfnt_size(&tables) as u32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // majorVersion
    out.extend_from_slice(&0u16.to_be_bytes()); // minorVersion
    out.extend_from_slice(&[0; 20]); // no metadata or private data
    out.extend_from_slice(&directory);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Rebuilds the TrueType font stored in a WOFF file.
pub fn decode(woff: &[u8]) -> Result<Vec<u8>, ConversionError> {
    let mut r = Reader::new(woff, "WOFF header");
    let signature = r.tag()?;
    if signature != SIGNATURE {
        return Err(ConversionError::Signature {
            expected: tag_str(SIGNATURE),
            found: tag_str(signature),
        });
    }
    let flavor = r.u32()?;
    let _length = r.u32()?;
    let count = r.u16()?;
    r.bytes(HEADER_LEN - 14)?;

    let mut dir = Reader::new(&woff[HEADER_LEN..], "WOFF table directory");
    let mut tables = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let tag = dir.tag()?;
        let offset = dir.u32()? as usize;
        let comp_length = dir.u32()? as usize;
        let orig_length = dir.u32()? as usize;
        let _checksum = dir.u32()?;
        let stored = offset
            .checked_add(comp_length)
            .and_then(|end| woff.get(offset..end))
            .ok_or(ConversionError::Truncated("WOFF table data"))?;

        let data = if comp_length < orig_length {
            let mut data = Vec::with_capacity(orig_length);
            ZlibDecoder::new(stored).read_to_end(&mut data)?;
            data
        } else {
            stored.to_vec()
        };
        if data.len() != orig_length {
            return Err(ConversionError::TableLength {
                tag: tag_str(tag),
                expected: orig_length,
                found: data.len(),
            });
        }
        tables.push((tag, data));
    }
    Ok(sfnt::assemble_sfnt(flavor, tables))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::sfnt::TRUETYPE_FLAVOR;
    use test_log::test;

    fn sample_font() -> Vec<u8> {
        let head = {
            let mut t = vec![0u8; 54];
            t[12..16].copy_from_slice(&0x5F0F_3CF5u32.to_be_bytes());
            t
        };
        let repetitive = b"abcd".repeat(64);
        sfnt::assemble_sfnt(
            TRUETYPE_FLAVOR,
            vec![(*b"head", head), (*b"name", repetitive), (*b"post", vec![1, 2, 3])],
        )
    }

    #[test]
    fn header_describes_the_file() {
        let font = sample_font();
        let woff = encode(&font).unwrap();
        assert_eq!(&woff[..4], b"wOFF");
        assert_eq!(&woff[4..8], &TRUETYPE_FLAVOR.to_be_bytes());
        assert_eq!(u32::from_be_bytes(woff[8..12].try_into().unwrap()) as usize, woff.len());
        assert_eq!(u16::from_be_bytes([woff[12], woff[13]]), 3);
        assert_eq!(u32::from_be_bytes(woff[16..20].try_into().unwrap()) as usize, font.len());
        assert_eq!(woff.len() % 4, 0);
    }

    #[test]
    fn compresses_only_when_smaller() {
        let woff = encode(&sample_font()).unwrap();
        let entry = |i: usize| {
            let e = &woff[HEADER_LEN + i * DIRECTORY_ENTRY_LEN..];
            let comp = u32::from_be_bytes(e[8..12].try_into().unwrap());
            let orig = u32::from_be_bytes(e[12..16].try_into().unwrap());
            (comp, orig)
        };
        let (comp, orig) = entry(1); // name
        assert!(comp < orig);
        let (comp, orig) = entry(2); // post
        assert_eq!((comp, orig), (3, 3));
    }

    #[test]
    fn decode_restores_the_exact_font() {
        let font = sample_font();
        assert_eq!(decode(&encode(&font).unwrap()).unwrap(), font);
    }

    #[test]
    fn decode_rejects_foreign_data() {
        let err = decode(b"wOF2\0\0\0\0").unwrap_err();
        assert!(matches!(err, ConversionError::Signature { .. }));
        let mut woff = encode(&sample_font()).unwrap();
        woff.truncate(60);
        assert!(matches!(decode(&woff), Err(ConversionError::Truncated(_))));
    }
}
