// src/alphabet.rs

//! The block alphabet: static glyph definitions and the immutable lookup
//! table built from them.
//!
//! The table is constructed once, on first access, through [`alphabet()`].
//! Construction validates every definition; a malformed entry makes the
//! whole table unavailable and the error names the offending glyph.

use std::collections::BTreeMap;

use log::{debug, info};
use once_cell::sync::Lazy;

use crate::glyph::{Category, Glyph, GlyphError};

/// First codepoint handed out to pictographs.
pub const PRIVATE_USE_START: u32 = 0xE000;
const PRIVATE_USE_END: u32 = 0xF8FF;

/// Source form of one glyph.
#[derive(Debug, Clone, Copy)]
pub struct GlyphDef {
    pub name: &'static str,
    /// `None` for pictographs, which get a private use codepoint.
    pub codepoint: Option<char>,
    pub category: Category,
    pub width: usize,
    pub rows: &'static [&'static str],
}

const fn letter(name: &'static str, c: char, width: usize, rows: &'static [&'static str]) -> GlyphDef {
    GlyphDef {
        name,
        codepoint: Some(c),
        category: Category::Letter,
        width,
        rows,
    }
}

const fn punct(name: &'static str, c: char, width: usize, rows: &'static [&'static str]) -> GlyphDef {
    GlyphDef {
        name,
        codepoint: Some(c),
        category: Category::Punctuation,
        width,
        rows,
    }
}

const fn picto(name: &'static str, width: usize, rows: &'static [&'static str]) -> GlyphDef {
    GlyphDef {
        name,
        codepoint: None,
        category: Category::Pictograph,
        width,
        rows,
    }
}

#[rustfmt::skip]
pub static LETTERS: &[GlyphDef] = &[
    letter("A", 'A', 4, &[".##.", "#..#", "####", "#..#", "#..#"]),
    letter("B", 'B', 4, &["###.", "#..#", "###.", "#..#", "###."]),
    letter("C", 'C', 4, &[".###", "#...", "#...", "#...", ".###"]),
    letter("D", 'D', 4, &["###.", "#..#", "#..#", "#..#", "###."]),
    letter("E", 'E', 3, &["###", "#..", "###", "#..", "###"]),
    letter("F", 'F', 3, &["###", "#..", "###", "#..", "#.."]),
    letter("G", 'G', 4, &[".###", "#...", "#.##", "#..#", ".###"]),
    letter("H", 'H', 4, &["#..#", "#..#", "####", "#..#", "#..#"]),
    letter("I", 'I', 3, &["###", ".#.", ".#.", ".#.", "###"]),
    letter("J", 'J', 4, &["..##", "...#", "...#", "#..#", ".##."]),
    letter("K", 'K', 4, &["#..#", "#.#.", "##..", "#.#.", "#..#"]),
    letter("L", 'L', 3, &["#..", "#..", "#..", "#..", "###"]),
    letter("M", 'M', 5, &["#...#", "##.##", "#.#.#", "#...#", "#...#"]),
    letter("N", 'N', 4, &["#..#", "##.#", "#.##", "#..#", "#..#"]),
    letter("O", 'O', 4, &[".##.", "#..#", "#..#", "#..#", ".##."]),
    letter("P", 'P', 4, &["###.", "#..#", "###.", "#...", "#..."]),
    letter("Q", 'Q', 4, &[".##.", "#..#", "#..#", "#.##", ".###"]),
    letter("R", 'R', 4, &["###.", "#..#", "###.", "#.#.", "#..#"]),
    letter("S", 'S', 4, &[".###", "#...", ".##.", "...#", "###."]),
    letter("T", 'T', 3, &["###", ".#.", ".#.", ".#.", ".#."]),
    letter("U", 'U', 4, &["#..#", "#..#", "#..#", "#..#", ".##."]),
    letter("V", 'V', 5, &["#...#", "#...#", "#...#", ".#.#.", "..#.."]),
    letter("W", 'W', 5, &["#...#", "#...#", "#.#.#", "##.##", "#...#"]),
    letter("X", 'X', 5, &["#...#", ".#.#.", "..#..", ".#.#.", "#...#"]),
    letter("Y", 'Y', 5, &["#...#", ".#.#.", "..#..", "..#..", "..#.."]),
    letter("Z", 'Z', 4, &["####", "...#", ".##.", "#...", "####"]),
];

#[rustfmt::skip]
pub static SYMBOLS: &[GlyphDef] = &[
    punct("space", ' ', 3, &["...", "...", "...", "...", "..."]),
    punct("period", '.', 1, &[".", ".", ".", ".", "#"]),
    punct("comma", ',', 2, &["..", "..", "..", ".#", "#."]),
    punct("exclam", '!', 1, &["#", "#", "#", ".", "#"]),
    punct("question", '?', 4, &["###.", "...#", ".##.", "....", ".#.."]),
    punct("hyphen", '-', 3, &["...", "...", "###", "...", "..."]),
    punct("colon", ':', 1, &[".", "#", ".", "#", "."]),
    punct("quotesingle", '\'', 1, &["#", "#", ".", ".", "."]),
    picto("heart", 5, &[".#.#.", "#+###", "#####", ".###.", "..#.."]),
    picto("star", 5, &["..#..", ".#+#.", "#####", ".#.#.", "#...#"]),
    picto("arrow", 5, &["..#..", "...#.", "#####", "...#.", "..#.."]),
    picto("smile", 5, &[".....", ".#.#.", ".....", "#...#", ".###."]),
    picto("block", 5, &["#####", "#####", "#####", "#####", "#####"]),
];

/// Immutable table of every glyph, letters keyed by character and symbols by name.
#[derive(Debug, Clone)]
pub struct Alphabet {
    letters: BTreeMap<char, Glyph>,
    symbols: BTreeMap<String, Glyph>,
    by_codepoint: BTreeMap<char, GlyphKey>,
}

#[derive(Debug, Clone)]
enum GlyphKey {
    Letter(char),
    Symbol(String),
}

impl Alphabet {
    /// Validates and indexes the given definitions.
    ///
    /// Pictographs receive private use codepoints starting at `private_use_start`,
    /// in glyph-name order, so the assignment does not depend on definition order.
    pub fn from_definitions(
        letters: &[GlyphDef],
        symbols: &[GlyphDef],
        private_use_start: u32,
    ) -> Result<Self, GlyphError> {
        let mut table = Alphabet {
            letters: BTreeMap::new(),
            symbols: BTreeMap::new(),
            by_codepoint: BTreeMap::new(),
        };

        let mut pictographs: Vec<&GlyphDef> = symbols.iter().filter(|d| d.codepoint.is_none()).collect();
        pictographs.sort_by_key(|d| d.name);
        let mut next_private = private_use_start;
        let mut private_codepoints = BTreeMap::new();
        for def in pictographs {
            let c = loop {
                if next_private > PRIVATE_USE_END {
                    return Err(GlyphError::CodepointExhausted {
                        glyph: def.name.to_string(),
                    });
                }
                let candidate = char::from_u32(next_private);
                next_private += 1;
                if let Some(c) = candidate {
                    break c;
                }
            };
            private_codepoints.insert(def.name, c);
        }

        for def in letters.iter().chain(symbols) {
            let Some(c) = def.codepoint.or_else(|| private_codepoints.get(def.name).copied()) else {
                return Err(GlyphError::CodepointExhausted {
                    glyph: def.name.to_string(),
                });
            };
            if table.by_name(def.name).is_some() {
                return Err(GlyphError::DuplicateName {
                    glyph: def.name.to_string(),
                });
            }
            let glyph = Glyph::from_rows(def.name, c, def.category, def.width, def.rows)?;
            let key = match def.category {
                Category::Letter => GlyphKey::Letter(c),
                _ => GlyphKey::Symbol(def.name.to_string()),
            };
            table.claim_codepoint(&glyph, key.clone())?;
            match key {
                GlyphKey::Letter(c) => {
                    table.letters.insert(c, glyph);
                }
                GlyphKey::Symbol(name) => {
                    table.symbols.insert(name, glyph);
                }
            }
        }

        debug!(
            "Alphabet built: {} letters, {} symbols",
            table.letters.len(),
            table.symbols.len()
        );
        Ok(table)
    }

    fn claim_codepoint(&mut self, glyph: &Glyph, key: GlyphKey) -> Result<(), GlyphError> {
        if self.by_codepoint.contains_key(&glyph.codepoint()) {
            return Err(GlyphError::DuplicateCodepoint {
                glyph: glyph.name().to_string(),
                codepoint: glyph.codepoint() as u32,
            });
        }
        self.by_codepoint.insert(glyph.codepoint(), key);
        Ok(())
    }

    pub fn letter(&self, c: char) -> Option<&Glyph> {
        self.letters.get(&c)
    }

    pub fn symbol(&self, name: &str) -> Option<&Glyph> {
        self.symbols.get(name)
    }

    /// Looks up a glyph by letter or symbol name.
    pub fn by_name(&self, name: &str) -> Option<&Glyph> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(glyph) = self.letters.get(&c) {
                return Some(glyph);
            }
        }
        self.symbols.get(name)
    }

    /// Resolves a character of running text. Lowercase letters fold to capitals.
    pub fn glyph_for_char(&self, c: char) -> Option<&Glyph> {
        let c = if c.is_ascii_lowercase() { c.to_ascii_uppercase() } else { c };
        match self.by_codepoint.get(&c)? {
            GlyphKey::Letter(l) => self.letters.get(l),
            GlyphKey::Symbol(name) => self.symbols.get(name),
        }
    }

    /// Every glyph: letters A-Z first, then symbols in name order.
    pub fn entries(&self) -> impl Iterator<Item = &Glyph> {
        self.letters.values().chain(self.symbols.values())
    }

    pub fn len(&self) -> usize {
        self.letters.len() + self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static ALPHABET: Lazy<Result<Alphabet, GlyphError>> = Lazy::new(|| {
    let table = Alphabet::from_definitions(LETTERS, SYMBOLS, crate::config::CONFIG.font.private_use_start);
    match &table {
        Ok(table) => info!("Loaded block alphabet with {} glyphs", table.len()),
        Err(e) => log::error!("Block alphabet failed to load: {}", e),
    }
    table
});

/// Returns the process-wide alphabet, building it on first use.
pub fn alphabet() -> Result<&'static Alphabet, GlyphError> {
    ALPHABET.as_ref().map_err(Clone::clone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::GRID_ROWS;
    use test_log::test;

    fn builtin() -> Alphabet {
        Alphabet::from_definitions(LETTERS, SYMBOLS, PRIVATE_USE_START).unwrap()
    }

    #[test]
    fn covers_every_capital_letter() {
        let table = builtin();
        for c in 'A'..='Z' {
            let glyph = table.letter(c).unwrap_or_else(|| panic!("missing letter {c}"));
            assert_eq!(glyph.codepoint(), c);
            assert_eq!(glyph.rows(), GRID_ROWS);
            assert!((1..=5).contains(&glyph.width()));
        }
    }

    #[test]
    fn pictographs_get_private_use_codepoints_in_name_order() {
        let table = builtin();
        // arrow < block < heart < smile < star
        assert_eq!(table.symbol("arrow").unwrap().codepoint(), '\u{E000}');
        assert_eq!(table.symbol("block").unwrap().codepoint(), '\u{E001}');
        assert_eq!(table.symbol("heart").unwrap().codepoint(), '\u{E002}');
        assert_eq!(table.symbol("star").unwrap().codepoint(), '\u{E004}');
        assert_eq!(table.glyph_for_char('\u{E002}').unwrap().name(), "heart");
    }

    #[test]
    fn text_lookup_folds_case() {
        let table = builtin();
        assert_eq!(table.glyph_for_char('w').unwrap().name(), "W");
        assert_eq!(table.glyph_for_char('?').unwrap().name(), "question");
        assert!(table.glyph_for_char('~').is_none());
        assert_eq!(table.by_name("W").unwrap().codepoint(), 'W');
        assert_eq!(table.by_name("heart").unwrap().name(), "heart");
    }

    #[test]
    fn entries_are_letters_then_symbols() {
        let table = builtin();
        let names: Vec<&str> = table.entries().map(|g| g.name()).collect();
        assert_eq!(names.len(), LETTERS.len() + SYMBOLS.len());
        assert_eq!(names[0], "A");
        assert_eq!(names[25], "Z");
        assert_eq!(names[26], "arrow");
    }

    #[test]
    fn malformed_definition_names_the_glyph() {
        static BAD: &[GlyphDef] = &[GlyphDef {
            name: "K",
            codepoint: Some('K'),
            category: Category::Letter,
            width: 3,
            rows: &["###", "##", "###", "###", "###"],
        }];
        let err = Alphabet::from_definitions(BAD, &[], PRIVATE_USE_START).unwrap_err();
        assert!(err.to_string().contains("'K'"), "{err}");
    }

    #[test]
    fn duplicate_codepoint_is_rejected() {
        static DUP: &[GlyphDef] = &[GlyphDef {
            name: "dot",
            codepoint: Some('A'),
            category: Category::Punctuation,
            width: 1,
            rows: &[".", ".", ".", ".", "#"],
        }];
        let err = Alphabet::from_definitions(LETTERS, DUP, PRIVATE_USE_START).unwrap_err();
        assert_eq!(
            err,
            GlyphError::DuplicateCodepoint {
                glyph: "dot".into(),
                codepoint: 'A' as u32
            }
        );
    }

    #[test]
    fn singleton_is_shared() {
        let a = alphabet().unwrap();
        let b = alphabet().unwrap();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.len(), LETTERS.len() + SYMBOLS.len());
    }
}
