// src/theme.rs

//! Color themes for presentational SVG output (previews, favicons).
//!
//! Themes never influence font geometry. They are plain values, built on
//! demand by name.

use std::fmt;

use log::warn;

use crate::glyph::{Category, Glyph};

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u8, pub u8, pub u8);

impl fmt::Display for Color {
    /// Formats as lowercase `#rrggbb`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// A named color mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub background: Color,
    pub foreground: Color,
    /// Pictographs and accent cells.
    pub accent: Color,
    /// Letters cycle through this palette alphabetically.
    pub palette: Vec<Color>,
}

impl Theme {
    pub fn light() -> Self {
        Theme {
            name: "light",
            background: Color(0xff, 0xff, 0xff),
            foreground: Color(0x1f, 0x23, 0x28),
            accent: Color(0xd7, 0x3a, 0x49),
            palette: vec![
                Color(0x03, 0x66, 0xd6),
                Color(0x28, 0xa7, 0x45),
                Color(0x6f, 0x42, 0xc1),
                Color(0xe3, 0x62, 0x09),
                Color(0x00, 0x7a, 0x87),
            ],
        }
    }

    pub fn dark() -> Self {
        Theme {
            name: "dark",
            background: Color(0x0d, 0x11, 0x17),
            foreground: Color(0xe6, 0xed, 0xf3),
            accent: Color(0xff, 0x7b, 0x72),
            palette: vec![
                Color(0x79, 0xc0, 0xff),
                Color(0x56, 0xd3, 0x64),
                Color(0xd2, 0xa8, 0xff),
                Color(0xff, 0xa6, 0x57),
                Color(0x39, 0xc5, 0xcf),
            ],
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "light" => Some(Theme::light()),
            "dark" => Some(Theme::dark()),
            _ => None,
        }
    }

    /// Like [`Theme::by_name`], but falls back to `dark` with a warning.
    pub fn by_name_or_default(name: &str) -> Self {
        Theme::by_name(name).unwrap_or_else(|| {
            warn!("Unknown theme '{}', using 'dark'", name);
            Theme::dark()
        })
    }

    /// Fill color for a glyph's ink cells.
    pub fn glyph_color(&self, glyph: &Glyph) -> Color {
        match glyph.category() {
            Category::Letter => {
                let index = (glyph.codepoint() as usize).saturating_sub('A' as usize);
                if self.palette.is_empty() {
                    self.foreground
                } else {
                    self.palette[index % self.palette.len()]
                }
            }
            Category::Punctuation => self.foreground,
            Category::Pictograph => self.accent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::GRID_ROWS;

    #[test]
    fn formats_as_lowercase_hex() {
        assert_eq!(Color(0xff, 0x7b, 0x72).to_string(), "#ff7b72");
        assert_eq!(Color(0, 0, 0).to_string(), "#000000");
    }

    #[test]
    fn letters_cycle_palette_and_symbols_use_fixed_roles() {
        let theme = Theme::dark();
        let rows = ["#"; GRID_ROWS];
        let a = Glyph::from_rows("A", 'A', Category::Letter, 1, &rows).unwrap();
        let f = Glyph::from_rows("F", 'F', Category::Letter, 1, &rows).unwrap();
        let bang = Glyph::from_rows("exclam", '!', Category::Punctuation, 1, &rows).unwrap();
        let heart = Glyph::from_rows("heart", '\u{E000}', Category::Pictograph, 1, &rows).unwrap();
        assert_eq!(theme.glyph_color(&a), theme.palette[0]);
        assert_eq!(theme.glyph_color(&f), theme.palette[0]);
        assert_eq!(theme.glyph_color(&bang), theme.foreground);
        assert_eq!(theme.glyph_color(&heart), theme.accent);
    }

    #[test]
    fn unknown_theme_falls_back_to_dark() {
        assert_eq!(Theme::by_name("solarized"), None);
        assert_eq!(Theme::by_name_or_default("solarized").name, "dark");
        assert_eq!(Theme::by_name("light").unwrap().background, Color(255, 255, 255));
    }
}
