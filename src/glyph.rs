// src/glyph.rs

//! Defines the `Glyph` type, its cell grid (`Cell`), and the definition
//! errors raised while building glyphs from their source notation.
//!
//! A `Glyph` is one renderable character of the block alphabet: a fixed
//! number of rows (`GRID_ROWS`) by `width` columns, every cell either ink or
//! blank. Geometry derived from a glyph lives in `crate::vectorizer`; this
//! module only owns the grid and guarantees it is well formed.

use std::fmt;
use thiserror::Error;

/// Number of cell rows in every glyph. This is the alphabet's cap height in cells.
pub const GRID_ROWS: usize = 5;

/// Widest glyph allowed, in columns.
pub const MAX_WIDTH: usize = 5;

/// A single grid position inside a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Unfilled space.
    #[default]
    Blank,
    /// Filled space, part of the glyph outline.
    Ink,
    /// Filled space painted with the theme's accent color in previews.
    /// It is ink as far as font geometry is concerned.
    Accent,
}

impl Cell {
    /// Parses one character of the row notation: `#` ink, `+` accent, `.` blank.
    pub fn from_notation(c: char) -> Option<Self> {
        match c {
            '#' => Some(Cell::Ink),
            '+' => Some(Cell::Accent),
            '.' => Some(Cell::Blank),
            _ => None,
        }
    }

    /// Returns `true` for every cell kind that contributes to the outline.
    pub fn is_ink(self) -> bool {
        !matches!(self, Cell::Blank)
    }

    fn notation(self) -> char {
        match self {
            Cell::Blank => '.',
            Cell::Ink => '#',
            Cell::Accent => '+',
        }
    }
}

/// Broad grouping used for codepoint assignment and theme colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Latin capital letters A-Z.
    Letter,
    /// Punctuation and whitespace mapped to their own Unicode characters.
    Punctuation,
    /// Pictographs living in the private use area.
    Pictograph,
}

/// A malformed glyph definition. Always names the offending glyph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlyphError {
    #[error("glyph '{glyph}': width {width} is outside 1..={max}", max = MAX_WIDTH)]
    WidthOutOfRange { glyph: String, width: usize },
    #[error("glyph '{glyph}': expected {expected} rows, found {found}")]
    RowCount {
        glyph: String,
        expected: usize,
        found: usize,
    },
    #[error("glyph '{glyph}': row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        glyph: String,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("glyph '{glyph}': unknown cell notation {symbol:?} at row {row}, column {col}")]
    UnknownCell {
        glyph: String,
        row: usize,
        col: usize,
        symbol: char,
    },
    #[error("glyph '{glyph}': name is already defined")]
    DuplicateName { glyph: String },
    #[error("glyph '{glyph}': codepoint U+{codepoint:04X} is already assigned")]
    DuplicateCodepoint { glyph: String, codepoint: u32 },
    #[error("glyph '{glyph}': no codepoint left in the private use area")]
    CodepointExhausted { glyph: String },
}

/// One character of the alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    name: String,
    codepoint: char,
    category: Category,
    width: usize,
    /// Row-major, `GRID_ROWS * width` cells.
    cells: Vec<Cell>,
}

impl Glyph {
    /// Builds a glyph from its row notation, validating shape and cell kinds.
    ///
    /// `rows` must contain exactly `GRID_ROWS` strings of `width` characters each.
    pub fn from_rows(
        name: &str,
        codepoint: char,
        category: Category,
        width: usize,
        rows: &[&str],
    ) -> Result<Self, GlyphError> {
        if width == 0 || width > MAX_WIDTH {
            return Err(GlyphError::WidthOutOfRange {
                glyph: name.to_string(),
                width,
            });
        }
        if rows.len() != GRID_ROWS {
            return Err(GlyphError::RowCount {
                glyph: name.to_string(),
                expected: GRID_ROWS,
                found: rows.len(),
            });
        }

        let mut cells = Vec::with_capacity(GRID_ROWS * width);
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(GlyphError::RaggedRow {
                    glyph: name.to_string(),
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                let cell = Cell::from_notation(symbol).ok_or_else(|| GlyphError::UnknownCell {
                    glyph: name.to_string(),
                    row,
                    col,
                    symbol,
                })?;
                cells.push(cell);
            }
        }

        Ok(Glyph {
            name: name.to_string(),
            codepoint,
            category,
            width,
            cells,
        })
    }

    /// Glyph name, unique across the alphabet (`A`, `period`, `heart`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn codepoint(&self) -> char {
        self.codepoint
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Logical width in columns, used for the horizontal advance.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> usize {
        GRID_ROWS
    }

    /// Returns the cell at `(row, col)`, or `None` outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        if row >= GRID_ROWS || col >= self.width {
            return None;
        }
        self.cells.get(row * self.width + col).copied()
    }

    pub fn ink_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_ink()).count()
    }

    /// A glyph without ink renders as a blank advance (e.g. space).
    pub fn is_blank(&self) -> bool {
        self.ink_count() == 0
    }
}

impl fmt::Display for Glyph {
    /// Prints the grid back in row notation, one row per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.chunks(self.width).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.notation())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    const BOX: [&str; GRID_ROWS] = ["###", "#.#", "#+#", "#.#", "###"];

    #[test]
    fn parses_cells_row_major() {
        let glyph = Glyph::from_rows("box", '\u{E000}', Category::Pictograph, 3, &BOX).unwrap();
        assert_eq!(glyph.cell(0, 0), Some(Cell::Ink));
        assert_eq!(glyph.cell(1, 1), Some(Cell::Blank));
        assert_eq!(glyph.cell(2, 1), Some(Cell::Accent));
        assert_eq!(glyph.cell(5, 0), None);
        assert_eq!(glyph.cell(0, 3), None);
        assert_eq!(glyph.ink_count(), 13);
        assert_eq!(glyph.to_string(), BOX.join("\n"));
    }

    #[test]
    fn blank_glyph_is_legal() {
        let rows = ["..", "..", "..", "..", ".."];
        let glyph = Glyph::from_rows("space", ' ', Category::Punctuation, 2, &rows).unwrap();
        assert!(glyph.is_blank());
    }

    #[test]
    fn rejects_width_out_of_range() {
        let rows = ["######"; GRID_ROWS];
        let err = Glyph::from_rows("wide", 'W', Category::Letter, 6, &rows).unwrap_err();
        assert_eq!(
            err,
            GlyphError::WidthOutOfRange {
                glyph: "wide".into(),
                width: 6
            }
        );
        assert!(err.to_string().contains("'wide'"));
    }

    #[test]
    fn rejects_ragged_rows() {
        let rows = ["###", "##", "###", "###", "###"];
        let err = Glyph::from_rows("Q", 'Q', Category::Letter, 3, &rows).unwrap_err();
        assert!(matches!(err, GlyphError::RaggedRow { row: 1, found: 2, .. }));
        assert!(err.to_string().starts_with("glyph 'Q'"));
    }

    #[test]
    fn rejects_wrong_row_count() {
        let err = Glyph::from_rows("Z", 'Z', Category::Letter, 1, &["#", "#"]).unwrap_err();
        assert!(matches!(err, GlyphError::RowCount { found: 2, .. }));
    }

    #[test]
    fn rejects_unknown_notation() {
        let rows = ["#", "#", "x", "#", "#"];
        let err = Glyph::from_rows("I", 'I', Category::Letter, 1, &rows).unwrap_err();
        assert!(matches!(
            err,
            GlyphError::UnknownCell {
                row: 2,
                col: 0,
                symbol: 'x',
                ..
            }
        ));
    }
}
