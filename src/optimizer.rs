// src/optimizer.rs

//! Path optimizer: merges ink cells into rectangular `Block`s.
//!
//! The merge is a greedy, single-pass rectangle coalescing over the glyph
//! grid in row-major order:
//!
//! ```text
//! for each unvisited ink cell (row-major):
//!     grow right  while the cell is ink and unvisited
//!     grow down   while the whole span of the next row is ink and unvisited
//!     mark the rectangle visited, emit one Block
//! ```
//!
//! This is a heuristic. Finding a minimum rectangle cover is NP-hard and is
//! deliberately not attempted; the greedy result is the contract, and the
//! row-major scan order makes it deterministic.

use log::trace;

use crate::glyph::{Cell, Glyph};

/// A rectangle of merged ink cells, in cell units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pub col: usize,
    pub row: usize,
    pub width: usize,
    pub height: usize,
}

impl Block {
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// Returns the blocks for `glyph`: coalesced when `optimize` is set, otherwise one per ink cell.
pub fn blocks(glyph: &Glyph, optimize: bool) -> Vec<Block> {
    if optimize {
        coalesce(glyph)
    } else {
        per_cell(glyph)
    }
}

/// Greedy rectangle coalescing over every ink cell.
pub fn coalesce(glyph: &Glyph) -> Vec<Block> {
    coalesce_matching(glyph, Cell::is_ink)
}

/// Greedy rectangle coalescing over the cells accepted by `matches`.
pub fn coalesce_matching(glyph: &Glyph, matches: impl Fn(Cell) -> bool) -> Vec<Block> {
    let rows = glyph.rows();
    let cols = glyph.width();
    let mut visited = vec![false; rows * cols];
    let open = |visited: &[bool], row: usize, col: usize| {
        !visited[row * cols + col] && glyph.cell(row, col).is_some_and(&matches)
    };

    let mut out = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            if !open(&visited, row, col) {
                continue;
            }

            let mut width = 1;
            while col + width < cols && open(&visited, row, col + width) {
                width += 1;
            }

            let mut height = 1;
            while row + height < rows
                && (col..col + width).all(|c| open(&visited, row + height, c))
            {
                height += 1;
            }

            for r in row..row + height {
                for c in col..col + width {
                    visited[r * cols + c] = true;
                }
            }
            out.push(Block {
                col,
                row,
                width,
                height,
            });
        }
    }

    trace!(
        "Coalesced glyph '{}': {} cells into {} blocks",
        glyph.name(),
        glyph.ink_count(),
        out.len()
    );
    out
}

/// One unit block per ink cell, row-major.
pub fn per_cell(glyph: &Glyph) -> Vec<Block> {
    let mut out = Vec::with_capacity(glyph.ink_count());
    for row in 0..glyph.rows() {
        for col in 0..glyph.width() {
            if glyph.cell(row, col).is_some_and(Cell::is_ink) {
                out.push(Block {
                    col,
                    row,
                    width: 1,
                    height: 1,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::{Category, GRID_ROWS};
    use test_log::test;

    fn glyph(width: usize, rows: &[&str]) -> Glyph {
        Glyph::from_rows("test", 'T', Category::Letter, width, rows).unwrap()
    }

    #[test]
    fn full_grid_is_one_block() {
        let g = glyph(5, &["#####"; GRID_ROWS]);
        assert_eq!(
            coalesce(&g),
            vec![Block {
                col: 0,
                row: 0,
                width: 5,
                height: 5
            }]
        );
        assert_eq!(blocks(&g, false).len(), 25);
        assert!(blocks(&g, false).iter().all(|b| b.area() == 1));
    }

    #[test]
    fn blank_glyph_has_no_blocks() {
        let g = glyph(2, &[".."; GRID_ROWS]);
        assert!(coalesce(&g).is_empty());
        assert!(per_cell(&g).is_empty());
    }

    #[test]
    fn grows_right_before_down() {
        // H: two posts and a crossbar.
        let g = glyph(4, &["#..#", "#..#", "####", "#..#", "#..#"]);
        let b = coalesce(&g);
        assert_eq!(
            b,
            vec![
                Block { col: 0, row: 0, width: 1, height: 5 },
                Block { col: 3, row: 0, width: 1, height: 5 },
                Block { col: 1, row: 2, width: 2, height: 1 },
            ]
        );
    }

    #[test]
    fn downward_growth_requires_full_span() {
        let g = glyph(3, &["###", "##.", "##.", "...", "..."]);
        let b = coalesce(&g);
        assert_eq!(b[0], Block { col: 0, row: 0, width: 3, height: 1 });
        assert_eq!(b[1], Block { col: 0, row: 1, width: 2, height: 2 });
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn covers_every_ink_cell_exactly_once() {
        let g = glyph(5, &["#...#", "##.##", "#.#.#", "#...#", "#...#"]);
        let mut covered = vec![0u8; 25];
        for b in coalesce(&g) {
            for r in b.row..b.row + b.height {
                for c in b.col..b.col + b.width {
                    covered[r * 5 + c] += 1;
                }
            }
        }
        for r in 0..5 {
            for c in 0..5 {
                let expected = u8::from(g.cell(r, c).unwrap().is_ink());
                assert_eq!(covered[r * 5 + c], expected, "cell ({r}, {c})");
            }
        }
    }

    #[test]
    fn is_deterministic() {
        let g = glyph(5, &[".#.#.", "#+###", "#####", ".###.", "..#.."]);
        assert_eq!(coalesce(&g), coalesce(&g));
    }

    #[test]
    fn matching_separates_accent_cells() {
        let g = glyph(3, &["#+#", "#+#", "###", "...", "..."]);
        let accents = coalesce_matching(&g, |c| c == Cell::Accent);
        assert_eq!(accents, vec![Block { col: 1, row: 0, width: 1, height: 2 }]);
        assert_eq!(coalesce(&g).len(), 1);
    }
}
