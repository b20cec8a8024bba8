// src/vectorizer.rs

//! Converts a glyph's cell grid into closed polygon outlines.
//!
//! Outlines are integer polygons in one of two coordinate systems:
//!
//! - `YAxis::Down`: SVG icon space, origin at the top-left of the cell box.
//! - `YAxis::Up`: font space, baseline at `y = 0`, cap height at
//!   `GRID_ROWS * unit`.
//!
//! Every outline winds clockwise as seen in its own coordinate system, which
//! is the TrueType convention for filled contours.

use std::fmt::Write as _;

use crate::glyph::Glyph;
use crate::optimizer::{self, Block};

/// A point in design units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box, inclusive of both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl Rect {
    pub fn width(&self) -> i32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> i32 {
        self.y_max - self.y_min
    }

    fn union(self, other: Rect) -> Rect {
        Rect {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YAxis {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorizeOptions {
    /// Design units per grid cell.
    pub unit: i32,
    pub optimize: bool,
    pub y_axis: YAxis,
}

/// A closed polygon. The closing edge from the last point back to the first is implicit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Outline {
    pub points: Vec<Point>,
}

impl Outline {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Removes repeated vertices and vertices lying on a straight edge,
    /// including across the implicit closing edge.
    pub fn simplify(&mut self) {
        self.points.dedup();
        while self.points.len() > 1 && self.points.first() == self.points.last() {
            self.points.pop();
        }

        let mut changed = true;
        while changed && self.points.len() >= 3 {
            changed = false;
            let n = self.points.len();
            for i in 0..n {
                let prev = self.points[(i + n - 1) % n];
                let cur = self.points[i];
                let next = self.points[(i + 1) % n];
                let cross = i64::from(cur.x - prev.x) * i64::from(next.y - cur.y)
                    - i64::from(cur.y - prev.y) * i64::from(next.x - cur.x);
                if cross == 0 {
                    self.points.remove(i);
                    changed = true;
                    break;
                }
            }
        }
    }

    /// Shifts every point by `(dx, dy)`.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
    }

    pub fn bounds(&self) -> Option<Rect> {
        let first = self.points.first()?;
        let init = Rect {
            x_min: first.x,
            y_min: first.y,
            x_max: first.x,
            y_max: first.y,
        };
        Some(self.points.iter().fold(init, |r, p| Rect {
            x_min: r.x_min.min(p.x),
            y_min: r.y_min.min(p.y),
            x_max: r.x_max.max(p.x),
            y_max: r.y_max.max(p.y),
        }))
    }

    /// Signed area (shoelace), doubled. Negative means clockwise in a y-up system.
    pub fn signed_area2(&self) -> i64 {
        let n = self.points.len();
        (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y)
            })
            .sum()
    }
}

/// Bounding box of a whole outline set, `None` when there is no geometry.
pub fn bounds_of(outlines: &[Outline]) -> Option<Rect> {
    outlines.iter().filter_map(Outline::bounds).reduce(Rect::union)
}

/// Vectorizes `glyph` through the path optimizer.
pub fn vectorize(glyph: &Glyph, options: &VectorizeOptions) -> Vec<Outline> {
    optimizer::blocks(glyph, options.optimize)
        .iter()
        .map(|block| block_outline(block, glyph.rows(), options))
        .collect()
}

/// Turns one block into a clockwise rectangle.
pub fn block_outline(block: &Block, rows: usize, options: &VectorizeOptions) -> Outline {
    let unit = options.unit;
    let x0 = block.col as i32 * unit;
    let x1 = (block.col + block.width) as i32 * unit;
    let mut outline = match options.y_axis {
        YAxis::Down => {
            let y0 = block.row as i32 * unit;
            let y1 = (block.row + block.height) as i32 * unit;
            Outline::new(vec![
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
            ])
        }
        YAxis::Up => {
            let top = (rows - block.row) as i32 * unit;
            let bottom = (rows - block.row - block.height) as i32 * unit;
            Outline::new(vec![
                Point::new(x0, bottom),
                Point::new(x0, top),
                Point::new(x1, top),
                Point::new(x1, bottom),
            ])
        }
    };
    outline.simplify();
    outline
}

/// Serializes outlines as SVG path data with absolute commands.
///
/// Axis-aligned edges use `H`/`V`; the closing edge is left to `Z`.
pub fn path_data(outlines: &[Outline]) -> String {
    let mut d = String::new();
    for outline in outlines {
        let Some(first) = outline.points.first() else {
            continue;
        };
        let _ = write!(d, "M{} {}", first.x, first.y);
        let mut cur = *first;
        for p in &outline.points[1..] {
            if p.y == cur.y {
                let _ = write!(d, "H{}", p.x);
            } else if p.x == cur.x {
                let _ = write!(d, "V{}", p.y);
            } else {
                let _ = write!(d, "L{} {}", p.x, p.y);
            }
            cur = *p;
        }
        d.push('Z');
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::{Category, GRID_ROWS};
    use test_log::test;

    const DOWN8: VectorizeOptions = VectorizeOptions {
        unit: 8,
        optimize: true,
        y_axis: YAxis::Down,
    };

    fn glyph(width: usize, rows: &[&str]) -> Glyph {
        Glyph::from_rows("test", 'T', Category::Letter, width, rows).unwrap()
    }

    #[test]
    fn full_glyph_is_its_bounding_box() {
        let g = glyph(3, &["###"; GRID_ROWS]);
        let outlines = vectorize(&g, &DOWN8);
        assert_eq!(outlines.len(), 1);
        assert_eq!(path_data(&outlines), "M0 0H24V40H0Z");
        let b = bounds_of(&outlines).unwrap();
        assert_eq!((b.width(), b.height()), (24, 40));
    }

    #[test]
    fn blank_glyph_has_no_outlines() {
        let g = glyph(3, &["..."; GRID_ROWS]);
        assert!(vectorize(&g, &DOWN8).is_empty());
        assert_eq!(path_data(&[]), "");
        assert_eq!(bounds_of(&[]), None);
    }

    #[test]
    fn font_space_flips_rows_and_winds_clockwise() {
        let g = glyph(1, &["#", ".", ".", ".", "."]);
        let options = VectorizeOptions {
            unit: 100,
            optimize: true,
            y_axis: YAxis::Up,
        };
        let outlines = vectorize(&g, &options);
        assert_eq!(
            outlines[0].points,
            vec![
                Point::new(0, 400),
                Point::new(0, 500),
                Point::new(100, 500),
                Point::new(100, 400)
            ]
        );
        assert!(outlines[0].signed_area2() < 0);
    }

    #[test]
    fn unoptimized_emits_one_outline_per_cell() {
        let g = glyph(2, &["##", "##", "..", "..", ".."]);
        let unopt = VectorizeOptions {
            optimize: false,
            ..DOWN8
        };
        assert_eq!(vectorize(&g, &unopt).len(), 4);
        assert_eq!(vectorize(&g, &DOWN8).len(), 1);
    }

    #[test]
    fn simplify_drops_colinear_and_duplicate_points() {
        let mut outline = Outline::new(vec![
            Point::new(0, 0),
            Point::new(5, 0),
            Point::new(10, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
            Point::new(0, 5),
            Point::new(0, 0),
        ]);
        outline.simplify();
        assert_eq!(
            outline.points,
            vec![
                Point::new(0, 0),
                Point::new(10, 0),
                Point::new(10, 10),
                Point::new(0, 10)
            ]
        );
    }

    #[test]
    fn path_data_uses_line_for_diagonals() {
        let outline = Outline::new(vec![Point::new(0, 0), Point::new(4, 0), Point::new(0, 4)]);
        assert_eq!(path_data(&[outline]), "M0 0H4L0 4Z");
    }

    #[test]
    fn path_data_is_deterministic() {
        let g = glyph(5, &["#...#", "#...#", "#.#.#", "##.##", "#...#"]);
        assert_eq!(path_data(&vectorize(&g, &DOWN8)), path_data(&vectorize(&g, &DOWN8)));
    }
}
