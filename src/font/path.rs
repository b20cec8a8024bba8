// src/font/path.rs

//! Parser for the polygonal subset of SVG path data used by glyph outlines.
//!
//! Supported commands: `M`, `L`, `H`, `V`, `Z` in absolute and relative
//! form. Curves are rejected; the block alphabet never produces them.

use thiserror::Error;

use crate::vectorizer::Point;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("unsupported path command '{command}' at offset {offset}")]
    UnsupportedCommand { command: char, offset: usize },
    #[error("expected a number at offset {0}")]
    ExpectedNumber(usize),
    #[error("path data must start with a moveto command")]
    MissingMoveTo,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Command(char, usize),
    Number(f64, usize),
}

fn tokenize(d: &str) -> Result<Vec<Token>, PathError> {
    let bytes = d.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() || b == b',' {
            i += 1;
        } else if b.is_ascii_alphabetic() && b != b'e' && b != b'E' {
            tokens.push(Token::Command(b as char, i));
            i += 1;
        } else {
            let start = i;
            if bytes[i] == b'+' || bytes[i] == b'-' {
                i += 1;
            }
            let mut seen_dot = false;
            while i < bytes.len() && (bytes[i].is_ascii_digit() || (bytes[i] == b'.' && !seen_dot)) {
                seen_dot |= bytes[i] == b'.';
                i += 1;
            }
            if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                i += 1;
                if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
                    i += 1;
                }
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let value = d[start..i]
                .parse::<f64>()
                .map_err(|_| PathError::ExpectedNumber(start))?;
            tokens.push(Token::Number(value, start));
        }
    }
    Ok(tokens)
}

/// Parses path data into closed contours, rounding coordinates to integers.
///
/// A contour ends at `Z` or at the next moveto. A closing point equal to the
/// start point is dropped, since contours are implicitly closed.
pub fn parse_contours(d: &str) -> Result<Vec<Vec<Point>>, PathError> {
    let tokens = tokenize(d)?;
    let mut contours: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let (mut x, mut y) = (0.0f64, 0.0f64);
    let (mut start_x, mut start_y) = (0.0f64, 0.0f64);
    let mut command: Option<(char, usize)> = None;
    let mut i = 0;

    let number = |i: &mut usize, at: usize| -> Result<f64, PathError> {
        match tokens.get(*i) {
            Some(Token::Number(v, _)) => {
                *i += 1;
                Ok(*v)
            }
            Some(Token::Command(_, offset)) => Err(PathError::ExpectedNumber(*offset)),
            None => Err(PathError::ExpectedNumber(at)),
        }
    };

    let finish = |current: &mut Vec<Point>, contours: &mut Vec<Vec<Point>>| {
        if current.len() > 1 && current.first() == current.last() {
            current.pop();
        }
        if !current.is_empty() {
            contours.push(std::mem::take(current));
        }
    };

    while i < tokens.len() {
        let (cmd, offset) = match tokens[i] {
            Token::Command(c, offset) => {
                i += 1;
                (c, offset)
            }
            Token::Number(_, offset) => match command {
                // Implicit repetition; extra moveto pairs are linetos.
                Some(('M', _)) => ('L', offset),
                Some(('m', _)) => ('l', offset),
                Some((c, _)) if !matches!(c, 'Z' | 'z') => (c, offset),
                _ => return Err(PathError::MissingMoveTo),
            },
        };
        if command.is_none() && !matches!(cmd, 'M' | 'm') {
            return Err(PathError::MissingMoveTo);
        }

        let relative = cmd.is_ascii_lowercase();
        match cmd.to_ascii_uppercase() {
            'M' => {
                finish(&mut current, &mut contours);
                let (nx, ny) = (number(&mut i, offset)?, number(&mut i, offset)?);
                (x, y) = if relative { (x + nx, y + ny) } else { (nx, ny) };
                (start_x, start_y) = (x, y);
                current.push(to_point(x, y));
            }
            'L' => {
                let (nx, ny) = (number(&mut i, offset)?, number(&mut i, offset)?);
                (x, y) = if relative { (x + nx, y + ny) } else { (nx, ny) };
                current.push(to_point(x, y));
            }
            'H' => {
                let nx = number(&mut i, offset)?;
                x = if relative { x + nx } else { nx };
                current.push(to_point(x, y));
            }
            'V' => {
                let ny = number(&mut i, offset)?;
                y = if relative { y + ny } else { ny };
                current.push(to_point(x, y));
            }
            'Z' => {
                finish(&mut current, &mut contours);
                (x, y) = (start_x, start_y);
            }
            _ => return Err(PathError::UnsupportedCommand { command: cmd, offset }),
        }
        command = Some((cmd, offset));
    }
    finish(&mut current, &mut contours);
    Ok(contours)
}

fn to_point(x: f64, y: f64) -> Point {
    Point::new(x.round() as i32, y.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(v: &[(i32, i32)]) -> Vec<Point> {
        v.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn parses_absolute_rectangles() {
        let contours = parse_contours("M0 0H24V40H0Z M30 0H40V10H30Z").unwrap();
        assert_eq!(
            contours,
            vec![
                pts(&[(0, 0), (24, 0), (24, 40), (0, 40)]),
                pts(&[(30, 0), (40, 0), (40, 10), (30, 10)])
            ]
        );
    }

    #[test]
    fn parses_relative_and_implicit_commands() {
        let contours = parse_contours("m10,10 5,0 0,5 l-5 0 z").unwrap();
        assert_eq!(contours, vec![pts(&[(10, 10), (15, 10), (15, 15), (10, 15)])]);
    }

    #[test]
    fn drops_explicit_closing_point_and_rounds() {
        let contours = parse_contours("M0 0 L10.4 0 L10 9.6 L0 0").unwrap();
        assert_eq!(contours, vec![pts(&[(0, 0), (10, 0), (10, 10)])]);
    }

    #[test]
    fn parses_exponents() {
        let contours = parse_contours("M1e1 0H2E1V-1.5e1").unwrap();
        assert_eq!(contours, vec![pts(&[(10, 0), (20, 0), (20, -15)])]);
    }

    #[test]
    fn rejects_curves_and_bad_starts() {
        assert_eq!(
            parse_contours("M0 0 C1 1 2 2 3 3"),
            Err(PathError::UnsupportedCommand { command: 'C', offset: 5 })
        );
        assert_eq!(parse_contours("L0 0"), Err(PathError::MissingMoveTo));
        assert_eq!(parse_contours("M0"), Err(PathError::ExpectedNumber(0)));
        assert!(parse_contours("").unwrap().is_empty());
    }
}
