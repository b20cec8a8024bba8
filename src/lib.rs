// src/lib.rs

//! Grid alphabet to font pipeline.
//!
//! A fixed-grid block alphabet is vectorized, merged into rectangles,
//! emitted as SVG icons, assembled into an SVG font and compiled to
//! TrueType, WOFF2 and WOFF, then validated.

pub mod alphabet;
pub mod cli;
pub mod config;
pub mod font;
pub mod glyph;
pub mod optimizer;
pub mod pipeline;
pub mod svg;
pub mod theme;
pub mod validate;
pub mod vectorizer;
