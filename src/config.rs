// src/config.rs

//! Defines the configuration structures for the `gridfont` pipeline.
//!
//! Every section deserializes with defaults, so a configuration file only
//! needs to name the values it changes. The file is JSON and is located
//! through the `GRIDFONT_CONFIG` environment variable; without it the
//! built-in defaults apply.

use std::path::{Path, PathBuf};

use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Environment variable naming the JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "GRIDFONT_CONFIG";

/// Process-wide configuration, loaded on first access.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::load_or_default);

// --- Top-Level Configuration Structure ---

/// Represents the complete configuration for the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Font metadata and design-unit geometry.
    pub font: FontConfig,
    /// Where artifacts are written.
    pub output: OutputConfig,
    /// Defaults for presentational SVG renders.
    pub render: RenderConfig,
    /// Artifact validation policy.
    pub validation: ValidationConfig,
}

impl Config {
    /// Reads the file named by `GRIDFONT_CONFIG`, falling back to defaults.
    ///
    /// A file that cannot be read or parsed is logged and ignored rather than
    /// aborting, since every value has a usable default.
    pub fn load_or_default() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            info!("{} not set, using default configuration", CONFIG_ENV_VAR);
            return Config::default();
        };
        match Config::from_file(Path::new(&path)) {
            Ok(config) => {
                info!("Configuration loaded from {}", Path::new(&path).display());
                config
            }
            Err(e) => {
                warn!("Ignoring configuration file: {:#}", e);
                Config::default()
            }
        }
    }

    /// Parses a JSON configuration file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }
}

// --- Font Configuration ---

/// Font naming and metrics, in font design units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FontConfig {
    /// Family name written into the font and used by `text_to_svg`.
    pub family_name: String,
    /// File name stem of every artifact (`<stem>.ttf`, ...).
    pub file_stem: String,
    pub units_per_em: u16,
    /// Side of one grid cell in design units.
    pub cell_units: u16,
    pub ascent: i16,
    /// Negative, below the baseline.
    pub descent: i16,
    /// Blank columns added after every glyph's advance.
    pub letter_spacing: u16,
    /// First private use codepoint handed to pictographs.
    pub private_use_start: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        FontConfig {
            family_name: "GridFont".to_string(),
            file_stem: "gridfont".to_string(),
            units_per_em: 1000,
            cell_units: 140, // 5 rows * 140 = 700 cap height
            ascent: 800,
            descent: -200,
            letter_spacing: 1,
            private_use_start: crate::alphabet::PRIVATE_USE_START,
        }
    }
}

// --- Output Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Receives the outline-font document and the three binary fonts.
    pub font_dir: PathBuf,
    /// Receives one SVG icon per glyph.
    pub glyph_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            font_dir: PathBuf::from("dist/fonts"),
            glyph_dir: PathBuf::from("dist/glyphs"),
        }
    }
}

// --- Render Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Pixels per grid cell in SVG output.
    pub block_size: u32,
    /// Merge ink cells into rectangles before emitting paths.
    pub optimize: bool,
    /// Theme name for previews (`light` or `dark`).
    pub theme: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            block_size: 8,
            optimize: true,
            theme: "dark".to_string(),
        }
    }
}

// --- Validation Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationConfig {
    pub max_woff2_bytes: u64,
    pub max_woff_bytes: u64,
    pub max_ttf_bytes: u64,
    /// Treat magic-byte, sniffing and structure mismatches as failures.
    pub strict: bool,
    /// Cross-check artifacts with an external file-type utility.
    pub sniff: bool,
    pub sniff_command: String,
    pub sniff_timeout_ms: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            max_woff2_bytes: 50 * 1024,
            max_woff_bytes: 100 * 1024,
            max_ttf_bytes: 200 * 1024,
            strict: false,
            sniff: true,
            sniff_command: "file".to_string(),
            sniff_timeout_ms: 2000,
        }
    }
}
