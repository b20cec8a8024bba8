// src/pipeline.rs

//! Orchestrates the full build.
//!
//! ```text
//! Alphabet → icons → SVG font → TrueType ─┬→ WOFF2
//!                                         └→ WOFF
//! ```
//!
//! Every buffer is produced in memory first, so a failing stage leaves the
//! previous artifacts on disk untouched. Both web fonts are converted from
//! the TrueType bytes, never from each other.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use crate::alphabet::Alphabet;
use crate::config::CONFIG;
use crate::font::{self, ConversionError, ConversionStage, FontMetadata};
use crate::glyph::GlyphError;
use crate::svg::{self, GlyphIcon, IconOptions, MissingGlyphPolicy, RenderError, Selection};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid glyph definition")]
    Definition(#[from] GlyphError),
    #[error("cannot render glyphs")]
    Render(#[from] RenderError),
    #[error("stage '{stage}' failed")]
    Conversion {
        stage: ConversionStage,
        #[source]
        source: ConversionError,
    },
    #[error("cannot write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> PipelineError + '_ {
        move |source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn at_stage(stage: ConversionStage) -> impl FnOnce(ConversionError) -> PipelineError {
    move |source| PipelineError::Conversion { stage, source }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub font_dir: PathBuf,
    pub glyph_dir: PathBuf,
    pub file_stem: String,
    pub icons: IconOptions,
    pub metadata: FontMetadata,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            font_dir: CONFIG.output.font_dir.clone(),
            glyph_dir: CONFIG.output.glyph_dir.clone(),
            file_stem: CONFIG.font.file_stem.clone(),
            icons: IconOptions::default(),
            metadata: FontMetadata::default(),
        }
    }
}

/// In-memory results of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub icons: Vec<GlyphIcon>,
    pub outline_font: Vec<u8>,
    pub ttf: Vec<u8>,
    pub woff2: Vec<u8>,
    pub woff: Vec<u8>,
}

/// Runs every stage without touching the filesystem.
pub fn build_artifacts(
    alphabet: &Alphabet,
    icon_options: &IconOptions,
    metadata: &FontMetadata,
) -> Result<Artifacts, PipelineError> {
    let icons = svg::emit_icons(alphabet, Selection::All, icon_options, MissingGlyphPolicy::Strict)?;
    let outline_font = font::assemble(&icons, metadata).into_bytes();
    let ttf = font::outline_to_compiled(&outline_font).map_err(at_stage(ConversionStage::OutlineToCompiled))?;
    let woff2 = font::compiled_to_woff2(&ttf).map_err(at_stage(ConversionStage::CompiledToWoff2))?;
    let woff = font::compiled_to_woff(&ttf).map_err(at_stage(ConversionStage::CompiledToWoff))?;
    Ok(Artifacts {
        icons,
        outline_font,
        ttf,
        woff2,
        woff,
    })
}

/// A file written by [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub icons_written: usize,
    pub stale_icons_removed: usize,
    pub fonts: Vec<WrittenFile>,
}

fn write_file(path: &Path, data: &[u8]) -> Result<WrittenFile, PipelineError> {
    fs::write(path, data).map_err(PipelineError::io(path))?;
    debug!("Wrote {} ({} bytes)", path.display(), data.len());
    Ok(WrittenFile {
        path: path.to_path_buf(),
        bytes: data.len(),
    })
}

/// Removes `.svg` files in `dir` that no current icon owns.
fn remove_stale_icons(dir: &Path, keep: &BTreeSet<String>) -> Result<usize, PipelineError> {
    let mut removed = 0;
    for entry in fs::read_dir(dir).map_err(PipelineError::io(dir))? {
        let path = entry.map_err(PipelineError::io(dir))?.path();
        let is_svg = path.extension().is_some_and(|e| e == "svg");
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if is_svg && path.is_file() && !keep.contains(name) {
            fs::remove_file(&path).map_err(PipelineError::io(&path))?;
            debug!("Removed stale icon {}", path.display());
            removed += 1;
        }
    }
    Ok(removed)
}

/// Builds everything and writes icons, the SVG font and the three binary fonts.
pub fn generate(alphabet: &Alphabet, options: &BuildOptions) -> Result<BuildReport, PipelineError> {
    info!("Generating fonts for {} glyphs", alphabet.len());
    let artifacts = build_artifacts(alphabet, &options.icons, &options.metadata)?;

    fs::create_dir_all(&options.glyph_dir).map_err(PipelineError::io(&options.glyph_dir))?;
    fs::create_dir_all(&options.font_dir).map_err(PipelineError::io(&options.font_dir))?;

    let keep: BTreeSet<String> = artifacts.icons.iter().map(GlyphIcon::file_name).collect();
    let stale_icons_removed = remove_stale_icons(&options.glyph_dir, &keep)?;
    for icon in &artifacts.icons {
        write_file(&options.glyph_dir.join(icon.file_name()), icon.svg.as_bytes())?;
    }

    let stem = &options.file_stem;
    let outputs: [(&str, &[u8]); 4] = [
        ("svg", &artifacts.outline_font),
        ("ttf", &artifacts.ttf),
        ("woff2", &artifacts.woff2),
        ("woff", &artifacts.woff),
    ];
    let mut fonts = Vec::with_capacity(outputs.len());
    for (extension, data) in outputs {
        let path = options.font_dir.join(format!("{stem}.{extension}"));
        fonts.push(write_file(&path, data)?);
    }

    for file in &fonts {
        info!("{} ({} bytes)", file.path.display(), file.bytes);
    }
    info!(
        "Wrote {} icons to {} ({} stale removed)",
        artifacts.icons.len(),
        options.glyph_dir.display(),
        stale_icons_removed
    );
    Ok(BuildReport {
        icons_written: artifacts.icons.len(),
        stale_icons_removed,
        fonts,
    })
}
