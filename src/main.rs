// src/main.rs

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use gridfont::{
    alphabet,
    cli::{Cli, Cmd},
    config::CONFIG,
    pipeline::{self, BuildOptions},
    svg::{self, MissingGlyphPolicy, RenderOptions},
    theme::Theme,
    validate::{FileCommandSniffer, FormatSniffer, NoSniffer, Validator},
};

/// Main entry point for the `gridfont` binary.
fn main() -> anyhow::Result<()> {
    // Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Cmd::Generate => generate()?,
        Cmd::Validate => {
            if !validate() {
                std::process::exit(1);
            }
        }
        Cmd::TextToSvg { text, style } => println!("{}", svg::text_to_svg(&text, &style.into())),
        Cmd::Render {
            text,
            theme,
            block_size,
            no_optimize,
            best_effort,
        } => {
            let defaults = RenderOptions::default();
            let options = RenderOptions {
                block_size: block_size.unwrap_or(defaults.block_size),
                optimize: !no_optimize && defaults.optimize,
                theme: theme.as_deref().map_or(defaults.theme.clone(), Theme::by_name_or_default),
                policy: if best_effort {
                    MissingGlyphPolicy::BestEffort
                } else {
                    MissingGlyphPolicy::Strict
                },
                ..defaults
            };
            let alphabet = alphabet::alphabet().context("glyph table is invalid")?;
            let text = text.replace("\\n", "\n");
            let rendered = svg::render_text(alphabet, &text, &options).context("render failed")?;
            println!("{}", rendered);
        }
        Cmd::Favicon { glyph, theme } => {
            let alphabet = alphabet::alphabet().context("glyph table is invalid")?;
            let glyph = alphabet
                .by_name(&glyph)
                .with_context(|| format!("no glyph named '{}'", glyph))?;
            let theme = Theme::by_name_or_default(theme.as_deref().unwrap_or(&CONFIG.render.theme));
            let icon = svg::favicon_svg(glyph, &theme, CONFIG.render.block_size).context("favicon failed")?;
            println!("{}", icon);
        }
    }
    Ok(())
}

fn generate() -> anyhow::Result<()> {
    info!("Starting font generation...");
    let alphabet = alphabet::alphabet().context("glyph table is invalid")?;
    let options = BuildOptions::default();
    let report = pipeline::generate(alphabet, &options).context("font generation failed")?;
    info!(
        "Generation finished: {} icons, {} font files",
        report.icons_written,
        report.fonts.len()
    );
    Ok(())
}

/// Prints the report and returns whether every artifact passed.
fn validate() -> bool {
    let config = &CONFIG.validation;
    let sniffer: Box<dyn FormatSniffer> = if config.sniff {
        Box::new(FileCommandSniffer::from_config(config))
    } else {
        Box::new(NoSniffer)
    };
    let validator = Validator::new(config, sniffer.as_ref());
    let report = validator.validate_dir(&CONFIG.output.font_dir, &CONFIG.font.file_stem);
    println!("{}", report);
    if !report.passed() {
        error!("One or more artifacts failed validation");
    }
    report.passed()
}
