// src/cli.rs

//! Command-line interface for the `gridfont` binary.

use clap::{Args, Parser, Subcommand};

use crate::svg::{TextSvgOptions, MAX_BLOCK_SIZE};

#[derive(Parser, Debug)]
#[command(name = "gridfont", about = "Build web fonts from a fixed-grid block alphabet")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Cmd,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Build glyph icons, the SVG font, TTF, WOFF2 and WOFF
    Generate,
    /// Check the built fonts; exits 1 when any check fails
    Validate,
    /// Print an SVG <text> element set in the font
    TextToSvg {
        text: String,
        #[command(flatten)]
        style: TextSvgArgs,
    },
    /// Print a themed block preview ("\n" starts a new line)
    Render {
        text: String,
        #[arg(long, value_parser = ["light", "dark"])]
        theme: Option<String>,
        /// Pixels per grid cell
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_BLOCK_SIZE)))]
        block_size: Option<u32>,
        /// Draw one square per cell instead of merged rectangles
        #[arg(long)]
        no_optimize: bool,
        /// Skip characters without a glyph instead of failing
        #[arg(long)]
        best_effort: bool,
    },
    /// Print a square icon for one glyph
    Favicon {
        /// Glyph name, e.g. `W` or `heart`
        glyph: String,
        #[arg(long, value_parser = ["light", "dark"])]
        theme: Option<String>,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct TextSvgArgs {
    #[arg(long, default_value_t = 48.0)]
    pub font_size: f64,
    #[arg(long, default_value = "#000")]
    pub color: String,
    /// Defaults to the configured family name
    #[arg(long)]
    pub font_family: Option<String>,
    /// Overrides the estimated width
    #[arg(long)]
    pub width: Option<f64>,
    /// Overrides the estimated height
    #[arg(long)]
    pub height: Option<f64>,
    /// Omit the xmlns attribute
    #[arg(long)]
    pub no_namespace: bool,
    #[arg(long)]
    pub role: Option<String>,
    #[arg(long)]
    pub aria_label: Option<String>,
}

impl From<TextSvgArgs> for TextSvgOptions {
    fn from(args: TextSvgArgs) -> Self {
        let defaults = TextSvgOptions::default();
        TextSvgOptions {
            font_size: args.font_size,
            color: args.color,
            font_family: args.font_family.unwrap_or(defaults.font_family),
            width: args.width,
            height: args.height,
            include_namespace: !args.no_namespace,
            role: args.role,
            aria_label: args.aria_label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cmd, clap::Error> {
        Cli::try_parse_from(std::iter::once("gridfont").chain(args.iter().copied())).map(|cli| cli.command)
    }

    fn kind(args: &[&str]) -> ErrorKind {
        parse(args).unwrap_err().kind()
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse(&["generate"]).unwrap(), Cmd::Generate);
        assert_eq!(parse(&["validate"]).unwrap(), Cmd::Validate);
        assert!(parse(&[]).is_err());
        assert_eq!(kind(&["build"]), ErrorKind::InvalidSubcommand);
        assert_eq!(kind(&["generate", "--fast"]), ErrorKind::UnknownArgument);
    }

    #[test]
    fn text_to_svg_flags() {
        let cmd = parse(&[
            "text-to-svg",
            "--font-size",
            "24",
            "Hi <there>",
            "--no-namespace",
            "--aria-label",
            "greeting",
            "--width",
            "99.5",
        ])
        .unwrap();
        let Cmd::TextToSvg { text, style } = cmd else {
            panic!("wrong command: {cmd:?}");
        };
        assert_eq!(text, "Hi <there>");
        let options = TextSvgOptions::from(style);
        assert_eq!(options.font_size, 24.0);
        assert!(!options.include_namespace);
        assert_eq!(options.aria_label.as_deref(), Some("greeting"));
        assert_eq!(options.width, Some(99.5));
        assert_eq!(options.height, None);
        assert_eq!(options.color, "#000");
        assert_eq!(options.font_family, TextSvgOptions::default().font_family);
    }

    #[test]
    fn render_flags() {
        assert_eq!(
            parse(&["render", "HELLO", "--theme", "light", "--no-optimize", "--best-effort"]).unwrap(),
            Cmd::Render {
                text: "HELLO".into(),
                theme: Some("light".into()),
                block_size: None,
                no_optimize: true,
                best_effort: true,
            }
        );
        let cmd = parse(&["render", "X", "--block-size", "1024"]).unwrap();
        assert!(matches!(cmd, Cmd::Render { block_size: Some(1024), .. }));
    }

    #[test]
    fn render_rejects_bad_values() {
        assert_eq!(kind(&["render", "X", "--block-size", "big"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["render", "X", "--block-size", "0"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["render", "X", "--block-size", "1025"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["render", "X", "--block-size", "1000000000"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["render", "X", "--theme", "solarized"]), ErrorKind::InvalidValue);
        assert!(parse(&["render", "--theme"]).is_err());
        assert!(parse(&["render"]).is_err());
        assert!(parse(&["render", "A", "B"]).is_err());
    }

    #[test]
    fn favicon_takes_a_glyph_name() {
        assert_eq!(
            parse(&["favicon", "heart", "--theme", "dark"]).unwrap(),
            Cmd::Favicon {
                glyph: "heart".into(),
                theme: Some("dark".into())
            }
        );
    }

    #[test]
    fn lone_dash_text_is_positional() {
        let cmd = parse(&["render", "-"]).unwrap();
        assert!(matches!(cmd, Cmd::Render { ref text, .. } if text == "-"));
    }
}
