use std::fs;
use std::path::Path;

use gridfont::alphabet::{Alphabet, LETTERS, PRIVATE_USE_START, SYMBOLS};
use gridfont::font::{self, FontMetadata};
use gridfont::pipeline::{self, BuildOptions};
use gridfont::svg::{self, IconOptions, MissingGlyphPolicy, RenderOptions};
use gridfont::theme::Theme;
use gridfont::vectorizer::bounds_of;
use test_log::test;
use ttf_parser::{Face, GlyphId};

fn table() -> Alphabet {
    Alphabet::from_definitions(LETTERS, SYMBOLS, PRIVATE_USE_START).unwrap()
}

fn options(root: &Path) -> BuildOptions {
    BuildOptions {
        font_dir: root.join("dist/fonts"),
        glyph_dir: root.join("dist/glyphs"),
        file_stem: "gridfont".to_string(),
        icons: IconOptions {
            block_size: 8,
            optimize: true,
            letter_spacing: 1,
        },
        metadata: FontMetadata {
            family: "GridFont".to_string(),
            units_per_em: 1000,
            cell_units: 140,
            ascent: 800,
            descent: -200,
            letter_spacing: 1,
        },
    }
}

#[test]
fn every_glyph_is_mapped_in_the_compiled_font() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    pipeline::generate(&table(), &opts).unwrap();

    let ttf = fs::read(opts.font_dir.join("gridfont.ttf")).unwrap();
    let face = Face::parse(&ttf, 0).unwrap();
    let table = table();
    assert_eq!(usize::from(face.number_of_glyphs()), table.len() + 1);
    for glyph in table.entries() {
        let gid = face
            .glyph_index(glyph.codepoint())
            .unwrap_or_else(|| panic!("{} is not mapped", glyph.name()));
        assert_eq!(face.glyph_name(gid), Some(glyph.name()));
        let advance = (glyph.width() as u16 + 1) * 140;
        assert_eq!(face.glyph_hor_advance(gid), Some(advance), "{}", glyph.name());
    }
}

#[test]
fn web_fonts_decode_to_the_compiled_font() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    pipeline::generate(&table(), &opts).unwrap();

    let ttf = fs::read(opts.font_dir.join("gridfont.ttf")).unwrap();
    let woff2 = fs::read(opts.font_dir.join("gridfont.woff2")).unwrap();
    let woff = fs::read(opts.font_dir.join("gridfont.woff")).unwrap();
    assert!(woff2.len() < ttf.len());
    assert!(woff.len() < ttf.len());

    for decoded in [font::woff2_to_compiled(&woff2).unwrap(), font::woff_to_compiled(&woff).unwrap()] {
        assert_eq!(decoded, ttf);
        let a = Face::parse(&decoded, 0).unwrap();
        let b = Face::parse(&ttf, 0).unwrap();
        assert_eq!(a.number_of_glyphs(), b.number_of_glyphs());
        for id in 0..a.number_of_glyphs() {
            assert_eq!(a.glyph_hor_advance(GlyphId(id)), b.glyph_hor_advance(GlyphId(id)));
        }
    }
}

#[test]
fn letter_w_scenario() {
    let table = table();
    let w = table.letter('W').unwrap();

    let icon = svg::glyph_icon(
        w,
        &IconOptions {
            block_size: 8,
            optimize: true,
            letter_spacing: 1,
        },
    )
    .unwrap();
    assert!(!icon.path.is_empty());
    assert_eq!(bounds_of(&icon.outlines).unwrap().width(), 40);

    let preview = RenderOptions {
        block_size: 8,
        optimize: true,
        theme: Theme::dark(),
        policy: MissingGlyphPolicy::Strict,
        letter_spacing: 1,
        background: true,
    };
    let svg = svg::render_text(&table, "W", &preview).unwrap();
    assert!(svg.contains(r#"width="40""#), "{svg}");

    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    pipeline::generate(&table, &opts).unwrap();
    let woff2 = fs::read(opts.font_dir.join("gridfont.woff2")).unwrap();
    assert_eq!(&woff2[..4], [0x77, 0x4f, 0x46, 0x32]);

    let ttf = fs::read(opts.font_dir.join("gridfont.ttf")).unwrap();
    let face = Face::parse(&ttf, 0).unwrap();
    let bbox = face.glyph_bounding_box(face.glyph_index('W').unwrap()).unwrap();
    assert_eq!((bbox.x_min, bbox.x_max), (0, 700));
    assert_eq!((bbox.y_min, bbox.y_max), (0, 700));
}

#[test]
fn rebuilding_produces_identical_artifacts() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    pipeline::generate(&table(), &options(first.path())).unwrap();
    pipeline::generate(&table(), &options(second.path())).unwrap();
    for name in ["gridfont.svg", "gridfont.ttf", "gridfont.woff2", "gridfont.woff"] {
        let a = fs::read(first.path().join("dist/fonts").join(name)).unwrap();
        let b = fs::read(second.path().join("dist/fonts").join(name)).unwrap();
        assert_eq!(a, b, "{name}");
    }
}

#[test]
fn blank_glyph_compiles_to_an_empty_outline() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    pipeline::generate(&table(), &opts).unwrap();
    let icon = fs::read_to_string(opts.glyph_dir.join("space.svg")).unwrap();
    assert!(!icon.contains("<path"));

    let ttf = fs::read(opts.font_dir.join("gridfont.ttf")).unwrap();
    let face = Face::parse(&ttf, 0).unwrap();
    let space = face.glyph_index(' ').unwrap();
    assert!(face.glyph_bounding_box(space).is_none());
    assert_eq!(face.glyph_hor_advance(space), Some(560));
}

#[test]
fn pictographs_use_private_use_codepoints() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    pipeline::generate(&table(), &opts).unwrap();
    let ttf = fs::read(opts.font_dir.join("gridfont.ttf")).unwrap();
    let face = Face::parse(&ttf, 0).unwrap();
    let heart = table().symbol("heart").unwrap().codepoint();
    assert!(('\u{E000}'..='\u{F8FF}').contains(&heart));
    let gid = face.glyph_index(heart).unwrap();
    assert_eq!(face.glyph_name(gid), Some("heart"));
}
