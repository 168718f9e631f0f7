//! Integration tests for the shaping driver.
//!
//! Faces use a unit scale (one design unit per 26.6 unit) so GPOS offsets
//! read directly as 26.6 values.

mod common;

use std::path::PathBuf;
use std::rc::Rc;

use common::{FakeFace, FakeLayout, FakeProvider, FakeTables, cache_with, design_1000, px_metrics, script};
use fontweave_fonts::layout::{Anchor, GlyphClass, Positioning, ValueRecord};
use fontweave_fonts::{
    Adjustment, FaceCache, FaceKey, Font, FontEntity, FontFormat, GlyphString, INVALID_GLYPH,
    OpenTypeSpec, ShapeError, Shaper, SizeMetrics,
};

const SHAPED: &str = "/fake/shaped.otf";
const PLAIN: &str = "/fake/plain.ttf";

const ACUTE: u32 = 0x0301;
const KANJI: u32 = 0x845B;

fn face() -> FakeFace {
    let mut face = FakeFace {
        design: design_1000(),
        size_override: Some(SizeMetrics {
            pixel_size: 16,
            x_ppem: 16,
            y_ppem: 16,
            x_scale: 0x10000,
            y_scale: 0x10000,
            ascender: 12 << 6,
            descender: -(3 << 6),
            height: 19 << 6,
            max_advance: 10 << 6,
        }),
        ..FakeFace::default()
    }
    .map(' ', 1, px_metrics(0, 0, 0, 0, 5))
    .map('a', 2, px_metrics(1, 8, 8, 10, 10))
    .map('f', 10, px_metrics(0, 10, 6, 10, 6))
    .map('i', 11, px_metrics(1, 10, 3, 10, 4))
    .map('x', 30, px_metrics(0, 8, 8, 8, 8))
    .map('y', 33, px_metrics(0, 8, 8, 8, 8))
    .glyph(40, px_metrics(0, 10, 9, 10, 10))
    .glyph(31, px_metrics(0, 8, 4, 8, 4))
    .glyph(32, px_metrics(0, 8, 4, 8, 5))
    .glyph(34, px_metrics(0, 8, 2, 8, 3))
    .glyph(35, px_metrics(0, 8, 2, 8, 3))
    .glyph(36, px_metrics(0, 8, 2, 8, 3))
    .glyph(76, px_metrics(0, 14, 15, 16, 16))
    .glyph(77, px_metrics(0, 14, 15, 16, 16));
    face.cmap.insert(ACUTE, 20);
    face.glyphs.insert(20, px_metrics(-3, 12, 3, 2, 0));
    face.cmap.insert(KANJI, 76);
    face.variations.insert((KANJI, 0xFE00), 77);
    // Mapped but without loadable metrics
    face.cmap.insert('q' as u32, 99);
    face
}

fn tables() -> FakeTables {
    FakeTables {
        gsub_scripts: vec![script("latn", &["liga", "ccmp"])],
        gpos_scripts: vec![script("latn", &["mark", "kern"])],
        classes: [(2, GlyphClass::Base), (20, GlyphClass::Mark), (40, GlyphClass::Ligature)]
            .into_iter()
            .collect(),
        ligatures: vec![(vec![10, 11], 40)],
        decompositions: [(30, vec![31, 32]), (33, vec![34, 35, 36])].into_iter().collect(),
        positions: [
            (
                20,
                Positioning::MarkToBase {
                    base: Anchor::Design { x: 500, y: 700 },
                    mark: Anchor::Design { x: 100, y: 100 },
                },
            ),
            (
                10,
                Positioning::Single(ValueRecord {
                    x_advance: Some(128),
                    ..ValueRecord::default()
                }),
            ),
        ]
        .into_iter()
        .collect(),
        ..FakeTables::default()
    }
}

fn cache(tables: FakeTables) -> Rc<FaceCache> {
    let mut provider = FakeProvider::default();
    provider.faces.insert(PathBuf::from(SHAPED), face());
    provider.faces.insert(PathBuf::from(PLAIN), face());
    let mut layout = FakeLayout::default();
    layout.tables.insert(PathBuf::from(SHAPED), tables);
    cache_with(provider, layout)
}

fn open(cache: &Rc<FaceCache>, path: &str) -> Font {
    let entity = FontEntity {
        key: FaceKey::new(path, 0),
        foundry: None,
        family: Some("Fake".to_string()),
        weight: None,
        slant: None,
        width: None,
        pixel_size: 0,
        spacing: None,
        dpi: None,
        average_width: Some(0),
        adstyle: None,
        format: FontFormat::OpenType,
    };
    cache.open_font(&entity, 16).expect("font opens")
}

fn otf(text: &str) -> OpenTypeSpec {
    text.parse().expect("valid request")
}

fn codes(glyphs: &GlyphString) -> Vec<u32> {
    glyphs.glyphs().iter().map(|g| g.code).collect()
}

fn ranges(glyphs: &GlyphString) -> Vec<(usize, usize)> {
    glyphs.glyphs().iter().map(|g| (g.from, g.to)).collect()
}

#[test]
fn test_empty_input_shapes_to_empty() {
    let cache = cache(tables());
    let font = open(&cache, SHAPED);
    let shaped = Shaper::default()
        .shape(&font, &GlyphString::new(), &otf("latn::liga"))
        .expect("shaping succeeds");
    assert!(shaped.is_empty());
}

#[test]
fn test_identity_without_tables() {
    let cache = cache(tables());
    let font = open(&cache, PLAIN);
    let shaped = Shaper::default()
        .shape(&font, &GlyphString::from_text("fia"), &otf("latn::liga:kern"))
        .expect("shaping succeeds");

    assert_eq!(codes(&shaped), vec![10, 11, 2], "no ligature without tables");
    assert_eq!(ranges(&shaped), vec![(0, 0), (1, 1), (2, 2)]);
    let a = &shaped.glyphs()[2];
    assert_eq!(a.c, 'a' as u32);
    assert_eq!((a.width, a.lbearing, a.rbearing, a.ascent, a.descent), (10, 1, 9, 8, 2));
    assert!(shaped.glyphs().iter().all(|g| g.adjustment.is_none()));
}

#[test]
fn test_inactive_request_skips_tables() {
    let cache = cache(tables());
    let font = open(&cache, SHAPED);
    let shaped = Shaper::default()
        .shape(&font, &GlyphString::from_text("fi"), &OpenTypeSpec::default())
        .expect("shaping succeeds");
    assert_eq!(codes(&shaped), vec![10, 11]);
}

#[test]
fn test_ligature_merges_source_range() {
    let cache = cache(tables());
    let font = open(&cache, SHAPED);
    let shaped = Shaper::default()
        .shape(&font, &GlyphString::from_text("fia"), &otf("latn::liga"))
        .expect("shaping succeeds");

    assert_eq!(codes(&shaped), vec![40, 2]);
    assert_eq!(ranges(&shaped), vec![(0, 1), (2, 2)]);
    let ligature = &shaped.glyphs()[0];
    assert_eq!(ligature.c, 0, "a ligature stands for no single character");
    assert_eq!(ligature.width, 10);
    assert_eq!(shaped.glyphs()[1].c, 'a' as u32);
}

#[test]
fn test_reshaping_a_ligature_is_stable() {
    let cache = cache(tables());
    let font = open(&cache, SHAPED);
    let shaper = Shaper::default();
    let spec = otf("latn::liga");

    let once = shaper
        .shape(&font, &GlyphString::from_text("fi"), &spec)
        .expect("first pass");
    let twice = shaper.shape(&font, &once, &spec).expect("second pass");
    assert_eq!(once, twice);
}

#[test]
fn test_decomposition_copies_source() {
    let cache = cache(tables());
    let font = open(&cache, SHAPED);
    let shaped = Shaper::default()
        .shape(&font, &GlyphString::from_text("ax"), &otf("latn::ccmp"))
        .expect("shaping succeeds");

    assert_eq!(codes(&shaped), vec![2, 31, 32]);
    assert_eq!(ranges(&shaped), vec![(0, 0), (1, 1), (1, 1)]);
    assert!(shaped.glyphs()[1..].iter().all(|g| g.c == 0));
    assert_eq!(shaped.advance(), 10 + 4 + 5);
}

#[test]
fn test_mark_attaches_to_base() {
    let cache = cache(tables());
    let font = open(&cache, SHAPED);
    let input = GlyphString::from_chars(['a' as u32, ACUTE]);
    let shaped = Shaper::default()
        .shape(&font, &input, &otf("latn:::mark"))
        .expect("shaping succeeds");

    assert_eq!(shaped.glyphs()[0].adjustment, None);
    assert_eq!(
        shaped.glyphs()[1].adjustment,
        Some(Adjustment {
            xoff: 6,
            yoff: -10,
            xadv: 0,
            back: -1,
            advance_is_absolute: true,
        }),
        "400 and -600 in 26.6"
    );
    assert_eq!(ranges(&shaped), vec![(0, 1), (0, 1)], "base and mark share a cluster");
    assert_eq!(shaped.glyphs()[1].advance(), 0);
}

#[test]
fn test_gsub_failure_still_positions() {
    let cache = cache(FakeTables {
        fail_gsub: true,
        ..tables()
    });
    let font = open(&cache, SHAPED);
    let shaped = Shaper::default()
        .shape(&font, &GlyphString::from_text("fi"), &otf("latn::liga:kern"))
        .expect("a GSUB failure is not fatal");

    assert_eq!(codes(&shaped), vec![10, 11], "glyphs stay unsubstituted");
    assert_eq!(shaped.glyphs()[0].c, 'f' as u32);
    let f = shaped.glyphs()[0].adjustment.expect("GPOS still runs");
    assert_eq!(f.xadv, 2);
    assert!(!f.advance_is_absolute);
    assert_eq!(shaped.glyphs()[0].advance(), 8);
}

#[test]
fn test_gpos_failure_leaves_glyphs_unadjusted() {
    let cache = cache(FakeTables {
        fail_gpos: true,
        ..tables()
    });
    let font = open(&cache, SHAPED);
    let input = GlyphString::from_chars(['a' as u32, ACUTE]);
    let shaped = Shaper::default()
        .shape(&font, &input, &otf("latn:::mark"))
        .expect("a GPOS failure is not fatal");

    assert!(shaped.glyphs().iter().all(|g| g.adjustment.is_none()));
    assert_eq!(ranges(&shaped), vec![(0, 0), (1, 1)]);
    assert_eq!(shaped.glyphs()[1].lbearing, -3);
}

#[test]
fn test_declared_capacity_bounds_output() {
    let cache = cache(tables());
    let font = open(&cache, PLAIN);
    let input = GlyphString::from_text("fia").with_capacity(2);
    let err = Shaper::default()
        .shape(&font, &input, &OpenTypeSpec::default())
        .expect_err("three glyphs do not fit in two");
    assert!(matches!(err, ShapeError::BufferTooSmall { needed: 3 }));

    let shaped_font = open(&cache, SHAPED);
    let shaped = Shaper::default()
        .shape(&shaped_font, &input, &otf("latn::liga"))
        .expect("the ligature fits");
    assert_eq!(shaped.len(), 2);
    assert_eq!(shaped.capacity(), Some(2), "output keeps the declared capacity");
}

#[test]
fn test_buffer_grows_between_attempts() {
    let cache = cache(tables());
    let font = open(&cache, SHAPED);
    let input = GlyphString::from_text("y");
    let spec = otf("latn::ccmp");

    let shaped = Shaper::default()
        .shape(&font, &input, &spec)
        .expect("second attempt has room for three glyphs");
    assert_eq!(codes(&shaped), vec![34, 35, 36]);
    assert_eq!(ranges(&shaped), vec![(0, 0); 3]);

    let err = Shaper::with_attempts(1)
        .shape(&font, &input, &spec)
        .expect_err("one attempt is not enough");
    assert!(matches!(err, ShapeError::BufferTooSmall { needed: 3 }));
}

#[test]
fn test_with_attempts_has_a_floor() {
    let cache = cache(tables());
    let font = open(&cache, SHAPED);
    let shaped = Shaper::with_attempts(0)
        .shape(&font, &GlyphString::from_text("fi"), &otf("latn::liga"))
        .expect("zero attempts still drives once");
    assert_eq!(codes(&shaped), vec![40]);
}

#[test]
fn test_unmapped_glyph_gets_synthetic_metrics() {
    let cache = cache(tables());
    let font = open(&cache, SHAPED);
    let input = GlyphString::from_text("fz");

    for spec in [OpenTypeSpec::default(), otf("latn::liga:kern")] {
        let shaped = Shaper::default()
            .shape(&font, &input, &spec)
            .expect("shaping succeeds");
        let z = &shaped.glyphs()[1];
        assert_eq!(z.code, INVALID_GLYPH, "{spec}");
        assert_eq!(z.c, 'z' as u32);
        assert_eq!((z.width, z.lbearing, z.rbearing), (5, 0, 5), "space width box");
        assert_eq!((z.ascent, z.descent), (12, 3), "font ascent and descent");
    }
}

#[test]
fn test_variation_selector_folds_into_base() {
    let cache = cache(tables());
    let font = open(&cache, PLAIN);
    let input = GlyphString::from_chars([KANJI, 0xFE00, 'a' as u32]);
    let shaped = Shaper::default()
        .shape(&font, &input, &OpenTypeSpec::default())
        .expect("shaping succeeds");

    assert_eq!(codes(&shaped), vec![77, 2]);
    assert_eq!(ranges(&shaped), vec![(0, 1), (2, 2)]);

    let fallback = Shaper::default()
        .shape(&font, &GlyphString::from_chars([KANJI, 0xFE01]), &OpenTypeSpec::default())
        .expect("shaping succeeds");
    assert_eq!(codes(&fallback), vec![76], "no variant falls back to the cmap glyph");
}

#[test]
fn test_unloadable_glyph_is_fatal() {
    let cache = cache(tables());
    let font = open(&cache, PLAIN);
    let err = Shaper::default()
        .shape(&font, &GlyphString::from_text("aq"), &OpenTypeSpec::default())
        .expect_err("glyph 99 has no metrics");
    assert!(matches!(err, ShapeError::Metrics { glyph: 99, .. }));
}
