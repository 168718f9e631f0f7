//! In-memory fakes for the matching engine, face provider, and layout engine.
//!
//! Include from a test file with `mod common;`. Every fake records what it
//! was asked through a shared log so tests can count engine queries, charset
//! enumerations, and face closes after handing the fake over by `Box`.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use fontweave_fonts::layout::{GlyphClass, LangSysFeatures, LayoutGlyph, Positioning, ScriptFeatures};
use fontweave_fonts::{
    Candidate, Charset, DesignMetrics, EngineError, FaceCache, FaceProvider, FeatureSet, Field,
    GlyphMetrics, LayoutEngine, LayoutTables, MatchEngine, Pattern, ProviderError, ProviderFace,
    Resolver, SizeMetrics, Stage, TableError, Tag,
};
use fontweave_fonts::script::ScriptChars;
use fontweave_fonts::style::{slant, weight};

// ============================================================================
// Matching engine
// ============================================================================

#[derive(Debug, Default)]
pub struct EngineLog {
    pub list_calls: Cell<usize>,
    pub best_match_calls: Cell<usize>,
    pub patterns: RefCell<Vec<Pattern>>,
    pub fields: RefCell<Vec<Vec<Field>>>,
}

/// Returns its configured candidates for every listing.
#[derive(Default)]
pub struct FakeEngine {
    pub candidates: Vec<Candidate>,
    pub best: Option<Candidate>,
    pub families: Vec<String>,
    pub fail: bool,
    pub log: Rc<EngineLog>,
}

impl MatchEngine for FakeEngine {
    fn list(&self, pattern: &Pattern, fields: &[Field]) -> Result<Vec<Candidate>, EngineError> {
        self.log.list_calls.set(self.log.list_calls.get() + 1);
        self.log.patterns.borrow_mut().push(pattern.clone());
        self.log.fields.borrow_mut().push(fields.to_vec());
        if self.fail {
            return Err(EngineError::Query("out of memory".to_string()));
        }
        Ok(self.candidates.clone())
    }

    fn best_match(&self, pattern: &Pattern) -> Result<Option<Candidate>, EngineError> {
        self.log.best_match_calls.set(self.log.best_match_calls.get() + 1);
        self.log.patterns.borrow_mut().push(pattern.clone());
        if self.fail {
            return Err(EngineError::Query("out of memory".to_string()));
        }
        Ok(self.best.clone())
    }

    fn families(&self) -> Result<Vec<String>, EngineError> {
        if self.fail {
            return Err(EngineError::Query("out of memory".to_string()));
        }
        Ok(self.families.clone())
    }
}

/// A scalable candidate for `path` reported as a regular roman face.
pub fn candidate(path: &str, family: &str) -> Candidate {
    Candidate {
        file: Some(PathBuf::from(path)),
        index: Some(0),
        family: Some(family.to_string()),
        weight: Some(weight::REGULAR),
        slant: Some(slant::ROMAN - slant::ENGINE_OFFSET),
        scalable: Some(true),
        style: Some("Regular".to_string()),
        ..Candidate::default()
    }
}

// ============================================================================
// Face provider
// ============================================================================

#[derive(Debug, Default)]
pub struct ProviderLog {
    pub opens: Cell<usize>,
    pub closes: Cell<usize>,
    pub charset_calls: Cell<usize>,
}

/// Face data described as tables.
#[derive(Debug, Clone, Default)]
pub struct FakeFace {
    pub design: DesignMetrics,
    pub cmap: HashMap<u32, u32>,
    pub glyphs: HashMap<u32, GlyphMetrics>,
    pub points: HashMap<(u32, u16), (i32, i32)>,
    pub variations: HashMap<(u32, u32), u32>,
    /// Scaled metrics override for bitmap-style faces
    pub size_override: Option<SizeMetrics>,
    pub fail_size: bool,
}

impl FakeFace {
    pub fn map(mut self, c: char, glyph: u32, metrics: GlyphMetrics) -> Self {
        self.cmap.insert(c as u32, glyph);
        self.glyphs.insert(glyph, metrics);
        self
    }

    pub fn glyph(mut self, glyph: u32, metrics: GlyphMetrics) -> Self {
        self.glyphs.insert(glyph, metrics);
        self
    }
}

/// `(bearing_x, bearing_y, width, height, advance)` in whole pixels.
pub fn px_metrics(bearing_x: i32, bearing_y: i32, width: i32, height: i32, advance: i32) -> GlyphMetrics {
    GlyphMetrics {
        bearing_x: bearing_x << 6,
        bearing_y: bearing_y << 6,
        width: width << 6,
        height: height << 6,
        advance: advance << 6,
    }
}

pub fn design_1000() -> DesignMetrics {
    DesignMetrics {
        units_per_em: 1000,
        ascender: 800,
        descender: -200,
        height: 1200,
        max_advance: 600,
        underline_position: -100,
        underline_thickness: 50,
    }
}

struct FakeFaceHandle {
    face: FakeFace,
    log: Rc<ProviderLog>,
}

impl Drop for FakeFaceHandle {
    fn drop(&mut self) {
        self.log.closes.set(self.log.closes.get() + 1);
    }
}

impl ProviderFace for FakeFaceHandle {
    fn design_metrics(&self) -> DesignMetrics {
        self.face.design
    }

    fn size_context(&self, pixel_size: u32) -> Result<SizeMetrics, ProviderError> {
        if self.face.fail_size {
            return Err(ProviderError::InvalidSize(pixel_size));
        }
        match self.face.size_override {
            Some(size) => Ok(SizeMetrics { pixel_size, ..size }),
            None => SizeMetrics::from_design(&self.face.design, pixel_size),
        }
    }

    fn glyph_index(&self, c: u32) -> u32 {
        self.face.cmap.get(&c).copied().unwrap_or(0)
    }

    fn variation_index(&self, c: u32, selector: u32) -> Option<u32> {
        self.face.variations.get(&(c, selector)).copied()
    }

    fn load_glyph(&self, _size: &SizeMetrics, glyph: u32) -> Result<GlyphMetrics, ProviderError> {
        self.face
            .glyphs
            .get(&glyph)
            .copied()
            .ok_or(ProviderError::GlyphLoad(glyph))
    }

    fn outline_point(&self, _size: &SizeMetrics, glyph: u32, point: u16) -> Option<(i32, i32)> {
        self.face.points.get(&(glyph, point)).copied()
    }
}

#[derive(Default)]
pub struct FakeProvider {
    pub faces: HashMap<PathBuf, FakeFace>,
    pub charsets: HashMap<PathBuf, Charset>,
    pub average_widths: HashMap<PathBuf, i32>,
    pub log: Rc<ProviderLog>,
}

impl FaceProvider for FakeProvider {
    fn open(&self, path: &Path, index: u32) -> Result<Box<dyn ProviderFace>, ProviderError> {
        let face = self.faces.get(path).ok_or_else(|| ProviderError::InvalidFace {
            path: path.to_path_buf(),
            index,
        })?;
        self.log.opens.set(self.log.opens.get() + 1);
        Ok(Box::new(FakeFaceHandle {
            face: face.clone(),
            log: Rc::clone(&self.log),
        }))
    }

    fn charset(&self, path: &Path, index: u32) -> Result<Charset, ProviderError> {
        self.log.charset_calls.set(self.log.charset_calls.get() + 1);
        self.charsets
            .get(path)
            .cloned()
            .ok_or_else(|| ProviderError::InvalidFace {
                path: path.to_path_buf(),
                index,
            })
    }

    fn average_width_property(&self, path: &Path, _index: u32) -> Option<i32> {
        self.average_widths.get(path).copied()
    }
}

// ============================================================================
// Layout engine
// ============================================================================

/// GSUB/GPOS behaviour described as data.
///
/// Substitution applies `ligatures` left to right, then `decompositions`;
/// positioning copies `positions` onto glyphs by id.
#[derive(Debug, Clone, Default)]
pub struct FakeTables {
    pub gsub_scripts: Vec<ScriptFeatures>,
    pub gpos_scripts: Vec<ScriptFeatures>,
    pub classes: HashMap<u16, GlyphClass>,
    pub ligatures: Vec<(Vec<u16>, u16)>,
    pub decompositions: HashMap<u16, Vec<u16>>,
    pub positions: HashMap<u16, Positioning>,
    pub fail_gsub: bool,
    pub fail_gpos: bool,
}

impl LayoutTables for FakeTables {
    fn has_table(&self, stage: Stage) -> bool {
        !self.scripts(stage).is_empty()
    }

    fn scripts(&self, stage: Stage) -> Vec<ScriptFeatures> {
        match stage {
            Stage::Substitution => self.gsub_scripts.clone(),
            Stage::Positioning => self.gpos_scripts.clone(),
        }
    }

    fn glyph_classes(&self, glyphs: &mut [LayoutGlyph]) {
        for glyph in glyphs {
            glyph.class = self.classes.get(&glyph.glyph_id).copied().unwrap_or_default();
        }
    }

    fn substitute(
        &self,
        glyphs: &mut Vec<LayoutGlyph>,
        _script: Tag,
        _langsys: Option<Tag>,
        _features: &FeatureSet,
    ) -> Result<(), TableError> {
        if self.fail_gsub {
            return Err(TableError::Malformed {
                table: "GSUB",
                index: 0,
            });
        }
        let mut out = Vec::with_capacity(glyphs.len());
        let mut i = 0;
        while i < glyphs.len() {
            let ids = glyphs[i..].iter().map(|g| g.glyph_id);
            let ligature = self
                .ligatures
                .iter()
                .find(|(components, _)| ids.clone().take(components.len()).eq(components.iter().copied()));
            if let Some((components, ligature)) = ligature {
                let last = &glyphs[i + components.len() - 1];
                out.push(LayoutGlyph {
                    glyph_id: *ligature,
                    class: GlyphClass::Ligature,
                    to: last.to,
                    ..glyphs[i].clone()
                });
                i += components.len();
            } else if let Some(parts) = self.decompositions.get(&glyphs[i].glyph_id) {
                out.extend(parts.iter().map(|id| LayoutGlyph {
                    glyph_id: *id,
                    ..glyphs[i].clone()
                }));
                i += 1;
            } else {
                out.push(glyphs[i].clone());
                i += 1;
            }
        }
        *glyphs = out;
        Ok(())
    }

    fn position(
        &self,
        glyphs: &mut [LayoutGlyph],
        _script: Tag,
        _langsys: Option<Tag>,
        _features: &FeatureSet,
        _ppem: (u16, u16),
    ) -> Result<(), TableError> {
        if self.fail_gpos {
            return Err(TableError::Malformed {
                table: "GPOS",
                index: 0,
            });
        }
        for glyph in glyphs {
            if let Some(positioning) = self.positions.get(&glyph.glyph_id) {
                glyph.positioning = positioning.clone();
            }
        }
        Ok(())
    }
}

/// One script with a default language system listing `features`.
pub fn script(tag: &str, features: &[&str]) -> ScriptFeatures {
    ScriptFeatures {
        script: tag.parse().expect("valid script tag"),
        langsyses: vec![LangSysFeatures {
            langsys: None,
            features: features
                .iter()
                .map(|f| f.parse().expect("valid feature tag"))
                .collect(),
        }],
    }
}

#[derive(Debug, Default)]
pub struct LayoutLog {
    pub opens: Cell<usize>,
}

#[derive(Default)]
pub struct FakeLayout {
    pub tables: HashMap<PathBuf, FakeTables>,
    pub log: Rc<LayoutLog>,
}

impl LayoutEngine for FakeLayout {
    fn open_tables(&self, path: &Path, _index: u32) -> Option<Box<dyn LayoutTables>> {
        self.log.opens.set(self.log.opens.get() + 1);
        self.tables
            .get(path)
            .cloned()
            .map(|tables| Box::new(tables) as Box<dyn LayoutTables>)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn cache_with(provider: FakeProvider, layout: FakeLayout) -> Rc<FaceCache> {
    Rc::new(FaceCache::new(Box::new(provider), Box::new(layout)))
}

pub fn resolver_with(engine: FakeEngine, provider: FakeProvider, layout: FakeLayout) -> Resolver {
    Resolver::new(
        Box::new(engine),
        cache_with(provider, layout),
        ScriptChars::default(),
    )
}
