//! Sized font instances.
//!
//! A [`Font`] is one entity opened at one pixel size. It holds a usage count
//! on the cached face for its whole life and gives it back on drop.

use std::cell::OnceCell;
use std::ops::RangeInclusive;
use std::rc::Rc;

use crate::cache::{FaceCache, FaceHandle};
use crate::entity::FontEntity;
use crate::error::ProviderError;
use crate::layout::{LayoutTables, ScriptFeatures, Stage};
use crate::provider::{GlyphMetrics, SizeMetrics};
use crate::shaper::INVALID_GLYPH;
use crate::style::spacing;

const VARIATION_SELECTORS: [RangeInclusive<u32>; 2] = [0xFE00..=0xFE0F, 0xE0100..=0xE01EF];

/// Whether `c` is a variation selector.
pub fn is_variation_selector(c: u32) -> bool {
    VARIATION_SELECTORS.iter().any(|range| range.contains(&c))
}

/// Pixel metrics of an open font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontMetrics {
    pub pixel_size: u32,
    pub ascent: i32,
    /// Positive below the baseline
    pub descent: i32,
    pub height: i32,
    pub space_width: i32,
    pub average_width: i32,
    pub min_width: i32,
    pub underline_position: i32,
    pub underline_thickness: i32,
    pub scalable: bool,
}

/// Ink box of a run, in pixels relative to the run origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InkBounds {
    pub lbearing: i32,
    pub rbearing: i32,
    pub ascent: i32,
    pub descent: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextExtents {
    pub width: i32,
    /// `None` when no glyph of the run could be loaded
    pub bounds: Option<InkBounds>,
}

/// Scripts, language systems, and features the layout tables list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OtfCapability {
    pub gsub: Option<Vec<ScriptFeatures>>,
    pub gpos: Option<Vec<ScriptFeatures>>,
}

/// An entity opened at a pixel size.
pub struct Font {
    cache: Rc<FaceCache>,
    entity: FontEntity,
    face: FaceHandle,
    size: SizeMetrics,
    metrics: FontMetrics,
    layout: OnceCell<Option<Box<dyn LayoutTables>>>,
}

impl Font {
    /// Wrap an acquired face. The caller hands over one usage count.
    pub(crate) fn new(
        cache: Rc<FaceCache>,
        entity: FontEntity,
        face: FaceHandle,
        size: SizeMetrics,
    ) -> Self {
        let metrics = compute_metrics(&entity, &face, &size);
        log::debug!(
            "Opened {} at {}px (ascent {}, descent {}, space {})",
            entity.key,
            size.pixel_size,
            metrics.ascent,
            metrics.descent,
            metrics.space_width
        );
        Self {
            cache,
            entity,
            face,
            size,
            metrics,
            layout: OnceCell::new(),
        }
    }

    pub fn entity(&self) -> &FontEntity {
        &self.entity
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn size_metrics(&self) -> &SizeMetrics {
        &self.size
    }

    pub fn pixel_size(&self) -> u32 {
        self.size.pixel_size
    }

    pub(crate) fn face(&self) -> &FaceHandle {
        &self.face
    }

    pub fn has_char(&self, c: u32) -> bool {
        self.face.glyph_index(c) != 0
    }

    /// Glyph for `c`, or [`INVALID_GLYPH`].
    pub fn encode_char(&self, c: u32) -> u32 {
        match self.face.glyph_index(c) {
            0 => INVALID_GLYPH,
            code => code,
        }
    }

    pub fn glyph_metrics(&self, code: u32) -> Result<GlyphMetrics, ProviderError> {
        self.face.load_glyph(&self.size, code)
    }

    /// Advance width and ink box of a glyph run laid out without adjustments.
    pub fn text_extents(&self, codes: &[u32]) -> TextExtents {
        let mut width = 0;
        let mut bounds: Option<InkBounds> = None;
        for &code in codes {
            let Ok(m) = self.face.load_glyph(&self.size, code) else {
                width += self.metrics.space_width;
                continue;
            };
            let lbearing = m.bearing_x >> 6;
            let rbearing = (m.bearing_x + m.width) >> 6;
            let ascent = m.bearing_y >> 6;
            let descent = (m.height - m.bearing_y) >> 6;
            let b = bounds.get_or_insert(InkBounds {
                lbearing,
                rbearing,
                ascent,
                descent,
            });
            b.lbearing = b.lbearing.min(width + lbearing);
            b.rbearing = b.rbearing.max(width + rbearing);
            b.ascent = b.ascent.max(ascent);
            b.descent = b.descent.min(descent);
            width += m.advance >> 6;
        }
        TextExtents { width, bounds }
    }

    /// Outline point `index` of glyph `code`, 26.6.
    pub fn anchor_point(&self, code: u32, index: u16) -> Option<(i32, i32)> {
        self.face.outline_point(&self.size, code, index)
    }

    /// The face's layout tables, opened on first use.
    pub fn layout_tables(&self) -> Option<&dyn LayoutTables> {
        self.layout
            .get_or_init(|| {
                self.cache
                    .layout_engine()
                    .open_tables(self.entity.path(), self.entity.index())
            })
            .as_deref()
    }

    /// GSUB/GPOS script trees, or `None` for a face without layout tables.
    pub fn otf_capability(&self) -> Option<OtfCapability> {
        let tables = self.layout_tables()?;
        let list = |stage: Stage| {
            let scripts = tables.scripts(stage);
            let has_features = scripts
                .iter()
                .flat_map(|s| &s.langsyses)
                .any(|l| !l.features.is_empty());
            has_features.then_some(scripts)
        };
        Some(OtfCapability {
            gsub: list(Stage::Substitution),
            gpos: list(Stage::Positioning),
        })
    }

    /// `(selector, glyph)` for every variation selector the face maps for `c`.
    pub fn variation_glyphs(&self, c: u32) -> Vec<(u32, u32)> {
        VARIATION_SELECTORS
            .iter()
            .cloned()
            .flatten()
            .filter_map(|selector| {
                self.face
                    .variation_index(c, selector)
                    .map(|glyph| (selector, glyph))
            })
            .collect()
    }
}

impl Drop for Font {
    fn drop(&mut self) {
        if let Err(e) = self
            .cache
            .release_face(self.entity.path(), self.entity.index())
        {
            log::error!("Failed to release {}: {}", self.entity.key, e);
        }
    }
}

fn scale_design(value: i32, size: u32, upem: u16) -> i32 {
    (i64::from(value) * i64::from(size) / i64::from(upem.max(1))) as i32
}

fn compute_metrics(entity: &FontEntity, face: &FaceHandle, size: &SizeMetrics) -> FontMetrics {
    let design = face.design_metrics();
    let px = size.pixel_size;
    let upem = design.units_per_em;
    let scalable = entity.is_scalable();

    let mut metrics = FontMetrics {
        pixel_size: px,
        scalable,
        ..FontMetrics::default()
    };
    if scalable {
        metrics.ascent = scale_design(design.ascender, px, upem);
        metrics.descent = -scale_design(design.descender, px, upem);
        metrics.height = scale_design(design.height, px, upem);
    } else {
        metrics.ascent = size.ascender >> 6;
        metrics.descent = -size.descender >> 6;
        metrics.height = size.height >> 6;
    }

    let entity_spacing = entity.spacing.unwrap_or(spacing::PROPORTIONAL);
    if entity_spacing != spacing::PROPORTIONAL {
        let advance = if scalable {
            scale_design(design.max_advance, px, upem)
        } else {
            size.max_advance >> 6
        };
        metrics.min_width = advance;
        metrics.average_width = advance;
        metrics.space_width = advance;
    } else {
        let mut total = 0;
        let mut loaded = 0;
        for c in 32..=126u32 {
            let Ok(glyph) = face.load_glyph(size, face.glyph_index(c)) else {
                continue;
            };
            let this_width = glyph.advance >> 6;
            if this_width > 0 && (metrics.min_width == 0 || metrics.min_width > this_width) {
                metrics.min_width = this_width;
            }
            if c == 0x20 {
                metrics.space_width = this_width;
            }
            total += this_width;
            loaded += 1;
        }
        if loaded > 0 {
            metrics.average_width = total / loaded;
        }
    }

    if scalable {
        metrics.underline_position = -scale_design(design.underline_position, px, upem);
        metrics.underline_thickness = scale_design(design.underline_thickness, px, upem);
    } else {
        metrics.underline_position = -1;
        metrics.underline_thickness = 0;
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variation_selector_ranges() {
        assert!(is_variation_selector(0xFE00));
        assert!(is_variation_selector(0xFE0F));
        assert!(!is_variation_selector(0xFE10));
        assert!(is_variation_selector(0xE0100));
        assert!(is_variation_selector(0xE01EF));
        assert!(!is_variation_selector(0x41));
    }

    #[test]
    fn test_scale_design_truncates() {
        assert_eq!(scale_design(800, 16, 1000), 12, "12.8 truncates");
        assert_eq!(scale_design(-200, 16, 1000), -3, "-3.2 truncates toward zero");
        assert_eq!(scale_design(100, 16, 0), 1600, "zero upem is treated as 1");
    }
}
