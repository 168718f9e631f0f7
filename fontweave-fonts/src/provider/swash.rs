//! Face provider backed by swash.
//!
//! Faces keep their file bytes in an `Arc<[u8]>` and rebuild a borrowed
//! `FontRef` per call from the stored offset and cache key.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use swash::scale::ScaleContext;
use swash::{CacheKey, FontRef};

use super::{DesignMetrics, FaceProvider, GlyphMetrics, ProviderFace, SizeMetrics};
use crate::charset::Charset;
use crate::error::ProviderError;

/// Opens TrueType/OpenType faces from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct SwashProvider;

impl SwashProvider {
    pub fn new() -> Self {
        Self
    }

    fn read(path: &Path) -> Result<Vec<u8>, ProviderError> {
        fs::read(path).map_err(|source| ProviderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl FaceProvider for SwashProvider {
    fn open(&self, path: &Path, index: u32) -> Result<Box<dyn ProviderFace>, ProviderError> {
        let data = Self::read(path)?;
        let face = SwashFace::from_data(Arc::from(data), index).ok_or_else(|| {
            ProviderError::InvalidFace {
                path: path.to_path_buf(),
                index,
            }
        })?;
        log::debug!("Opened face {:?}#{} ({} upem)", path, index, face.design.units_per_em);
        Ok(Box::new(face))
    }

    fn charset(&self, path: &Path, index: u32) -> Result<Charset, ProviderError> {
        let data = Self::read(path)?;
        let font = FontRef::from_index(&data, index as usize).ok_or_else(|| {
            ProviderError::InvalidFace {
                path: path.to_path_buf(),
                index,
            }
        })?;
        let mut set = Charset::new();
        font.charmap().enumerate(|cp, _| {
            set.insert(cp);
        });
        Ok(set)
    }
}

/// An open face.
pub struct SwashFace {
    data: Arc<[u8]>,
    index: u32,
    offset: u32,
    key: CacheKey,
    glyph_count: u16,
    design: DesignMetrics,
    context: RefCell<ScaleContext>,
}

impl SwashFace {
    pub fn from_data(data: Arc<[u8]>, index: u32) -> Option<Self> {
        let font = FontRef::from_index(&data, index as usize)?;
        let (offset, key) = (font.offset, font.key);
        let metrics = font.metrics(&[]);
        let design = DesignMetrics {
            units_per_em: metrics.units_per_em,
            ascender: metrics.ascent.round() as i32,
            descender: -(metrics.descent.round() as i32),
            height: (metrics.ascent + metrics.descent + metrics.leading).round() as i32,
            max_advance: metrics.max_width.round() as i32,
            underline_position: metrics.underline_offset.round() as i32,
            underline_thickness: metrics.stroke_size.round() as i32,
        };
        let glyph_count = metrics.glyph_count;
        Some(Self {
            data,
            index,
            offset,
            key,
            glyph_count,
            design,
            context: RefCell::new(ScaleContext::new()),
        })
    }

    fn font(&self) -> FontRef<'_> {
        FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        }
    }

    fn to_26_6(value: f32) -> i32 {
        (value * 64.0).round() as i32
    }
}

impl ProviderFace for SwashFace {
    fn design_metrics(&self) -> DesignMetrics {
        self.design
    }

    fn glyph_index(&self, c: u32) -> u32 {
        u32::from(self.font().charmap().map(c))
    }

    fn variation_index(&self, c: u32, selector: u32) -> Option<u32> {
        let (base, selector) = (char::from_u32(c)?, char::from_u32(selector)?);
        let face = rustybuzz::ttf_parser::Face::parse(&self.data, self.index).ok()?;
        face.glyph_variation_index(base, selector)
            .map(|id| u32::from(id.0))
    }

    fn load_glyph(&self, size: &SizeMetrics, glyph: u32) -> Result<GlyphMetrics, ProviderError> {
        let id = u16::try_from(glyph)
            .ok()
            .filter(|id| *id < self.glyph_count)
            .ok_or(ProviderError::GlyphLoad(glyph))?;
        let font = self.font();
        let px = size.pixel_size as f32;
        let upem = f32::from(self.design.units_per_em.max(1));
        let advance = font.glyph_metrics(&[]).advance_width(id) * px / upem;

        let mut context = self.context.borrow_mut();
        let mut scaler = context.builder(font).size(px).hint(false).build();
        let mut metrics = GlyphMetrics {
            advance: Self::to_26_6(advance),
            ..GlyphMetrics::default()
        };
        if let Some(outline) = scaler.scale_outline(id) {
            let bounds = outline.bounds();
            metrics.bearing_x = Self::to_26_6(bounds.min.x);
            metrics.bearing_y = Self::to_26_6(bounds.max.y);
            metrics.width = Self::to_26_6(bounds.max.x - bounds.min.x);
            metrics.height = Self::to_26_6(bounds.max.y - bounds.min.y);
        }
        Ok(metrics)
    }

    fn outline_point(&self, size: &SizeMetrics, glyph: u32, point: u16) -> Option<(i32, i32)> {
        let id = u16::try_from(glyph).ok()?;
        let mut context = self.context.borrow_mut();
        let mut scaler = context
            .builder(self.font())
            .size(size.pixel_size as f32)
            .hint(false)
            .build();
        let outline = scaler.scale_outline(id)?;
        let p = outline.points().get(usize::from(point))?;
        Some((Self::to_26_6(p.x), Self::to_26_6(p.y)))
    }
}
