//! Face provider seam.
//!
//! Values marked 26.6 are fixed point with 6 fractional bits (1/64 pixel).
//! Design metrics are in font units.

pub mod swash;

use std::path::Path;

use crate::charset::Charset;
use crate::error::ProviderError;

/// Unscaled face metrics in font design units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DesignMetrics {
    pub units_per_em: u16,
    pub ascender: i32,
    /// Negative below the baseline
    pub descender: i32,
    pub height: i32,
    pub max_advance: i32,
    /// Negative below the baseline
    pub underline_position: i32,
    pub underline_thickness: i32,
}

/// Metrics scaled to one pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeMetrics {
    pub pixel_size: u32,
    pub x_ppem: u16,
    pub y_ppem: u16,
    /// 16.16 factor from design units to 26.6 pixels
    pub x_scale: i32,
    pub y_scale: i32,
    /// 26.6
    pub ascender: i32,
    /// 26.6, negative below the baseline
    pub descender: i32,
    /// 26.6
    pub height: i32,
    /// 26.6
    pub max_advance: i32,
}

impl SizeMetrics {
    /// Scale design metrics the way FreeType does for a pixel size.
    pub fn from_design(design: &DesignMetrics, pixel_size: u32) -> Result<Self, ProviderError> {
        if pixel_size == 0 || design.units_per_em == 0 || pixel_size > u32::from(u16::MAX) {
            return Err(ProviderError::InvalidSize(pixel_size));
        }
        let scale = ((i64::from(pixel_size) << 22) / i64::from(design.units_per_em)) as i32;
        Ok(Self {
            pixel_size,
            x_ppem: pixel_size as u16,
            y_ppem: pixel_size as u16,
            x_scale: scale,
            y_scale: scale,
            ascender: mul_fix(design.ascender, scale),
            descender: mul_fix(design.descender, scale),
            height: mul_fix(design.height, scale),
            max_advance: mul_fix(design.max_advance, scale),
        })
    }
}

/// `value * scale / 0x10000`, rounded like FreeType's `FT_MulFix`.
pub fn mul_fix(value: i32, scale: i32) -> i32 {
    let product = i64::from(value) * i64::from(scale);
    let rounded = (product.abs() + 0x8000) >> 16;
    (if product < 0 { -rounded } else { rounded }) as i32
}

/// Per-glyph metrics at a size, 26.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphMetrics {
    pub bearing_x: i32,
    pub bearing_y: i32,
    pub width: i32,
    pub height: i32,
    pub advance: i32,
}

/// An opened face. Dropping it closes the face.
pub trait ProviderFace {
    fn design_metrics(&self) -> DesignMetrics;

    /// Create an independent size context.
    fn size_context(&self, pixel_size: u32) -> Result<SizeMetrics, ProviderError> {
        SizeMetrics::from_design(&self.design_metrics(), pixel_size)
    }

    /// Nominal glyph for a character; 0 when the face lacks it.
    fn glyph_index(&self, c: u32) -> u32;

    /// Glyph for a base character followed by a variation selector.
    fn variation_index(&self, _c: u32, _selector: u32) -> Option<u32> {
        None
    }

    fn load_glyph(&self, size: &SizeMetrics, glyph: u32) -> Result<GlyphMetrics, ProviderError>;

    /// Outline point `point` of `glyph`, 26.6.
    fn outline_point(&self, size: &SizeMetrics, glyph: u32, point: u16) -> Option<(i32, i32)>;
}

/// Opens faces by (path, index).
pub trait FaceProvider {
    fn open(&self, path: &Path, index: u32) -> Result<Box<dyn ProviderFace>, ProviderError>;

    /// Every code point the face maps.
    fn charset(&self, path: &Path, index: u32) -> Result<Charset, ProviderError>;

    /// The `AVERAGE_WIDTH` property of bitmap faces.
    fn average_width_property(&self, _path: &Path, _index: u32) -> Option<i32> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design() -> DesignMetrics {
        DesignMetrics {
            units_per_em: 1024,
            ascender: 800,
            descender: -200,
            height: 1100,
            max_advance: 600,
            underline_position: -100,
            underline_thickness: 50,
        }
    }

    #[test]
    fn test_scale_factor() {
        let size = SizeMetrics::from_design(&design(), 16).expect("valid size");
        assert_eq!(size.x_scale, 0x10000, "16px at 1024 upem is one 26.6 unit per font unit");
        assert_eq!(size.ascender, 800);
        assert_eq!(size.descender, -200);
        assert_eq!(size.x_ppem, 16);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            SizeMetrics::from_design(&design(), 0),
            Err(ProviderError::InvalidSize(0))
        ));
    }

    #[test]
    fn test_mul_fix_rounds_symmetrically() {
        assert_eq!(mul_fix(3, 0x8000), 2);
        assert_eq!(mul_fix(-3, 0x8000), -2);
        assert_eq!(mul_fix(100, 0x20000), 200);
    }
}
