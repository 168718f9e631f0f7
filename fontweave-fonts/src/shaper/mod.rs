//! OpenType shaping driver.
//!
//! A call runs COLLECT → SUBSTITUTE → POSITION → EMIT over a private working
//! copy of the input. Geometry stays in 26.6 until EMIT converts it to
//! pixels. Table engine failures degrade the stage they happen in to an
//! identity pass; only glyph measurement failures are fatal.

mod glyph;
mod position;

pub use glyph::{Adjustment, Glyph, GlyphString, INVALID_GLYPH};

use fontweave_config::Config;

use crate::error::ShapeError;
use crate::font::{Font, is_variation_selector};
use crate::layout::{LayoutGlyph, LayoutTables};
use crate::otspec::OpenTypeSpec;
use position::{FixedAdjustment, Scale, apply_positioning};

/// Working glyph: pixel metrics are filled only at EMIT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WorkGlyph {
    pub c: u32,
    pub code: u32,
    pub from: usize,
    pub to: usize,
    pub adjustment: Option<FixedAdjustment>,
}

impl WorkGlyph {
    #[cfg(test)]
    pub(crate) fn new(c: u32, code: u32, index: usize) -> Self {
        Self {
            c,
            code,
            from: index,
            to: index,
            adjustment: None,
        }
    }

    /// Glyph id as the table engine sees it. Unmapped glyphs are 0.
    fn table_id(&self) -> u16 {
        u16::try_from(self.code).unwrap_or(0)
    }

    /// Take the glyph the table engine produced. A changed glyph no longer
    /// stands for one source character.
    fn substitute(&mut self, glyph_id: u16) {
        if self.table_id() != glyph_id {
            self.c = 0;
            self.code = u32::from(glyph_id);
        }
    }
}

/// Output store handed to a drive, bounded like a preallocated glyph array.
struct GlyphBuffer {
    glyphs: Vec<WorkGlyph>,
    allocated: usize,
}

impl GlyphBuffer {
    fn new(allocated: usize) -> Self {
        Self {
            glyphs: Vec::with_capacity(allocated),
            allocated,
        }
    }

    /// Room for `additional` more glyphs, or the total that would be needed.
    fn reserve(&self, additional: usize) -> Result<(), usize> {
        let needed = self.glyphs.len() + additional;
        if needed > self.allocated {
            Err(needed)
        } else {
            Ok(())
        }
    }

    /// Discard the contents and double the allocation.
    fn grow(&mut self) {
        self.glyphs.clear();
        self.allocated = self.allocated.saturating_mul(2);
        self.glyphs.reserve(self.allocated);
    }
}

/// Runs shaping passes against a [`Font`].
#[derive(Debug, Clone)]
pub struct Shaper {
    max_attempts: u32,
}

impl Default for Shaper {
    fn default() -> Self {
        Self::with_attempts(fontweave_config::defaults::max_shape_attempts())
    }
}

impl Shaper {
    pub fn new(config: &Config) -> Self {
        Self::with_attempts(config.max_shape_attempts)
    }

    /// A shaper making at most `max_attempts` drives per call (minimum 1).
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn shape(
        &self,
        font: &Font,
        input: &GlyphString,
        spec: &OpenTypeSpec,
    ) -> Result<GlyphString, ShapeError> {
        let work = collect(font, input);
        if work.is_empty() {
            return Ok(GlyphString::new());
        }

        let tables = font
            .layout_tables()
            .filter(|_| spec.gsub().is_active() || spec.gpos().is_active());
        let shaped = match tables {
            Some(tables) => self.drive_with_retry(font, tables, spec, &work)?,
            None => work,
        };

        if let Some(capacity) = input.capacity() {
            if shaped.len() > capacity {
                return Err(ShapeError::BufferTooSmall {
                    needed: shaped.len(),
                });
            }
        }

        let output = emit(font, &shaped, input.capacity())?;
        log::debug!(
            "Shaped {} glyphs into {} with {} on {}",
            input.len(),
            output.len(),
            spec,
            font.entity().key
        );
        Ok(output)
    }

    fn drive_with_retry(
        &self,
        font: &Font,
        tables: &dyn LayoutTables,
        spec: &OpenTypeSpec,
        work: &[WorkGlyph],
    ) -> Result<Vec<WorkGlyph>, ShapeError> {
        let mut buffer = GlyphBuffer::new(work.len() * 2);
        let mut needed = buffer.allocated;
        for attempt in 1..=self.max_attempts {
            match drive(font, tables, spec, work, &mut buffer) {
                Ok(()) => return Ok(buffer.glyphs),
                Err(required) => {
                    log::debug!(
                        "Glyph buffer of {} too small ({} needed), attempt {}/{}",
                        buffer.allocated,
                        required,
                        attempt,
                        self.max_attempts
                    );
                    needed = required;
                    buffer.grow();
                }
            }
        }
        Err(ShapeError::BufferTooSmall { needed })
    }
}

/// Encode every glyph, folding variation selectors into their base.
fn collect(font: &Font, input: &GlyphString) -> Vec<WorkGlyph> {
    let glyphs = input.glyphs();
    let mut work = Vec::with_capacity(glyphs.len());
    let mut i = 0;
    while i < glyphs.len() {
        let g = &glyphs[i];
        let mut w = WorkGlyph {
            c: g.c,
            code: g.code,
            from: g.from,
            to: g.to,
            adjustment: None,
        };
        let selector = glyphs
            .get(i + 1)
            .filter(|next| is_variation_selector(next.c) && !is_variation_selector(g.c));
        if let Some(selector) = selector {
            w.code = font
                .face()
                .variation_index(g.c, selector.c)
                .unwrap_or_else(|| font.encode_char(g.c));
            w.to = selector.to;
            i += 1;
        } else if !g.is_encoded() {
            w.code = font.encode_char(g.c);
        }
        work.push(w);
        i += 1;
    }
    work
}

fn layout_string(work: &[WorkGlyph], tables: &dyn LayoutTables) -> Vec<LayoutGlyph> {
    let mut layout: Vec<LayoutGlyph> = work
        .iter()
        .enumerate()
        .map(|(i, w)| LayoutGlyph::new(i, w.c, w.table_id()))
        .collect();
    tables.glyph_classes(&mut layout);
    layout
}

/// Copy substitution output into `out`, carrying source ranges over.
///
/// The first glyph of each group produced from inputs `[a, b]` copies input
/// `a` and widens its range over the group; later glyphs copy input `b`.
fn merge_substitution(work: &[WorkGlyph], layout: &[LayoutGlyph], out: &mut Vec<WorkGlyph>) {
    let last = work.len() - 1;
    let mut i = 0;
    while i < layout.len() {
        let a = layout[i].from.min(last);
        let b = layout[i].to.clamp(a, last);
        let mut g = work[a].clone();
        g.substitute(layout[i].glyph_id);
        for source in &work[a + 1..=b] {
            g.from = g.from.min(source.from);
            g.to = g.to.max(source.to);
        }
        out.push(g);
        i += 1;

        while i < layout.len() && layout[i].from == layout[i - 1].from {
            let mut g = work[layout[i].to.min(last)].clone();
            g.substitute(layout[i].glyph_id);
            out.push(g);
            i += 1;
        }
    }
}

/// One pass over `work`. `Err` carries the buffer size that was needed.
fn drive(
    font: &Font,
    tables: &dyn LayoutTables,
    spec: &OpenTypeSpec,
    work: &[WorkGlyph],
    out: &mut GlyphBuffer,
) -> Result<(), usize> {
    let script = spec.script_tag();
    let langsys = spec.langsys();
    let mut layout = layout_string(work, tables);

    if spec.gsub().is_active() {
        match tables.substitute(&mut layout, script, langsys, spec.gsub()) {
            Ok(()) => {
                out.reserve(layout.len())?;
                merge_substitution(work, &layout, &mut out.glyphs);
            }
            Err(e) => {
                log::warn!("GSUB failed on {}, keeping glyphs unchanged: {}", font.entity().key, e);
                out.reserve(work.len())?;
                out.glyphs.extend_from_slice(work);
                layout = layout_string(work, tables);
            }
        }
    } else {
        out.reserve(work.len())?;
        out.glyphs.extend_from_slice(work);
    }

    if spec.gpos().is_active() {
        let size = font.size_metrics();
        let ppem = (size.x_ppem, size.y_ppem);
        match tables.position(&mut layout, script, langsys, spec.gpos(), ppem) {
            Ok(()) => {
                let outline = |code: u32, point: u16| font.anchor_point(code, point);
                apply_positioning(&layout, &mut out.glyphs, &Scale::from(size), &outline);
            }
            Err(e) => {
                log::warn!("GPOS failed on {}, glyphs stay unadjusted: {}", font.entity().key, e);
            }
        }
    }
    Ok(())
}

/// Measure every glyph and convert to pixels.
fn emit(
    font: &Font,
    shaped: &[WorkGlyph],
    capacity: Option<usize>,
) -> Result<GlyphString, ShapeError> {
    let metrics = font.metrics();
    let mut output = GlyphString::new();
    for w in shaped {
        let (lbearing, rbearing, ascent, descent, xadv) = if w.code == INVALID_GLYPH {
            let space = metrics.space_width << 6;
            (0, space, metrics.ascent << 6, metrics.descent << 6, space)
        } else {
            let m = font
                .glyph_metrics(w.code)
                .map_err(|source| ShapeError::Metrics {
                    glyph: w.code,
                    source,
                })?;
            (
                m.bearing_x,
                m.bearing_x + m.width,
                m.bearing_y,
                m.height - m.bearing_y,
                m.advance,
            )
        };
        output.push(Glyph {
            c: w.c,
            code: w.code,
            from: w.from,
            to: w.to,
            width: xadv >> 6,
            lbearing: lbearing >> 6,
            rbearing: rbearing >> 6,
            ascent: ascent >> 6,
            descent: descent >> 6,
            adjustment: w.adjustment.map(|adj| Adjustment {
                xoff: adj.xoff >> 6,
                yoff: adj.yoff >> 6,
                xadv: adj.xadv >> 6,
                back: adj.back,
                advance_is_absolute: adj.advance_is_absolute,
            }),
        });
    }
    Ok(match capacity {
        Some(capacity) => output.with_capacity(capacity),
        None => output,
    })
}
