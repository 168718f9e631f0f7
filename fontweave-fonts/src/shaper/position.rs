//! GPOS record arithmetic. Everything here is 26.6.

use super::WorkGlyph;
use crate::layout::{Anchor, DeviceTable, GlyphClass, LayoutGlyph, Positioning, ValueRecord};
use crate::provider::SizeMetrics;

/// Design-unit to 26.6 scaling at the current size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Scale {
    pub x_scale: i32,
    pub y_scale: i32,
    pub x_ppem: u16,
    pub y_ppem: u16,
}

impl From<&SizeMetrics> for Scale {
    fn from(size: &SizeMetrics) -> Self {
        Self {
            x_scale: size.x_scale,
            y_scale: size.y_scale,
            x_ppem: size.x_ppem,
            y_ppem: size.y_ppem,
        }
    }
}

/// Adjustment before conversion to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct FixedAdjustment {
    pub xoff: i32,
    pub yoff: i32,
    pub xadv: i32,
    pub yadv: i32,
    pub back: i32,
    pub advance_is_absolute: bool,
}

fn scale_value(value: i16, scale: i32) -> i32 {
    (i64::from(value) * i64::from(scale) / 0x10000) as i32
}

fn device_delta(device: Option<&DeviceTable>, ppem: u16) -> i32 {
    device.map_or(0, |d| d.delta(ppem))
}

pub(crate) fn value_adjustment(record: &ValueRecord, scale: &Scale) -> FixedAdjustment {
    let mut adj = FixedAdjustment::default();
    if let Some(v) = record.x_placement {
        adj.xoff = scale_value(v, scale.x_scale);
    }
    adj.xoff += device_delta(record.x_placement_device.as_ref(), scale.x_ppem);
    if let Some(v) = record.y_placement {
        adj.yoff = -scale_value(v, scale.y_scale);
    }
    adj.yoff -= device_delta(record.y_placement_device.as_ref(), scale.y_ppem);
    if let Some(v) = record.x_advance {
        adj.xadv += scale_value(v, scale.x_scale);
    }
    adj.xadv += device_delta(record.x_advance_device.as_ref(), scale.x_ppem);
    if let Some(v) = record.y_advance {
        adj.yadv += scale_value(v, scale.y_scale);
    }
    adj.yadv += device_delta(record.y_advance_device.as_ref(), scale.y_ppem);
    adj
}

/// Anchor position on glyph `code`. `outline` looks up outline points.
pub(crate) fn anchor_position(
    anchor: &Anchor,
    code: u32,
    scale: &Scale,
    outline: &dyn Fn(u32, u16) -> Option<(i32, i32)>,
) -> (i32, i32) {
    match anchor {
        Anchor::Design { x, y } => (scale_value(*x, scale.x_scale), scale_value(*y, scale.y_scale)),
        Anchor::ContourPoint { x, y, point } => outline(code, *point)
            .unwrap_or((scale_value(*x, scale.x_scale), scale_value(*y, scale.y_scale))),
        Anchor::Device {
            x,
            y,
            x_device,
            y_device,
        } => (
            scale_value(*x, scale.x_scale) + device_delta(x_device.as_ref(), scale.x_ppem),
            scale_value(*y, scale.y_scale) + device_delta(y_device.as_ref(), scale.y_ppem),
        ),
    }
}

fn attach(
    glyphs: &mut [WorkGlyph],
    prev: usize,
    g: usize,
    base_anchor: &Anchor,
    mark_anchor: &Anchor,
    scale: &Scale,
    outline: &dyn Fn(u32, u16) -> Option<(i32, i32)>,
) {
    let (bx, by) = anchor_position(base_anchor, glyphs[prev].code, scale, outline);
    let (mx, my) = anchor_position(mark_anchor, glyphs[g].code, scale, outline);
    glyphs[g].adjustment = Some(FixedAdjustment {
        xoff: bx - mx,
        yoff: -(by - my),
        xadv: 0,
        yadv: 0,
        back: -((g - prev) as i32),
        advance_is_absolute: true,
    });

    let span = &mut glyphs[prev..=g];
    let from = span.iter().map(|w| w.from).min().unwrap_or(0);
    let to = span.iter().map(|w| w.to).max().unwrap_or(0);
    for w in span {
        w.from = from;
        w.to = to;
    }
}

/// Turn positioning records into adjustments on the matching output glyphs.
///
/// `layout` and `glyphs` run in parallel. Mark attachments use the tracked
/// base (or mark, for mark-to-mark); a glyph's class then updates the
/// tracking.
pub(crate) fn apply_positioning(
    layout: &[LayoutGlyph],
    glyphs: &mut [WorkGlyph],
    scale: &Scale,
    outline: &dyn Fn(u32, u16) -> Option<(i32, i32)>,
) {
    let mut base: Option<usize> = None;
    let mut mark: Option<usize> = None;
    for (i, record) in layout.iter().enumerate().take(glyphs.len()) {
        if record.glyph_id == 0 {
            continue;
        }
        match &record.positioning {
            Positioning::None | Positioning::Cursive => {}
            Positioning::Single(value) | Positioning::Pair(value) => {
                glyphs[i].adjustment = Some(value_adjustment(value, scale));
            }
            Positioning::MarkToBase { base: b, mark: m }
            | Positioning::MarkToLigature { ligature: b, mark: m } => {
                if let Some(prev) = base {
                    attach(glyphs, prev, i, b, m, scale, outline);
                }
            }
            Positioning::MarkToMark { base_mark: b, mark: m } => {
                if let Some(prev) = mark {
                    attach(glyphs, prev, i, b, m, scale, outline);
                }
            }
        }
        match record.class {
            GlyphClass::Unclassified => {
                base = Some(i);
                mark = Some(i);
            }
            GlyphClass::Mark => mark = Some(i),
            _ => base = Some(i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: Scale = Scale {
        x_scale: 0x10000,
        y_scale: 0x10000,
        x_ppem: 16,
        y_ppem: 16,
    };

    fn no_outline(_: u32, _: u16) -> Option<(i32, i32)> {
        None
    }

    fn string(ids: &[(u16, GlyphClass)]) -> (Vec<LayoutGlyph>, Vec<WorkGlyph>) {
        let layout = ids
            .iter()
            .enumerate()
            .map(|(i, (id, class))| LayoutGlyph {
                class: *class,
                ..LayoutGlyph::new(i, 0x40 + i as u32, *id)
            })
            .collect();
        let glyphs = ids
            .iter()
            .enumerate()
            .map(|(i, (id, _))| WorkGlyph::new(0x40 + i as u32, u32::from(*id), i))
            .collect();
        (layout, glyphs)
    }

    #[test]
    fn test_mark_to_base_offsets() {
        let (mut layout, mut glyphs) = string(&[(10, GlyphClass::Base), (20, GlyphClass::Mark)]);
        layout[1].positioning = Positioning::MarkToBase {
            base: Anchor::Design { x: 500, y: 700 },
            mark: Anchor::Design { x: 100, y: 100 },
        };
        apply_positioning(&layout, &mut glyphs, &UNIT, &no_outline);

        let adj = glyphs[1].adjustment.expect("mark is attached");
        assert_eq!(adj.xoff, 400);
        assert_eq!(adj.yoff, -600, "y grows downward in the output");
        assert_eq!(adj.back, -1);
        assert_eq!(adj.xadv, 0);
        assert!(adj.advance_is_absolute);
        assert!(glyphs[0].adjustment.is_none(), "base is untouched");
        assert_eq!((glyphs[0].from, glyphs[0].to), (0, 1));
        assert_eq!((glyphs[1].from, glyphs[1].to), (0, 1));
    }

    #[test]
    fn test_mark_without_base_is_skipped() {
        let (mut layout, mut glyphs) = string(&[(20, GlyphClass::Mark)]);
        layout[0].positioning = Positioning::MarkToBase {
            base: Anchor::Design { x: 1, y: 1 },
            mark: Anchor::Design { x: 0, y: 0 },
        };
        apply_positioning(&layout, &mut glyphs, &UNIT, &no_outline);
        assert!(glyphs[0].adjustment.is_none());
    }

    #[test]
    fn test_mark_to_mark_uses_tracked_mark() {
        let (mut layout, mut glyphs) = string(&[
            (10, GlyphClass::Base),
            (20, GlyphClass::Mark),
            (21, GlyphClass::Mark),
        ]);
        layout[2].positioning = Positioning::MarkToMark {
            base_mark: Anchor::Design { x: 50, y: 300 },
            mark: Anchor::Design { x: 50, y: 0 },
        };
        apply_positioning(&layout, &mut glyphs, &UNIT, &no_outline);

        let adj = glyphs[2].adjustment.expect("second mark attaches");
        assert_eq!(adj.back, -1, "attaches to the previous mark, not the base");
        assert_eq!(adj.yoff, -300);
        assert_eq!((glyphs[0].from, glyphs[0].to), (0, 0), "base is outside the span");
        assert_eq!((glyphs[1].from, glyphs[1].to), (1, 2));
        assert_eq!((glyphs[2].from, glyphs[2].to), (1, 2));
    }

    #[test]
    fn test_glyph_zero_does_not_update_tracking() {
        let (mut layout, mut glyphs) = string(&[
            (10, GlyphClass::Base),
            (0, GlyphClass::Base),
            (20, GlyphClass::Mark),
        ]);
        layout[2].positioning = Positioning::MarkToBase {
            base: Anchor::Design { x: 0, y: 0 },
            mark: Anchor::Design { x: 0, y: 0 },
        };
        apply_positioning(&layout, &mut glyphs, &UNIT, &no_outline);
        assert_eq!(glyphs[2].adjustment.map(|a| a.back), Some(-2), "base is still glyph 0");
    }

    #[test]
    fn test_single_adjustment_with_devices() {
        let record = ValueRecord {
            x_placement: Some(10),
            y_placement: Some(20),
            x_advance: Some(-30),
            x_advance_device: Some(DeviceTable {
                start_size: 16,
                end_size: 16,
                deltas: vec![2],
            }),
            y_placement_device: Some(DeviceTable {
                start_size: 20,
                end_size: 24,
                deltas: vec![1; 5],
            }),
            ..ValueRecord::default()
        };
        let adj = value_adjustment(&record, &UNIT);
        assert_eq!(adj.xoff, 10);
        assert_eq!(adj.yoff, -20, "device outside its size range adds nothing");
        assert_eq!(adj.xadv, -30 + 128);
        assert!(!adj.advance_is_absolute);
    }

    #[test]
    fn test_half_scale_truncates() {
        let half = Scale {
            x_scale: 0x8000,
            y_scale: 0x8000,
            ..UNIT
        };
        let adj = value_adjustment(
            &ValueRecord {
                x_placement: Some(-3),
                ..ValueRecord::default()
            },
            &half,
        );
        assert_eq!(adj.xoff, -1, "-1.5 truncates toward zero");
    }

    #[test]
    fn test_contour_point_anchor_prefers_outline() {
        let anchor = Anchor::ContourPoint { x: 5, y: 5, point: 3 };
        let outline = |code: u32, point: u16| (code == 7 && point == 3).then_some((640, -64));
        assert_eq!(anchor_position(&anchor, 7, &UNIT, &outline), (640, -64));
        assert_eq!(anchor_position(&anchor, 8, &UNIT, &outline), (5, 5), "falls back to coordinates");
    }
}
