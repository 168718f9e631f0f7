//! Layout engine over ttf-parser's parsed OpenType tables.
//!
//! Supported lookups: GSUB single, multiple, and ligature; GPOS single, pair,
//! mark-to-base, mark-to-ligature, and mark-to-mark. Contextual, chained,
//! alternate, reverse, and cursive lookups are skipped.

use std::fs;
use std::path::Path;

use rustybuzz::ttf_parser::gpos::{
    self, AnchorMatrix, PairAdjustment, PositioningSubtable, SingleAdjustment,
};
use rustybuzz::ttf_parser::gsub::{
    LigatureSubstitution, MultipleSubstitution, SingleSubstitution, SubstitutionSubtable,
};
use rustybuzz::ttf_parser::opentype_layout::LayoutTable;
use rustybuzz::ttf_parser::{self, GlyphId};

use super::{
    Anchor, DeviceTable, GlyphClass, LangSysFeatures, LayoutEngine, LayoutGlyph, LayoutTables,
    Positioning, ScriptFeatures, Stage, ValueRecord,
};
use crate::error::TableError;
use crate::otspec::FeatureSet;
use crate::tag::Tag;

// Highest ligature component probed for mark-to-ligature anchors
const MAX_LIGATURE_COMPONENTS: u16 = 64;

/// Opens GSUB/GPOS/GDEF from font files.
#[derive(Debug, Default, Clone, Copy)]
pub struct OtLayoutEngine;

impl OtLayoutEngine {
    pub fn new() -> Self {
        Self
    }
}

impl LayoutEngine for OtLayoutEngine {
    fn open_tables(&self, path: &Path, index: u32) -> Option<Box<dyn LayoutTables>> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Cannot read {:?} for layout tables: {}", path, e);
                return None;
            }
        };
        let tables = OtTables::from_data(data, index)?;
        Some(Box::new(tables))
    }
}

/// Layout tables of one face. The face is re-parsed per call; ttf-parser
/// parsing is lazy and only touches the table directory.
pub struct OtTables {
    data: Vec<u8>,
    index: u32,
}

impl OtTables {
    /// `None` when the data is not a face or carries none of GSUB, GPOS, GDEF.
    pub fn from_data(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = ttf_parser::Face::parse(&data, index).ok()?;
        let tables = face.tables();
        if tables.gsub.is_none() && tables.gpos.is_none() && tables.gdef.is_none() {
            return None;
        }
        Some(Self { data, index })
    }

    fn face(&self) -> Result<ttf_parser::Face<'_>, TableError> {
        ttf_parser::Face::parse(&self.data, self.index).map_err(|_| TableError::Unparsable)
    }
}

fn table_for<'a>(face: &ttf_parser::Face<'a>, stage: Stage) -> Option<LayoutTable<'a>> {
    match stage {
        Stage::Substitution => face.tables().gsub,
        Stage::Positioning => face.tables().gpos,
    }
}

/// Lookup indices selected by `features`, in lookup-index order.
fn selected_lookups(
    table: &LayoutTable<'_>,
    script: Tag,
    langsys: Option<Tag>,
    features: &FeatureSet,
) -> Vec<u16> {
    let script = table
        .scripts
        .find(script.into())
        .or_else(|| table.scripts.find(Tag::DFLT.into()));
    let Some(script) = script else {
        return Vec::new();
    };
    let lang = langsys
        .and_then(|tag| script.languages.find(tag.into()))
        .or(script.default_language);
    let Some(lang) = lang else {
        return Vec::new();
    };

    let mut lookups = Vec::new();
    let mut take = |feature_index: u16, forced: bool| {
        if let Some(feature) = table.features.get(feature_index) {
            if forced || features.selects(Tag::from(feature.tag)) {
                lookups.extend(feature.lookup_indices);
            }
        }
    };
    if let Some(required) = lang.required_feature {
        take(required, true);
    }
    for feature_index in lang.feature_indices {
        take(feature_index, false);
    }
    lookups.sort_unstable();
    lookups.dedup();
    lookups
}

fn device(
    device: Option<&gpos::Device<'_>>,
    ppem: (u16, u16),
    vertical: bool,
) -> Option<DeviceTable> {
    let gpos::Device::Hinting(hinting) = device? else {
        return None;
    };
    // Passing ppem as units-per-em makes ttf-parser return the raw delta
    let (size, raw) = if vertical {
        (ppem.1, hinting.y_delta(ppem.1, Some(ppem)))
    } else {
        (ppem.0, hinting.x_delta(ppem.0, Some(ppem)))
    };
    raw.map(|delta| DeviceTable {
        start_size: size,
        end_size: size,
        deltas: vec![delta as i16],
    })
}

fn value_record(record: &gpos::ValueRecord<'_>, ppem: (u16, u16)) -> ValueRecord {
    let nonzero = |v: i16| (v != 0).then_some(v);
    ValueRecord {
        x_placement: nonzero(record.x_placement),
        y_placement: nonzero(record.y_placement),
        x_advance: nonzero(record.x_advance),
        y_advance: nonzero(record.y_advance),
        x_placement_device: device(record.x_placement_device.as_ref(), ppem, false),
        y_placement_device: device(record.y_placement_device.as_ref(), ppem, true),
        x_advance_device: device(record.x_advance_device.as_ref(), ppem, false),
        y_advance_device: device(record.y_advance_device.as_ref(), ppem, true),
    }
}

fn anchor(anchor: &gpos::Anchor<'_>, ppem: (u16, u16)) -> Anchor {
    let x_device = device(anchor.x_device.as_ref(), ppem, false);
    let y_device = device(anchor.y_device.as_ref(), ppem, true);
    if x_device.is_none() && y_device.is_none() {
        Anchor::Design {
            x: anchor.x,
            y: anchor.y,
        }
    } else {
        Anchor::Device {
            x: anchor.x,
            y: anchor.y,
            x_device,
            y_device,
        }
    }
}

fn substitute_at(
    subtable: &SubstitutionSubtable<'_>,
    glyphs: &mut Vec<LayoutGlyph>,
    i: usize,
) -> Option<usize> {
    let id = GlyphId(glyphs[i].glyph_id);
    match subtable {
        SubstitutionSubtable::Single(single) => {
            let new_id = match single {
                SingleSubstitution::Format1 { coverage, delta } => {
                    coverage.get(id)?;
                    (i32::from(id.0) + i32::from(*delta)) as u16
                }
                SingleSubstitution::Format2 {
                    coverage,
                    substitutes,
                } => substitutes.get(coverage.get(id)?)?.0,
            };
            glyphs[i].glyph_id = new_id;
            Some(1)
        }
        SubstitutionSubtable::Multiple(multiple) => substitute_multiple(multiple, glyphs, i, id),
        SubstitutionSubtable::Ligature(ligature) => substitute_ligature(ligature, glyphs, i, id),
        _ => None,
    }
}

fn substitute_multiple(
    table: &MultipleSubstitution<'_>,
    glyphs: &mut Vec<LayoutGlyph>,
    i: usize,
    id: GlyphId,
) -> Option<usize> {
    let sequence = table.sequences.get(table.coverage.get(id)?)?;
    let source = glyphs[i].clone();
    let replacement: Vec<LayoutGlyph> = sequence
        .substitutes
        .into_iter()
        .map(|glyph| LayoutGlyph {
            glyph_id: glyph.0,
            ..source.clone()
        })
        .collect();
    let produced = replacement.len();
    glyphs.splice(i..=i, replacement);
    Some(produced)
}

fn substitute_ligature(
    table: &LigatureSubstitution<'_>,
    glyphs: &mut Vec<LayoutGlyph>,
    i: usize,
    id: GlyphId,
) -> Option<usize> {
    let set = table.ligature_sets.get(table.coverage.get(id)?)?;
    for ligature in set {
        let count = usize::from(ligature.components.len());
        if i + count >= glyphs.len() {
            continue;
        }
        let matches = ligature
            .components
            .into_iter()
            .enumerate()
            .all(|(k, component)| glyphs[i + 1 + k].glyph_id == component.0);
        if !matches {
            continue;
        }
        let merged = LayoutGlyph {
            c: glyphs[i].c,
            glyph_id: ligature.glyph.0,
            class: GlyphClass::Ligature,
            from: glyphs[i].from,
            to: glyphs[i + count].to,
            positioning: Positioning::None,
        };
        glyphs.splice(i..=i + count, [merged]);
        return Some(1);
    }
    None
}

/// The nearest preceding glyph that is not a mark.
fn preceding_base(glyphs: &[LayoutGlyph], i: usize) -> Option<usize> {
    (0..i).rev().find(|j| glyphs[*j].class != GlyphClass::Mark)
}

fn position_at(
    subtable: &PositioningSubtable<'_>,
    glyphs: &mut [LayoutGlyph],
    i: usize,
    ppem: (u16, u16),
) -> bool {
    let id = GlyphId(glyphs[i].glyph_id);
    let found = match subtable {
        PositioningSubtable::Single(single) => match single {
            SingleAdjustment::Format1 { coverage, value } => {
                coverage.get(id).map(|_| value_record(value, ppem))
            }
            SingleAdjustment::Format2 { coverage, values } => coverage
                .get(id)
                .and_then(|index| values.get(index))
                .map(|record| value_record(&record, ppem)),
        }
        .map(Positioning::Single),
        PositioningSubtable::Pair(pair) => return position_pair(pair, glyphs, i, ppem),
        PositioningSubtable::MarkToBase(table) => mark_to_base(table, glyphs, i, ppem),
        PositioningSubtable::MarkToLigature(table) => mark_to_ligature(table, glyphs, i, ppem),
        PositioningSubtable::MarkToMark(table) => mark_to_mark(table, glyphs, i, ppem),
        _ => None,
    };
    match found {
        Some(positioning) => {
            glyphs[i].positioning = positioning;
            true
        }
        None => false,
    }
}

fn position_pair(
    pair: &PairAdjustment<'_>,
    glyphs: &mut [LayoutGlyph],
    i: usize,
    ppem: (u16, u16),
) -> bool {
    let Some(next) = glyphs.get(i + 1) else {
        return false;
    };
    let (first, second) = (GlyphId(glyphs[i].glyph_id), GlyphId(next.glyph_id));
    let records = match pair {
        PairAdjustment::Format1 { coverage, sets } => coverage
            .get(first)
            .and_then(|index| sets.get(index))
            .and_then(|set| set.get(second)),
        PairAdjustment::Format2 {
            coverage,
            classes,
            matrix,
        } => coverage
            .get(first)
            .and_then(|_| matrix.get((classes.0.get(first), classes.1.get(second)))),
    };
    let Some((first_record, second_record)) = records else {
        return false;
    };
    glyphs[i].positioning = Positioning::Pair(value_record(&first_record, ppem));
    let second_value = value_record(&second_record, ppem);
    if second_value != ValueRecord::default() {
        glyphs[i + 1].positioning = Positioning::Pair(second_value);
    }
    true
}

fn mark_to_base(
    table: &gpos::MarkToBaseAdjustment<'_>,
    glyphs: &[LayoutGlyph],
    i: usize,
    ppem: (u16, u16),
) -> Option<Positioning> {
    let mark_index = table.mark_coverage.get(GlyphId(glyphs[i].glyph_id))?;
    let base = preceding_base(glyphs, i)?;
    let base_index = table.base_coverage.get(GlyphId(glyphs[base].glyph_id))?;
    let (class, mark_anchor) = table.marks.get(mark_index)?;
    let base_anchor = table.anchors.get(base_index, class)?;
    Some(Positioning::MarkToBase {
        base: anchor(&base_anchor, ppem),
        mark: anchor(&mark_anchor, ppem),
    })
}

fn mark_to_ligature(
    table: &gpos::MarkToLigatureAdjustment<'_>,
    glyphs: &[LayoutGlyph],
    i: usize,
    ppem: (u16, u16),
) -> Option<Positioning> {
    let mark_index = table.mark_coverage.get(GlyphId(glyphs[i].glyph_id))?;
    let base = preceding_base(glyphs, i)?;
    let lig_index = table
        .ligature_coverage
        .get(GlyphId(glyphs[base].glyph_id))?;
    let matrix = table.ligature_array.get(lig_index)?;
    let (class, mark_anchor) = table.marks.get(mark_index)?;
    let lig_anchor = last_component_anchor(&matrix, class)?;
    Some(Positioning::MarkToLigature {
        ligature: anchor(&lig_anchor, ppem),
        mark: anchor(&mark_anchor, ppem),
    })
}

fn mark_to_mark(
    table: &gpos::MarkToMarkAdjustment<'_>,
    glyphs: &[LayoutGlyph],
    i: usize,
    ppem: (u16, u16),
) -> Option<Positioning> {
    let mark_index = table.mark1_coverage.get(GlyphId(glyphs[i].glyph_id))?;
    let prev = i.checked_sub(1)?;
    if glyphs[prev].class != GlyphClass::Mark {
        return None;
    }
    let base_index = table.mark2_coverage.get(GlyphId(glyphs[prev].glyph_id))?;
    let (class, mark_anchor) = table.marks.get(mark_index)?;
    let base_anchor = table.mark2_matrix.get(base_index, class)?;
    Some(Positioning::MarkToMark {
        base_mark: anchor(&base_anchor, ppem),
        mark: anchor(&mark_anchor, ppem),
    })
}

fn last_component_anchor<'a>(
    matrix: &'a AnchorMatrix<'_>,
    class: u16,
) -> Option<gpos::Anchor<'a>> {
    (0..MAX_LIGATURE_COMPONENTS)
        .filter_map(|row| matrix.get(row, class))
        .last()
}

impl LayoutTables for OtTables {
    fn has_table(&self, stage: Stage) -> bool {
        self.face()
            .map(|face| table_for(&face, stage).is_some())
            .unwrap_or(false)
    }

    fn scripts(&self, stage: Stage) -> Vec<ScriptFeatures> {
        let Ok(face) = self.face() else {
            return Vec::new();
        };
        let Some(table) = table_for(&face, stage) else {
            return Vec::new();
        };
        let feature_tags = |lang: &ttf_parser::opentype_layout::LanguageSystem<'_>| {
            lang.feature_indices
                .into_iter()
                .filter_map(|index| table.features.get(index))
                .map(|feature| Tag::from(feature.tag))
                .collect::<Vec<_>>()
        };
        (0..table.scripts.len())
            .filter_map(|i| table.scripts.get(i))
            .map(|script| {
                let mut langsyses = Vec::new();
                if let Some(default) = script.default_language {
                    langsyses.push(LangSysFeatures {
                        langsys: None,
                        features: feature_tags(&default),
                    });
                }
                for lang in (0..script.languages.len()).filter_map(|j| script.languages.get(j)) {
                    langsyses.push(LangSysFeatures {
                        langsys: Some(Tag::from(lang.tag)),
                        features: feature_tags(&lang),
                    });
                }
                ScriptFeatures {
                    script: Tag::from(script.tag),
                    langsyses,
                }
            })
            .collect()
    }

    fn glyph_classes(&self, glyphs: &mut [LayoutGlyph]) {
        let Ok(face) = self.face() else {
            return;
        };
        let Some(gdef) = face.tables().gdef else {
            return;
        };
        for glyph in glyphs {
            glyph.class = match gdef.glyph_class(GlyphId(glyph.glyph_id)) {
                Some(ttf_parser::gdef::GlyphClass::Base) => GlyphClass::Base,
                Some(ttf_parser::gdef::GlyphClass::Ligature) => GlyphClass::Ligature,
                Some(ttf_parser::gdef::GlyphClass::Mark) => GlyphClass::Mark,
                Some(ttf_parser::gdef::GlyphClass::Component) => GlyphClass::Component,
                None => GlyphClass::Unclassified,
            };
        }
    }

    fn substitute(
        &self,
        glyphs: &mut Vec<LayoutGlyph>,
        script: Tag,
        langsys: Option<Tag>,
        features: &FeatureSet,
    ) -> Result<(), TableError> {
        let face = self.face()?;
        let table = table_for(&face, Stage::Substitution).ok_or(TableError::Missing("GSUB"))?;
        for lookup_index in selected_lookups(&table, script, langsys, features) {
            let lookup = table.lookups.get(lookup_index).ok_or(TableError::Malformed {
                table: "GSUB",
                index: lookup_index,
            })?;
            let mut i = 0;
            while i < glyphs.len() {
                let mut step = 1;
                for s in 0..lookup.subtables.len() {
                    let Some(subtable) = lookup.subtables.get::<SubstitutionSubtable>(s) else {
                        continue;
                    };
                    if let Some(produced) = substitute_at(&subtable, glyphs, i) {
                        step = produced;
                        break;
                    }
                }
                i += step;
            }
        }
        Ok(())
    }

    fn position(
        &self,
        glyphs: &mut [LayoutGlyph],
        script: Tag,
        langsys: Option<Tag>,
        features: &FeatureSet,
        ppem: (u16, u16),
    ) -> Result<(), TableError> {
        let face = self.face()?;
        let table = table_for(&face, Stage::Positioning).ok_or(TableError::Missing("GPOS"))?;
        for lookup_index in selected_lookups(&table, script, langsys, features) {
            let lookup = table.lookups.get(lookup_index).ok_or(TableError::Malformed {
                table: "GPOS",
                index: lookup_index,
            })?;
            for i in 0..glyphs.len() {
                for s in 0..lookup.subtables.len() {
                    let Some(subtable) = lookup.subtables.get::<PositioningSubtable>(s) else {
                        continue;
                    };
                    if position_at(&subtable, glyphs, i, ppem) {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_font_data_opens_nothing() {
        assert!(OtTables::from_data(vec![0; 128], 0).is_none());
    }

    #[test]
    fn test_marks_attach_past_earlier_marks() {
        let classed = |i: usize, class: GlyphClass| LayoutGlyph {
            class,
            ..LayoutGlyph::new(i, 0x61, i as u16)
        };
        let glyphs = [
            classed(0, GlyphClass::Base),
            classed(1, GlyphClass::Ligature),
            classed(2, GlyphClass::Mark),
            classed(3, GlyphClass::Mark),
        ];
        assert_eq!(preceding_base(&glyphs, 3), Some(1), "stacked marks skip to the ligature");
        assert_eq!(preceding_base(&glyphs, 1), Some(0));
        assert_eq!(preceding_base(&glyphs, 0), None);
    }

    #[test]
    fn test_unreadable_path_opens_nothing() {
        let engine = OtLayoutEngine::new();
        assert!(engine
            .open_tables(Path::new("/nonexistent/fontweave/face.otf"), 0)
            .is_none());
    }
}
