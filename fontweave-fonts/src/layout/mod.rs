//! Shaping table engine seam.
//!
//! A [`LayoutEngine`] opens a face's GSUB/GPOS/GDEF tables. The driver hands
//! [`LayoutTables`] a string of [`LayoutGlyph`]s: substitution rewrites the
//! string, positioning attaches a [`Positioning`] record to each glyph. The
//! records stay in design units; the driver does all scaling.

pub mod opentype;

use std::path::Path;

use crate::error::TableError;
use crate::otspec::FeatureSet;
use crate::tag::Tag;

/// Layout stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Substitution,
    Positioning,
}

impl Stage {
    pub fn table_name(self) -> &'static str {
        match self {
            Stage::Substitution => "GSUB",
            Stage::Positioning => "GPOS",
        }
    }
}

/// GDEF glyph class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlyphClass {
    #[default]
    Unclassified,
    Base,
    Ligature,
    Mark,
    Component,
}

/// Per-size pixel corrections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceTable {
    pub start_size: u16,
    pub end_size: u16,
    pub deltas: Vec<i16>,
}

impl DeviceTable {
    /// Correction at `ppem` in 26.6 units, 0 outside `[start_size, end_size]`.
    pub fn delta(&self, ppem: u16) -> i32 {
        if ppem < self.start_size || ppem > self.end_size {
            return 0;
        }
        self.deltas
            .get(usize::from(ppem - self.start_size))
            .map_or(0, |d| i32::from(*d) << 6)
    }
}

/// GPOS value record in design units.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueRecord {
    pub x_placement: Option<i16>,
    pub y_placement: Option<i16>,
    pub x_advance: Option<i16>,
    pub y_advance: Option<i16>,
    pub x_placement_device: Option<DeviceTable>,
    pub y_placement_device: Option<DeviceTable>,
    pub x_advance_device: Option<DeviceTable>,
    pub y_advance_device: Option<DeviceTable>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// Format 1
    Design { x: i16, y: i16 },
    /// Format 2: the coordinates are overridden by an outline point when the
    /// glyph has one
    ContourPoint { x: i16, y: i16, point: u16 },
    /// Format 3
    Device {
        x: i16,
        y: i16,
        x_device: Option<DeviceTable>,
        y_device: Option<DeviceTable>,
    },
}

/// Positioning record attached to a glyph by the GPOS pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Positioning {
    #[default]
    None,
    Single(ValueRecord),
    Pair(ValueRecord),
    Cursive,
    MarkToBase { base: Anchor, mark: Anchor },
    MarkToLigature { ligature: Anchor, mark: Anchor },
    MarkToMark { base_mark: Anchor, mark: Anchor },
}

/// A glyph in the table engine's working string.
///
/// `from` and `to` index the string the engine was given, so the driver can
/// tell which input glyphs produced each output glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutGlyph {
    pub c: u32,
    pub glyph_id: u16,
    pub class: GlyphClass,
    pub from: usize,
    pub to: usize,
    pub positioning: Positioning,
}

impl LayoutGlyph {
    pub fn new(index: usize, c: u32, glyph_id: u16) -> Self {
        Self {
            c,
            glyph_id,
            class: GlyphClass::Unclassified,
            from: index,
            to: index,
            positioning: Positioning::None,
        }
    }
}

/// Features a language system lists. `langsys` is `None` for the script's
/// default language system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangSysFeatures {
    pub langsys: Option<Tag>,
    pub features: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFeatures {
    pub script: Tag,
    pub langsyses: Vec<LangSysFeatures>,
}

/// Opened layout tables of one face.
pub trait LayoutTables {
    fn has_table(&self, stage: Stage) -> bool;

    /// Scripts in table order, each with its default language system first.
    fn scripts(&self, stage: Stage) -> Vec<ScriptFeatures>;

    /// Whether the script/langsys offers every required tag and none of the
    /// excluded ones. An empty set is always satisfiable.
    fn check_features(
        &self,
        stage: Stage,
        script: Tag,
        langsys: Option<Tag>,
        features: &FeatureSet,
    ) -> bool {
        if features.is_empty() {
            return true;
        }
        if !self.has_table(stage) {
            return false;
        }
        let scripts = self.scripts(stage);
        let Some(script) = scripts.iter().find(|s| s.script == script) else {
            return false;
        };
        let lang = langsys
            .and_then(|tag| script.langsyses.iter().find(|l| l.langsys == Some(tag)))
            .or_else(|| script.langsyses.iter().find(|l| l.langsys.is_none()));
        let Some(lang) = lang else {
            return false;
        };
        features.required().iter().all(|tag| lang.features.contains(tag))
            && !features.excluded().iter().any(|tag| lang.features.contains(tag))
    }

    /// Fill in GDEF classes.
    fn glyph_classes(&self, glyphs: &mut [LayoutGlyph]);

    fn substitute(
        &self,
        glyphs: &mut Vec<LayoutGlyph>,
        script: Tag,
        langsys: Option<Tag>,
        features: &FeatureSet,
    ) -> Result<(), TableError>;

    /// `ppem` is the current (x, y) pixel size; engines whose device tables
    /// cannot be read whole may resolve them at that size.
    fn position(
        &self,
        glyphs: &mut [LayoutGlyph],
        script: Tag,
        langsys: Option<Tag>,
        features: &FeatureSet,
        ppem: (u16, u16),
    ) -> Result<(), TableError>;
}

/// Opens layout tables for a face.
pub trait LayoutEngine {
    /// `None` when the face cannot be read or has no layout tables.
    fn open_tables(&self, path: &Path, index: u32) -> Option<Box<dyn LayoutTables>>;
}
