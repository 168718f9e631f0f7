//! Matching engine seam.
//!
//! A [`MatchEngine`] speaks fontconfig's model: a query [`Pattern`] goes in,
//! ranked [`Candidate`] patterns come out with the projected [`Field`]s filled.
//! Slants here are engine slants (roman 0, italic 100, oblique 110).

pub mod fontdb;

use std::path::PathBuf;

use crate::charset::Charset;
use crate::error::EngineError;

/// A candidate field a listing may project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Foundry,
    Family,
    Weight,
    Slant,
    Width,
    PixelSize,
    Spacing,
    Scalable,
    Style,
    File,
    Index,
    Capability,
    FontFormat,
    Charset,
}

/// Fields every listing asks for.
pub const LIST_FIELDS: &[Field] = &[
    Field::Foundry,
    Field::Family,
    Field::Weight,
    Field::Slant,
    Field::Width,
    Field::PixelSize,
    Field::Spacing,
    Field::Scalable,
    Field::Style,
    Field::File,
    Field::Index,
    Field::Capability,
    Field::FontFormat,
];

/// A query sent to the matching engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pattern {
    pub family: Option<String>,
    pub foundry: Option<String>,
    pub weight: Option<i32>,
    pub slant: Option<i32>,
    pub width: Option<i32>,
    pub pixel_size: Option<f64>,
    pub dpi: Option<f64>,
    pub spacing: Option<i32>,
    pub charset: Option<Charset>,
    pub languages: Vec<String>,
    pub scalable: Option<bool>,
}

/// One face reported by the engine. Fields are `None` when unknown or not
/// projected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub file: Option<PathBuf>,
    pub index: Option<u32>,
    pub foundry: Option<String>,
    pub family: Option<String>,
    pub weight: Option<i32>,
    pub slant: Option<i32>,
    pub width: Option<i32>,
    pub pixel_size: Option<f64>,
    pub spacing: Option<i32>,
    pub dpi: Option<f64>,
    pub scalable: Option<bool>,
    pub style: Option<String>,
    pub capability: Option<String>,
    pub font_format: Option<String>,
    pub charset: Option<Charset>,
}

/// A fontconfig-style matching engine.
pub trait MatchEngine {
    /// All faces satisfying `pattern`, best first, with `fields` populated.
    fn list(&self, pattern: &Pattern, fields: &[Field]) -> Result<Vec<Candidate>, EngineError>;

    /// The single best face for `pattern` after the engine's own
    /// substitutions, or `None` when nothing is suitable.
    fn best_match(&self, pattern: &Pattern) -> Result<Option<Candidate>, EngineError>;

    /// Family names of every known face, possibly with repeats.
    fn families(&self) -> Result<Vec<String>, EngineError>;
}
