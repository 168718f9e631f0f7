//! Matching engine backed by a `fontdb::Database`.
//!
//! fontdb has no language or DPI data, so those pattern fields are accepted
//! and ignored. Every face fontdb loads is an outline face and is reported as
//! scalable.
//!
//! fontdb maps each generic family to one configured name whether or not that
//! family is installed. When it is not, a generic alias falls back to the
//! faces that fit the alias's kind: monospaced faces for `monospace`, `Sans`
//! families for `sans-serif`, other proportional faces for `serif`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use fontdb::{Database, Family, FaceInfo, Query, Source, ID};
use fontweave_config::Config;

use super::{Candidate, Field, LIST_FIELDS, MatchEngine, Pattern};
use crate::charset::Charset;
use crate::error::EngineError;
use crate::style::{self, spacing};

/// Capability and format facts read from a face's tables.
#[derive(Debug, Default)]
struct FaceFacts {
    capability: Option<String>,
    format: Option<&'static str>,
    /// Subfamily name, e.g. `Bold Oblique` or `Sans Book`
    style: Option<String>,
}

pub struct FontdbEngine {
    db: Database,
    charsets: RefCell<HashMap<ID, Rc<Charset>>>,
    facts: RefCell<HashMap<ID, Rc<FaceFacts>>>,
}

impl FontdbEngine {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            charsets: RefCell::new(HashMap::new()),
            facts: RefCell::new(HashMap::new()),
        }
    }

    /// Build a database from the configured font sources.
    pub fn from_config(config: &Config) -> Self {
        let mut db = Database::new();
        if config.load_system_fonts {
            db.load_system_fonts();
            log::info!("Loaded {} system fonts", db.len());
        }
        for dir in &config.font_dirs {
            let before = db.len();
            db.load_fonts_dir(dir);
            log::info!("Loaded {} fonts from {:?}", db.len() - before, dir);
        }
        for file in &config.font_files {
            if let Err(e) = db.load_font_file(file) {
                log::warn!("Failed to load font file {:?}: {}", file, e);
            }
        }
        Self::new(db)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn face_path(face: &FaceInfo) -> Option<PathBuf> {
        match &face.source {
            Source::File(path) => Some(path.clone()),
            Source::SharedFile(path, _) => Some(path.clone()),
            Source::Binary(_) => None,
        }
    }

    fn charset(&self, face: &FaceInfo) -> Rc<Charset> {
        if let Some(set) = self.charsets.borrow().get(&face.id) {
            return Rc::clone(set);
        }
        let set = self
            .db
            .with_face_data(face.id, |data, index| {
                let mut set = Charset::new();
                if let Some(font) = swash::FontRef::from_index(data, index as usize) {
                    font.charmap().enumerate(|cp, _| {
                        set.insert(cp);
                    });
                }
                set
            })
            .unwrap_or_default();
        let set = Rc::new(set);
        self.charsets.borrow_mut().insert(face.id, Rc::clone(&set));
        set
    }

    fn facts(&self, face: &FaceInfo) -> Rc<FaceFacts> {
        if let Some(facts) = self.facts.borrow().get(&face.id) {
            return Rc::clone(facts);
        }
        let facts = self
            .db
            .with_face_data(face.id, |data, index| {
                let Ok(parsed) = rustybuzz::ttf_parser::Face::parse(data, index) else {
                    return FaceFacts::default();
                };
                let tables = parsed.tables();
                let mut scripts = Vec::new();
                for table in [tables.gsub, tables.gpos].into_iter().flatten() {
                    for i in 0..table.scripts.len() {
                        if let Some(script) = table.scripts.get(i) {
                            let name = format!("otlayout:{}", crate::tag::Tag::from(script.tag));
                            if !scripts.contains(&name) {
                                scripts.push(name);
                            }
                        }
                    }
                }
                FaceFacts {
                    capability: (!scripts.is_empty()).then(|| scripts.join(" ")),
                    format: Some(if tables.cff.is_some() { "CFF" } else { "TrueType" }),
                    style: subfamily(&parsed),
                }
            })
            .unwrap_or_default();
        let facts = Rc::new(facts);
        self.facts.borrow_mut().insert(face.id, Rc::clone(&facts));
        facts
    }

    fn family_matches(face: &FaceInfo, family: &str) -> bool {
        face.families
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(family))
    }

    fn face_spacing(face: &FaceInfo) -> i32 {
        if face.monospaced {
            spacing::MONO
        } else {
            spacing::PROPORTIONAL
        }
    }

    fn satisfies_charset(&self, face: &FaceInfo, pattern: &Pattern) -> bool {
        match &pattern.charset {
            Some(wanted) => self.charset(face).is_superset(wanted),
            None => true,
        }
    }

    /// Whether any loaded face carries `family`.
    fn is_installed(&self, family: &str) -> bool {
        self.db.faces().any(|face| Self::family_matches(face, family))
    }

    /// How a listing's family name selects faces.
    fn family_filter<'a>(&'a self, name: &'a str) -> FamilyFilter<'a> {
        match query_family(name) {
            Family::Name(name) => FamilyFilter::Named(name),
            generic => {
                let preferred = self.db.family_name(&generic).to_string();
                if self.is_installed(&preferred) {
                    FamilyFilter::Preferred(preferred)
                } else {
                    FamilyFilter::Kind(generic)
                }
            }
        }
    }

    /// The face nearest to `pattern` among those covering its charset.
    ///
    /// Used when fontdb's own query finds nothing. Faces of the right generic
    /// kind win, then spacing, weight, slant and width decide in that order.
    fn closest_face(&self, pattern: &Pattern) -> Option<&FaceInfo> {
        let kind = pattern
            .family
            .as_deref()
            .map(query_family)
            .filter(|family| !matches!(family, Family::Name(_)))
            .unwrap_or(Family::SansSerif);
        let weight = style::weight_to_css(pattern.weight.unwrap_or(style::weight::REGULAR));
        let stretch = pattern
            .width
            .map(style::stretch_from_width)
            .unwrap_or_default()
            .to_number();
        let slant = pattern
            .slant
            .map(style::style_from_engine_slant)
            .unwrap_or_default();
        self.db
            .faces()
            .filter(|face| self.satisfies_charset(face, pattern))
            .min_by_key(|face| {
                (
                    !fits_generic(face, &kind),
                    pattern.spacing.is_some_and(|s| Self::face_spacing(face) != s),
                    face.weight.0.abs_diff(weight),
                    face.style != slant,
                    face.stretch.to_number().abs_diff(stretch),
                )
            })
    }

    fn matches(
        &self,
        face: &FaceInfo,
        pattern: &Pattern,
        family: Option<&FamilyFilter<'_>>,
    ) -> bool {
        if pattern.scalable == Some(false) {
            return false;
        }
        let family_ok = match family {
            None => true,
            Some(FamilyFilter::Named(name)) => Self::family_matches(face, name),
            Some(FamilyFilter::Preferred(name)) => Self::family_matches(face, name.as_str()),
            Some(FamilyFilter::Kind(generic)) => fits_generic(face, generic),
        };
        if !family_ok {
            return false;
        }
        if pattern
            .weight
            .is_some_and(|w| style::weight_from_css(face.weight.0) != w)
        {
            return false;
        }
        if pattern
            .slant
            .is_some_and(|s| style::engine_slant_from_style(face.style) != s)
        {
            return false;
        }
        if pattern
            .width
            .is_some_and(|w| style::width_from_stretch(face.stretch) != w)
        {
            return false;
        }
        if pattern.spacing.is_some_and(|s| Self::face_spacing(face) != s) {
            return false;
        }
        self.satisfies_charset(face, pattern)
    }

    fn candidate(&self, face: &FaceInfo, fields: &[Field]) -> Candidate {
        let wants = |field: Field| fields.contains(&field);
        let mut candidate = Candidate::default();
        if wants(Field::File) {
            candidate.file = Self::face_path(face);
        }
        if wants(Field::Index) {
            candidate.index = Some(face.index);
        }
        if wants(Field::Family) {
            candidate.family = face.families.first().map(|(name, _)| name.clone());
        }
        if wants(Field::Weight) {
            candidate.weight = Some(style::weight_from_css(face.weight.0));
        }
        if wants(Field::Slant) {
            candidate.slant = Some(style::engine_slant_from_style(face.style));
        }
        if wants(Field::Width) {
            candidate.width = Some(style::width_from_stretch(face.stretch));
        }
        if wants(Field::Spacing) {
            candidate.spacing = Some(Self::face_spacing(face));
        }
        if wants(Field::Scalable) {
            candidate.scalable = Some(true);
        }
        if [Field::Capability, Field::FontFormat, Field::Style]
            .into_iter()
            .any(wants)
        {
            let facts = self.facts(face);
            if wants(Field::Capability) {
                candidate.capability = facts.capability.clone();
            }
            if wants(Field::FontFormat) {
                candidate.font_format = facts.format.map(str::to_string);
            }
            if wants(Field::Style) {
                candidate.style = facts.style.clone();
            }
        }
        if wants(Field::Charset) {
            candidate.charset = Some(self.charset(face).as_ref().clone());
        }
        candidate
    }
}

enum FamilyFilter<'a> {
    Named(&'a str),
    /// The installed family fontdb maps a generic alias to
    Preferred(String),
    /// A generic alias whose mapped family is not installed
    Kind(Family<'a>),
}

/// The typographic subfamily name, else the legacy one.
fn subfamily(face: &rustybuzz::ttf_parser::Face<'_>) -> Option<String> {
    use rustybuzz::ttf_parser::name_id;

    let names = face.names();
    [name_id::TYPOGRAPHIC_SUBFAMILY, name_id::SUBFAMILY]
        .into_iter()
        .find_map(|id| {
            names
                .into_iter()
                .filter(|name| name.name_id == id && name.is_unicode())
                .find_map(|name| name.to_string())
        })
}

/// Whether `face` is the kind of face a generic family stands for.
fn fits_generic(face: &FaceInfo, generic: &Family<'_>) -> bool {
    let sans = || {
        face.families
            .iter()
            .any(|(name, _)| name.to_ascii_lowercase().contains("sans"))
    };
    match generic {
        Family::Monospace => face.monospaced,
        Family::SansSerif => !face.monospaced && sans(),
        Family::Serif => !face.monospaced && !sans(),
        _ => true,
    }
}

fn query_family(name: &str) -> Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "monospace" | "mono" => Family::Monospace,
        "sans-serif" | "sans serif" | "sans" => Family::SansSerif,
        "serif" => Family::Serif,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name),
    }
}

impl MatchEngine for FontdbEngine {
    fn list(&self, pattern: &Pattern, fields: &[Field]) -> Result<Vec<Candidate>, EngineError> {
        let family = pattern.family.as_deref().map(|name| self.family_filter(name));
        let candidates: Vec<Candidate> = self
            .db
            .faces()
            .filter(|face| self.matches(face, pattern, family.as_ref()))
            .map(|face| self.candidate(face, fields))
            .collect();
        log::trace!("fontdb list matched {} of {} faces", candidates.len(), self.db.len());
        Ok(candidates)
    }

    fn best_match(&self, pattern: &Pattern) -> Result<Option<Candidate>, EngineError> {
        let mut families = Vec::with_capacity(2);
        if let Some(name) = pattern.family.as_deref() {
            families.push(query_family(name));
        }
        // Default substitution: fall back to the sans-serif family
        families.push(Family::SansSerif);

        let query = Query {
            families: &families,
            weight: fontdb::Weight(style::weight_to_css(
                pattern.weight.unwrap_or(style::weight::REGULAR),
            )),
            stretch: pattern
                .width
                .map(style::stretch_from_width)
                .unwrap_or_default(),
            style: pattern
                .slant
                .map(style::style_from_engine_slant)
                .unwrap_or_default(),
        };

        let best = self
            .db
            .query(&query)
            .and_then(|id| self.db.face(id))
            .filter(|face| self.satisfies_charset(face, pattern));
        let face = match best {
            Some(face) => Some(face),
            None => {
                let closest = self.closest_face(pattern);
                log::debug!(
                    "fontdb query for {:?} found nothing, closest face is {:?}",
                    pattern.family,
                    closest.and_then(|face| face.families.first()).map(|(name, _)| name)
                );
                closest
            }
        };
        Ok(face.map(|face| self.candidate(face, LIST_FIELDS)))
    }

    fn families(&self) -> Result<Vec<String>, EngineError> {
        Ok(self
            .db
            .faces()
            .filter_map(|face| face.families.first().map(|(name, _)| name.clone()))
            .collect())
    }
}
