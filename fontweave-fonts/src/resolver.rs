//! Candidate resolution.
//!
//! A [`FontSpec`] becomes an engine [`Pattern`]; the engine's ranked
//! candidates then pass the spacing, capability, feature table, coverage, and
//! ad-style filters and come back as canonical [`FontEntity`] records from
//! the [`FaceCache`].

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::rc::Rc;

use fontweave_config::{Config, RepresentativeChars};

use crate::cache::{FaceCache, FaceKey};
use crate::charset_table::{is_unicode_registry, lookup_registry};
use crate::engine::{Candidate, Field, LIST_FIELDS, MatchEngine, Pattern};
use crate::entity::{FontEntity, adstyle_from_style};
use crate::error::{EngineError, ResolveError};
use crate::layout::Stage;
use crate::otspec::OpenTypeSpec;
use crate::script::ScriptChars;
use crate::spec::FontSpec;
use crate::style::slant;

/// Generic families resolved through the engine.
const GENERIC_FAMILIES: [&str; 3] = ["monospace", "sans-serif", "sans"];

/// Blocks standing in for the JIS X 0208 repertoire.
const JISX0208_BLOCKS: &[RangeInclusive<u32>] = &[
    0x00A7..=0x00A8,
    0x0391..=0x03C9,
    0x0401..=0x0451,
    0x2010..=0x203B,
    0x2100..=0x22FF,
    0x2500..=0x254B,
    0x25A0..=0x25EF,
    0x2605..=0x266F,
    0x3000..=0x30FF,
    0x4E00..=0x9FA0,
    0xFF01..=0xFFE5,
];

/// Blocks standing in for the KS C 5601 repertoire.
const KSC5601_BLOCKS: &[RangeInclusive<u32>] = &[
    0x00A1..=0x00FE,
    0x0391..=0x03C9,
    0x0401..=0x0451,
    0x2015..=0x2312,
    0x2460..=0x266D,
    0x3000..=0x30F6,
    0x3131..=0x318E,
    0x3200..=0x33DD,
    0x4E00..=0x9F9C,
    0xAC00..=0xD7A3,
    0xF900..=0xFA0B,
    0xFF01..=0xFFE6,
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum GenericSlot {
    Pending,
    Resolved(Option<String>),
}

/// Engine query derived from a spec plus the filters it implies.
struct Query {
    pattern: Pattern,
    /// Candidates must cover at least one of these
    any_chars: Option<Vec<u32>>,
}

/// Lower-case `family` and fold the generic aliases onto their memo key.
fn normalize_family(family: &str) -> String {
    let lower = family.to_lowercase();
    match lower.as_str() {
        "mono" => "monospace".to_string(),
        "sans" | "sans serif" => "sans-serif".to_string(),
        _ => lower,
    }
}

fn in_blocks(blocks: &[RangeInclusive<u32>], c: u32) -> bool {
    blocks.iter().any(|block| block.contains(&c))
}

/// Resolves font specs against a matching engine.
pub struct Resolver {
    engine: Box<dyn MatchEngine>,
    cache: Rc<FaceCache>,
    scripts: ScriptChars,
    default_dpi: Option<u32>,
    generics: RefCell<HashMap<&'static str, GenericSlot>>,
}

impl Resolver {
    pub fn new(engine: Box<dyn MatchEngine>, cache: Rc<FaceCache>, scripts: ScriptChars) -> Self {
        let generics = GENERIC_FAMILIES
            .iter()
            .map(|name| (*name, GenericSlot::Pending))
            .collect();
        Self {
            engine,
            cache,
            scripts,
            default_dpi: None,
            generics: RefCell::new(generics),
        }
    }

    /// A resolver using the configured representative characters and DPI.
    pub fn from_config(
        engine: Box<dyn MatchEngine>,
        cache: Rc<FaceCache>,
        config: &Config,
    ) -> Self {
        let mut resolver = Self::new(engine, cache, ScriptChars::new(&config.representative_chars));
        resolver.default_dpi = config.dpi;
        resolver
    }

    pub fn cache(&self) -> &Rc<FaceCache> {
        &self.cache
    }

    /// Every face satisfying `spec`, in engine preference order. Failures
    /// read as no match; see [`Resolver::list_candidates_detailed`].
    pub fn list_candidates(&self, spec: &FontSpec) -> Vec<FontEntity> {
        match self.list_candidates_detailed(spec) {
            Ok(entities) => entities,
            Err(ResolveError::SpecRejected(reason)) => {
                log::debug!("list {:?}: rejected ({})", spec, reason);
                Vec::new()
            }
            Err(e) => {
                log::warn!("list {:?} failed: {}", spec, e);
                Vec::new()
            }
        }
    }

    pub fn list_candidates_detailed(
        &self,
        spec: &FontSpec,
    ) -> Result<Vec<FontEntity>, ResolveError> {
        let mut query = self.build_query(spec)?;
        if let Some(family) = spec.family() {
            if let Some(resolved) = self.resolve_generic(family, &query.pattern)? {
                query.pattern.family = Some(resolved);
            }
        }

        let mut fields = LIST_FIELDS.to_vec();
        if query.any_chars.is_some() {
            fields.push(Field::Charset);
        }
        let candidates = self.engine.list(&query.pattern, &fields)?;

        let entities: Vec<FontEntity> = candidates
            .iter()
            .filter(|candidate| self.accepts(candidate, spec, &query))
            .filter_map(|candidate| self.entity(candidate))
            .collect();
        log::debug!(
            "list {:?}: {} of {} candidates",
            spec,
            entities.len(),
            candidates.len()
        );
        Ok(entities)
    }

    /// The engine's single best face for `spec`.
    ///
    /// A concrete family in `spec` must match the result's family; generic
    /// aliases accept whatever the engine picked.
    pub fn match_best(&self, spec: &FontSpec) -> Option<FontEntity> {
        let result = self.match_best_detailed(spec);
        match &result {
            Ok(entity) => log::debug!(
                "match {:?}: {}",
                spec,
                entity.as_ref().map_or_else(|| "none".to_string(), |e| e.key.to_string())
            ),
            Err(ResolveError::SpecRejected(reason)) => {
                log::debug!("match {:?}: rejected ({})", spec, reason)
            }
            Err(e) => log::warn!("match {:?} failed: {}", spec, e),
        }
        result.ok().flatten()
    }

    fn match_best_detailed(&self, spec: &FontSpec) -> Result<Option<FontEntity>, ResolveError> {
        let mut query = self.build_query(spec)?;
        if spec.pixel_size() > 0 {
            query.pattern.pixel_size = Some(f64::from(spec.pixel_size()));
        }
        let Some(candidate) = self.engine.best_match(&query.pattern)? else {
            return Ok(None);
        };
        let Some(entity) = self.entity(&candidate) else {
            return Ok(None);
        };
        if let Some(family) = spec.family() {
            let same_family = entity
                .family
                .as_deref()
                .is_some_and(|f| f.eq_ignore_ascii_case(family));
            if !same_family && !self.is_generic(family) {
                return Ok(None);
            }
        }
        Ok(Some(entity))
    }

    /// Family names known to the engine, each once, in engine order.
    pub fn list_families(&self) -> Vec<String> {
        let families = match self.engine.families() {
            Ok(families) => families,
            Err(e) => {
                log::warn!("Family listing failed: {}", e);
                return Vec::new();
            }
        };
        let mut seen = HashSet::new();
        families
            .into_iter()
            .filter(|family| seen.insert(family.clone()))
            .collect()
    }

    /// The concrete family a generic alias stands for, queried once per
    /// alias. `None` for non-generic names and unresolvable aliases.
    pub fn resolve_generic_family(&self, family: &str) -> Option<String> {
        self.resolve_generic(family, &Pattern::default())
            .unwrap_or_else(|e| {
                log::warn!("Resolving generic family {:?} failed: {}", family, e);
                None
            })
    }

    /// Whether `entity`'s face covers `c`, without opening it.
    pub fn entity_has_char(&self, entity: &FontEntity, c: u32) -> bool {
        match entity.adstyle.as_deref() {
            Some("ja") => in_blocks(JISX0208_BLOCKS, c),
            Some("ko") => in_blocks(KSC5601_BLOCKS, c),
            _ => self.cache.charset_of(entity.path(), entity.index()).contains(c),
        }
    }

    fn is_generic(&self, family: &str) -> bool {
        self.generics
            .borrow()
            .contains_key(normalize_family(family).as_str())
    }

    fn resolve_generic(
        &self,
        family: &str,
        pattern: &Pattern,
    ) -> Result<Option<String>, EngineError> {
        let normalized = normalize_family(family);
        let key = {
            let generics = self.generics.borrow();
            match generics.get_key_value(normalized.as_str()) {
                None => return Ok(None),
                Some((_, GenericSlot::Resolved(resolved))) => return Ok(resolved.clone()),
                Some((key, GenericSlot::Pending)) => *key,
            }
        };

        let mut query = pattern.clone();
        query.foundry = None;
        query.family = Some(key.to_string());
        if query.languages.is_empty() {
            query.languages.push("en".to_string());
        }
        let resolved = self.engine.best_match(&query)?.and_then(|c| c.family);
        log::debug!("Generic family {} resolved to {:?}", key, resolved);
        self.generics
            .borrow_mut()
            .insert(key, GenericSlot::Resolved(resolved.clone()));
        Ok(resolved)
    }

    fn build_query(&self, spec: &FontSpec) -> Result<Query, ResolveError> {
        if let Some(s) = spec.slant() {
            if (0..slant::ROMAN).contains(&s) {
                return Err(ResolveError::SpecRejected(format!("reverse slant {}", s)));
            }
        }

        let mut pattern = Pattern {
            family: spec.family().map(str::to_string),
            foundry: spec.foundry().map(str::to_string),
            weight: spec.weight(),
            slant: spec.slant().map(|s| s - slant::ENGINE_OFFSET),
            width: spec.width(),
            pixel_size: None,
            dpi: spec.dpi().or(self.default_dpi).map(f64::from),
            spacing: spec.spacing(),
            charset: None,
            languages: Vec::new(),
            scalable: spec
                .scalable()
                .or_else(|| (spec.average_width() == Some(0)).then_some(true)),
        };

        if let Some(registry) = spec.registry().filter(|r| !is_unicode_registry(r)) {
            let entry = lookup_registry(registry).ok_or_else(|| {
                ResolveError::SpecRejected(format!("unknown registry {}", registry))
            })?;
            pattern.charset = Some(entry.charset().clone());
            if let Some(lang) = entry.lang {
                pattern.languages.push(lang.to_string());
            }
        }
        for lang in spec.languages() {
            if !pattern.languages.contains(lang) {
                pattern.languages.push(lang.clone());
            }
        }

        let script = spec
            .script()
            .or_else(|| spec.otf().and_then(OpenTypeSpec::script_name));
        let mut any_chars = None;
        if let Some(script) = script.filter(|_| pattern.charset.is_none()) {
            match self.scripts.get(script) {
                Some(RepresentativeChars::All(chars)) => {
                    pattern.charset = Some(chars.iter().copied().collect());
                }
                Some(RepresentativeChars::Any(chars)) if spec.script().is_some() => {
                    any_chars = Some(chars.clone());
                }
                _ => {}
            }
        }

        Ok(Query { pattern, any_chars })
    }

    fn accepts(&self, candidate: &Candidate, spec: &FontSpec, query: &Query) -> bool {
        if let (Some(wanted), Some(actual)) = (spec.spacing(), candidate.spacing) {
            if wanted != actual {
                return false;
            }
        }

        if let Some(otf) = spec.otf() {
            let capability = otf.capability();
            if !candidate
                .capability
                .as_deref()
                .is_some_and(|c| c.contains(&capability))
            {
                return false;
            }
            if !self.has_features(candidate, otf) {
                return false;
            }
        }

        if let Some(chars) = &query.any_chars {
            if !candidate
                .charset
                .as_ref()
                .is_some_and(|charset| charset.contains_any(chars))
            {
                return false;
            }
        }

        if let Some(wanted) = spec.adstyle().filter(|a| !a.is_empty()) {
            let actual = candidate.style.as_deref().and_then(adstyle_from_style);
            if !actual.is_some_and(|a| a.eq_ignore_ascii_case(wanted)) {
                return false;
            }
        }
        true
    }

    fn has_features(&self, candidate: &Candidate, otf: &OpenTypeSpec) -> bool {
        let Some(file) = &candidate.file else {
            return false;
        };
        let Some(tables) = self
            .cache
            .layout_engine()
            .open_tables(file, candidate.index.unwrap_or(0))
        else {
            return false;
        };
        tables.check_features(Stage::Substitution, otf.script_tag(), otf.langsys(), otf.gsub())
            && tables.check_features(
                Stage::Positioning,
                otf.script_tag(),
                otf.langsys(),
                otf.gpos(),
            )
    }

    fn entity(&self, candidate: &Candidate) -> Option<FontEntity> {
        let key = FaceKey::new(candidate.file.clone()?, candidate.index?);
        self.cache.entity_for(&key, || {
            FontEntity::from_candidate(candidate, |path, index| {
                self.cache.provider().average_width_property(path, index)
            })
        })
    }
}
