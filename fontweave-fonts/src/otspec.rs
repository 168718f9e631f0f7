//! OpenType feature requests.
//!
//! The text form is `SCRIPT[:LANGSYS[:GSUB[:GPOS]]]`, each feature list being
//! comma-separated tags. A `*` in a list switches on every other feature the
//! language system offers; tags after it are excluded.
//!
//! ```
//! use fontweave_fonts::{OpenTypeSpec, Tag};
//!
//! let spec: OpenTypeSpec = "latn::liga,clig,*,dlig:kern".parse().unwrap();
//! assert_eq!(spec.script_tag(), Tag::from_bytes(b"latn"));
//! assert_eq!(spec.script_name(), Some("latin"));
//! assert!(spec.gsub().all_others());
//! assert_eq!(spec.gsub().excluded(), &[Tag::from_bytes(b"dlig")]);
//! assert_eq!(spec.gpos().required(), &[Tag::from_bytes(b"kern")]);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::SpecError;
use crate::script::otf_script_name;
use crate::tag::Tag;

/// Feature tags requested for one layout stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    required: Vec<Tag>,
    all_others: bool,
    excluded: Vec<Tag>,
}

impl FeatureSet {
    pub fn new(required: Vec<Tag>, all_others: bool, excluded: Vec<Tag>) -> Self {
        Self {
            required,
            all_others,
            excluded,
        }
    }

    /// Specific tags only, nothing else.
    pub fn only(required: Vec<Tag>) -> Self {
        Self::new(required, false, Vec::new())
    }

    pub fn required(&self) -> &[Tag] {
        &self.required
    }

    pub fn excluded(&self) -> &[Tag] {
        &self.excluded
    }

    pub fn all_others(&self) -> bool {
        self.all_others
    }

    /// Whether this set asks the stage to run at all.
    pub fn is_active(&self) -> bool {
        !self.required.is_empty() || self.all_others
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && !self.all_others && self.excluded.is_empty()
    }

    /// Whether a feature offered by the font should be applied.
    pub fn selects(&self, tag: Tag) -> bool {
        self.required.contains(&tag) || (self.all_others && !self.excluded.contains(&tag))
    }

    fn parse_list(text: &str) -> Result<Self, SpecError> {
        let mut set = FeatureSet::default();
        for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if token == "*" {
                set.all_others = true;
            } else if set.all_others {
                set.excluded.push(Tag::parse(token)?);
            } else {
                set.required.push(Tag::parse(token)?);
            }
        }
        Ok(set)
    }
}

impl FromStr for FeatureSet {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_list(s)
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.required.iter().map(Tag::to_string).collect();
        if self.all_others {
            parts.push("*".to_string());
            parts.extend(self.excluded.iter().map(Tag::to_string));
        }
        write!(f, "{}", parts.join(","))
    }
}

/// Script, language system, and per-stage features for one shaping or
/// resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTypeSpec {
    script_tag: Tag,
    script_name: Option<&'static str>,
    langsys: Option<Tag>,
    gsub: FeatureSet,
    gpos: FeatureSet,
}

impl Default for OpenTypeSpec {
    fn default() -> Self {
        Self::new(None, None, FeatureSet::default(), FeatureSet::default())
    }
}

impl OpenTypeSpec {
    /// A missing script defaults to `DFLT`.
    pub fn new(
        script: Option<Tag>,
        langsys: Option<Tag>,
        gsub: FeatureSet,
        gpos: FeatureSet,
    ) -> Self {
        let (script_tag, script_name) = match script {
            Some(tag) => (tag, otf_script_name(tag)),
            None => (Tag::DFLT, None),
        };
        Self {
            script_tag,
            script_name,
            langsys,
            gsub,
            gpos,
        }
    }

    pub fn script_tag(&self) -> Tag {
        self.script_tag
    }

    /// Script name used for representative-character lookup, when the tag
    /// names a known script.
    pub fn script_name(&self) -> Option<&'static str> {
        self.script_name
    }

    pub fn langsys(&self) -> Option<Tag> {
        self.langsys
    }

    pub fn gsub(&self) -> &FeatureSet {
        &self.gsub
    }

    pub fn gpos(&self) -> &FeatureSet {
        &self.gpos
    }

    /// The capability substring a candidate must advertise.
    pub fn capability(&self) -> String {
        format!("otlayout:{}", self.script_tag)
    }
}

impl FromStr for OpenTypeSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| SpecError::InvalidOtfSpec {
            text: s.to_string(),
            reason,
        };
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() > 4 {
            return Err(invalid(format!("expected at most 4 fields, found {}", parts.len())));
        }
        let field = |i: usize| parts.get(i).map(|p| p.trim()).filter(|p| !p.is_empty());

        let script = field(0).map(Tag::parse).transpose().map_err(|e| invalid(e.to_string()))?;
        let langsys = field(1)
            .map(Tag::parse)
            .transpose()
            .map_err(|e| invalid(e.to_string()))?;
        let gsub =
            FeatureSet::parse_list(field(2).unwrap_or("")).map_err(|e| invalid(e.to_string()))?;
        let gpos =
            FeatureSet::parse_list(field(3).unwrap_or("")).map_err(|e| invalid(e.to_string()))?;
        Ok(OpenTypeSpec::new(script, langsys, gsub, gpos))
    }
}

impl fmt::Display for OpenTypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.script_tag)?;
        if let Some(langsys) = self.langsys {
            write!(f, "{langsys}")?;
        }
        write!(f, ":{}:{}", self.gsub, self.gpos)
    }
}
