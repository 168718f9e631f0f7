//! Resolved font entities.

use std::fmt;
use std::path::Path;

use crate::cache::FaceKey;
use crate::engine::Candidate;
use crate::style::{slant, weight, width_from_name};

/// Registry every entity reports.
pub const UNICODE_REGISTRY: &str = "iso10646-1";

/// Font file format of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFormat {
    TrueType,
    OpenType,
    Type1,
    Pcf,
    Bdf,
    Unknown,
}

impl FontFormat {
    /// Map an engine font-format string (`TrueType`, `CFF`, ...).
    pub fn from_engine(name: &str) -> Option<Self> {
        match name {
            "TrueType" => Some(FontFormat::TrueType),
            "CFF" => Some(FontFormat::OpenType),
            "Type 1" => Some(FontFormat::Type1),
            "PCF" => Some(FontFormat::Pcf),
            "BDF" => Some(FontFormat::Bdf),
            _ => None,
        }
    }

    /// Guess from the file extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("ttf") => FontFormat::TrueType,
            Some("otf") => FontFormat::OpenType,
            Some("pfb") => FontFormat::Type1,
            Some("pcf") => FontFormat::Pcf,
            Some("bdf") => FontFormat::Bdf,
            _ => FontFormat::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FontFormat::TrueType => "truetype",
            FontFormat::OpenType => "opentype",
            FontFormat::Type1 => "type1",
            FontFormat::Pcf => "pcf",
            FontFormat::Bdf => "bdf",
            FontFormat::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FontFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved candidate face with its cached properties.
///
/// Entities are canonical per face: the cache keeps the first one built for a
/// key and hands out copies of it.
#[derive(Debug, Clone, PartialEq)]
pub struct FontEntity {
    pub key: FaceKey,
    pub foundry: Option<String>,
    pub family: Option<String>,
    pub weight: Option<i32>,
    pub slant: Option<i32>,
    pub width: Option<i32>,
    /// 0 for scalable entities
    pub pixel_size: u32,
    pub spacing: Option<i32>,
    pub dpi: Option<u32>,
    /// 0 for scalable entities
    pub average_width: Option<i32>,
    pub adstyle: Option<String>,
    pub format: FontFormat,
}

impl FontEntity {
    pub fn path(&self) -> &Path {
        &self.key.path
    }

    pub fn index(&self) -> u32 {
        self.key.index
    }

    pub fn registry(&self) -> &'static str {
        UNICODE_REGISTRY
    }

    pub fn is_scalable(&self) -> bool {
        self.average_width == Some(0)
    }

    /// Build an entity from an engine candidate. Returns `None` when the
    /// candidate lacks a file or face index.
    pub(crate) fn from_candidate(
        candidate: &Candidate,
        average_width_property: impl FnOnce(&Path, u32) -> Option<i32>,
    ) -> Option<Self> {
        let path = candidate.file.clone()?;
        let index = candidate.index?;

        let entity_weight = candidate.weight.map(|w| {
            if (weight::REGULAR..weight::MEDIUM).contains(&w) {
                weight::MEDIUM
            } else {
                w
            }
        });
        let format = candidate
            .font_format
            .as_deref()
            .and_then(FontFormat::from_engine)
            .unwrap_or_else(|| FontFormat::from_path(&path));

        let mut entity = FontEntity {
            key: FaceKey::new(path, index),
            foundry: candidate.foundry.clone(),
            family: candidate.family.clone(),
            weight: entity_weight,
            slant: candidate.slant.map(|s| s + slant::ENGINE_OFFSET),
            width: candidate.width,
            pixel_size: candidate
                .pixel_size
                .map(|px| px.max(0.0) as u32)
                .unwrap_or(0),
            spacing: candidate.spacing,
            dpi: candidate.dpi.map(|dpi| dpi.max(0.0) as u32),
            average_width: None,
            adstyle: None,
            format,
        };

        if candidate.scalable == Some(true) {
            entity.pixel_size = 0;
            entity.average_width = Some(0);
        } else {
            entity.adstyle = candidate.style.as_deref().and_then(adstyle_from_style);
            entity.average_width = average_width_property(&entity.key.path, index);
        }
        Some(entity)
    }
}

/// Extract the ad-style token hidden in a style string.
///
/// The first space-separated token is the ad-style unless it is a standard
/// weight/slant keyword or a width name.
pub fn adstyle_from_style(style: &str) -> Option<String> {
    let token = style.split(' ').next().unwrap_or("");
    let is_keyword = ["Regular", "Bold", "Oblique", "Italic"]
        .iter()
        .any(|kw| kw.eq_ignore_ascii_case(token));
    if is_keyword || width_from_name(token).is_some() {
        return None;
    }
    Some(token.to_string())
}
