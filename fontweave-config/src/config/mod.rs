//! Core `Config` struct definition.
//!
//! # Sub-modules
//!
//! - [`persistence`]: `load` / `save_to` (YAML file I/O with atomic write)
//!   and the XDG-style path helpers

pub mod persistence;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::ConfigError;
use crate::types::{LogLevel, RepresentativeChars};

/// Font resolution and shaping configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    // ========================================================================
    // Logging
    // ========================================================================
    /// Level written by the binary's log bridge (CLI flag and RUST_LOG win)
    #[serde(default = "defaults::log_level")]
    pub log_level: LogLevel,

    // ========================================================================
    // Font Sources
    // ========================================================================
    /// Load fonts installed on the system into the matching engine
    #[serde(default = "defaults::load_system_fonts")]
    pub load_system_fonts: bool,

    /// Extra directories scanned for font files
    #[serde(default = "defaults::font_dirs")]
    pub font_dirs: Vec<PathBuf>,

    /// Extra individual font files
    #[serde(default = "defaults::font_files")]
    pub font_files: Vec<PathBuf>,

    // ========================================================================
    // Resolution
    // ========================================================================
    /// Pixel size used when opening scalable entities without an explicit size
    #[serde(default = "defaults::default_pixel_size")]
    pub default_pixel_size: u32,

    /// DPI added to every query when set
    #[serde(default = "defaults::dpi")]
    pub dpi: Option<u32>,

    /// Per-script representative characters, overriding the built-in table
    #[serde(
        default = "defaults::representative_chars",
        with = "serde_yaml_ng::with::singleton_map_recursive"
    )]
    pub representative_chars: BTreeMap<String, RepresentativeChars>,

    // ========================================================================
    // Shaping
    // ========================================================================
    /// Attempts made by the shaper's buffer-growth retry loop
    #[serde(default = "defaults::max_shape_attempts")]
    pub max_shape_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level(),
            load_system_fonts: defaults::load_system_fonts(),
            font_dirs: defaults::font_dirs(),
            font_files: defaults::font_files(),
            default_pixel_size: defaults::default_pixel_size(),
            dpi: defaults::dpi(),
            representative_chars: defaults::representative_chars(),
            max_shape_attempts: defaults::max_shape_attempts(),
        }
    }
}

impl Config {
    /// Check field values that serde cannot express as types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_shape_attempts == 0 {
            return Err(ConfigError::invalid("max_shape_attempts", "must be at least 1"));
        }
        if self.default_pixel_size == 0 {
            return Err(ConfigError::invalid("default_pixel_size", "must be greater than 0"));
        }
        for (script, chars) in &self.representative_chars {
            let field = || format!("representative_chars.{script}");
            if chars.code_points().is_empty() {
                return Err(ConfigError::invalid(field(), "lists no characters"));
            }
            if let Some(bad) = chars
                .code_points()
                .iter()
                .find(|cp| char::from_u32(**cp).is_none())
            {
                return Err(ConfigError::invalid(
                    field(),
                    format!("contains invalid code point {bad:#X}"),
                ));
            }
        }
        Ok(())
    }
}
