//! Default values for configuration fields.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::types::{LogLevel, RepresentativeChars};

pub fn log_level() -> LogLevel {
    LogLevel::Off
}

pub fn load_system_fonts() -> bool {
    true
}

pub fn font_dirs() -> Vec<PathBuf> {
    Vec::new()
}

pub fn font_files() -> Vec<PathBuf> {
    Vec::new()
}

pub fn default_pixel_size() -> u32 {
    16
}

pub fn dpi() -> Option<u32> {
    None
}

pub fn max_shape_attempts() -> u32 {
    3 // Output buffer doubles between attempts
}

pub fn representative_chars() -> BTreeMap<String, RepresentativeChars> {
    BTreeMap::new() // Built-in table lives in fontweave-fonts
}
