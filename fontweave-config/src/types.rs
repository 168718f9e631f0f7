//! Enum and value types referenced by [`crate::Config`].

use serde::{Deserialize, Serialize};

/// Log level written by the binary's log bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// No logging (log file not created)
    #[default]
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Most verbose
    Trace,
}

impl LogLevel {
    /// Display name for CLI help and diagnostics
    pub fn display_name(&self) -> &'static str {
        match self {
            LogLevel::Off => "Off",
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// All available levels
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Off,
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

    /// Parse a level name case-insensitively (`"warn"`, `"DEBUG"`, ...)
    pub fn from_name(name: &str) -> Option<LogLevel> {
        Self::all()
            .iter()
            .copied()
            .find(|level| level.display_name().eq_ignore_ascii_case(name.trim()))
    }

    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Characters standing in for a script's coverage during font listing.
///
/// `All` requires a face to cover every listed code point; `Any` accepts a
/// face that covers at least one of them.
///
/// ```yaml
/// representative_chars:
///   latin: { all: [0x41, 0x5A, 0x61, 0x7A] }
///   han: { any: [0x5B57, 0x6F22] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentativeChars {
    /// Every code point must be present
    All(Vec<u32>),
    /// At least one code point must be present
    Any(Vec<u32>),
}

impl RepresentativeChars {
    /// The listed code points, regardless of form
    pub fn code_points(&self) -> &[u32] {
        match self {
            RepresentativeChars::All(cps) | RepresentativeChars::Any(cps) => cps,
        }
    }
}
