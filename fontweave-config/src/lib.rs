//! Configuration system for the fontweave font resolver and shaper.
//!
//! This crate provides configuration loading, saving, validation, and default
//! values. It includes:
//!
//! - The top-level [`Config`] struct and its YAML persistence
//! - Font source settings (system fonts, extra directories and files)
//! - Shaping limits and representative-character overrides
//! - Log level selection shared with the binary's log bridge

pub mod config;
pub mod defaults;
pub mod error;
mod types;

// Re-export main types for convenience
pub use config::Config;
pub use error::ConfigError;
pub use types::{LogLevel, RepresentativeChars};
