//! fontweave command-line front end.
//!
//! The library half exposes the CLI and the log bridge so both can be driven
//! from tests; the work itself happens in `fontweave-fonts`.

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod debug;
