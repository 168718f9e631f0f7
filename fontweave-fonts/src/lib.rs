//! Font candidate resolution, face caching, and OpenType shaping for fontweave.
//!
//! This crate provides:
//! - A face/charset cache holding one open face per (path, index), shared by
//!   every size opened from it
//! - A candidate resolver turning a [`FontSpec`] into ranked [`FontEntity`]
//!   records through a fontconfig-style matching engine
//! - A shaping driver running GSUB/GPOS passes over a [`GlyphString`] and
//!   computing mark attachment and device-table adjustments
//!
//! # Architecture
//!
//! The external capabilities sit behind object-safe traits so the logic can be
//! driven by in-memory fakes:
//! 1. [`MatchEngine`] lists and best-matches candidate patterns
//!    ([`FontdbEngine`] is the shipped adapter)
//! 2. [`FaceProvider`] opens faces and reports metrics ([`SwashProvider`])
//! 3. [`LayoutEngine`] opens GSUB/GPOS/GDEF tables ([`OtLayoutEngine`])
//!
//! The [`FaceCache`] owns the provider and layout engine and is shared by `Rc`
//! between the [`Resolver`], every open [`Font`], and the [`Shaper`]. All of it
//! is single-threaded: the `Rc`/`RefCell` state is neither `Send` nor `Sync`.

pub mod cache;
pub mod charset;
pub mod charset_table;
pub mod engine;
pub mod entity;
pub mod error;
pub mod font;
pub mod layout;
pub mod otspec;
pub mod provider;
pub mod resolver;
pub mod script;
pub mod shaper;
pub mod spec;
pub mod style;
pub mod tag;

// Re-export main types for convenience
pub use cache::{FaceCache, FaceHandle, FaceKey};
pub use charset::Charset;
pub use engine::fontdb::FontdbEngine;
pub use engine::{Candidate, Field, MatchEngine, Pattern};
pub use entity::{FontEntity, FontFormat};
pub use error::{
    CacheError, EngineError, FaceOpenError, ProviderError, ResolveError, ShapeError, SpecError,
    TableError,
};
pub use font::{Font, FontMetrics, InkBounds, OtfCapability, TextExtents};
pub use layout::opentype::OtLayoutEngine;
pub use layout::{LayoutEngine, LayoutTables, Stage};
pub use otspec::{FeatureSet, OpenTypeSpec};
pub use provider::swash::SwashProvider;
pub use provider::{DesignMetrics, FaceProvider, GlyphMetrics, ProviderFace, SizeMetrics};
pub use resolver::Resolver;
pub use shaper::{Adjustment, Glyph, GlyphString, INVALID_GLYPH, Shaper};
pub use spec::{FontSpec, FontSpecBuilder};
pub use tag::Tag;
