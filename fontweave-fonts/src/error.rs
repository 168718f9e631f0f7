//! Error types for face caching, resolution, and shaping.

use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by a [`crate::FaceProvider`] or its faces.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to read font file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} has no parsable face at index {index}", path.display())]
    InvalidFace { path: PathBuf, index: u32 },

    #[error("invalid pixel size {0}")]
    InvalidSize(u32),

    #[error("glyph {0} could not be loaded")]
    GlyphLoad(u32),
}

/// A face could not be opened or sized.
#[derive(Debug, Error)]
pub enum FaceOpenError {
    #[error("cannot open face {}#{index}: {source}", path.display())]
    Open {
        path: PathBuf,
        index: u32,
        #[source]
        source: ProviderError,
    },

    #[error(
        "cannot create a {pixel_size}px size context for {}#{index}: {source}",
        path.display()
    )]
    Size {
        path: PathBuf,
        index: u32,
        pixel_size: u32,
        #[source]
        source: ProviderError,
    },
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("face {}#{index} is not acquired", path.display())]
    NotAcquired { path: PathBuf, index: u32 },
}

/// The matching engine failed to run a query.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("matching engine query failed: {0}")]
    Query(String),

    #[error("matching engine could not read face data for {}", .0.display())]
    FaceData(PathBuf),
}

/// The shaping table engine failed while driving a stage.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("{0} table is missing")]
    Missing(&'static str),

    #[error("{table} lookup {index} is malformed")]
    Malformed { table: &'static str, index: u16 },

    #[error("face data could not be reparsed")]
    Unparsable,
}

/// Text forms (tags, OpenType requests) that do not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("invalid OpenType tag {0:?}")]
    InvalidTag(String),

    #[error("invalid OpenType request {text:?}: {reason}")]
    InvalidOtfSpec { text: String, reason: String },
}

/// Why a listing produced nothing, available from
/// [`crate::Resolver::list_candidates_detailed`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("query rejected: {0}")]
    SpecRejected(String),

    #[error("resolution aborted: {0}")]
    ResourceExhausted(#[from] EngineError),
}

/// Fatal shaping failures.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("failed to measure glyph {glyph}: {source}")]
    Metrics {
        glyph: u32,
        #[source]
        source: ProviderError,
    },

    #[error("glyph buffer too small: {needed} glyphs needed")]
    BufferTooSmall { needed: usize },
}
