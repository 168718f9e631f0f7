//! Face/charset cache.
//!
//! One [`CacheEntry`] exists per (path, index). Its slots fill independently:
//! the open face (reference counted by live [`Font`]s and explicit acquires),
//! the charset, and the canonical [`FontEntity`]. Closing a face clears only
//! the face slot.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::charset::Charset;
use crate::entity::FontEntity;
use crate::error::{CacheError, FaceOpenError};
use crate::font::Font;
use crate::layout::LayoutEngine;
use crate::provider::{FaceProvider, ProviderFace};

/// Shared handle to an open provider face.
pub type FaceHandle = Rc<dyn ProviderFace>;

/// Identity of a physical face.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceKey {
    pub path: PathBuf,
    pub index: u32,
}

impl FaceKey {
    pub fn new(path: impl Into<PathBuf>, index: u32) -> Self {
        Self {
            path: path.into(),
            index,
        }
    }
}

impl fmt::Display for FaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.path.display(), self.index)
    }
}

#[derive(Default)]
struct CacheEntry {
    face: Option<FaceHandle>,
    usage: usize,
    charset: Option<Rc<Charset>>,
    entity: Option<FontEntity>,
}

impl CacheEntry {
    fn is_vacant(&self) -> bool {
        self.face.is_none() && self.charset.is_none() && self.entity.is_none()
    }
}

/// Owns the face provider and layout engine, and every per-face slot built
/// through them. Share it with `Rc`.
pub struct FaceCache {
    provider: Box<dyn FaceProvider>,
    layout: Box<dyn LayoutEngine>,
    entries: RefCell<HashMap<FaceKey, CacheEntry>>,
}

impl FaceCache {
    pub fn new(provider: Box<dyn FaceProvider>, layout: Box<dyn LayoutEngine>) -> Self {
        Self {
            provider,
            layout,
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub fn provider(&self) -> &dyn FaceProvider {
        self.provider.as_ref()
    }

    pub fn layout_engine(&self) -> &dyn LayoutEngine {
        self.layout.as_ref()
    }

    /// Open the face if needed and take one usage count on it.
    pub fn acquire_face(&self, path: &Path, index: u32) -> Result<FaceHandle, FaceOpenError> {
        let key = FaceKey::new(path, index);
        if let Some(entry) = self.entries.borrow_mut().get_mut(&key) {
            if let Some(face) = &entry.face {
                entry.usage += 1;
                log::trace!("Reusing face {} (usage {})", key, entry.usage);
                return Ok(Rc::clone(face));
            }
        }

        let face: FaceHandle = self
            .provider
            .open(path, index)
            .map_err(|source| FaceOpenError::Open {
                path: path.to_path_buf(),
                index,
                source,
            })?
            .into();

        let mut entries = self.entries.borrow_mut();
        let entry = entries.entry(key).or_default();
        entry.face = Some(Rc::clone(&face));
        entry.usage = 1;
        Ok(face)
    }

    /// Give back one usage count; the face closes when the count reaches 0.
    pub fn release_face(&self, path: &Path, index: u32) -> Result<(), CacheError> {
        let key = FaceKey::new(path, index);
        let mut entries = self.entries.borrow_mut();
        let entry = entries
            .get_mut(&key)
            .filter(|entry| entry.usage > 0)
            .ok_or_else(|| CacheError::NotAcquired {
                path: path.to_path_buf(),
                index,
            })?;
        entry.usage -= 1;
        if entry.usage == 0 {
            entry.face = None;
            log::debug!("Closed face {}", key);
            if entry.is_vacant() {
                entries.remove(&key);
            }
        }
        Ok(())
    }

    pub fn usage_count(&self, path: &Path, index: u32) -> usize {
        self.entries
            .borrow()
            .get(&FaceKey::new(path, index))
            .map_or(0, |entry| entry.usage)
    }

    pub fn is_open(&self, path: &Path, index: u32) -> bool {
        self.entries
            .borrow()
            .get(&FaceKey::new(path, index))
            .is_some_and(|entry| entry.face.is_some())
    }

    /// The face's code points, enumerated once. A provider failure yields an
    /// empty set, which is also remembered.
    pub fn charset_of(&self, path: &Path, index: u32) -> Rc<Charset> {
        let key = FaceKey::new(path, index);
        if let Some(charset) = self
            .entries
            .borrow()
            .get(&key)
            .and_then(|entry| entry.charset.clone())
        {
            return charset;
        }

        let charset = match self.provider.charset(path, index) {
            Ok(charset) => charset,
            Err(e) => {
                log::warn!("Cannot enumerate charset of {}: {}", key, e);
                Charset::new()
            }
        };
        let charset = Rc::new(charset);
        self.entries.borrow_mut().entry(key).or_default().charset = Some(Rc::clone(&charset));
        charset
    }

    /// The canonical entity for `key`, building it with `build` on first use.
    pub(crate) fn entity_for(
        &self,
        key: &FaceKey,
        build: impl FnOnce() -> Option<FontEntity>,
    ) -> Option<FontEntity> {
        if let Some(entity) = self
            .entries
            .borrow()
            .get(key)
            .and_then(|entry| entry.entity.clone())
        {
            return Some(entity);
        }
        let entity = build()?;
        self.entries
            .borrow_mut()
            .entry(key.clone())
            .or_default()
            .entity = Some(entity.clone());
        Some(entity)
    }

    /// Open `entity` at a size: the entity's own size, or `pixel_size` for
    /// scalable entities.
    pub fn open_font(
        self: &Rc<Self>,
        entity: &FontEntity,
        pixel_size: u32,
    ) -> Result<Font, FaceOpenError> {
        let size = if entity.pixel_size > 0 {
            entity.pixel_size
        } else {
            pixel_size
        };
        let face = self.acquire_face(entity.path(), entity.index())?;
        match face.size_context(size) {
            Ok(size_metrics) => Ok(Font::new(Rc::clone(self), entity.clone(), face, size_metrics)),
            Err(source) => {
                drop(face);
                if let Err(e) = self.release_face(entity.path(), entity.index()) {
                    log::error!("Undoing acquire of {} failed: {}", entity.key, e);
                }
                Err(FaceOpenError::Size {
                    path: entity.path().to_path_buf(),
                    index: entity.index(),
                    pixel_size: size,
                    source,
                })
            }
        }
    }
}
