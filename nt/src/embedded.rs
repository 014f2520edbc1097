//! Embedded template store
//!
//! Default templates are compiled into the binary from `assets/` at build time and
//! addressed by logical path, e.g. `src/notifications/event.txt`.

use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::Path;

use include_dir::{Dir, include_dir};
use tracing::debug;

use crate::source::TemplateCategory;

static ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// Read-only, path-addressed store of default templates
pub trait EmbeddedStore: Send + Sync {
    /// Read the full contents at `path`, failing with [`io::ErrorKind::NotFound`] when absent
    fn read(&self, path: &str) -> io::Result<Cow<'static, [u8]>>;
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no embedded asset at {}", path))
}

/// The templates bundled with this program
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledStore;

impl BundledStore {
    /// Logical template names bundled for a category, sorted and without extension
    pub fn names(&self, category: TemplateCategory) -> Vec<String> {
        let prefix = format!("src/{}", category.as_str());
        let Some(dir) = ASSETS.get_dir(&prefix) else {
            debug!(%prefix, "BundledStore::names: category not bundled");
            return Vec::new();
        };

        dir.files()
            .filter_map(|file| file.path().file_stem())
            .filter_map(|stem| stem.to_str())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl EmbeddedStore for BundledStore {
    fn read(&self, path: &str) -> io::Result<Cow<'static, [u8]>> {
        debug!(%path, "BundledStore::read: called");
        ASSETS
            .get_file(Path::new(path))
            .map(|file| Cow::Borrowed(file.contents()))
            .ok_or_else(|| not_found(path))
    }
}

/// In-memory store, used by tests and callers that ship their own defaults
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the contents at `path`
    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), data.into());
    }

    /// Builder form of [`MemoryStore::insert`]
    pub fn with(mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl EmbeddedStore for MemoryStore {
    fn read(&self, path: &str) -> io::Result<Cow<'static, [u8]>> {
        self.files
            .get(path)
            .map(|data| Cow::Owned(data.clone()))
            .ok_or_else(|| not_found(path))
    }
}
