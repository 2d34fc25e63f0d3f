//! Where source text comes from.

use std::io;
use std::path::{Component, Path, PathBuf};

use rustc_hash::FxHashMap;

pub trait SourceProvider {
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Whether `path` names a readable source file.
    fn exists(&self, path: &Path) -> bool;
}

/// Reads sources from the file system.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSources;

impl SourceProvider for FsSources {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Sources held in memory, keyed by normalized path.
#[derive(Clone, Debug, Default)]
pub struct MemorySources {
    files: FxHashMap<PathBuf, String>,
}

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    /// Add or replace a file. Returns the previous text.
    pub fn insert(&mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Option<String> {
        self.files.insert(normalize(path.as_ref()), text.into())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl SourceProvider for MemorySources {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.files.get(&normalize(path)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no in-memory source at {}", path.display()),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize(path))
    }
}

/// Resolve `.` and `..` components without touching the file system.
///
/// Leading `..` components of a relative path are kept.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
