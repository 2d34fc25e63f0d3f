//! Host configuration, read once when a context is created.
//!
//! The file form is JSON:
//!
//! ```json
//! {
//!   "stdlib_path": "/opt/arbor/stdlib",
//!   "output_path": "build",
//!   "files": [
//!     { "path": "src/main.ts" },
//!     { "path": "src/lib.ts", "output": "build/lib.abc" }
//!   ],
//!   "error_limit": 100
//! }
//! ```
//!
//! The first entry of `files` is the main program.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Search root for imports with a standard-library prefix.
    pub stdlib_path: PathBuf,
    /// Directory for emitted units without a per-file override.
    pub output_path: Option<PathBuf>,
    pub files: Vec<SourceEntry>,
    /// Import specifiers starting with one of these name the standard
    /// library; such programs are loaded but never transformed or tracked.
    pub stdlib_prefixes: Vec<String>,
    /// Extensions tried, in order, when resolving a relative import.
    pub extensions: Vec<String>,
    /// Errors kept per program by the checker (0 = unlimited).
    pub error_limit: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl SourceEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SourceEntry {
            path: path.into(),
            output: None,
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            stdlib_path: PathBuf::from("stdlib"),
            output_path: None,
            files: Vec::new(),
            stdlib_prefixes: vec!["std/".to_owned()],
            extensions: vec!["ts".to_owned(), "ets".to_owned()],
            error_limit: 100,
        }
    }
}

impl HostConfig {
    /// Configuration with a single main file and defaults elsewhere.
    pub fn new(main: impl Into<PathBuf>) -> Self {
        HostConfig {
            files: vec![SourceEntry::new(main)],
            ..HostConfig::default()
        }
    }

    #[must_use]
    pub fn with_file(mut self, entry: SourceEntry) -> Self {
        self.files.push(entry);
        self
    }

    #[must_use]
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_stdlib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdlib_path = path.into();
        self
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: HostConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration. Relative source, output and stdlib paths
    /// are taken relative to the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json_str(&text)?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.files.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if let Some(prefix) = self.stdlib_prefixes.iter().find(|p| p.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "empty stdlib prefix {prefix:?} would match every import"
            )));
        }
        Ok(())
    }

    pub fn main_entry(&self) -> Option<&SourceEntry> {
        self.files.first()
    }

    /// Whether an import specifier names the standard library.
    pub fn is_stdlib(&self, specifier: &str) -> bool {
        self.stdlib_prefixes
            .iter()
            .any(|prefix| specifier.starts_with(prefix.as_str()))
    }

    fn rebase(&mut self, base: &Path) {
        let join = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        join(&mut self.stdlib_path);
        if let Some(output) = &mut self.output_path {
            join(output);
        }
        for entry in &mut self.files {
            join(&mut entry.path);
            if let Some(output) = &mut entry.output {
                join(output);
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config lists no source files")]
    NoSources,

    #[error("invalid config: {0}")]
    Invalid(String),
}
