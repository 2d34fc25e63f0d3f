//! Mapping import specifiers to file paths.
//!
//! - `std/...` (any configured stdlib prefix): under `stdlib_path`
//! - `./...`, `../...`: relative to the importing file
//! - anything else: not resolvable
//!
//! The specifier as written is tried first, then with each configured
//! extension appended.

use std::path::{Path, PathBuf};

use arbor_engine::HostConfig;

use crate::sources::normalize;

/// Paths an import specifier written in the file `from` may name, in the
/// order they should be tried.
pub(crate) fn candidates(config: &HostConfig, from: &Path, specifier: &str) -> Vec<PathBuf> {
    let stdlib_rest = config
        .stdlib_prefixes
        .iter()
        .find_map(|prefix| specifier.strip_prefix(prefix.as_str()));

    let base = if let Some(rest) = stdlib_rest {
        config.stdlib_path.join(rest)
    } else if is_relative(specifier) {
        from.parent().unwrap_or_else(|| Path::new("")).join(specifier)
    } else {
        return Vec::new();
    };
    let base = normalize(&base);

    let mut paths = Vec::with_capacity(config.extensions.len() + 1);
    for extension in &config.extensions {
        let mut path = base.clone().into_os_string();
        path.push(".");
        path.push(extension);
        paths.push(PathBuf::from(path));
    }
    paths.insert(0, base);
    paths
}

fn is_relative(specifier: &str) -> bool {
    matches!(specifier, "." | "..") || specifier.starts_with("./") || specifier.starts_with("../")
}
