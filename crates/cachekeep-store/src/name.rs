//! Entry name resolution.
//!
//! An entry name maps to exactly one file directly under the cache root.
//! Anything that could address a different location is rejected before any
//! filesystem call is made.

use std::path::{Component, Path, PathBuf};

use crate::{CacheError, Result};

/// A validated entry name joined onto its cache root.
///
/// Built per operation and never reused across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPath {
    name: String,
    path: PathBuf,
}

impl EntryPath {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the entry (the cache root).
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Resolve `name` under `root`.
///
/// Pure: performs no I/O. Fails with [`CacheError::InvalidName`] when the
/// name is empty, contains a NUL byte or a path separator, is a `.`/`..`
/// segment, or would otherwise not be a single plain file name.
pub fn resolve(root: &Path, name: &str) -> Result<EntryPath> {
    let invalid = |reason: &'static str| CacheError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.contains('\0') {
        return Err(invalid("name contains a NUL byte"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(invalid("name contains a path separator"));
    }
    if name == "." || name == ".." {
        return Err(invalid("name is a relative path segment"));
    }

    // Catches platform prefixes such as `C:` that survive the checks above.
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) if c == name => {}
        _ => return Err(invalid("name is not a plain file name")),
    }

    Ok(EntryPath {
        name: name.to_string(),
        path: root.join(name),
    })
}
