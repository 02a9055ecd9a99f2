//! Whole-file byte storage.
//!
//! Every call opens one handle, does one read or one write, and drops the
//! handle before returning. Handles are owned values, so they are released
//! on every exit path including unwinding.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};

use tempfile::NamedTempFile;

use crate::name::EntryPath;
use crate::store::WriteMode;
use crate::{CacheError, Result};

/// Byte-level access to resolved entry paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawStore {
    mode: WriteMode,
}

impl RawStore {
    pub fn new(mode: WriteMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Replace the entry's content with `bytes`.
    ///
    /// In [`WriteMode::Direct`] a failed write may leave a truncated file.
    /// [`WriteMode::Atomic`] writes a sibling temp file and renames it over
    /// the entry, so readers see either the old or the new content.
    pub fn write_bytes(&self, entry: &EntryPath, bytes: &[u8]) -> Result<()> {
        let written = match self.mode {
            WriteMode::Direct => write_direct(entry, bytes),
            WriteMode::Atomic => write_atomic(entry, bytes),
        };
        written.map_err(|e| CacheError::write_failed(entry, e))?;

        tracing::trace!(entry = entry.name(), bytes = bytes.len(), "wrote entry bytes");
        Ok(())
    }

    /// Read the entry's full content.
    ///
    /// A missing file is [`CacheError::NotFound`]; any other I/O fault is
    /// [`CacheError::ReadFailed`].
    pub fn read_bytes(&self, entry: &EntryPath) -> Result<Vec<u8>> {
        let mut file = File::open(entry.path()).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CacheError::NotFound {
                name: entry.name().to_string(),
            },
            _ => CacheError::read_failed(entry, e),
        })?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| CacheError::read_failed(entry, e))?;

        tracing::trace!(entry = entry.name(), bytes = bytes.len(), "read entry bytes");
        Ok(bytes)
    }

    /// Remove the entry. Removing an absent entry succeeds.
    pub fn delete_file(&self, entry: &EntryPath) -> Result<()> {
        match fs::remove_file(entry.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::write_failed(entry, e)),
        }
    }

    /// Whether a regular file currently exists for the entry.
    pub fn exists(&self, entry: &EntryPath) -> Result<bool> {
        match fs::metadata(entry.path()) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::read_failed(entry, e)),
        }
    }
}

fn write_direct(entry: &EntryPath, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(entry.path())?;
    file.write_all(bytes)?;
    file.flush()
}

fn write_atomic(entry: &EntryPath, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(entry.dir())?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    // On failure the temp file is dropped and removed.
    tmp.persist(entry.path()).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::resolve;
    use tempfile::tempdir;

    #[test]
    fn test_write_then_read_bytes() {
        let dir = tempdir().unwrap();
        let raw = RawStore::default();
        let entry = resolve(dir.path(), "blob").unwrap();

        raw.write_bytes(&entry, &[0, 1, 2, 255]).unwrap();
        assert_eq!(raw.read_bytes(&entry).unwrap(), vec![0, 1, 2, 255]);
    }

    #[test]
    fn test_overwrite_replaces_wholesale() {
        let dir = tempdir().unwrap();
        let raw = RawStore::default();
        let entry = resolve(dir.path(), "blob").unwrap();

        raw.write_bytes(&entry, b"a much longer first value").unwrap();
        raw.write_bytes(&entry, b"short").unwrap();
        assert_eq!(raw.read_bytes(&entry).unwrap(), b"short");
    }

    #[test]
    fn test_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let entry = resolve(dir.path(), "never").unwrap();

        let err = RawStore::default().read_bytes(&entry).unwrap_err();
        assert!(err.is_not_found(), "got {err:?}");
    }

    #[test]
    fn test_directory_in_place_of_entry_is_read_failure() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("occupied")).unwrap();
        let entry = resolve(dir.path(), "occupied").unwrap();

        let err = RawStore::default().read_bytes(&entry).unwrap_err();
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_write_into_missing_root_fails() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("reclaimed");
        let entry = resolve(&gone, "blob").unwrap();

        for mode in [WriteMode::Direct, WriteMode::Atomic] {
            let err = RawStore::new(mode).write_bytes(&entry, b"x").unwrap_err();
            assert!(matches!(err, CacheError::WriteFailed { .. }), "got {err:?}");
        }
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let raw = RawStore::default();
        let entry = resolve(dir.path(), "blob").unwrap();

        raw.write_bytes(&entry, b"x").unwrap();
        raw.delete_file(&entry).unwrap();
        raw.delete_file(&entry).unwrap();
        assert!(!raw.exists(&entry).unwrap());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let raw = RawStore::new(WriteMode::Atomic);
        let entry = resolve(dir.path(), "blob").unwrap();

        raw.write_bytes(&entry, b"first").unwrap();
        raw.write_bytes(&entry, b"second").unwrap();

        assert_eq!(raw.read_bytes(&entry).unwrap(), b"second");
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("blob")]);
    }
}
