//! UTF-8 text over raw entry bytes.
//!
//! Content is stored byte-for-byte: no line-ending normalization, no trailing
//! newline added or stripped.

use std::io;

use crate::name::EntryPath;
use crate::raw::RawStore;
use crate::{CacheError, Result};

/// Something that can store and load an entry as text.
///
/// Implemented by [`PlainText`] and by the encrypting wrapper in
/// [`crate::encrypted`], so record storage can run over either.
pub trait TextChannel {
    fn write_text(&self, entry: &EntryPath, text: &str) -> Result<()>;

    fn read_text(&self, entry: &EntryPath) -> Result<String>;
}

impl<T: TextChannel + ?Sized> TextChannel for &T {
    fn write_text(&self, entry: &EntryPath, text: &str) -> Result<()> {
        (**self).write_text(entry, text)
    }

    fn read_text(&self, entry: &EntryPath) -> Result<String> {
        (**self).read_text(entry)
    }
}

/// Unencrypted text stored directly through a [`RawStore`].
#[derive(Debug, Clone, Copy)]
pub struct PlainText<'a> {
    raw: &'a RawStore,
}

impl<'a> PlainText<'a> {
    pub fn new(raw: &'a RawStore) -> Self {
        Self { raw }
    }
}

impl TextChannel for PlainText<'_> {
    fn write_text(&self, entry: &EntryPath, text: &str) -> Result<()> {
        self.raw.write_bytes(entry, text.as_bytes())
    }

    /// Bytes that are not valid UTF-8 are a [`CacheError::ReadFailed`].
    fn read_text(&self, entry: &EntryPath) -> Result<String> {
        let bytes = self.raw.read_bytes(entry)?;
        String::from_utf8(bytes).map_err(|e| {
            CacheError::read_failed(entry, io::Error::new(io::ErrorKind::InvalidData, e))
        })
    }
}
