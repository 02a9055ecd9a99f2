//! The cache store facade.

use std::path::{Path, PathBuf};

use ::image::DynamicImage;
use cachekeep_crypto::{PassphraseCipher, SecretString, TextCipher};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::encrypted::EncryptedText;
use crate::name::{resolve, EntryPath};
use crate::raster::{self, ImageFormat};
use crate::raw::RawStore;
use crate::record::{read_record, write_record};
use crate::text::{PlainText, TextChannel};
use crate::{CacheError, Result};

/// How entry bytes reach the disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Truncate and write the entry in place. A failed write may leave a
    /// partial file behind.
    #[default]
    Direct,
    /// Write a temp file in the cache root and rename it over the entry.
    Atomic,
}

/// Store-wide settings fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub write_mode: WriteMode,
    /// Quality used by [`CacheStore::write_image_default`].
    pub default_image_quality: u8,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            write_mode: WriteMode::Direct,
            default_image_quality: 90,
        }
    }
}

/// Typed cache entries under a single directory.
///
/// The root must already exist and be writable; the store never creates it.
/// No state is kept between calls beyond the configuration, so one store can
/// be shared across threads by reference. Concurrent writers to the same
/// entry are not coordinated: the last rename or write wins.
///
/// ```no_run
/// use cachekeep_store::CacheStore;
///
/// let store = CacheStore::open("/tmp/app-cache");
/// store.write("greeting", "hello\nworld")?;
/// assert_eq!(store.read("greeting")?, "hello\nworld");
/// # Ok::<(), cachekeep_store::CacheError>(())
/// ```
#[derive(Debug)]
pub struct CacheStore<C = PassphraseCipher> {
    root: PathBuf,
    config: StoreConfig,
    raw: RawStore,
    cipher: C,
}

impl CacheStore<PassphraseCipher> {
    /// Open a store over `root` with default settings.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::open_with(root, StoreConfig::default())
    }

    pub fn open_with(root: impl Into<PathBuf>, config: StoreConfig) -> Self {
        Self::with_cipher(root, config, PassphraseCipher::default())
    }
}

impl<C: TextCipher> CacheStore<C> {
    /// Open a store that encrypts with a custom cipher.
    pub fn with_cipher(root: impl Into<PathBuf>, config: StoreConfig, cipher: C) -> Self {
        let root = root.into();
        tracing::debug!(root = %root.display(), write_mode = ?config.write_mode, "opening cache store");
        Self {
            raw: RawStore::new(config.write_mode),
            root,
            config,
            cipher,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // --- text ---

    pub fn write(&self, name: &str, text: &str) -> Result<()> {
        self.run("write", name, |entry| self.plain().write_text(entry, text))
    }

    pub fn read(&self, name: &str) -> Result<String> {
        self.run("read", name, |entry| self.plain().read_text(entry))
    }

    pub fn write_encrypted(&self, name: &str, text: &str, key: &SecretString) -> Result<()> {
        self.run("write_encrypted", name, |entry| {
            self.encrypted(key).write_text(entry, text)
        })
    }

    pub fn read_encrypted(&self, name: &str, key: &SecretString) -> Result<String> {
        self.run("read_encrypted", name, |entry| {
            self.encrypted(key).read_text(entry)
        })
    }

    // --- records ---

    pub fn write_record<T: Serialize + ?Sized>(&self, name: &str, record: &T) -> Result<()> {
        self.run("write_record", name, |entry| {
            write_record(self.plain(), entry, record)
        })
    }

    pub fn read_record<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        self.run("read_record", name, |entry| {
            read_record(self.plain(), entry)
        })
    }

    pub fn write_record_encrypted<T: Serialize + ?Sized>(
        &self,
        name: &str,
        record: &T,
        key: &SecretString,
    ) -> Result<()> {
        self.run("write_record_encrypted", name, |entry| {
            write_record(self.encrypted(key), entry, record)
        })
    }

    pub fn read_record_encrypted<T: DeserializeOwned>(
        &self,
        name: &str,
        key: &SecretString,
    ) -> Result<T> {
        self.run("read_record_encrypted", name, |entry| {
            read_record(self.encrypted(key), entry)
        })
    }

    // --- images ---

    /// Store an image. `quality` (0-100) only affects lossy formats.
    pub fn write_image(
        &self,
        name: &str,
        image: &DynamicImage,
        format: ImageFormat,
        quality: u8,
    ) -> Result<()> {
        self.run("write_image", name, |entry| {
            raster::write_image(&self.raw, entry, image, format, quality)
        })
    }

    /// Store an image at the configured default quality.
    pub fn write_image_default(
        &self,
        name: &str,
        image: &DynamicImage,
        format: ImageFormat,
    ) -> Result<()> {
        self.write_image(name, image, format, self.config.default_image_quality)
    }

    pub fn read_image(&self, name: &str) -> Result<DynamicImage> {
        self.run("read_image", name, |entry| raster::read_image(&self.raw, entry))
    }

    // --- binary ---

    pub fn write_binary(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.run("write_binary", name, |entry| self.raw.write_bytes(entry, bytes))
    }

    pub fn read_binary(&self, name: &str) -> Result<Vec<u8>> {
        self.run("read_binary", name, |entry| self.raw.read_bytes(entry))
    }

    // --- management ---

    /// Delete an entry. Deleting an absent entry succeeds.
    pub fn delete(&self, name: &str) -> Result<()> {
        self.run("delete", name, |entry| self.raw.delete_file(entry))
    }

    /// Whether an entry currently exists. The OS may reclaim it at any time
    /// after this returns.
    pub fn contains(&self, name: &str) -> Result<bool> {
        self.run("contains", name, |entry| self.raw.exists(entry))
    }

    fn plain(&self) -> PlainText<'_> {
        PlainText::new(&self.raw)
    }

    fn encrypted<'a>(&'a self, key: &'a SecretString) -> EncryptedText<'a, PlainText<'a>, C> {
        EncryptedText::new(self.plain(), &self.cipher, key)
    }

    /// Resolve `name`, run `op` against it, and report the outcome.
    fn run<T>(
        &self,
        op: &'static str,
        name: &str,
        f: impl FnOnce(&EntryPath) -> Result<T>,
    ) -> Result<T> {
        let result = resolve(&self.root, name).and_then(|entry| f(&entry));
        match &result {
            Ok(_) => tracing::debug!(op, entry = name, outcome = "ok", "cache operation"),
            Err(CacheError::NotFound { .. }) => {
                tracing::debug!(op, entry = name, outcome = "not_found", "cache operation")
            }
            Err(e) => tracing::warn!(
                op,
                entry = name,
                outcome = e.kind().as_str(),
                error = %e,
                "cache operation failed"
            ),
        }
        result
    }
}
