//! Cachekeep Store - typed blobs under one cache directory
//!
//! Every entry is a single file directly under the cache root. Values flow
//! one way on write (value -> codec -> raw bytes -> file) and back on read:
//!
//! - [`name`]: entry name validation and path resolution
//! - [`raw`]: whole-file byte reads and writes
//! - [`text`]: UTF-8 text over raw bytes
//! - [`encrypted`]: passphrase encryption layered over any text channel
//! - [`record`]: serde values stored as JSON text
//! - [`raster`]: raster images in a caller-selected format
//! - [`CacheStore`]: the facade tying them together
//!
//! The filesystem is the only source of truth. Nothing is cached in process,
//! and entries reclaimed by the OS simply read back as [`CacheError::NotFound`].

pub mod encrypted;
pub mod name;
pub mod raster;
pub mod raw;
pub mod record;
mod store;
pub mod text;

use std::fmt;
use std::io;

use cachekeep_crypto::CryptoError;

pub use cachekeep_crypto::{PassphraseCipher, SecretString, TextCipher};
pub use name::EntryPath;
pub use raster::ImageFormat;
pub use store::{CacheStore, StoreConfig, WriteMode};

/// Boxed cause for write failures, which can come from any codec.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from cache store operations.
///
/// Every variant is recoverable; none poisons the store.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Invalid entry name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Entry not found: {name}")]
    NotFound { name: String },

    #[error("Failed to read entry {name}: {source}")]
    ReadFailed {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write entry {name}: {source}")]
    WriteFailed {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to decrypt entry {name}: {source}")]
    DecryptFailed {
        name: String,
        #[source]
        source: CryptoError,
    },

    #[error("Failed to parse record {name}: {source}")]
    ParseFailed {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode image {name}: {source}")]
    DecodeFailed {
        name: String,
        #[source]
        source: ::image::ImageError,
    },
}

/// Failure category of a [`CacheError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidName,
    NotFound,
    ReadFailed,
    WriteFailed,
    DecryptFailed,
    ParseFailed,
    DecodeFailed,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidName => "invalid_name",
            ErrorKind::NotFound => "not_found",
            ErrorKind::ReadFailed => "read_failed",
            ErrorKind::WriteFailed => "write_failed",
            ErrorKind::DecryptFailed => "decrypt_failed",
            ErrorKind::ParseFailed => "parse_failed",
            ErrorKind::DecodeFailed => "decode_failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CacheError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CacheError::InvalidName { .. } => ErrorKind::InvalidName,
            CacheError::NotFound { .. } => ErrorKind::NotFound,
            CacheError::ReadFailed { .. } => ErrorKind::ReadFailed,
            CacheError::WriteFailed { .. } => ErrorKind::WriteFailed,
            CacheError::DecryptFailed { .. } => ErrorKind::DecryptFailed,
            CacheError::ParseFailed { .. } => ErrorKind::ParseFailed,
            CacheError::DecodeFailed { .. } => ErrorKind::DecodeFailed,
        }
    }

    /// Entry name the failed operation was addressing.
    pub fn entry_name(&self) -> &str {
        match self {
            CacheError::InvalidName { name, .. }
            | CacheError::NotFound { name }
            | CacheError::ReadFailed { name, .. }
            | CacheError::WriteFailed { name, .. }
            | CacheError::DecryptFailed { name, .. }
            | CacheError::ParseFailed { name, .. }
            | CacheError::DecodeFailed { name, .. } => name,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound { .. })
    }

    pub(crate) fn write_failed(entry: &EntryPath, source: impl Into<BoxError>) -> Self {
        CacheError::WriteFailed {
            name: entry.name().to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn read_failed(entry: &EntryPath, source: io::Error) -> Self {
        CacheError::ReadFailed {
            name: entry.name().to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let err = CacheError::NotFound {
            name: "profile".into(),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.is_not_found());
        assert_eq!(err.entry_name(), "profile");
    }

    #[test]
    fn test_display_names_the_entry() {
        let err = CacheError::ReadFailed {
            name: "avatar".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Failed to read entry avatar: denied");
        assert_eq!(err.kind().to_string(), "read_failed");
    }

    #[test]
    fn test_source_chain_is_preserved() {
        use std::error::Error;

        let err = CacheError::DecryptFailed {
            name: "token".into(),
            source: CryptoError::Decryption,
        };
        let source = err.source().expect("decrypt error carries a cause");
        assert!(source.to_string().contains("Decryption failed"));
    }
}
