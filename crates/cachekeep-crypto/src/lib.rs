//! Cachekeep Crypto - symmetric encryption for cache entries at rest
//!
//! This crate provides:
//! - ChaCha20-Poly1305 sealing with a prepended nonce
//! - PBKDF2-HMAC-SHA256 key derivation from a passphrase
//! - The `TextCipher` capability and its default `PassphraseCipher`
//!
//! Derived keys are wrapped in `Zeroizing<>` and scrubbed on drop.
//! Nothing in this crate logs or persists passphrases.

pub mod cipher;
pub mod kdf;
mod passphrase;

pub use passphrase::{PassphraseCipher, TextCipher, FORMAT_VERSION};
pub use secrecy::{ExposeSecret, SecretString};

/// Errors that can occur in cryptographic operations
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Encryption failed")]
    Encryption,

    #[error("Decryption failed - wrong passphrase, or data corrupted or tampered")]
    Decryption,

    #[error("Invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("System random number generator unavailable")]
    Random,
}

pub type Result<T> = std::result::Result<T, CryptoError>;
