//! Passphrase text cipher
//!
//! Armored layout (base64, standard alphabet):
//!
//! ```text
//! version (1) || salt (16) || nonce (12) || ciphertext || tag (16)
//! ```
//!
//! A fresh salt and nonce are drawn for every call, so encrypting the same
//! text twice never produces the same armor.

use std::fmt;
use std::num::NonZeroU32;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use secrecy::{ExposeSecret, SecretString};

use crate::cipher::{self, NONCE_SIZE, TAG_SIZE};
use crate::kdf::{self, DEFAULT_ITERATIONS, SALT_SIZE};
use crate::{CryptoError, Result};

/// Armor format version written as the first byte
pub const FORMAT_VERSION: u8 = 1;

const HEADER_SIZE: usize = 1 + SALT_SIZE;

/// Symmetric text encryption keyed by a caller-supplied passphrase.
///
/// Output of `encrypt` must itself be valid text so it can be stored through
/// any plain text channel.
pub trait TextCipher: Send + Sync {
    /// Encrypt `plaintext`, returning armored text.
    fn encrypt(&self, plaintext: &str, passphrase: &SecretString) -> Result<String>;

    /// Decrypt armored text produced by `encrypt`.
    ///
    /// A wrong passphrase or damaged armor must fail with
    /// [`CryptoError::Decryption`] rather than yield different plaintext.
    fn decrypt(&self, armored: &str, passphrase: &SecretString) -> Result<String>;
}

/// Default cipher: PBKDF2-HMAC-SHA256 key derivation + ChaCha20-Poly1305.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PassphraseCipher {
    iterations: NonZeroU32,
}

impl PassphraseCipher {
    pub fn new() -> Self {
        Self::with_iterations(DEFAULT_ITERATIONS)
    }

    /// Use a custom PBKDF2 iteration count. Zero is treated as one.
    ///
    /// Entries must be read back with the same count they were written with.
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations: NonZeroU32::new(iterations).unwrap_or(NonZeroU32::MIN),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations.get()
    }
}

impl Default for PassphraseCipher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PassphraseCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassphraseCipher")
            .field("iterations", &self.iterations)
            .finish()
    }
}

impl TextCipher for PassphraseCipher {
    fn encrypt(&self, plaintext: &str, passphrase: &SecretString) -> Result<String> {
        let salt = kdf::generate_salt()?;
        let key = kdf::derive_key(
            passphrase.expose_secret().as_bytes(),
            &salt,
            self.iterations,
        );
        let sealed = cipher::seal(&key[..], plaintext.as_bytes())?;

        let mut raw = Vec::with_capacity(HEADER_SIZE + sealed.len());
        raw.push(FORMAT_VERSION);
        raw.extend_from_slice(&salt);
        raw.extend_from_slice(&sealed);

        Ok(BASE64.encode(raw))
    }

    fn decrypt(&self, armored: &str, passphrase: &SecretString) -> Result<String> {
        let raw = BASE64
            .decode(armored.trim())
            .map_err(|_| CryptoError::Decryption)?;

        if raw.len() < HEADER_SIZE + NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Decryption);
        }
        if raw[0] != FORMAT_VERSION {
            tracing::debug!(version = raw[0], "unknown cipher armor version");
            return Err(CryptoError::Decryption);
        }

        let (salt, sealed) = raw[1..].split_at(SALT_SIZE);
        let key = kdf::derive_key(
            passphrase.expose_secret().as_bytes(),
            salt,
            self.iterations,
        );
        let plaintext = cipher::open(&key[..], sealed)?;

        String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::Decryption)
    }
}
