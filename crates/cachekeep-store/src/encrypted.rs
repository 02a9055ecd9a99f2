//! Encrypted local cache
//!
//! Wraps any [`TextChannel`] so content is encrypted before it reaches the
//! disk and decrypted after it comes back. Even if someone gets the cache
//! directory, they get ciphertext.
//!
//! The passphrase is borrowed for the duration of one call and never stored.

use cachekeep_crypto::{SecretString, TextCipher};

use crate::name::EntryPath;
use crate::text::TextChannel;
use crate::{CacheError, Result};

/// A [`TextChannel`] that encrypts on write and decrypts on read.
pub struct EncryptedText<'a, I, C: ?Sized> {
    inner: I,
    cipher: &'a C,
    passphrase: &'a SecretString,
}

impl<'a, I, C> EncryptedText<'a, I, C>
where
    I: TextChannel,
    C: TextCipher + ?Sized,
{
    pub fn new(inner: I, cipher: &'a C, passphrase: &'a SecretString) -> Self {
        Self {
            inner,
            cipher,
            passphrase,
        }
    }
}

impl<I, C> TextChannel for EncryptedText<'_, I, C>
where
    I: TextChannel,
    C: TextCipher + ?Sized,
{
    fn write_text(&self, entry: &EntryPath, text: &str) -> Result<()> {
        let armored = self
            .cipher
            .encrypt(text, self.passphrase)
            .map_err(|e| CacheError::write_failed(entry, e))?;
        self.inner.write_text(entry, &armored)
    }

    /// Read errors pass through unchanged; only a failure to decrypt what was
    /// read becomes [`CacheError::DecryptFailed`].
    fn read_text(&self, entry: &EntryPath) -> Result<String> {
        let armored = self.inner.read_text(entry)?;
        self.cipher
            .decrypt(&armored, self.passphrase)
            .map_err(|source| CacheError::DecryptFailed {
                name: entry.name().to_string(),
                source,
            })
    }
}
