//! Passphrase key derivation (PBKDF2-HMAC-SHA256)

use std::num::NonZeroU32;

use ring::pbkdf2;
use zeroize::Zeroizing;

use crate::cipher::{fill_random, KEY_SIZE};
use crate::Result;

/// 128-bit salt, stored alongside each ciphertext
pub const SALT_SIZE: usize = 16;

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Generate a fresh random salt
pub fn generate_salt() -> Result<[u8; SALT_SIZE]> {
    let mut salt = [0u8; SALT_SIZE];
    fill_random(&mut salt)?;
    Ok(salt)
}

/// Derive a symmetric key from `passphrase` and `salt`.
///
/// The returned key is scrubbed from memory when dropped.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    iterations: NonZeroU32,
) -> Zeroizing<[u8; KEY_SIZE]> {
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        passphrase,
        &mut key[..],
    );
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iters(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let salt = [7u8; SALT_SIZE];
        let a = derive_key(b"hunter2", &salt, iters(10));
        let b = derive_key(b"hunter2", &salt, iters(10));
        assert_eq!(*a, *b);
    }

    #[test]
    fn test_salt_changes_key() {
        let a = derive_key(b"hunter2", &[1u8; SALT_SIZE], iters(10));
        let b = derive_key(b"hunter2", &[2u8; SALT_SIZE], iters(10));
        assert_ne!(*a, *b);
    }

    #[test]
    fn test_passphrase_changes_key() {
        let salt = [1u8; SALT_SIZE];
        let a = derive_key(b"hunter2", &salt, iters(10));
        let b = derive_key(b"hunter3", &salt, iters(10));
        assert_ne!(*a, *b);
    }

    #[test]
    fn test_salts_are_random() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }
}
