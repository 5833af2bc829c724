//! Password key derivation and verification.
//!
//! PBKDF2-HMAC-SHA512 with an explicit per-document salt. The salt and the
//! derived key are stored as separate binary fields on the client document;
//! a fresh salt is generated every time a password is set. Verification is
//! constant-time (`ring::pbkdf2::verify`).

use std::num::NonZeroU32;

use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{Result, StoreError};

/// Minimum recommended salt size.
pub const SALT_LENGTH: usize = 16;
/// Derived key length in bytes.
pub const HASH_KEY_LENGTH: usize = 64;

const ITERATIONS: u32 = 1000;

/// A freshly derived credential pair, ready to persist.
#[derive(Debug, Clone)]
pub struct DerivedPassword {
    pub salt: Vec<u8>,
    pub hash: Vec<u8>,
}

fn iterations() -> NonZeroU32 {
    // ITERATIONS is a non-zero constant; the fallback is unreachable.
    NonZeroU32::new(ITERATIONS).unwrap_or(NonZeroU32::MIN)
}

/// Derive a salted hash for `password` with a fresh random salt.
pub fn derive(password: &str) -> Result<DerivedPassword> {
    let rng = SystemRandom::new();
    let mut salt = vec![0u8; SALT_LENGTH];
    rng.fill(&mut salt)
        .map_err(|_| StoreError::Crypto("failed to generate salt"))?;

    let mut hash = vec![0u8; HASH_KEY_LENGTH];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA512,
        iterations(),
        &salt,
        password.as_bytes(),
        &mut hash,
    );

    Ok(DerivedPassword { salt, hash })
}

/// Constant-time check of `password` against a stored salt/hash pair.
pub fn verify(password: &str, salt: &[u8], expected_hash: &[u8]) -> bool {
    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA512,
        iterations(),
        salt,
        password.as_bytes(),
        expected_hash,
    )
    .is_ok()
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn derive_then_verify_roundtrips() {
        let derived = derive("correct horse battery staple").unwrap();
        assert!(verify("correct horse battery staple", &derived.salt, &derived.hash));
        assert!(!verify("correct horse battery stable", &derived.salt, &derived.hash));
    }

    #[test]
    fn hash_is_never_the_plaintext() {
        let derived = derive("hunter2").unwrap();
        assert_ne!(derived.hash, b"hunter2");
        assert_eq!(derived.hash.len(), HASH_KEY_LENGTH);
        assert_eq!(derived.salt.len(), SALT_LENGTH);
    }

    #[test]
    fn fresh_salt_per_derivation() {
        let a = derive("same password").unwrap();
        let b = derive("same password").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn verify_fails_against_foreign_salt() {
        let a = derive("pw").unwrap();
        let b = derive("pw").unwrap();
        assert!(!verify("pw", &b.salt, &a.hash));
    }
}
