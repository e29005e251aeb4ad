//! One-way credential hashing.
//!
//! # Responsibility
//! - Turn plaintext passwords into self-describing PHC hash strings.
//! - Verify a plaintext candidate against a stored hash.
//!
//! # Invariants
//! - Plaintext is never stored or logged by this module.
//! - A well-formed hash that does not match yields `Ok(false)`, not an error.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

/// Hashing backend failure (bad parameters, unparseable stored hash).
#[derive(Debug, Error)]
#[error("credential hashing failed: {0}")]
pub struct CredentialError(#[from] argon2::password_hash::Error);

/// Password hashing seam used by the user service.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher {
    /// Hashes `plaintext` with a fresh random salt.
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError>;
    /// Returns whether `plaintext` matches `stored_hash`.
    fn verify(&self, plaintext: &str, stored_hash: &str) -> Result<bool, CredentialError>;
}

/// Argon2id hasher with the crate's default cost parameters.
#[derive(Default, Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2.hash_password(plaintext.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, stored_hash: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(stored_hash)?;
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Argon2Hasher, CredentialHasher};

    #[test]
    fn hash_never_equals_plaintext_and_verifies() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("secret1").unwrap();

        assert_ne!(hash, "secret1");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("secret1", &hash).unwrap());
        assert!(!hasher.verify("secret2", &hash).unwrap());
    }

    #[test]
    fn hashing_same_password_twice_uses_distinct_salts() {
        let hasher = Argon2Hasher::new();
        let first = hasher.hash("secret1").unwrap();
        let second = hasher.hash("secret1").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        let hasher = Argon2Hasher::new();
        assert!(hasher.verify("secret1", "not-a-phc-string").is_err());
    }
}
