//! Password Hashing
//!
//! Salted Argon2id hashing with a configurable cost, and verification of
//! PHC-encoded hashes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use once_cell::sync::OnceCell;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("password does not match")]
    Mismatch,

    #[error("stored password hash is malformed")]
    MalformedHash,
}

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Hashes and verifies user passwords
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    /// Lazily computed hash used to keep unknown-user logins as slow as real ones
    dummy_hash: OnceCell<String>,
}

impl CredentialHasher {
    pub fn new(cost: HashCost) -> Result<Self, CredentialError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_hash: OnceCell::new(),
        })
    }

    /// Hash `password` with a fresh random salt, returning the PHC string
    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    /// Check `password` against a stored PHC hash.
    ///
    /// The cost parameters are read from the hash itself, so hashes created
    /// under an older cost still verify.
    pub fn verify(&self, password: &str, hash: &str) -> Result<(), CredentialError> {
        let parsed = PasswordHash::new(hash).map_err(|_| CredentialError::MalformedHash)?;

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|e| match e {
                password_hash::Error::Password => CredentialError::Mismatch,
                _ => CredentialError::MalformedHash,
            })
    }

    /// Run a verification that always fails, at the cost of a real one
    pub fn verify_dummy(&self, password: &str) -> Result<(), CredentialError> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| self.hash("dummy-password-for-timing"))?;
        self.verify(password, hash)?;
        Err(CredentialError::Mismatch)
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> CredentialHasher {
    CredentialHasher::new(HashCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hasher = test_hasher();
        let hash = hasher.hash("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        hasher.verify("correct horse", &hash).unwrap();
    }

    #[test]
    fn test_wrong_password_is_mismatch() {
        let hasher = test_hasher();
        let hash = hasher.hash("p1").unwrap();

        assert!(matches!(hasher.verify("p2", &hash), Err(CredentialError::Mismatch)));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = test_hasher();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();

        assert_ne!(a, b);
        hasher.verify("same", &a).unwrap();
        hasher.verify("same", &b).unwrap();
    }

    #[test]
    fn test_malformed_hash() {
        let hasher = test_hasher();
        assert!(matches!(
            hasher.verify("anything", "not-a-phc-string"),
            Err(CredentialError::MalformedHash)
        ));
    }

    #[test]
    fn test_verify_uses_cost_from_hash() {
        let cheap = test_hasher();
        let other = CredentialHasher::new(HashCost {
            memory_kib: 16,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();

        let hash = cheap.hash("pw").unwrap();
        other.verify("pw", &hash).unwrap();
    }

    #[test]
    fn test_dummy_verification_always_fails() {
        let hasher = test_hasher();
        assert!(matches!(
            hasher.verify_dummy("dummy-password-for-timing"),
            Err(CredentialError::Mismatch)
        ));
        assert!(matches!(hasher.verify_dummy("x"), Err(CredentialError::Mismatch)));
    }

    #[test]
    fn test_invalid_cost_rejected() {
        let result = CredentialHasher::new(HashCost {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        });
        assert!(matches!(result, Err(CredentialError::Hashing(_))));
    }
}
