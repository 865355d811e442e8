//! Generated-password helpers for store logins.
//!
//! Installation creates one login per store with a random password that is
//! argon2-hashed before storage and (optionally) mailed to the merchant.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of generated store-login passwords.
pub const GENERATED_PASSWORD_LENGTH: usize = 10;

/// Errors that can occur when hashing or verifying passwords.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Hashing failed (salt or parameter error).
    #[error("failed to hash password")]
    Hash,

    /// The password does not match the stored hash.
    #[error("password does not match")]
    Mismatch,
}

/// Generate a random alphanumeric password.
#[must_use]
pub fn generate() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

/// Hash a password with argon2 and a fresh random salt.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if hashing fails.
pub fn hash(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::Hash)
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `PasswordError::Mismatch` if the hash is malformed or the
/// password does not match.
pub fn verify(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::Mismatch)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::Mismatch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_length_and_charset() {
        let password = generate();
        assert_eq!(password.len(), GENERATED_PASSWORD_LENGTH);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_is_not_constant() {
        // Astronomically unlikely to collide; a collision here means the
        // generator is broken.
        assert_ne!(generate(), generate());
    }

    #[test]
    fn test_hash_verify_round_trip() {
        let password = generate();
        let hash = hash(&password).unwrap();

        assert!(verify(&password, &hash).is_ok());
        assert!(matches!(
            verify("wrong-password", &hash),
            Err(PasswordError::Mismatch)
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify("anything", "not-a-phc-string"),
            Err(PasswordError::Mismatch)
        ));
    }
}
