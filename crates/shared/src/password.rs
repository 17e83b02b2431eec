//! Event password hashing.
//!
//! Organizers protect each event with a shared password that gates publishing,
//! schedule edits and participant registration. The password is stored as an
//! Argon2id PHC string; verification goes through the Argon2 verifier, which
//! compares digests in constant time.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    #[error("Password must not be empty")]
    Empty,
}

const MEMORY_COST: u32 = 12288;
const TIME_COST: u32 = 3;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(format!("Invalid Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes an event password into a PHC string.
///
/// Empty passwords are rejected: an event without a password could be
/// published or joined by anyone who knows its code.
///
/// ```
/// use shared::password::hash_event_password;
///
/// let hash = hash_event_password("pw1").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_event_password(password: &str) -> Result<String, PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }

    let salt = SaltString::generate(&mut OsRng);
    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Checks a plaintext password against the stored event hash.
///
/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash itself is
/// unusable.
///
/// ```
/// use shared::password::{hash_event_password, verify_event_password};
///
/// let hash = hash_event_password("pw1").unwrap();
/// assert!(verify_event_password("pw1", &hash).unwrap());
/// assert!(!verify_event_password("pw2", &hash).unwrap());
/// ```
pub fn verify_event_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    // Parameters are read back from the PHC string.
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_event_profile() {
        let hash = hash_event_password("pw1").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=12288,t=3,p=1$"));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let a = hash_event_password("HACK2024-pass").unwrap();
        let b = hash_event_password("HACK2024-pass").unwrap();
        assert_ne!(a, b);
        assert!(verify_event_password("HACK2024-pass", &a).unwrap());
        assert!(verify_event_password("HACK2024-pass", &b).unwrap());
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        let hash = hash_event_password("pw1").unwrap();
        assert!(!verify_event_password("PW1", &hash).unwrap());
        assert!(!verify_event_password("", &hash).unwrap());
    }

    #[test]
    fn test_empty_password_cannot_be_hashed() {
        assert!(matches!(hash_event_password(""), Err(PasswordError::Empty)));
    }

    #[test]
    fn test_non_ascii_password() {
        let hash = hash_event_password("해커톤2024!").unwrap();
        assert!(verify_event_password("해커톤2024!", &hash).unwrap());
    }

    #[test]
    fn test_legacy_sha256_hash_is_not_accepted() {
        // Bare hex digest, as stored by the first prototype.
        let legacy = "e3f3b1d1b2d0e7f6c1a44f4b4f6b5d8b1f0c9b2c4d1e6f7a8b9c0d1e2f3a4b5c";
        assert!(matches!(
            verify_event_password("pw1", legacy),
            Err(PasswordError::InvalidHashFormat)
        ));
    }
}
