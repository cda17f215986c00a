//! Password hashing using argon2
//!
//! New hashes are always Argon2id PHC strings. Verification also accepts
//! bcrypt hashes so that accounts imported from the previous service keep
//! working.
//!
//! # Performance Considerations
//!
//! Both algorithms are intentionally CPU-intensive. From async code use the
//! `_async` variants, which run on the blocking thread pool.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::debug;

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// Well-formed Argon2id hash with default parameters; stands in for a
/// stored hash when the login name is unknown.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$sJ0m+RnvE1OsBaeRsxKNUGJ5JqCXFNe4nfarxejqjRk";

/// Password hashing service
///
/// Uses Argon2id which is the recommended variant for password hashing.
/// It provides resistance against both side-channel and GPU-based attacks.
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using argon2 (blocking operation)
    pub fn hash(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// A stored hash that cannot be parsed never matches.
    pub fn verify(password: &str, hash: &str) -> bool {
        if BCRYPT_PREFIXES.iter().any(|p| hash.starts_with(p)) {
            return bcrypt::verify(password, hash).unwrap_or_else(|e| {
                debug!("Unreadable bcrypt hash: {}", e);
                false
            });
        }

        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                debug!("Unreadable password hash: {}", e);
                false
            }
        }
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))
    }

    /// Run a full verification against a hash nobody owns and report failure
    ///
    /// Keeps the unknown-user path of a login as slow as a wrong password.
    pub async fn verify_dummy_async(password: String) -> Result<bool> {
        Self::verify_async(password, DUMMY_HASH.to_string())
            .await
            .map(|_| false)
    }
}
