use crate::types::AppError;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::{rngs::OsRng, TryRngCore};

/// Argon2id time cost (iterations).
pub const ARGON2_TIME_COST: u32 = 1;
/// Argon2id memory cost in KiB (64 MiB).
pub const ARGON2_MEMORY_KIB: u32 = 64 * 1024;
/// Argon2id lanes.
pub const ARGON2_PARALLELISM: u32 = 4;
/// Length of the derived key in bytes.
pub const ARGON2_OUTPUT_LEN: usize = 32;
/// Length of the random salt in bytes.
pub const SALT_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Entropy source or key derivation failed.
    #[error("Failed to hash password: {0}")]
    Hashing(String),

    /// The stored hash is not a well-formed Argon2 PHC string.
    #[error("Invalid password hash: {0}")]
    Format(String),
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Hashing(msg) => AppError::Hashing(msg),
            PasswordError::Format(msg) => AppError::Format(msg),
        }
    }
}

/// One-way password hashing with Argon2id.
///
/// Hashes are emitted as PHC strings, so salt, cost parameters and derived
/// key travel together and verification needs nothing but the string.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    fn argon2(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = Params::new(
            ARGON2_MEMORY_KIB,
            ARGON2_TIME_COST,
            ARGON2_PARALLELISM,
            Some(ARGON2_OUTPUT_LEN),
        )
        .map_err(|e| PasswordError::Hashing(e.to_string()))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hashes a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut salt_bytes = [0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|e| PasswordError::Hashing(format!("entropy source failure: {}", e)))?;

        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;

        self.argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// Verifies a password against a PHC-encoded Argon2 hash.
    ///
    /// A mismatch is `Ok(false)`; only a malformed hash is an error.
    pub fn verify(&self, password: &str, encoded_hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(encoded_hash).map_err(|e| PasswordError::Format(e.to_string()))?;

        // Output comparison inside the verifier is constant-time.
        match self
            .argon2()?
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::Format(e.to_string())),
        }
    }
}
