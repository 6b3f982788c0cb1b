//! Raw refresh-token values and their storage digest.
//!
//! The raw value is 32 bytes from the OS entropy source, hex encoded. Only
//! its SHA-256 digest is ever persisted; the digest is deterministic so the
//! presented value can be looked up, unlike the salted password hash.

use crate::types::{AppError, Result};
use rand::{rngs::OsRng, TryRngCore};
use sha2::{Digest, Sha256};

/// Number of random bytes in a raw refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generates a new raw refresh-token value.
pub fn generate_refresh_token() -> Result<String> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::Hashing(format!("entropy source failure: {}", e)))?;
    Ok(hex::encode(bytes))
}

/// Hashes a raw refresh token using SHA256 for secure storage.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
