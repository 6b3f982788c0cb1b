//! Persistence contracts for the credential and token lifecycle.
//!
//! Services depend only on these traits, so any backend that honours the
//! query contracts below can stand in for [`TursoClient`](super::TursoClient).
//!
//! # Example
//!
//! ```rust,ignore
//! use warden::db::DatabaseProvider;
//!
//! // Use in-memory database (default for development/testing)
//! let db = DatabaseProvider::Memory.create_client().await?;
//!
//! // Use file-based SQLite
//! let db = DatabaseProvider::SQLite { path: "data.db".into() }.create_client().await?;
//! ```

use crate::types::{Credential, RefreshTokenRecord, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Database provider configuration
#[derive(Debug, Clone, Default)]
pub enum DatabaseProvider {
    /// In-memory SQLite database (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
    /// Remote Turso database (requires network access)
    #[cfg(feature = "turso")]
    Turso {
        /// The Turso database URL (e.g., `libsql://your-db.turso.io`)
        url: String,
        /// Authentication token for the Turso database
        auth_token: String,
    },
}

impl DatabaseProvider {
    /// Create a database client from this provider configuration
    pub async fn create_client(&self) -> Result<Arc<super::turso::TursoClient>> {
        let client = match self {
            DatabaseProvider::Memory => super::turso::TursoClient::new_memory().await?,
            DatabaseProvider::SQLite { path } => super::turso::TursoClient::new_local(path).await?,
            #[cfg(feature = "turso")]
            DatabaseProvider::Turso { url, auth_token } => {
                super::turso::TursoClient::new_remote(url.clone(), auth_token.clone()).await?
            }
        };
        Ok(Arc::new(client))
    }

    /// Build from a configured database URL (`:memory:` or a file path)
    pub fn from_url(url: &str) -> Self {
        if url.is_empty() || url == ":memory:" {
            DatabaseProvider::Memory
        } else {
            DatabaseProvider::SQLite {
                path: url.to_string(),
            }
        }
    }
}

/// Credential persistence.
///
/// Username and email uniqueness must be enforced by the backend itself;
/// the existence checks are only a friendlier early rejection.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Whether a credential with this username exists
    async fn exists_username(&self, username: &str) -> Result<bool>;

    /// Whether a credential with this email exists
    async fn exists_email(&self, email: &str) -> Result<bool>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Credential>>;

    /// Insert a credential. A uniqueness violation is `AppError::AlreadyExists`.
    async fn create_credential(&self, credential: &Credential) -> Result<()>;
}

/// Refresh-token persistence.
///
/// Records are only ever inserted, flipped to revoked, or purged.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create(&self, record: &RefreshTokenRecord) -> Result<()>;

    /// Look up a token by digest. Revoked tokens are never returned.
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>>;

    /// Mark a token revoked.
    ///
    /// Idempotent: returns `Ok(false)` when no active token matched, which
    /// covers both unknown and already-revoked digests.
    async fn revoke_by_hash(&self, token_hash: &str) -> Result<bool>;

    /// Retire `old_hash` and insert `replacement`.
    ///
    /// Returns `Ok(false)` without inserting when `old_hash` was no longer
    /// active. This default is not atomic: a failure after the revoke leaves
    /// no replacement, which fails safe. Backends with transactions should
    /// override it.
    async fn rotate(&self, old_hash: &str, replacement: &RefreshTokenRecord) -> Result<bool> {
        if !self.revoke_by_hash(old_hash).await? {
            return Ok(false);
        }
        self.create(replacement).await?;
        Ok(true)
    }

    /// Revoke every active token of a user, returning how many were revoked
    async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64>;

    /// Delete tokens that are revoked or expired as of `now`
    async fn purge_stale(&self, now: DateTime<Utc>) -> Result<u64>;
}
