//! Store doubles for failure injection.
//!
//! Each wraps or replaces the libsql client to exercise paths that a healthy
//! single-process database never takes on its own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use warden::db::{CredentialStore, RefreshTokenStore, TursoClient};
use warden::types::{AppError, Credential, RefreshTokenRecord, Result};

/// Every operation fails as if the database were unreachable.
pub struct UnavailableStore;

fn unavailable<T>() -> Result<T> {
    Err(AppError::Database(
        "connection refused: 10.0.0.7:5432".to_string(),
    ))
}

#[async_trait]
impl CredentialStore for UnavailableStore {
    async fn exists_username(&self, _username: &str) -> Result<bool> {
        unavailable()
    }

    async fn exists_email(&self, _email: &str) -> Result<bool> {
        unavailable()
    }

    async fn find_by_username(&self, _username: &str) -> Result<Option<Credential>> {
        unavailable()
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<Credential>> {
        unavailable()
    }

    async fn create_credential(&self, _credential: &Credential) -> Result<()> {
        unavailable()
    }
}

#[async_trait]
impl RefreshTokenStore for UnavailableStore {
    async fn create(&self, _record: &RefreshTokenRecord) -> Result<()> {
        unavailable()
    }

    async fn find_by_hash(&self, _token_hash: &str) -> Result<Option<RefreshTokenRecord>> {
        unavailable()
    }

    async fn revoke_by_hash(&self, _token_hash: &str) -> Result<bool> {
        unavailable()
    }

    async fn revoke_all_for_user(&self, _user_id: &str) -> Result<u64> {
        unavailable()
    }

    async fn purge_stale(&self, _now: DateTime<Utc>) -> Result<u64> {
        unavailable()
    }
}

/// Existence checks always report "free", as they would for the loser of a
/// registration race that checked before the winner inserted.
pub struct StaleExistenceChecks {
    pub inner: Arc<TursoClient>,
}

#[async_trait]
impl CredentialStore for StaleExistenceChecks {
    async fn exists_username(&self, _username: &str) -> Result<bool> {
        Ok(false)
    }

    async fn exists_email(&self, _email: &str) -> Result<bool> {
        Ok(false)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>> {
        self.inner.find_by_username(username).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Credential>> {
        self.inner.find_by_id(id).await
    }

    async fn create_credential(&self, credential: &Credential) -> Result<()> {
        self.inner.create_credential(credential).await
    }
}

/// Token store without a transactional `rotate`, so the trait's default
/// revoke-then-create sequence is used. Optionally fails every `create`
/// after the first `allowed_creates` calls.
pub struct NonTransactionalTokens {
    pub inner: Arc<TursoClient>,
    pub allowed_creates: usize,
    creates: AtomicUsize,
}

impl NonTransactionalTokens {
    pub fn new(inner: Arc<TursoClient>) -> Self {
        Self::failing_after(inner, usize::MAX)
    }

    pub fn failing_after(inner: Arc<TursoClient>, allowed_creates: usize) -> Self {
        Self {
            inner,
            allowed_creates,
            creates: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RefreshTokenStore for NonTransactionalTokens {
    async fn create(&self, record: &RefreshTokenRecord) -> Result<()> {
        if self.creates.fetch_add(1, Ordering::SeqCst) >= self.allowed_creates {
            return Err(AppError::Database("disk I/O error".to_string()));
        }
        self.inner.create(record).await
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>> {
        self.inner.find_by_hash(token_hash).await
    }

    async fn revoke_by_hash(&self, token_hash: &str) -> Result<bool> {
        self.inner.revoke_by_hash(token_hash).await
    }

    async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64> {
        self.inner.revoke_all_for_user(user_id).await
    }

    async fn purge_stale(&self, now: DateTime<Utc>) -> Result<u64> {
        self.inner.purge_stale(now).await
    }
}
