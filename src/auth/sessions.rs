use crate::auth::jwt::TokenCodec;
use crate::auth::refresh::{generate_refresh_token, hash_refresh_token};
use crate::db::traits::{CredentialStore, RefreshTokenStore};
use crate::types::{
    AppError, AuthTokens, Credential, RefreshTokenRecord, RefreshTokenState, Result,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Refresh-token state machine: creation, rotation and revocation.
///
/// A token is Active, Expired or Revoked. Revoked is terminal, and an
/// expired token is revoked the first time it is presented.
pub struct SessionRotator {
    tokens: Arc<dyn RefreshTokenStore>,
    credentials: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
    refresh_ttl: Duration,
}

impl SessionRotator {
    pub fn new(
        tokens: Arc<dyn RefreshTokenStore>,
        credentials: Arc<dyn CredentialStore>,
        codec: Arc<TokenCodec>,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            tokens,
            credentials,
            codec,
            refresh_ttl,
        }
    }

    pub fn codec(&self) -> &Arc<TokenCodec> {
        &self.codec
    }

    /// Issues an access token and a brand-new refresh token for a
    /// credential that has just authenticated.
    pub async fn start_session(&self, credential: &Credential) -> Result<AuthTokens> {
        let (raw, record) = self.new_refresh_record(&credential.id)?;
        self.tokens.create(&record).await?;

        debug!(user_id = %credential.id, token_id = %record.id, "Refresh token created");

        self.build_tokens(credential, raw, &record)
    }

    /// Exchanges a refresh token for a new access token and refresh token.
    ///
    /// The presented token is revoked in the process, so replaying it after
    /// a successful rotation fails with `InvalidToken`.
    pub async fn rotate(&self, raw_refresh_token: &str) -> Result<AuthTokens> {
        let old_hash = hash_refresh_token(raw_refresh_token);

        let Some(existing) = self.tokens.find_by_hash(&old_hash).await? else {
            warn!("Rotation attempted with unknown or revoked refresh token");
            return Err(AppError::InvalidToken);
        };

        match existing.state_at(Utc::now()) {
            RefreshTokenState::Active => {}
            RefreshTokenState::Expired => {
                self.tokens.revoke_by_hash(&old_hash).await?;
                info!(
                    user_id = %existing.user_id,
                    token_id = %existing.id,
                    "Expired refresh token revoked"
                );
                return Err(AppError::TokenExpired);
            }
            RefreshTokenState::Revoked => return Err(AppError::InvalidToken),
        }

        let Some(credential) = self.credentials.find_by_id(&existing.user_id).await? else {
            warn!(user_id = %existing.user_id, "Refresh token owner no longer exists");
            return Err(AppError::InvalidToken);
        };

        let (raw, replacement) = self.new_refresh_record(&credential.id)?;

        if !self.tokens.rotate(&old_hash, &replacement).await? {
            // Lost a race with a concurrent rotation or logout of the same token.
            warn!(
                user_id = %credential.id,
                token_id = %existing.id,
                "Refresh token was retired during rotation"
            );
            return Err(AppError::InvalidToken);
        }

        info!(
            user_id = %credential.id,
            old_token_id = %existing.id,
            new_token_id = %replacement.id,
            "Refresh token rotated"
        );

        self.build_tokens(&credential, raw, &replacement)
    }

    /// Revokes a refresh token. Unknown and already-revoked tokens succeed.
    pub async fn logout(&self, raw_refresh_token: &str) -> Result<()> {
        let token_hash = hash_refresh_token(raw_refresh_token);

        if self.tokens.revoke_by_hash(&token_hash).await? {
            info!("Refresh token revoked on logout");
        } else {
            debug!("Logout for a refresh token that was not active");
        }

        Ok(())
    }

    /// Revokes every active refresh token of a user.
    pub async fn logout_all(&self, user_id: &str) -> Result<u64> {
        let revoked = self.tokens.revoke_all_for_user(user_id).await?;
        info!(user_id = %user_id, revoked, "All refresh tokens revoked");
        Ok(revoked)
    }

    /// Deletes expired and revoked refresh tokens.
    pub async fn purge_stale(&self) -> Result<u64> {
        let purged = self.tokens.purge_stale(Utc::now()).await?;
        if purged > 0 {
            info!(purged, "Purged stale refresh tokens");
        }
        Ok(purged)
    }

    fn new_refresh_record(&self, user_id: &str) -> Result<(String, RefreshTokenRecord)> {
        let raw = generate_refresh_token()?;
        // The store keeps whole seconds; returned expiries must match it.
        let now = Utc::now();
        let now = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        let expires_at = now.checked_add_signed(self.refresh_ttl).ok_or_else(|| {
            AppError::Internal(format!(
                "refresh token lifetime out of range: {}",
                self.refresh_ttl
            ))
        })?;

        let record = RefreshTokenRecord {
            id: Uuid::now_v7().to_string(),
            user_id: user_id.to_string(),
            token_hash: hash_refresh_token(&raw),
            expires_at,
            revoked: false,
            created_at: now,
        };

        Ok((raw, record))
    }

    fn build_tokens(
        &self,
        credential: &Credential,
        refresh_token: String,
        record: &RefreshTokenRecord,
    ) -> Result<AuthTokens> {
        let access = self.codec.issue(&credential.id, &credential.username)?;

        Ok(AuthTokens {
            access_token: access.token,
            expires_at: access.expires_at,
            refresh_token,
            refresh_expires_at: record.expires_at,
            user: credential.user_info(),
        })
    }
}
