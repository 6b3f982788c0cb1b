use crate::auth::password::PasswordHasher;
use crate::auth::sessions::SessionRotator;
use crate::db::traits::CredentialStore;
use crate::types::{AppError, AuthTokens, Credential, Result, UserInfo};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Registration and login.
pub struct CredentialService {
    credentials: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    sessions: Arc<SessionRotator>,
}

impl CredentialService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        sessions: Arc<SessionRotator>,
    ) -> Self {
        Self {
            credentials,
            hasher,
            sessions,
        }
    }

    /// Registers a new credential.
    ///
    /// Username and email are checked separately for a precise error; the
    /// store's unique constraints still reject a concurrent duplicate.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<Credential> {
        if self.credentials.exists_username(username).await? {
            return Err(AppError::AlreadyExists(
                "Username already exists".to_string(),
            ));
        }
        if self.credentials.exists_email(email).await? {
            return Err(AppError::AlreadyExists("Email already exists".to_string()));
        }

        let password_hash = self.hasher.hash(password)?;
        let now = Utc::now();

        let credential = Credential {
            id: Uuid::now_v7().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            created_at: now,
            updated_at: now,
        };

        self.credentials.create_credential(&credential).await?;

        info!(user_id = %credential.id, username = %credential.username, "User registered");

        Ok(credential)
    }

    /// Authenticates a username and password and starts a session.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthTokens> {
        let Some(credential) = self.credentials.find_by_username(username).await? else {
            warn!(username = %username, "Login failed: unknown user");
            return Err(AppError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &credential.password_hash)? {
            warn!(user_id = %credential.id, "Login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let tokens = self.sessions.start_session(&credential).await?;

        info!(user_id = %credential.id, "User logged in");

        Ok(tokens)
    }

    pub async fn profile(&self, user_id: &str) -> Result<UserInfo> {
        self.credentials
            .find_by_id(user_id)
            .await?
            .map(|credential| credential.user_info())
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
