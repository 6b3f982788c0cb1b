//! # Warden - Credential & Token Lifecycle Server
//!
//! Password-based registration and login, short-lived signed access tokens,
//! and rotating opaque refresh tokens, served over a small JSON API.
//!
//! Warden can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `warden-server` binary
//! 2. **As a library** - Embed the services behind your own transport
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use warden::{AppState, TursoClient, WardenConfig};
//! use std::sync::Arc;
//!
//! let config = WardenConfig::load("warden.toml")?;
//! let db = Arc::new(TursoClient::new_memory().await?);
//! let state = AppState::new(Arc::new(config), db.clone(), db)?;
//!
//! let user = state.credentials.register("alice", "alice@x.com", "secret1").await?;
//! let tokens = state.credentials.login("alice", "secret1").await?;
//! let rotated = state.sessions.rotate(&tokens.refresh_token).await?;
//! state.sessions.logout(&rotated.refresh_token).await?;
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `local-db` | Local SQLite database (default) |
//! | `turso` | Remote Turso database |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - Password hashing, tokens, registration/login and rotation
//! - [`cli`] - Command-line interface for the server binary
//! - [`db`] - Store contracts and the libsql implementation
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration loading

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Credential and token lifecycle.
pub mod auth;
/// Command-line interface.
pub mod cli;
/// Database clients (Turso/SQLite).
pub mod db;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use auth::{CredentialService, PasswordHasher, SessionRotator, TokenCodec};
pub use db::{CredentialStore, DatabaseProvider, RefreshTokenStore, TursoClient};
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigError, WardenConfig};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML-based infrastructure configuration
    pub config: Arc<WardenConfig>,
    /// Registration, login and profile lookup
    pub credentials: Arc<CredentialService>,
    /// Refresh token rotation and revocation
    pub sessions: Arc<SessionRotator>,
    /// Access token codec, shared with the auth middleware
    pub codec: Arc<TokenCodec>,
}

impl AppState {
    /// Wires the services on top of the given stores, reading the signing
    /// secret and token lifetimes from `config`.
    pub fn new(
        config: Arc<WardenConfig>,
        credential_store: Arc<dyn CredentialStore>,
        token_store: Arc<dyn RefreshTokenStore>,
    ) -> std::result::Result<Self, ConfigError> {
        let secret = config.jwt_secret()?;
        Ok(Self::with_secret(
            config,
            credential_store,
            token_store,
            secret.as_bytes(),
        ))
    }

    /// Like [`AppState::new`] with an explicitly supplied signing secret.
    pub fn with_secret(
        config: Arc<WardenConfig>,
        credential_store: Arc<dyn CredentialStore>,
        token_store: Arc<dyn RefreshTokenStore>,
        secret: &[u8],
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(secret, config.access_ttl()));
        let sessions = Arc::new(SessionRotator::new(
            token_store,
            credential_store.clone(),
            codec.clone(),
            config.refresh_ttl(),
        ));
        let credentials = Arc::new(CredentialService::new(
            credential_store,
            PasswordHasher::new(),
            sessions.clone(),
        ));

        Self {
            config,
            credentials,
            sessions,
            codec,
        }
    }
}
