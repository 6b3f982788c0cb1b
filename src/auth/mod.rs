//! Credential and token lifecycle
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - Argon2id password hashing
//! - [`auth::jwt`](crate::auth::jwt) - HS256 access token issue/validation
//! - [`auth::refresh`](crate::auth::refresh) - Refresh token values and their digest
//! - [`auth::credentials`](crate::auth::credentials) - Registration and login
//! - [`auth::sessions`](crate::auth::sessions) - Refresh token rotation and revocation
//! - [`auth::middleware`](crate::auth::middleware) - Axum layer and extractor for protected routes
//!
//! # Security Features
//!
//! - **Password Hashing**: Argon2id (memory-hard), PHC-encoded with a random salt
//! - **Access Tokens**: short-lived HS256 JWTs; only HS256 is accepted
//! - **Refresh Tokens**: opaque random values, stored only as SHA-256 digests and
//!   rotated on every use
//!
//! # Usage
//!
//! ```ignore
//! use warden::auth::middleware::{auth_middleware, AuthUser};
//!
//! let protected = Router::new()
//!     .route("/me", get(handler))
//!     .layer(middleware::from_fn_with_state(codec.clone(), auth_middleware));
//!
//! async fn handler(AuthUser(claims): AuthUser) -> String {
//!     format!("Hello, {}!", claims.username)
//! }
//! ```

/// Registration, login and profile lookup.
pub mod credentials;
/// Access token claims, signing and validation.
pub mod jwt;
/// Authentication middleware and extractors for protected routes.
pub mod middleware;
/// Argon2id password hashing.
pub mod password;
pub mod refresh;
/// Refresh token state machine.
pub mod sessions;

pub use credentials::CredentialService;
pub use jwt::{AccessClaims, TokenCodec, TokenError};
pub use password::{PasswordError, PasswordHasher};
pub use sessions::SessionRotator;
