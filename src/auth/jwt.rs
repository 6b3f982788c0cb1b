use crate::types::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// The only signing algorithm accepted. Anything else, `none` included, is
/// rejected during validation.
pub const ACCESS_TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Credential identifier.
    pub sub: String,
    pub username: String,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

impl AccessClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// A freshly signed access token.
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    /// Signature does not match, or the header names a disallowed algorithm.
    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token has expired")]
    Expired,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::InvalidSignature | TokenError::Malformed(_) => AppError::InvalidToken,
            TokenError::Signing(msg) => AppError::Internal(msg),
        }
    }
}

/// Signs and validates short-lived HS256 access tokens.
///
/// Stateless: a token is valid purely by signature and expiry. The secret is
/// injected at construction so distinct instances never share key material.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
}

impl TokenCodec {
    /// Creates a codec.
    ///
    /// # Arguments
    /// * `secret` - HS256 signing key (should be at least 32 bytes)
    /// * `access_ttl` - Access token lifetime
    pub fn new(secret: &[u8], access_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Issues an access token for a credential.
    pub fn issue(&self, subject_id: &str, username: &str) -> Result<IssuedAccessToken, TokenError> {
        let now = Utc::now();
        // Claims carry whole seconds, so the reported expiry does too.
        let expires_at = now
            .checked_add_signed(self.access_ttl)
            .and_then(|at| DateTime::from_timestamp(at.timestamp(), 0))
            .ok_or_else(|| {
                TokenError::Signing(format!("access token lifetime out of range: {}", self.access_ttl))
            })?;

        let claims = AccessClaims {
            sub: subject_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::new(ACCESS_TOKEN_ALGORITHM),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedAccessToken { token, expires_at })
    }

    /// Verifies signature, algorithm and expiry and returns the claims.
    pub fn validate(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let mut validation = Validation::new(ACCESS_TOKEN_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed(e.to_string()),
            })?;

        // jsonwebtoken accepts exp == now; a token is only valid strictly before expiry.
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
