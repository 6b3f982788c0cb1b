//! TOML-based configuration for Warden
//!
//! Infrastructure settings (server, auth, database, cleanup) are read from
//! `warden.toml`. Secrets are never written to the file: it names the
//! environment variables that hold them.

use crate::db::DatabaseProvider;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Minimum accepted length of the HS256 signing secret, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime, in seconds (10 years).
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Root configuration structure loaded from warden.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WardenConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the JWT secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    /// Access token lifetime in seconds
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl: i64,

    /// Refresh token lifetime in seconds
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl: i64,
}

fn default_jwt_secret_env() -> String {
    "JWT_SECRET".to_string()
}

fn default_access_token_ttl() -> i64 {
    900
}

fn default_refresh_token_ttl() -> i64 {
    604800
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            access_token_ttl: default_access_token_ttl(),
            refresh_token_ttl: default_refresh_token_ttl(),
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Local database path, or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Environment variable for Turso URL (optional cloud config)
    pub turso_url_env: Option<String>,

    /// Environment variable for Turso auth token
    pub turso_token_env: Option<String>,
}

fn default_database_url() -> String {
    "./data/warden.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            turso_url_env: None,
            turso_token_env: None,
        }
    }
}

// ============= Cleanup Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Seconds between stale refresh-token sweeps; 0 disables the sweep
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

fn default_purge_interval() -> u64 {
    3600
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            purge_interval_secs: default_purge_interval(),
        }
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl WardenConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// A missing signing secret is a startup error: the server cannot issue
    /// or validate tokens without it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: WardenConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secret = self.jwt_secret()?;
        if secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::ValidationError(format!(
                "JWT secret in '{}' must be at least {} bytes",
                self.auth.jwt_secret_env, MIN_JWT_SECRET_LEN
            )));
        }

        if self.auth.access_token_ttl <= 0 || self.auth.refresh_token_ttl <= 0 {
            return Err(ConfigError::ValidationError(
                "Token lifetimes must be positive".to_string(),
            ));
        }
        if self.auth.access_token_ttl > MAX_TOKEN_TTL_SECS
            || self.auth.refresh_token_ttl > MAX_TOKEN_TTL_SECS
        {
            return Err(ConfigError::ValidationError(format!(
                "Token lifetimes must not exceed {} seconds",
                MAX_TOKEN_TTL_SECS
            )));
        }
        if self.auth.access_token_ttl >= self.auth.refresh_token_ttl {
            return Err(ConfigError::ValidationError(
                "access_token_ttl must be shorter than refresh_token_ttl".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }
        if !matches!(self.server.log_format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(format!(
                "Unknown log_format '{}', expected 'pretty' or 'json'",
                self.server.log_format
            )));
        }

        // Turso settings come in pairs
        if let Some(ref env) = self.database.turso_url_env {
            self.validate_env_var(env)?;
            match self.database.turso_token_env {
                Some(ref token_env) => self.validate_env_var(token_env)?,
                None => {
                    return Err(ConfigError::ValidationError(
                        "turso_url_env requires turso_token_env".to_string(),
                    ))
                }
            }
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        self.resolve_env(name)
            .map(|_| ())
            .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.is_empty())
    }

    /// Get the JWT secret from the environment
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.auth.jwt_secret_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.auth.jwt_secret_env.clone()))
    }

    /// Out-of-range values saturate; `validate` rejects them before use.
    pub fn access_ttl(&self) -> chrono::Duration {
        ttl_from_secs(self.auth.access_token_ttl)
    }

    pub fn refresh_ttl(&self) -> chrono::Duration {
        ttl_from_secs(self.auth.refresh_token_ttl)
    }

    /// Socket address string for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Resolve which database backend to open.
    pub fn database_provider(&self) -> Result<DatabaseProvider, ConfigError> {
        if let Some(provider) = self.turso_provider()? {
            return Ok(provider);
        }
        Ok(DatabaseProvider::from_url(&self.database.url))
    }

    #[cfg(feature = "turso")]
    fn turso_provider(&self) -> Result<Option<DatabaseProvider>, ConfigError> {
        let (Some(url_env), Some(token_env)) = (
            self.database.turso_url_env.as_ref(),
            self.database.turso_token_env.as_ref(),
        ) else {
            return Ok(None);
        };

        let url = self
            .resolve_env(url_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(url_env.clone()))?;
        let auth_token = self
            .resolve_env(token_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(token_env.clone()))?;

        Ok(Some(DatabaseProvider::Turso { url, auth_token }))
    }

    #[cfg(not(feature = "turso"))]
    fn turso_provider(&self) -> Result<Option<DatabaseProvider>, ConfigError> {
        if self.database.turso_url_env.is_some() {
            tracing::warn!("turso_url_env is set but the `turso` feature is disabled; using local database");
        }
        Ok(None)
    }
}

fn ttl_from_secs(secs: i64) -> chrono::Duration {
    chrono::Duration::try_seconds(secs).unwrap_or(if secs < 0 {
        chrono::Duration::MIN
    } else {
        chrono::Duration::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET_ENV: &str = "WARDEN_TEST_JWT_SECRET";

    fn set_secret(name: &str, value: &str) {
        std::env::set_var(name, value);
    }

    fn create_test_config(secret_env: &str) -> String {
        format!(
            r#"
[server]
host = "0.0.0.0"
port = 9090
log_level = "debug"
log_format = "json"

[auth]
jwt_secret_env = "{}"
access_token_ttl = 600
refresh_token_ttl = 86400

[database]
url = ":memory:"

[cleanup]
purge_interval_secs = 60
"#,
            secret_env
        )
    }

    #[test]
    fn test_parse_config() {
        set_secret(SECRET_ENV, "test-secret-at-least-32-characters-long");

        let config: WardenConfig =
            toml::from_str(&create_test_config(SECRET_ENV)).expect("Failed to parse config");

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.log_format, "json");
        assert_eq!(config.access_ttl(), chrono::Duration::seconds(600));
        assert_eq!(config.refresh_ttl(), chrono::Duration::days(1));
        assert_eq!(config.cleanup.purge_interval_secs, 60);
        assert_eq!(config.bind_addr(), "0.0.0.0:9090");
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.database_provider().unwrap(),
            DatabaseProvider::Memory
        ));
    }

    #[test]
    fn test_defaults_for_empty_file() {
        let config: WardenConfig = toml::from_str("").unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.jwt_secret_env, "JWT_SECRET");
        assert_eq!(config.auth.access_token_ttl, 900);
        assert_eq!(config.auth.refresh_token_ttl, 604800);
        assert_eq!(config.database.url, "./data/warden.db");
        assert_eq!(config.cleanup.purge_interval_secs, 3600);
    }

    #[test]
    fn test_missing_secret_env() {
        let config: WardenConfig =
            toml::from_str(&create_test_config("WARDEN_TEST_SECRET_NEVER_SET")).unwrap();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingEnvVar(name)) if name == "WARDEN_TEST_SECRET_NEVER_SET"
        ));
    }

    #[test]
    fn test_short_secret_rejected() {
        set_secret("WARDEN_TEST_SHORT_SECRET", "too-short");
        let config: WardenConfig =
            toml::from_str(&create_test_config("WARDEN_TEST_SHORT_SECRET")).unwrap();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        set_secret("WARDEN_TEST_HUGE_TTL_SECRET", "test-secret-at-least-32-characters-long");
        let content = r#"
[auth]
jwt_secret_env = "WARDEN_TEST_HUGE_TTL_SECRET"
access_token_ttl = 900
refresh_token_ttl = 9000000000000
"#;
        let config: WardenConfig = toml::from_str(content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(msg)) if msg.contains("must not exceed")
        ));

        // Converting the rejected value must not panic either
        assert_eq!(config.refresh_ttl(), chrono::Duration::MAX);
    }

    #[test]
    fn test_ttl_at_limit_accepted() {
        set_secret("WARDEN_TEST_MAX_TTL_SECRET", "test-secret-at-least-32-characters-long");
        let content = format!(
            "[auth]\njwt_secret_env = \"WARDEN_TEST_MAX_TTL_SECRET\"\nrefresh_token_ttl = {}\n",
            MAX_TOKEN_TTL_SECS
        );
        let config: WardenConfig = toml::from_str(&content).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ttl_ordering_enforced() {
        set_secret("WARDEN_TEST_TTL_SECRET", "test-secret-at-least-32-characters-long");
        let content = r#"
[auth]
jwt_secret_env = "WARDEN_TEST_TTL_SECRET"
access_token_ttl = 3600
refresh_token_ttl = 60
"#;
        let config: WardenConfig = toml::from_str(content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = WardenConfig::load("/nonexistent/warden.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        set_secret("WARDEN_TEST_FILE_SECRET", "test-secret-at-least-32-characters-long");
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("warden.toml");
        fs::write(&path, create_test_config("WARDEN_TEST_FILE_SECRET")).unwrap();

        let config = WardenConfig::load(&path).expect("should load");
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("warden.toml");
        fs::write(&path, "[server\nport = ").unwrap();

        assert!(matches!(
            WardenConfig::load(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
