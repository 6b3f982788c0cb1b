//! Init command implementation
//!
//! Scaffolds a Warden project: `warden.toml`, `.env.example`, `.gitignore`
//! and the `data/` directory.

use super::output::Output;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (warden.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing Warden Project");

    let base_path = &config.path;

    let config_path = base_path.join("warden.toml");
    if config_path.exists() && !config.force {
        output.warning("warden.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    let data_dir = base_path.join("data");
    if data_dir.exists() {
        output.skipped("data", "already exists");
    } else if let Err(e) = fs::create_dir_all(&data_dir) {
        output.error(&format!("Failed to create data: {}", e));
        return InitResult::Error(e.to_string());
    } else {
        output.created("directory", "data");
    }

    if let Err(e) = write_file(&config_path, &generate_warden_toml(&config), config.force) {
        output.error(&format!("Failed to create warden.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "warden.toml");

    let env_example_path = base_path.join(".env.example");
    if let Err(e) = write_file(&env_example_path, &generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("env", ".env.example");

    let gitignore_path = base_path.join(".gitignore");
    if !gitignore_path.exists() {
        if let Err(e) = write_file(&gitignore_path, &generate_gitignore(), false) {
            output.warning(&format!("Failed to create .gitignore: {}", e));
        } else {
            output.created("file", ".gitignore");
        }
    }

    output.header("Next Steps");
    output.newline();
    output.info("1. Set up environment variables:");
    output.command("cp .env.example .env");
    output.command("# Edit .env and set JWT_SECRET (min 32 bytes)");
    output.newline();
    output.info("2. Start the server:");
    output.command("warden-server");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_warden_toml(config: &InitConfig) -> String {
    format!(
        r#"# Warden configuration
# Secrets are read from the environment variables named here, never from this file.

[server]
host = "{host}"
port = {port}
log_level = "info"
# "pretty" or "json"
log_format = "pretty"

[auth]
jwt_secret_env = "JWT_SECRET"
# Access token lifetime (seconds)
access_token_ttl = 900
# Refresh token lifetime (seconds)
refresh_token_ttl = 604800

[database]
# Local SQLite file, or ":memory:" for an ephemeral database
url = "./data/warden.db"
# Remote Turso (requires the `turso` feature)
# turso_url_env = "TURSO_URL"
# turso_token_env = "TURSO_AUTH_TOKEN"

[cleanup]
# Seconds between sweeps of expired/revoked refresh tokens (0 disables)
purge_interval_secs = 3600
"#,
        host = config.host,
        port = config.port
    )
}

fn generate_env_example() -> String {
    r#"# HS256 signing secret for access tokens (at least 32 bytes)
JWT_SECRET=change-me-to-a-long-random-value-of-32-plus-bytes

# Log filter override, e.g. warden=debug,tower_http=info
# RUST_LOG=info

# Remote Turso database
# TURSO_URL=libsql://your-db.turso.io
# TURSO_AUTH_TOKEN=
"#
    .to_string()
}

fn generate_gitignore() -> String {
    r#"# Warden Generated Files
/data/
*.db
*.db-journal
*.db-wal
*.db-shm

# Environment
.env
.env.local

# Rust
/target/
"#
    .to_string()
}
