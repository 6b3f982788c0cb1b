use crate::db::traits::{CredentialStore, RefreshTokenStore};
use crate::types::{AppError, Credential, RefreshTokenRecord, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Builder, Connection, Database, Row};
use std::time::Duration;
use tokio::sync::Mutex;

/// How long a connection waits on a locked database file before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backing {
    Memory,
    File,
    #[cfg_attr(not(feature = "turso"), allow(dead_code))]
    Remote,
}

/// libsql-backed store for credentials and refresh tokens.
///
/// Works against an in-memory database, a local SQLite file, or a remote
/// Turso database with the same schema.
pub struct TursoClient {
    db: Database,
    backing: Backing,
    /// Every `connect()` on `:memory:` opens a fresh empty database, so the
    /// in-memory mode keeps one connection for its whole lifetime.
    shared: Option<Connection>,
    /// Serializes writers. SQLite has a single writer and the in-memory
    /// mode shares one connection between all callers.
    write_gate: Mutex<()>,
}

impl TursoClient {
    /// Remote Turso database.
    #[cfg(feature = "turso")]
    pub async fn new_remote(url: String, auth_token: String) -> Result<Self> {
        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Turso: {}", e)))?;

        Self::open(db, Backing::Remote).await
    }

    /// Local SQLite file, created if missing.
    pub async fn new_local(path: &str) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Database(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open {}: {}", path, e)))?;

        Self::open(db, Backing::File).await
    }

    /// Ephemeral in-memory database.
    pub async fn new_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open memory database: {}", e)))?;

        Self::open(db, Backing::Memory).await
    }

    async fn open(db: Database, backing: Backing) -> Result<Self> {
        let shared = if backing == Backing::Memory {
            Some(
                db.connect()
                    .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?,
            )
        } else {
            None
        };

        let client = Self {
            db,
            backing,
            shared,
            write_gate: Mutex::new(()),
        };
        client.initialize_schema().await?;

        Ok(client)
    }

    /// A connection to the database. File-backed connections wait up to
    /// [`BUSY_TIMEOUT`] for a lock held by another connection.
    pub fn connection(&self) -> Result<Connection> {
        if let Some(conn) = &self.shared {
            return Ok(conn.clone());
        }

        let conn = self
            .db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| AppError::Database(format!("Failed to set busy timeout: {}", e)))?;

        Ok(conn)
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        // WAL lets readers proceed while the single writer holds the lock.
        if self.backing == Backing::File {
            let mut rows = conn
                .query("PRAGMA journal_mode = WAL", ())
                .await
                .map_err(|e| AppError::Database(format!("Failed to enable WAL: {}", e)))?;
            rows.next()
                .await
                .map_err(|e| AppError::Database(format!("Failed to enable WAL: {}", e)))?;
        }

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS refresh_tokens (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                token_hash TEXT UNIQUE NOT NULL,
                expires_at INTEGER NOT NULL,
                revoked INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create refresh_tokens table: {}", e)))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_refresh_tokens_user_id ON refresh_tokens(user_id)",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create index: {}", e)))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_refresh_tokens_expires_at ON refresh_tokens(expires_at)",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create index: {}", e)))?;

        Ok(())
    }

    async fn exists(&self, sql: &str, value: &str) -> Result<bool> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(sql, [value])
            .await
            .map_err(|e| AppError::Database(format!("Failed to query users: {}", e)))?;

        Ok(rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .is_some())
    }

    async fn find_credential(&self, sql: &str, value: &str) -> Result<Option<Credential>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(sql, [value])
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(credential_from_row(&row)?)),
            None => Ok(None),
        }
    }
}

fn text(row: &Row, idx: i32) -> Result<String> {
    row.get(idx).map_err(|e| AppError::Database(e.to_string()))
}

fn integer(row: &Row, idx: i32) -> Result<i64> {
    row.get(idx).map_err(|e| AppError::Database(e.to_string()))
}

fn timestamp(row: &Row, idx: i32) -> Result<DateTime<Utc>> {
    let secs = integer(row, idx)?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AppError::Database(format!("Invalid timestamp in column {}: {}", idx, secs)))
}

fn credential_from_row(row: &Row) -> Result<Credential> {
    Ok(Credential {
        id: text(row, 0)?,
        username: text(row, 1)?,
        email: text(row, 2)?,
        password_hash: text(row, 3)?,
        created_at: timestamp(row, 4)?,
        updated_at: timestamp(row, 5)?,
    })
}

fn refresh_token_from_row(row: &Row) -> Result<RefreshTokenRecord> {
    Ok(RefreshTokenRecord {
        id: text(row, 0)?,
        user_id: text(row, 1)?,
        token_hash: text(row, 2)?,
        expires_at: timestamp(row, 3)?,
        revoked: integer(row, 4)? != 0,
        created_at: timestamp(row, 5)?,
    })
}

/// Maps a failed `users` insert, turning uniqueness violations into
/// `AlreadyExists` so racing registrations lose cleanly.
fn map_insert_user_error(err: libsql::Error) -> AppError {
    let msg = err.to_string();
    if msg.contains("UNIQUE constraint failed") {
        if msg.contains("users.email") {
            AppError::AlreadyExists("Email already exists".to_string())
        } else {
            AppError::AlreadyExists("Username already exists".to_string())
        }
    } else {
        AppError::Database(format!("Failed to create user: {}", msg))
    }
}

const INSERT_REFRESH_TOKEN: &str =
    "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, revoked, created_at)
     VALUES (?, ?, ?, ?, ?, ?)";

const REVOKE_REFRESH_TOKEN: &str =
    "UPDATE refresh_tokens SET revoked = 1 WHERE token_hash = ? AND revoked = 0";

#[async_trait]
impl CredentialStore for TursoClient {
    async fn exists_username(&self, username: &str) -> Result<bool> {
        self.exists("SELECT 1 FROM users WHERE username = ? LIMIT 1", username)
            .await
    }

    async fn exists_email(&self, email: &str) -> Result<bool> {
        self.exists("SELECT 1 FROM users WHERE email = ? LIMIT 1", email)
            .await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>> {
        self.find_credential(
            "SELECT id, username, email, password_hash, created_at, updated_at
             FROM users WHERE username = ?",
            username,
        )
        .await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Credential>> {
        self.find_credential(
            "SELECT id, username, email, password_hash, created_at, updated_at
             FROM users WHERE id = ?",
            id,
        )
        .await
    }

    async fn create_credential(&self, credential: &Credential) -> Result<()> {
        let _guard = self.write_gate.lock().await;
        let conn = self.connection()?;

        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                credential.id.as_str(),
                credential.username.as_str(),
                credential.email.as_str(),
                credential.password_hash.as_str(),
                credential.created_at.timestamp(),
                credential.updated_at.timestamp(),
            ),
        )
        .await
        .map_err(map_insert_user_error)?;

        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for TursoClient {
    async fn create(&self, record: &RefreshTokenRecord) -> Result<()> {
        let _guard = self.write_gate.lock().await;
        let conn = self.connection()?;

        conn.execute(
            INSERT_REFRESH_TOKEN,
            (
                record.id.as_str(),
                record.user_id.as_str(),
                record.token_hash.as_str(),
                record.expires_at.timestamp(),
                i64::from(record.revoked),
                record.created_at.timestamp(),
            ),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create refresh token: {}", e)))?;

        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, user_id, token_hash, expires_at, revoked, created_at
                 FROM refresh_tokens WHERE token_hash = ? AND revoked = 0",
                [token_hash],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query refresh token: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(refresh_token_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn revoke_by_hash(&self, token_hash: &str) -> Result<bool> {
        let _guard = self.write_gate.lock().await;
        let conn = self.connection()?;

        let affected = conn
            .execute(REVOKE_REFRESH_TOKEN, [token_hash])
            .await
            .map_err(|e| AppError::Database(format!("Failed to revoke refresh token: {}", e)))?;

        Ok(affected > 0)
    }

    async fn rotate(&self, old_hash: &str, replacement: &RefreshTokenRecord) -> Result<bool> {
        let _guard = self.write_gate.lock().await;
        let conn = self.connection()?;

        let tx = conn
            .transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let revoked = tx
            .execute(REVOKE_REFRESH_TOKEN, [old_hash])
            .await
            .map_err(|e| AppError::Database(format!("Failed to revoke refresh token: {}", e)))?;

        if revoked == 0 {
            tx.rollback()
                .await
                .map_err(|e| AppError::Database(format!("Failed to roll back: {}", e)))?;
            return Ok(false);
        }

        let inserted = tx
            .execute(
                INSERT_REFRESH_TOKEN,
                (
                    replacement.id.as_str(),
                    replacement.user_id.as_str(),
                    replacement.token_hash.as_str(),
                    replacement.expires_at.timestamp(),
                    i64::from(replacement.revoked),
                    replacement.created_at.timestamp(),
                ),
            )
            .await;

        if let Err(e) = inserted {
            // The old token stays active when its replacement cannot be stored.
            tx.rollback()
                .await
                .map_err(|e| AppError::Database(format!("Failed to roll back: {}", e)))?;
            return Err(AppError::Database(format!(
                "Failed to create refresh token: {}",
                e
            )));
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit rotation: {}", e)))?;

        Ok(true)
    }

    async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64> {
        let _guard = self.write_gate.lock().await;
        let conn = self.connection()?;

        conn.execute(
            "UPDATE refresh_tokens SET revoked = 1 WHERE user_id = ? AND revoked = 0",
            [user_id],
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to revoke user tokens: {}", e)))
    }

    async fn purge_stale(&self, now: DateTime<Utc>) -> Result<u64> {
        let _guard = self.write_gate.lock().await;
        let conn = self.connection()?;

        conn.execute(
            "DELETE FROM refresh_tokens WHERE revoked = 1 OR expires_at <= ?",
            [now.timestamp()],
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to purge refresh tokens: {}", e)))
    }
}
