//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod mocks;

use std::sync::Arc;
use warden::utils::toml_config::{DatabaseConfig, WardenConfig};
use warden::{AppState, TursoClient};

/// Signing secret used by every integration test.
pub const TEST_SECRET: &[u8] = b"integration-test-secret-at-least-32-bytes";

/// Default configuration pointing at an in-memory database.
pub fn test_config() -> Arc<WardenConfig> {
    Arc::new(WardenConfig {
        database: DatabaseConfig {
            url: ":memory:".to_string(),
            ..Default::default()
        },
        ..Default::default()
    })
}

/// Fresh in-memory database.
pub async fn memory_db() -> Arc<TursoClient> {
    Arc::new(
        TursoClient::new_memory()
            .await
            .expect("Failed to create in-memory database"),
    )
}

/// Application state over a fresh in-memory database.
pub async fn memory_state() -> (Arc<TursoClient>, AppState) {
    let db = memory_db().await;
    let state = AppState::with_secret(test_config(), db.clone(), db.clone(), TEST_SECRET);
    (db, state)
}
