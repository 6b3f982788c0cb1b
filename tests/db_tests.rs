//! Database integration tests
//!
//! These tests verify the TursoClient store contracts using in-memory SQLite.

mod common;

use chrono::{Duration, Utc};
use std::sync::Arc;
use tempfile::TempDir;
use warden::db::{CredentialStore, RefreshTokenStore, TursoClient};
use warden::types::{AppError, Credential, RefreshTokenRecord};

fn credential(id: &str, username: &str, email: &str) -> Credential {
    let now = Utc::now();
    Credential {
        id: id.to_string(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=65536,t=1,p=4$c2FsdA$aGFzaA".to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn token(id: &str, user_id: &str, hash: &str, expires_in: Duration) -> RefreshTokenRecord {
    let now = Utc::now();
    RefreshTokenRecord {
        id: id.to_string(),
        user_id: user_id.to_string(),
        token_hash: hash.to_string(),
        expires_at: now + expires_in,
        revoked: false,
        created_at: now,
    }
}

async fn client_with_user() -> Arc<TursoClient> {
    let client = common::memory_db().await;
    client
        .create_credential(&credential("user-1", "alice", "alice@x.com"))
        .await
        .expect("Failed to create user");
    client
}

// ============= Connection Tests =============

#[tokio::test]
async fn test_create_memory_client() {
    let client = common::memory_db().await;
    assert!(client.connection().is_ok());
}

#[tokio::test]
async fn test_local_file_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("warden.db");
    let path = path.to_str().unwrap();

    {
        let client = TursoClient::new_local(path)
            .await
            .expect("Failed to create local database");
        client
            .create_credential(&credential("user-1", "alice", "alice@x.com"))
            .await
            .unwrap();
    }

    let reopened = TursoClient::new_local(path).await.unwrap();
    assert!(reopened.exists_username("alice").await.unwrap());
}

#[tokio::test]
async fn test_local_file_uses_wal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("warden.db");
    let client = TursoClient::new_local(path.to_str().unwrap()).await.unwrap();

    let conn = client.connection().unwrap();
    let mut rows = conn.query("PRAGMA journal_mode", ()).await.unwrap();
    let row = rows.next().await.unwrap().expect("one row");
    assert_eq!(row.get::<String>(0).unwrap().to_lowercase(), "wal");
}

async fn file_client_with_user(dir: &TempDir) -> Arc<TursoClient> {
    let path = dir.path().join("warden.db");
    let client = TursoClient::new_local(path.to_str().unwrap())
        .await
        .expect("Failed to create local database");
    client
        .create_credential(&credential("user-1", "alice", "alice@x.com"))
        .await
        .unwrap();
    Arc::new(client)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_file_database_handles_parallel_rotations() {
    const SESSIONS: usize = 50;
    let dir = TempDir::new().unwrap();
    let client = file_client_with_user(&dir).await;

    for i in 0..SESSIONS {
        client
            .create(&token(&format!("rt-{}", i), "user-1", &format!("old-{}", i), Duration::days(7)))
            .await
            .unwrap();
    }

    let handles: Vec<_> = (0..SESSIONS)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move {
                let old = format!("old-{}", i);
                // Reads run outside the write gate, alongside other writers
                let found = client.find_by_hash(&old).await?;
                assert!(found.is_some());
                let replacement = token(
                    &format!("rt-new-{}", i),
                    "user-1",
                    &format!("new-{}", i),
                    Duration::days(7),
                );
                client.rotate(&old, &replacement).await
            })
        })
        .collect();

    for handle in handles {
        let rotated = handle.await.expect("task panicked");
        assert!(rotated.expect("rotation should not hit a locked database"));
    }

    for i in 0..SESSIONS {
        assert!(client.find_by_hash(&format!("old-{}", i)).await.unwrap().is_none());
        assert!(client.find_by_hash(&format!("new-{}", i)).await.unwrap().is_some());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_file_database_same_token_race_has_one_winner() {
    const CONTENDERS: usize = 20;
    let dir = TempDir::new().unwrap();
    let client = file_client_with_user(&dir).await;
    client
        .create(&token("rt-1", "user-1", "contested", Duration::days(7)))
        .await
        .unwrap();

    let handles: Vec<_> = (0..CONTENDERS)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move {
                let replacement = token(
                    &format!("rt-new-{}", i),
                    "user-1",
                    &format!("new-{}", i),
                    Duration::days(7),
                );
                client.rotate("contested", &replacement).await
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().expect("no storage error") {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

// ============= Credential Tests =============

#[tokio::test]
async fn test_create_and_find_credential() {
    let client = client_with_user().await;

    let by_name = client
        .find_by_username("alice")
        .await
        .unwrap()
        .expect("user should exist");
    assert_eq!(by_name.id, "user-1");
    assert_eq!(by_name.email, "alice@x.com");

    let by_id = client.find_by_id("user-1").await.unwrap().unwrap();
    assert_eq!(by_id.username, "alice");
    assert_eq!(by_id.password_hash, by_name.password_hash);

    assert!(client.find_by_username("bob").await.unwrap().is_none());
    assert!(client.find_by_id("user-2").await.unwrap().is_none());
}

#[tokio::test]
async fn test_existence_checks() {
    let client = client_with_user().await;

    assert!(client.exists_username("alice").await.unwrap());
    assert!(!client.exists_username("Alice").await.unwrap());
    assert!(client.exists_email("alice@x.com").await.unwrap());
    assert!(!client.exists_email("bob@x.com").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_username_rejected_by_schema() {
    let client = client_with_user().await;

    let err = client
        .create_credential(&credential("user-2", "alice", "other@x.com"))
        .await
        .unwrap_err();

    match err {
        AppError::AlreadyExists(msg) => assert_eq!(msg, "Username already exists"),
        other => panic!("Expected AlreadyExists, got {:?}", other),
    }
}

#[tokio::test]
async fn test_duplicate_email_rejected_by_schema() {
    let client = client_with_user().await;

    let err = client
        .create_credential(&credential("user-2", "alice2", "alice@x.com"))
        .await
        .unwrap_err();

    match err {
        AppError::AlreadyExists(msg) => assert_eq!(msg, "Email already exists"),
        other => panic!("Expected AlreadyExists, got {:?}", other),
    }
}

// ============= Refresh Token Tests =============

#[tokio::test]
async fn test_create_and_find_refresh_token() {
    let client = client_with_user().await;
    let record = token("rt-1", "user-1", "hash-1", Duration::days(7));

    client.create(&record).await.unwrap();

    let found = client.find_by_hash("hash-1").await.unwrap().unwrap();
    assert_eq!(found.id, "rt-1");
    assert_eq!(found.user_id, "user-1");
    assert!(!found.revoked);
    assert_eq!(found.expires_at.timestamp(), record.expires_at.timestamp());
}

#[tokio::test]
async fn test_duplicate_token_hash_rejected() {
    let client = client_with_user().await;
    client
        .create(&token("rt-1", "user-1", "hash-1", Duration::days(7)))
        .await
        .unwrap();

    let result = client
        .create(&token("rt-2", "user-1", "hash-1", Duration::days(7)))
        .await;
    assert!(matches!(result, Err(AppError::Database(_))));
}

#[tokio::test]
async fn test_revoked_tokens_are_not_found() {
    let client = client_with_user().await;
    client
        .create(&token("rt-1", "user-1", "hash-1", Duration::days(7)))
        .await
        .unwrap();

    assert!(client.revoke_by_hash("hash-1").await.unwrap());
    assert!(client.find_by_hash("hash-1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let client = client_with_user().await;
    client
        .create(&token("rt-1", "user-1", "hash-1", Duration::days(7)))
        .await
        .unwrap();

    assert!(client.revoke_by_hash("hash-1").await.unwrap());
    assert!(!client.revoke_by_hash("hash-1").await.unwrap());
    assert!(!client.revoke_by_hash("never-stored").await.unwrap());
}

#[tokio::test]
async fn test_expired_tokens_are_still_found() {
    let client = client_with_user().await;
    client
        .create(&token("rt-1", "user-1", "hash-1", Duration::minutes(-5)))
        .await
        .unwrap();

    // Expiry is judged by the caller; only revocation hides a row.
    let found = client.find_by_hash("hash-1").await.unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn test_transactional_rotate() {
    let client = client_with_user().await;
    client
        .create(&token("rt-1", "user-1", "old", Duration::days(7)))
        .await
        .unwrap();

    let replacement = token("rt-2", "user-1", "new", Duration::days(7));
    assert!(client.rotate("old", &replacement).await.unwrap());

    assert!(client.find_by_hash("old").await.unwrap().is_none());
    assert!(client.find_by_hash("new").await.unwrap().is_some());
}

#[tokio::test]
async fn test_rotate_of_retired_token_inserts_nothing() {
    let client = client_with_user().await;
    client
        .create(&token("rt-1", "user-1", "old", Duration::days(7)))
        .await
        .unwrap();
    client.revoke_by_hash("old").await.unwrap();

    let replacement = token("rt-2", "user-1", "new", Duration::days(7));
    assert!(!client.rotate("old", &replacement).await.unwrap());
    assert!(client.find_by_hash("new").await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_rotate_rolls_back_revocation() {
    let client = client_with_user().await;
    client
        .create(&token("rt-1", "user-1", "old", Duration::days(7)))
        .await
        .unwrap();
    client
        .create(&token("rt-2", "user-1", "taken", Duration::days(7)))
        .await
        .unwrap();

    // Replacement collides on the unique token_hash, so the insert fails
    let replacement = token("rt-3", "user-1", "taken", Duration::days(7));
    assert!(client.rotate("old", &replacement).await.is_err());

    // The old token must still be active
    assert!(client.find_by_hash("old").await.unwrap().is_some());
}

#[tokio::test]
async fn test_revoke_all_for_user() {
    let client = client_with_user().await;
    client
        .create_credential(&credential("user-2", "bob", "bob@x.com"))
        .await
        .unwrap();

    for (id, hash) in [("rt-1", "a"), ("rt-2", "b"), ("rt-3", "c")] {
        client
            .create(&token(id, "user-1", hash, Duration::days(7)))
            .await
            .unwrap();
    }
    client
        .create(&token("rt-4", "user-2", "d", Duration::days(7)))
        .await
        .unwrap();
    client.revoke_by_hash("c").await.unwrap();

    assert_eq!(client.revoke_all_for_user("user-1").await.unwrap(), 2);
    assert_eq!(client.revoke_all_for_user("user-1").await.unwrap(), 0);

    // Other users are untouched
    assert!(client.find_by_hash("d").await.unwrap().is_some());
}

#[tokio::test]
async fn test_purge_stale() {
    let client = client_with_user().await;
    client
        .create(&token("rt-active", "user-1", "active", Duration::days(7)))
        .await
        .unwrap();
    client
        .create(&token("rt-expired", "user-1", "expired", Duration::minutes(-1)))
        .await
        .unwrap();
    client
        .create(&token("rt-revoked", "user-1", "revoked", Duration::days(7)))
        .await
        .unwrap();
    client.revoke_by_hash("revoked").await.unwrap();

    assert_eq!(client.purge_stale(Utc::now()).await.unwrap(), 2);
    assert!(client.find_by_hash("active").await.unwrap().is_some());
    assert!(client.find_by_hash("expired").await.unwrap().is_none());

    assert_eq!(client.purge_stale(Utc::now()).await.unwrap(), 0);
}
