//! Database clients.
//!
//! - [`traits`] - store contracts the services depend on
//! - [`turso`] - libsql implementation (in-memory, local SQLite file, or remote Turso)

#![allow(missing_docs)]

pub mod traits;
pub mod turso;

pub use traits::{CredentialStore, DatabaseProvider, RefreshTokenStore};
pub use turso::TursoClient;
