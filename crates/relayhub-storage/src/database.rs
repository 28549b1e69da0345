// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use relayhub_core::HubError;
use tracing::{debug, info};

use crate::migrations;

/// Convert a tokio-rusqlite error into `HubError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> HubError {
    HubError::Storage {
        source: Box::new(e),
    }
}

/// The process-wide SQLite handle.
///
/// Wraps a single `tokio_rusqlite::Connection`: one background thread owns
/// the underlying `rusqlite::Connection` and serializes every closure passed
/// to [`Database::connection`]`.call()`. Acquired once at startup, shared via
/// `Arc`, and safe for concurrent use by any number of in-flight requests.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` with WAL mode enabled and run
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, HubError> {
        Self::open_with(path, true).await
    }

    /// Open (or create) the database at `path`, controlling WAL mode.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, HubError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(HubError::storage)?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| HubError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        // Run migrations through the same serialized connection. refinery
        // tracks applied migrations in its own history table.
        let migration_result: Result<(), HubError> = conn
            .call(|conn| -> Result<Result<(), HubError>, rusqlite::Error> {
                Ok(migrations::run_migrations(conn))
            })
            .await
            .map_err(map_tr_err)?;
        migration_result?;

        info!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Open a database using the configured storage settings.
    pub async fn open_with_config(
        config: &relayhub_config::model::StorageConfig,
    ) -> Result<Self, HubError> {
        Self::open_with(&config.database_path, config.wal_mode).await
    }

    /// The underlying serialized connection. Query modules call through this.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the database, flushing pending work on the background thread.
    pub async fn close(self) -> Result<(), HubError> {
        debug!("closing database");
        self.conn.close().await.map_err(|e| HubError::Storage {
            source: Box::new(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_schema_and_reopens() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("hub.db");
        let path = db_path.to_str().unwrap();

        let db = Database::open(path).await.unwrap();
        // Schema exists: a query against a migrated table succeeds.
        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                Ok(conn.query_row("SELECT COUNT(*) FROM conversations", [], |r| r.get(0))?)
            })
            .await
            .unwrap();
        assert_eq!(count, 0);
        db.close().await.unwrap();

        // Re-opening runs no duplicate migrations.
        let db = Database::open(path).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b/hub.db");
        let db = Database::open(nested.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
        assert!(nested.exists());
    }
}
