//! # Local Store Connection
//!
//! Opens the SQLite file behind demo mode and hands out the collection
//! repository.
//!
//! ## Opening Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig::new("~/.local/share/okaybruh-shop/okaybruh.db")              │
//! │       │                                                                 │
//! │       ├── Location::File ──► mkdir -p parent, WAL journal, create file  │
//! │       └── Location::Memory ► one pinned connection (tests)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqlitePool  ──►  embedded migrations (001_local_state.sql)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::state() ──► StateRepository                                  │
//! │                        products │ orders │ cart:<session>               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A report reading the ledger never waits on a cart write: file databases
//! run in WAL mode.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::repository::state::StateRepository;

/// Where the local store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    /// Private to the process; gone when the pool closes.
    Memory,
}

/// Settings for opening the local store.
///
/// ```rust,ignore
/// let db = Database::new(DbConfig::new(data_dir.join("okaybruh.db"))).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: Location,

    /// Pool size. A single shopper rarely needs more than a couple.
    pub max_connections: u32,

    /// How long to wait for a free connection.
    pub acquire_timeout: Duration,

    /// Apply pending migrations while opening.
    pub run_migrations: bool,
}

impl DbConfig {
    /// A store kept in the file at `path`, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: Location::File(path.into()),
            max_connections: 4,
            acquire_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// A throwaway store for tests.
    pub fn in_memory() -> Self {
        DbConfig {
            location: Location::Memory,
            // every pooled connection would otherwise see its own empty db
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.location == Location::Memory
    }

    fn connect_options(&self) -> StoreResult<SqliteConnectOptions> {
        match &self.location {
            Location::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::ConnectionFailed(e.to_string())),
            Location::File(path) => {
                ensure_parent_dir(path)?;
                Ok(SqliteConnectOptions::new()
                    .filename(path)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal)
                    .create_if_missing(true))
            }
        }
    }
}

fn ensure_parent_dir(path: &Path) -> StoreResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| {
                StoreError::ConnectionFailed(format!("cannot create {}: {}", parent.display(), e))
            }),
        _ => Ok(()),
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the opened local store. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the store described by `config`.
    pub async fn new(config: DbConfig) -> StoreResult<Self> {
        info!(location = ?config.location, "Opening local store");

        let options = config.connect_options()?;
        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);

        if config.is_in_memory() {
            // Dropping the only connection would drop the database with it
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
        debug!(max_connections = config.max_connections, "Local store pool ready");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    /// Brings the schema up to date. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The keyed-collection repository over this store.
    pub fn state(&self) -> StateRepository {
        StateRepository::new(self.pool.clone())
    }

    /// Closes every connection. Later calls fail with a storage error.
    pub async fn close(&self) {
        debug!("Closing local store");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_closed_store_refuses_reads() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        let result: StoreResult<Option<serde_json::Value>> = db.state().load("products").await;
        assert!(matches!(result, Err(StoreError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_dir() {
        let dir = std::env::temp_dir().join(format!("okaybruh-pool-{}", std::process::id()));
        let path = dir.join("nested").join("okaybruh.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert!(path.exists());
        db.close().await;

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/okaybruh.db")
            .max_connections(0)
            .run_migrations(false);

        assert_eq!(config.max_connections, 1);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }
}
