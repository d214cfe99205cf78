//! # Schema Migrations
//!
//! The local store's schema ships inside the binary; `Database::new`
//! applies whatever the file has not seen yet.
//!
//! ```text
//! migrations/sqlite/
//! └── 001_local_state.sql   collections(key, value, updated_at)
//! ```
//!
//! Applied files are recorded in `_sqlx_migrations` and must never be
//! edited afterwards; schema changes go in a new `NNN_name.sql`.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::StoreResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies pending migrations in order.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Applying local store migrations");
    MIGRATOR.run(pool).await?;

    let (embedded, applied) = migration_status(pool).await?;
    info!(embedded, applied, "Local store schema is current");
    Ok(())
}

/// `(embedded, applied)` migration counts.
pub async fn migration_status(pool: &SqlitePool) -> StoreResult<(usize, usize)> {
    let embedded = MIGRATOR.migrations.len();

    // No bookkeeping table yet means nothing was applied
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((embedded, applied as usize))
}
