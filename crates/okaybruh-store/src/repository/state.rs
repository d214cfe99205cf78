//! # State Repository
//!
//! The local store's three collections, each kept as one JSON document in
//! the `collections` table.
//!
//! ## Keys
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  key                  value (JSON)                    missing key means │
//! │  ───────────────────  ──────────────────────────────  ───────────────── │
//! │  products             [Product, ...]                  default catalog   │
//! │  orders               {orders: [...], next_id}        empty ledger      │
//! │  cart:<session id>    {lines: [...], next_line_id}    empty cart        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Checkout Atomicity
//! Placing an order writes the ledger and the emptied cart in a single
//! transaction via [`StateRepository::save_all`]: both land or neither does.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;
use okaybruh_core::SessionId;

/// Key of the product catalog document.
pub const PRODUCTS_KEY: &str = "products";

/// Key of the order ledger document.
pub const ORDERS_KEY: &str = "orders";

/// Key of a session's cart document.
pub fn cart_key(session: &SessionId) -> String {
    format!("cart:{}", session)
}

/// Repository for keyed JSON collections.
#[derive(Debug, Clone)]
pub struct StateRepository {
    pool: SqlitePool,
}

impl StateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StateRepository { pool }
    }

    /// Reads and decodes the document under `key`.
    ///
    /// ## Returns
    /// * `Ok(Some(value))` - Document present
    /// * `Ok(None)` - Key absent (caller picks the default)
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let raw: Option<String> = sqlx::query_scalar("SELECT value FROM collections WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match raw {
            Some(json) => {
                debug!(key = %key, bytes = json.len(), "Loaded collection");
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    /// Encodes `value` and stores it under `key`, replacing what was there.
    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let json = serde_json::to_string(value)?;

        sqlx::query(
            r#"
            INSERT INTO collections (key, value, updated_at)
            VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(&json)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = json.len(), "Saved collection");
        Ok(())
    }

    /// Stores several already-encoded documents in one transaction.
    pub async fn save_all(&self, entries: &[(String, serde_json::Value)]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for (key, value) in entries {
            let json = serde_json::to_string(value)?;
            sqlx::query(
                r#"
                INSERT INTO collections (key, value, updated_at)
                VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(&json)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(count = entries.len(), "Saved collections in one transaction");
        Ok(())
    }

    /// Removes the document under `key`. Removing an absent key is a no-op.
    pub async fn remove(&self, key: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM collections WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use okaybruh_core::Catalog;

    async fn repo() -> StateRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().state()
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let repo = repo().await;
        let products: Option<Catalog> = repo.load(PRODUCTS_KEY).await.unwrap();
        assert!(products.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_replaces() {
        let repo = repo().await;
        let mut catalog = Catalog::with_defaults();
        repo.save(PRODUCTS_KEY, &catalog).await.unwrap();

        catalog.delete(1).unwrap();
        repo.save(PRODUCTS_KEY, &catalog).await.unwrap();

        let loaded: Catalog = repo.load(PRODUCTS_KEY).await.unwrap().unwrap();
        assert_eq!(loaded, catalog);
    }

    #[tokio::test]
    async fn test_save_all_and_remove() {
        let repo = repo().await;
        let session = SessionId::parse("session_1_abc").unwrap();
        let entries = vec![
            (ORDERS_KEY.to_string(), serde_json::json!({"orders": [], "next_id": 4})),
            (cart_key(&session), serde_json::json!({"lines": []})),
        ];
        repo.save_all(&entries).await.unwrap();

        let cart: Option<serde_json::Value> = repo.load(&cart_key(&session)).await.unwrap();
        assert!(cart.is_some());

        assert!(repo.remove(&cart_key(&session)).await.unwrap());
        assert!(!repo.remove(&cart_key(&session)).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_serialization_error() {
        let repo = repo().await;
        repo.save(ORDERS_KEY, &"not a ledger").await.unwrap();

        let result: StoreResult<Option<okaybruh_core::OrderLedger>> = repo.load(ORDERS_KEY).await;
        assert!(matches!(
            result,
            Err(crate::error::StoreError::Serialization(_))
        ));
    }
}
