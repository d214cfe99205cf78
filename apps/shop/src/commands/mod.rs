//! # Commands Module
//!
//! One async function per user action. Each takes the [`Shop`] it runs
//! against and returns a serializable response or an [`ApiError`].
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cli.rs  ──►  commands::cart::add_to_cart(&shop, 1, "2")                │
//! │                    │                                                    │
//! │                    ├─► parse + validate input      (okaybruh-core)      │
//! │                    ├─► shop.backend().add_to_cart  (okaybruh-store)     │
//! │                    └─► re-read cart → CartResponse                      │
//! │                                                                         │
//! │  render.rs turns the response into text (or --json prints it as-is)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`Shop`]: crate::state::Shop
//! [`ApiError`]: crate::error::ApiError

pub mod cart;
pub mod order;
pub mod product;
pub mod report;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use okaybruh_core::SessionId;
    use okaybruh_store::{Database, DbConfig, LocalBackend, OfflinePaymentCodes};

    use crate::state::{Shop, ShopConfig};

    /// A shop over a fresh in-memory local store.
    pub async fn shop() -> Shop {
        shop_with_session("session_1714550400000_test00001").await
    }

    pub async fn shop_with_session(session: &str) -> Shop {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        shop_over(db, ShopConfig::default(), session)
    }

    /// A shop over an existing store, e.g. to reopen it with other settings.
    pub fn shop_over(db: Database, config: ShopConfig, session: &str) -> Shop {
        Shop::with_backend(
            config,
            Arc::new(LocalBackend::new(db)),
            Arc::new(OfflinePaymentCodes::new("Okaybruh Shop")),
            SessionId::parse(session).unwrap(),
        )
    }
}
