//! # State Module
//!
//! The shop's explicit state object and what it is built from.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shop Lifecycle                                  │
//! │                                                                         │
//! │  ShopConfig::load() ──► Shop::open(config, session?)                    │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────┐              │
//! │  │   backend    │  │    payments      │  │   session    │              │
//! │  │              │  │                  │  │              │              │
//! │  │ LocalBackend │  │ Offline codes or │  │ session_id   │              │
//! │  │ RemoteBackend│  │ POST /payment/.. │  │ file         │              │
//! │  └──────────────┘  └──────────────────┘  └──────────────┘              │
//! │                              │                                          │
//! │                    commands take &Shop                                  │
//! │                              │                                          │
//! │                        Shop::close()                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
pub mod session;

pub use config::{BackendMode, ConfigError, ShopConfig, DEFAULT_API_URL};

use std::sync::Arc;

use tracing::info;

use okaybruh_core::{SessionId, TaxRate};
use okaybruh_store::{
    Database, DbConfig, LocalBackend, OfflinePaymentCodes, PaymentCodeProvider, RemoteBackend,
    StoreBackend,
};

use crate::error::ApiError;

/// One shopper's view of the shop: a backend, a payment-code provider and
/// the session that scopes the cart.
pub struct Shop {
    config: ShopConfig,
    backend: Arc<dyn StoreBackend>,
    payments: Arc<dyn PaymentCodeProvider>,
    session: SessionId,
    database: Option<Database>,
}

impl Shop {
    /// Opens the configured backend and resolves the session.
    ///
    /// ## Startup Sequence
    /// 1. Validate configuration
    /// 2. Local: open SQLite (creating it and running migrations)
    ///    Remote: build the REST client
    /// 3. Use `session` if given, else the stored session id
    pub async fn open(config: ShopConfig, session: Option<SessionId>) -> Result<Self, ApiError> {
        config.validate()?;

        let (backend, payments, database): (
            Arc<dyn StoreBackend>,
            Arc<dyn PaymentCodeProvider>,
            Option<Database>,
        ) = match config.backend {
            BackendMode::Local => {
                let path = config.database_path();
                info!(?path, "Opening local store");
                let db = Database::new(DbConfig::new(path)).await?;
                (
                    Arc::new(LocalBackend::new(db.clone())),
                    Arc::new(OfflinePaymentCodes::new(config.store_name.clone())),
                    Some(db),
                )
            }
            BackendMode::Remote => {
                let remote = RemoteBackend::new(&config.api_url, config.request_timeout())?;
                info!(url = remote.base_url(), "Using remote shop service");
                let payments = remote.payment_codes();
                (Arc::new(remote), Arc::new(payments), None)
            }
        };

        let session = match session {
            Some(session) => session,
            None => session::load_or_create(&config.data_dir())?,
        };

        let mut shop = Shop::with_backend(config, backend, payments, session);
        shop.database = database;
        Ok(shop)
    }

    /// Assembles a shop from parts that are already open.
    pub fn with_backend(
        config: ShopConfig,
        backend: Arc<dyn StoreBackend>,
        payments: Arc<dyn PaymentCodeProvider>,
        session: SessionId,
    ) -> Self {
        Shop {
            config,
            backend,
            payments,
            session,
            database: None,
        }
    }

    /// Releases the local database, if one was opened.
    pub async fn close(self) {
        if let Some(db) = self.database {
            db.close().await;
        }
    }

    pub fn backend(&self) -> &dyn StoreBackend {
        self.backend.as_ref()
    }

    pub fn payments(&self) -> &dyn PaymentCodeProvider {
        self.payments.as_ref()
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.config.tax_rate()
    }
}
