//! # okaybruh-store: Storage Backends for Okaybruh Shop
//!
//! Everything that persists or travels over the network lives here. The
//! rules themselves stay in `okaybruh-core`; this crate decides where the
//! records are kept.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Okaybruh Shop Data Flow                           │
//! │                                                                         │
//! │  CLI command (cart add 1 2)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  okaybruh-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │ StoreBackend  │    │  Repository   │    │  Migrations  │   │   │
//! │  │   │ (backend/)    │    │  (state.rs)   │    │  (embedded)  │   │   │
//! │  │   │               │    │               │    │              │   │   │
//! │  │   │ LocalBackend ─┼───►│ collections   │    │ 001_local_   │   │   │
//! │  │   │ RemoteBackend │    │ load / save   │    │   state.sql  │   │   │
//! │  │   └──────┬────────┘    └───────────────┘    └──────────────┘   │   │
//! │  └──────────┼──────────────────────────────────────────────────────┘   │
//! │             │                                                           │
//! │             ▼                                                           │
//! │  SQLite file (demo mode)   or   REST service at http://host/api         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`backend`] - The `StoreBackend` trait and its local/remote implementations
//! - [`pool`] - Opening the SQLite file (or an in-memory store for tests)
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - Keyed JSON collections
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use okaybruh_store::{Database, DbConfig, LocalBackend, StoreBackend};
//!
//! let db = Database::new(DbConfig::new("shop.db")).await?;
//! let backend = LocalBackend::new(db);
//!
//! let line = backend.add_to_cart(&session, 1, 2).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{
    LocalBackend, OfflinePaymentCodes, PaymentCode, PaymentCodeProvider, RemoteBackend,
    RemotePaymentCodes, StoreBackend,
};
pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use repository::state::StateRepository;
