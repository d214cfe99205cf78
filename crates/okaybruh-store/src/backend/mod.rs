//! # Storage Backends
//!
//! One capability, two implementations, selected at configuration time.
//!
//! ## Backend Selection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        StoreBackend                                     │
//! │                                                                         │
//! │             ┌───────────────────┴───────────────────┐                   │
//! │             ▼                                       ▼                   │
//! │  ┌─────────────────────┐               ┌─────────────────────────┐      │
//! │  │   LocalBackend      │               │   RemoteBackend         │      │
//! │  │  (demo / offline)   │               │  (server-backed)        │      │
//! │  │                     │               │                         │      │
//! │  │  okaybruh-core rules│               │  REST service decides;  │      │
//! │  │  + SQLite documents │               │  we validate inputs and │      │
//! │  │                     │               │  decode its records     │      │
//! │  └─────────────────────┘               └─────────────────────────┘      │
//! │                                                                         │
//! │  Same trait → same call sites → no drift between the two modes          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutating call persists before it returns. A failed write leaves
//! nothing behind: the local backend commits whole documents, and the
//! remote backend never caches what the service did not confirm.

pub mod local;
pub mod remote;

use async_trait::async_trait;
use okaybruh_core::report::{self, DailySales, MonthlySummary, ReportPeriod};
use okaybruh_core::{
    CartLine, Money, NewOrder, Order, Product, ProductDraft, ProductPatch, SessionId,
};

use crate::error::StoreResult;

pub use local::{LocalBackend, OfflinePaymentCodes};
pub use remote::{RemoteBackend, RemotePaymentCodes};

/// The storage-backend capability shared by demo and server-backed modes.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Short name for logs: `local` or `remote`.
    fn name(&self) -> &'static str;

    // -------------------------------------------------------------------------
    // Product Catalog
    // -------------------------------------------------------------------------

    /// All products in catalog order.
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    /// One product, or `NotFound`.
    async fn get_product(&self, id: i64) -> StoreResult<Product>;

    async fn create_product(&self, draft: ProductDraft) -> StoreResult<Product>;

    async fn update_product(&self, id: i64, patch: ProductPatch) -> StoreResult<Product>;

    /// Removes a product, or `NotFound`. Carts and orders keep their copies.
    async fn delete_product(&self, id: i64) -> StoreResult<()>;

    // -------------------------------------------------------------------------
    // Cart Store
    // -------------------------------------------------------------------------

    /// The session's cart lines in insertion order.
    async fn cart_lines(&self, session: &SessionId) -> StoreResult<Vec<CartLine>>;

    /// Adds `quantity` of a product, merging with an existing line.
    async fn add_to_cart(
        &self,
        session: &SessionId,
        product_id: i64,
        quantity: i64,
    ) -> StoreResult<CartLine>;

    /// Sets a line's quantity; `quantity < 1` removes it and yields `None`.
    async fn set_cart_quantity(
        &self,
        session: &SessionId,
        line_id: i64,
        quantity: i64,
    ) -> StoreResult<Option<CartLine>>;

    /// Removes a line. Idempotent.
    async fn remove_cart_line(&self, session: &SessionId, line_id: i64) -> StoreResult<()>;

    async fn clear_cart(&self, session: &SessionId) -> StoreResult<()>;

    /// Drops everything kept for a session that is being abandoned.
    ///
    /// Stores without per-session records just empty the cart.
    async fn forget_cart(&self, session: &SessionId) -> StoreResult<()> {
        self.clear_cart(session).await
    }

    // -------------------------------------------------------------------------
    // Order Ledger
    // -------------------------------------------------------------------------

    /// Appends an order and empties the session's cart.
    async fn place_order(&self, session: &SessionId, order: NewOrder) -> StoreResult<Order>;

    /// One order, or `NotFound`.
    async fn get_order(&self, id: i64) -> StoreResult<Order>;

    async fn list_orders(&self) -> StoreResult<Vec<Order>>;

    // -------------------------------------------------------------------------
    // Reporting Aggregator
    // -------------------------------------------------------------------------

    /// Per-day revenue for `period`.
    async fn daily_totals(&self, period: ReportPeriod) -> StoreResult<Vec<DailySales>> {
        let orders = self.list_orders().await?;
        Ok(report::daily_totals(&orders, period))
    }

    /// Count, revenue and average for `period`.
    async fn monthly_summary(&self, period: ReportPeriod) -> StoreResult<MonthlySummary> {
        let orders = self.list_orders().await?;
        Ok(report::monthly_summary(&orders, period))
    }
}

// =============================================================================
// Payment Codes
// =============================================================================

/// A scannable payment request, as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCode {
    /// Image reference (data URI or URL) or raw payload to encode.
    pub image: String,
}

/// External payment-code provider, keyed by `(amount, order id)`.
///
/// Advisory only: the order already exists when this is called, and a
/// failure here never undoes it.
#[async_trait]
pub trait PaymentCodeProvider: Send + Sync {
    async fn payment_code(&self, amount: Money, order_id: i64) -> StoreResult<PaymentCode>;
}
