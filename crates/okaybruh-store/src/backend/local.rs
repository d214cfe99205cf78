//! # Local Backend
//!
//! Demo/offline mode: the okaybruh-core rules applied to documents stored in
//! SQLite.
//!
//! ## Write Path
//! ```text
//! add_to_cart(session, product, qty)
//!      │
//!      ▼
//! write lock ──► load "products" + "cart:<session>" ──► Cart::add_item()
//!      │                                                    │
//!      │                                     error? ──► return (nothing saved)
//!      ▼                                                    │
//! save "cart:<session>" ◄───────────────────────────────────┘
//! ```
//!
//! Every mutation is load-modify-save under one async mutex, so two commands
//! never interleave against the same documents.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use okaybruh_core::{
    Cart, CartLine, Catalog, Money, NewOrder, Order, OrderLedger, Product, ProductDraft,
    ProductPatch, SessionId,
};

use super::{PaymentCode, PaymentCodeProvider, StoreBackend};
use crate::error::StoreResult;
use crate::pool::Database;
use crate::repository::state::{cart_key, StateRepository, ORDERS_KEY, PRODUCTS_KEY};

/// Storage backend over the local SQLite collections.
#[derive(Debug)]
pub struct LocalBackend {
    db: Database,
    write_lock: Mutex<()>,
}

impl LocalBackend {
    pub fn new(db: Database) -> Self {
        LocalBackend {
            db,
            write_lock: Mutex::new(()),
        }
    }

    fn state(&self) -> StateRepository {
        self.db.state()
    }

    /// The stored catalog, or the built-in one when none was saved yet.
    async fn load_catalog(&self) -> StoreResult<Catalog> {
        Ok(self
            .state()
            .load::<Catalog>(PRODUCTS_KEY)
            .await?
            .unwrap_or_else(Catalog::with_defaults))
    }

    async fn load_cart(&self, session: &SessionId) -> StoreResult<Cart> {
        Ok(self
            .state()
            .load::<Cart>(&cart_key(session))
            .await?
            .unwrap_or_default())
    }

    async fn load_ledger(&self) -> StoreResult<OrderLedger> {
        Ok(self
            .state()
            .load::<OrderLedger>(ORDERS_KEY)
            .await?
            .unwrap_or_default())
    }
}

#[async_trait]
impl StoreBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.load_catalog().await?.into_products())
    }

    async fn get_product(&self, id: i64) -> StoreResult<Product> {
        let catalog = self.load_catalog().await?;
        Ok(catalog.require(id)?.clone())
    }

    async fn create_product(&self, draft: ProductDraft) -> StoreResult<Product> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self.load_catalog().await?;
        let product = catalog.create(draft)?;
        self.state().save(PRODUCTS_KEY, &catalog).await?;

        info!(product_id = product.id, name = %product.name, "Product created");
        Ok(product)
    }

    async fn update_product(&self, id: i64, patch: ProductPatch) -> StoreResult<Product> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self.load_catalog().await?;
        let product = catalog.update(id, &patch)?;
        self.state().save(PRODUCTS_KEY, &catalog).await?;

        info!(product_id = id, "Product updated");
        Ok(product)
    }

    async fn delete_product(&self, id: i64) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self.load_catalog().await?;
        catalog.delete(id)?;
        self.state().save(PRODUCTS_KEY, &catalog).await?;

        info!(product_id = id, "Product deleted");
        Ok(())
    }

    async fn cart_lines(&self, session: &SessionId) -> StoreResult<Vec<CartLine>> {
        Ok(self.load_cart(session).await?.lines().to_vec())
    }

    async fn add_to_cart(
        &self,
        session: &SessionId,
        product_id: i64,
        quantity: i64,
    ) -> StoreResult<CartLine> {
        let _guard = self.write_lock.lock().await;
        let catalog = self.load_catalog().await?;
        let product = catalog.require(product_id)?;

        let mut cart = self.load_cart(session).await?;
        let line = cart.add_item(product, quantity)?.clone();
        self.state().save(&cart_key(session), &cart).await?;

        debug!(
            session = %session,
            line_id = line.id,
            quantity = line.quantity,
            "Cart line saved"
        );
        Ok(line)
    }

    async fn set_cart_quantity(
        &self,
        session: &SessionId,
        line_id: i64,
        quantity: i64,
    ) -> StoreResult<Option<CartLine>> {
        let _guard = self.write_lock.lock().await;
        let mut cart = self.load_cart(session).await?;
        let line = cart.set_quantity(line_id, quantity)?.cloned();
        self.state().save(&cart_key(session), &cart).await?;
        Ok(line)
    }

    async fn remove_cart_line(&self, session: &SessionId, line_id: i64) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut cart = self.load_cart(session).await?;
        if cart.remove_item(line_id) {
            self.state().save(&cart_key(session), &cart).await?;
        } else {
            debug!(session = %session, line_id, "Cart line already gone");
        }
        Ok(())
    }

    async fn clear_cart(&self, session: &SessionId) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut cart = self.load_cart(session).await?;
        cart.clear();
        self.state().save(&cart_key(session), &cart).await?;
        Ok(())
    }

    async fn forget_cart(&self, session: &SessionId) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        if self.state().remove(&cart_key(session)).await? {
            debug!(session = %session, "Removed abandoned cart");
        }
        Ok(())
    }

    async fn place_order(&self, session: &SessionId, order: NewOrder) -> StoreResult<Order> {
        let _guard = self.write_lock.lock().await;
        let mut ledger = self.load_ledger().await?;
        let mut cart = self.load_cart(session).await?;

        let order = ledger.append(order, Utc::now());
        cart.clear();

        self.state()
            .save_all(&[
                (ORDERS_KEY.to_string(), serde_json::to_value(&ledger)?),
                (cart_key(session), serde_json::to_value(&cart)?),
            ])
            .await?;

        info!(
            order_id = order.id,
            total = %order.total_amount,
            "Order placed"
        );
        Ok(order)
    }

    async fn get_order(&self, id: i64) -> StoreResult<Order> {
        let ledger = self.load_ledger().await?;
        Ok(ledger.get(id)?.clone())
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        Ok(self.load_ledger().await?.list().to_vec())
    }
}

// =============================================================================
// Offline Payment Codes
// =============================================================================

/// Payment codes without a provider: the raw PayNow-style payload that a QR
/// image would encode.
#[derive(Debug, Clone)]
pub struct OfflinePaymentCodes {
    merchant: String,
}

impl OfflinePaymentCodes {
    pub fn new(merchant: impl Into<String>) -> Self {
        OfflinePaymentCodes {
            merchant: merchant.into(),
        }
    }
}

#[async_trait]
impl PaymentCodeProvider for OfflinePaymentCodes {
    async fn payment_code(&self, amount: Money, order_id: i64) -> StoreResult<PaymentCode> {
        let mut shown = amount.rounded().amount();
        shown.rescale(2);
        Ok(PaymentCode {
            image: format!(
                "paynow:{}?order={}&amount={}",
                self.merchant.replace(' ', "+"),
                order_id,
                shown
            ),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
