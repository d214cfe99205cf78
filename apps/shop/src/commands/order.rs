//! # Order Commands
//!
//! Checkout, the receipt it produces, and order history.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Read cart ──► CartSnapshot (lines + totals)                         │
//! │  2. NewOrder::from_snapshot ── empty cart? ──► EMPTY_CART, nothing saved│
//! │                              ── bad customer? ──► INVALID_INPUT          │
//! │  3. backend.place_order ──► Order (ledger id) + cart emptied            │
//! │  4. QR payment? ──► payment code (advisory; failure only noted)         │
//! │  5. Receipt                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use okaybruh_core::{CustomerInfo, NewOrder, Order, OrderItem, PaymentMethod, Totals};

use crate::commands::cart::snapshot;
use crate::error::ApiError;
use crate::state::Shop;

/// Checkout form input.
#[derive(Debug, Clone)]
pub struct CheckoutForm {
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
}

/// The bill shown after checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub store_name: String,
    pub order_id: i64,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub payment_method: PaymentMethod,
    /// `Cash on Delivery` or `PayNow (QR Code)`
    pub payment_label: String,
    pub items: Vec<OrderItem>,
    pub totals: Totals,
    /// Scannable payment code, for QR payments when one was produced.
    pub payment_code: Option<String>,
    /// Why a requested payment code is missing.
    pub payment_code_error: Option<String>,
}

impl Receipt {
    /// Builds the receipt for a stored order.
    ///
    /// The subtotal comes from the order's own items, so a receipt can be
    /// reprinted after the products are gone. The total is the one recorded
    /// at checkout, whatever the tax rate is configured to now.
    pub fn for_order(order: &Order, store_name: &str) -> Self {
        Receipt {
            store_name: store_name.to_string(),
            order_id: order.id,
            created_at: order.created_at,
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            customer_phone: order.customer_phone.clone(),
            payment_method: order.payment_method,
            payment_label: order.payment_method.label().to_string(),
            items: order.items.clone(),
            totals: Totals::from_recorded(&order.items, order.total_amount),
            payment_code: None,
            payment_code_error: None,
        }
    }
}

/// Places an order for the session's cart.
///
/// ## Errors
/// - `EMPTY_CART` when there is nothing to buy
/// - `INVALID_INPUT` when name, email or phone is missing or malformed
///
/// Neither writes anything. A failed payment-code request after the order
/// exists is reported on the receipt instead.
pub async fn checkout(shop: &Shop, form: CheckoutForm) -> Result<Receipt, ApiError> {
    debug!(session = %shop.session(), method = %form.payment_method, "checkout command");

    let cart = snapshot(shop).await?;
    let new_order = NewOrder::from_snapshot(form.customer, &cart, form.payment_method)?;

    let order = shop.backend().place_order(shop.session(), new_order).await?;
    info!(
        order_id = order.id,
        total = %order.total_amount,
        method = %order.payment_method,
        "Checkout complete"
    );

    let mut receipt = Receipt::for_order(&order, &shop.config().store_name);

    if order.payment_method == PaymentMethod::Qrcode {
        match shop
            .payments()
            .payment_code(order.total_amount, order.id)
            .await
        {
            Ok(code) => receipt.payment_code = Some(code.image),
            Err(e) => {
                warn!(order_id = order.id, error = %e, "Payment code unavailable");
                receipt.payment_code_error = Some(ApiError::from(e).message);
            }
        }
    }

    Ok(receipt)
}

/// All orders, oldest first.
pub async fn list_orders(shop: &Shop) -> Result<Vec<Order>, ApiError> {
    debug!("list_orders command");
    Ok(shop.backend().list_orders().await?)
}

/// One order's receipt.
pub async fn get_order(shop: &Shop, id: i64) -> Result<Receipt, ApiError> {
    debug!(order_id = id, "get_order command");
    let order = shop.backend().get_order(id).await?;
    Ok(Receipt::for_order(&order, &shop.config().store_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::{add_to_cart, get_cart};
    use crate::commands::product::delete_product;
    use crate::commands::testing::{shop, shop_over};
    use crate::error::ErrorCode;
    use crate::state::ShopConfig;
    use okaybruh_core::{Money, TaxRate};
    use okaybruh_store::{Database, DbConfig};

    fn form(method: PaymentMethod) -> CheckoutForm {
        CheckoutForm {
            customer: CustomerInfo {
                name: "Ana Tan".into(),
                email: "ana@example.com".into(),
                phone: "+65 5555 1234".into(),
            },
            payment_method: method,
        }
    }

    #[tokio::test]
    async fn test_empty_cart_creates_no_order() {
        let shop = shop().await;
        let err = checkout(&shop, form(PaymentMethod::Cash)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
        assert!(list_orders(&shop).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_customer_field_keeps_cart() {
        let shop = shop().await;
        add_to_cart(&shop, 1, "1").await.unwrap();

        let mut bad = form(PaymentMethod::Cash);
        bad.customer.email = "".into();
        let err = checkout(&shop, bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        assert_eq!(get_cart(&shop).await.unwrap().item_count, 1);
        assert!(list_orders(&shop).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_empties_cart_and_builds_receipt() {
        let shop = shop().await;
        add_to_cart(&shop, 1, "2").await.unwrap();

        let receipt = checkout(&shop, form(PaymentMethod::Cash)).await.unwrap();
        assert_eq!(receipt.order_id, 1);
        assert_eq!(receipt.payment_label, "Cash on Delivery");
        assert_eq!(receipt.totals.subtotal, Money::from_cents(5998));
        assert_eq!(receipt.totals.total.to_string(), "$65.98");
        assert!(receipt.payment_code.is_none());

        assert!(get_cart(&shop).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_qr_checkout_attaches_payment_code() {
        let shop = shop().await;
        add_to_cart(&shop, 1, "2").await.unwrap();

        let receipt = checkout(&shop, form(PaymentMethod::Qrcode)).await.unwrap();
        assert_eq!(receipt.payment_label, "PayNow (QR Code)");
        assert_eq!(
            receipt.payment_code.as_deref(),
            Some("paynow:Okaybruh+Shop?order=1&amount=65.98")
        );
    }

    #[tokio::test]
    async fn test_order_survives_product_delete() {
        let shop = shop().await;
        add_to_cart(&shop, 3, "2").await.unwrap();
        let receipt = checkout(&shop, form(PaymentMethod::Cash)).await.unwrap();

        delete_product(&shop, 3).await.unwrap();

        let reprinted = get_order(&shop, receipt.order_id).await.unwrap();
        assert_eq!(reprinted.items, receipt.items);
        assert_eq!(reprinted.totals, receipt.totals);

        let err = get_order(&shop, 99).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_reprint_after_tax_change_keeps_recorded_total() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let session = "session_1714550400000_test00001";

        let at_ten = shop_over(db.clone(), ShopConfig::default(), session);
        add_to_cart(&at_ten, 1, "2").await.unwrap();
        let placed = checkout(&at_ten, form(PaymentMethod::Cash)).await.unwrap();

        let at_twenty = shop_over(
            db,
            ShopConfig {
                tax_rate_bps: 2000,
                ..ShopConfig::default()
            },
            session,
        );
        let reprinted = get_order(&at_twenty, placed.order_id).await.unwrap();
        let stored = at_twenty.backend().get_order(placed.order_id).await.unwrap();

        assert_eq!(reprinted.totals.total, stored.total_amount);
        assert_eq!(reprinted.totals, placed.totals);
        assert_eq!(reprinted.totals.tax.to_string(), "$6.00");
        assert_eq!(reprinted.totals.effective_rate(), Some(TaxRate::from_bps(1000)));
    }

    #[tokio::test]
    async fn test_order_ids_are_sequential() {
        let shop = shop().await;
        for expected in 1..=3 {
            add_to_cart(&shop, 4, "1").await.unwrap();
            let receipt = checkout(&shop, form(PaymentMethod::Cash)).await.unwrap();
            assert_eq!(receipt.order_id, expected);
        }
        let orders = list_orders(&shop).await.unwrap();
        assert_eq!(orders.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
