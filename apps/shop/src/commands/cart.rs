//! # Cart Commands
//!
//! Every command answers with the whole cart as the backend now holds it,
//! so totals and the count badge are always recomputed, never patched.

use serde::Serialize;
use tracing::{debug, info};

use okaybruh_core::validation::parse_quantity;
use okaybruh_core::{CartLine, CartSnapshot, Totals};

use crate::error::ApiError;
use crate::state::Shop;

/// Cart view returned by every cart command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub session_id: String,
    pub lines: Vec<CartLine>,
    pub totals: Totals,
    /// Sum of quantities, for the cart badge.
    pub item_count: i64,
}

impl CartResponse {
    fn new(shop: &Shop, snapshot: CartSnapshot) -> Self {
        CartResponse {
            session_id: shop.session().to_string(),
            item_count: snapshot.item_count(),
            totals: snapshot.totals,
            lines: snapshot.lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The session's current cart and its totals.
pub async fn get_cart(shop: &Shop) -> Result<CartResponse, ApiError> {
    debug!(session = %shop.session(), "get_cart command");
    Ok(CartResponse::new(shop, snapshot(shop).await?))
}

pub(crate) async fn snapshot(shop: &Shop) -> Result<CartSnapshot, ApiError> {
    let lines = shop.backend().cart_lines(shop.session()).await?;
    Ok(CartSnapshot::from_lines(lines, shop.tax_rate()))
}

/// Adds a product to the cart, merging with an existing line.
///
/// ## Arguments
/// * `product_id` - Catalog id
/// * `quantity` - Raw user input; must be a whole number ≥ 1
pub async fn add_to_cart(
    shop: &Shop,
    product_id: i64,
    quantity: &str,
) -> Result<CartResponse, ApiError> {
    debug!(product_id, quantity = %quantity, "add_to_cart command");

    let quantity = parse_quantity(quantity)?;
    let line = shop
        .backend()
        .add_to_cart(shop.session(), product_id, quantity)
        .await?;
    info!(line_id = line.id, product_id, quantity = line.quantity, "Added to cart");

    get_cart(shop).await
}

/// Sets a line's quantity.
///
/// ## Behavior
/// - Quantity < 1: removes the line
/// - Unknown line with quantity ≥ 1: `NOT_FOUND`
pub async fn update_cart_item(
    shop: &Shop,
    line_id: i64,
    quantity: &str,
) -> Result<CartResponse, ApiError> {
    debug!(line_id, quantity = %quantity, "update_cart_item command");

    let quantity = parse_quantity(quantity)?;
    match shop
        .backend()
        .set_cart_quantity(shop.session(), line_id, quantity)
        .await?
    {
        Some(line) => debug!(line_id, quantity = line.quantity, "Cart line updated"),
        None => debug!(line_id, "Cart line removed"),
    }

    get_cart(shop).await
}

/// Removes a line. Removing a line that is already gone is not an error.
pub async fn remove_from_cart(shop: &Shop, line_id: i64) -> Result<CartResponse, ApiError> {
    debug!(line_id, "remove_from_cart command");
    shop.backend()
        .remove_cart_line(shop.session(), line_id)
        .await?;
    get_cart(shop).await
}

pub async fn clear_cart(shop: &Shop) -> Result<CartResponse, ApiError> {
    debug!(session = %shop.session(), "clear_cart command");
    shop.backend().clear_cart(shop.session()).await?;
    get_cart(shop).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{shop, shop_with_session};
    use crate::error::ErrorCode;
    use okaybruh_core::Money;

    #[tokio::test]
    async fn test_adding_twice_merges_lines() {
        let shop = shop().await;
        add_to_cart(&shop, 1, "1").await.unwrap();
        let cart = add_to_cart(&shop, 1, "1").await.unwrap();

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 2);
        assert_eq!(cart.item_count, 2);
        assert_eq!(cart.totals.subtotal, Money::from_cents(5998));
        assert_eq!(cart.totals.total.to_string(), "$65.98");
    }

    #[tokio::test]
    async fn test_bad_quantities_are_rejected() {
        let shop = shop().await;

        for raw in ["0", "-3", "two", "1.5"] {
            let err = add_to_cart(&shop, 1, raw).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidInput, "quantity {raw}");
        }
        assert!(get_cart(&shop).await.unwrap().is_empty());

        let err = add_to_cart(&shop, 42, "1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_update_remove_and_clear() {
        let shop = shop().await;
        add_to_cart(&shop, 1, "1").await.unwrap();
        let cart = add_to_cart(&shop, 2, "1").await.unwrap();
        let hoodie_line = cart.lines[1].id;

        let cart = update_cart_item(&shop, hoodie_line, "3").await.unwrap();
        assert_eq!(cart.item_count, 4);

        let cart = update_cart_item(&shop, hoodie_line, "0").await.unwrap();
        assert_eq!(cart.lines.len(), 1);

        let err = update_cart_item(&shop, hoodie_line, "2").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let cart = remove_from_cart(&shop, hoodie_line).await.unwrap();
        assert_eq!(cart.lines.len(), 1);

        let cart = clear_cart(&shop).await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.totals.total, Money::zero());
    }

    #[tokio::test]
    async fn test_cart_response_carries_session() {
        let shop = shop_with_session("session_1_other").await;
        let cart = get_cart(&shop).await.unwrap();
        assert_eq!(cart.session_id, "session_1_other");

        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.get("itemCount").is_some());
    }
}
