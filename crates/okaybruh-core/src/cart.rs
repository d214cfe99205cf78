//! # Cart Store
//!
//! One session's cart: an ordered set of [`CartLine`]s, one per product.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Shopper Action           Operation               Cart Change           │
//! │  ──────────────           ─────────               ───────────           │
//! │                                                                         │
//! │  Add to Cart ────────────► add_item() ──────────► push or qty += n     │
//! │                                                                         │
//! │  Change Quantity ────────► set_quantity() ──────► qty = n (n < 1 ⇒ rm) │
//! │                                                                         │
//! │  Click Remove ───────────► remove_item() ───────► retain (idempotent)  │
//! │                                                                         │
//! │  Checkout / Clear ───────► clear() ─────────────► lines.clear()        │
//! │                                                                         │
//! │  View Cart ──────────────► snapshot() ──────────► (read only)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart never stores its own totals or item count. Both are recomputed
//! from the current lines on every read.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Totals;
use crate::types::{CartLine, Product, TaxRate};
use crate::validation::validate_quantity;

/// The shopping cart for one session.
///
/// ## Invariants
/// - At most one line per `product_id`
/// - Every line has `quantity >= 1`
/// - Line ids come from `next_line_id` and are never reused within a cart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,

    #[serde(default)]
    next_line_id: i64,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Rebuilds a cart from stored lines. Lines with quantity < 1 are dropped.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Cart {
            lines,
            next_line_id: 0,
        };
        cart.lines.retain(|l| l.quantity >= 1);
        cart.next_line_id = cart.highest_line_id();
        cart
    }

    fn highest_line_id(&self) -> i64 {
        self.lines.iter().map(|l| l.id).max().unwrap_or(0)
    }

    fn allocate_line_id(&mut self) -> i64 {
        // Restored carts may carry ids above a stale counter
        self.next_line_id = self.next_line_id.max(self.highest_line_id()) + 1;
        self.next_line_id
    }

    /// Adds `quantity` of `product`, or increases the existing line.
    ///
    /// ## Behavior
    /// - Product already in cart: `quantity` is added to its line
    /// - Otherwise: a new line snapshots the product's name/price/image
    ///
    /// ## Returns
    /// The line as it is after the change.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<&CartLine> {
        validate_quantity(quantity)?;

        if let Some(index) = self.lines.iter().position(|l| l.product_id == product.id) {
            let new_qty = self.lines[index].quantity + quantity;
            validate_quantity(new_qty)?;
            self.lines[index].quantity = new_qty;
            return Ok(&self.lines[index]);
        }

        let id = self.allocate_line_id();
        self.lines.push(CartLine::from_product(id, product, quantity));
        let index = self.lines.len() - 1;
        Ok(&self.lines[index])
    }

    /// Sets a line's quantity.
    ///
    /// ## Behavior
    /// - `quantity < 1`: the line is removed (same as [`Cart::remove_item`])
    ///   and `Ok(None)` is returned, even when the line did not exist
    /// - Line not found: `NotFound`
    /// - Above `MAX_ITEM_QUANTITY` (999): `Validation`
    pub fn set_quantity(&mut self, line_id: i64, quantity: i64) -> CoreResult<Option<&CartLine>> {
        if quantity < 1 {
            self.remove_item(line_id);
            return Ok(None);
        }

        validate_quantity(quantity)?;

        match self.lines.iter_mut().find(|l| l.id == line_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(Some(&*line))
            }
            None => Err(CoreError::not_found("Cart line", line_id)),
        }
    }

    /// Removes a line. Removing an absent line is a no-op.
    ///
    /// Returns whether a line was actually removed.
    pub fn remove_item(&mut self, line_id: i64) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != line_id);
        self.lines.len() != before
    }

    /// Clears all lines. Line ids keep counting up.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Looks up a line by id.
    pub fn line(&self, line_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Cart badge value: sum of quantities.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines plus derived totals.
    pub fn snapshot(&self, rate: TaxRate) -> CartSnapshot {
        CartSnapshot::from_lines(self.lines.clone(), rate)
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// A read-only view of a cart: its lines and the totals computed from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub totals: Totals,
}

impl CartSnapshot {
    /// Builds a snapshot, computing totals from `lines`.
    pub fn from_lines(lines: Vec<CartLine>, rate: TaxRate) -> Self {
        let totals = Totals::from_items(&lines, rate);
        CartSnapshot { lines, totals }
    }

    /// Cart badge value: sum of quantities.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::ProductDraft;
    use rust_decimal_macros::dec;

    fn product(id: i64, cents: i64) -> Product {
        ProductDraft {
            name: format!("Product {}", id),
            price: Money::from_cents(cents),
            ..Default::default()
        }
        .into_product(id)
    }

    #[test]
    fn test_adding_same_product_twice_increments() {
        let tee = product(1, 2999);
        let mut cart = Cart::new();
        cart.add_item(&tee, 1).unwrap();
        cart.add_item(&tee, 1).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);

        let snapshot = cart.snapshot(TaxRate::from_bps(1000));
        assert_eq!(snapshot.totals.subtotal.amount(), dec!(59.98));
        assert_eq!(snapshot.totals.tax.amount(), dec!(5.998));
        assert_eq!(snapshot.totals.total.amount(), dec!(65.978));
    }

    #[test]
    fn test_line_ids_are_distinct_from_product_ids() {
        let mut cart = Cart::new();
        let first = cart.add_item(&product(10, 100), 1).unwrap().id;
        let second = cart.add_item(&product(20, 100), 1).unwrap().id;

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(cart.lines()[1].product_id, 20);
    }

    #[test]
    fn test_line_snapshots_product() {
        let mut tee = product(1, 2999);
        let mut cart = Cart::new();
        cart.add_item(&tee, 1).unwrap();

        tee.price = Money::from_cents(9999);
        tee.name = "Renamed".to_string();

        assert_eq!(cart.lines()[0].price, Money::from_cents(2999));
        assert_eq!(cart.lines()[0].name, "Product 1");
    }

    #[test]
    fn test_most_expensive_cart_stays_in_range() {
        let priciest = product(1, crate::MAX_PRICE * 100);
        let mut cart = Cart::new();
        cart.add_item(&priciest, crate::MAX_ITEM_QUANTITY).unwrap();
        cart.add_item(&product(2, crate::MAX_PRICE * 100), 2).unwrap();

        let snapshot = cart.snapshot(TaxRate::from_bps(10_000));
        assert_eq!(snapshot.totals.subtotal.amount(), dec!(1001000000));
        assert_eq!(snapshot.totals.total.amount(), dec!(2002000000));
    }

    #[test]
    fn test_out_of_range_stored_price_does_not_panic() {
        // A record from storage or the REST service skips form validation
        let mut huge = product(1, 0);
        huge.price = Money::from_decimal(rust_decimal::Decimal::MAX);
        let mut cart = Cart::new();
        cart.add_item(&huge, 2).unwrap();

        let snapshot = cart.snapshot(TaxRate::from_bps(1000));
        assert_eq!(snapshot.totals.total, huge.price);
        assert_eq!(snapshot.item_count(), 2);
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = Cart::new();
        let result = cart.add_item(&product(1, 100), 0);
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_below_one_removes() {
        let mut cart = Cart::new();
        let a = cart.add_item(&product(1, 100), 3).unwrap().id;
        let b = cart.add_item(&product(2, 100), 3).unwrap().id;

        assert_eq!(cart.set_quantity(a, 0).unwrap(), None);
        assert_eq!(cart.set_quantity(b, -5).unwrap(), None);
        assert!(cart.is_empty());

        // Already gone: still fine
        assert_eq!(cart.set_quantity(a, 0).unwrap(), None);
    }

    #[test]
    fn test_set_quantity_updates_or_not_found() {
        let mut cart = Cart::new();
        let id = cart.add_item(&product(1, 100), 1).unwrap().id;

        let line = cart.set_quantity(id, 4).unwrap().cloned();
        assert_eq!(line.map(|l| l.quantity), Some(4));
        assert_eq!(cart.total_quantity(), 4);

        let missing = cart.set_quantity(99, 2);
        assert!(matches!(missing, Err(CoreError::NotFound { .. })));

        assert!(cart.set_quantity(id, 1000).is_err());
        assert_eq!(cart.line(id).map(|l| l.quantity), Some(4));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new();
        let id = cart.add_item(&product(1, 100), 1).unwrap().id;
        cart.add_item(&product(2, 100), 1).unwrap();

        assert!(cart.remove_item(id));
        let after_first = cart.clone();
        assert!(!cart.remove_item(id));
        assert!(!cart.remove_item(42));
        assert_eq!(cart, after_first);
    }

    #[test]
    fn test_line_ids_not_reused_after_clear() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 100), 1).unwrap();
        cart.add_item(&product(2, 100), 1).unwrap();
        cart.clear();

        let id = cart.add_item(&product(3, 100), 1).unwrap().id;
        assert_eq!(id, 3);
    }

    #[test]
    fn test_from_lines_continues_ids() {
        let line = CartLine::from_product(7, &product(1, 100), 2);
        let mut cart = Cart::from_lines(vec![line]);
        let id = cart.add_item(&product(2, 100), 1).unwrap().id;
        assert_eq!(id, 8);
    }

    #[test]
    fn test_badge_count() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 100), 2).unwrap();
        cart.add_item(&product(2, 100), 3).unwrap();
        assert_eq!(cart.total_quantity(), 5);
        assert_eq!(cart.snapshot(TaxRate::zero()).item_count(), 5);
    }
}
