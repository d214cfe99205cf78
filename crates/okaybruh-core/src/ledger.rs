//! # Order Ledger
//!
//! Append-only collection of finalized orders.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Checkout                                        │
//! │                                                                         │
//! │  Cart ──snapshot()──► CartSnapshot ──NewOrder::from_snapshot()──┐       │
//! │                                         │                       │       │
//! │                          empty? ──► EmptyCart (nothing written) │       │
//! │                                                                 ▼       │
//! │  OrderLedger::append() ──► id = next_id (monotonic) ──► Order          │
//! │                                                                 │       │
//! │  Cart::clear() ◄────────────────────────────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ids come from a counter owned by the ledger and persisted with it, never
//! from `orders.len() + 1`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartSnapshot};
use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Totals};
use crate::types::{CustomerInfo, Order, OrderItem, OrderStatus, PaymentMethod, TaxRate};
use crate::validation::validate_customer;

// =============================================================================
// New Order
// =============================================================================

/// A validated order that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer: CustomerInfo,
    pub items: Vec<OrderItem>,
    pub totals: Totals,
    pub payment_method: PaymentMethod,
}

impl NewOrder {
    /// Freezes a cart snapshot into order items.
    ///
    /// ## Errors
    /// - `EmptyCart` when the snapshot has no lines
    /// - `Validation` when name, email or phone is missing
    pub fn from_snapshot(
        customer: CustomerInfo,
        snapshot: &CartSnapshot,
        payment_method: PaymentMethod,
    ) -> CoreResult<Self> {
        if snapshot.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        validate_customer(&customer)?;

        let customer = CustomerInfo {
            name: customer.name.trim().to_string(),
            email: customer.email.trim().to_string(),
            phone: customer.phone.trim().to_string(),
        };

        Ok(NewOrder {
            customer,
            items: snapshot.lines.iter().map(OrderItem::from_line).collect(),
            totals: snapshot.totals,
            payment_method,
        })
    }

    /// Amount charged: subtotal plus tax.
    pub fn total_amount(&self) -> Money {
        self.totals.total
    }

    /// Builds the order record with an assigned id.
    pub fn into_order(self, id: i64, created_at: DateTime<Utc>) -> Order {
        Order {
            id,
            customer_name: self.customer.name,
            customer_email: self.customer.email,
            customer_phone: self.customer.phone,
            items: self.items,
            total_amount: self.totals.total,
            payment_method: self.payment_method,
            status: OrderStatus::Pending,
            created_at,
        }
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// The order ledger.
///
/// ## Invariants
/// - Orders are never removed or edited once appended
/// - `next_id` is greater than every id ever issued
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderLedger {
    orders: Vec<Order>,

    #[serde(default)]
    next_id: i64,
}

impl OrderLedger {
    pub fn new() -> Self {
        OrderLedger::default()
    }

    /// Rebuilds a ledger from stored orders.
    pub fn from_orders(orders: Vec<Order>) -> Self {
        OrderLedger { orders, next_id: 0 }
    }

    fn allocate_id(&mut self) -> i64 {
        let highest = self.orders.iter().map(|o| o.id).max().unwrap_or(0);
        let id = self.next_id.max(highest + 1);
        self.next_id = id + 1;
        id
    }

    /// Assigns the next id and appends the order.
    pub fn append(&mut self, new_order: NewOrder, created_at: DateTime<Utc>) -> Order {
        let id = self.allocate_id();
        let order = new_order.into_order(id, created_at);
        self.orders.push(order.clone());
        order
    }

    pub fn get(&self, id: i64) -> CoreResult<&Order> {
        self.orders
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| CoreError::not_found("Order", id))
    }

    /// All orders in insertion order.
    pub fn list(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Places an order from `cart` and empties the cart.
///
/// On error neither the cart nor the ledger is touched.
pub fn checkout(
    cart: &mut Cart,
    ledger: &mut OrderLedger,
    customer: CustomerInfo,
    payment_method: PaymentMethod,
    rate: TaxRate,
    now: DateTime<Utc>,
) -> CoreResult<Order> {
    let snapshot = cart.snapshot(rate);
    let new_order = NewOrder::from_snapshot(customer, &snapshot, payment_method)?;
    let order = ledger.append(new_order, now);
    cart.clear();
    Ok(order)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use rust_decimal_macros::dec;

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "Ana Tan".to_string(),
            email: "ana@example.com".to_string(),
            phone: "+65 5555 1234".to_string(),
        }
    }

    fn rate() -> TaxRate {
        TaxRate::from_bps(1000)
    }

    #[test]
    fn test_checkout_empty_cart_fails() {
        let mut cart = Cart::new();
        let mut ledger = OrderLedger::new();

        let result = checkout(
            &mut cart,
            &mut ledger,
            customer(),
            PaymentMethod::Cash,
            rate(),
            Utc::now(),
        );
        assert_eq!(result, Err(CoreError::EmptyCart));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_checkout_clears_cart_and_records_totals() {
        let catalog = Catalog::with_defaults();
        let mut cart = Cart::new();
        cart.add_item(catalog.get(1).unwrap(), 2).unwrap();
        let mut ledger = OrderLedger::new();

        let order = checkout(
            &mut cart,
            &mut ledger,
            customer(),
            PaymentMethod::Qrcode,
            rate(),
            Utc::now(),
        )
        .unwrap();

        assert!(cart.is_empty());
        assert_eq!(order.id, 1);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount.amount(), dec!(65.978));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(ledger.get(1).unwrap(), &order);
    }

    #[test]
    fn test_order_items_survive_product_delete() {
        let mut catalog = Catalog::with_defaults();
        let mut cart = Cart::new();
        cart.add_item(catalog.get(3).unwrap(), 1).unwrap();
        let mut ledger = OrderLedger::new();

        let order = checkout(
            &mut cart,
            &mut ledger,
            customer(),
            PaymentMethod::Cash,
            rate(),
            Utc::now(),
        )
        .unwrap();
        catalog.delete(3).unwrap();

        let stored = ledger.get(order.id).unwrap();
        assert_eq!(stored.items[0].name, "Okaybruh Cap");
        assert_eq!(stored.items[0].price, Money::from_cents(2499));
    }

    #[test]
    fn test_invalid_customer_leaves_cart_alone() {
        let catalog = Catalog::with_defaults();
        let mut cart = Cart::new();
        cart.add_item(catalog.get(1).unwrap(), 1).unwrap();
        let mut ledger = OrderLedger::new();

        let mut nobody = customer();
        nobody.email = String::new();
        let result = checkout(
            &mut cart,
            &mut ledger,
            nobody,
            PaymentMethod::Cash,
            rate(),
            Utc::now(),
        );

        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert_eq!(cart.total_quantity(), 1);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_ids_are_monotonic_after_restore() {
        let catalog = Catalog::with_defaults();
        let mut ledger = OrderLedger::new();

        for _ in 0..3 {
            let mut cart = Cart::new();
            cart.add_item(catalog.get(1).unwrap(), 1).unwrap();
            checkout(
                &mut cart,
                &mut ledger,
                customer(),
                PaymentMethod::Cash,
                rate(),
                Utc::now(),
            )
            .unwrap();
        }

        // Orders 1 and 2 lost from storage; 3 must not be reissued
        let survivors: Vec<Order> = ledger.list().iter().skip(2).cloned().collect();
        let mut restored = OrderLedger::from_orders(survivors);

        let mut cart = Cart::new();
        cart.add_item(catalog.get(2).unwrap(), 1).unwrap();
        let order = checkout(
            &mut cart,
            &mut restored,
            customer(),
            PaymentMethod::Cash,
            rate(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(order.id, 4);
    }

    #[test]
    fn test_persisted_counter_is_kept() {
        let catalog = Catalog::with_defaults();
        let mut ledger = OrderLedger::new();
        let mut cart = Cart::new();
        cart.add_item(catalog.get(1).unwrap(), 1).unwrap();
        checkout(
            &mut cart,
            &mut ledger,
            customer(),
            PaymentMethod::Cash,
            rate(),
            Utc::now(),
        )
        .unwrap();

        let json = serde_json::to_string(&ledger).unwrap();
        let mut back: OrderLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);

        let snapshot = CartSnapshot::from_lines(
            vec![crate::types::CartLine::from_product(1, catalog.get(4).unwrap(), 1)],
            rate(),
        );
        let next = NewOrder::from_snapshot(customer(), &snapshot, PaymentMethod::Cash).unwrap();
        assert_eq!(back.append(next, Utc::now()).id, 2);
    }

    #[test]
    fn test_get_unknown_order() {
        let ledger = OrderLedger::new();
        assert!(ledger.get(1).unwrap_err().is_not_found());
    }
}
