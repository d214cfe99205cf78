//! # Domain Types
//!
//! Core domain records used throughout Okaybruh Shop.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartLine     │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │──►│  id (line id)   │──►│  id (ledger)    │       │
//! │  │  name, price    │   │  product_id     │   │  customer_*     │       │
//! │  │  category       │   │  name/price/img │   │  items (copies) │       │
//! │  │  stock, image   │   │  quantity ≥ 1   │   │  total_amount   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │  OrderStatus    │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Pending        │   │  Cash           │       │
//! │  │  1000 = 10%     │   │  Processing ... │   │  Qrcode         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `CartLine` copies name/price/image from the `Product` when it is added,
//! and an `Order` copies its items by value at checkout. Later product edits
//! or deletes never reach back into carts or historical orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{LineItem, Money};
use crate::PLACEHOLDER_IMAGE;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1000 bps = 10% (the shop's sales tax)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        crate::DEFAULT_TAX_RATE
    }
}

// =============================================================================
// Product
// =============================================================================

fn placeholder_image() -> String {
    PLACEHOLDER_IMAGE.to_string()
}

/// A product available for sale.
///
/// Defaults are filled once, when the record is built or decoded, so
/// readers never need `stock || 0` style fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Stable id, assigned by the catalog (max + 1).
    pub id: i64,

    /// Display name on the product card and receipt.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Used by the storefront category filter.
    #[serde(default)]
    pub category: Option<String>,

    /// Unit price, ≥ 0.
    pub price: Money,

    /// Units on hand, ≥ 0. Informational; checkout does not decrement it.
    #[serde(default)]
    pub stock: i64,

    /// Image URI.
    #[serde(default = "placeholder_image")]
    pub image: String,
}

impl Product {
    /// True when the product belongs to `category` (case-insensitive).
    pub fn in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .map(|c| c.eq_ignore_ascii_case(category.trim()))
            .unwrap_or(false)
    }
}

/// Fields for a new product, as entered in the admin form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Money,
    pub stock: Option<i64>,
    pub image: Option<String>,
}

impl ProductDraft {
    /// Builds the product record, applying defaults for omitted fields.
    pub fn into_product(self, id: i64) -> Product {
        Product {
            id,
            name: self.name.trim().to_string(),
            description: self.description.unwrap_or_default(),
            category: non_blank(self.category),
            price: self.price,
            stock: self.stock.unwrap_or(0),
            image: non_blank(self.image).unwrap_or_else(placeholder_image),
        }
    }
}

/// Partial update for a product. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
    pub image: Option<String>,
}

impl ProductPatch {
    /// Merges the given fields over `product`.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(category) = &self.category {
            product.category = non_blank(Some(category.clone()));
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(image) = &self.image {
            product.image = non_blank(Some(image.clone())).unwrap_or_else(placeholder_image);
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self == &ProductPatch::default()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Cart Line
// =============================================================================

/// One product-quantity entry within a session's cart.
///
/// ## Design Notes
/// - `id` identifies the line, and is distinct from `product_id`
/// - `name`, `price`, `image` are frozen when the line is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub price: Money,
    #[serde(default = "placeholder_image")]
    pub image: String,
    /// Always ≥ 1.
    pub quantity: i64,
}

impl CartLine {
    /// Creates a line from a product, freezing its name/price/image.
    pub fn from_product(id: i64, product: &Product, quantity: i64) -> Self {
        CartLine {
            id,
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity,
        }
    }
}

impl LineItem for CartLine {
    fn unit_price(&self) -> Money {
        self.price
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cash,
    /// PayNow QR code, generated after the order exists.
    Qrcode,
}

impl PaymentMethod {
    /// Wire value: `cash` or `qrcode`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Qrcode => "qrcode",
        }
    }

    /// Label printed on the receipt.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash on Delivery",
            PaymentMethod::Qrcode => "PayNow (QR Code)",
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" | "cod" => Ok(PaymentMethod::Cash),
            "qrcode" | "qr" | "paynow" => Ok(PaymentMethod::Qrcode),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: vec!["cash".to_string(), "qrcode".to_string()],
            }),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Order status. New orders are `Pending`; later transitions belong to an
/// order-management process outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: ["pending", "processing", "completed", "cancelled"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Customer & Order
// =============================================================================

/// Contact details collected at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// An item captured at checkout (copied by value, never a product reference).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub name: String,
    pub quantity: i64,
    pub price: Money,
}

impl OrderItem {
    /// Freezes a cart line into an order item.
    pub fn from_line(line: &CartLine) -> Self {
        OrderItem {
            name: line.name.clone(),
            quantity: line.quantity,
            price: line.price,
        }
    }
}

impl LineItem for OrderItem {
    fn unit_price(&self) -> Money {
        self.price
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }
}

/// A finalized order. Immutable once appended to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub items: Vec<OrderItem>,
    /// Subtotal plus tax, unrounded.
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Items as `Classic Tee (x2), Cap (x1)`.
    pub fn items_summary(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("{} (x{})", item.name, item.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Sum of item line totals, before tax.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }
}

// =============================================================================
// Session
// =============================================================================

const SESSION_SUFFIX_LEN: usize = 9;

/// Opaque id scoping one shopper's cart.
///
/// Format: `session_<unix-millis>_<9 base-36 chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh session id stamped with `now`.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let mut entropy = uuid::Uuid::new_v4().as_u128();
        let mut suffix = String::with_capacity(SESSION_SUFFIX_LEN);
        for _ in 0..SESSION_SUFFIX_LEN {
            let digit = (entropy % 36) as u32;
            entropy /= 36;
            suffix.push(char::from_digit(digit, 36).unwrap_or('0'));
        }
        SessionId(format!("session_{}_{}", now.timestamp_millis(), suffix))
    }

    /// Wraps an existing id (e.g. read back from disk).
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::Required {
                field: "session id".to_string(),
            });
        }
        if raw.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(ValidationError::InvalidFormat {
                field: "session id".to_string(),
                reason: "must not contain whitespace or '/'".to_string(),
            });
        }
        Ok(SessionId(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tee() -> Product {
        ProductDraft {
            name: "Okaybruh Classic Tee".to_string(),
            category: Some("Tees".to_string()),
            price: Money::from_cents(2999),
            stock: Some(50),
            ..Default::default()
        }
        .into_product(1)
    }

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1000);
        assert_eq!(rate.bps(), 1000);
        assert!((rate.percentage() - 10.0).abs() < 0.001);
        assert_eq!(TaxRate::default(), rate);
    }

    #[test]
    fn test_draft_defaults() {
        let product = ProductDraft {
            name: "  Tote Bag ".to_string(),
            price: Money::from_cents(1500),
            ..Default::default()
        }
        .into_product(7);

        assert_eq!(product.id, 7);
        assert_eq!(product.name, "Tote Bag");
        assert_eq!(product.description, "");
        assert_eq!(product.category, None);
        assert_eq!(product.stock, 0);
        assert_eq!(product.image, PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_decode_fills_defaults() {
        let product: Product =
            serde_json::from_str(r#"{"id": 3, "name": "Cap", "price": "24.99"}"#).unwrap();
        assert_eq!(product.stock, 0);
        assert_eq!(product.description, "");
        assert_eq!(product.image, PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_patch_merges_only_given_fields() {
        let mut product = tee();
        let patch = ProductPatch {
            price: Some(Money::from_cents(2499)),
            category: Some("  ".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut product);

        assert_eq!(product.price, Money::from_cents(2499));
        assert_eq!(product.category, None);
        assert_eq!(product.name, "Okaybruh Classic Tee");
        assert_eq!(product.stock, 50);
        assert!(ProductPatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_in_category() {
        let product = tee();
        assert!(product.in_category("tees"));
        assert!(!product.in_category("Hoodies"));
    }

    #[test]
    fn test_payment_method() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("QR".parse::<PaymentMethod>().unwrap(), PaymentMethod::Qrcode);
        assert!("card".parse::<PaymentMethod>().is_err());
        assert_eq!(PaymentMethod::Qrcode.label(), "PayNow (QR Code)");
        assert_eq!(PaymentMethod::Cash.label(), "Cash on Delivery");
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Qrcode).unwrap(),
            "\"qrcode\""
        );
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!("Canceled".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_items_summary() {
        let order = Order {
            id: 1,
            customer_name: "Ana".to_string(),
            customer_email: "ana@example.com".to_string(),
            customer_phone: "555".to_string(),
            items: vec![
                OrderItem {
                    name: "Classic Tee".to_string(),
                    quantity: 2,
                    price: Money::from_cents(2999),
                },
                OrderItem {
                    name: "Cap".to_string(),
                    quantity: 1,
                    price: Money::from_cents(2499),
                },
            ],
            total_amount: Money::from_cents(9346),
            payment_method: PaymentMethod::Cash,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        assert_eq!(order.items_summary(), "Classic Tee (x2), Cap (x1)");
        assert_eq!(order.subtotal(), Money::from_cents(8497));
    }

    #[test]
    fn test_session_id_format() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let id = SessionId::generate(now);
        let parts: Vec<&str> = id.as_str().split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));

        assert_ne!(SessionId::generate(now), id);
    }

    #[test]
    fn test_session_id_parse() {
        assert!(SessionId::parse(" session_1_abc \n").is_ok());
        assert!(SessionId::parse("").is_err());
        assert!(SessionId::parse("a/b").is_err());
    }
}
