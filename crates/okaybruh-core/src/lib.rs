//! # okaybruh-core: Pure Business Logic for Okaybruh Shop
//!
//! This crate is the **heart** of the shop. It holds every business rule as
//! plain data structures and pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Okaybruh Shop Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Front ends (browser pages, shop CLI)               │   │
//! │  │    Products ──► Cart ──► Checkout ──► Bill ──► Admin reports    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               okaybruh-store (StoreBackend trait)               │   │
//! │  │         local: SQLite collections │ remote: REST service        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ okaybruh-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌────────┐ ┌────────┐ ┌─────────┐ ┌────────┐ ┌────────┐      │   │
//! │  │   │ money  │ │  cart  │ │ catalog │ │ ledger │ │ report │      │   │
//! │  │   │ Totals │ │  Cart  │ │ Catalog │ │ Orders │ │ Daily  │      │   │
//! │  │   └────────┘ └────────┘ └─────────┘ └────────┘ └────────┘      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type, tax rate math and cart/order totals
//! - [`types`] - Domain records (Product, CartLine, Order, SessionId, ...)
//! - [`cart`] - One session's cart lines
//! - [`catalog`] - Product CRUD and the built-in default catalog
//! - [`ledger`] - Append-only order ledger and checkout
//! - [`report`] - Daily totals, monthly summary, bar chart scaling
//! - [`validation`] - Input validation at the boundary
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use okaybruh_core::{Cart, Catalog, DEFAULT_TAX_RATE};
//!
//! let catalog = Catalog::with_defaults();
//! let tee = catalog.get(1).unwrap();
//!
//! let mut cart = Cart::new();
//! cart.add_item(tee, 1).unwrap();
//! cart.add_item(tee, 1).unwrap();
//!
//! let snapshot = cart.snapshot(DEFAULT_TAX_RATE);
//! assert_eq!(snapshot.lines.len(), 1);
//! assert_eq!(snapshot.totals.total.to_string(), "$65.98");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartSnapshot};
pub use catalog::Catalog;
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{checkout, NewOrder, OrderLedger};
pub use money::{LineItem, Money, Totals};
pub use report::{ChartBar, DailySales, MonthlySummary, ReportPeriod};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Sales tax applied at checkout: 1000 bps = 10%.
///
/// A configuration constant, not derived from products or location.
pub const DEFAULT_TAX_RATE: TaxRate = TaxRate::from_bps(1000);

/// Image shown for products created without one.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.jpg";

/// Number of products shown in the "featured" strip on the home page.
pub const FEATURED_PRODUCT_COUNT: usize = 4;

/// Maximum quantity of a single cart line.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price accepted for a product, in whole currency units.
pub const MAX_PRICE: i64 = 1_000_000;
