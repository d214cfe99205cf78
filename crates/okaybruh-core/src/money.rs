//! # Money Module
//!
//! Provides the `Money` type and the subtotal/tax/total arithmetic.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    29.99 * 2 * 0.1 = 5.998000000000001  ❌ WRONG!                       │
//! │                                                                         │
//! │  Rounding every line to cents compounds error across many lines:        │
//! │    round(a) + round(b) + round(c) != round(a + b + c)                   │
//! │                                                                         │
//! │  OUR SOLUTION: Exact Decimals, Rounded Only For Display                 │
//! │    subtotal 59.98 → tax 5.998 → total 65.978                            │
//! │    Display: $59.98 / $6.00 / $65.98                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use okaybruh_core::money::Money;
//!
//! let price = Money::from_cents(2999); // $29.99
//!
//! let line = price * 2;                      // $59.98
//! let total = line + Money::from_cents(100); // $60.98
//! assert_eq!(total.to_string(), "$60.98");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::TaxRate;

/// Decimal places shown to the customer.
pub const DISPLAY_SCALE: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// An exact monetary amount in the shop currency.
///
/// ## Design Decisions
/// - **Decimal (not f64)**: 0.1 + 0.2 is exactly 0.3
/// - **Full precision internally**: tax on 59.98 is 5.998, not 6.00
/// - **Rounding at presentation only**: see [`Money::rounded`] and `Display`
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Product.price ──┬──► CartLine.price ──► line_total (price × qty)       │
/// │                  │                                                      │
/// │                  └──► Displayed as "$29.99" on the product card         │
/// │                                                                         │
/// │  subtotal ──► tax (10%) ──► total ──► Order.total_amount ──► reports    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use okaybruh_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(2999).to_string(), "$29.99");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns the exact, unrounded amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is less than zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates tax at the given rate, without rounding.
    ///
    /// ## Example
    /// ```rust
    /// use okaybruh_core::money::Money;
    /// use okaybruh_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(5998);       // $59.98
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(1000));
    /// assert_eq!(tax.amount().to_string(), "5.998");
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Cart subtotal: $59.98
    ///      │
    ///      ▼
    /// calculate_tax(10%) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Tax: 5.998 (shown as $6.00)
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // bps / 10000 is the rate as a fraction: 1000 bps = 0.1000
        let fraction = Decimal::new(i64::from(rate.bps()), 4);
        Money(self.0.saturating_mul(fraction).normalize())
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use okaybruh_core::money::Money;
    ///
    /// let line = Money::from_cents(2999).multiply_quantity(3);
    /// assert_eq!(line, Money::from_cents(8997));
    /// ```
    ///
    /// Saturates at the decimal range instead of panicking; prices entered
    /// through [`crate::validation::parse_price`] never get near it.
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(Decimal::from(qty)))
    }

    /// Rounds to cents, half away from zero (5.995 → 6.00).
    ///
    /// Only used at presentation time; totals keep full precision.
    pub fn rounded(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Divides the amount evenly by `count`; zero when `count` is zero.
    pub fn average(&self, count: usize) -> Money {
        if count == 0 {
            return Money::zero();
        }
        Money((self.0 / Decimal::from(count as u64)).normalize())
    }

    /// Lossy float view, for chart scaling only.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money rounded to cents, e.g. `$65.98` or `-$5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut shown = self.rounded().0;
        shown.rescale(DISPLAY_SCALE);
        let sign = if shown.is_sign_negative() && !shown.is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "{}${}", sign, shown.abs())
    }
}

/// Parses `"29.99"`, `"$29.99"` or `" 5 "`.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);

        if digits.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        Decimal::from_str(digits)
            .map(Money)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: format!("'{}' is not a number", s.trim()),
            })
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Line Items & Totals
// =============================================================================

/// Anything priced per unit: cart lines and order items.
pub trait LineItem {
    /// Price of one unit, as captured when the line was created.
    fn unit_price(&self) -> Money;

    /// Number of units.
    fn quantity(&self) -> i64;

    /// `unit_price × quantity`.
    fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity())
    }
}

/// Subtotal, tax and total for a set of line items.
///
/// ## Invariant
/// `total == subtotal + tax` exactly; nothing here is rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl Totals {
    /// Computes totals from a subtotal.
    pub fn from_subtotal(subtotal: Money, rate: TaxRate) -> Self {
        let tax = subtotal.calculate_tax(rate);
        Totals {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    /// Sums line totals, then applies tax once over the subtotal.
    pub fn from_items<L: LineItem>(items: &[L], rate: TaxRate) -> Self {
        let subtotal = items.iter().map(LineItem::line_total).sum();
        Totals::from_subtotal(subtotal, rate)
    }

    /// Totals of a placed order, whose `total` was fixed at checkout.
    ///
    /// The tax is whatever the recorded total holds above the item subtotal,
    /// so a later change of the configured rate does not alter it.
    pub fn from_recorded<L: LineItem>(items: &[L], total: Money) -> Self {
        let subtotal: Money = items.iter().map(LineItem::line_total).sum();
        Totals {
            subtotal,
            tax: total - subtotal,
            total,
        }
    }

    /// The rate these totals were computed with, to the nearest basis point.
    ///
    /// `None` for a zero subtotal.
    pub fn effective_rate(&self) -> Option<TaxRate> {
        if self.subtotal.is_zero() {
            return None;
        }
        let bps = self
            .tax
            .0
            .checked_div(self.subtotal.0)?
            .checked_mul(Decimal::from(10_000))?
            .round()
            .to_u32()?;
        Some(TaxRate::from_bps(bps))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
