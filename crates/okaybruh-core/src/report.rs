//! # Reporting Aggregator
//!
//! Pure functions over the order ledger's current contents: per-day revenue,
//! the monthly summary, and bar-chart scaling for the admin dashboard.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  &[Order] ──filter(period)──┬──► daily_totals() ──► chart_bars()        │
//! │                             │      [{date, totalSales}]  [{label, h}]   │
//! │                             │                                           │
//! │                             └──► monthly_summary()                      │
//! │                                    {totalOrders, totalRevenue, avg}     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Orders are grouped by the UTC calendar date of `created_at`.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::Order;
use crate::validation::validate_month;

// =============================================================================
// Period
// =============================================================================

/// A calendar month, e.g. May 2024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportPeriod {
    month: u32,
    year: i32,
}

impl ReportPeriod {
    /// ## Errors
    /// `Validation` when `month` is outside 1..=12.
    pub fn new(month: u32, year: i32) -> CoreResult<Self> {
        validate_month(month)?;
        Ok(ReportPeriod { month, year })
    }

    /// The month containing `at`.
    pub fn containing(at: DateTime<Utc>) -> Self {
        ReportPeriod {
            month: at.month(),
            year: at.year(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        at.month() == self.month && at.year() == self.year
    }

    /// e.g. `May 2024`
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{:02}/{}", self.month, self.year))
    }
}

// =============================================================================
// Results
// =============================================================================

/// Revenue for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    /// `YYYY-MM-DD`
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[serde(alias = "total_sales")]
    pub total_sales: Money,
}

/// Count, revenue and average order value for a month.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    #[serde(alias = "total_orders")]
    pub total_orders: u64,
    #[serde(alias = "total_revenue")]
    pub total_revenue: Money,
    #[serde(alias = "average_order_value")]
    pub average_order_value: Money,
}

/// One bar of the daily sales chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChartBar {
    /// Day of month, e.g. `"1"`.
    pub label: String,
    pub value: Money,
    /// Bar height in the caller's units, `0..=max_height`.
    pub height: f64,
}

// =============================================================================
// Aggregation
// =============================================================================

/// Orders created within `period`, in ledger order.
pub fn orders_in<'a>(orders: &'a [Order], period: ReportPeriod) -> impl Iterator<Item = &'a Order> {
    orders.iter().filter(move |o| period.contains(&o.created_at))
}

/// Per-day revenue for `period`, sorted by date. Empty when nothing matched.
pub fn daily_totals(orders: &[Order], period: ReportPeriod) -> Vec<DailySales> {
    let mut by_day: BTreeMap<NaiveDate, Money> = BTreeMap::new();
    for order in orders_in(orders, period) {
        *by_day.entry(order.created_at.date_naive()).or_default() += order.total_amount;
    }

    by_day
        .into_iter()
        .map(|(date, total_sales)| DailySales { date, total_sales })
        .collect()
}

/// Order count, revenue and average for `period`. All zero for an empty month.
pub fn monthly_summary(orders: &[Order], period: ReportPeriod) -> MonthlySummary {
    let (count, revenue) = orders_in(orders, period)
        .fold((0usize, Money::zero()), |(n, sum), o| (n + 1, sum + o.total_amount));

    MonthlySummary {
        total_orders: count as u64,
        total_revenue: revenue,
        average_order_value: revenue.average(count),
    }
}

/// Scales daily totals into bars no taller than `max_height`.
///
/// The tallest bar is scaled against `max(largest value, 1)`, so a month of
/// tiny sales does not blow up to full height.
pub fn chart_bars(days: &[DailySales], max_height: f64) -> Vec<ChartBar> {
    let max_sales = days
        .iter()
        .map(|d| d.total_sales.to_f64())
        .fold(1.0_f64, f64::max);

    days.iter()
        .map(|d| ChartBar {
            label: d.date.day().to_string(),
            value: d.total_sales,
            height: d.total_sales.to_f64() / max_sales * max_height,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderItem, OrderStatus, PaymentMethod};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn order(id: i64, cents: i64, y: i32, m: u32, d: u32, h: u32) -> Order {
        Order {
            id,
            customer_name: "Ana".to_string(),
            customer_email: "ana@example.com".to_string(),
            customer_phone: "555".to_string(),
            items: vec![OrderItem {
                name: "Classic Tee".to_string(),
                quantity: 1,
                price: Money::from_cents(cents),
            }],
            total_amount: Money::from_cents(cents),
            payment_method: PaymentMethod::Cash,
            status: OrderStatus::Pending,
            created_at: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
        }
    }

    fn may_orders() -> Vec<Order> {
        vec![
            order(1, 2000, 2024, 5, 1, 9),
            order(2, 1000, 2024, 5, 2, 10),
            order(3, 3000, 2024, 5, 1, 18),
            order(4, 9900, 2024, 6, 1, 0),
            order(5, 9900, 2023, 5, 1, 0),
        ]
    }

    #[test]
    fn test_daily_totals_scenario() {
        let period = ReportPeriod::new(5, 2024).unwrap();
        let days = daily_totals(&may_orders(), period);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(days[0].total_sales.amount(), dec!(50));
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(days[1].total_sales.amount(), dec!(10));

        let json = serde_json::to_value(&days[0]).unwrap();
        assert_eq!(json["date"], "2024-05-01");
        assert!(json.get("totalSales").is_some());
    }

    #[test]
    fn test_monthly_summary_scenario() {
        let period = ReportPeriod::new(5, 2024).unwrap();
        let summary = monthly_summary(&may_orders(), period);

        assert_eq!(summary.total_orders, 3);
        assert_eq!(summary.total_revenue.amount(), dec!(60));
        assert_eq!(summary.average_order_value.amount(), dec!(20));
    }

    #[test]
    fn test_empty_month_is_all_zero() {
        let period = ReportPeriod::new(1, 2030).unwrap();
        assert!(daily_totals(&may_orders(), period).is_empty());

        let summary = monthly_summary(&may_orders(), period);
        assert_eq!(summary, MonthlySummary::default());
        assert_eq!(summary.total_orders, 0);
        assert!(summary.average_order_value.is_zero());
    }

    #[test]
    fn test_month_out_of_range() {
        assert!(ReportPeriod::new(0, 2024).is_err());
        assert!(ReportPeriod::new(13, 2024).is_err());
        assert_eq!(ReportPeriod::new(5, 2024).unwrap().label(), "May 2024");
    }

    #[test]
    fn test_summary_accepts_snake_case() {
        let summary: MonthlySummary = serde_json::from_str(
            r#"{"total_orders": 3, "total_revenue": "60", "average_order_value": 20}"#,
        )
        .unwrap();
        assert_eq!(summary.total_orders, 3);
        assert_eq!(summary.total_revenue, Money::from_cents(6000));
    }

    #[test]
    fn test_chart_bars_scale_to_tallest() {
        let period = ReportPeriod::new(5, 2024).unwrap();
        let bars = chart_bars(&daily_totals(&may_orders(), period), 200.0);

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].label, "1");
        assert!((bars[0].height - 200.0).abs() < 1e-9);
        assert!((bars[1].height - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_chart_bars_floor_of_one() {
        let days = vec![DailySales {
            date: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            total_sales: Money::from_cents(50),
        }];
        let bars = chart_bars(&days, 100.0);
        assert!((bars[0].height - 50.0).abs() < 1e-9);
        assert!(chart_bars(&[], 100.0).is_empty());
    }
}
