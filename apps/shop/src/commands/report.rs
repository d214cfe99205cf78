//! # Report Commands
//!
//! Monthly sales summary plus the daily series behind the bar chart.

use serde::Serialize;
use tracing::debug;

use okaybruh_core::report::chart_bars;
use okaybruh_core::{ChartBar, DailySales, MonthlySummary, ReportPeriod};

use crate::error::ApiError;
use crate::state::Shop;

/// Width of the tallest chart bar, in characters.
pub const CHART_WIDTH: f64 = 40.0;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub period: ReportPeriod,
    pub summary: MonthlySummary,
    pub days: Vec<DailySales>,
    pub bars: Vec<ChartBar>,
}

/// Builds the report for `month`/`year` (validated here, 1..=12).
pub async fn sales_report(shop: &Shop, month: u32, year: i32) -> Result<SalesReport, ApiError> {
    debug!(month, year, "sales_report command");

    let period = ReportPeriod::new(month, year)?;
    let summary = shop.backend().monthly_summary(period).await?;
    let days = shop.backend().daily_totals(period).await?;
    let bars = chart_bars(&days, CHART_WIDTH);

    Ok(SalesReport {
        period,
        summary,
        days,
        bars,
    })
}
