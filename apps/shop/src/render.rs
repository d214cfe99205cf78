//! # Text Rendering
//!
//! Plain-text views of command responses for the terminal.
//!
//! ## Receipt Layout
//! ```text
//! ==============================================
//!                  Okaybruh Shop
//! ==============================================
//! Order #1                     2024-05-01 10:30
//! Customer: Ana Tan
//! Email:    ana@example.com
//! Phone:    +65 5555 1234
//! Payment:  Cash on Delivery
//! ----------------------------------------------
//! Okaybruh Classic Tee        2 x $29.99  $59.98
//! ----------------------------------------------
//! Subtotal                                $59.98
//! Tax (10%)                                $6.00
//! Total                                   $65.98
//! ==============================================
//! ```
//!
//! Amounts are rounded only here, never in the data being rendered.

use std::fmt::Write;

use okaybruh_core::{LineItem, Money, Order, Product, TaxRate};

use crate::commands::cart::CartResponse;
use crate::commands::order::Receipt;
use crate::commands::product::ProductListResponse;
use crate::commands::report::SalesReport;

const WIDTH: usize = 46;

/// Shown when a month has no orders.
pub const NO_SALES: &str = "No sales data available";

/// Formats an amount with `symbol`, rounded to two decimals.
pub fn money(amount: Money, symbol: &str) -> String {
    let mut shown = amount.abs().rounded().amount();
    shown.rescale(2);
    let sign = if amount.rounded().is_negative() { "-" } else { "" };
    format!("{}{}{}", sign, symbol, shown)
}

fn rule(ch: char) -> String {
    std::iter::repeat(ch).take(WIDTH).collect()
}

/// `left` and `right` on one line, padded to the receipt width.
fn spread(left: &str, right: &str) -> String {
    let gap = WIDTH.saturating_sub(left.chars().count() + right.chars().count()).max(1);
    format!("{}{}{}", left, " ".repeat(gap), right)
}

fn tax_label(rate: TaxRate) -> String {
    format!("Tax ({}%)", rate.percentage())
}

// =============================================================================
// Products
// =============================================================================

pub fn product_list(list: &ProductListResponse, symbol: &str) -> String {
    let mut out = String::new();
    if let Some(category) = &list.category {
        let _ = writeln!(out, "Category: {}", category);
    }
    if list.products.is_empty() {
        out.push_str("No products found");
        return out;
    }

    out.push_str(&products(&list.products, symbol));
    if !list.categories.is_empty() {
        let _ = write!(out, "\n\nCategories: {}", list.categories.join(", "));
    }
    out
}

pub fn products(products: &[Product], symbol: &str) -> String {
    products
        .iter()
        .map(|p| {
            format!(
                "#{:<3} {:<28} {:>9}  {:<12} stock {}",
                p.id,
                p.name,
                money(p.price, symbol),
                p.category.as_deref().unwrap_or("-"),
                p.stock
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn product(p: &Product, symbol: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", p.id, p.name);
    let _ = writeln!(out, "Price:    {}", money(p.price, symbol));
    let _ = writeln!(out, "Category: {}", p.category.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "Stock:    {}", p.stock);
    let _ = writeln!(out, "Image:    {}", p.image);
    if !p.description.is_empty() {
        let _ = write!(out, "\n{}", p.description);
    }
    out.trim_end().to_string()
}

// =============================================================================
// Cart
// =============================================================================

pub fn cart(cart: &CartResponse, rate: TaxRate, symbol: &str) -> String {
    if cart.is_empty() {
        return "Your cart is empty".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Cart ({} items)", cart.item_count);
    let _ = writeln!(out, "{}", rule('-'));
    for line in &cart.lines {
        let left = format!("[{}] {}", line.id, line.name);
        let right = format!(
            "{} x {}  {}",
            line.quantity,
            money(line.price, symbol),
            money(line.line_total(), symbol)
        );
        let _ = writeln!(out, "{}", spread(&left, &right));
    }
    let _ = writeln!(out, "{}", rule('-'));
    let _ = writeln!(out, "{}", spread("Subtotal", &money(cart.totals.subtotal, symbol)));
    let _ = writeln!(out, "{}", spread(&tax_label(rate), &money(cart.totals.tax, symbol)));
    let _ = write!(out, "{}", spread("Total", &money(cart.totals.total, symbol)));
    out
}

// =============================================================================
// Orders
// =============================================================================

/// The tax line is labelled with the rate the order was actually charged.
pub fn receipt(receipt: &Receipt, symbol: &str) -> String {
    let tax = match receipt.totals.effective_rate() {
        Some(rate) => tax_label(rate),
        None => "Tax".to_string(),
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(out, "{:^width$}", receipt.store_name, width = WIDTH);
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(
        out,
        "{}",
        spread(
            &format!("Order #{}", receipt.order_id),
            &receipt.created_at.format("%Y-%m-%d %H:%M").to_string()
        )
    );
    let _ = writeln!(out, "Customer: {}", receipt.customer_name);
    let _ = writeln!(out, "Email:    {}", receipt.customer_email);
    let _ = writeln!(out, "Phone:    {}", receipt.customer_phone);
    let _ = writeln!(out, "Payment:  {}", receipt.payment_label);
    let _ = writeln!(out, "{}", rule('-'));
    for item in &receipt.items {
        let right = format!(
            "{} x {}  {}",
            item.quantity,
            money(item.price, symbol),
            money(item.line_total(), symbol)
        );
        let _ = writeln!(out, "{}", spread(&item.name, &right));
    }
    let _ = writeln!(out, "{}", rule('-'));
    let _ = writeln!(out, "{}", spread("Subtotal", &money(receipt.totals.subtotal, symbol)));
    let _ = writeln!(out, "{}", spread(&tax, &money(receipt.totals.tax, symbol)));
    let _ = writeln!(out, "{}", spread("Total", &money(receipt.totals.total, symbol)));
    let _ = write!(out, "{}", rule('='));

    if let Some(code) = &receipt.payment_code {
        let _ = write!(out, "\nScan to pay: {}", code);
    }
    if let Some(reason) = &receipt.payment_code_error {
        let _ = write!(out, "\nQR code unavailable ({}). Your order is placed.", reason);
    }
    out
}

/// One line per order: id, date, items summary, total, status.
pub fn orders(orders: &[Order], symbol: &str) -> String {
    if orders.is_empty() {
        return "No orders yet".to_string();
    }
    orders
        .iter()
        .map(|o| {
            format!(
                "#{:<4} {}  {:<10} {:>10}  {}  [{}]",
                o.id,
                o.created_at.format("%Y-%m-%d"),
                o.status,
                money(o.total_amount, symbol),
                o.customer_name,
                o.items_summary()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Reports
// =============================================================================

pub fn report(report: &SalesReport, symbol: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Sales report: {}", report.period.label());
    let _ = writeln!(out, "{}", rule('-'));
    let _ = writeln!(out, "Total orders:        {}", report.summary.total_orders);
    let _ = writeln!(
        out,
        "Total revenue:       {}",
        money(report.summary.total_revenue, symbol)
    );
    let _ = writeln!(
        out,
        "Average order value: {}",
        money(report.summary.average_order_value, symbol)
    );
    let _ = writeln!(out);

    if report.bars.is_empty() {
        out.push_str(NO_SALES);
        return out;
    }

    let lines: Vec<String> = report
        .bars
        .iter()
        .map(|bar| {
            let filled = bar.height.round() as usize;
            format!(
                "{:>2} | {:<width$} {}",
                bar.label,
                "#".repeat(filled),
                money(bar.value, symbol),
                width = crate::commands::report::CHART_WIDTH as usize
            )
        })
        .collect();
    out.push_str(&lines.join("\n"));
    out
}
