//! # Remote Backend
//!
//! Server-backed mode: a REST client for the shop's API service.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET    /products               POST   /cart  {sessionId, productId,..}│
//! │  GET    /products/{id}          PUT    /cart/{lineId}  {quantity}      │
//! │  POST   /products               DELETE /cart/{lineId}                  │
//! │  PUT    /products/{id}          DELETE /cart/clear/{sessionId}         │
//! │  DELETE /products/{id}          GET    /cart/{sessionId}               │
//! │                                                                         │
//! │  POST   /orders                 GET    /reports/summary?month&year     │
//! │  GET    /orders                 GET    /reports/monthly?month&year     │
//! │                                 POST   /payment/qrcode {amount,orderId}│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Decoding Policy
//! Requests are camelCase; responses are accepted in snake_case or
//! camelCase, with numbers or numeric strings for money, and order `items`
//! either as an array or as a JSON-encoded string. After a cart write the
//! cart is read back, so the caller only ever sees lines the service holds.
//!
//! ## Failure Mapping
//! ```text
//! transport error / timeout ──► BackendUnavailable
//! 404 on an id              ──► NotFound
//! other non-2xx             ──► UnexpectedResponse { status, message }
//! undecodable body          ──► Serialization
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::{RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use okaybruh_core::report::{DailySales, MonthlySummary, ReportPeriod};
use okaybruh_core::validation::{
    validate_price, validate_product_name, validate_quantity, validate_stock,
};
use okaybruh_core::{
    CartLine, Money, NewOrder, Order, OrderItem, OrderStatus, PaymentMethod, Product,
    ProductDraft, ProductPatch, SessionId, PLACEHOLDER_IMAGE,
};

use super::{PaymentCode, PaymentCodeProvider, StoreBackend};
use crate::error::{StoreError, StoreResult};

// =============================================================================
// HTTP Client
// =============================================================================

/// Thin wrapper over `reqwest::Client` bound to the API base URL.
#[derive(Debug, Clone)]
struct RestClient {
    http: reqwest::Client,
    base_url: String,
}

/// What a 404 refers to, so it can be reported as `NotFound`.
type Subject = Option<(&'static str, i64)>;

impl RestClient {
    fn new(base_url: &str, timeout: Duration) -> StoreResult<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| StoreError::Internal(format!("invalid API URL '{}': {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StoreError::Internal(format!(
                "API URL must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        Ok(RestClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, subject: Subject) -> StoreResult<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "API request failed");
            StoreError::BackendUnavailable(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            if let Some((entity, id)) = subject {
                return Err(StoreError::not_found(entity, id));
            }
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::UnexpectedResponse {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        subject: Subject,
    ) -> StoreResult<T> {
        let response = self.send(request, subject).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "Undecodable API response");
            StoreError::Serialization(format!("{}: {}", e, preview(&body)))
        })
    }
}

/// Pulls `error`/`message` out of a JSON error body, else the body itself.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["error", "message"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| preview(body))
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct RemoteProduct {
    id: i64,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    price: Money,
    #[serde(default)]
    stock: Option<i64>,
    #[serde(default)]
    image: Option<String>,
}

impl From<RemoteProduct> for Product {
    fn from(p: RemoteProduct) -> Self {
        Product {
            id: p.id,
            name: p.name,
            description: p.description.unwrap_or_default(),
            category: p.category.filter(|c| !c.trim().is_empty()),
            price: p.price,
            stock: p.stock.unwrap_or(0),
            image: p
                .image
                .filter(|i| !i.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

impl From<ProductDraft> for ProductBody {
    fn from(d: ProductDraft) -> Self {
        ProductBody {
            name: Some(d.name.trim().to_string()),
            description: Some(d.description.unwrap_or_default()),
            category: d.category,
            price: Some(d.price.amount()),
            stock: Some(d.stock.unwrap_or(0)),
            image: d.image,
        }
    }
}

impl From<ProductPatch> for ProductBody {
    fn from(p: ProductPatch) -> Self {
        ProductBody {
            name: p.name.map(|n| n.trim().to_string()),
            description: p.description,
            category: p.category,
            price: p.price.map(|m| m.amount()),
            stock: p.stock,
            image: p.image,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Created {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct RemoteCartLine {
    id: i64,
    #[serde(alias = "productId")]
    product_id: i64,
    name: String,
    price: Money,
    #[serde(default)]
    image: Option<String>,
    quantity: i64,
}

impl From<RemoteCartLine> for CartLine {
    fn from(l: RemoteCartLine) -> Self {
        CartLine {
            id: l.id,
            product_id: l.product_id,
            name: l.name,
            price: l.price,
            image: l
                .image
                .filter(|i| !i.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            quantity: l.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddToCartBody<'a> {
    session_id: &'a str,
    product_id: i64,
    quantity: i64,
}

#[derive(Debug, Serialize)]
struct QuantityBody {
    quantity: i64,
}

#[derive(Debug, Serialize)]
struct OrderItemBody<'a> {
    name: &'a str,
    quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaceOrderBody<'a> {
    customer_name: &'a str,
    customer_email: &'a str,
    customer_phone: &'a str,
    items: Vec<OrderItemBody<'a>>,
    #[serde(with = "rust_decimal::serde::float")]
    total_amount: Decimal,
    payment_method: PaymentMethod,
    session_id: &'a str,
}

/// Order items arrive either as an array or as a JSON-encoded string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteItems {
    List(Vec<OrderItem>),
    Encoded(String),
}

impl RemoteItems {
    fn decode(self) -> StoreResult<Vec<OrderItem>> {
        match self {
            RemoteItems::List(items) => Ok(items),
            RemoteItems::Encoded(raw) => Ok(serde_json::from_str(&raw)?),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RemoteOrder {
    id: i64,
    #[serde(default, alias = "customerName")]
    customer_name: Option<String>,
    #[serde(default, alias = "customerEmail")]
    customer_email: Option<String>,
    #[serde(default, alias = "customerPhone")]
    customer_phone: Option<String>,
    #[serde(default)]
    items: Option<RemoteItems>,
    #[serde(default, alias = "totalAmount")]
    total_amount: Option<Money>,
    #[serde(default, alias = "paymentMethod")]
    payment_method: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, alias = "createdAt", alias = "date")]
    created_at: Option<String>,
}

impl RemoteOrder {
    /// Builds the order record; `sent` fills what the service left out.
    fn into_order(self, sent: Option<&NewOrder>) -> StoreResult<Order> {
        let items = match self.items {
            Some(items) => items.decode()?,
            None => sent.map(|o| o.items.clone()).unwrap_or_default(),
        };

        let created_at = match self.created_at.as_deref().and_then(parse_timestamp) {
            Some(at) => at,
            None => {
                debug!(order_id = self.id, "Order has no usable timestamp, using now");
                Utc::now()
            }
        };

        Ok(Order {
            id: self.id,
            customer_name: self
                .customer_name
                .or_else(|| sent.map(|o| o.customer.name.clone()))
                .unwrap_or_default(),
            customer_email: self
                .customer_email
                .or_else(|| sent.map(|o| o.customer.email.clone()))
                .unwrap_or_default(),
            customer_phone: self
                .customer_phone
                .or_else(|| sent.map(|o| o.customer.phone.clone()))
                .unwrap_or_default(),
            total_amount: self
                .total_amount
                .or_else(|| sent.map(NewOrder::total_amount))
                .unwrap_or_default(),
            payment_method: self
                .payment_method
                .and_then(|m| m.parse().ok())
                .or_else(|| sent.map(|o| o.payment_method))
                .unwrap_or_default(),
            status: self
                .status
                .and_then(|s| s.parse().ok())
                .unwrap_or(OrderStatus::Pending),
            created_at,
            items,
        })
    }
}

/// Accepts RFC 3339 and SQL-style `YYYY-MM-DD HH:MM:SS` (taken as UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Deserialize)]
struct RemoteSummary {
    #[serde(default, alias = "totalOrders")]
    total_orders: Option<u64>,
    #[serde(default, alias = "totalRevenue")]
    total_revenue: Option<Money>,
    #[serde(default, alias = "averageOrderValue")]
    average_order_value: Option<Money>,
}

impl From<RemoteSummary> for MonthlySummary {
    fn from(s: RemoteSummary) -> Self {
        let total_orders = s.total_orders.unwrap_or(0);
        let total_revenue = s.total_revenue.unwrap_or_default();
        MonthlySummary {
            total_orders,
            total_revenue,
            average_order_value: s
                .average_order_value
                .unwrap_or_else(|| total_revenue.average(total_orders as usize)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RemoteDailySales {
    date: String,
    #[serde(default, alias = "totalSales")]
    total_sales: Option<Money>,
}

impl RemoteDailySales {
    fn decode(self) -> StoreResult<DailySales> {
        // "2024-05-01" or a full timestamp starting with it
        let day = self.date.get(..10).unwrap_or(&self.date);
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
            StoreError::Serialization(format!("bad report date '{}': {}", self.date, e))
        })?;
        Ok(DailySales {
            date,
            total_sales: self.total_sales.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentCodeBody {
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    order_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentCodeResponse {
    #[serde(alias = "qr_code")]
    qr_code: String,
}

// =============================================================================
// Remote Backend
// =============================================================================

/// Storage backend over the REST service.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: RestClient,
}

impl RemoteBackend {
    /// Creates a client for `base_url`, e.g. `http://localhost:3000/api`.
    ///
    /// ## Errors
    /// `Internal` when the URL does not parse or is not http(s).
    pub fn new(base_url: &str, timeout: Duration) -> StoreResult<Self> {
        Ok(RemoteBackend {
            client: RestClient::new(base_url, timeout)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.client.base_url
    }

    /// A payment-code provider sharing this backend's HTTP client.
    pub fn payment_codes(&self) -> RemotePaymentCodes {
        RemotePaymentCodes {
            client: self.client.clone(),
        }
    }

    fn report_query(period: ReportPeriod) -> [(&'static str, String); 2] {
        [
            ("month", period.month().to_string()),
            ("year", period.year().to_string()),
        ]
    }
}

#[async_trait]
impl StoreBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let c = &self.client;
        let products: Vec<RemoteProduct> = c.json(c.http.get(c.url("/products")), None).await?;
        Ok(products.into_iter().map(Product::from).collect())
    }

    async fn get_product(&self, id: i64) -> StoreResult<Product> {
        let c = &self.client;
        let request = c.http.get(c.url(&format!("/products/{}", id)));
        let product: RemoteProduct = c.json(request, Some(("Product", id))).await?;
        Ok(product.into())
    }

    async fn create_product(&self, draft: ProductDraft) -> StoreResult<Product> {
        validate_product_name(&draft.name)?;
        validate_price(draft.price)?;
        if let Some(stock) = draft.stock {
            validate_stock(stock)?;
        }

        let c = &self.client;
        let body = ProductBody::from(draft);
        let created: Created = c.json(c.http.post(c.url("/products")).json(&body), None).await?;
        debug!(product_id = created.id, "Product created remotely");
        self.get_product(created.id).await
    }

    async fn update_product(&self, id: i64, patch: ProductPatch) -> StoreResult<Product> {
        if let Some(name) = &patch.name {
            validate_product_name(name)?;
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
        }
        if let Some(stock) = patch.stock {
            validate_stock(stock)?;
        }

        let c = &self.client;
        let body = ProductBody::from(patch);
        let request = c.http.put(c.url(&format!("/products/{}", id))).json(&body);
        c.send(request, Some(("Product", id))).await?;
        self.get_product(id).await
    }

    async fn delete_product(&self, id: i64) -> StoreResult<()> {
        let c = &self.client;
        let request = c.http.delete(c.url(&format!("/products/{}", id)));
        c.send(request, Some(("Product", id))).await?;
        Ok(())
    }

    async fn cart_lines(&self, session: &SessionId) -> StoreResult<Vec<CartLine>> {
        let c = &self.client;
        let request = c.http.get(c.url(&format!("/cart/{}", session)));
        let lines: Vec<RemoteCartLine> = c.json(request, None).await?;
        Ok(lines
            .into_iter()
            .map(CartLine::from)
            .filter(|l| l.quantity >= 1)
            .collect())
    }

    async fn add_to_cart(
        &self,
        session: &SessionId,
        product_id: i64,
        quantity: i64,
    ) -> StoreResult<CartLine> {
        validate_quantity(quantity)?;

        let c = &self.client;
        let body = AddToCartBody {
            session_id: session.as_str(),
            product_id,
            quantity,
        };
        c.send(c.http.post(c.url("/cart")).json(&body), Some(("Product", product_id)))
            .await?;

        self.cart_lines(session)
            .await?
            .into_iter()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| StoreError::UnexpectedResponse {
                status: 200,
                message: format!("product {} missing from cart after add", product_id),
            })
    }

    async fn set_cart_quantity(
        &self,
        session: &SessionId,
        line_id: i64,
        quantity: i64,
    ) -> StoreResult<Option<CartLine>> {
        if quantity < 1 {
            self.remove_cart_line(session, line_id).await?;
            return Ok(None);
        }
        validate_quantity(quantity)?;

        let c = &self.client;
        let request = c
            .http
            .put(c.url(&format!("/cart/{}", line_id)))
            .json(&QuantityBody { quantity });
        c.send(request, Some(("Cart line", line_id))).await?;

        let line = self
            .cart_lines(session)
            .await?
            .into_iter()
            .find(|l| l.id == line_id)
            .ok_or_else(|| StoreError::not_found("Cart line", line_id))?;
        Ok(Some(line))
    }

    async fn remove_cart_line(&self, _session: &SessionId, line_id: i64) -> StoreResult<()> {
        let c = &self.client;
        let request = c.http.delete(c.url(&format!("/cart/{}", line_id)));
        match c.send(request, Some(("Cart line", line_id))).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!(line_id, "Cart line already gone");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn clear_cart(&self, session: &SessionId) -> StoreResult<()> {
        let c = &self.client;
        let request = c.http.delete(c.url(&format!("/cart/clear/{}", session)));
        c.send(request, None).await?;
        Ok(())
    }

    async fn place_order(&self, session: &SessionId, order: NewOrder) -> StoreResult<Order> {
        let c = &self.client;
        let body = PlaceOrderBody {
            customer_name: &order.customer.name,
            customer_email: &order.customer.email,
            customer_phone: &order.customer.phone,
            items: order
                .items
                .iter()
                .map(|i| OrderItemBody {
                    name: &i.name,
                    quantity: i.quantity,
                    price: i.price.amount(),
                })
                .collect(),
            total_amount: order.total_amount().amount(),
            payment_method: order.payment_method,
            session_id: session.as_str(),
        };

        let created: RemoteOrder = c.json(c.http.post(c.url("/orders")).json(&body), None).await?;
        let placed = created.into_order(Some(&order))?;

        // The service normally empties the cart itself; make sure of it
        if let Err(e) = self.clear_cart(session).await {
            warn!(order_id = placed.id, error = %e, "Order placed but cart clear failed");
        }

        Ok(placed)
    }

    async fn get_order(&self, id: i64) -> StoreResult<Order> {
        self.list_orders()
            .await?
            .into_iter()
            .find(|o| o.id == id)
            .ok_or_else(|| StoreError::not_found("Order", id))
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let c = &self.client;
        let orders: Vec<RemoteOrder> = c.json(c.http.get(c.url("/orders")), None).await?;
        orders.into_iter().map(|o| o.into_order(None)).collect()
    }

    async fn daily_totals(&self, period: ReportPeriod) -> StoreResult<Vec<DailySales>> {
        let c = &self.client;
        let request = c
            .http
            .get(c.url("/reports/monthly"))
            .query(&Self::report_query(period));
        let days: Vec<RemoteDailySales> = c.json(request, None).await?;

        let mut days = days
            .into_iter()
            .map(RemoteDailySales::decode)
            .collect::<StoreResult<Vec<_>>>()?;
        days.sort_by_key(|d| d.date);
        Ok(days)
    }

    async fn monthly_summary(&self, period: ReportPeriod) -> StoreResult<MonthlySummary> {
        let c = &self.client;
        let request = c
            .http
            .get(c.url("/reports/summary"))
            .query(&Self::report_query(period));
        let summary: RemoteSummary = c.json(request, None).await?;
        Ok(summary.into())
    }
}

// =============================================================================
// Remote Payment Codes
// =============================================================================

/// Payment codes from `POST /payment/qrcode`.
#[derive(Debug, Clone)]
pub struct RemotePaymentCodes {
    client: RestClient,
}

#[async_trait]
impl PaymentCodeProvider for RemotePaymentCodes {
    async fn payment_code(&self, amount: Money, order_id: i64) -> StoreResult<PaymentCode> {
        let c = &self.client;
        let body = PaymentCodeBody {
            amount: amount.amount(),
            order_id,
        };
        let response: PaymentCodeResponse = c
            .json(c.http.post(c.url("/payment/qrcode")).json(&body), None)
            .await?;
        Ok(PaymentCode {
            image: response.qr_code,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
