//! # Inventory API Client
//!
//! Typed access to the inventory REST backend.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         API Request Flow                                │
//! │                                                                         │
//! │  caller ──► InventoryApi::sales_orders()                               │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  HttpApiClient ── GET {base}/sales  (Authorization: Bearer …)          │
//! │                  │                                                      │
//! │        ┌─────────┴──────────┐                                           │
//! │        ▼                    ▼                                           │
//! │   2xx: JSON body       4xx/5xx: ClientError::Status                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   normalize_collection(body, "salesOrders") ──► Vec<SalesOrder>        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status changes go through [`change_sales_status`] and
//! [`change_return_status`], which reject moves outside the lifecycle
//! tables before anything is sent.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use stockpile_core::metrics::ReturnStats;
use stockpile_core::status::{ReturnStatusUpdate, SalesStatusUpdate};
use stockpile_core::validation::{CreatePurchase, CreateSalesOrder, ProductInput, Registration, StockAddition};
use stockpile_core::{
    ExpectedReturn, Product, Purchase, ReturnStatus, SalesOrder, SalesStatus, Supplier, Warehouse,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ApiSettings;
use crate::error::{ClientError, ClientResult};
use crate::normalize::{normalize_collection, normalize_record, sibling_field, ShapeError};

// =============================================================================
// Reports
// =============================================================================

/// Server-side reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    DashboardSummary,
    DashboardMain,
    WeeklySales,
    MonthlyInventory,
    SupplierPerformance,
    ReturnAnalysis,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        ReportKind::DashboardSummary,
        ReportKind::DashboardMain,
        ReportKind::WeeklySales,
        ReportKind::MonthlyInventory,
        ReportKind::SupplierPerformance,
        ReportKind::ReturnAnalysis,
    ];

    pub fn path(self) -> &'static str {
        match self {
            ReportKind::DashboardSummary => "reports/dashboard/summary",
            ReportKind::DashboardMain => "reports/dashboard/main",
            ReportKind::WeeklySales => "reports/weekly-sales",
            ReportKind::MonthlyInventory => "reports/monthly-inventory",
            ReportKind::SupplierPerformance => "reports/supplier-performance",
            ReportKind::ReturnAnalysis => "reports/return-analysis",
        }
    }

    /// Whether the report takes `startDate`/`endDate`.
    pub fn accepts_range(self) -> bool {
        matches!(
            self,
            ReportKind::SupplierPerformance | ReportKind::ReturnAnalysis
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::DashboardSummary => "dashboard-summary",
            ReportKind::DashboardMain => "dashboard-main",
            ReportKind::WeeklySales => "weekly-sales",
            ReportKind::MonthlyInventory => "monthly-inventory",
            ReportKind::SupplierPerformance => "supplier-performance",
            ReportKind::ReturnAnalysis => "return-analysis",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown report '{s}'"))
    }
}

/// Inclusive date window for ranged reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The `days` calendar days ending with `today`, both ends inclusive.
    /// Zero is treated as one day.
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        DateRange {
            start: today - chrono::Duration::days(i64::from(days.max(1)) - 1),
            end: today,
        }
    }

    fn query(&self) -> [(&'static str, String); 2] {
        [
            ("startDate", self.start.format("%Y-%m-%d").to_string()),
            ("endDate", self.end.format("%Y-%m-%d").to_string()),
        ]
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Expected returns plus their counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnsPage {
    pub returns: Vec<ExpectedReturn>,
    pub stats: ReturnStats,
}

/// Acknowledgement of `POST /warehouses/:id/add-stock`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdded {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub quantity: i64,
}

// =============================================================================
// API Trait
// =============================================================================

/// Every backend call the dashboard makes.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn products(&self) -> ClientResult<Vec<Product>>;
    async fn product(&self, id: &str) -> ClientResult<Product>;
    async fn create_product(&self, input: &ProductInput) -> ClientResult<Product>;
    async fn update_product(&self, id: &str, input: &ProductInput) -> ClientResult<Product>;
    async fn delete_product(&self, id: &str) -> ClientResult<()>;
    /// Asks the backend for a SKU derived from `product_name`.
    async fn generate_sku(&self, product_name: &str) -> ClientResult<String>;

    async fn warehouses(&self) -> ClientResult<Vec<Warehouse>>;
    async fn warehouse(&self, id: &str) -> ClientResult<Warehouse>;
    async fn add_stock(&self, warehouse_id: &str, addition: &StockAddition) -> ClientResult<StockAdded>;
    async fn delete_warehouse(&self, id: &str) -> ClientResult<()>;

    async fn sales_orders(&self) -> ClientResult<Vec<SalesOrder>>;
    async fn create_sales_order(&self, order: &CreateSalesOrder) -> ClientResult<SalesOrder>;
    async fn update_sales_status(&self, id: &str, update: &SalesStatusUpdate) -> ClientResult<SalesOrder>;

    async fn purchases(&self) -> ClientResult<Vec<Purchase>>;
    async fn create_purchase(&self, purchase: &CreatePurchase) -> ClientResult<Purchase>;

    async fn suppliers(&self) -> ClientResult<Vec<Supplier>>;

    /// Creates a user account; the body is whatever the backend acknowledges with.
    async fn register(&self, registration: &Registration) -> ClientResult<Value>;

    async fn expected_returns(&self, status: Option<ReturnStatus>) -> ClientResult<ReturnsPage>;
    async fn update_return_status(&self, id: &str, update: &ReturnStatusUpdate) -> ClientResult<ExpectedReturn>;

    /// Raw report body; report shapes are not modelled.
    async fn report(&self, kind: ReportKind, range: Option<DateRange>) -> ClientResult<Value>;
}

// =============================================================================
// Guarded Mutations
// =============================================================================

/// Moves a sales order to `next` if the lifecycle allows it.
///
/// Disallowed moves fail with `CoreError::InvalidTransition` and make no
/// request.
pub async fn change_sales_status<A: InventoryApi + ?Sized>(
    api: &A,
    order: &SalesOrder,
    next: SalesStatus,
) -> ClientResult<SalesOrder> {
    let next = order.status.transition(next)?;
    if order.status.restores_stock(next) {
        info!(order = %order.display_number(), "Returning delivered order, backend restores stock");
    }
    api.update_sales_status(&order.id, &SalesStatusUpdate { status: next })
        .await
}

/// Moves an expected return to `next` if the lifecycle allows it.
pub async fn change_return_status<A: InventoryApi + ?Sized>(
    api: &A,
    expected: &ExpectedReturn,
    next: ReturnStatus,
    now: DateTime<Utc>,
) -> ClientResult<ExpectedReturn> {
    let update = expected.status.transition(next, now)?;
    api.update_return_status(&expected.id, &update).await
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// [`InventoryApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpApiClient {
    pub fn new(settings: &ApiSettings) -> ClientResult<Self> {
        let mut base = Url::parse(&settings.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http,
            base,
            token: settings.token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.base.join(path.trim_start_matches('/'))?;
        let mut request = self.http.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    /// Sends the request and returns the JSON body (`Null` when empty).
    async fn call(&self, method: Method, path: &str, build: impl FnOnce(RequestBuilder) -> RequestBuilder) -> ClientResult<Value> {
        let endpoint = format!("{method} /{}", path.trim_start_matches('/'));
        let request = build(self.request(method, path)?);
        let started = Instant::now();

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(&endpoint, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::from_reqwest(&endpoint, e))?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if !status.is_success() {
            let message = error_message(&body);
            warn!(%endpoint, status = status.as_u16(), elapsed_ms, %message, "API call failed");
            return Err(ClientError::Status {
                endpoint,
                status: status.as_u16(),
                message,
            });
        }

        debug!(%endpoint, status = status.as_u16(), elapsed_ms, bytes = body.len(), "API call succeeded");
        if body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body)
            .map_err(|e| ClientError::shape(&endpoint, ShapeError::Malformed(e.to_string())))
    }

    async fn get_collection<T: DeserializeOwned>(&self, path: &str, key: &str, query: &[(&str, String)]) -> ClientResult<Vec<T>> {
        let body = self.call(Method::GET, path, |r| r.query(query)).await?;
        normalize_collection(body, key).map_err(|e| ClientError::shape(path, e))
    }

    async fn get_record<T: DeserializeOwned>(&self, path: &str, key: &str) -> ClientResult<T> {
        let body = self.call(Method::GET, path, |r| r).await?;
        normalize_record(body, key).map_err(|e| ClientError::shape(path, e))
    }

    async fn send_record<B, T>(&self, method: Method, path: &str, key: &str, payload: &B) -> ClientResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.call(method, path, |r| r.json(payload)).await?;
        normalize_record(body, key).map_err(|e| ClientError::shape(path, e))
    }
}

/// Best human-readable message in an error body.
fn error_message(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        for key in ["error", "message", "msg"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        "no response body".to_string()
    } else {
        text.chars().take(200).collect()
    }
}

#[async_trait]
impl InventoryApi for HttpApiClient {
    async fn products(&self) -> ClientResult<Vec<Product>> {
        self.get_collection("products", "products", &[]).await
    }

    async fn product(&self, id: &str) -> ClientResult<Product> {
        self.get_record(&format!("products/{id}"), "product").await
    }

    async fn create_product(&self, input: &ProductInput) -> ClientResult<Product> {
        self.send_record(Method::POST, "products", "product", input).await
    }

    async fn update_product(&self, id: &str, input: &ProductInput) -> ClientResult<Product> {
        self.send_record(Method::PUT, &format!("products/{id}"), "product", input)
            .await
    }

    async fn delete_product(&self, id: &str) -> ClientResult<()> {
        self.call(Method::DELETE, &format!("products/{id}"), |r| r).await?;
        Ok(())
    }

    async fn generate_sku(&self, product_name: &str) -> ClientResult<String> {
        let path = "products/generate-sku";
        let body = self
            .call(Method::POST, path, |r| r.json(&json!({ "productName": product_name.trim() })))
            .await?;
        body.get("sku")
            .or_else(|| body.get("data").and_then(|d| d.get("sku")))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::shape(path, ShapeError::Malformed("missing `sku`".into())))
    }

    async fn warehouses(&self) -> ClientResult<Vec<Warehouse>> {
        self.get_collection("warehouses", "warehouses", &[]).await
    }

    async fn warehouse(&self, id: &str) -> ClientResult<Warehouse> {
        self.get_record(&format!("warehouses/{id}"), "warehouse").await
    }

    async fn add_stock(&self, warehouse_id: &str, addition: &StockAddition) -> ClientResult<StockAdded> {
        addition.validate()?;
        self.send_record(
            Method::POST,
            &format!("warehouses/{warehouse_id}/add-stock"),
            "addedStock",
            addition,
        )
        .await
    }

    async fn delete_warehouse(&self, id: &str) -> ClientResult<()> {
        self.call(Method::DELETE, &format!("warehouses/{id}"), |r| r).await?;
        Ok(())
    }

    async fn sales_orders(&self) -> ClientResult<Vec<SalesOrder>> {
        self.get_collection("sales", "salesOrders", &[]).await
    }

    async fn create_sales_order(&self, order: &CreateSalesOrder) -> ClientResult<SalesOrder> {
        self.send_record(Method::POST, "sales", "salesOrder", order).await
    }

    async fn update_sales_status(&self, id: &str, update: &SalesStatusUpdate) -> ClientResult<SalesOrder> {
        self.send_record(Method::PATCH, &format!("sales/{id}/status"), "salesOrder", update)
            .await
    }

    async fn purchases(&self) -> ClientResult<Vec<Purchase>> {
        self.get_collection("purchases", "purchases", &[]).await
    }

    async fn create_purchase(&self, purchase: &CreatePurchase) -> ClientResult<Purchase> {
        self.send_record(Method::POST, "purchases", "purchase", purchase)
            .await
    }

    async fn suppliers(&self) -> ClientResult<Vec<Supplier>> {
        self.get_collection("suppliers", "suppliers", &[]).await
    }

    async fn register(&self, registration: &Registration) -> ClientResult<Value> {
        let body = self
            .call(Method::POST, "auth/register", |r| r.json(registration))
            .await?;
        info!(email = %registration.email, role = %registration.role, "Account registered");
        Ok(body)
    }

    async fn expected_returns(&self, status: Option<ReturnStatus>) -> ClientResult<ReturnsPage> {
        let path = "expected-returns";
        let query: Vec<(&str, String)> = status
            .map(|s| ("status", s.as_str().to_string()))
            .into_iter()
            .collect();
        let body = self.call(Method::GET, path, |r| r.query(&query)).await?;
        let stats: Option<ReturnStats> = sibling_field(&body, "stats");
        let returns: Vec<ExpectedReturn> =
            normalize_collection(body, "expectedReturns").map_err(|e| ClientError::shape(path, e))?;
        let stats = stats.unwrap_or_else(|| ReturnStats::compute(&returns));
        Ok(ReturnsPage { returns, stats })
    }

    async fn update_return_status(&self, id: &str, update: &ReturnStatusUpdate) -> ClientResult<ExpectedReturn> {
        self.send_record(
            Method::PATCH,
            &format!("expected-returns/{id}/status"),
            "expectedReturn",
            update,
        )
        .await
    }

    async fn report(&self, kind: ReportKind, range: Option<DateRange>) -> ClientResult<Value> {
        let query: Vec<(&str, String)> = match range {
            Some(range) if kind.accepts_range() => range.query().into_iter().collect(),
            _ => Vec::new(),
        };
        self.call(Method::GET, kind.path(), |r| r.query(&query)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpile_core::validation::{ProductForm, PurchaseForm, PurchaseItemInput, RegistrationForm};
    use stockpile_core::{CoreError, Money};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, token: Option<&str>) -> HttpApiClient {
        HttpApiClient::new(&ApiSettings {
            base_url: format!("{}/api", server.uri()),
            token: token.map(str::to_string),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn order_json(id: &str, status: &str) -> Value {
        json!({ "_id": id, "orderNumber": format!("SO-{id}"), "status": status, "totalAmount": 125.5 })
    }

    #[tokio::test]
    async fn test_lists_sales_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/sales"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "salesOrders": [order_json("1", "pending"), order_json("2", "shipped")]
            })))
            .mount(&server)
            .await;

        let sales = client(&server, Some("secret")).sales_orders().await.unwrap();
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[1].status, SalesStatus::Dispatch);
        assert_eq!(sales[0].total_amount.cents(), 12550);
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;

        let err = client(&server, None).products().await.unwrap_err();
        assert!(matches!(err, ClientError::Shape { .. }), "{err}");
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_error_status_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/warehouses"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "error": "database offline" })))
            .mount(&server)
            .await;

        let err = client(&server, None).warehouses().await.unwrap_err();
        match &err {
            ClientError::Status { status, message, .. } => {
                assert_eq!(*status, 503);
                assert_eq!(message, "database offline");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_allowed_status_change_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/sales/1/status"))
            .and(body_json(json!({ "status": "dispatch" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "salesOrder": order_json("1", "dispatch")
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, None);
        let order: SalesOrder = serde_json::from_value(order_json("1", "pending")).unwrap();
        let updated = change_sales_status(&api, &order, SalesStatus::Dispatch).await.unwrap();
        assert_eq!(updated.status, SalesStatus::Dispatch);
    }

    #[tokio::test]
    async fn test_disallowed_status_change_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let api = client(&server, None);
        let order: SalesOrder = serde_json::from_value(order_json("1", "delivered")).unwrap();
        let err = change_sales_status(&api, &order, SalesStatus::Cancelled).await.unwrap_err();
        assert!(matches!(err, ClientError::Core(CoreError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_received_return_carries_actual_date() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/expected-returns/r1/status"))
            .and(body_json(json!({
                "status": "received",
                "actualReturnDate": "2024-05-02T09:00:00Z"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "r1", "status": "received"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, None);
        let expected: ExpectedReturn =
            serde_json::from_value(json!({ "_id": "r1", "status": "in_transit" })).unwrap();
        let now = "2024-05-02T09:00:00Z".parse().unwrap();
        let updated = change_return_status(&api, &expected, ReturnStatus::Received, now)
            .await
            .unwrap();
        assert_eq!(updated.status, ReturnStatus::Received);
    }

    #[tokio::test]
    async fn test_expected_returns_filter_and_stats() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/expected-returns"))
            .and(query_param("status", "pending"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "expectedReturns": [
                    { "_id": "r1", "status": "pending" },
                    { "_id": "r2", "status": "pending" }
                ]
            })))
            .mount(&server)
            .await;

        let page = client(&server, None)
            .expected_returns(Some(ReturnStatus::Pending))
            .await
            .unwrap();
        assert_eq!(page.returns.len(), 2);
        assert_eq!(page.stats.pending, 2);
        assert_eq!(page.stats.total, 2);
    }

    #[tokio::test]
    async fn test_ranged_report_sends_dates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/reports/return-analysis"))
            .and(query_param("startDate", "2024-04-03"))
            .and(query_param("endDate", "2024-05-02"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "totalReturns": 3 })))
            .mount(&server)
            .await;

        let today = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let body = client(&server, None)
            .report(ReportKind::ReturnAnalysis, Some(DateRange::trailing(today, 30)))
            .await
            .unwrap();
        assert_eq!(body["totalReturns"], 3);
    }

    #[tokio::test]
    async fn test_generate_sku() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/products/generate-sku"))
            .and(body_json(json!({ "productName": "Steel Bolt" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sku": "STE-BOL-001" })))
            .mount(&server)
            .await;

        let sku = client(&server, None).generate_sku(" Steel Bolt ").await.unwrap();
        assert_eq!(sku, "STE-BOL-001");
    }

    #[tokio::test]
    async fn test_fetches_one_product_and_one_warehouse() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "product": { "_id": "p1", "name": "Kettle", "sku": "KET-001", "sellingPrice": 45 }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/warehouses/w1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "w1", "name": "Main", "capacity": 100,
                "currentStock": [{ "productId": "p1", "quantity": 12 }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, None);
        let product = api.product("p1").await.unwrap();
        assert_eq!(product.sku, "KET-001");
        assert_eq!(product.selling_price.cents(), 4500);

        let warehouse = api.warehouse("w1").await.unwrap();
        assert_eq!(warehouse.name, "Main");
        assert_eq!(warehouse.stock_total(), 12);
    }

    #[tokio::test]
    async fn test_update_product_uses_put() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/products/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "product": { "_id": "p1", "name": "Kettle XL", "sku": "KET-002" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let input = ProductForm {
            name: "Kettle XL".to_string(),
            sku: "KET-002".to_string(),
            category: "Kitchen".to_string(),
            selling_price: Money::from_cents(5000),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let updated = client(&server, None).update_product("p1", &input).await.unwrap();
        assert_eq!(updated.name, "Kettle XL");

        let requests = server.received_requests().await.unwrap();
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent["sku"], "KET-002");
        assert_eq!(sent["unit"], "pcs");
    }

    #[tokio::test]
    async fn test_deletes_use_delete_method() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/products/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "deleted" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/warehouses/w1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, None);
        api.delete_product("p1").await.unwrap();
        api.delete_warehouse("w1").await.unwrap();
    }

    #[tokio::test]
    async fn test_lists_suppliers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/suppliers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [
                    { "_id": "s1", "name": "Bolt Traders", "email": "sales@bolt.pk" },
                    { "_id": "s2", "name": "Lahore Steel" }
                ]
            })))
            .mount(&server)
            .await;

        let suppliers = client(&server, None).suppliers().await.unwrap();
        let names: Vec<&str> = suppliers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Bolt Traders", "Lahore Steel"]);
        assert_eq!(suppliers[0].email.as_deref(), Some("sales@bolt.pk"));
    }

    #[tokio::test]
    async fn test_create_purchase_posts_totals() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/purchases"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "purchase": {
                    "_id": "pu1", "purchaseNumber": "PO-0007", "supplierId": "s1",
                    "totalAmount": 30, "finalAmount": 31.5, "paymentStatus": "pending"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let form = PurchaseForm {
            supplier_id: "s1".to_string(),
            items: vec![PurchaseItemInput {
                product_id: "p1".to_string(),
                quantity: 3,
                unit_price: Money::from_cents(1000),
            }],
            tax_amount: Money::from_cents(150),
            ..Default::default()
        };
        let purchase = client(&server, None)
            .create_purchase(&form.validate().unwrap())
            .await
            .unwrap();
        assert_eq!(purchase.purchase_number, "PO-0007");
        assert_eq!(purchase.final_amount, Some(Money::from_cents(3150)));

        let requests = server.received_requests().await.unwrap();
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent["supplierId"], "s1");
        assert_eq!(sent["totalAmount"].as_f64(), Some(30.0));
        assert_eq!(sent["finalAmount"].as_f64(), Some(31.5));
    }

    #[tokio::test]
    async fn test_register_posts_normalized_account() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .and(body_json(json!({
                "firstName": "Ayesha",
                "lastName": "Khan",
                "email": "ayesha@example.com",
                "password": "Secret1",
                "role": "manager"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "User registered" })))
            .expect(1)
            .mount(&server)
            .await;

        let registration = RegistrationForm {
            first_name: " Ayesha ".to_string(),
            last_name: "Khan".to_string(),
            email: "Ayesha@Example.com".to_string(),
            password: "Secret1".to_string(),
            role: "manager".to_string(),
        }
        .validate()
        .unwrap();
        let body = client(&server, None).register(&registration).await.unwrap();
        assert_eq!(body["message"], "User registered");
    }

    #[test]
    fn test_trailing_range_counts_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        let week = DateRange::trailing(today, 7);
        assert_eq!(week.start, NaiveDate::from_ymd_opt(2024, 5, 25).unwrap());
        assert_eq!((week.end - week.start).num_days() + 1, 7);
        assert_eq!(DateRange::trailing(today, 0).start, today);
    }

    #[test]
    fn test_report_kind_parsing() {
        assert_eq!("weekly-sales".parse::<ReportKind>().unwrap(), ReportKind::WeeklySales);
        assert!("daily".parse::<ReportKind>().is_err());
        assert!(ReportKind::SupplierPerformance.accepts_range());
        assert!(!ReportKind::DashboardMain.accepts_range());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(br#"{"message":"nope"}"#), "nope");
        assert_eq!(error_message(b"plain failure"), "plain failure");
        assert_eq!(error_message(b""), "no response body");
    }
}
