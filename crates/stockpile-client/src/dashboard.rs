//! # Dashboard Refresh
//!
//! One refresh fetches the four collections concurrently, substitutes an
//! empty collection for every request that fails, and aggregates.
//!
//! ```text
//!            ┌── GET /sales ─────┐
//!            ├── GET /products ──┤   any Err ──► notifier + []
//!  refresh ──┼── GET /warehouses ┼──────────────────────────────► aggregate()
//!            └── GET /purchases ─┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use stockpile_core::{
    aggregate, AggregateOptions, DashboardInput, DashboardMetrics, Product, Purchase, SalesOrder,
    Warehouse,
};
use tracing::debug;

use crate::api::InventoryApi;
use crate::error::ClientResult;
use crate::notify::Notifier;

/// Raw collections of one refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardData {
    pub sales: Vec<SalesOrder>,
    pub products: Vec<Product>,
    pub warehouses: Vec<Warehouse>,
    pub purchases: Vec<Purchase>,
    /// Collections that failed and were replaced by an empty list.
    pub failed: Vec<&'static str>,
}

impl DashboardData {
    pub fn input(&self) -> DashboardInput<'_> {
        DashboardInput {
            sales: &self.sales,
            products: &self.products,
            warehouses: &self.warehouses,
            purchases: &self.purchases,
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>, options: AggregateOptions) -> DashboardSnapshot {
        DashboardSnapshot {
            metrics: aggregate(self.input(), now.date_naive(), options),
            failed: self.failed.clone(),
        }
    }
}

/// What the dashboard view renders.
///
/// Holds no timestamps, so two refreshes over unchanged data compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub metrics: DashboardMetrics,
    pub failed: Vec<&'static str>,
}

fn or_empty<T>(source: &'static str, result: ClientResult<Vec<T>>, notifier: &dyn Notifier, failed: &mut Vec<&'static str>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(err) => {
            notifier.fetch_failed(source, &err);
            failed.push(source);
            Vec::new()
        }
    }
}

/// Fetches the four dashboard collections concurrently.
///
/// Never fails: each failed request is reported to `notifier` and replaced
/// by an empty collection.
pub async fn fetch_dashboard<A: InventoryApi + ?Sized>(api: &A, notifier: &dyn Notifier) -> DashboardData {
    let (sales, products, warehouses, purchases) = tokio::join!(
        api.sales_orders(),
        api.products(),
        api.warehouses(),
        api.purchases()
    );

    let mut failed = Vec::new();
    let data = DashboardData {
        sales: or_empty("sales", sales, notifier, &mut failed),
        products: or_empty("products", products, notifier, &mut failed),
        warehouses: or_empty("warehouses", warehouses, notifier, &mut failed),
        purchases: or_empty("purchases", purchases, notifier, &mut failed),
        failed: Vec::new(),
    };

    debug!(
        sales = data.sales.len(),
        products = data.products.len(),
        warehouses = data.warehouses.len(),
        purchases = data.purchases.len(),
        failed = failed.len(),
        "Dashboard data fetched"
    );

    DashboardData { failed, ..data }
}

/// Fetches and aggregates in one step.
pub async fn refresh_dashboard<A: InventoryApi + ?Sized>(
    api: &A,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
    options: AggregateOptions,
) -> DashboardSnapshot {
    fetch_dashboard(api, notifier).await.snapshot(now, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HttpApiClient;
    use crate::config::ApiSettings;
    use crate::notify::testing::CollectingNotifier;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, route: &str, status: u16, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api/{route}")))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    fn api(server: &MockServer) -> HttpApiClient {
        HttpApiClient::new(&ApiSettings {
            base_url: format!("{}/api", server.uri()),
            token: None,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_failed_collection_falls_back_to_empty() {
        let server = MockServer::start().await;
        mount(
            &server,
            "sales",
            200,
            json!({ "salesOrders": [
                { "_id": "s1", "status": "delivered", "totalAmount": 1000 },
                { "_id": "s2", "status": "cancelled", "totalAmount": 500 }
            ]}),
        )
        .await;
        mount(&server, "products", 500, json!({ "error": "boom" })).await;
        mount(&server, "warehouses", 200, json!([])).await;
        mount(
            &server,
            "purchases",
            200,
            json!({ "data": [{ "_id": "p1", "paymentStatus": "paid", "totalAmount": 400 }] }),
        )
        .await;

        let notifier = CollectingNotifier::default();
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        let snapshot = refresh_dashboard(&api(&server), &notifier, now, AggregateOptions::default()).await;

        assert_eq!(notifier.failed_sources(), vec!["products".to_string()]);
        assert_eq!(snapshot.failed, vec!["products"]);

        let overview = &snapshot.metrics.overview;
        assert_eq!(overview.total_revenue.cents(), 100_000);
        assert_eq!(overview.total_cost.cents(), 40_000);
        assert_eq!(overview.total_profit.cents(), 60_000);
        assert_eq!(overview.profit_margin, 60.0);
        assert_eq!(overview.total_products, 0);
    }

    #[tokio::test]
    async fn test_everything_down_yields_zero_dashboard() {
        let server = MockServer::start().await;
        let notifier = CollectingNotifier::default();
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();

        let snapshot = refresh_dashboard(&api(&server), &notifier, now, AggregateOptions::default()).await;

        assert_eq!(notifier.failed_sources().len(), 4);
        assert!(snapshot.metrics.overview.total_revenue.is_zero());
        assert_eq!(snapshot.metrics.overview.return_rate, 0.0);
        assert_eq!(snapshot.metrics.daily.len(), 30);
    }

    #[test]
    fn test_snapshots_of_same_data_compare_equal() {
        let data = DashboardData::default();
        let t0 = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 3).unwrap();
        assert_eq!(
            data.snapshot(t0, AggregateOptions::default()),
            data.snapshot(t1, AggregateOptions::default())
        );
    }
}
