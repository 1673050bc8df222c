//! # Metric Aggregation
//!
//! Derives dashboard statistics from raw entity collections.
//!
//! ## Data Flow
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │    sales     │   │   products   │   │  warehouses  │   │  purchases   │
//! └──────┬───────┘   └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!        └──────────────────┴─────────┬────────┴──────────────────┘
//!                                     ▼
//!                       aggregate(input, today, options)
//!                                     │
//!        ┌──────────────┬─────────────┼──────────────┬──────────────┐
//!        ▼              ▼             ▼              ▼              ▼
//!    overview      daily series   top products   by warehouse   stock alerts
//! ```
//!
//! ## Counting Rules
//! - Revenue: orders that are not cancelled, returned or expected_return.
//! - Cost: purchases whose payment status is `paid`.
//! - Return rate: returned or expected_return orders over all orders.
//!
//! Everything here is a pure function. "Today" is an argument, never read
//! from the clock.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::status::{ReturnStatus, SalesStatus};
use crate::types::{
    ExpectedReturn, PaymentStatus, Product, Purchase, SalesOrder, StockEntry, Warehouse,
};
use crate::{DEFAULT_TOP_PRODUCTS, DEFAULT_TRAILING_DAYS, ESTIMATED_PRODUCT_MARGIN, FAST_MOVER_COUNT};

// =============================================================================
// Inputs
// =============================================================================

/// Borrowed view of the four collections the dashboard is built from.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardInput<'a> {
    pub sales: &'a [SalesOrder],
    pub products: &'a [Product],
    pub warehouses: &'a [Warehouse],
    pub purchases: &'a [Purchase],
}

/// Tunables of [`aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateOptions {
    /// Length of the daily series, today included.
    pub trailing_days: u32,
    /// Number of products in the top list.
    pub top_products: usize,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            trailing_days: DEFAULT_TRAILING_DAYS,
            top_products: DEFAULT_TOP_PRODUCTS,
        }
    }
}

// =============================================================================
// Outputs
// =============================================================================

/// Headline numbers of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_revenue: Money,
    pub total_cost: Money,
    pub total_profit: Money,
    pub total_orders: usize,
    pub total_products: usize,
    pub average_order_value: Money,
    /// Percent, one decimal.
    pub profit_margin: f64,
    /// Percent, one decimal.
    pub return_rate: f64,
}

/// One day of the trailing series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub revenue: Money,
    pub orders: usize,
    pub profit: Money,
}

/// Sales of one product across all non-cancelled orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPerformance {
    pub product_id: String,
    pub name: String,
    /// Number of order lines naming this product.
    pub order_lines: usize,
    pub quantity: i64,
    pub revenue: Money,
    pub estimated_profit: Money,
}

/// Orders shipped from one warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseSales {
    pub warehouse_id: String,
    pub warehouse: String,
    pub orders: usize,
    pub revenue: Money,
}

/// A warehouse stock entry flagged as low or out of stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    pub product: String,
    pub warehouse: String,
    pub available: i64,
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub overview: Overview,
    pub daily: Vec<DailyPoint>,
    pub top_products: Vec<ProductPerformance>,
    pub sales_by_warehouse: Vec<WarehouseSales>,
    pub low_stock: Vec<StockAlert>,
    pub out_of_stock: Vec<StockAlert>,
    pub fast_movers: Vec<ProductPerformance>,
}

// =============================================================================
// Aggregation
// =============================================================================

/// Rounds a percentage to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percent(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}

/// Sum of revenue-eligible order totals.
pub fn total_revenue<'a>(sales: impl IntoIterator<Item = &'a SalesOrder>) -> Money {
    sales
        .into_iter()
        .filter(|s| s.status.is_revenue_eligible())
        .map(|s| s.total_amount)
        .sum()
}

/// Sum of paid purchase totals.
pub fn total_cost(purchases: &[Purchase]) -> Money {
    purchases
        .iter()
        .filter(|p| p.payment_status == PaymentStatus::Paid)
        .map(|p| p.total_amount)
        .sum()
}

/// Profit attributed to one day of revenue.
///
/// This is an approximation: the overall margin is applied to the day's
/// revenue, because purchases are not tied to days. A non-positive overall
/// margin yields zero.
pub fn estimate_daily_profit(day_revenue: Money, total_profit: Money, total_revenue: Money) -> Money {
    if !total_profit.is_positive() || !total_revenue.is_positive() {
        return Money::zero();
    }
    let numerator = day_revenue.cents() as i128 * total_profit.cents() as i128;
    let denominator = total_revenue.cents() as i128;
    let half = denominator / 2;
    let rounded = if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    };
    Money::from_cents(rounded as i64)
}

/// Estimated profit of a product's revenue.
pub fn estimate_product_profit(revenue: Money) -> Money {
    revenue.scale(ESTIMATED_PRODUCT_MARGIN)
}

fn utc_date(instant: &DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// Builds the full dashboard from raw collections.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use stockpile_core::metrics::{aggregate, AggregateOptions, DashboardInput};
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
/// let metrics = aggregate(DashboardInput::default(), today, AggregateOptions::default());
///
/// assert!(metrics.overview.total_revenue.is_zero());
/// assert_eq!(metrics.overview.profit_margin, 0.0);
/// assert_eq!(metrics.daily.len(), 30);
/// ```
pub fn aggregate(input: DashboardInput<'_>, today: NaiveDate, options: AggregateOptions) -> DashboardMetrics {
    let overview = overview(&input);
    let daily = daily_series(input.sales, &overview, today, options.trailing_days);
    let top_products = top_products(input.sales, options.top_products);
    let fast_movers = top_products.iter().take(FAST_MOVER_COUNT).cloned().collect();

    DashboardMetrics {
        daily,
        sales_by_warehouse: sales_by_warehouse(input.sales, input.warehouses),
        low_stock: stock_alerts(input.warehouses, |e| e.is_low_stock()),
        out_of_stock: stock_alerts(input.warehouses, |e| e.is_out_of_stock()),
        top_products,
        fast_movers,
        overview,
    }
}

/// Headline numbers only.
pub fn overview(input: &DashboardInput<'_>) -> Overview {
    let total_orders = input.sales.len();
    let total_revenue = total_revenue(input.sales);
    let total_cost = total_cost(input.purchases);
    let total_profit = total_revenue - total_cost;
    let returned = input.sales.iter().filter(|s| s.status.is_return()).count();

    Overview {
        total_revenue,
        total_cost,
        total_profit,
        total_orders,
        total_products: input.products.len(),
        average_order_value: total_revenue.divide_rounded(total_orders as i64),
        profit_margin: round1(percent(total_profit.cents(), total_revenue.cents())),
        return_rate: round1(percent(returned as i64, total_orders as i64)),
    }
}

/// Trailing daily series, oldest first, `today` last.
pub fn daily_series(sales: &[SalesOrder], overview: &Overview, today: NaiveDate, days: u32) -> Vec<DailyPoint> {
    let mut buckets: HashMap<NaiveDate, (usize, Money)> = HashMap::new();
    for sale in sales.iter().filter(|s| s.status != SalesStatus::Cancelled) {
        let Some(created) = sale.created_at.as_ref() else {
            continue;
        };
        let bucket = buckets.entry(utc_date(created)).or_default();
        bucket.0 += 1;
        if sale.status.is_revenue_eligible() {
            bucket.1 += sale.total_amount;
        }
    }

    (0..days as i64)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let (orders, revenue) = buckets.get(&date).copied().unwrap_or_default();
            DailyPoint {
                date,
                revenue,
                orders,
                profit: estimate_daily_profit(revenue, overview.total_profit, overview.total_revenue),
            }
        })
        .collect()
}

/// Products ranked by revenue over non-cancelled orders.
///
/// Ties keep the order in which products were first seen.
pub fn top_products(sales: &[SalesOrder], limit: usize) -> Vec<ProductPerformance> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut ranked: Vec<ProductPerformance> = Vec::new();

    for sale in sales.iter().filter(|s| s.status != SalesStatus::Cancelled) {
        for item in &sale.items {
            let key = item.product_key();
            let slot = *index.entry(key).or_insert_with(|| {
                ranked.push(ProductPerformance {
                    product_id: key.to_string(),
                    name: item.display_name(),
                    order_lines: 0,
                    quantity: 0,
                    revenue: Money::zero(),
                    estimated_profit: Money::zero(),
                });
                ranked.len() - 1
            });
            let entry = &mut ranked[slot];
            entry.order_lines += 1;
            entry.quantity += item.quantity;
            entry.revenue += item.line_total();
        }
    }

    // sort_by is stable
    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    ranked.truncate(limit);
    for product in &mut ranked {
        product.estimated_profit = estimate_product_profit(product.revenue);
    }
    ranked
}

/// Non-cancelled orders per known warehouse, in warehouse order.
pub fn sales_by_warehouse(sales: &[SalesOrder], warehouses: &[Warehouse]) -> Vec<WarehouseSales> {
    let mut rows: Vec<WarehouseSales> = warehouses
        .iter()
        .map(|w| WarehouseSales {
            warehouse_id: w.id.clone(),
            warehouse: w.name.clone(),
            orders: 0,
            revenue: Money::zero(),
        })
        .collect();
    let index: HashMap<&str, usize> = warehouses
        .iter()
        .enumerate()
        .map(|(i, w)| (w.id.as_str(), i))
        .collect();

    for sale in sales.iter().filter(|s| s.status != SalesStatus::Cancelled) {
        if let Some(&i) = sale.warehouse_key().and_then(|id| index.get(id)) {
            rows[i].orders += 1;
            rows[i].revenue += sale.total_amount;
        }
    }
    rows
}

fn stock_alerts(warehouses: &[Warehouse], flagged: impl Fn(&StockEntry) -> bool) -> Vec<StockAlert> {
    let flagged = &flagged;
    warehouses
        .iter()
        .flat_map(move |w| {
            w.current_stock
                .iter()
                .filter(move |e| flagged(e))
                .map(move |e| StockAlert {
                    product: e.product_name().to_string(),
                    warehouse: w.name.clone(),
                    available: e.available(),
                })
        })
        .collect()
}

// =============================================================================
// Sales List Statistics
// =============================================================================

/// Time window applied to the sales list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFilter {
    #[default]
    All,
    /// Since midnight UTC.
    Today,
    /// The last seven days.
    Week,
    /// Since the first of the month.
    Month,
    /// The last ninety days.
    Quarter,
    /// Since the first of January.
    Year,
}

impl TimeFilter {
    /// Earliest creation time kept by the filter, or `None` for `All`.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let midnight = |date: Option<NaiveDate>| {
            date.and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|start| Utc.from_utc_datetime(&start))
        };
        let today = now.date_naive();
        match self {
            TimeFilter::All => None,
            TimeFilter::Today => midnight(Some(today)),
            TimeFilter::Week => Some(now - Duration::days(7)),
            TimeFilter::Month => midnight(today.with_day(1)),
            TimeFilter::Quarter => Some(now - Duration::days(90)),
            TimeFilter::Year => midnight(today.with_ordinal(1)),
        }
    }

    /// Keeps orders created at or after the cutoff.
    ///
    /// Orders without a creation time only survive `All`.
    pub fn apply<'a>(self, sales: &'a [SalesOrder], now: DateTime<Utc>) -> Vec<&'a SalesOrder> {
        match self.cutoff(now) {
            None => sales.iter().collect(),
            Some(cutoff) => sales
                .iter()
                .filter(|s| s.created_at.is_some_and(|at| at >= cutoff))
                .collect(),
        }
    }
}

impl std::str::FromStr for TimeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TimeFilter::All),
            "day" | "today" => Ok(TimeFilter::Today),
            "week" | "7d" => Ok(TimeFilter::Week),
            "month" => Ok(TimeFilter::Month),
            "90days" | "90d" | "quarter" => Ok(TimeFilter::Quarter),
            "year" => Ok(TimeFilter::Year),
            other => Err(format!("unknown time filter '{other}'")),
        }
    }
}

/// Counters shown above the sales list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesListStats {
    pub total_orders: usize,
    pub total_delivered: usize,
    pub total_returns: usize,
    pub total_revenue: Money,
}

impl SalesListStats {
    pub fn compute<'a>(sales: impl IntoIterator<Item = &'a SalesOrder> + Clone) -> Self {
        let mut stats = SalesListStats {
            total_revenue: total_revenue(sales.clone()),
            ..Default::default()
        };
        for sale in sales {
            stats.total_orders += 1;
            match sale.status {
                SalesStatus::Delivered => stats.total_delivered += 1,
                SalesStatus::Returned => stats.total_returns += 1,
                _ => {}
            }
        }
        stats
    }
}

/// Counters shown above the expected-returns list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnStats {
    pub total: usize,
    pub pending: usize,
    pub in_transit: usize,
    pub received: usize,
    pub cancelled: usize,
}

impl ReturnStats {
    pub fn compute(returns: &[ExpectedReturn]) -> Self {
        let mut stats = ReturnStats {
            total: returns.len(),
            ..Default::default()
        };
        for ret in returns {
            match ret.status {
                ReturnStatus::Pending => stats.pending += 1,
                ReturnStatus::InTransit => stats.in_transit += 1,
                ReturnStatus::Received => stats.received += 1,
                ReturnStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProductRef, ProductSummary, Reference, SalesLineItem};
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn sale(id: &str, status: SalesStatus, major: i64) -> SalesOrder {
        SalesOrder {
            id: id.to_string(),
            order_number: format!("SO-{id}"),
            customer_info: Default::default(),
            delivery_address: None,
            items: vec![],
            warehouse_id: None,
            total_amount: Money::from_major_minor(major, 0),
            status,
            payment_method: None,
            notes: None,
            created_at: Some(at(2024, 3, 31)),
            updated_at: None,
        }
    }

    fn purchase(status: PaymentStatus, major: i64) -> Purchase {
        Purchase {
            id: "pu".to_string(),
            purchase_number: "PO-1".to_string(),
            supplier_id: None,
            items: vec![],
            total_amount: Money::from_major_minor(major, 0),
            tax_amount: Money::zero(),
            discount_amount: Money::zero(),
            final_amount: None,
            payment_status: status,
            payment_method: None,
            purchase_date: None,
            payment_date: None,
            notes: None,
            created_at: None,
        }
    }

    fn line(product: &str, name: &str, quantity: i64, unit_major: i64) -> SalesLineItem {
        let product_id: ProductRef = Reference::Embedded(ProductSummary {
            id: product.to_string(),
            name: name.to_string(),
            sku: None,
            category: None,
        });
        SalesLineItem {
            product_id: Some(product_id),
            product_name: None,
            variant_name: None,
            quantity,
            unit_price: Money::from_major_minor(unit_major, 0),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    fn run(sales: &[SalesOrder], purchases: &[Purchase]) -> DashboardMetrics {
        let input = DashboardInput {
            sales,
            purchases,
            ..Default::default()
        };
        aggregate(input, today(), AggregateOptions::default())
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let metrics = run(&[], &[]);
        let o = &metrics.overview;
        assert!(o.total_revenue.is_zero());
        assert_eq!(o.profit_margin, 0.0);
        assert!(o.average_order_value.is_zero());
        assert_eq!(o.return_rate, 0.0);
        assert_eq!(metrics.daily.len(), 30);
        assert!(metrics.daily.iter().all(|d| d.orders == 0 && d.revenue.is_zero()));
        assert!(metrics.top_products.is_empty());
    }

    #[test]
    fn test_revenue_cost_profit_margin() {
        let sales = [
            sale("a", SalesStatus::Delivered, 1000),
            sale("b", SalesStatus::Cancelled, 500),
        ];
        let purchases = [purchase(PaymentStatus::Paid, 400)];
        let o = run(&sales, &purchases).overview;

        assert_eq!(o.total_revenue, Money::from_major_minor(1000, 0));
        assert_eq!(o.total_cost, Money::from_major_minor(400, 0));
        assert_eq!(o.total_profit, Money::from_major_minor(600, 0));
        assert_eq!(o.profit_margin, 60.0);
        assert_eq!(o.total_orders, 2);
        assert_eq!(o.average_order_value, Money::from_major_minor(500, 0));
    }

    #[test]
    fn test_returned_only() {
        let o = run(&[sale("a", SalesStatus::Returned, 200)], &[]).overview;
        assert!(o.total_revenue.is_zero());
        assert_eq!(o.return_rate, 100.0);
        assert_eq!(o.profit_margin, 0.0);
    }

    #[test]
    fn test_unpaid_purchases_are_not_cost() {
        let purchases = [
            purchase(PaymentStatus::Pending, 100),
            purchase(PaymentStatus::Partial, 100),
            purchase(PaymentStatus::Other("refunded".into()), 100),
        ];
        assert!(run(&[], &purchases).overview.total_cost.is_zero());
    }

    #[test]
    fn test_margin_rounds_to_one_decimal() {
        let sales = [sale("a", SalesStatus::Delivered, 300)];
        let purchases = [purchase(PaymentStatus::Paid, 100)];
        assert_eq!(run(&sales, &purchases).overview.profit_margin, 66.7);
    }

    #[test]
    fn test_daily_series_buckets_by_utc_date() {
        let mut yesterday = sale("a", SalesStatus::Delivered, 100);
        yesterday.created_at = Some(at(2024, 3, 30));
        let mut returned = sale("b", SalesStatus::Returned, 50);
        returned.created_at = Some(at(2024, 3, 30));
        let cancelled = sale("c", SalesStatus::Cancelled, 70);
        let mut old = sale("d", SalesStatus::Delivered, 999);
        old.created_at = Some(at(2023, 1, 1));
        let sales = [yesterday, returned, cancelled, old];
        let purchases = [purchase(PaymentStatus::Paid, 549)];

        let metrics = run(&sales, &purchases);
        let daily = &metrics.daily;
        assert_eq!(daily.first().unwrap().date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(daily.last().unwrap().date, today());

        let day = &daily[28];
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 3, 30).unwrap());
        assert_eq!(day.orders, 2);
        assert_eq!(day.revenue, Money::from_major_minor(100, 0));
        // revenue 1099, cost 549, profit 550: 100 × 550 / 1099
        assert_eq!(day.profit, Money::from_cents(5005));

        assert_eq!(daily[29].orders, 0);
    }

    #[test]
    fn test_daily_profit_zero_when_margin_not_positive() {
        let sales = [sale("a", SalesStatus::Delivered, 100)];
        let purchases = [purchase(PaymentStatus::Paid, 300)];
        let metrics = run(&sales, &purchases);
        assert!(metrics.overview.profit_margin < 0.0);
        assert!(metrics.daily.iter().all(|d| d.profit.is_zero()));
    }

    #[test]
    fn test_top_products_ranking() {
        let mut first = sale("a", SalesStatus::Delivered, 0);
        first.items = vec![line("p1", "Kettle", 1, 100), line("p2", "Cup", 4, 25)];
        let mut second = sale("b", SalesStatus::Returned, 0);
        second.items = vec![line("p3", "Tray", 1, 300), line("p1", "Kettle", 1, 100)];
        let mut cancelled = sale("c", SalesStatus::Cancelled, 0);
        cancelled.items = vec![line("p4", "Lamp", 10, 1000)];

        let top = top_products(&[first, second, cancelled], 10);
        let names: Vec<_> = top.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Tray", "Kettle", "Cup"]);
        assert_eq!(top[1].order_lines, 2);
        assert_eq!(top[1].quantity, 2);
        assert_eq!(top[0].estimated_profit, Money::from_major_minor(54, 0));
    }

    #[test]
    fn test_top_products_ties_keep_first_seen_order() {
        let mut order = sale("a", SalesStatus::Delivered, 0);
        order.items = vec![
            line("p1", "Alpha", 1, 50),
            line("p2", "Beta", 2, 25),
            line("p3", "Gamma", 1, 80),
        ];
        let top = top_products(&[order], 2);
        let names: Vec<_> = top.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Gamma", "Alpha"]);
    }

    #[test]
    fn test_sales_by_warehouse_and_stock_alerts() {
        let warehouse: Warehouse = serde_json::from_value(serde_json::json!({
            "_id": "w1", "name": "Main", "capacity": 100,
            "currentStock": [
                {"productId": {"_id": "p1", "name": "Kettle"}, "quantity": 8, "reservedQuantity": 2},
                {"productId": {"_id": "p2", "name": "Cup"}, "quantity": 3, "reservedQuantity": 3},
                {"productId": "p3", "quantity": 50}
            ]
        }))
        .unwrap();
        let mut shipped = sale("a", SalesStatus::Delivered, 40);
        shipped.warehouse_id = Some(Reference::Id("w1".into()));
        let mut cancelled = sale("b", SalesStatus::Cancelled, 60);
        cancelled.warehouse_id = Some(Reference::Id("w1".into()));
        let mut elsewhere = sale("c", SalesStatus::Delivered, 10);
        elsewhere.warehouse_id = Some(Reference::Id("w9".into()));

        let warehouses = [warehouse];
        let sales = [shipped, cancelled, elsewhere];
        let input = DashboardInput {
            sales: &sales,
            warehouses: &warehouses,
            ..Default::default()
        };
        let metrics = aggregate(input, today(), AggregateOptions::default());

        assert_eq!(metrics.sales_by_warehouse.len(), 1);
        assert_eq!(metrics.sales_by_warehouse[0].orders, 1);
        assert_eq!(metrics.sales_by_warehouse[0].revenue, Money::from_major_minor(40, 0));
        assert_eq!(
            metrics.low_stock,
            vec![StockAlert { product: "Kettle".into(), warehouse: "Main".into(), available: 6 }]
        );
        assert_eq!(metrics.out_of_stock.len(), 1);
        assert_eq!(metrics.out_of_stock[0].product, "Cup");
    }

    #[test]
    fn test_fast_movers_are_top_five() {
        let mut order = sale("a", SalesStatus::Delivered, 0);
        order.items = (1..=8).map(|i| line(&format!("p{i}"), "P", 1, i * 10)).collect();
        let metrics = run(&[order], &[]);
        assert_eq!(metrics.top_products.len(), 8);
        assert_eq!(metrics.fast_movers.len(), 5);
        assert_eq!(metrics.fast_movers[0].product_id, "p8");
    }

    #[test]
    fn test_time_filter_cutoffs() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap();
        assert_eq!(TimeFilter::All.cutoff(now), None);
        assert_eq!(TimeFilter::Today.cutoff(now), Some(Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()));
        assert_eq!(TimeFilter::Month.cutoff(now), Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
        assert_eq!(TimeFilter::Year.cutoff(now), Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(TimeFilter::Week.cutoff(now), Some(now - Duration::days(7)));

        let mut recent = sale("a", SalesStatus::Delivered, 10);
        recent.created_at = Some(at(2024, 3, 14));
        let mut older = sale("b", SalesStatus::Delivered, 10);
        older.created_at = Some(at(2024, 2, 1));
        let mut undated = sale("c", SalesStatus::Delivered, 10);
        undated.created_at = None;
        let sales = [recent, older, undated];

        assert_eq!(TimeFilter::Week.apply(&sales, now).len(), 1);
        assert_eq!(TimeFilter::Year.apply(&sales, now).len(), 2);
        assert_eq!(TimeFilter::All.apply(&sales, now).len(), 3);
    }

    #[test]
    fn test_sales_list_stats() {
        let sales = [
            sale("a", SalesStatus::Delivered, 100),
            sale("b", SalesStatus::Returned, 40),
            sale("c", SalesStatus::Pending, 10),
        ];
        let stats = SalesListStats::compute(&sales);
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.total_delivered, 1);
        assert_eq!(stats.total_returns, 1);
        assert_eq!(stats.total_revenue, Money::from_major_minor(110, 0));
    }

    #[test]
    fn test_stock_entry_helper_used_by_alerts() {
        let entry = StockEntry { product_id: None, quantity: 0, reserved_quantity: 0, tags: vec![] };
        assert!(entry.is_out_of_stock());
        assert_eq!(entry.product_name(), "Unknown Product");
    }

    fn any_status() -> impl Strategy<Value = SalesStatus> {
        prop::sample::select(SalesStatus::ALL.to_vec())
    }

    fn any_payment() -> impl Strategy<Value = PaymentStatus> {
        prop_oneof![
            Just(PaymentStatus::Pending),
            Just(PaymentStatus::Partial),
            Just(PaymentStatus::Paid),
        ]
    }

    proptest! {
        #[test]
        fn prop_revenue_ignores_ineligible_orders(
            orders in prop::collection::vec((any_status(), 0i64..100_000), 0..40),
        ) {
            let sales: Vec<_> = orders
                .iter()
                .enumerate()
                .map(|(i, (status, cents))| {
                    let mut s = sale(&i.to_string(), *status, 0);
                    s.total_amount = Money::from_cents(*cents);
                    s
                })
                .collect();
            let expected: i64 = orders
                .iter()
                .filter(|(status, _)| status.is_revenue_eligible())
                .map(|(_, cents)| cents)
                .sum();
            let o = run(&sales, &[]).overview;
            prop_assert_eq!(o.total_revenue.cents(), expected);
            if expected == 0 {
                prop_assert_eq!(o.profit_margin, 0.0);
            }
            prop_assert!(o.return_rate >= 0.0 && o.return_rate <= 100.0);
        }

        #[test]
        fn prop_cost_counts_only_paid(
            rows in prop::collection::vec((any_payment(), 0i64..100_000), 0..40),
        ) {
            let purchases: Vec<_> = rows
                .iter()
                .map(|(status, cents)| {
                    let mut p = purchase(status.clone(), 0);
                    p.total_amount = Money::from_cents(*cents);
                    p
                })
                .collect();
            let expected: i64 = rows
                .iter()
                .filter(|(status, _)| *status == PaymentStatus::Paid)
                .map(|(_, cents)| cents)
                .sum();
            prop_assert_eq!(run(&[], &purchases).overview.total_cost.cents(), expected);
        }

        #[test]
        fn prop_daily_series_has_requested_length(days in 1u32..120) {
            let options = AggregateOptions { trailing_days: days, top_products: 10 };
            let metrics = aggregate(DashboardInput::default(), today(), options);
            prop_assert_eq!(metrics.daily.len(), days as usize);
            prop_assert_eq!(metrics.daily.last().map(|d| d.date), Some(today()));
        }
    }
}
