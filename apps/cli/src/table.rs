//! Terminal tables for cards, series and lists.

use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use serde_json::Value;
use stockpile_core::metrics::{DailyPoint, Overview, ProductPerformance, StockAlert, WarehouseSales};
use stockpile_core::{
    CapacityBand, ExpectedReturn, Money, Product, Purchase, Reference, ReturnStatus, SalesOrder,
    SalesStatus, StockEntry, StockLevel, Supplier, Warehouse,
};

fn new_table<I, S>(headers: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<Cell>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

fn amount(value: Money, currency: &str) -> Cell {
    Cell::new(value.display_with(currency)).set_alignment(CellAlignment::Right)
}

fn number(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

fn date(at: Option<DateTime<Utc>>) -> String {
    at.map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn percent(value: f64) -> String {
    format!("{value:.1}%")
}

fn sales_status_cell(status: SalesStatus) -> Cell {
    let color = match status {
        SalesStatus::Delivered => Color::Green,
        SalesStatus::Cancelled | SalesStatus::Returned => Color::Red,
        SalesStatus::ExpectedReturn => Color::Magenta,
        _ => Color::Yellow,
    };
    Cell::new(status).fg(color)
}

fn return_status_cell(status: ReturnStatus) -> Cell {
    let color = match status {
        ReturnStatus::Received => Color::Green,
        ReturnStatus::Cancelled => Color::Red,
        ReturnStatus::InTransit => Color::Cyan,
        ReturnStatus::Pending => Color::Yellow,
    };
    Cell::new(status).fg(color)
}

// =============================================================================
// Dashboard
// =============================================================================

pub fn overview(overview: &Overview, currency: &str) -> Table {
    let mut table = new_table(["Metric", "Value"]);
    table
        .add_row(vec![Cell::new("Total revenue"), amount(overview.total_revenue, currency)])
        .add_row(vec![Cell::new("Total cost"), amount(overview.total_cost, currency)])
        .add_row(vec![Cell::new("Total profit"), amount(overview.total_profit, currency)])
        .add_row(vec![Cell::new("Profit margin"), number(percent(overview.profit_margin))])
        .add_row(vec![Cell::new("Orders"), number(overview.total_orders)])
        .add_row(vec![Cell::new("Products"), number(overview.total_products)])
        .add_row(vec![
            Cell::new("Average order value"),
            amount(overview.average_order_value, currency),
        ])
        .add_row(vec![Cell::new("Return rate"), number(percent(overview.return_rate))]);
    table
}

pub fn daily(points: &[DailyPoint], currency: &str) -> Table {
    let mut table = new_table(["Date", "Orders", "Revenue", "Profit"]);
    for point in points {
        table.add_row(vec![
            Cell::new(point.date.format("%Y-%m-%d")),
            number(point.orders),
            amount(point.revenue, currency),
            amount(point.profit, currency),
        ]);
    }
    table
}

pub fn top_products(products: &[ProductPerformance], currency: &str) -> Table {
    let mut table = new_table(["#", "Product", "Orders", "Quantity", "Revenue", "Est. profit"]);
    for (rank, product) in products.iter().enumerate() {
        table.add_row(vec![
            number(rank + 1),
            Cell::new(&product.name),
            number(product.order_lines),
            number(product.quantity),
            amount(product.revenue, currency),
            amount(product.estimated_profit, currency),
        ]);
    }
    table
}

pub fn warehouse_sales(rows: &[WarehouseSales], currency: &str) -> Table {
    let mut table = new_table(["Warehouse", "Orders", "Revenue"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.warehouse),
            number(row.orders),
            amount(row.revenue, currency),
        ]);
    }
    table
}

pub fn stock_alerts(alerts: &[StockAlert]) -> Table {
    let mut table = new_table(["Product", "Warehouse", "Available"]);
    for alert in alerts {
        table.add_row(vec![
            Cell::new(&alert.product),
            Cell::new(&alert.warehouse),
            number(alert.available),
        ]);
    }
    table
}

// =============================================================================
// Lists
// =============================================================================

pub fn sales_orders(orders: &[SalesOrder], currency: &str) -> Table {
    let mut table = new_table(["Order", "Customer", "Items", "Total", "Status", "Warehouse", "Created", "Id"]);
    for order in orders {
        let warehouse = order
            .warehouse_id
            .as_ref()
            .and_then(Reference::embedded)
            .map(|w| w.name.clone())
            .or_else(|| order.warehouse_key().map(str::to_string))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(order.display_number()),
            Cell::new(&order.customer_info.name),
            number(order.items.len()),
            amount(order.total_amount, currency),
            sales_status_cell(order.status),
            Cell::new(warehouse),
            Cell::new(date(order.created_at)),
            Cell::new(&order.id),
        ]);
    }
    table
}

/// The sales lifecycle: every status and where it can move next.
pub fn sales_transitions(current: Option<SalesStatus>) -> Table {
    let mut table = new_table(["Status", "Next", "Terminal"]);
    let statuses: Vec<SalesStatus> = match current {
        Some(status) => vec![status],
        None => SalesStatus::ALL.to_vec(),
    };
    for status in statuses {
        let next: Vec<&str> = status.allowed_transitions().iter().map(|s| s.as_str()).collect();
        table.add_row(vec![
            sales_status_cell(status),
            Cell::new(if next.is_empty() { "-".to_string() } else { next.join(", ") }),
            Cell::new(if status.is_terminal() { "yes" } else { "no" }),
        ]);
    }
    table
}

pub fn expected_returns(returns: &[ExpectedReturn]) -> Table {
    let mut table = new_table(["Order", "Customer", "Items", "Reason", "Status", "Expected", "Received", "Id"]);
    for ret in returns {
        let items: i64 = ret.items.iter().map(|i| i.quantity).sum();
        table.add_row(vec![
            Cell::new(&ret.order_number),
            Cell::new(&ret.customer_name),
            number(items),
            Cell::new(ret.return_reason.as_deref().unwrap_or("-")),
            return_status_cell(ret.status),
            Cell::new(date(ret.expected_return_date)),
            Cell::new(date(ret.actual_return_date)),
            Cell::new(&ret.id),
        ]);
    }
    table
}

pub fn products(products: &[Product], currency: &str) -> Table {
    let mut table = new_table(["Name", "SKU", "Category", "Price", "Stock", "Level", "Id"]);
    for product in products {
        let level = product.stock_level();
        let color = match level {
            StockLevel::OutOfStock => Color::Red,
            StockLevel::Low => Color::Yellow,
            StockLevel::InStock => Color::Green,
        };
        table.add_row(vec![
            Cell::new(&product.name),
            Cell::new(&product.sku),
            Cell::new(product.category.as_deref().unwrap_or("-")),
            amount(product.selling_price, currency),
            number(product.overall_stock()),
            Cell::new(level).fg(color),
            Cell::new(&product.id),
        ]);
    }
    table
}

pub fn warehouses(warehouses: &[Warehouse]) -> Table {
    let mut table = new_table(["Name", "Location", "Stock", "Capacity", "Usage", "Free", "Id"]);
    for warehouse in warehouses {
        let band = warehouse.capacity_band();
        let color = match band {
            CapacityBand::Good => Color::Green,
            CapacityBand::Warning => Color::Yellow,
            CapacityBand::Critical => Color::Red,
        };
        table.add_row(vec![
            Cell::new(&warehouse.name),
            Cell::new(warehouse.location.as_deref().unwrap_or("-")),
            number(warehouse.stock_total()),
            number(warehouse.capacity),
            Cell::new(percent(warehouse.capacity_usage())).fg(color),
            number(warehouse.available_capacity()),
            Cell::new(&warehouse.id),
        ]);
    }
    table
}

pub fn purchases(purchases: &[Purchase], currency: &str) -> Table {
    let mut table = new_table(["Purchase", "Supplier", "Items", "Subtotal", "Total", "Payment", "Created", "Id"]);
    for purchase in purchases {
        let supplier = match (purchase.supplier(), purchase.supplier_id.as_ref()) {
            (Some(supplier), _) => supplier.name.clone(),
            (None, Some(reference)) => reference.id().to_string(),
            (None, None) => "-".to_string(),
        };
        let total = purchase.final_amount.unwrap_or(purchase.total_amount);
        table.add_row(vec![
            Cell::new(&purchase.purchase_number),
            Cell::new(supplier),
            number(purchase.items.len()),
            amount(purchase.total_amount, currency),
            amount(total, currency),
            Cell::new(purchase.payment_status.as_str()),
            Cell::new(date(purchase.created_at)),
            Cell::new(&purchase.id),
        ]);
    }
    table
}

pub fn suppliers(suppliers: &[Supplier]) -> Table {
    let mut table = new_table(["Name", "Contact", "Email", "Phone", "Id"]);
    for supplier in suppliers {
        table.add_row(vec![
            Cell::new(&supplier.name),
            Cell::new(supplier.contact_person.as_deref().unwrap_or("-")),
            Cell::new(supplier.email.as_deref().unwrap_or("-")),
            Cell::new(supplier.phone.as_deref().unwrap_or("-")),
            Cell::new(&supplier.id),
        ]);
    }
    table
}

pub fn stock_entries(entries: &[StockEntry]) -> Table {
    let mut table = new_table(["Product", "Quantity", "Reserved", "Available", "Tags"]);
    for entry in entries {
        let available = Cell::new(entry.available()).set_alignment(CellAlignment::Right);
        let available = if entry.is_out_of_stock() {
            available.fg(Color::Red)
        } else if entry.is_low_stock() {
            available.fg(Color::Yellow)
        } else {
            available
        };
        table.add_row(vec![
            Cell::new(entry.product_name()),
            number(entry.quantity),
            number(entry.reserved_quantity),
            available,
            Cell::new(entry.tags.join(", ")),
        ]);
    }
    table
}

/// Label/value pairs, used for stats blocks.
pub fn counters<'a>(rows: impl IntoIterator<Item = (&'a str, String)>) -> Table {
    let mut table = new_table(["Counter", "Value"]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), number(value)]);
    }
    table
}

// =============================================================================
// Raw JSON (reports)
// =============================================================================

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(map) => format!("{{{} fields}}", map.len()),
        other => other.to_string(),
    }
}

/// Renders a report body: arrays of objects as rows, objects as fields.
pub fn json(value: &Value) -> Table {
    match value {
        Value::Array(items) if items.iter().all(Value::is_object) && !items.is_empty() => {
            let headers: Vec<String> = items[0]
                .as_object()
                .map(|first| first.keys().cloned().collect())
                .unwrap_or_default();
            let mut table = new_table(headers.clone());
            for item in items {
                table.add_row(
                    headers
                        .iter()
                        .map(|key| Cell::new(scalar_text(item.get(key).unwrap_or(&Value::Null))))
                        .collect::<Vec<_>>(),
                );
            }
            table
        }
        Value::Object(map) => {
            let mut table = new_table(["Field", "Value"]);
            for (key, field) in map {
                table.add_row(vec![Cell::new(key), Cell::new(scalar_text(field))]);
            }
            table
        }
        other => {
            let mut table = new_table(["Value"]);
            table.add_row(vec![scalar_text(other)]);
            table
        }
    }
}

/// Nested arrays of objects inside a report body, by field name.
pub fn json_sections(value: &Value) -> Vec<(String, Table)> {
    let Value::Object(map) = value else {
        return Vec::new();
    };
    map.iter()
        .filter(|(_, field)| {
            field
                .as_array()
                .is_some_and(|items| !items.is_empty() && items.iter().all(Value::is_object))
        })
        .map(|(key, field)| (key.clone(), json(field)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_percent_has_one_decimal() {
        assert_eq!(percent(12.345), "12.3%");
        assert_eq!(percent(0.0), "0.0%");
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&Value::Null), "-");
        assert_eq!(scalar_text(&json!("x")), "x");
        assert_eq!(scalar_text(&json!(4.5)), "4.5");
        assert_eq!(scalar_text(&json!([1, 2, 3])), "[3 items]");
        assert_eq!(scalar_text(&json!({"a": 1})), "{1 fields}");
    }

    #[test]
    fn test_report_object_lists_fields_and_sections() {
        let body = json!({
            "totalSales": 12,
            "period": "weekly",
            "topProducts": [
                { "name": "Kettle", "quantity": 4 },
                { "name": "Cup", "quantity": 2 }
            ]
        });
        let rendered = json(&body).to_string();
        assert!(rendered.contains("totalSales"));
        assert!(rendered.contains("[2 items]"));

        let sections = json_sections(&body);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, "topProducts");
        assert!(sections[0].1.to_string().contains("Kettle"));
    }

    #[test]
    fn test_transitions_for_one_status() {
        let rendered = sales_transitions(Some(SalesStatus::Pending)).to_string();
        assert!(rendered.contains("dispatch, cancelled"));
        assert!(!rendered.contains("delivered"));
    }

    #[test]
    fn test_purchase_table_falls_back_to_supplier_id() {
        let purchases: Vec<Purchase> = serde_json::from_value(json!([
            { "_id": "u1", "purchaseNumber": "PO-1", "supplierId": { "_id": "s1", "name": "Indus Traders" }, "totalAmount": 30 },
            { "_id": "u2", "purchaseNumber": "PO-2", "supplierId": "s2", "totalAmount": 10, "finalAmount": 12 }
        ]))
        .unwrap();
        let rendered = super::purchases(&purchases, "Rs").to_string();
        assert!(rendered.contains("Indus Traders"));
        assert!(rendered.contains("s2"));
        assert!(rendered.contains("PO-2"));
    }

    #[test]
    fn test_sales_table_shows_fallback_order_number() {
        let order: SalesOrder = serde_json::from_value(json!({
            "_id": "64aa00000000000000001234",
            "customerInfo": { "name": "Ayesha" },
            "totalAmount": 28,
            "status": "pending"
        }))
        .unwrap();
        let rendered = sales_orders(&[order], "PKR").to_string();
        assert!(rendered.contains("SO-1234"));
        assert!(rendered.contains("PKR 28.00"));
    }
}
