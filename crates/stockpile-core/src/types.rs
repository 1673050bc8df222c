//! # Domain Types
//!
//! Records returned by the inventory REST API.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   SalesOrder    │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  _id            │   │  _id            │   │  _id            │       │
//! │  │  sku (business) │   │  orderNumber    │   │  purchaseNumber │       │
//! │  │  sellingPrice   │   │  status         │   │  paymentStatus  │       │
//! │  │  warehouses[]   │   │  items[]        │   │  supplierId ──┐ │       │
//! │  └─────────────────┘   └─────────────────┘   └───────────────┼─┘       │
//! │                                                              ▼         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Warehouse     │   │ ExpectedReturn  │   │    Supplier     │       │
//! │  │  capacity       │   │  status         │   │  name, address  │       │
//! │  │  currentStock[] │   │  items[]        │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## References
//! The API sometimes populates a foreign key with the referenced record and
//! sometimes sends the bare id. [`Reference`] accepts both:
//! ```text
//! "productId": "665f0c..."                         → Reference::Id
//! "productId": { "_id": "665f0c...", "name": ... } → Reference::Embedded
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::money::Money;
use crate::status::{ReturnStatus, SalesStatus};
use crate::{LOW_STOCK_THRESHOLD, PRODUCT_LOW_STOCK_THRESHOLD};

/// Reads `null` as the type's default, so `"quantity": null` counts as 0.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// References
// =============================================================================

/// Anything that carries a record id.
pub trait Identified {
    fn id(&self) -> &str;
}

/// A foreign key that is either a bare id or the populated record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(String),
    Embedded(T),
}

impl<T: Identified> Reference<T> {
    /// The referenced id, whichever form arrived.
    pub fn id(&self) -> &str {
        match self {
            Reference::Id(id) => id,
            Reference::Embedded(record) => record.id(),
        }
    }

    /// The populated record, when the API sent one.
    pub fn embedded(&self) -> Option<&T> {
        match self {
            Reference::Id(_) => None,
            Reference::Embedded(record) => Some(record),
        }
    }
}

impl<T> From<String> for Reference<T> {
    fn from(id: String) -> Self {
        Reference::Id(id)
    }
}

/// Populated product reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Populated warehouse reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

/// Populated sales order reference (used by expected returns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub order_number: Option<String>,
}

pub type ProductRef = Reference<ProductSummary>;
pub type WarehouseRef = Reference<WarehouseSummary>;
pub type SupplierRef = Reference<Supplier>;
pub type SalesOrderRef = Reference<SalesOrderSummary>;

macro_rules! identified {
    ($($ty:ty),* $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

identified!(
    ProductSummary,
    WarehouseSummary,
    SalesOrderSummary,
    Product,
    Warehouse,
    SalesOrder,
    Purchase,
    Supplier,
    ExpectedReturn,
);

// =============================================================================
// Addresses & Contacts
// =============================================================================

/// Structured postal address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// Non-empty parts joined with ", ".
    pub fn one_line(&self) -> String {
        [
            &self.street,
            &self.city,
            &self.state,
            &self.zip_code,
            &self.country,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// An address that arrives either as free text or structured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressField {
    Text(String),
    Structured(Address),
}

impl AddressField {
    pub fn one_line(&self) -> String {
        match self {
            AddressField::Text(text) => text.trim().to_string(),
            AddressField::Structured(address) => address.one_line(),
        }
    }
}

/// Customer details attached to a sales order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInfo {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<AddressField>,
}

// =============================================================================
// Product
// =============================================================================

/// Stock level band of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    Low,
    InStock,
}

impl StockLevel {
    /// Band for `stock` with the given low threshold.
    pub fn classify(stock: i64, low_threshold: i64) -> Self {
        if stock <= 0 {
            StockLevel::OutOfStock
        } else if stock <= low_threshold {
            StockLevel::Low
        } else {
            StockLevel::InStock
        }
    }
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StockLevel::OutOfStock => "out of stock",
            StockLevel::Low => "low",
            StockLevel::InStock => "in stock",
        })
    }
}

/// Stock of a product in one warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWarehouseStock {
    #[serde(default, alias = "warehouseId")]
    pub warehouse: Option<WarehouseRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stock: i64,
}

/// One entry of a product's lifecycle timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    #[serde(alias = "event")]
    pub action: String,
    #[serde(default, alias = "timestampISO")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, alias = "details")]
    pub metadata: Option<serde_json::Value>,
}

/// A product in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Only sent to admins.
    #[serde(default)]
    pub cost_price: Option<Money>,
    #[serde(default)]
    pub selling_price: Money,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_stock: i64,
    #[serde(default)]
    pub low_stock_threshold: Option<i64>,
    #[serde(default)]
    pub warehouses: Vec<ProductWarehouseStock>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Stock summed over warehouses, or `currentStock` when none are listed.
    pub fn overall_stock(&self) -> i64 {
        if self.warehouses.is_empty() {
            self.current_stock
        } else {
            self.warehouses.iter().map(|w| w.stock).sum()
        }
    }

    pub fn stock_level(&self) -> StockLevel {
        StockLevel::classify(
            self.overall_stock(),
            self.low_stock_threshold
                .unwrap_or(PRODUCT_LOW_STOCK_THRESHOLD),
        )
    }
}

// =============================================================================
// Warehouse
// =============================================================================

/// Capacity usage band of a warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityBand {
    Good,
    Warning,
    Critical,
}

impl CapacityBand {
    pub fn classify(usage_percent: f64) -> Self {
        if usage_percent >= 90.0 {
            CapacityBand::Critical
        } else if usage_percent >= 75.0 {
            CapacityBand::Warning
        } else {
            CapacityBand::Good
        }
    }
}

impl fmt::Display for CapacityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CapacityBand::Good => "good",
            CapacityBand::Warning => "warning",
            CapacityBand::Critical => "critical",
        })
    }
}

/// A product's stock line inside a warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockEntry {
    #[serde(default)]
    pub product_id: Option<ProductRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reserved_quantity: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl StockEntry {
    /// Quantity not reserved for open orders.
    pub fn available(&self) -> i64 {
        self.quantity - self.reserved_quantity
    }

    pub fn product_name(&self) -> &str {
        self.product_id
            .as_ref()
            .and_then(Reference::embedded)
            .map(|p| p.name.as_str())
            .unwrap_or("Unknown Product")
    }

    pub fn is_low_stock(&self) -> bool {
        let available = self.available();
        available > 0 && available < LOW_STOCK_THRESHOLD
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.available() <= 0
    }
}

/// A storage location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capacity: i64,
    #[serde(default)]
    pub total_stock: Option<i64>,
    #[serde(default)]
    pub current_stock: Vec<StockEntry>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Warehouse {
    /// Units stored, preferring the API's `totalStock`.
    pub fn stock_total(&self) -> i64 {
        self.total_stock
            .unwrap_or_else(|| self.current_stock.iter().map(|e| e.quantity).sum())
    }

    /// Stock as a percentage of capacity; 0 for a zero capacity.
    pub fn capacity_usage(&self) -> f64 {
        if self.capacity <= 0 {
            return 0.0;
        }
        self.stock_total() as f64 * 100.0 / self.capacity as f64
    }

    pub fn capacity_band(&self) -> CapacityBand {
        CapacityBand::classify(self.capacity_usage())
    }

    pub fn available_capacity(&self) -> i64 {
        (self.capacity - self.stock_total()).max(0)
    }
}

// =============================================================================
// Sales Order
// =============================================================================

/// One line of a sales order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesLineItem {
    #[serde(default)]
    pub product_id: Option<ProductRef>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub variant_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: i64,
    #[serde(default)]
    pub unit_price: Money,
}

impl SalesLineItem {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Id of the product, or "" when the line has none.
    pub fn product_key(&self) -> &str {
        self.product_id.as_ref().map(Reference::id).unwrap_or("")
    }

    pub fn product_sku(&self) -> Option<&str> {
        self.product_id
            .as_ref()
            .and_then(Reference::embedded)
            .and_then(|p| p.sku.as_deref())
    }

    /// Product name plus " - variant" when a variant is set.
    pub fn display_name(&self) -> String {
        let base = self
            .product_id
            .as_ref()
            .and_then(Reference::embedded)
            .map(|p| p.name.as_str())
            .filter(|name| !name.is_empty())
            .or(self.product_name.as_deref())
            .unwrap_or("Unknown Product");
        match self.variant_name.as_deref().filter(|v| !v.is_empty()) {
            Some(variant) => format!("{base} - {variant}"),
            None => base.to_string(),
        }
    }
}

/// A customer sales order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrder {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub customer_info: CustomerInfo,
    #[serde(default)]
    pub delivery_address: Option<AddressField>,
    #[serde(default)]
    pub items: Vec<SalesLineItem>,
    #[serde(default)]
    pub warehouse_id: Option<WarehouseRef>,
    #[serde(default)]
    pub total_amount: Money,
    pub status: SalesStatus,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SalesOrder {
    /// Order number, or `SO-` plus the last four id characters.
    pub fn display_number(&self) -> String {
        if !self.order_number.is_empty() {
            return self.order_number.clone();
        }
        let tail: String = {
            let chars: Vec<char> = self.id.chars().collect();
            chars[chars.len().saturating_sub(4)..].iter().collect()
        };
        format!("SO-{tail}")
    }

    pub fn warehouse_key(&self) -> Option<&str> {
        self.warehouse_id.as_ref().map(Reference::id)
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// Payment state of a purchase. Unknown values are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Partial,
    Paid,
    Other(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Other(other) => other,
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => PaymentStatus::Pending,
            "partial" => PaymentStatus::Partial,
            "paid" => PaymentStatus::Paid,
            _ => PaymentStatus::Other(value),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLineItem {
    #[serde(default)]
    pub product_id: Option<ProductRef>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: i64,
    #[serde(default)]
    pub unit_price: Money,
    #[serde(default)]
    pub total_price: Option<Money>,
}

impl PurchaseLineItem {
    /// `totalPrice` when sent, otherwise quantity × unit price.
    pub fn line_total(&self) -> Money {
        self.total_price
            .unwrap_or_else(|| self.unit_price.multiply_quantity(self.quantity))
    }

    pub fn display_name(&self) -> String {
        self.product_id
            .as_ref()
            .and_then(Reference::embedded)
            .map(|p| p.name.clone())
            .filter(|name| !name.is_empty())
            .or_else(|| self.product_name.clone())
            .unwrap_or_else(|| "Unknown Product".to_string())
    }

    pub fn product_sku(&self) -> Option<&str> {
        self.product_id
            .as_ref()
            .and_then(Reference::embedded)
            .and_then(|p| p.sku.as_deref())
    }
}

/// A purchase from a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub purchase_number: String,
    #[serde(default)]
    pub supplier_id: Option<SupplierRef>,
    #[serde(default)]
    pub items: Vec<PurchaseLineItem>,
    #[serde(default)]
    pub total_amount: Money,
    #[serde(default)]
    pub tax_amount: Money,
    #[serde(default)]
    pub discount_amount: Money,
    #[serde(default)]
    pub final_amount: Option<Money>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Purchase {
    pub fn supplier(&self) -> Option<&Supplier> {
        self.supplier_id.as_ref().and_then(Reference::embedded)
    }
}

// =============================================================================
// Supplier
// =============================================================================

/// A supplier of purchased goods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<AddressField>,
}

// =============================================================================
// Expected Return
// =============================================================================

/// Declared condition of a returned item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    Unopened,
    #[default]
    Opened,
    Damaged,
    Defective,
}

/// One item a customer intends to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnItem {
    #[serde(default)]
    pub product_id: Option<ProductRef>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub variant_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: i64,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub condition: ItemCondition,
}

impl ReturnItem {
    pub fn display_name(&self) -> String {
        self.product_id
            .as_ref()
            .and_then(Reference::embedded)
            .map(|p| p.name.clone())
            .or_else(|| self.product_name.clone())
            .unwrap_or_else(|| "Unknown Product".to_string())
    }
}

/// A customer-declared intent to return items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedReturn {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub sales_order_id: Option<SalesOrderRef>,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub items: Vec<ReturnItem>,
    #[serde(default)]
    pub return_reason: Option<String>,
    pub status: ReturnStatus,
    #[serde(default)]
    pub expected_return_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_return_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_accepts_id_or_embedded() {
        let bare: ProductRef = serde_json::from_value(json!("p1")).unwrap();
        assert_eq!(bare.id(), "p1");
        assert!(bare.embedded().is_none());

        let embedded: ProductRef =
            serde_json::from_value(json!({"_id": "p2", "name": "Kettle", "sku": "KT-1"})).unwrap();
        assert_eq!(embedded.id(), "p2");
        assert_eq!(embedded.embedded().unwrap().name, "Kettle");
    }

    #[test]
    fn test_sales_order_from_api_json() {
        let order: SalesOrder = serde_json::from_value(json!({
            "_id": "64aa00000000000000001234",
            "customerInfo": {"name": "Ayesha", "email": "a@example.com"},
            "items": [
                {"productId": {"_id": "p1", "name": "Kettle"}, "variantName": "Red",
                 "quantity": 2, "unitPrice": 12.5},
                {"productId": "p2", "productName": "Cup", "quantity": 1, "unitPrice": "3"}
            ],
            "warehouseId": "w1",
            "totalAmount": 28,
            "status": "shipped",
            "createdAt": "2024-03-01T10:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(order.status, SalesStatus::Dispatch);
        assert_eq!(order.total_amount, Money::from_cents(2800));
        assert_eq!(order.items[0].display_name(), "Kettle - Red");
        assert_eq!(order.items[0].line_total(), Money::from_cents(2500));
        assert_eq!(order.items[1].display_name(), "Cup");
        assert_eq!(order.items[1].product_key(), "p2");
        assert_eq!(order.warehouse_key(), Some("w1"));
        assert_eq!(order.display_number(), "SO-1234");
    }

    #[test]
    fn test_null_numbers_read_as_zero() {
        let order: SalesOrder = serde_json::from_value(json!({
            "_id": "s1",
            "status": "delivered",
            "totalAmount": null,
            "items": [{"productId": "p1", "quantity": null, "unitPrice": 4}]
        }))
        .unwrap();
        assert_eq!(order.items[0].quantity, 0);
        assert_eq!(order.items[0].line_total(), Money::zero());

        let entry: StockEntry =
            serde_json::from_value(json!({"quantity": null, "reservedQuantity": null})).unwrap();
        assert_eq!(entry.available(), 0);
    }

    #[test]
    fn test_payment_status_keeps_unknown_values() {
        let status: PaymentStatus = serde_json::from_value(json!("refunded")).unwrap();
        assert_eq!(status, PaymentStatus::Other("refunded".to_string()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("refunded"));

        let paid: PaymentStatus = serde_json::from_value(json!("paid")).unwrap();
        assert_eq!(paid, PaymentStatus::Paid);
    }

    #[test]
    fn test_purchase_line_total_prefers_total_price() {
        let item: PurchaseLineItem = serde_json::from_value(json!({
            "productId": "p1", "quantity": 3, "unitPrice": 10, "totalPrice": 29.5
        }))
        .unwrap();
        assert_eq!(item.line_total(), Money::from_cents(2950));

        let item: PurchaseLineItem =
            serde_json::from_value(json!({"quantity": 3, "unitPrice": 10})).unwrap();
        assert_eq!(item.line_total(), Money::from_cents(3000));
        assert_eq!(item.display_name(), "Unknown Product");
    }

    #[test]
    fn test_address_one_line() {
        let text: AddressField = serde_json::from_value(json!(" 12 Mall Road ")).unwrap();
        assert_eq!(text.one_line(), "12 Mall Road");

        let structured: AddressField =
            serde_json::from_value(json!({"street": "12 Mall Road", "city": "Lahore", "state": ""}))
                .unwrap();
        assert_eq!(structured.one_line(), "12 Mall Road, Lahore");
    }

    #[test]
    fn test_warehouse_capacity() {
        let mut warehouse: Warehouse = serde_json::from_value(json!({
            "_id": "w1", "name": "Main", "capacity": 200,
            "currentStock": [
                {"productId": "p1", "quantity": 120, "reservedQuantity": 5},
                {"productId": "p2", "quantity": 40}
            ]
        }))
        .unwrap();

        assert_eq!(warehouse.stock_total(), 160);
        assert_eq!(warehouse.capacity_usage(), 80.0);
        assert_eq!(warehouse.capacity_band(), CapacityBand::Warning);
        assert_eq!(warehouse.available_capacity(), 40);
        assert_eq!(warehouse.current_stock[0].available(), 115);

        warehouse.total_stock = Some(190);
        assert_eq!(warehouse.capacity_band(), CapacityBand::Critical);

        warehouse.capacity = 0;
        assert_eq!(warehouse.capacity_usage(), 0.0);
        assert_eq!(warehouse.capacity_band(), CapacityBand::Good);
    }

    #[test]
    fn test_stock_entry_bands() {
        let entry = |quantity, reserved_quantity| StockEntry {
            product_id: None,
            quantity,
            reserved_quantity,
            tags: vec![],
        };
        assert!(entry(9, 0).is_low_stock());
        assert!(!entry(10, 0).is_low_stock());
        assert!(entry(5, 5).is_out_of_stock());
        assert!(!entry(5, 5).is_low_stock());
    }

    #[test]
    fn test_product_stock_level() {
        let mut product: Product = serde_json::from_value(json!({
            "_id": "p1", "name": "Kettle", "sku": "KT-1", "sellingPrice": 25,
            "currentStock": 50,
            "warehouses": [{"warehouse": "w1", "stock": 3}, {"warehouse": "w2", "stock": 2}]
        }))
        .unwrap();
        assert_eq!(product.overall_stock(), 5);
        assert_eq!(product.stock_level(), StockLevel::Low);

        product.warehouses.clear();
        assert_eq!(product.stock_level(), StockLevel::InStock);

        product.current_stock = 0;
        assert_eq!(product.stock_level(), StockLevel::OutOfStock);
    }
}
