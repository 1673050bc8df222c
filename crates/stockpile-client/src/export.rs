//! # Report Exports
//!
//! Writes entity collections as `{entity}.{csv|json|xlsx}`.
//!
//! JSON keeps the records as the API sent them. CSV and XLSX flatten each
//! record into one row through [`Tabular`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use stockpile_core::{ExpectedReturn, Product, Purchase, SalesOrder, Warehouse};
use tracing::info;

use crate::error::ClientResult;
use crate::render::xlsx::money_cell;

// =============================================================================
// Formats & Entities
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            other => Err(format!("unsupported export format '{other}'")),
        }
    }
}

/// Collections that can be exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportEntity {
    Sales,
    Purchases,
    Products,
    Warehouses,
    ExpectedReturns,
}

impl ExportEntity {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportEntity::Sales => "sales",
            ExportEntity::Purchases => "purchases",
            ExportEntity::Products => "products",
            ExportEntity::Warehouses => "warehouses",
            ExportEntity::ExpectedReturns => "expected-returns",
        }
    }
}

impl fmt::Display for ExportEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportEntity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sales" => Ok(ExportEntity::Sales),
            "purchases" => Ok(ExportEntity::Purchases),
            "products" => Ok(ExportEntity::Products),
            "warehouses" => Ok(ExportEntity::Warehouses),
            "expected-returns" | "returns" => Ok(ExportEntity::ExpectedReturns),
            other => Err(format!("unknown export entity '{other}'")),
        }
    }
}

pub fn export_filename(entity: ExportEntity, format: ExportFormat) -> String {
    format!("{}.{}", entity.as_str(), format.extension())
}

// =============================================================================
// Rows
// =============================================================================

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    fn opt(value: Option<&str>) -> Self {
        Cell::Text(value.unwrap_or_default().to_string())
    }

    fn int(value: impl Into<i64>) -> Self {
        Cell::Number(value.into() as f64)
    }

    fn date<Tz: chrono::TimeZone>(value: Option<&chrono::DateTime<Tz>>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Cell::Text(
            value
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        )
    }

    fn as_csv(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

/// A record that flattens into one export row.
pub trait Tabular: Serialize {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<Cell>;
}

impl Tabular for SalesOrder {
    const HEADERS: &'static [&'static str] = &[
        "Order Number", "Customer", "Email", "Status", "Items", "Total", "Warehouse", "Created",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(self.display_number()),
            Cell::text(self.customer_info.name.clone()),
            Cell::opt(self.customer_info.email.as_deref()),
            Cell::text(self.status.as_str()),
            Cell::int(self.items.iter().map(|i| i.quantity).sum::<i64>()),
            Cell::Number(money_cell(self.total_amount)),
            Cell::opt(self.warehouse_key()),
            Cell::date(self.created_at.as_ref()),
        ]
    }
}

impl Tabular for Purchase {
    const HEADERS: &'static [&'static str] = &[
        "Purchase Number", "Supplier", "Payment Status", "Items", "Total", "Tax", "Discount",
        "Final", "Purchase Date",
    ];

    fn cells(&self) -> Vec<Cell> {
        let supplier = self
            .supplier()
            .map(|s| s.name.clone())
            .or_else(|| self.supplier_id.as_ref().map(|r| r.id().to_string()))
            .unwrap_or_default();
        let final_amount = self
            .final_amount
            .unwrap_or(self.total_amount + self.tax_amount - self.discount_amount);
        vec![
            Cell::text(self.purchase_number.clone()),
            Cell::text(supplier),
            Cell::text(self.payment_status.as_str()),
            Cell::int(self.items.iter().map(|i| i.quantity).sum::<i64>()),
            Cell::Number(money_cell(self.total_amount)),
            Cell::Number(money_cell(self.tax_amount)),
            Cell::Number(money_cell(self.discount_amount)),
            Cell::Number(money_cell(final_amount)),
            Cell::date(self.purchase_date.or(self.created_at).as_ref()),
        ]
    }
}

impl Tabular for Product {
    const HEADERS: &'static [&'static str] = &[
        "Name", "SKU", "Category", "Unit", "Selling Price", "Stock", "Stock Level",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(self.name.clone()),
            Cell::text(self.sku.clone()),
            Cell::opt(self.category.as_deref()),
            Cell::opt(self.unit.as_deref()),
            Cell::Number(money_cell(self.selling_price)),
            Cell::int(self.overall_stock()),
            Cell::text(self.stock_level().to_string()),
        ]
    }
}

impl Tabular for Warehouse {
    const HEADERS: &'static [&'static str] = &[
        "Name", "Location", "Capacity", "Stock", "Usage %", "Band", "Products",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(self.name.clone()),
            Cell::opt(self.location.as_deref()),
            Cell::int(self.capacity),
            Cell::int(self.stock_total()),
            Cell::Number(stockpile_core::metrics::round1(self.capacity_usage())),
            Cell::text(self.capacity_band().to_string()),
            Cell::int(self.current_stock.len() as i64),
        ]
    }
}

impl Tabular for ExpectedReturn {
    const HEADERS: &'static [&'static str] = &[
        "Order Number", "Customer", "Status", "Items", "Reason", "Expected", "Received",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(self.order_number.clone()),
            Cell::text(self.customer_name.clone()),
            Cell::text(self.status.as_str()),
            Cell::int(self.items.iter().map(|i| i.quantity).sum::<i64>()),
            Cell::opt(self.return_reason.as_deref()),
            Cell::date(self.expected_return_date.as_ref()),
            Cell::date(self.actual_return_date.as_ref()),
        ]
    }
}

// =============================================================================
// Writers
// =============================================================================

/// Encodes `records` in `format`.
pub fn encode<T: Tabular>(entity: ExportEntity, records: &[T], format: ExportFormat) -> ClientResult<Vec<u8>> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_vec_pretty(records)?),
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(T::HEADERS)?;
            for record in records {
                writer.write_record(record.cells().iter().map(Cell::as_csv))?;
            }
            writer
                .into_inner()
                .map_err(|e| crate::error::ClientError::Io(e.into_error()))
        }
        ExportFormat::Xlsx => {
            let mut workbook = Workbook::new();
            let bold = Format::new().set_bold();
            let sheet = workbook.add_worksheet();
            sheet.set_name(entity.as_str())?;
            for (col, header) in T::HEADERS.iter().enumerate() {
                sheet.write_string_with_format(0, col as u16, *header, &bold)?;
            }
            for (row, record) in records.iter().enumerate() {
                let row = row as u32 + 1;
                for (col, cell) in record.cells().into_iter().enumerate() {
                    let col = col as u16;
                    match cell {
                        Cell::Text(text) => sheet.write_string(row, col, text)?,
                        Cell::Number(n) => sheet.write_number(row, col, n)?,
                    };
                }
            }
            Ok(workbook.save_to_buffer()?)
        }
    }
}

/// Writes `records` to `dir/{entity}.{ext}` and returns the path.
pub fn export_records<T: Tabular>(entity: ExportEntity, records: &[T], format: ExportFormat, dir: &Path) -> ClientResult<PathBuf> {
    let bytes = encode(entity, records, format)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(entity, format));
    std::fs::write(&path, &bytes)?;
    info!(
        path = %path.display(),
        %entity,
        records = records.len(),
        format = format.extension(),
        "Export written"
    );
    Ok(path)
}
