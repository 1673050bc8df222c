//! # Document Layout
//!
//! Turns a purchase or sales order into a printable layout. Rendering to PDF
//! or XLSX happens in `stockpile-client`; this module only decides what goes
//! on the page.
//!
//! ## Layout
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ COMPANY NAME                                 │
//! │ address line, phone line                     │
//! │                                              │
//! │ PURCHASE INVOICE                             │
//! │ Invoice #  / date        Order # / date      │
//! │ Bill To: name, address   Payment: method     │
//! │ ┌───┬─────────────┬─────┬────┬──────┬──────┐ │
//! │ │ # │ Description │ SKU │Qty │ Unit │ Amt  │ │
//! │ └───┴─────────────┴─────┴────┴──────┴──────┘ │
//! │                       Subtotal / Tax / Disc. │
//! │                       Total                  │
//! │ Notes, payment confirmation                  │
//! │ footer, generated-at                         │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The rich layout holds at most [`RICH_TABLE_CAPACITY`] rows on its single
//! page. Longer documents fail [`DocumentLayout::check_rich_fit`] and are
//! rendered from [`DocumentLayout::plain_lines`] instead, which flows over
//! as many pages as needed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::money::Money;
use crate::types::{Purchase, SalesOrder};

/// Line-item rows that fit the single-page rich layout.
pub const RICH_TABLE_CAPACITY: usize = 12;

/// Text lines per page of the plain layout.
pub const PLAIN_LINES_PER_PAGE: usize = 48;

// =============================================================================
// Kinds & Formats
// =============================================================================

/// Invoice or receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Invoice,
    Receipt,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Receipt => "receipt",
        }
    }

    /// Document-number prefix.
    pub fn prefix(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INV",
            DocumentKind::Receipt => "REC",
        }
    }

    fn label(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "Invoice",
            DocumentKind::Receipt => "Receipt",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "invoice" => Ok(DocumentKind::Invoice),
            "receipt" => Ok(DocumentKind::Receipt),
            other => Err(format!("unknown document type '{other}'")),
        }
    }
}

/// Output format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Xlsx,
}

impl DocumentFormat {
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Xlsx => "xlsx",
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "xlsx" | "excel" => Ok(DocumentFormat::Xlsx),
            other => Err(format!("unsupported document format '{other}'")),
        }
    }
}

/// `{type}_{number}_{YYYY-MM-DDTHH-MM-SS}.{ext}`
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use stockpile_core::document::{document_filename, DocumentFormat, DocumentKind};
///
/// let at = Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 5).unwrap();
/// assert_eq!(
///     document_filename(DocumentKind::Invoice, "PO-0007", DocumentFormat::Pdf, at),
///     "invoice_PO-0007_2024-05-02T09-30-05.pdf"
/// );
/// ```
pub fn document_filename(
    kind: DocumentKind,
    number: &str,
    format: DocumentFormat,
    at: DateTime<Utc>,
) -> String {
    let number: String = number
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    format!(
        "{}_{}_{}.{}",
        kind.as_str(),
        number,
        at.format("%Y-%m-%dT%H-%M-%S"),
        format.extension()
    )
}

/// `bank_transfer` → `BANK TRANSFER`; missing → `Not Specified`.
pub fn format_payment_method(method: Option<&str>) -> String {
    match method.map(str::trim).filter(|m| !m.is_empty()) {
        Some(method) => method.replace('_', " ").to_uppercase(),
        None => "Not Specified".to_string(),
    }
}

/// US-style `MM/DD/YYYY`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

fn display_optional_date(date: Option<NaiveDate>) -> String {
    date.map(display_date).unwrap_or_else(|| "N/A".to_string())
}

// =============================================================================
// Layout Model
// =============================================================================

/// Company block printed at the top of every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyHeader {
    pub name: String,
    pub lines: Vec<String>,
    pub footer: Vec<String>,
}

impl Default for CompanyHeader {
    fn default() -> Self {
        Self {
            name: "INVENTORY MANAGEMENT SYSTEM".to_string(),
            lines: vec![],
            footer: vec!["Thank you for your business!".to_string()],
        }
    }
}

/// Who the document is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterparty {
    /// "Bill To" or "Customer".
    pub label: &'static str,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

/// One row of the line-item table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutLine {
    pub index: usize,
    pub description: String,
    pub sku: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub amount: Money,
}

/// Totals block. Tax and discount only appear when positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Money,
    pub tax: Option<Money>,
    pub discount: Option<Money>,
    pub total: Money,
}

impl Totals {
    fn new(lines: &[LayoutLine], stated_subtotal: Money, tax: Money, discount: Money, stated_total: Option<Money>) -> Self {
        let subtotal = if stated_subtotal.is_zero() {
            lines.iter().map(|l| l.amount).sum()
        } else {
            stated_subtotal
        };
        let total = stated_total
            .filter(|t| !t.is_zero())
            .unwrap_or(subtotal + tax - discount);
        Totals {
            subtotal,
            tax: tax.is_positive().then_some(tax),
            discount: discount.is_positive().then_some(discount),
            total,
        }
    }
}

/// Everything printed on an invoice or receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLayout {
    pub kind: DocumentKind,
    pub title: String,
    pub company: CompanyHeader,
    pub currency: String,
    pub document_number: String,
    pub generated_at: DateTime<Utc>,
    pub order_number: String,
    pub order_date: Option<NaiveDate>,
    pub counterparty: Counterparty,
    pub payment_method: String,
    pub payment_status: String,
    pub lines: Vec<LayoutLine>,
    pub totals: Totals,
    pub notes: Option<String>,
    /// Receipts only: the date payment was confirmed.
    pub payment_confirmation: Option<Option<NaiveDate>>,
}

/// Shared inputs of the layout builders.
#[derive(Debug, Clone)]
pub struct LayoutContext {
    pub kind: DocumentKind,
    pub company: CompanyHeader,
    pub currency: String,
    pub generated_at: DateTime<Utc>,
}

impl LayoutContext {
    fn document_number(&self, order_number: &str) -> String {
        format!("{}-{}", self.kind.prefix(), order_number)
    }
}

fn or_na(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("N/A")
        .to_string()
}

impl DocumentLayout {
    /// Layout of a purchase invoice or payment receipt.
    pub fn for_purchase(purchase: &Purchase, ctx: &LayoutContext) -> Self {
        let supplier = purchase.supplier();
        let lines: Vec<LayoutLine> = purchase
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| LayoutLine {
                index: i + 1,
                description: item.display_name(),
                sku: or_na(item.product_sku()),
                quantity: item.quantity,
                unit_price: item.unit_price,
                amount: item.line_total(),
            })
            .collect();
        let totals = Totals::new(
            &lines,
            purchase.total_amount,
            purchase.tax_amount,
            purchase.discount_amount,
            purchase.final_amount,
        );

        DocumentLayout {
            kind: ctx.kind,
            title: match ctx.kind {
                DocumentKind::Invoice => "PURCHASE INVOICE".to_string(),
                DocumentKind::Receipt => "PAYMENT RECEIPT".to_string(),
            },
            company: ctx.company.clone(),
            currency: ctx.currency.clone(),
            document_number: ctx.document_number(&purchase.purchase_number),
            generated_at: ctx.generated_at,
            order_number: or_na(Some(purchase.purchase_number.as_str())),
            order_date: purchase
                .purchase_date
                .or(purchase.created_at)
                .map(|d| d.date_naive()),
            counterparty: Counterparty {
                label: "Bill To",
                name: supplier
                    .map(|s| s.name.clone())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| "Unknown Supplier".to_string()),
                address: supplier
                    .and_then(|s| s.address.as_ref())
                    .map(|a| a.one_line())
                    .filter(|a| !a.is_empty())
                    .unwrap_or_else(|| "No Address".to_string()),
                phone: or_na(supplier.and_then(|s| s.phone.as_deref())),
                email: or_na(supplier.and_then(|s| s.email.as_deref())),
            },
            payment_method: format_payment_method(purchase.payment_method.as_deref()),
            payment_status: purchase.payment_status.as_str().to_uppercase(),
            lines,
            totals,
            notes: purchase.notes.clone().filter(|n| !n.trim().is_empty()),
            payment_confirmation: (ctx.kind == DocumentKind::Receipt)
                .then(|| purchase.payment_date.map(|d| d.date_naive())),
        }
    }

    /// Layout of a sales invoice or receipt.
    pub fn for_sales_order(order: &SalesOrder, ctx: &LayoutContext) -> Self {
        let lines: Vec<LayoutLine> = order
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| LayoutLine {
                index: i + 1,
                description: item.display_name(),
                sku: or_na(item.product_sku()),
                quantity: item.quantity,
                unit_price: item.unit_price,
                amount: item.line_total(),
            })
            .collect();
        let totals = Totals::new(&lines, order.total_amount, Money::zero(), Money::zero(), None);
        let customer = &order.customer_info;
        let number = order.display_number();

        DocumentLayout {
            kind: ctx.kind,
            title: match ctx.kind {
                DocumentKind::Invoice => "SALES INVOICE".to_string(),
                DocumentKind::Receipt => "SALES RECEIPT".to_string(),
            },
            company: ctx.company.clone(),
            currency: ctx.currency.clone(),
            document_number: ctx.document_number(&number),
            generated_at: ctx.generated_at,
            order_number: number,
            order_date: order.created_at.map(|d| d.date_naive()),
            counterparty: Counterparty {
                label: "Customer",
                name: Some(customer.name.trim())
                    .filter(|n| !n.is_empty())
                    .unwrap_or("Unknown Customer")
                    .to_string(),
                address: order
                    .delivery_address
                    .as_ref()
                    .or(customer.address.as_ref())
                    .map(|a| a.one_line())
                    .filter(|a| !a.is_empty())
                    .unwrap_or_else(|| "No Address".to_string()),
                phone: or_na(customer.phone.as_deref()),
                email: or_na(customer.email.as_deref()),
            },
            payment_method: format_payment_method(order.payment_method.as_deref()),
            payment_status: order.status.as_str().to_uppercase(),
            lines,
            totals,
            notes: order.notes.clone().filter(|n| !n.trim().is_empty()),
            payment_confirmation: (ctx.kind == DocumentKind::Receipt)
                .then(|| order.updated_at.map(|d| d.date_naive())),
        }
    }

    /// File name for this layout in `format`.
    pub fn filename(&self, format: DocumentFormat) -> String {
        document_filename(self.kind, &self.order_number, format, self.generated_at)
    }

    pub fn money(&self, amount: Money) -> String {
        amount.display_with(&self.currency)
    }

    /// Fails when the line-item table does not fit the single rich page.
    pub fn check_rich_fit(&self) -> Result<(), LayoutError> {
        if self.lines.len() > RICH_TABLE_CAPACITY {
            return Err(LayoutError::PageOverflow {
                rows: self.lines.len(),
                capacity: RICH_TABLE_CAPACITY,
            });
        }
        Ok(())
    }

    /// `(label, value)` rows of the document header block.
    pub fn info_rows(&self) -> Vec<(String, String)> {
        let label = self.kind.label();
        vec![
            (format!("{label} #"), self.document_number.clone()),
            (
                format!("{label} date"),
                display_date(self.generated_at.date_naive()),
            ),
            ("Order #".to_string(), self.order_number.clone()),
            ("Order date".to_string(), display_optional_date(self.order_date)),
            ("Payment".to_string(), self.payment_method.clone()),
        ]
    }

    /// `(label, amount)` rows of the totals block, in print order.
    pub fn total_rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![("Subtotal".to_string(), self.money(self.totals.subtotal))];
        if let Some(tax) = self.totals.tax {
            rows.push(("Tax".to_string(), self.money(tax)));
        }
        if let Some(discount) = self.totals.discount {
            rows.push(("Discount".to_string(), self.money(-discount)));
        }
        rows.push((format!("Total ({})", self.currency), self.money(self.totals.total)));
        rows
    }

    pub fn generated_line(&self) -> String {
        format!(
            "Generated on: {}",
            self.generated_at.format("%m/%d/%Y %H:%M UTC")
        )
    }

    /// The plain-text rendition: every line of the document, top to bottom.
    pub fn plain_lines(&self) -> Vec<String> {
        let mut out = vec![self.company.name.clone()];
        out.extend(self.company.lines.iter().cloned());
        out.push(self.title.clone());
        out.push(String::new());
        out.push(format!("Document No: {}", self.document_number));
        out.push(format!("Date: {}", display_date(self.generated_at.date_naive())));
        out.push(String::new());
        out.push(format!("Order Number: {}", self.order_number));
        out.push(format!("Order Date: {}", display_optional_date(self.order_date)));
        out.push(format!("{}: {}", self.counterparty.label, self.counterparty.name));
        out.push(format!("Address: {}", self.counterparty.address));
        out.push(format!(
            "Phone: {} | Email: {}",
            self.counterparty.phone, self.counterparty.email
        ));
        out.push(format!("Payment Method: {}", self.payment_method));
        out.push(String::new());
        out.push("Items:".to_string());
        for line in &self.lines {
            out.push(format!(
                "{}. {} ({}) - Qty: {} x {} = {}",
                line.index,
                line.description,
                line.sku,
                line.quantity,
                self.money(line.unit_price),
                self.money(line.amount)
            ));
        }
        out.push(String::new());
        out.push("Summary:".to_string());
        for (label, value) in self.total_rows() {
            out.push(format!("{label}: {value}"));
        }
        if let Some(paid_on) = self.payment_confirmation {
            out.push(String::new());
            out.push("Payment Status: PAID".to_string());
            out.push(format!("Payment Date: {}", display_optional_date(paid_on)));
        }
        if let Some(notes) = &self.notes {
            out.push(String::new());
            out.push("Notes:".to_string());
            out.push(notes.clone());
        }
        out.push(String::new());
        out.extend(self.company.footer.iter().cloned());
        out.push(self.generated_line());
        out
    }
}

/// Splits lines into pages of at most `per_page` lines. Never returns zero pages.
pub fn paginate(lines: &[String], per_page: usize) -> Vec<&[String]> {
    if lines.is_empty() || per_page == 0 {
        return vec![lines];
    }
    lines.chunks(per_page).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
