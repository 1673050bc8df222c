//! # Form Validation
//!
//! Field-level checks run before anything is sent to the API.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (client side)                                     │
//! │  ├── Required fields, numeric positivity                               │
//! │  ├── Email shape, password complexity                                  │
//! │  └── Every failing field is collected into FormErrors                  │
//! │           │                                                             │
//! │           ▼  only when the form is clean                                │
//! │  Layer 2: REST API                                                      │
//! │  └── Stock checks, uniqueness, persistence                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A form's `validate` consumes nothing and either returns the request body
//! ready to be posted or every failure at once.
//!
//! ## Usage
//! ```rust
//! use stockpile_core::validation::RegistrationForm;
//!
//! let form = RegistrationForm {
//!     first_name: "A".into(),
//!     last_name: "".into(),
//!     email: "not-an-email".into(),
//!     password: "weak".into(),
//!     role: "employee".into(),
//! };
//! let errors = form.validate().unwrap_err();
//! assert_eq!(errors.len(), 4);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{FormErrors, ValidationError};
use crate::money::Money;
use crate::types::{Address, AddressField, CustomerInfo};
use crate::{MAX_SKU_LENGTH, MIN_NAME_LENGTH, MIN_PASSWORD_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Fails when `value` is empty after trimming.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a person's name: required, at least two characters.
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    validate_required(field, value)?;
    if value.trim().chars().count() < MIN_NAME_LENGTH {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min: MIN_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Validates an email address: `local@domain.tld`, no whitespace.
///
/// ## Example
/// ```rust
/// use stockpile_core::validation::validate_email;
///
/// assert!(validate_email("email", "ops@example.com").is_ok());
/// assert!(validate_email("email", "ops@example").is_err());
/// assert!(validate_email("email", "").is_err());
/// ```
pub fn validate_email(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();
    validate_required(field, value)?;

    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid email address".to_string(),
    };
    if value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validates a password.
///
/// ## Rules
/// - At least six characters
/// - At least one lowercase letter, one uppercase letter and one digit
pub fn validate_password(field: &str, value: &str) -> ValidationResult<()> {
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if value.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }
    let lower = value.chars().any(|c| c.is_ascii_lowercase());
    let upper = value.chars().any(|c| c.is_ascii_uppercase());
    let digit = value.chars().any(|c| c.is_ascii_digit());
    if !(lower && upper && digit) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain an uppercase letter, a lowercase letter and a number"
                .to_string(),
        });
    }
    Ok(())
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, numbers, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use stockpile_core::validation::validate_sku;
///
/// assert!(validate_sku("KTL-RED-01").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();
    validate_required("sku", sku)?;

    if sku.len() > MAX_SKU_LENGTH {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LENGTH,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Fails unless `qty > 0`.
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Fails unless `amount > 0`.
pub fn validate_positive_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Fails when `amount < 0`.
pub fn validate_non_negative_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

// =============================================================================
// Sales Order Form
// =============================================================================

/// One line of the sales order form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesItemInput {
    pub product_id: String,
    #[serde(default)]
    pub variant_name: Option<String>,
    pub quantity: i64,
    pub unit_price: Money,
}

impl SalesItemInput {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// Input for a new sales order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesOrderForm {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: Address,
    pub warehouse_id: Option<String>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub notes: String,
    pub items: Vec<SalesItemInput>,
}

/// Body of `POST /sales`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalesOrder {
    pub customer_info: CustomerInfo,
    pub delivery_address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<SalesItemInput>,
    pub total_amount: Money,
}

impl SalesOrderForm {
    pub fn total(&self) -> Money {
        self.items.iter().map(SalesItemInput::line_total).sum()
    }

    /// Checks every field and builds the request body.
    pub fn validate(&self) -> Result<CreateSalesOrder, FormErrors> {
        let mut errors = FormErrors::new();

        errors.check(validate_required("customerInfo.name", &self.customer_name));
        errors.check(validate_email("customerInfo.email", &self.customer_email));
        errors.check(validate_required("customerInfo.phone", &self.customer_phone));
        errors.check(validate_required(
            "deliveryAddress.street",
            self.delivery_address.street.as_deref().unwrap_or(""),
        ));
        errors.check(validate_required(
            "deliveryAddress.city",
            self.delivery_address.city.as_deref().unwrap_or(""),
        ));
        check_lines(
            &mut errors,
            self.items
                .iter()
                .map(|i| (i.product_id.as_str(), i.quantity, i.unit_price)),
        );

        errors.into_result()?;
        Ok(CreateSalesOrder {
            customer_info: CustomerInfo {
                name: self.customer_name.trim().to_string(),
                email: trimmed(&self.customer_email),
                phone: trimmed(&self.customer_phone),
                address: Some(AddressField::Structured(self.delivery_address.clone())),
            },
            delivery_address: self.delivery_address.clone(),
            warehouse_id: self.warehouse_id.as_deref().and_then(trimmed),
            expected_delivery_date: self.expected_delivery_date,
            notes: trimmed(&self.notes),
            items: self.items.clone(),
            total_amount: self.total(),
        })
    }
}

/// Shared checks of order lines: at least one, each with a product, a
/// positive quantity and a positive unit price.
fn check_lines<'a>(errors: &mut FormErrors, lines: impl ExactSizeIterator<Item = (&'a str, i64, Money)>) {
    if lines.len() == 0 {
        errors.push(ValidationError::Required {
            field: "items".to_string(),
        });
        return;
    }
    for (index, (product_id, quantity, unit_price)) in lines.enumerate() {
        errors.check(validate_required(&format!("items[{index}].productId"), product_id));
        errors.check(validate_quantity(&format!("items[{index}].quantity"), quantity));
        errors.check(validate_positive_amount(
            &format!("items[{index}].unitPrice"),
            unit_price,
        ));
    }
}

// =============================================================================
// Purchase Form
// =============================================================================

/// One line of the purchase form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItemInput {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Subtotal and final amount of a purchase form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    /// subtotal + tax − discount
    pub final_amount: Money,
}

/// Input for a new purchase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchaseForm {
    pub supplier_id: String,
    pub items: Vec<PurchaseItemInput>,
    pub tax_amount: Money,
    pub discount_amount: Money,
    pub payment_method: Option<String>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub notes: String,
}

/// Body of `POST /purchases`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchase {
    pub supplier_id: String,
    pub items: Vec<PurchaseItemInput>,
    pub total_amount: Money,
    pub tax_amount: Money,
    pub discount_amount: Money,
    pub final_amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PurchaseForm {
    pub fn totals(&self) -> PurchaseTotals {
        let subtotal: Money = self
            .items
            .iter()
            .map(|i| i.unit_price.multiply_quantity(i.quantity))
            .sum();
        PurchaseTotals {
            subtotal,
            tax: self.tax_amount,
            discount: self.discount_amount,
            final_amount: subtotal + self.tax_amount - self.discount_amount,
        }
    }

    pub fn validate(&self) -> Result<CreatePurchase, FormErrors> {
        let mut errors = FormErrors::new();

        errors.check(validate_required("supplierId", &self.supplier_id));
        check_lines(
            &mut errors,
            self.items
                .iter()
                .map(|i| (i.product_id.as_str(), i.quantity, i.unit_price)),
        );
        errors.check(validate_non_negative_amount("taxAmount", self.tax_amount));
        errors.check(validate_non_negative_amount(
            "discountAmount",
            self.discount_amount,
        ));

        errors.into_result()?;
        let totals = self.totals();
        Ok(CreatePurchase {
            supplier_id: self.supplier_id.trim().to_string(),
            items: self.items.clone(),
            total_amount: totals.subtotal,
            tax_amount: totals.tax,
            discount_amount: totals.discount,
            final_amount: totals.final_amount,
            payment_method: self.payment_method.as_deref().and_then(trimmed),
            expected_delivery_date: self.expected_delivery_date,
            notes: trimmed(&self.notes),
        })
    }
}

// =============================================================================
// Product Form
// =============================================================================

/// Input for creating or editing a product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub unit: String,
    pub description: String,
    /// Only admins may set a cost price.
    pub cost_price: Option<Money>,
    pub selling_price: Money,
}

/// Body of `POST /products` and `PUT /products/:id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Money>,
    pub selling_price: Money,
}

impl ProductForm {
    pub fn validate(&self) -> Result<ProductInput, FormErrors> {
        let mut errors = FormErrors::new();

        errors.check(validate_required("name", &self.name));
        errors.check(validate_sku(&self.sku));
        errors.check(validate_required("category", &self.category));
        errors.check(validate_positive_amount("sellingPrice", self.selling_price));
        if let Some(cost) = self.cost_price {
            errors.check(validate_positive_amount("costPrice", cost));
        }

        errors.into_result()?;
        Ok(ProductInput {
            name: self.name.trim().to_string(),
            sku: self.sku.trim().to_string(),
            category: self.category.trim().to_string(),
            unit: trimmed(&self.unit).unwrap_or_else(|| "pcs".to_string()),
            description: trimmed(&self.description),
            cost_price: self.cost_price,
            selling_price: self.selling_price,
        })
    }
}

// =============================================================================
// Stock Addition
// =============================================================================

/// Body of `POST /warehouses/:id/add-stock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAddition {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl StockAddition {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors.check(validate_required("productId", &self.product_id));
        errors.check(validate_quantity("quantity", self.quantity));
        errors.into_result()
    }
}

// =============================================================================
// Registration Form
// =============================================================================

/// Input for a new user account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Normalized registration body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<Registration, FormErrors> {
        let mut errors = FormErrors::new();

        errors.check(validate_name("firstName", &self.first_name));
        errors.check(validate_name("lastName", &self.last_name));
        errors.check(validate_email("email", &self.email));
        errors.check(validate_password("password", &self.password));

        errors.into_result()?;
        Ok(Registration {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            password: self.password.clone(),
            role: trimmed(&self.role).unwrap_or_else(|| "employee".to_string()),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: &str, quantity: i64, cents: i64) -> SalesItemInput {
        SalesItemInput {
            product_id: product_id.to_string(),
            variant_name: None,
            quantity,
            unit_price: Money::from_cents(cents),
        }
    }

    fn valid_sales_form() -> SalesOrderForm {
        SalesOrderForm {
            customer_name: "Ayesha Khan".into(),
            customer_email: "ayesha@example.com".into(),
            customer_phone: "0300-1234567".into(),
            delivery_address: Address {
                street: Some("12 Mall Road".into()),
                city: Some("Lahore".into()),
                ..Default::default()
            },
            items: vec![item("p1", 2, 1250), item("p2", 1, 300)],
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("KTL-RED-01").is_ok());
        assert!(validate_sku("product_1").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", "a@b.co").is_ok());
        assert!(validate_email("email", "a b@c.com").is_err());
        assert!(validate_email("email", "@c.com").is_err());
        assert!(validate_email("email", "a@.com").is_err());
        assert!(validate_email("email", "a@b@c.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password", "Secret1").is_ok());
        assert!(matches!(
            validate_password("password", ""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_password("password", "Ab1"),
            Err(ValidationError::TooShort { min: 6, .. })
        ));
        assert!(matches!(
            validate_password("password", "alllowercase1"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_sales_form_builds_request() {
        let request = valid_sales_form().validate().unwrap();
        assert_eq!(request.total_amount, Money::from_cents(2800));
        assert_eq!(request.customer_info.name, "Ayesha Khan");
        assert_eq!(request.notes, None);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["customerInfo"]["email"], "ayesha@example.com");
        assert_eq!(json["deliveryAddress"]["city"], "Lahore");
        assert_eq!(json["items"][0]["unitPrice"], 12.5);
        assert_eq!(json["totalAmount"], 28.0);
    }

    #[test]
    fn test_sales_form_reports_every_failing_field() {
        let form = SalesOrderForm {
            customer_email: "broken".into(),
            items: vec![item("", 0, 0), item("p2", 1, 100)],
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        for field in [
            "customerInfo.name",
            "customerInfo.email",
            "customerInfo.phone",
            "deliveryAddress.street",
            "deliveryAddress.city",
            "items[0].productId",
            "items[0].quantity",
            "items[0].unitPrice",
        ] {
            assert!(errors.has_field(field), "missing {field}");
        }
        assert!(!errors.has_field("items[1].productId"));
        assert_eq!(errors.len(), 8);
    }

    #[test]
    fn test_sales_form_requires_items() {
        let form = SalesOrderForm {
            items: vec![],
            ..valid_sales_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.has_field("items"));
    }

    #[test]
    fn test_purchase_totals() {
        let form = PurchaseForm {
            supplier_id: "s1".into(),
            items: vec![PurchaseItemInput {
                product_id: "p1".into(),
                quantity: 4,
                unit_price: Money::from_cents(2500),
            }],
            tax_amount: Money::from_cents(1000),
            discount_amount: Money::from_cents(500),
            ..Default::default()
        };
        let totals = form.totals();
        assert_eq!(totals.subtotal, Money::from_cents(10000));
        assert_eq!(totals.final_amount, Money::from_cents(10500));

        let request = form.validate().unwrap();
        assert_eq!(request.total_amount, Money::from_cents(10000));
        assert_eq!(request.final_amount, Money::from_cents(10500));
    }

    #[test]
    fn test_purchase_form_errors() {
        let form = PurchaseForm {
            tax_amount: Money::from_cents(-1),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has_field("supplierId"));
        assert!(errors.has_field("items"));
        assert!(errors.has_field("taxAmount"));
    }

    #[test]
    fn test_product_form() {
        let form = ProductForm {
            name: " Kettle ".into(),
            sku: "KTL-01".into(),
            category: "Kitchen".into(),
            selling_price: Money::from_cents(2500),
            ..Default::default()
        };
        let input = form.validate().unwrap();
        assert_eq!(input.name, "Kettle");
        assert_eq!(input.unit, "pcs");

        let bad = ProductForm {
            cost_price: Some(Money::zero()),
            ..Default::default()
        };
        let errors = bad.validate().unwrap_err();
        for field in ["name", "sku", "category", "sellingPrice", "costPrice"] {
            assert!(errors.has_field(field), "missing {field}");
        }
    }

    #[test]
    fn test_stock_addition() {
        let ok = StockAddition { product_id: "p1".into(), quantity: 5, tags: vec![] };
        assert!(ok.validate().is_ok());
        let bad = StockAddition { product_id: "".into(), quantity: 0, tags: vec![] };
        assert_eq!(bad.validate().unwrap_err().len(), 2);
    }

    #[test]
    fn test_registration_normalizes() {
        let form = RegistrationForm {
            first_name: " Sara ".into(),
            last_name: "Ali".into(),
            email: " Sara@Example.COM ".into(),
            password: "Secret1".into(),
            role: "".into(),
        };
        let reg = form.validate().unwrap();
        assert_eq!(reg.first_name, "Sara");
        assert_eq!(reg.email, "sara@example.com");
        assert_eq!(reg.role, "employee");
    }
}
