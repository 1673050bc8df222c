//! # Error Types
//!
//! Domain-specific error types for stockpile-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockpile-core errors (this file)                                      │
//! │  ├── CoreError         - Domain rule violations                        │
//! │  ├── ValidationError   - One failing form field                        │
//! │  ├── FormErrors        - Every failing field of one form               │
//! │  └── LayoutError       - Document does not fit the rich layout         │
//! │                                                                         │
//! │  stockpile-client errors (separate crate)                               │
//! │  └── ClientError       - Transport, status, shape, render, I/O         │
//! │                                                                         │
//! │  Flow: ValidationError → FormErrors → CoreError → ClientError → CLI    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A status change outside the transition table was requested.
    ///
    /// ## When This Occurs
    /// ```text
    /// order.status = delivered
    ///      │
    ///      ▼
    /// request: delivered → dispatch
    ///      │
    ///      ▼
    /// InvalidTransition { entity: "sales order", from: "delivered", to: "dispatch" }
    ///      │
    ///      ▼
    /// No request is sent to the API
    /// ```
    #[error("Cannot move {entity} from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// A form failed field-level validation.
    #[error(transparent)]
    Form(#[from] FormErrors),

    /// A single validation failure outside of a form.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single field validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g. an email without a domain).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two fields that must agree do not.
    #[error("{field} does not match {other}")]
    Mismatch { field: String, other: String },
}

impl ValidationError {
    /// Name of the field this failure belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Mismatch { field, .. } => field,
        }
    }
}

// =============================================================================
// Form Errors
// =============================================================================

/// Every failing field of one form, in the order the fields were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation: {}", .errors.len(), summary(.errors))]
pub struct FormErrors {
    errors: Vec<ValidationError>,
}

fn summary(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Records the failure of `check`, if any.
    pub fn check(&mut self, check: Result<(), ValidationError>) {
        if let Err(error) = check {
            self.push(error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Failures recorded against `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.field() == field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.for_field(field).next().is_some()
    }

    /// `Ok(())` when nothing failed, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

// =============================================================================
// Layout Error
// =============================================================================

/// The rich document layout could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The line-item table needs more rows than one page holds.
    #[error("line-item table needs {rows} rows but one page holds {capacity}")]
    PageOverflow { rows: usize, capacity: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
