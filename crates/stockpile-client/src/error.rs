//! # Client Error Types
//!
//! Error types for API calls, configuration and file output.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Response            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Request        │  │  Status (4xx / 5xx)     │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  Shape (unexpected JSON)│ │
//! │  │  ConfigLoad/Save│  │  Cancelled      │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Domain       │  │     Render      │  │      I/O                │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidTransit.│  │  Pdf / Xlsx     │  │  Io                     │ │
//! │  │  Form           │  │  Csv            │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockpile_core::{CoreError, FormErrors};
use thiserror::Error;

use crate::normalize::ShapeError;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Every failure the client can report.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never produced a response.
    #[error("Request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    #[error("Request to {endpoint} timed out")]
    Timeout { endpoint: String },

    /// The operation was cancelled before it finished.
    #[error("Operation cancelled")]
    Cancelled,

    // =========================================================================
    // Response Errors
    // =========================================================================
    /// The API answered with a non-success status.
    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// The body did not have any accepted shape.
    #[error("Unexpected response from {endpoint}: {source}")]
    Shape {
        endpoint: String,
        #[source]
        source: ShapeError,
    },

    // =========================================================================
    // Domain Errors
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Output Errors
    // =========================================================================
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("Spreadsheet rendering failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<FormErrors> for ClientError {
    fn from(err: FormErrors) -> Self {
        ClientError::Core(CoreError::Form(err))
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl ClientError {
    /// Maps a reqwest failure on `endpoint` to a transport or status error.
    pub(crate) fn from_reqwest(endpoint: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else if let Some(status) = err.status() {
            ClientError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            ClientError::Shape {
                endpoint: endpoint.to_string(),
                source: ShapeError::Malformed(err.to_string()),
            }
        } else {
            ClientError::Request {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        }
    }

    pub(crate) fn shape(endpoint: &str, source: ShapeError) -> Self {
        ClientError::Shape {
            endpoint: endpoint.to_string(),
            source,
        }
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if the next poll or refresh may succeed.
    ///
    /// ## Retryable Errors
    /// - Requests that got no response
    /// - Timeouts
    /// - 5xx responses and 429
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Request { .. } | ClientError::Timeout { .. } => true,
            ClientError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the API rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Status { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpile_core::ValidationError;

    #[test]
    fn test_retryable_errors() {
        let status = |status| ClientError::Status {
            endpoint: "/sales".into(),
            status,
            message: "boom".into(),
        };
        assert!(ClientError::Timeout { endpoint: "/sales".into() }.is_retryable());
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());

        assert!(!status(404).is_retryable());
        assert!(!ClientError::InvalidConfig("bad".into()).is_retryable());
        assert!(!ClientError::Cancelled.is_retryable());
        assert!(status(401).is_unauthorized());
    }

    #[test]
    fn test_config_errors() {
        assert!(ClientError::InvalidUrl("x".into()).is_config_error());
        assert!(!ClientError::Cancelled.is_config_error());
    }

    #[test]
    fn test_form_errors_convert() {
        let mut form = FormErrors::new();
        form.push(ValidationError::Required { field: "sku".into() });
        let err: ClientError = form.into();
        assert!(err.to_string().contains("sku is required"));
    }
}
