//! # stockpile-core: Pure Business Logic for Stockpile
//!
//! Types, metric aggregation, status state machines, form validation,
//! document layout and optimistic-insert bookkeeping for the inventory
//! dashboard. Nothing in here touches the network, the file system or the
//! clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockpile Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    stockpile CLI (apps/cli)                     │   │
//! │  │    dashboard ──► sales ──► returns ──► documents ──► exports   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stockpile-client                             │   │
//! │  │    REST client, normalizer, poller, PDF/XLSX/CSV writers       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockpile-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │ metrics │ │ status  │ │validation│ │document│  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities as the REST API returns them
//! - [`money`] - Integer money with major-unit JSON
//! - [`metrics`] - Dashboard aggregation
//! - [`status`] - Sales and return lifecycles
//! - [`validation`] - Form checks and request bodies
//! - [`document`] - Invoice and receipt layout
//! - [`optimistic`] - Optimistic insert cache
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockpile_core::status::SalesStatus;
//!
//! assert_eq!(
//!     SalesStatus::Expected.allowed_transitions(),
//!     &[SalesStatus::Delivered, SalesStatus::Returned]
//! );
//! assert!(SalesStatus::Cancelled.is_terminal());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod document;
pub mod error;
pub mod metrics;
pub mod money;
pub mod optimistic;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, FormErrors, LayoutError, ValidationError};
pub use metrics::{aggregate, AggregateOptions, DashboardInput, DashboardMetrics};
pub use money::Money;
pub use optimistic::OptimisticCache;
pub use status::{ReturnStatus, SalesStatus};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Share of product revenue reported as estimated profit.
///
/// Purchases are not linked to individual products, so per-product profit
/// is a flat estimate rather than a computed value.
pub const ESTIMATED_PRODUCT_MARGIN: f64 = 0.18;

/// Default length of the dashboard's daily series.
pub const DEFAULT_TRAILING_DAYS: u32 = 30;

/// Default size of the top-products list.
pub const DEFAULT_TOP_PRODUCTS: usize = 10;

/// Leading entries of the top-products list reported as fast movers.
pub const FAST_MOVER_COUNT: usize = 5;

/// Warehouse stock entries with fewer available units are flagged low.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Products at or below this stock are "low" unless they set their own threshold.
pub const PRODUCT_LOW_STOCK_THRESHOLD: i64 = 5;

pub const MAX_SKU_LENGTH: usize = 50;
pub const MIN_NAME_LENGTH: usize = 2;
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Currency code printed on documents and tables.
pub const DEFAULT_CURRENCY: &str = "PKR";
