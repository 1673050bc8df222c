//! # stockpile-client: REST Client & Writers for Stockpile
//!
//! Everything in the dashboard that touches the network, the clock or the
//! file system.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Client Architecture                              │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 Poller (one per live view)                       │  │
//! │  │   interval ─┐                                                    │  │
//! │  │   refresh  ─┼─► fetch ─► watch channel ─► renderer              │  │
//! │  │   cancel   ─┘                                                    │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ Dashboard      │  │ InventoryApi   │  │ OptimisticStore        │    │
//! │  │                │  │                │  │                        │    │
//! │  │ 4 concurrent   │  │ reqwest + JSON │  │ created records shown  │    │
//! │  │ fetches, empty │  │ normalize_*    │  │ until the API lists    │    │
//! │  │ on failure     │  │ guarded status │  │ them                   │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ ClientConfig   │  │ render         │  │ export                 │    │
//! │  │ TOML + env     │  │ PDF / XLSX     │  │ CSV / JSON / XLSX      │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`api`] - `InventoryApi` trait and its HTTP implementation
//! - [`normalize`] - Collection and record shape normalization
//! - [`dashboard`] - Concurrent dashboard refresh
//! - [`poller`] - Cancellable scheduled re-fetch
//! - [`state`] - Shared optimistic-insert store
//! - [`notify`] - Transient failure notifications
//! - [`render`] - Invoice and receipt writers
//! - [`export`] - Collection exports
//! - [`config`] - Client configuration
//! - [`error`] - Client error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockpile_client::{ClientConfig, HttpApiClient, Poller, TracingNotifier};
//! use stockpile_client::dashboard::refresh_dashboard;
//!
//! let config = ClientConfig::load_or_default(None);
//! let api = HttpApiClient::new(&config.api)?;
//! let options = config.reports.aggregate_options();
//!
//! let handle = Poller::new("dashboard", config.polling.dashboard()).spawn(move || {
//!     let api = api.clone();
//!     async move { refresh_dashboard(&api, &TracingNotifier, chrono::Utc::now(), options).await }
//! });
//! let mut snapshots = handle.subscribe();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod normalize;
pub mod notify;
pub mod poller;
pub mod render;
pub mod state;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{change_return_status, change_sales_status, DateRange, HttpApiClient, InventoryApi, ReportKind};
pub use config::ClientConfig;
pub use dashboard::{DashboardData, DashboardSnapshot};
pub use error::{ClientError, ClientResult};
pub use normalize::{normalize_collection, ShapeError};
pub use notify::{NoOpNotifier, Notifier, TracingNotifier};
pub use poller::{Poller, PollerHandle};
pub use state::OptimisticStore;
