//! # Client Configuration
//!
//! Where the API lives, how often each view polls, and where documents go.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKPILE_API_URL=https://inventory.example.com/api                │
//! │     STOCKPILE_API_TOKEN=...                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/dashboard/stockpile.toml (Linux)                         │
//! │     ~/Library/Application Support/com.stockpile.dashboard/ (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:5000/api, 3 s dashboard, 30 s lists               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "http://localhost:5000/api"
//! timeout_secs = 15
//!
//! [polling]
//! dashboard_secs = 3
//! sales_secs = 30
//! returns_secs = 30
//!
//! [reports]
//! trailing_days = 30
//! top_products = 10
//!
//! [documents]
//! output_dir = "documents"
//! company_name = "INVENTORY MANAGEMENT SYSTEM"
//! currency = "PKR"
//!
//! [cache]
//! optimistic_ttl_secs = 300
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use stockpile_core::document::CompanyHeader;
use stockpile_core::{AggregateOptions, DEFAULT_CURRENCY, DEFAULT_TOP_PRODUCTS, DEFAULT_TRAILING_DAYS};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// File name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "stockpile.toml";

// =============================================================================
// API Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL every endpoint path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout() -> u64 {
    15
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Polling Settings
// =============================================================================

/// Refresh intervals per view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingSettings {
    #[serde(default = "default_dashboard_secs")]
    pub dashboard_secs: u64,

    #[serde(default = "default_list_secs")]
    pub sales_secs: u64,

    #[serde(default = "default_list_secs")]
    pub returns_secs: u64,
}

fn default_dashboard_secs() -> u64 {
    3
}

fn default_list_secs() -> u64 {
    30
}

impl Default for PollingSettings {
    fn default() -> Self {
        PollingSettings {
            dashboard_secs: default_dashboard_secs(),
            sales_secs: default_list_secs(),
            returns_secs: default_list_secs(),
        }
    }
}

impl PollingSettings {
    pub fn dashboard(&self) -> Duration {
        Duration::from_secs(self.dashboard_secs)
    }

    pub fn sales(&self) -> Duration {
        Duration::from_secs(self.sales_secs)
    }

    pub fn returns(&self) -> Duration {
        Duration::from_secs(self.returns_secs)
    }
}

// =============================================================================
// Report Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Length of the dashboard's daily series.
    #[serde(default = "default_trailing_days")]
    pub trailing_days: u32,

    #[serde(default = "default_top_products")]
    pub top_products: usize,
}

fn default_trailing_days() -> u32 {
    DEFAULT_TRAILING_DAYS
}

fn default_top_products() -> usize {
    DEFAULT_TOP_PRODUCTS
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            trailing_days: default_trailing_days(),
            top_products: default_top_products(),
        }
    }
}

impl ReportSettings {
    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            trailing_days: self.trailing_days,
            top_products: self.top_products,
        }
    }
}

// =============================================================================
// Document Settings
// =============================================================================

/// Output location and letterhead of generated documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSettings {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_company_name")]
    pub company_name: String,

    /// Address and contact lines under the company name.
    #[serde(default)]
    pub company_lines: Vec<String>,

    #[serde(default = "default_footer")]
    pub footer: Vec<String>,

    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("documents")
}

fn default_company_name() -> String {
    CompanyHeader::default().name
}

fn default_footer() -> Vec<String> {
    CompanyHeader::default().footer
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for DocumentSettings {
    fn default() -> Self {
        DocumentSettings {
            output_dir: default_output_dir(),
            company_name: default_company_name(),
            company_lines: Vec::new(),
            footer: default_footer(),
            currency: default_currency(),
        }
    }
}

impl DocumentSettings {
    pub fn company_header(&self) -> CompanyHeader {
        CompanyHeader {
            name: self.company_name.clone(),
            lines: self.company_lines.clone(),
            footer: self.footer.clone(),
        }
    }
}

// =============================================================================
// Cache Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// How long an optimistic insert waits to show up in the API's list.
    #[serde(default = "default_optimistic_ttl")]
    pub optimistic_ttl_secs: u64,
}

fn default_optimistic_ttl() -> u64 {
    300
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            optimistic_ttl_secs: default_optimistic_ttl(),
        }
    }
}

impl CacheSettings {
    pub fn optimistic_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.optimistic_ttl_secs).unwrap_or(i64::MAX))
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub polling: PollingSettings,

    #[serde(default)]
    pub reports: ReportSettings,

    #[serde(default)]
    pub documents: DocumentSettings,

    #[serde(default)]
    pub cache: CacheSettings,
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (stockpile.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file, returning the path written.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Client config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        for (name, secs) in [
            ("dashboard_secs", self.polling.dashboard_secs),
            ("sales_secs", self.polling.sales_secs),
            ("returns_secs", self.polling.returns_secs),
        ] {
            if secs == 0 {
                return Err(ClientError::InvalidConfig(format!(
                    "{name} must be greater than 0"
                )));
            }
        }

        if self.reports.trailing_days == 0 {
            return Err(ClientError::InvalidConfig(
                "trailing_days must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `STOCKPILE_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("STOCKPILE_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(token) = lookup("STOCKPILE_API_TOKEN") {
            self.api.token = Some(token).filter(|t| !t.is_empty());
        }

        if let Some(timeout) = lookup("STOCKPILE_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring invalid STOCKPILE_TIMEOUT_SECS"),
            }
        }

        if let Some(secs) = lookup("STOCKPILE_DASHBOARD_INTERVAL_SECS") {
            match secs.parse() {
                Ok(secs) => self.polling.dashboard_secs = secs,
                Err(_) => warn!(value = %secs, "Ignoring invalid STOCKPILE_DASHBOARD_INTERVAL_SECS"),
            }
        }

        if let Some(dir) = lookup("STOCKPILE_OUTPUT_DIR") {
            debug!(dir = %dir, "Overriding document output directory from environment");
            self.documents.output_dir = PathBuf::from(dir);
        }

        if let Some(currency) = lookup("STOCKPILE_CURRENCY") {
            self.documents.currency = currency;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockpile", "dashboard")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}
