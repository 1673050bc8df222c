//! Shared state handed to every API command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use stockpile_client::{ClientConfig, HttpApiClient, OptimisticStore, TracingNotifier};
use stockpile_core::SalesOrder;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct CliContext {
    pub config: ClientConfig,
    pub api: HttpApiClient,
    pub notifier: TracingNotifier,
    /// Sales orders created in this session that the API has not listed yet.
    pub sales: OptimisticStore<SalesOrder>,
    /// Parent of every poller; cancelled on Ctrl-C.
    pub shutdown: CancellationToken,
    json: bool,
}

impl CliContext {
    pub fn initialize(config_path: Option<PathBuf>, json: bool) -> Result<Self> {
        let config = ClientConfig::load(config_path).context("failed to load configuration")?;
        let api = HttpApiClient::new(&config.api).context("failed to build API client")?;
        let sales = OptimisticStore::new(config.cache.optimistic_ttl());

        Ok(Self {
            config,
            api,
            notifier: TracingNotifier,
            sales,
            shutdown: CancellationToken::new(),
            json,
        })
    }

    pub fn json(&self) -> bool {
        self.json
    }

    /// Prints `value` as pretty JSON.
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Cancels [`Self::shutdown`] on the first Ctrl-C.
    pub fn cancel_on_ctrl_c(&self) {
        let token = self.shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, stopping");
                    token.cancel();
                }
                Err(e) => warn!(error = %e, "Unable to listen for Ctrl-C"),
            }
        });
    }
}
