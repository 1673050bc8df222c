//! # Stockpile CLI Entry Point
//!
//! Terminal front end for the Stockpile inventory API.
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        stockpile (binary)                               │
//! │                                                                         │
//! │  main.rs ────► Sets up logging, loads config, dispatches               │
//! │                                                                         │
//! │  context.rs ─► CliContext: config + HTTP client + optimistic store     │
//! │                                                                         │
//! │  commands/ ──► dashboard, sales, returns, products, warehouses,        │
//! │                purchases, register, reports, document, export, config   │
//! │                                                                         │
//! │  table.rs ───► comfy-table rendering of cards, series and lists        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Parse arguments
//! 2. Initialize tracing (`RUST_LOG`, default `info,stockpile=debug`)
//! 3. Load `stockpile.toml` plus `STOCKPILE_*` overrides
//! 4. Build the HTTP client and run the command

mod commands;
mod context;
mod table;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    config::ConfigCommand, dashboard::DashboardArgs, document::DocumentArgs, export::ExportArgs,
    products::ProductsCommand, purchases::PurchasesCommand, register::RegisterArgs, reports::ReportArgs,
    returns::ReturnsCommand, sales::SalesCommand, warehouses::WarehousesCommand,
};
use crate::context::CliContext;

#[derive(Parser)]
#[command(name = "stockpile", about = "Inventory and sales dashboard for the Stockpile API", version)]
struct Cli {
    /// Path to stockpile.toml; defaults to the platform config directory.
    #[arg(long, global = true, env = "STOCKPILE_CONFIG")]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Print results as pretty JSON instead of tables"
    )]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or create the config file.
    #[command(subcommand)]
    Config(ConfigCommand),
    #[command(flatten)]
    Api(ApiCommand),
}

/// Commands that talk to the inventory API.
#[derive(Subcommand)]
enum ApiCommand {
    /// Dashboard metrics, optionally refreshed on an interval.
    Dashboard(DashboardArgs),
    /// Sales orders and their lifecycle.
    #[command(subcommand)]
    Sales(SalesCommand),
    /// Expected customer returns.
    #[command(subcommand)]
    Returns(ReturnsCommand),
    /// Product catalogue.
    #[command(subcommand)]
    Products(ProductsCommand),
    /// Warehouses and their stock.
    #[command(subcommand)]
    Warehouses(WarehousesCommand),
    /// Supplier purchases.
    #[command(subcommand)]
    Purchases(PurchasesCommand),
    /// Create a user account.
    Register(RegisterArgs),
    /// Fetch a server-side report.
    Reports(ReportArgs),
    /// Generate an invoice or receipt.
    Document(DocumentArgs),
    /// Export a collection to CSV, JSON or XLSX.
    Export(ExportArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockpile=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        // Config commands must work even when the current config is invalid.
        Commands::Config(command) => commands::config::run(command, cli.config, cli.json)?,
        Commands::Api(command) => {
            let context = CliContext::initialize(cli.config, cli.json)?;
            debug!(api = %context.api.base_url(), "CLI context ready");
            dispatch(&context, command).await?;
        }
    }

    Ok(())
}

async fn dispatch(context: &CliContext, command: ApiCommand) -> Result<()> {
    match command {
        ApiCommand::Dashboard(args) => commands::dashboard::run(context, args).await,
        ApiCommand::Sales(command) => commands::sales::run(context, command).await,
        ApiCommand::Returns(command) => commands::returns::run(context, command).await,
        ApiCommand::Products(command) => commands::products::run(context, command).await,
        ApiCommand::Warehouses(command) => commands::warehouses::run(context, command).await,
        ApiCommand::Purchases(command) => commands::purchases::run(context, command).await,
        ApiCommand::Register(args) => commands::register::run(context, args).await,
        ApiCommand::Reports(args) => commands::reports::run(context, args).await,
        ApiCommand::Document(args) => commands::document::run(context, args).await,
        ApiCommand::Export(args) => commands::export::run(context, args).await,
    }
}
