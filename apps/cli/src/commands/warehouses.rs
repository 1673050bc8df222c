//! `stockpile warehouses ...`

use anyhow::{Context, Result};
use clap::Subcommand;
use stockpile_client::InventoryApi;
use stockpile_core::validation::StockAddition;
use tracing::info;

use crate::context::CliContext;
use crate::table;

#[derive(Subcommand)]
pub enum WarehousesCommand {
    /// List warehouses with capacity usage.
    List,
    /// One warehouse and its stock lines.
    Show { id: String },
    /// Add units of a product to a warehouse.
    AddStock {
        warehouse: String,
        #[arg(long)]
        product: String,
        #[arg(long)]
        quantity: i64,
        /// Repeatable.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
}

pub async fn run(ctx: &CliContext, command: WarehousesCommand) -> Result<()> {
    match command {
        WarehousesCommand::List => {
            let warehouses = ctx.api.warehouses().await.context("failed to load warehouses")?;
            if ctx.json() {
                return ctx.print_json(&warehouses);
            }
            println!("{}", table::warehouses(&warehouses));
            Ok(())
        }
        WarehousesCommand::Show { id } => {
            let warehouse = ctx.api.warehouse(&id).await?;
            if ctx.json() {
                return ctx.print_json(&warehouse);
            }
            println!("{}", table::warehouses(std::slice::from_ref(&warehouse)));
            println!("{}", table::stock_entries(&warehouse.current_stock));
            Ok(())
        }
        WarehousesCommand::AddStock { warehouse, product, quantity, tags } => {
            let addition = StockAddition {
                product_id: product,
                quantity,
                tags,
            };
            let added = ctx.api.add_stock(&warehouse, &addition).await?;
            info!(warehouse = %warehouse, product = %added.product, quantity = added.quantity, "Stock added");

            if ctx.json() {
                return ctx.print_json(&added);
            }
            println!("Added {} x {} to {warehouse}", added.quantity, added.product);
            Ok(())
        }
    }
}
