//! `stockpile products ...`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;
use stockpile_client::InventoryApi;
use stockpile_core::validation::ProductForm;
use stockpile_core::{Money, Product, StockLevel};
use tracing::info;

use super::parse_money;
use crate::context::CliContext;
use crate::table;

#[derive(Subcommand)]
pub enum ProductsCommand {
    /// List the catalogue.
    List {
        /// Only products whose name, SKU or category contains this text.
        #[arg(long)]
        search: Option<String>,
        /// Only low and out-of-stock products.
        #[arg(long)]
        low_stock: bool,
    },
    /// Ask the API for a SKU derived from a product name.
    GenerateSku { name: String },
    /// Create a product; the SKU is generated when omitted.
    Create(CreateArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    sku: Option<String>,
    #[arg(long)]
    category: String,
    /// Defaults to pcs.
    #[arg(long, default_value = "")]
    unit: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, value_parser = parse_money)]
    price: Money,
    #[arg(long, value_parser = parse_money)]
    cost: Option<Money>,
}

fn matches_search(product: &Product, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    product.name.to_lowercase().contains(&needle)
        || product.sku.to_lowercase().contains(&needle)
        || product
            .category
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(&needle))
}

pub async fn run(ctx: &CliContext, command: ProductsCommand) -> Result<()> {
    match command {
        ProductsCommand::List { search, low_stock } => {
            let products: Vec<Product> = ctx
                .api
                .products()
                .await
                .context("failed to load products")?
                .into_iter()
                .filter(|p| search.as_deref().map_or(true, |s| matches_search(p, s)))
                .filter(|p| !low_stock || p.stock_level() != StockLevel::InStock)
                .collect();

            if ctx.json() {
                return ctx.print_json(&products);
            }
            println!("{}", table::products(&products, &ctx.config.documents.currency));
            Ok(())
        }
        ProductsCommand::GenerateSku { name } => {
            let sku = ctx.api.generate_sku(&name).await?;
            if ctx.json() {
                return ctx.print_json(&json!({ "sku": sku }));
            }
            println!("{sku}");
            Ok(())
        }
        ProductsCommand::Create(args) => {
            let sku = match args.sku {
                Some(sku) => sku,
                None => ctx
                    .api
                    .generate_sku(&args.name)
                    .await
                    .context("no --sku given and SKU generation failed")?,
            };
            let form = ProductForm {
                name: args.name,
                sku,
                category: args.category,
                unit: args.unit,
                description: args.description,
                cost_price: args.cost,
                selling_price: args.price,
            };
            let input = form.validate()?;
            let created = ctx.api.create_product(&input).await?;
            info!(product = %created.name, sku = %created.sku, "Product created");

            if ctx.json() {
                return ctx.print_json(&created);
            }
            println!("{}", table::products(&[created], &ctx.config.documents.currency));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_matches_name_sku_and_category() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1",
            "name": "Electric Kettle",
            "sku": "EK-100",
            "category": "Kitchen"
        }))
        .unwrap();
        assert!(matches_search(&product, "kettle"));
        assert!(matches_search(&product, "ek-1"));
        assert!(matches_search(&product, "KITCH"));
        assert!(!matches_search(&product, "toaster"));
    }
}
