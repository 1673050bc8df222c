//! `stockpile purchases ...`

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use stockpile_client::InventoryApi;
use stockpile_core::validation::{PurchaseForm, PurchaseItemInput};
use stockpile_core::Money;
use tracing::info;

use super::parse_money;
use crate::context::CliContext;
use crate::table;

#[derive(Subcommand)]
pub enum PurchasesCommand {
    /// List purchases from suppliers.
    List,
    /// List suppliers.
    Suppliers,
    /// Record a purchase; totals are computed locally.
    Create(CreateArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    /// Supplier id.
    #[arg(long)]
    supplier: String,
    /// PRODUCT_ID:QUANTITY:UNIT_PRICE, repeatable.
    #[arg(long = "item", value_parser = parse_item, required = true)]
    items: Vec<PurchaseItemInput>,
    #[arg(long, value_parser = parse_money, default_value = "0")]
    tax: Money,
    #[arg(long, value_parser = parse_money, default_value = "0")]
    discount: Money,
    #[arg(long)]
    payment_method: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    expected_delivery: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    notes: String,
}

/// Parses `PRODUCT_ID:QUANTITY:UNIT_PRICE`.
fn parse_item(s: &str) -> Result<PurchaseItemInput, String> {
    let mut parts = s.splitn(3, ':');
    let (Some(product_id), Some(quantity), Some(price)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected PRODUCT_ID:QUANTITY:UNIT_PRICE, got '{s}'"));
    };
    let quantity = quantity
        .trim()
        .parse()
        .map_err(|_| format!("'{quantity}' is not a quantity"))?;
    Ok(PurchaseItemInput {
        product_id: product_id.trim().to_string(),
        quantity,
        unit_price: parse_money(price)?,
    })
}

impl CreateArgs {
    fn into_form(self) -> PurchaseForm {
        PurchaseForm {
            supplier_id: self.supplier,
            items: self.items,
            tax_amount: self.tax,
            discount_amount: self.discount,
            payment_method: self.payment_method,
            expected_delivery_date: self.expected_delivery,
            notes: self.notes,
        }
    }
}

pub async fn run(ctx: &CliContext, command: PurchasesCommand) -> Result<()> {
    let currency = &ctx.config.documents.currency;
    match command {
        PurchasesCommand::List => {
            let purchases = ctx.api.purchases().await.context("failed to load purchases")?;
            if ctx.json() {
                return ctx.print_json(&purchases);
            }
            println!("{}", table::purchases(&purchases, currency));
            Ok(())
        }
        PurchasesCommand::Suppliers => {
            let suppliers = ctx.api.suppliers().await.context("failed to load suppliers")?;
            if ctx.json() {
                return ctx.print_json(&suppliers);
            }
            println!("{}", table::suppliers(&suppliers));
            Ok(())
        }
        PurchasesCommand::Create(args) => {
            let body = args.into_form().validate()?;
            let created = ctx.api.create_purchase(&body).await?;
            info!(
                purchase = %created.purchase_number,
                total = %body.final_amount,
                "Purchase recorded"
            );

            if ctx.json() {
                return ctx.print_json(&created);
            }
            println!("{}", table::purchases(&[created], currency));
            Ok(())
        }
    }
}
