//! `stockpile sales ...`

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use serde_json::json;
use stockpile_client::state::{create_sales_order, list_sales_orders};
use stockpile_client::{change_sales_status, Notifier, Poller, TracingNotifier};
use stockpile_core::metrics::{SalesListStats, TimeFilter};
use stockpile_core::validation::{SalesItemInput, SalesOrderForm};
use stockpile_core::{Address, SalesOrder, SalesStatus};
use tracing::info;

use super::{find_sales_order, parse_money};
use crate::context::CliContext;
use crate::table;

#[derive(Subcommand)]
pub enum SalesCommand {
    /// List sales orders with their counters.
    List(ListArgs),
    /// Show the sales lifecycle, or the moves open to one order.
    Transitions {
        /// Order id or number.
        order: Option<String>,
    },
    /// Move an order to a new status.
    SetStatus {
        /// Order id or number.
        order: String,
        status: SalesStatus,
    },
    /// Create a sales order.
    Create(CreateArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// all, today, week, month, quarter or year.
    #[arg(long, default_value = "all")]
    filter: TimeFilter,

    #[arg(long)]
    status: Option<SalesStatus>,

    /// Keep refreshing until interrupted.
    #[arg(long)]
    watch: bool,
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    customer: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    street: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    zip: Option<String>,
    #[arg(long)]
    country: Option<String>,
    /// Warehouse the order ships from.
    #[arg(long)]
    warehouse: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    expected_delivery: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    notes: String,
    /// PRODUCT_ID:QUANTITY:UNIT_PRICE[:VARIANT], repeatable.
    #[arg(long = "item", value_parser = parse_item, required = true)]
    items: Vec<SalesItemInput>,
}

/// Parses `PRODUCT_ID:QUANTITY:UNIT_PRICE[:VARIANT]`.
fn parse_item(s: &str) -> Result<SalesItemInput, String> {
    let mut parts = s.splitn(4, ':');
    let (Some(product_id), Some(quantity), Some(price)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected PRODUCT_ID:QUANTITY:UNIT_PRICE, got '{s}'"));
    };
    let quantity = quantity
        .trim()
        .parse()
        .map_err(|_| format!("'{quantity}' is not a quantity"))?;
    Ok(SalesItemInput {
        product_id: product_id.trim().to_string(),
        variant_name: parts.next().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string),
        quantity,
        unit_price: parse_money(price)?,
    })
}

impl CreateArgs {
    fn into_form(self) -> SalesOrderForm {
        SalesOrderForm {
            customer_name: self.customer,
            customer_email: self.email,
            customer_phone: self.phone,
            delivery_address: Address {
                street: self.street,
                city: self.city,
                state: self.state,
                zip_code: self.zip,
                country: self.country,
            },
            warehouse_id: self.warehouse,
            expected_delivery_date: self.expected_delivery,
            notes: self.notes,
            items: self.items,
        }
    }
}

pub async fn run(ctx: &CliContext, command: SalesCommand) -> Result<()> {
    match command {
        SalesCommand::List(args) if args.watch => watch(ctx, args).await,
        SalesCommand::List(args) => {
            let orders = list_sales_orders(&ctx.api, &ctx.sales)
                .await
                .context("failed to load sales orders")?;
            print_list(ctx, &orders, &args)
        }
        SalesCommand::Transitions { order } => {
            let current = match order {
                Some(key) => Some(find_sales_order(&ctx.api, &key).await?.status),
                None => None,
            };
            println!("{}", table::sales_transitions(current));
            Ok(())
        }
        SalesCommand::SetStatus { order, status } => {
            let order = find_sales_order(&ctx.api, &order).await?;
            let updated = change_sales_status(&ctx.api, &order, status)
                .await
                .with_context(|| format!("cannot move {} to {status}", order.display_number()))?;
            info!(order = %updated.display_number(), from = %order.status, to = %updated.status, "Sales status changed");
            print_orders(ctx, &[updated])
        }
        SalesCommand::Create(args) => {
            let form = args.into_form();
            let created = create_sales_order(&ctx.api, &ctx.sales, &form).await?;
            print_orders(ctx, &[created])?;

            let orders = list_sales_orders(&ctx.api, &ctx.sales)
                .await
                .context("order created, but the list could not be refreshed")?;
            print_list(ctx, &orders, &ListArgs { filter: TimeFilter::All, status: None, watch: false })
        }
    }
}

async fn watch(ctx: &CliContext, args: ListArgs) -> Result<()> {
    ctx.cancel_on_ctrl_c();

    let api = ctx.api.clone();
    let store = ctx.sales.clone();
    let handle = Poller::new("sales", ctx.config.polling.sales())
        .with_parent(&ctx.shutdown)
        .spawn(move || {
            let api = api.clone();
            let store = store.clone();
            async move {
                list_sales_orders(&api, &store).await.unwrap_or_else(|err| {
                    TracingNotifier.fetch_failed("sales", &err);
                    Vec::new()
                })
            }
        });

    super::follow(ctx, handle, |orders| print_list(ctx, orders, &args)).await
}

fn print_orders(ctx: &CliContext, orders: &[SalesOrder]) -> Result<()> {
    if ctx.json() {
        return ctx.print_json(orders);
    }
    println!("{}", table::sales_orders(orders, &ctx.config.documents.currency));
    Ok(())
}

fn print_list(ctx: &CliContext, orders: &[SalesOrder], args: &ListArgs) -> Result<()> {
    let shown: Vec<&SalesOrder> = args
        .filter
        .apply(orders, Utc::now())
        .into_iter()
        .filter(|o| args.status.map_or(true, |s| o.status == s))
        .collect();
    let stats = SalesListStats::compute(shown.iter().copied());

    if ctx.json() {
        return ctx.print_json(&json!({ "salesOrders": shown, "stats": stats }));
    }

    let currency = ctx.config.documents.currency.as_str();
    let owned: Vec<SalesOrder> = shown.into_iter().cloned().collect();
    println!("{}", table::sales_orders(&owned, currency));
    println!(
        "{}",
        table::counters([
            ("Orders", stats.total_orders.to_string()),
            ("Delivered", stats.total_delivered.to_string()),
            ("Returned", stats.total_returns.to_string()),
            ("Revenue", stats.total_revenue.display_with(currency)),
        ])
    );
    Ok(())
}
