//! `stockpile dashboard`

use std::time::Duration;

use anyhow::Result;
use chrono::{Local, Utc};
use clap::Args;
use stockpile_client::dashboard::refresh_dashboard;
use stockpile_client::{DashboardSnapshot, Poller, TracingNotifier};
use tracing::info;

use crate::context::CliContext;
use crate::table;

#[derive(Args)]
pub struct DashboardArgs {
    /// Keep refreshing until interrupted.
    #[arg(long)]
    watch: bool,

    /// Seconds between refreshes with --watch; defaults to the configured interval.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Length of the daily series.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    days: Option<u32>,
}

pub async fn run(ctx: &CliContext, args: DashboardArgs) -> Result<()> {
    let mut options = ctx.config.reports.aggregate_options();
    if let Some(days) = args.days {
        options.trailing_days = days;
    }

    if !args.watch {
        let snapshot = refresh_dashboard(&ctx.api, &ctx.notifier, Utc::now(), options).await;
        return print_snapshot(ctx, &snapshot);
    }

    let interval = args
        .interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| ctx.config.polling.dashboard());
    ctx.cancel_on_ctrl_c();

    let api = ctx.api.clone();
    let handle = Poller::new("dashboard", interval)
        .with_parent(&ctx.shutdown)
        .spawn(move || {
            let api = api.clone();
            async move { refresh_dashboard(&api, &TracingNotifier, Utc::now(), options).await }
        });
    info!(interval_secs = interval.as_secs(), "Watching dashboard");

    super::follow(ctx, handle, |snapshot| print_snapshot(ctx, snapshot)).await
}

fn print_snapshot(ctx: &CliContext, snapshot: &DashboardSnapshot) -> Result<()> {
    if ctx.json() {
        return ctx.print_json(snapshot);
    }

    let currency = ctx.config.documents.currency.as_str();
    let metrics = &snapshot.metrics;

    println!("Dashboard as of {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    if !snapshot.failed.is_empty() {
        println!("Unavailable, shown as empty: {}", snapshot.failed.join(", "));
    }
    println!("{}", table::overview(&metrics.overview, currency));

    println!("\nDaily ({} days)", metrics.daily.len());
    println!("{}", table::daily(&metrics.daily, currency));

    if !metrics.top_products.is_empty() {
        println!("\nTop products");
        println!("{}", table::top_products(&metrics.top_products, currency));
        let fast: Vec<&str> = metrics.fast_movers.iter().map(|p| p.name.as_str()).collect();
        println!("Fast movers: {}", fast.join(", "));
    }
    if !metrics.sales_by_warehouse.is_empty() {
        println!("\nSales by warehouse");
        println!("{}", table::warehouse_sales(&metrics.sales_by_warehouse, currency));
    }
    if !metrics.low_stock.is_empty() {
        println!("\nLow stock");
        println!("{}", table::stock_alerts(&metrics.low_stock));
    }
    if !metrics.out_of_stock.is_empty() {
        println!("\nOut of stock");
        println!("{}", table::stock_alerts(&metrics.out_of_stock));
    }
    Ok(())
}
