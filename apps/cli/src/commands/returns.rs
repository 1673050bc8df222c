//! `stockpile returns ...`

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Subcommand;
use stockpile_client::api::ReturnsPage;
use stockpile_client::{change_return_status, InventoryApi, Notifier, Poller, TracingNotifier};
use stockpile_core::ReturnStatus;
use tracing::info;

use super::find_expected_return;
use crate::context::CliContext;
use crate::table;

#[derive(Subcommand)]
pub enum ReturnsCommand {
    /// List expected returns with their counters.
    List {
        /// pending, in_transit, received or cancelled.
        #[arg(long)]
        status: Option<ReturnStatus>,
        /// Keep refreshing until interrupted.
        #[arg(long)]
        watch: bool,
    },
    /// Move an expected return to a new status.
    SetStatus { id: String, status: ReturnStatus },
}

pub async fn run(ctx: &CliContext, command: ReturnsCommand) -> Result<()> {
    match command {
        ReturnsCommand::List { status, watch: true } => watch(ctx, status).await,
        ReturnsCommand::List { status, watch: false } => {
            let page = ctx
                .api
                .expected_returns(status)
                .await
                .context("failed to load expected returns")?;
            print_page(ctx, &page)
        }
        ReturnsCommand::SetStatus { id, status } => {
            let expected = find_expected_return(&ctx.api, &id).await?;
            let updated = change_return_status(&ctx.api, &expected, status, Utc::now())
                .await
                .with_context(|| format!("cannot move return {id} to {status}"))?;
            info!(id = %updated.id, from = %expected.status, to = %updated.status, "Return status changed");

            if ctx.json() {
                return ctx.print_json(&updated);
            }
            println!("{}", table::expected_returns(&[updated]));
            Ok(())
        }
    }
}

async fn watch(ctx: &CliContext, status: Option<ReturnStatus>) -> Result<()> {
    ctx.cancel_on_ctrl_c();

    let api = ctx.api.clone();
    let handle = Poller::new("returns", ctx.config.polling.returns())
        .with_parent(&ctx.shutdown)
        .spawn(move || {
            let api = api.clone();
            async move {
                api.expected_returns(status).await.unwrap_or_else(|err| {
                    TracingNotifier.fetch_failed("expected-returns", &err);
                    ReturnsPage::default()
                })
            }
        });

    super::follow(ctx, handle, |page| print_page(ctx, page)).await
}

fn print_page(ctx: &CliContext, page: &ReturnsPage) -> Result<()> {
    if ctx.json() {
        return ctx.print_json(page);
    }
    let stats = &page.stats;
    println!("{}", table::expected_returns(&page.returns));
    println!(
        "{}",
        table::counters([
            ("Total", stats.total.to_string()),
            ("Pending", stats.pending.to_string()),
            ("In transit", stats.in_transit.to_string()),
            ("Received", stats.received.to_string()),
            ("Cancelled", stats.cancelled.to_string()),
        ])
    );
    Ok(())
}
