//! # CLI Commands
//!
//! ```text
//! commands/
//! ├── mod.rs         ◄─── Shared lookups and argument parsers
//! ├── dashboard.rs   ◄─── Metrics cards and series, --watch polling
//! ├── sales.rs       ◄─── List, lifecycle, status changes, create
//! ├── returns.rs     ◄─── Expected returns and their status
//! ├── products.rs    ◄─── Catalogue and SKU generation
//! ├── purchases.rs   ◄─── Purchase list and creation
//! ├── warehouses.rs  ◄─── Warehouses and stock additions
//! ├── reports.rs     ◄─── Server-side reports
//! ├── document.rs    ◄─── Invoices and receipts
//! ├── export.rs      ◄─── CSV / JSON / XLSX exports
//! ├── register.rs    ◄─── User registration
//! └── config.rs      ◄─── Config file inspection
//! ```
//!
//! The API has no single-record route for sales orders, purchases or
//! expected returns, so commands that act on one record look it up in the
//! listed collection.

pub mod config;
pub mod dashboard;
pub mod document;
pub mod export;
pub mod products;
pub mod purchases;
pub mod register;
pub mod reports;
pub mod returns;
pub mod sales;
pub mod warehouses;

use anyhow::{anyhow, Result};
use stockpile_client::{InventoryApi, PollerHandle};
use stockpile_core::{ExpectedReturn, Money, Purchase, SalesOrder};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::context::CliContext;

/// Parses a major-unit amount such as `12.50`.
pub fn parse_money(s: &str) -> Result<Money, String> {
    let amount: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not an amount"))?;
    if !amount.is_finite() {
        return Err(format!("'{s}' is not an amount"));
    }
    Ok(Money::from_major(amount))
}

/// Matches an id or a display number.
fn matches_key(id: &str, number: &str, key: &str) -> bool {
    id == key || (!number.is_empty() && number.eq_ignore_ascii_case(key))
}

pub async fn find_sales_order<A: InventoryApi + ?Sized>(api: &A, key: &str) -> Result<SalesOrder> {
    api.sales_orders()
        .await?
        .into_iter()
        .find(|o| matches_key(&o.id, &o.display_number(), key))
        .ok_or_else(|| anyhow!("no sales order with id or number '{key}'"))
}

pub async fn find_purchase<A: InventoryApi + ?Sized>(api: &A, key: &str) -> Result<Purchase> {
    api.purchases()
        .await?
        .into_iter()
        .find(|p| matches_key(&p.id, &p.purchase_number, key))
        .ok_or_else(|| anyhow!("no purchase with id or number '{key}'"))
}

pub async fn find_expected_return<A: InventoryApi + ?Sized>(api: &A, key: &str) -> Result<ExpectedReturn> {
    api.expected_returns(None)
        .await?
        .returns
        .into_iter()
        .find(|r| r.id == key)
        .ok_or_else(|| anyhow!("no expected return with id '{key}'"))
}

/// One message per line typed on stdin, read on a detached thread.
fn enter_presses() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            if line.is_err() || tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Prints every snapshot `handle` publishes until Ctrl-C.
///
/// Pressing Enter fetches immediately instead of waiting for the next tick.
pub async fn follow<T, F>(ctx: &CliContext, handle: PollerHandle<T>, mut print: F) -> Result<()>
where
    T: Clone,
    F: FnMut(&T) -> Result<()>,
{
    info!("Press Enter to refresh now, Ctrl-C to stop");
    let mut snapshots = handle.subscribe();
    let mut enter = enter_presses();
    let mut stdin_open = true;

    let outcome = loop {
        tokio::select! {
            _ = ctx.shutdown.cancelled() => break Ok(()),
            pressed = enter.recv(), if stdin_open => match pressed {
                Some(()) => {
                    debug!("Manual refresh");
                    handle.refresh_now();
                }
                // stdin closed: keep polling on the timer only.
                None => stdin_open = false,
            },
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let latest = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    if let Err(err) = print(&snapshot) {
                        break Err(err);
                    }
                }
            }
        }
    };

    handle.shutdown().await;
    outcome
}
