//! `stockpile reports <kind>`

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Args;
use stockpile_client::{DateRange, InventoryApi, ReportKind};

use crate::context::CliContext;
use crate::table;

#[derive(Args)]
pub struct ReportArgs {
    /// dashboard-summary, dashboard-main, weekly-sales, monthly-inventory,
    /// supplier-performance or return-analysis.
    kind: ReportKind,

    /// Trailing window in days for ranged reports.
    #[arg(long, conflicts_with_all = ["from", "to"])]
    days: Option<u32>,

    /// Range start, YYYY-MM-DD.
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,

    /// Range end, YYYY-MM-DD.
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
}

impl ReportArgs {
    /// The window sent with ranged reports; `None` for the others.
    fn range(&self, today: NaiveDate, default_days: u32) -> Result<Option<DateRange>> {
        if !self.kind.accepts_range() {
            return Ok(None);
        }
        match (self.from, self.to) {
            (Some(start), Some(end)) => {
                if start > end {
                    bail!("--from {start} is after --to {end}");
                }
                Ok(Some(DateRange { start, end }))
            }
            _ => Ok(Some(DateRange::trailing(today, self.days.unwrap_or(default_days)))),
        }
    }
}

pub async fn run(ctx: &CliContext, args: ReportArgs) -> Result<()> {
    let today = Local::now().date_naive();
    let range = args.range(today, ctx.config.reports.trailing_days)?;
    let body = ctx
        .api
        .report(args.kind, range)
        .await
        .with_context(|| format!("failed to load the {} report", args.kind))?;

    if ctx.json() {
        return ctx.print_json(&body);
    }

    match range {
        Some(range) => println!("{} ({} to {})", args.kind, range.start, range.end),
        None => println!("{}", args.kind),
    }
    println!("{}", table::json(&body));
    for (name, section) in table::json_sections(&body) {
        println!("\n{name}");
        println!("{section}");
    }
    Ok(())
}
