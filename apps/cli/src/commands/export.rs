//! `stockpile export <entity>`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use stockpile_client::export::{export_records, ExportEntity, ExportFormat, Tabular};
use stockpile_client::InventoryApi;

use crate::context::CliContext;

#[derive(Args)]
pub struct ExportArgs {
    /// sales, purchases, products, warehouses or expected-returns.
    entity: ExportEntity,

    /// csv, json or xlsx.
    #[arg(long, default_value = "csv")]
    format: ExportFormat,

    /// Output directory; defaults to documents.output_dir.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn write<T: Tabular>(entity: ExportEntity, records: &[T], format: ExportFormat, dir: &Path) -> Result<(PathBuf, usize)> {
    let path = export_records(entity, records, format, dir)
        .with_context(|| format!("failed to export {entity}"))?;
    Ok((path, records.len()))
}

pub async fn run(ctx: &CliContext, args: ExportArgs) -> Result<()> {
    let dir = args
        .out
        .unwrap_or_else(|| ctx.config.documents.output_dir.clone());
    let (entity, format) = (args.entity, args.format);
    let api = &ctx.api;

    let (path, count) = match entity {
        ExportEntity::Sales => write(entity, &api.sales_orders().await?, format, &dir)?,
        ExportEntity::Purchases => write(entity, &api.purchases().await?, format, &dir)?,
        ExportEntity::Products => write(entity, &api.products().await?, format, &dir)?,
        ExportEntity::Warehouses => write(entity, &api.warehouses().await?, format, &dir)?,
        ExportEntity::ExpectedReturns => {
            write(entity, &api.expected_returns(None).await?.returns, format, &dir)?
        }
    };

    if ctx.json() {
        return ctx.print_json(&json!({ "path": path, "records": count }));
    }
    println!("{count} {entity} written to {}", path.display());
    Ok(())
}
