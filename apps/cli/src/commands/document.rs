//! `stockpile document <purchase|sales> <id>`

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, ValueEnum};
use serde_json::json;
use stockpile_client::render::{write_document, DocumentSource};
use stockpile_core::document::{DocumentFormat, DocumentKind};

use super::{find_purchase, find_sales_order};
use crate::context::CliContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    Purchase,
    Sales,
}

#[derive(Args)]
pub struct DocumentArgs {
    source: SourceKind,

    /// Record id or number.
    id: String,

    /// invoice or receipt.
    #[arg(long, default_value = "invoice")]
    kind: DocumentKind,

    /// pdf or xlsx.
    #[arg(long, default_value = "pdf")]
    format: DocumentFormat,

    /// Output directory; defaults to documents.output_dir.
    #[arg(long)]
    out: Option<PathBuf>,
}

pub async fn run(ctx: &CliContext, args: DocumentArgs) -> Result<()> {
    let settings = &ctx.config.documents;
    let dir = args.out.unwrap_or_else(|| settings.output_dir.clone());
    let now = Utc::now();

    let layout = match args.source {
        SourceKind::Purchase => {
            let purchase = find_purchase(&ctx.api, &args.id).await?;
            DocumentSource::Purchase(&purchase).layout(args.kind, settings, now)
        }
        SourceKind::Sales => {
            let order = find_sales_order(&ctx.api, &args.id).await?;
            DocumentSource::SalesOrder(&order).layout(args.kind, settings, now)
        }
    };

    let path = write_document(&layout, args.format, &dir)
        .with_context(|| format!("failed to write {} {}", args.kind, layout.document_number))?;

    if ctx.json() {
        return ctx.print_json(&json!({
            "path": path,
            "documentNumber": layout.document_number,
            "kind": args.kind,
            "format": args.format,
        }));
    }
    println!("{}", path.display());
    Ok(())
}
