//! # Document Rendering
//!
//! Writes a [`DocumentLayout`] as PDF or XLSX.
//!
//! ```text
//!  Purchase / SalesOrder
//!          │  DocumentLayout::for_purchase / for_sales_order
//!          ▼
//!    DocumentLayout ──► pdf::render   rich page, plain pages on failure
//!                   └─► xlsx::render  "Document Info" + "Items" sheets
//!          │
//!          ▼
//!  {type}_{number}_{YYYY-MM-DDTHH-MM-SS}.{pdf|xlsx}
//! ```

pub mod pdf;
pub mod xlsx;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use stockpile_core::document::{DocumentFormat, DocumentKind, DocumentLayout, LayoutContext};
use stockpile_core::{Purchase, SalesOrder};
use tracing::info;

use crate::config::DocumentSettings;
use crate::error::ClientResult;

pub use pdf::PdfLayout;

/// What a document is generated from.
#[derive(Debug, Clone, Copy)]
pub enum DocumentSource<'a> {
    Purchase(&'a Purchase),
    SalesOrder(&'a SalesOrder),
}

impl DocumentSource<'_> {
    pub fn layout(&self, kind: DocumentKind, settings: &DocumentSettings, now: DateTime<Utc>) -> DocumentLayout {
        let ctx = LayoutContext {
            kind,
            company: settings.company_header(),
            currency: settings.currency.clone(),
            generated_at: now,
        };
        match self {
            DocumentSource::Purchase(purchase) => DocumentLayout::for_purchase(purchase, &ctx),
            DocumentSource::SalesOrder(order) => DocumentLayout::for_sales_order(order, &ctx),
        }
    }
}

/// A rendered document held in memory.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub filename: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
    /// Which PDF layout was used; `None` for spreadsheets.
    pub pdf_layout: Option<PdfLayout>,
}

/// Renders `layout` in `format`.
pub fn render(layout: &DocumentLayout, format: DocumentFormat) -> ClientResult<RenderedDocument> {
    let (bytes, pdf_layout) = match format {
        DocumentFormat::Pdf => {
            let (bytes, used) = pdf::render(layout)?;
            (bytes, Some(used))
        }
        DocumentFormat::Xlsx => (xlsx::render(layout)?, None),
    };
    Ok(RenderedDocument {
        filename: layout.filename(format),
        format,
        bytes,
        pdf_layout,
    })
}

/// Renders `layout` and writes it into `dir`, returning the file path.
pub fn write_document(layout: &DocumentLayout, format: DocumentFormat, dir: &Path) -> ClientResult<PathBuf> {
    let rendered = render(layout, format)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&rendered.filename);
    std::fs::write(&path, &rendered.bytes)?;
    info!(
        path = %path.display(),
        kind = %layout.kind,
        number = %layout.document_number,
        bytes = rendered.bytes.len(),
        "Document written"
    );
    Ok(path)
}
