//! PDF output.
//!
//! The rich layout puts the whole document on one A4 page with a ruled
//! line-item table. When it cannot be used (too many rows, or the renderer
//! fails) the plain layout prints the same lines as monospaced text over as
//! many pages as needed.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use stockpile_core::document::{paginate, DocumentLayout, PLAIN_LINES_PER_PAGE};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const ROW_HEIGHT: f32 = 7.0;
const PLAIN_LINE_HEIGHT: f32 = 5.0;

/// Column x offsets of the line-item table: #, description, SKU, qty, unit, amount.
const COLUMNS: [f32; 6] = [20.0, 30.0, 95.0, 122.0, 137.0, 165.0];

/// Which PDF layout produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfLayout {
    Rich,
    Plain,
}

fn pdf_error(err: impl std::fmt::Debug) -> ClientError {
    ClientError::Pdf(format!("{err:?}"))
}

/// Renders the rich layout, falling back to the plain one.
pub fn render(layout: &DocumentLayout) -> ClientResult<(Vec<u8>, PdfLayout)> {
    let rich = layout
        .check_rich_fit()
        .map_err(|e| ClientError::Pdf(e.to_string()))
        .and_then(|()| render_rich(layout));

    match rich {
        Ok(bytes) => Ok((bytes, PdfLayout::Rich)),
        Err(err) => {
            warn!(
                number = %layout.document_number,
                error = %err,
                "Rich PDF layout failed, using plain layout"
            );
            render_plain(layout).map(|bytes| (bytes, PdfLayout::Plain))
        }
    }
}

// =============================================================================
// Rich Layout
// =============================================================================

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> ClientResult<Self> {
        Ok(Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?,
        })
    }
}

/// Writes top-down: `y` is measured from the top edge of the page.
struct Cursor<'a> {
    layer: PdfLayerReference,
    fonts: &'a Fonts,
    y: f32,
}

impl Cursor<'_> {
    fn text(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.fonts.bold } else { &self.fonts.regular };
        self.layer
            .use_text(text, size, Mm(x), Mm(PAGE_HEIGHT - self.y), font);
    }

    fn rule(&self, from: f32, to: f32) {
        let y = Mm(PAGE_HEIGHT - self.y);
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None)));
        self.layer.set_outline_thickness(0.4);
        self.layer.add_line(Line {
            points: vec![(Point::new(Mm(from), y), false), (Point::new(Mm(to), y), false)],
            is_closed: false,
        });
    }

    fn advance(&mut self, mm: f32) {
        self.y += mm;
    }
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(max.saturating_sub(3)).collect();
        clipped.push_str("...");
        clipped
    }
}

fn render_rich(layout: &DocumentLayout) -> ClientResult<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        layout.document_number.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let fonts = Fonts::load(&doc)?;
    let mut cur = Cursor {
        layer: doc.get_page(page).get_layer(layer),
        fonts: &fonts,
        y: MARGIN,
    };
    let right = PAGE_WIDTH - MARGIN;

    // Letterhead
    cur.text(&layout.company.name, 16.0, MARGIN, true);
    cur.advance(6.0);
    for line in &layout.company.lines {
        cur.text(line, 9.0, MARGIN, false);
        cur.advance(4.5);
    }
    cur.advance(4.0);
    cur.text(&layout.title, 14.0, MARGIN, true);
    cur.advance(3.0);
    cur.rule(MARGIN, right);
    cur.advance(7.0);

    // Document info (right) beside the counterparty (left)
    let block_top = cur.y;
    for (label, value) in layout.info_rows() {
        cur.text(&label, 9.0, 120.0, true);
        cur.text(&value, 9.0, 150.0, false);
        cur.advance(5.0);
    }
    let info_bottom = cur.y;

    cur.y = block_top;
    let party = &layout.counterparty;
    cur.text(&format!("{}:", party.label), 10.0, MARGIN, true);
    cur.advance(5.0);
    for line in [&party.name, &party.address, &party.phone, &party.email] {
        cur.text(&clip(line, 48), 9.0, MARGIN, false);
        cur.advance(5.0);
    }
    cur.y = cur.y.max(info_bottom) + 4.0;

    // Line items
    let headers = ["#", "Description", "SKU", "Qty", "Unit Price", "Amount"];
    for (header, x) in headers.iter().zip(COLUMNS) {
        cur.text(header, 9.0, x, true);
    }
    cur.advance(2.0);
    cur.rule(MARGIN, right);
    cur.advance(ROW_HEIGHT - 2.0);
    for line in &layout.lines {
        let cells = [
            line.index.to_string(),
            clip(&line.description, 34),
            clip(&line.sku, 14),
            line.quantity.to_string(),
            line.unit_price.to_string(),
            layout.money(line.amount),
        ];
        for (cell, x) in cells.iter().zip(COLUMNS) {
            cur.text(cell, 9.0, x, false);
        }
        cur.advance(ROW_HEIGHT);
    }
    cur.advance(-ROW_HEIGHT + 2.0);
    cur.rule(MARGIN, right);
    cur.advance(7.0);

    // Totals
    let rows = layout.total_rows();
    let last = rows.len().saturating_sub(1);
    for (i, (label, value)) in rows.iter().enumerate() {
        cur.text(label, 10.0, 130.0, i == last);
        cur.text(value, 10.0, 160.0, i == last);
        cur.advance(6.0);
    }

    if let Some(paid_on) = layout.payment_confirmation {
        cur.advance(3.0);
        cur.text("PAYMENT CONFIRMED", 11.0, MARGIN, true);
        cur.advance(5.0);
        let date = paid_on
            .map(stockpile_core::document::display_date)
            .unwrap_or_else(|| "N/A".to_string());
        cur.text(&format!("Payment Date: {date}"), 9.0, MARGIN, false);
        cur.advance(5.0);
    }

    if let Some(notes) = &layout.notes {
        cur.advance(3.0);
        cur.text("Notes:", 10.0, MARGIN, true);
        cur.advance(5.0);
        cur.text(&clip(notes, 95), 9.0, MARGIN, false);
    }

    // Footer, anchored to the bottom margin
    cur.y = PAGE_HEIGHT - MARGIN - 5.0 * layout.company.footer.len() as f32;
    for line in &layout.company.footer {
        cur.text(line, 9.0, MARGIN, false);
        cur.advance(5.0);
    }
    cur.text(&layout.generated_line(), 8.0, MARGIN, false);

    let bytes = doc.save_to_bytes().map_err(pdf_error)?;
    debug!(number = %layout.document_number, bytes = bytes.len(), "Rich PDF rendered");
    Ok(bytes)
}

// =============================================================================
// Plain Layout
// =============================================================================

fn render_plain(layout: &DocumentLayout) -> ClientResult<Vec<u8>> {
    let lines = layout.plain_lines();
    let pages = paginate(&lines, PLAIN_LINES_PER_PAGE);
    let total = pages.len();

    let (doc, first_page, first_layer) = PdfDocument::new(
        layout.document_number.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let font = doc.add_builtin_font(BuiltinFont::Courier).map_err(pdf_error)?;

    for (number, page_lines) in pages.iter().enumerate() {
        let (page, layer) = if number == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1")
        };
        let layer = doc.get_page(page).get_layer(layer);

        let mut y = PAGE_HEIGHT - MARGIN;
        for line in page_lines.iter() {
            layer.use_text(line.as_str(), 10.0, Mm(MARGIN), Mm(y), &font);
            y -= PLAIN_LINE_HEIGHT;
        }
        layer.use_text(
            format!("Page {} of {}", number + 1, total),
            8.0,
            Mm(PAGE_WIDTH - MARGIN - 25.0),
            Mm(MARGIN / 2.0),
            &font,
        );
    }

    let bytes = doc.save_to_bytes().map_err(pdf_error)?;
    debug!(number = %layout.document_number, pages = total, bytes = bytes.len(), "Plain PDF rendered");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use stockpile_core::document::{DocumentKind, LayoutContext, RICH_TABLE_CAPACITY};
    use stockpile_core::SalesOrder;

    fn layout(items: usize) -> DocumentLayout {
        let items: Vec<_> = (0..items)
            .map(|i| json!({ "productName": format!("Item {i}"), "quantity": 1, "unitPrice": 3.0 }))
            .collect();
        let order: SalesOrder = serde_json::from_value(json!({
            "_id": "abc123",
            "orderNumber": "SO-0042",
            "status": "delivered",
            "customerInfo": { "name": "Bilal" },
            "items": items,
        }))
        .unwrap();
        let ctx = LayoutContext {
            kind: DocumentKind::Receipt,
            company: Default::default(),
            currency: "PKR".into(),
            generated_at: Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap(),
        };
        DocumentLayout::for_sales_order(&order, &ctx)
    }

    #[test]
    fn test_short_document_uses_rich_layout() {
        let (bytes, used) = render(&layout(3)).unwrap();
        assert_eq!(used, PdfLayout::Rich);
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_document_falls_back_to_plain() {
        let (bytes, used) = render(&layout(RICH_TABLE_CAPACITY * 5)).unwrap();
        assert_eq!(used, PdfLayout::Plain);
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdefghij", 6), "abc...");
    }
}
