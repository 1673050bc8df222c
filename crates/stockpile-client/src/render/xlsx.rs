//! XLSX output: a "Document Info" sheet and an "Items" sheet.

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use stockpile_core::document::{display_date, DocumentLayout};
use stockpile_core::Money;

use crate::error::ClientResult;

/// Money as a major-unit number for spreadsheet cells.
pub(crate) fn money_cell(amount: Money) -> f64 {
    amount.as_major()
}

pub fn render(layout: &DocumentLayout) -> ClientResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let amount = Format::new().set_num_format("#,##0.00");

    write_info(&mut workbook, layout, &bold)?;
    write_items(&mut workbook, layout, &bold, &amount)?;

    Ok(workbook.save_to_buffer()?)
}

fn write_info(workbook: &mut Workbook, layout: &DocumentLayout, bold: &Format) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Document Info")?;
    sheet.set_column_width(0, 22)?;
    sheet.set_column_width(1, 40)?;

    let party = &layout.counterparty;
    let mut rows: Vec<(String, String)> = vec![
        ("Company".into(), layout.company.name.clone()),
        ("Document".into(), layout.title.clone()),
        ("Document Number".into(), layout.document_number.clone()),
        ("Document Date".into(), display_date(layout.generated_at.date_naive())),
        ("Order Number".into(), layout.order_number.clone()),
        (
            "Order Date".into(),
            layout
                .order_date
                .map(display_date)
                .unwrap_or_else(|| "N/A".into()),
        ),
        (party.label.to_string(), party.name.clone()),
        ("Address".into(), party.address.clone()),
        ("Phone".into(), party.phone.clone()),
        ("Email".into(), party.email.clone()),
        ("Payment Method".into(), layout.payment_method.clone()),
        ("Status".into(), layout.payment_status.clone()),
        ("Currency".into(), layout.currency.clone()),
    ];
    if let Some(notes) = &layout.notes {
        rows.push(("Notes".into(), notes.clone()));
    }
    rows.push(("Generated".into(), layout.generated_line()));

    for (row, (label, value)) in rows.iter().enumerate() {
        let row = row as u32;
        sheet.write_string_with_format(row, 0, label, bold)?;
        sheet.write_string(row, 1, value)?;
    }
    Ok(())
}

fn write_items(workbook: &mut Workbook, layout: &DocumentLayout, bold: &Format, amount: &Format) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Items")?;
    sheet.set_column_width(1, 36)?;
    sheet.set_column_width(2, 16)?;

    for (col, header) in ["#", "Description", "SKU", "Quantity", "Unit Price", "Amount"]
        .iter()
        .enumerate()
    {
        sheet.write_string_with_format(0, col as u16, *header, bold)?;
    }

    let mut row = 1u32;
    for line in &layout.lines {
        sheet.write_number(row, 0, line.index as f64)?;
        sheet.write_string(row, 1, &line.description)?;
        sheet.write_string(row, 2, &line.sku)?;
        sheet.write_number(row, 3, line.quantity as f64)?;
        sheet.write_number_with_format(row, 4, money_cell(line.unit_price), amount)?;
        sheet.write_number_with_format(row, 5, money_cell(line.amount), amount)?;
        row += 1;
    }

    row += 1;
    let totals = layout.totals;
    let mut total_rows = vec![("Subtotal", totals.subtotal)];
    if let Some(tax) = totals.tax {
        total_rows.push(("Tax", tax));
    }
    if let Some(discount) = totals.discount {
        total_rows.push(("Discount", -discount));
    }
    total_rows.push(("Total", totals.total));

    for (label, value) in total_rows {
        sheet.write_string_with_format(row, 4, label, bold)?;
        sheet.write_number_with_format(row, 5, money_cell(value), amount)?;
        row += 1;
    }
    Ok(())
}
