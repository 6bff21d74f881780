use anyhow::{anyhow, Result};
use rust_decimal::prelude::ToPrimitive;
use std::io::Cursor;

use crate::models::{SummaryRow, Transaction};

const TRANSACTION_COLUMNS: [&str; 18] = [
    "order_no",
    "doc_no",
    "transaction_date",
    "transaction_time",
    "tt_no",
    "material",
    "material_name",
    "bill_qty",
    "unit",
    "bill_amt",
    "db_cr",
    "comp",
    "doc_type",
    "plant",
    "cca",
    "sold_to_party",
    "ship_to_party",
    "company_name",
];

/// Builds the attachment workbook: a `Transactions` sheet with the day's
/// benzene records and an `Aggregated` sheet mirroring the e-mail table.
pub(super) fn render(
    records: &[Transaction],
    summary: &[SummaryRow],
    month_label: &str,
) -> Result<Vec<u8>> {
    let mut book = umya_spreadsheet::new_file();

    {
        let sheet = book
            .get_sheet_mut(&0)
            .ok_or_else(|| anyhow!("workbook has no default sheet"))?;
        sheet.set_name("Transactions");

        for (idx, header) in TRANSACTION_COLUMNS.iter().enumerate() {
            sheet
                .get_cell_mut(((idx + 1) as u32, 1u32))
                .set_value(*header);
        }
        for (row_idx, txn) in records.iter().enumerate() {
            let row = (row_idx + 2) as u32;
            sheet.get_cell_mut((1u32, row)).set_value_number(txn.order_no as f64);
            sheet.get_cell_mut((2u32, row)).set_value_number(txn.doc_no as f64);
            sheet.get_cell_mut((3u32, row)).set_value(txn.transaction_date.clone());
            sheet.get_cell_mut((4u32, row)).set_value(txn.transaction_time.clone());
            sheet.get_cell_mut((5u32, row)).set_value(txn.tt_no.clone());
            sheet.get_cell_mut((6u32, row)).set_value_number(txn.material as f64);
            sheet.get_cell_mut((7u32, row)).set_value(txn.material_name.clone());
            sheet
                .get_cell_mut((8u32, row))
                .set_value_number(txn.bill_qty.to_f64().unwrap_or_default());
            sheet.get_cell_mut((9u32, row)).set_value(txn.unit.clone());
            sheet
                .get_cell_mut((10u32, row))
                .set_value_number(txn.bill_amt.to_f64().unwrap_or_default());
            sheet.get_cell_mut((11u32, row)).set_value(txn.db_cr.clone());
            sheet.get_cell_mut((12u32, row)).set_value_number(txn.comp as f64);
            sheet.get_cell_mut((13u32, row)).set_value(txn.doc_type.clone());
            sheet.get_cell_mut((14u32, row)).set_value_number(txn.plant as f64);
            sheet.get_cell_mut((15u32, row)).set_value(txn.cca.clone());
            sheet
                .get_cell_mut((16u32, row))
                .set_value_number(txn.sold_to_party as f64);
            sheet
                .get_cell_mut((17u32, row))
                .set_value_number(txn.ship_to_party as f64);
            sheet
                .get_cell_mut((18u32, row))
                .set_value(txn.company_name.clone().unwrap_or_default());
        }
    }

    {
        let sheet = book
            .new_sheet("Aggregated")
            .map_err(|err| anyhow!("failed to add aggregated sheet: {err}"))?;

        sheet.add_merge_cells("A1:C1");
        sheet.add_merge_cells("A2:C2");
        sheet.get_cell_mut("A1").set_value(month_label);
        sheet.get_cell_mut("A2").set_value("Benzene");

        sheet.get_cell_mut("A3").set_value("Name");
        sheet.get_cell_mut("B3").set_value("DAILY");
        sheet.get_cell_mut("C3").set_value("MTD");

        for (idx, row) in summary.iter().enumerate() {
            let sheet_row = (idx + 4) as u32;
            sheet.get_cell_mut((1u32, sheet_row)).set_value(row.name.clone());
            sheet
                .get_cell_mut((2u32, sheet_row))
                .set_value_number(row.daily.to_f64().unwrap_or_default());
            sheet
                .get_cell_mut((3u32, sheet_row))
                .set_value_number(row.mtd.to_f64().unwrap_or_default());
        }

        // Bold the trailing Total row
        if !summary.is_empty() {
            let total_row = (summary.len() + 3) as u32;
            for column in 1u32..=3 {
                sheet
                    .get_cell_mut((column, total_row))
                    .get_style_mut()
                    .get_font_mut()
                    .set_bold(true);
            }
        }
    }

    let mut cursor = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut cursor)
        .map_err(|err| anyhow!("failed to serialize workbook: {err:?}"))?;
    Ok(cursor.into_inner())
}
