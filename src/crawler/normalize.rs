use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

use super::extract::RawRow;
use crate::companies::CompanyDirectory;
use crate::models::Transaction;

pub(crate) const DEBIT_MARKER: &str = "D";

/// Report column headings as served by the portal.
mod col {
    pub(super) const ORDER_NO: &str = "Order No";
    pub(super) const DOC_NO: &str = "Doc. No";
    pub(super) const DATE: &str = "Tran. Date";
    pub(super) const TIME: &str = "Tran. Time";
    pub(super) const TT_NO: &str = "TTNO";
    pub(super) const MATERIAL: &str = "Material";
    pub(super) const MATERIAL_NAME: &str = "Material Name";
    pub(super) const BILL_QTY: &str = "Bill Qty";
    pub(super) const UNIT: &str = "Unit";
    pub(super) const BILL_AMT: &str = "Bill Amt";
    pub(super) const DB_CR: &str = "Db/Cr";
    pub(super) const COMP: &str = "Comp";
    pub(super) const DOC_TYPE: &str = "Doc Type";
    pub(super) const PLANT: &str = "Plant";
    pub(super) const CCA: &str = "CCA";
    pub(super) const SOLD_TO: &str = "Sold to Party";
    pub(super) const SHIP_TO: &str = "Ship to Party";
}

/// Converts raw table rows into typed transactions.
///
/// Only debit rows are kept. A row missing a required column or carrying an
/// unparseable required numeric is dropped with a warning; one bad row never
/// aborts the batch.
pub(crate) fn normalize(rows: &[RawRow], companies: &CompanyDirectory) -> Vec<Transaction> {
    rows.iter()
        .filter(|row| row.get(col::DB_CR).map(String::as_str) == Some(DEBIT_MARKER))
        .filter_map(|row| match build_transaction(row, companies) {
            Ok(txn) => Some(txn),
            Err(err) => {
                warn!(error = ?err, "Dropping malformed report row");
                None
            }
        })
        .collect()
}

fn build_transaction(row: &RawRow, companies: &CompanyDirectory) -> Result<Transaction> {
    let ship_to_party = int_field(row, col::SHIP_TO)?;
    Ok(Transaction {
        order_no: int_field(row, col::ORDER_NO)?,
        doc_no: int_field(row, col::DOC_NO)?,
        transaction_date: text_field(row, col::DATE)?,
        transaction_time: text_field(row, col::TIME)?,
        tt_no: text_field(row, col::TT_NO)?,
        material: int_field(row, col::MATERIAL)?,
        material_name: text_field(row, col::MATERIAL_NAME)?,
        bill_qty: decimal_field(row, col::BILL_QTY)?,
        unit: text_field(row, col::UNIT)?,
        bill_amt: decimal_field(row, col::BILL_AMT)?,
        db_cr: text_field(row, col::DB_CR)?,
        // The portal sometimes leaves Comp blank; it is not a dedup or
        // reporting key, so it defaults rather than dropping the row.
        comp: int_field(row, col::COMP).unwrap_or(0),
        doc_type: text_field(row, col::DOC_TYPE)?,
        plant: int_field(row, col::PLANT)?,
        cca: text_field(row, col::CCA)?,
        sold_to_party: int_field(row, col::SOLD_TO)?,
        ship_to_party,
        company_name: companies.name_for(ship_to_party),
    })
}

fn text_field(row: &RawRow, key: &str) -> Result<String> {
    row.get(key)
        .cloned()
        .with_context(|| format!("missing column `{key}`"))
}

fn int_field(row: &RawRow, key: &str) -> Result<i64> {
    let raw = text_field(row, key)?;
    clean_numeric(&raw)
        .parse()
        .with_context(|| format!("column `{key}`: `{raw}` is not an integer"))
}

fn decimal_field(row: &RawRow, key: &str) -> Result<Decimal> {
    let raw = text_field(row, key)?;
    Decimal::from_str(&clean_numeric(&raw))
        .with_context(|| format!("column `{key}`: `{raw}` is not a number"))
}

/// Strips grouping separators and stray whitespace from a numeric cell.
fn clean_numeric(raw: &str) -> String {
    raw.replace([',', ' '], "").trim().to_string()
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
