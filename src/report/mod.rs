mod html;
mod workbook;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::db::Database;
use crate::models::{MtdAdjustment, SummaryRow, Transaction};

/// Only this material family goes into the daily report.
pub(crate) const MATERIAL_KEYWORD: &str = "BENZENE";

pub(crate) const TOTAL_ROW_NAME: &str = "Total";

/// Everything the mailer needs for one daily report.
pub(crate) struct Report {
    pub(crate) html: String,
    pub(crate) workbook: Vec<u8>,
    pub(crate) summary: Vec<SummaryRow>,
    pub(crate) date_label: String,
}

/// Builds the daily report from the freshly scraped batch plus stored
/// month-to-date figures and any operator adjustments for the month.
pub(crate) fn build(db: &Database, records: &[Transaction], today: NaiveDate) -> Result<Report> {
    let date_label = portal_date(today);
    let month_start = portal_date(today.with_day(1).unwrap_or(today));

    let mtd = db
        .get_mtd_by_company(&month_start, &date_label)
        .context("Failed to query month-to-date figures")?;
    let adjustments = db
        .get_adjustments(today.year(), today.month())
        .context("Failed to query MTD adjustments")?;

    let benzene: Vec<Transaction> = records
        .iter()
        .filter(|t| t.material_name.contains(MATERIAL_KEYWORD))
        .cloned()
        .collect();

    let summary = aggregate(&benzene, &mtd, &adjustments, today);
    let month_label = today.format("%B %Y").to_string();
    let html = html::render(&month_label, &summary);
    let workbook = workbook::render(&benzene, &summary, &month_label)
        .context("Failed to build report workbook")?;

    Ok(Report {
        html,
        workbook,
        summary,
        date_label,
    })
}

/// Per-company DAILY (today's scraped quantities) and MTD (stored sum for
/// the month plus any adjustment), in first-seen order, followed by a Total
/// row. Only companies appearing in today's batch get a row.
pub(crate) fn aggregate(
    records: &[Transaction],
    mtd: &[(String, Decimal)],
    adjustments: &[MtdAdjustment],
    today: NaiveDate,
) -> Vec<SummaryRow> {
    let today_str = portal_date(today);
    let mut rows: Vec<SummaryRow> = Vec::new();

    for txn in records.iter().filter(|t| t.transaction_date == today_str) {
        let name = txn.company_label();
        let pos = match rows.iter().position(|r| r.name == name) {
            Some(pos) => pos,
            None => {
                let base = mtd
                    .iter()
                    .find(|(company, _)| company == name)
                    .map(|(_, qty)| *qty)
                    .unwrap_or_default();
                let adjustment = adjustments
                    .iter()
                    .find(|a| a.company_name == name)
                    .map(|a| a.qty)
                    .unwrap_or_default();
                rows.push(SummaryRow {
                    name: name.to_string(),
                    daily: Decimal::ZERO,
                    mtd: base + adjustment,
                });
                rows.len() - 1
            }
        };
        rows[pos].daily += txn.bill_qty;
    }

    let total = SummaryRow {
        name: TOTAL_ROW_NAME.to_string(),
        daily: rows.iter().map(|r| r.daily).sum(),
        mtd: rows.iter().map(|r| r.mtd).sum(),
    };
    rows.push(total);
    rows
}

/// Dates as the portal prints them: dd.MM.yyyy.
pub(crate) fn portal_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

#[cfg(test)]
mod tests;
