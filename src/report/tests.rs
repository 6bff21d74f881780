#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn txn(order_no: i64, date: &str, company: Option<&str>, qty: Decimal) -> Transaction {
    Transaction {
        order_no,
        doc_no: 9100042,
        transaction_date: date.into(),
        transaction_time: "10:15:00".into(),
        tt_no: format!("TT-{order_no}"),
        material: 110203,
        material_name: "BENZENE BULK".into(),
        bill_qty: qty,
        unit: "MT".into(),
        bill_amt: qty * dec!(76800),
        db_cr: "D".into(),
        comp: 1000,
        doc_type: "ZF2".into(),
        plant: 1411,
        cca: "WR01".into(),
        sold_to_party: 4000068001,
        ship_to_party: 4000068001,
        company_name: company.map(Into::into),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
}

// ── aggregate ─────────────────────────────────────────────────

#[test]
fn test_aggregate_sums_daily_per_company() {
    let records = vec![
        txn(1, "07.08.2026", Some("KUTCH"), dec!(10.5)),
        txn(2, "07.08.2026", Some("KUTCH"), dec!(4.25)),
        txn(3, "07.08.2026", Some("CHEMIE"), dec!(2.5)),
    ];
    let rows = aggregate(&records, &[], &[], today());
    assert_eq!(rows.len(), 3); // KUTCH, CHEMIE, Total
    assert_eq!(rows[0].name, "KUTCH");
    assert_eq!(rows[0].daily, dec!(14.75));
    assert_eq!(rows[1].name, "CHEMIE");
    assert_eq!(rows[1].daily, dec!(2.5));
}

#[test]
fn test_aggregate_ignores_other_dates() {
    let records = vec![
        txn(1, "07.08.2026", Some("KUTCH"), dec!(10.5)),
        txn(2, "06.08.2026", Some("KUTCH"), dec!(99.0)),
    ];
    let rows = aggregate(&records, &[], &[], today());
    assert_eq!(rows[0].daily, dec!(10.5));
}

#[test]
fn test_aggregate_pulls_mtd_for_active_companies() {
    let records = vec![txn(1, "07.08.2026", Some("KUTCH"), dec!(10.5))];
    let mtd = vec![("KUTCH".to_string(), dec!(140.25)), ("CHEMIE".to_string(), dec!(77.0))];
    let rows = aggregate(&records, &mtd, &[], today());
    // CHEMIE had no activity today, so it gets no row
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "KUTCH");
    assert_eq!(rows[0].mtd, dec!(140.25));
}

#[test]
fn test_aggregate_applies_adjustment() {
    let records = vec![txn(1, "07.08.2026", Some("KUTCH"), dec!(10.5))];
    let mtd = vec![("KUTCH".to_string(), dec!(100.0))];
    let adjustments = vec![MtdAdjustment {
        year: 2026,
        month: 8,
        company_name: "KUTCH".into(),
        qty: dec!(452.15),
        note: String::new(),
    }];
    let rows = aggregate(&records, &mtd, &adjustments, today());
    assert_eq!(rows[0].mtd, dec!(552.15));
}

#[test]
fn test_aggregate_total_row() {
    let records = vec![
        txn(1, "07.08.2026", Some("KUTCH"), dec!(10.5)),
        txn(2, "07.08.2026", Some("CHEMIE"), dec!(2.5)),
    ];
    let mtd = vec![("KUTCH".to_string(), dec!(100.0)), ("CHEMIE".to_string(), dec!(50.0))];
    let rows = aggregate(&records, &mtd, &[], today());
    let total = rows.last().unwrap();
    assert_eq!(total.name, TOTAL_ROW_NAME);
    assert_eq!(total.daily, dec!(13.0));
    assert_eq!(total.mtd, dec!(150.0));
}

#[test]
fn test_aggregate_unmapped_company_grouped_as_unknown() {
    let records = vec![
        txn(1, "07.08.2026", None, dec!(1.5)),
        txn(2, "07.08.2026", None, dec!(2.0)),
    ];
    let rows = aggregate(&records, &[], &[], today());
    assert_eq!(rows[0].name, "Unknown");
    assert_eq!(rows[0].daily, dec!(3.5));
}

#[test]
fn test_aggregate_empty_batch_yields_only_total() {
    let rows = aggregate(&[], &[], &[], today());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, TOTAL_ROW_NAME);
    assert_eq!(rows[0].daily, Decimal::ZERO);
}

// ── html ──────────────────────────────────────────────────────

#[test]
fn test_html_contains_rows_and_month() {
    let rows = vec![
        SummaryRow {
            name: "KUTCH".into(),
            daily: dec!(14.75),
            mtd: dec!(140.25),
        },
        SummaryRow {
            name: TOTAL_ROW_NAME.into(),
            daily: dec!(14.75),
            mtd: dec!(140.25),
        },
    ];
    let html = html::render("August 2026", &rows);
    assert!(html.contains("August 2026 Benzene"));
    assert!(html.contains("<td>KUTCH</td>"));
    assert!(html.contains("<td>14.750</td>"));
    assert!(html.contains("<td>140.250</td>"));
}

#[test]
fn test_html_filters_all_zero_rows() {
    let rows = vec![
        SummaryRow {
            name: "IDLE".into(),
            daily: Decimal::ZERO,
            mtd: Decimal::ZERO,
        },
        SummaryRow {
            name: "KUTCH".into(),
            daily: dec!(1.5),
            mtd: Decimal::ZERO,
        },
    ];
    let html = html::render("August 2026", &rows);
    assert!(!html.contains("IDLE"));
    assert!(html.contains("KUTCH"));
}

// ── workbook ──────────────────────────────────────────────────

#[test]
fn test_workbook_is_zip_container() {
    let records = vec![txn(1, "07.08.2026", Some("KUTCH"), dec!(10.5))];
    let rows = aggregate(&records, &[], &[], today());
    let bytes = workbook::render(&records, &rows, "August 2026").unwrap();
    // XLSX is a ZIP archive
    assert!(bytes.len() > 4);
    assert_eq!(&bytes[..4], b"PK\x03\x04");
}

#[test]
fn test_workbook_empty_batch() {
    let rows = aggregate(&[], &[], &[], today());
    let bytes = workbook::render(&[], &rows, "August 2026").unwrap();
    assert!(!bytes.is_empty());
}

// ── build (end to end against the store) ──────────────────────

#[test]
fn test_build_report_with_stored_mtd() {
    let mut db = crate::db::Database::open_in_memory().unwrap();
    // Earlier in the month, already persisted
    db.insert_transactions_batch(&[txn(1, "01.08.2026", Some("KUTCH"), dec!(100.5))])
        .unwrap();

    // Today's batch, persisted before the report is built (as the
    // orchestrator does)
    let batch = vec![txn(2, "07.08.2026", Some("KUTCH"), dec!(10.5))];
    db.insert_transactions_batch(&batch).unwrap();

    let report = build(&db, &batch, today()).unwrap();
    assert_eq!(report.date_label, "07.08.2026");
    let kutch = report.summary.iter().find(|r| r.name == "KUTCH").unwrap();
    assert_eq!(kutch.daily, dec!(10.5));
    assert_eq!(kutch.mtd, dec!(111.0));
    assert!(report.html.contains("KUTCH"));
    assert_eq!(&report.workbook[..2], b"PK");
}

#[test]
fn test_build_skips_non_benzene_records() {
    let db = crate::db::Database::open_in_memory().unwrap();
    let mut other = txn(1, "07.08.2026", Some("KUTCH"), dec!(5.0));
    other.material_name = "TOLUENE BULK".into();
    let report = build(&db, &[other], today()).unwrap();
    let kutch = report.summary.iter().find(|r| r.name == "KUTCH");
    assert!(kutch.is_none());
}

// ── portal_date ───────────────────────────────────────────────

#[test]
fn test_portal_date_zero_padded() {
    let date = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
    assert_eq!(portal_date(date), "03.01.2026");
}
