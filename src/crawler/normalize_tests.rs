#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn directory() -> CompanyDirectory {
    CompanyDirectory::from_pairs([(4000068001, "KUTCH"), (4000068002, "CHEMIE")])
}

fn raw_row(order_no: &str, db_cr: &str) -> RawRow {
    [
        ("Order No", order_no),
        ("Doc. No", "9100042"),
        ("Tran. Date", "07.08.2026"),
        ("Tran. Time", "14:02:11"),
        ("TTNO", "TT-4471"),
        ("Material", "110203"),
        ("Material Name", "BENZENE BULK"),
        ("Bill Qty", "24.500"),
        ("Unit", "MT"),
        ("Bill Amt", "18,82,350.00"),
        ("Db/Cr", db_cr),
        ("Comp", "1000"),
        ("Doc Type", "ZF2"),
        ("Plant", "1411"),
        ("CCA", "WR01"),
        ("Sold to Party", "4000068001"),
        ("Ship to Party", "4000068001"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

// ── Debit filter ──────────────────────────────────────────────

#[test]
fn test_credit_rows_excluded() {
    let rows = vec![raw_row("1", "D"), raw_row("2", "C"), raw_row("3", "C")];
    let txns = normalize(&rows, &directory());
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].order_no, 1);
}

#[test]
fn test_five_rows_three_debit() {
    // 3 valid debit rows with distinct order numbers, 2 credit rows
    let rows = vec![
        raw_row("101", "D"),
        raw_row("102", "C"),
        raw_row("103", "D"),
        raw_row("104", "C"),
        raw_row("105", "D"),
    ];
    let txns = normalize(&rows, &directory());
    let orders: Vec<i64> = txns.iter().map(|t| t.order_no).collect();
    assert_eq!(orders, [101, 103, 105]);
}

// ── Field parsing ─────────────────────────────────────────────

#[test]
fn test_fields_parsed() {
    let txns = normalize(&[raw_row("5003001122", "D")], &directory());
    let txn = &txns[0];
    assert_eq!(txn.order_no, 5003001122);
    assert_eq!(txn.doc_no, 9100042);
    assert_eq!(txn.transaction_date, "07.08.2026");
    assert_eq!(txn.bill_qty, dec!(24.500));
    // Indian-style grouping separators stripped before parsing
    assert_eq!(txn.bill_amt, dec!(1882350.00));
    assert_eq!(txn.plant, 1411);
    assert_eq!(txn.ship_to_party, 4000068001);
}

#[test]
fn test_non_numeric_row_dropped_without_panicking() {
    let mut bad = raw_row("2", "D");
    bad.insert("Bill Qty".into(), "N/A".into());
    let rows = vec![raw_row("1", "D"), bad, raw_row("3", "D")];
    let txns = normalize(&rows, &directory());
    let orders: Vec<i64> = txns.iter().map(|t| t.order_no).collect();
    assert_eq!(orders, [1, 3]);
}

#[test]
fn test_partial_row_dropped() {
    let mut partial = raw_row("2", "D");
    partial.remove("Bill Amt");
    let rows = vec![raw_row("1", "D"), partial];
    let txns = normalize(&rows, &directory());
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].order_no, 1);
}

#[test]
fn test_blank_comp_defaults_to_zero() {
    let mut row = raw_row("1", "D");
    row.insert("Comp".into(), "".into());
    let txns = normalize(&[row], &directory());
    assert_eq!(txns[0].comp, 0);
}

// ── Company resolution ────────────────────────────────────────

#[test]
fn test_company_resolved_from_directory() {
    let txns = normalize(&[raw_row("1", "D")], &directory());
    assert_eq!(txns[0].company_name.as_deref(), Some("KUTCH"));
}

#[test]
fn test_unmapped_ship_to_party_yields_none() {
    let mut row = raw_row("1", "D");
    row.insert("Ship to Party".into(), "4999999999".into());
    let txns = normalize(&[row], &directory());
    assert_eq!(txns.len(), 1);
    assert!(txns[0].company_name.is_none());
}

#[test]
fn test_empty_input() {
    assert!(normalize(&[], &directory()).is_empty());
}
