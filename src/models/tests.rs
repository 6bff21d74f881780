#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn sample() -> Transaction {
    Transaction {
        order_no: 5003001122,
        doc_no: 9100042,
        transaction_date: "07.08.2026".into(),
        transaction_time: "14:02:11".into(),
        tt_no: "TT-4471".into(),
        material: 110203,
        material_name: "BENZENE BULK".into(),
        bill_qty: dec!(24.500),
        unit: "MT".into(),
        bill_amt: dec!(1882350.00),
        db_cr: "D".into(),
        comp: 1000,
        doc_type: "ZF2".into(),
        plant: 1411,
        cca: "WR01".into(),
        sold_to_party: 4000068001,
        ship_to_party: 4000068001,
        company_name: Some("KUTCH".into()),
    }
}

#[test]
fn test_is_debit() {
    let mut txn = sample();
    assert!(txn.is_debit());
    txn.db_cr = "C".into();
    assert!(!txn.is_debit());
}

#[test]
fn test_company_label_mapped() {
    assert_eq!(sample().company_label(), "KUTCH");
}

#[test]
fn test_company_label_unmapped() {
    let mut txn = sample();
    txn.company_name = None;
    assert_eq!(txn.company_label(), "Unknown");
}
