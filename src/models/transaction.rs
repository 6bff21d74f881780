use rust_decimal::Decimal;

/// One scraped portal transaction. `order_no` is the business key; a record
/// is created once at scrape time and never updated.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub order_no: i64,
    pub doc_no: i64,
    pub transaction_date: String,
    pub transaction_time: String,
    pub tt_no: String,
    pub material: i64,
    pub material_name: String,
    pub bill_qty: Decimal,
    pub unit: String,
    pub bill_amt: Decimal,
    pub db_cr: String,
    pub comp: i64,
    pub doc_type: String,
    pub plant: i64,
    pub cca: String,
    pub sold_to_party: i64,
    pub ship_to_party: i64,
    pub company_name: Option<String>,
}

impl Transaction {
    pub fn is_debit(&self) -> bool {
        self.db_cr == "D"
    }

    /// Display name used for grouping; unmapped ship-to parties fold into
    /// a single "Unknown" bucket.
    pub fn company_label(&self) -> &str {
        self.company_name.as_deref().unwrap_or("Unknown")
    }
}
