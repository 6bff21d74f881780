use rust_decimal::Decimal;

/// Per-company daily and month-to-date quantities for the report, plus a
/// synthetic "Total" row appended last. Derived from transactions, never
/// persisted on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub name: String,
    pub daily: Decimal,
    pub mtd: Decimal,
}

/// Operator-entered month-to-date correction for one company.
#[derive(Debug, Clone, PartialEq)]
pub struct MtdAdjustment {
    pub year: i32,
    pub month: u32,
    pub company_name: String,
    pub qty: Decimal,
    pub note: String,
}
