pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    order_no          INTEGER PRIMARY KEY,
    doc_no            INTEGER NOT NULL,
    transaction_date  TEXT NOT NULL,
    transaction_time  TEXT NOT NULL,
    tt_no             TEXT NOT NULL,
    material          INTEGER NOT NULL,
    material_name     TEXT NOT NULL,
    bill_qty          TEXT NOT NULL,
    unit              TEXT NOT NULL,
    bill_amt          TEXT NOT NULL,
    db_cr             TEXT NOT NULL,
    comp              INTEGER NOT NULL DEFAULT 0,
    doc_type          TEXT NOT NULL,
    plant             INTEGER NOT NULL,
    cca               TEXT NOT NULL,
    sold_to_party     INTEGER NOT NULL,
    ship_to_party     INTEGER NOT NULL,
    company_name      TEXT,
    created_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(transaction_date);
CREATE INDEX IF NOT EXISTS idx_transactions_material ON transactions(material_name);

CREATE TABLE IF NOT EXISTS mtd_adjustments (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    year          INTEGER NOT NULL,
    month         INTEGER NOT NULL,
    company_name  TEXT NOT NULL,
    qty           TEXT NOT NULL,
    note          TEXT NOT NULL DEFAULT '',
    UNIQUE(year, month, company_name)
);

"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
