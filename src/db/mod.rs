mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

use crate::models::{MtdAdjustment, Transaction};

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Transactions ──────────────────────────────────────────

    /// Inserts the batch inside a single transaction, skipping order numbers
    /// that are already stored. A primary-key conflict that slips past the
    /// pre-filter (concurrent run, or a duplicate inside the batch itself)
    /// is skipped as a no-op; any other storage error aborts the whole batch.
    pub(crate) fn insert_transactions_batch(&mut self, txns: &[Transaction]) -> Result<usize> {
        if txns.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;

        let placeholders: String = (1..=txns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(",");
        let existing: HashSet<i64> = {
            let sql =
                format!("SELECT order_no FROM transactions WHERE order_no IN ({placeholders})");
            let mut stmt = tx.prepare(&sql)?;
            let order_nos: Vec<Box<dyn rusqlite::types::ToSql>> = txns
                .iter()
                .map(|t| Box::new(t.order_no) as Box<dyn rusqlite::types::ToSql>)
                .collect();
            let refs: Vec<&dyn rusqlite::types::ToSql> =
                order_nos.iter().map(|p| p.as_ref()).collect();
            let rows = stmt.query_map(refs.as_slice(), |row| row.get::<_, i64>(0))?;
            rows.collect::<std::result::Result<HashSet<_>, _>>()?
        };

        let now = chrono::Utc::now().to_rfc3339();
        let mut count = 0;
        for txn in txns.iter().filter(|t| !existing.contains(&t.order_no)) {
            let result = tx.execute(
                "INSERT INTO transactions (
                    order_no, doc_no, transaction_date, transaction_time,
                    tt_no, material, material_name, bill_qty, unit,
                    bill_amt, db_cr, comp, doc_type, plant, cca,
                    sold_to_party, ship_to_party, company_name, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                params![
                    txn.order_no,
                    txn.doc_no,
                    txn.transaction_date,
                    txn.transaction_time,
                    txn.tt_no,
                    txn.material,
                    txn.material_name,
                    txn.bill_qty.to_string(),
                    txn.unit,
                    txn.bill_amt.to_string(),
                    txn.db_cr,
                    txn.comp,
                    txn.doc_type,
                    txn.plant,
                    txn.cca,
                    txn.sold_to_party,
                    txn.ship_to_party,
                    txn.company_name,
                    now,
                ],
            );
            match result {
                Ok(_) => count += 1,
                Err(err) if is_constraint_violation(&err) => {
                    warn!(order_no = txn.order_no, "Skipping duplicate transaction");
                }
                Err(err) => {
                    return Err(err).context("Failed to insert transaction");
                }
            }
        }
        tx.commit()?;
        info!(count, "Saved transactions");
        Ok(count)
    }

    /// Benzene transactions for one portal date (dd.MM.yyyy).
    pub(crate) fn get_daily_transactions(&self, date: &str) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_COLUMNS} FROM transactions
             WHERE transaction_date = ?1 AND material_name LIKE '%BENZENE%'
             ORDER BY order_no"
        ))?;
        let rows = stmt.query_map(params![date], map_transaction_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Month-to-date benzene quantity per company over an inclusive date
    /// range. Portal dates are zero-padded dd.MM.yyyy, so string BETWEEN is
    /// correct within a single month.
    pub(crate) fn get_mtd_by_company(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<(String, Decimal)>> {
        let mut stmt = self.conn.prepare(
            "SELECT COALESCE(company_name, 'Unknown'),
                    CAST(SUM(CAST(bill_qty AS REAL)) AS TEXT)
             FROM transactions
             WHERE transaction_date BETWEEN ?1 AND ?2
               AND material_name LIKE '%BENZENE%'
             GROUP BY COALESCE(company_name, 'Unknown')",
        )?;
        let rows = stmt.query_map(params![start_date, end_date], |row| {
            let name: String = row.get(0)?;
            let qty_str: String = row.get(1)?;
            Ok((name, Decimal::from_str(&qty_str).unwrap_or_default()))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_transaction_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?)
    }

    /// All transactions, optionally restricted to one calendar month.
    pub(crate) fn get_transactions_for_export(
        &self,
        month: Option<(u32, i32)>,
    ) -> Result<Vec<Transaction>> {
        let (sql, args): (String, Vec<Box<dyn rusqlite::types::ToSql>>) =
            if let Some((month, year)) = month {
                (
                    format!(
                        "{SELECT_COLUMNS} FROM transactions
                         WHERE transaction_date LIKE ?1
                         ORDER BY transaction_date, order_no"
                    ),
                    vec![Box::new(format!("%.{month:02}.{year}"))],
                )
            } else {
                (
                    format!(
                        "{SELECT_COLUMNS} FROM transactions
                         ORDER BY transaction_date, order_no"
                    ),
                    vec![],
                )
            };

        let refs: Vec<&dyn rusqlite::types::ToSql> = args.iter().map(|p| p.as_ref()).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(refs.as_slice(), map_transaction_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn export_to_csv(&self, path: &str, month: Option<(u32, i32)>) -> Result<usize> {
        let txns = self.get_transactions_for_export(month)?;
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create export file: {path}"))?;
        writer.write_record([
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
        ])?;
        for t in &txns {
            writer.write_record([
                t.order_no.to_string(),
                t.doc_no.to_string(),
                t.transaction_date.clone(),
                t.transaction_time.clone(),
                t.tt_no.clone(),
                t.material.to_string(),
                t.material_name.clone(),
                t.bill_qty.to_string(),
                t.unit.clone(),
                t.bill_amt.to_string(),
                t.db_cr.clone(),
                t.comp.to_string(),
                t.doc_type.clone(),
                t.plant.to_string(),
                t.cca.clone(),
                t.sold_to_party.to_string(),
                t.ship_to_party.to_string(),
                t.company_name.clone().unwrap_or_default(),
            ])?;
        }
        writer.flush()?;
        Ok(txns.len())
    }

    // ── MTD adjustments ───────────────────────────────────────

    pub(crate) fn upsert_adjustment(&self, adj: &MtdAdjustment) -> Result<()> {
        self.conn.execute(
            "INSERT INTO mtd_adjustments (year, month, company_name, qty, note)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(year, month, company_name) DO UPDATE SET qty = ?4, note = ?5",
            params![
                adj.year,
                adj.month,
                adj.company_name,
                adj.qty.to_string(),
                adj.note
            ],
        )?;
        Ok(())
    }

    pub(crate) fn get_adjustments(&self, year: i32, month: u32) -> Result<Vec<MtdAdjustment>> {
        let mut stmt = self.conn.prepare(
            "SELECT year, month, company_name, qty, note FROM mtd_adjustments
             WHERE year = ?1 AND month = ?2 ORDER BY company_name",
        )?;
        let rows = stmt.query_map(params![year, month], |row| {
            let qty_str: String = row.get(3)?;
            Ok(MtdAdjustment {
                year: row.get(0)?,
                month: row.get(1)?,
                company_name: row.get(2)?,
                qty: Decimal::from_str(&qty_str).unwrap_or_default(),
                note: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

const SELECT_COLUMNS: &str = "SELECT order_no, doc_no, transaction_date, transaction_time,
    tt_no, material, material_name, bill_qty, unit, bill_amt, db_cr, comp,
    doc_type, plant, cca, sold_to_party, ship_to_party, company_name";

fn map_transaction_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    let qty_str: String = row.get(7)?;
    let amt_str: String = row.get(9)?;
    Ok(Transaction {
        order_no: row.get(0)?,
        doc_no: row.get(1)?,
        transaction_date: row.get(2)?,
        transaction_time: row.get(3)?,
        tt_no: row.get(4)?,
        material: row.get(5)?,
        material_name: row.get(6)?,
        bill_qty: Decimal::from_str(&qty_str).unwrap_or_default(),
        unit: row.get(8)?,
        bill_amt: Decimal::from_str(&amt_str).unwrap_or_default(),
        db_cr: row.get(10)?,
        comp: row.get(11)?,
        doc_type: row.get(12)?,
        plant: row.get(13)?,
        cca: row.get(14)?,
        sold_to_party: row.get(15)?,
        ship_to_party: row.get(16)?,
        company_name: row.get(17)?,
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
