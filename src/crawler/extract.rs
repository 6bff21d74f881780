use serde::Deserialize;
use std::collections::HashMap;
use thirtyfour::WebDriver;

use super::CrawlError;

pub(crate) type RawRow = HashMap<String, String>;

/// CSS selector identifying the report table by its stable structural
/// attribute.
pub(crate) const TABLE_SELECTOR: &str = r#"table[width="1350"]"#;

/// Dumps the report table: first tbody holds the header cells, second tbody
/// the data rows. All cell text is trimmed in-page.
const TABLE_DUMP_SCRIPT: &str = r#"
const table = document.querySelector('table[width="1350"]');
if (!table) return null;
const headers = Array.from(table.querySelectorAll('tbody:nth-child(1) > tr > td'))
    .map(cell => (cell.textContent || '').trim());
const rows = Array.from(table.querySelectorAll('tbody:nth-child(2) > tr'))
    .map(row => Array.from(row.querySelectorAll('td'))
        .map(cell => (cell.textContent || '').trim()));
return { headers: headers, rows: rows };
"#;

#[derive(Debug, Deserialize)]
struct TableDump {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Reads the loaded report page and returns one header→cell mapping per
/// data row, in document order.
pub(crate) async fn transaction_rows(driver: &WebDriver) -> Result<Vec<RawRow>, CrawlError> {
    let ret = driver.execute(TABLE_DUMP_SCRIPT, Vec::new()).await?;
    let value = ret.json().clone();
    if value.is_null() {
        return Err(CrawlError::TableMissing);
    }
    let dump: TableDump =
        serde_json::from_value(value).map_err(|err| CrawlError::TableShape(err.to_string()))?;
    Ok(zip_rows(&dump.headers, dump.rows))
}

/// Zips each row's cells positionally against the header keys. A row with
/// fewer cells than headers yields a partial mapping (missing keys are
/// simply absent); surplus cells are dropped.
pub(crate) fn zip_rows(headers: &[String], rows: Vec<Vec<String>>) -> Vec<RawRow> {
    rows.into_iter()
        .map(|cells| headers.iter().cloned().zip(cells).collect())
        .collect()
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
