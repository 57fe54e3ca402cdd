//! Scenario data-table parsing
//!
//! Steps that take a data table expect a two-column key/value layout
//! with a fixed header row and a fixed set of recognized keys. Keys not
//! present in the table mean "no expectation for this key".

use std::collections::HashMap;

use crate::error::StepError;

/// Parse a key/value expectation table.
///
/// `columns` names the expected header cells (e.g. `["Key", "Value"]`),
/// `recognized_keys` the allowed keys. The header must match exactly;
/// an unrecognized or duplicate key is a format error.
pub fn parse_kv_table(
    rows: &[Vec<String>],
    columns: [&str; 2],
    recognized_keys: &[&str],
) -> Result<HashMap<String, String>, StepError> {
    let header = rows
        .first()
        .ok_or_else(|| StepError::format("data table is empty"))?;
    if header.len() != 2 || header[0] != columns[0] || header[1] != columns[1] {
        return Err(StepError::format(format!(
            "expected table columns {:?}, got {:?}",
            columns, header
        )));
    }

    let mut map = HashMap::new();
    for row in &rows[1..] {
        if row.len() != 2 {
            return Err(StepError::format(format!(
                "expected 2 cells per row, got {:?}",
                row
            )));
        }
        let key = row[0].trim();
        if !recognized_keys.contains(&key) {
            return Err(StepError::format(format!(
                "unrecognized table key {:?}; expected one of {:?}",
                key, recognized_keys
            )));
        }
        if map.insert(key.to_string(), row[1].trim().to_string()).is_some() {
            return Err(StepError::format(format!("duplicate table key {:?}", key)));
        }
    }
    Ok(map)
}

/// Split a comma-separated package list into trimmed names.
/// Empty elements are dropped.
pub fn split_packages(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
