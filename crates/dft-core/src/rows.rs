// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RAW CONFIGURATION ROWS
//
// One row per named token configuration, exactly as a scenario table or a
// row file supplies it: string keys to string values. Typing happens later
// in the plan builder; this module only stores and loads rows.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Column holding the canister key a row configures.
pub const KEY_COLUMN: &str = "key";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigRow(BTreeMap<String, String>);

impl ConfigRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: &str, value: &str) {
        self.0.insert(column.to_string(), value.to_string());
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// The canister key this row configures.
    pub fn key(&self) -> Option<&str> {
        self.get(KEY_COLUMN)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// First row configuring `key`, if any.
pub fn find_row<'a>(rows: &'a [ConfigRow], key: &str) -> Option<&'a ConfigRow> {
    rows.iter().find(|row| row.key() == Some(key))
}

/// Render a scalar cell as the text a table would have shown.
///
/// Numbers keep their literal digits (`arbitrary_precision`), so a long
/// amount is never squeezed through an `f64`.
fn cell_text(value: &serde_json::Value) -> Result<String, String> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("unsupported cell value: {}", other)),
    }
}

fn toml_cell_text(value: &toml::Value) -> Result<String, String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        // TOML floats are already f64 when parsed; the digits are gone.
        toml::Value::Float(f) => Err(format!(
            "float {} loses precision, write it as a quoted string",
            f
        )),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        other => Err(format!("unsupported cell value: {}", other)),
    }
}

/// Parse rows from a JSON array of objects.
pub fn rows_from_json(content: &str) -> Result<Vec<ConfigRow>, Box<dyn std::error::Error>> {
    let raw: Vec<BTreeMap<String, serde_json::Value>> = serde_json::from_str(content)?;
    let mut rows = Vec::with_capacity(raw.len());
    for (index, object) in raw.iter().enumerate() {
        let mut row = ConfigRow::new();
        for (column, value) in object {
            let text = cell_text(value)
                .map_err(|e| format!("row {} column '{}': {}", index, column, e))?;
            row.insert(column, &text);
        }
        rows.push(row);
    }
    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct RowFile {
    #[serde(default)]
    rows: Vec<BTreeMap<String, toml::Value>>,
}

/// Parse rows from TOML (`[[rows]]` array of tables).
pub fn rows_from_toml(content: &str) -> Result<Vec<ConfigRow>, Box<dyn std::error::Error>> {
    let file: RowFile = toml::from_str(content)?;
    let mut rows = Vec::with_capacity(file.rows.len());
    for (index, table) in file.rows.iter().enumerate() {
        let mut row = ConfigRow::new();
        for (column, value) in table {
            let text = toml_cell_text(value)
                .map_err(|e| format!("row {} column '{}': {}", index, column, e))?;
            row.insert(column, &text);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Load rows from a `.json` or `.toml` file.
pub fn load_rows(path: &Path) -> Result<Vec<ConfigRow>, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read row file {}: {}", path.display(), e))?;
    let rows = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => rows_from_json(&content)?,
        Some("toml") => rows_from_toml(&content)?,
        _ => {
            return Err(format!(
                "Unsupported row file {} (expected .json or .toml)",
                path.display()
            )
            .into())
        }
    };
    log::debug!("loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

// ─────────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────────
