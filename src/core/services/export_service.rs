use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::errors::{Result, WikitrackError};

/// Output format for exported result sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    /// Placeholder: no PDF renderer is bundled.
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("unknown export format '{other}' (expected json, csv or pdf)")),
        }
    }
}

/// Text returned for PDF exports.
pub const PDF_PLACEHOLDER: &str = "PDF generation is not available; export as json or csv instead.";

/// Render `records` in `format`.
pub fn export<T: Serialize>(records: &[T], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => {
            serde_json::to_string_pretty(records).map_err(|e| WikitrackError::ExportError {
                reason: format!("Failed to serialize records: {e}"),
            })
        }
        ExportFormat::Csv => to_csv(records),
        ExportFormat::Pdf => Ok(PDF_PLACEHOLDER.to_string()),
    }
}

/// Flat CSV: one column per top-level field, nested values JSON-encoded.
///
/// Columns are the union of all records' fields in first-seen order, so an
/// optional field that is absent from the first record still gets a column.
fn to_csv<T: Serialize>(records: &[T]) -> Result<String> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let rows: Vec<Map<String, Value>> = records
        .iter()
        .map(|r| match serde_json::to_value(r) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(WikitrackError::ExportError {
                reason: format!("CSV export needs flat records, got {}", kind_of(&other)),
            }),
            Err(e) => Err(WikitrackError::ExportError {
                reason: format!("Failed to serialize records: {e}"),
            }),
        })
        .collect::<Result<_>>()?;

    let mut headers: Vec<&str> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        headers
            .iter()
            .map(|h| escape_field(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in &rows {
        let line = headers
            .iter()
            .map(|h| escape_field(&cell(row.get(*h))))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    Ok(lines.join("\n"))
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested) => nested.to_string(),
    }
}

/// Quote per RFC 4180 when the field contains a delimiter, quote or newline.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
