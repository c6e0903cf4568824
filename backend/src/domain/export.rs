// backend/src/domain/export.rs
//
// Delimited text exports. Every value is JSON-encoded on its own before the
// row is joined, so commas and quotes inside text come out as JSON string
// escapes rather than RFC 4180 doubling.

use serde::Serialize;
use serde_json::{Map, Value};

pub const EMPTY_EXPORT_NOTICE: &str = "No data available to export";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,
    #[error("export row is not a flat record")]
    NotARecord,
    #[error("could not encode export row: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A finished export ready to be served as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub body: String,
}

fn to_record<T: Serialize>(row: &T) -> Result<Map<String, Value>, ExportError> {
    match serde_json::to_value(row)? {
        Value::Object(map) => Ok(map),
        _ => Err(ExportError::NotARecord),
    }
}

fn cell(value: Option<&Value>) -> Result<String, ExportError> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(v) => Ok(serde_json::to_string(v)?),
    }
}

/// Header from the first record's keys in field order, then one line per record.
pub fn to_delimited<T: Serialize>(rows: &[T]) -> Result<String, ExportError> {
    let first = rows.first().ok_or(ExportError::Empty)?;
    let headers: Vec<String> = to_record(first)?.keys().cloned().collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join(","));
    for row in rows {
        let record = to_record(row)?;
        let cells = headers
            .iter()
            .map(|h| cell(record.get(h)))
            .collect::<Result<Vec<_>, _>>()?;
        lines.push(cells.join(","));
    }
    Ok(lines.join("\n"))
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "january",
        2 => "february",
        3 => "march",
        4 => "april",
        5 => "may",
        6 => "june",
        7 => "july",
        8 => "august",
        9 => "september",
        10 => "october",
        11 => "november",
        12 => "december",
        _ => "unknown",
    }
}

/// `{kind}_{month}_{year}.csv`
pub fn period_filename(kind: &str, year: i32, month: u32) -> String {
    format!("{kind}_{}_{year}.csv", month_name(month))
}

pub fn build<T: Serialize>(filename: String, rows: &[T]) -> Result<ExportFile, ExportError> {
    Ok(ExportFile { filename, body: to_delimited(rows)? })
}
