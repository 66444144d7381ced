use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{CellValue, Sheet};

/// Reads a CSV file into a [`Sheet`] whose first record is the header row.
///
/// Files that are not valid UTF-8 are decoded as Latin-1.
pub fn read_sheet(path: &Path, delimiter: u8) -> Result<Sheet> {
    let bytes = fs::read(path)?;
    let text = decode(&bytes);
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Sheet1")
        .to_string();
    parse_csv(name, &text, delimiter)
}

/// Parses CSV text into a sheet, typing each field.
pub fn parse_csv(name: String, text: &str, delimiter: u8) -> Result<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(detect_type).collect());
    }
    debug!(rows = rows.len(), "parsed CSV records");

    Ok(Sheet::new(name, rows))
}

fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            warn!("input is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|byte| char::from(*byte)).collect()
        }
    }
}

fn detect_type(field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }
    if has_leading_zero(field) {
        return CellValue::Text(field.to_string());
    }
    if is_integer_literal(field) {
        // Integers beyond f64 precision would be rounded on the way to a cell.
        return match field.parse::<i64>() {
            Ok(value) if value as f64 as i64 == value => CellValue::Number(value as f64),
            _ => CellValue::Text(field.to_string()),
        };
    }
    if let Ok(value) = field.parse::<f64>() {
        if value.is_finite() {
            return CellValue::Number(value);
        }
    }
    match field.to_ascii_lowercase().as_str() {
        "true" => CellValue::Boolean(true),
        "false" => CellValue::Boolean(false),
        _ => CellValue::Text(field.to_string()),
    }
}

fn is_integer_literal(field: &str) -> bool {
    let digits = field.strip_prefix(['-', '+']).unwrap_or(field);
    !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}

/// Codes such as `00123` lose their zeros as numbers; `0` and `0.5` do not.
fn has_leading_zero(field: &str) -> bool {
    let digits = field.strip_prefix(['-', '+']).unwrap_or(field);
    let bytes = digits.as_bytes();
    bytes.len() > 1 && bytes[0] == b'0' && bytes[1].is_ascii_digit()
}
