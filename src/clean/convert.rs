//! Column-wide type conversions: text dates to date cells and formatted
//! numbers (`1,200`, `$5`, `40%`) to numeric cells.

use regex::Regex;

use crate::error::{Result, ToolError};
use crate::model::{CellValue, Sheet, datetime_to_serial, parse_datetime_text};

/// Header words that mark a column as holding dates.
const DATE_KEYWORDS: &[&str] = &[
    "date", "time", "created", "updated", "modified", "birth", "dob",
];
/// Number of leading values inspected when guessing a date column.
const DATE_SAMPLE_SIZE: usize = 10;
/// Share of sampled values that must look like dates.
const DATE_MATCH_RATIO: f64 = 0.7;
/// Share of non-empty values that must parse as numbers.
const NUMERIC_MATCH_RATIO: f64 = 0.5;

/// Outcome of one conversion step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversion {
    /// Headers of the columns that were converted.
    pub columns: Vec<String>,
    /// Number of cells whose value changed type.
    pub cells: usize,
}

/// Converts text dates in date-like columns into date cells.
///
/// A column is date-like when its header contains a date keyword, or when
/// more than 70% of its first ten values start with a `YYYY-MM-DD`,
/// `YYYY/MM/DD`, `MM/DD/YYYY` or `MM-DD-YYYY` pattern. Text that cannot be
/// parsed is left as it is.
pub fn standardize_dates(sheet: &mut Sheet) -> Result<Conversion> {
    let date_pattern = Regex::new(r"^(\d{4}[-/]\d{1,2}[-/]\d{1,2}|\d{1,2}[-/]\d{1,2}[-/]\d{4})")
        .map_err(|e| ToolError::Pattern(e.to_string()))?;

    let mut conversion = Conversion::default();
    for col in 0..sheet.width() {
        if !is_date_column(sheet, col, &date_pattern) {
            continue;
        }
        let mut changed = 0usize;
        for row in sheet.rows.iter_mut().skip(1) {
            let parsed = match &row[col] {
                CellValue::Text(text) => parse_datetime_text(text).and_then(datetime_to_serial),
                _ => None,
            };
            if let Some(serial) = parsed {
                row[col] = CellValue::DateTime(serial);
                changed += 1;
            }
        }
        if changed > 0 {
            conversion.columns.push(header_name(sheet, col));
            conversion.cells += changed;
        }
    }
    Ok(conversion)
}

fn is_date_column(sheet: &Sheet, col: usize, date_pattern: &Regex) -> bool {
    let values: Vec<&CellValue> = sheet
        .data_rows()
        .iter()
        .map(|row| &row[col])
        .filter(|cell| !cell.is_empty())
        .collect();

    if values.is_empty() || values.iter().all(|cell| matches!(cell, CellValue::DateTime(_))) {
        return false;
    }

    let header = header_name(sheet, col).to_lowercase();
    if DATE_KEYWORDS.iter().any(|keyword| header.contains(keyword)) {
        return true;
    }

    let sample: Vec<String> = values
        .iter()
        .take(DATE_SAMPLE_SIZE)
        .map(|cell| cell.render())
        .collect();
    let matching = sample
        .iter()
        .filter(|value| date_pattern.is_match(value.trim()))
        .count();
    matching as f64 / sample.len() as f64 > DATE_MATCH_RATIO
}

/// Converts text columns that are mostly numeric into number cells.
///
/// Thousands separators, currency and percent signs are stripped before
/// parsing. A column converts when more than half of its non-empty values
/// are numbers; text that still does not parse is left as it is.
pub fn coerce_numeric_columns(sheet: &mut Sheet) -> Result<Conversion> {
    let noise = Regex::new(r"[,$%]").map_err(|e| ToolError::Pattern(e.to_string()))?;

    let mut conversion = Conversion::default();
    for col in 0..sheet.width() {
        let parsed: Vec<Option<f64>> = sheet
            .data_rows()
            .iter()
            .map(|row| match &row[col] {
                CellValue::Text(text) => parse_number(&noise, text),
                _ => None,
            })
            .collect();

        let has_text = sheet
            .data_rows()
            .iter()
            .any(|row| matches!(row[col], CellValue::Text(_)));
        if !has_text {
            continue;
        }

        let non_empty = sheet
            .data_rows()
            .iter()
            .filter(|row| !row[col].is_empty())
            .count();
        let numeric = sheet
            .data_rows()
            .iter()
            .zip(&parsed)
            .filter(|(row, parsed)| matches!(row[col], CellValue::Number(_)) || parsed.is_some())
            .count();
        if non_empty == 0 || numeric as f64 / non_empty as f64 <= NUMERIC_MATCH_RATIO {
            continue;
        }

        let mut changed = 0usize;
        for (row, value) in sheet.rows.iter_mut().skip(1).zip(&parsed) {
            if let Some(number) = value {
                row[col] = CellValue::Number(*number);
                changed += 1;
            }
        }
        if changed > 0 {
            conversion.columns.push(header_name(sheet, col));
            conversion.cells += changed;
        }
    }
    Ok(conversion)
}

fn parse_number(noise: &Regex, text: &str) -> Option<f64> {
    let cleaned = noise.replace_all(text.trim(), "");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn header_name(sheet: &Sheet, col: usize) -> String {
    sheet.cell(0, col).map(CellValue::render).unwrap_or_default()
}
