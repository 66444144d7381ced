use std::path::Path;

use calamine::{DataType, Range, Reader, open_workbook_auto};
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::model::{CellValue, Sheet, datetime_to_serial, parse_datetime_text};

/// Reads one worksheet of a workbook into a [`Sheet`].
///
/// The named sheet is used when given, otherwise the first sheet of the
/// workbook. Only the used range is loaded; its position is kept as the
/// sheet origin.
pub fn read_sheet(path: &Path, sheet: Option<&str>) -> Result<Sheet> {
    let mut workbook = open_workbook_auto(path)?;

    let names = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(requested) => names
            .iter()
            .find(|candidate| candidate.as_str() == requested)
            .cloned()
            .ok_or_else(|| ToolError::MissingSheet(requested.to_string()))?,
        None => names
            .first()
            .cloned()
            .ok_or_else(|| ToolError::InvalidWorkbook("workbook has no worksheets".into()))?,
    };

    let range = workbook
        .worksheet_range(&name)
        .ok_or_else(|| ToolError::MissingSheet(name.clone()))??;
    debug!(sheet = %name, size = ?range.get_size(), "loaded worksheet range");

    Ok(range_to_sheet(name, &range))
}

fn range_to_sheet(name: String, range: &Range<DataType>) -> Sheet {
    let origin = match range.start() {
        Some((row, col)) => (row, u16::try_from(col).unwrap_or(u16::MAX)),
        None => (0, 0),
    };
    let rows: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(cell_value).collect())
        .collect();
    Sheet::with_origin(name, origin, rows)
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::String(value) if value.is_empty() => CellValue::Empty,
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Boolean(*value),
        DataType::DateTime(serial) => CellValue::DateTime(*serial),
        DataType::Duration(days) => CellValue::Duration(*days),
        DataType::DateTimeIso(text) => parse_datetime_text(text)
            .and_then(datetime_to_serial)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(text.clone())),
        // ISO 8601 durations ("PT1H30M") have no serial form in the source file.
        DataType::DurationIso(text) => CellValue::Text(text.clone()),
        DataType::Error(error) => CellValue::Error(error.to_string()),
    }
}
