use calamine::DataType;
use chrono::{NaiveDate, NaiveDateTime};

/// Format used when rendering date-time cells as text.
pub const DATETIME_RENDER_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single cell value as read from the source spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Cell without any content.
    Empty,
    /// Plain string literal.
    Text(String),
    /// Numeric literal. Integers are stored as floats, as in the file format.
    Number(f64),
    /// Boolean literal.
    Boolean(bool),
    /// Date-time stored as an Excel serial number (1900 date system).
    DateTime(f64),
    /// Elapsed time stored as a fraction of days.
    Duration(f64),
    /// Formula error such as `#DIV/0!`, kept as its display text.
    Error(String),
}

impl CellValue {
    /// Returns `true` when the cell holds no value.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Renders the value the way it is displayed in a spreadsheet cell.
    pub fn render(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(value) => value.clone(),
            CellValue::Number(value) => value.to_string(),
            CellValue::Boolean(true) => "TRUE".to_string(),
            CellValue::Boolean(false) => "FALSE".to_string(),
            CellValue::DateTime(serial) => match DataType::DateTime(*serial).as_datetime() {
                Some(datetime) => datetime.format(DATETIME_RENDER_FORMAT).to_string(),
                None => serial.to_string(),
            },
            CellValue::Duration(days) => render_duration(*days),
            CellValue::Error(value) => value.clone(),
        }
    }

    /// Key used to compare cells for uniqueness; distinguishes `1` from `"1"`.
    pub fn identity_key(&self) -> String {
        match self {
            CellValue::Empty => "e:".to_string(),
            CellValue::Text(value) => format!("s:{value}"),
            CellValue::Number(value) => format!("n:{value}"),
            CellValue::Boolean(value) => format!("b:{value}"),
            CellValue::DateTime(value) => format!("d:{value}"),
            CellValue::Duration(value) => format!("t:{value}"),
            CellValue::Error(value) => format!("x:{value}"),
        }
    }
}

/// Converts a calendar value into an Excel serial date (1900 date system).
///
/// Only dates from 1900-03-01 onwards map exactly; earlier serials are
/// shifted by the 1900 leap-year bug.
pub fn datetime_to_serial(datetime: NaiveDateTime) -> Option<f64> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = datetime.signed_duration_since(epoch).num_milliseconds();
    Some(millis as f64 / 86_400_000.0)
}

/// Date-time layouts accepted when reading dates from text, most specific first.
const DATETIME_TEXT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Date-only layouts accepted when reading dates from text. Slash and dash
/// day-month orders are read month first.
const DATE_TEXT_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];

/// Parses a date or date-time written as text.
pub fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim().trim_end_matches('Z');
    DATETIME_TEXT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_TEXT_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn render_duration(days: f64) -> String {
    let total = (days * 86_400.0).round() as i64;
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{sign}{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// A rectangular block of cells taken from one worksheet.
///
/// Row 0 is the header row. `origin` is the zero-based `(row, column)` of the
/// top-left cell in the source worksheet, so the cleaned report can place the
/// data where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub origin: (u32, u16),
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Creates a sheet anchored at `A1`, padding ragged rows with empty cells.
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self::with_origin(name, (0, 0), rows)
    }

    /// Creates a sheet anchored at the given origin.
    pub fn with_origin(
        name: impl Into<String>,
        origin: (u32, u16),
        mut rows: Vec<Vec<CellValue>>,
    ) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }
        Self {
            name: name.into(),
            origin,
            rows,
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Number of rows, header included.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of rows below the header.
    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Rows below the header.
    pub fn data_rows(&self) -> &[Vec<CellValue>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    /// Counts empty cells below the header.
    pub fn empty_data_cells(&self) -> usize {
        self.data_rows()
            .iter()
            .flatten()
            .filter(|cell| cell.is_empty())
            .count()
    }
}
