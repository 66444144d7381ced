pub mod csv_read;
pub mod excel_read;
pub mod excel_write;

use std::path::Path;

use crate::error::{Result, ToolError};
use crate::model::Sheet;

/// Kinds of input files the tool can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Workbook,
    Csv,
}

impl InputFormat {
    /// Detects the format from the file extension.
    pub fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(InputFormat::Workbook),
            "csv" => Ok(InputFormat::Csv),
            "" => Err(ToolError::UnsupportedFormat(format!(
                "'{}' has no file extension",
                path.display()
            ))),
            other => Err(ToolError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

/// Loads the sheet to clean from either a workbook or a CSV file.
pub fn read_input(path: &Path, sheet: Option<&str>, delimiter: u8) -> Result<Sheet> {
    match InputFormat::detect(path)? {
        InputFormat::Workbook => excel_read::read_sheet(path, sheet),
        InputFormat::Csv => csv_read::read_sheet(path, delimiter),
    }
}
