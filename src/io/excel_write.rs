use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::clean::CleanedSheet;
use crate::error::{Result, ToolError};
use crate::model::CellValue;
use crate::style::{DATETIME_NUM_FORMAT, DURATION_NUM_FORMAT, ReportStyle, column_widths};
use crate::summary::{SUMMARY_SHEET, SummaryTable};

/// Name of the worksheet holding the cleaned data.
pub const DATA_SHEET: &str = "Cleaned Data";

/// Writes the cleaned sheet, and the summary when given, to `path`.
pub fn write_report(
    path: &Path,
    cleaned: &CleanedSheet,
    summary: Option<&SummaryTable>,
    style: &ReportStyle,
) -> Result<()> {
    let mut workbook_writer = Workbook::new();

    let worksheet = workbook_writer.add_worksheet();
    worksheet.set_name(DATA_SHEET)?;
    write_data_sheet(worksheet, cleaned, style)?;

    if let Some(summary) = summary {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(SUMMARY_SHEET)?;
        write_summary_sheet(worksheet, summary, style)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}

fn write_data_sheet(
    worksheet: &mut Worksheet,
    cleaned: &CleanedSheet,
    style: &ReportStyle,
) -> Result<()> {
    let sheet = &cleaned.sheet;
    let (row_origin, col_origin) = sheet.origin;
    let header_format = style.header.to_format();
    let placeholder_format = style.placeholder.map(|placeholder| placeholder.to_format());

    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let row_num = row_number(row_origin, row_idx)?;
        for (col_idx, cell) in row.iter().enumerate() {
            let col_num = column_number(col_origin, col_idx)?;
            let format = if row_idx == 0 {
                Some(&header_format)
            } else if cleaned.is_filled(row_idx, col_idx) {
                placeholder_format.as_ref()
            } else {
                None
            };
            write_cell(worksheet, row_num, col_num, cell, format)?;
        }
    }

    for (col_idx, width) in column_widths(&sheet.rows, sheet.width())
        .into_iter()
        .enumerate()
    {
        worksheet.set_column_width(column_number(col_origin, col_idx)?, width)?;
    }

    if style.freeze_header && sheet.height() > 1 {
        worksheet.set_freeze_panes(row_number(row_origin, 1)?, 0)?;
    }

    Ok(())
}

fn write_summary_sheet(
    worksheet: &mut Worksheet,
    summary: &SummaryTable,
    style: &ReportStyle,
) -> Result<()> {
    let header_format = style.summary_header.to_format();

    for (row_idx, row) in summary.rows.iter().enumerate() {
        let is_header = summary.header_rows.contains(&row_idx);
        for (col_idx, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let format = is_header.then_some(&header_format);
            write_cell(
                worksheet,
                row_number(0, row_idx)?,
                column_number(0, col_idx)?,
                cell,
                format,
            )?;
        }
    }

    for (col_idx, width) in column_widths(&summary.rows, summary.width())
        .into_iter()
        .enumerate()
    {
        worksheet.set_column_width(column_number(0, col_idx)?, width)?;
    }

    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    format: Option<&Format>,
) -> Result<()> {
    match (cell, format) {
        (CellValue::Empty, Some(format)) => {
            worksheet.write_blank(row, col, format)?;
        }
        (CellValue::Empty, None) => {}
        (CellValue::Number(value), Some(format)) => {
            worksheet.write_number_with_format(row, col, *value, format)?;
        }
        (CellValue::Number(value), None) => {
            worksheet.write_number(row, col, *value)?;
        }
        (CellValue::Boolean(value), Some(format)) => {
            worksheet.write_boolean_with_format(row, col, *value, format)?;
        }
        (CellValue::Boolean(value), None) => {
            worksheet.write_boolean(row, col, *value)?;
        }
        (CellValue::DateTime(serial), format) => {
            let format = temporal_format(format, DATETIME_NUM_FORMAT);
            worksheet.write_number_with_format(row, col, *serial, &format)?;
        }
        (CellValue::Duration(days), format) => {
            let format = temporal_format(format, DURATION_NUM_FORMAT);
            worksheet.write_number_with_format(row, col, *days, &format)?;
        }
        (CellValue::Text(value) | CellValue::Error(value), Some(format)) => {
            worksheet.write_string_with_format(row, col, value, format)?;
        }
        (CellValue::Text(value) | CellValue::Error(value), None) => {
            worksheet.write_string(row, col, value)?;
        }
    }
    Ok(())
}

/// Layers a date or time number format over the cell style, if any.
fn temporal_format(style: Option<&Format>, num_format: &str) -> Format {
    style
        .cloned()
        .unwrap_or_else(Format::new)
        .set_num_format(num_format)
}

fn row_number(origin: u32, offset: usize) -> Result<u32> {
    u32::try_from(offset)
        .ok()
        .and_then(|offset| origin.checked_add(offset))
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("row {offset} is out of range")))
}

fn column_number(origin: u16, offset: usize) -> Result<u16> {
    u16::try_from(offset)
        .ok()
        .and_then(|offset| origin.checked_add(offset))
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("column {offset} is out of range")))
}
