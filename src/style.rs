//! Visual styling of the cleaned report and column width calculation.

use rust_xlsxwriter::{Color, Format};

use crate::model::CellValue;

/// Header fill of the cleaned data sheet.
pub const HEADER_FILL: u32 = 0x366092;
/// Fill applied to cells that received the placeholder.
pub const PLACEHOLDER_FILL: u32 = 0xFFCCCC;
/// Header fill of the summary sheet.
pub const SUMMARY_HEADER_FILL: u32 = 0x70AD47;
/// Number format for date-time cells.
pub const DATETIME_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
/// Number format for elapsed-time cells.
pub const DURATION_NUM_FORMAT: &str = "[h]:mm:ss";

/// Characters of padding added to the widest value of a column.
pub const COLUMN_PADDING: usize = 2;
/// Largest column width Excel accepts.
pub const MAX_COLUMN_WIDTH: f64 = 255.0;

/// Minimal description of a cell style, convertible into a writer format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub bold: bool,
    pub font_color: Option<u32>,
    pub fill_color: Option<u32>,
}

impl CellStyle {
    /// Bold white text on a solid fill.
    pub const fn banner(fill: u32) -> Self {
        Self {
            bold: true,
            font_color: Some(0xFFFFFF),
            fill_color: Some(fill),
        }
    }

    /// Plain text on a solid fill.
    pub const fn fill(fill: u32) -> Self {
        Self {
            bold: false,
            font_color: None,
            fill_color: Some(fill),
        }
    }

    pub fn to_format(&self) -> Format {
        let mut format = Format::new();
        if self.bold {
            format = format.set_bold();
        }
        if let Some(color) = self.font_color {
            format = format.set_font_color(Color::RGB(color));
        }
        if let Some(color) = self.fill_color {
            format = format.set_background_color(Color::RGB(color));
        }
        format
    }
}

/// Styles applied when writing the cleaned report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStyle {
    pub header: CellStyle,
    /// `None` leaves filled cells unstyled.
    pub placeholder: Option<CellStyle>,
    pub summary_header: CellStyle,
    pub freeze_header: bool,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            header: CellStyle::banner(HEADER_FILL),
            placeholder: Some(CellStyle::fill(PLACEHOLDER_FILL)),
            summary_header: CellStyle::banner(SUMMARY_HEADER_FILL),
            freeze_header: true,
        }
    }
}

impl ReportStyle {
    /// Default style without placeholder highlighting.
    pub fn without_highlight() -> Self {
        Self {
            placeholder: None,
            ..Self::default()
        }
    }
}

/// Estimates the displayed width of `text` in character units.
///
/// Wide scripts render broader than Latin text in the default font, so
/// non-ASCII characters count 1.6 units.
pub fn display_width(text: &str) -> usize {
    let ascii = text.chars().filter(char::is_ascii).count();
    let other = text.chars().count().saturating_sub(ascii);
    ascii + (other as f64 * 1.6).round() as usize
}

/// Computes one width per column from the widest rendered value in it.
pub fn column_widths(rows: &[Vec<CellValue>], width: usize) -> Vec<f64> {
    let mut widest = vec![0usize; width];
    for row in rows {
        for (col, cell) in row.iter().enumerate().take(width) {
            widest[col] = widest[col].max(display_width(&cell.render()));
        }
    }
    widest
        .into_iter()
        .map(|chars| ((chars + COLUMN_PADDING) as f64).min(MAX_COLUMN_WIDTH))
        .collect()
}
