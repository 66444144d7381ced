pub mod convert;

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::model::{CellValue, Sheet};

/// Text written into cells that were empty in the source sheet.
pub const DEFAULT_PLACEHOLDER: &str = "N/A";

/// Switches controlling the cleanup pass.
///
/// Only blank filling is always performed. The remaining steps alter the
/// shape or the values of the sheet and must be requested explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupOptions {
    /// Text used to fill empty cells.
    pub placeholder: String,
    /// Strip surrounding whitespace from text cells.
    pub trim_whitespace: bool,
    /// Remove data rows and columns that hold no value at all.
    pub drop_empty: bool,
    /// Remove data rows identical to an earlier one.
    pub drop_duplicates: bool,
    /// Turn text dates in date-like columns into date cells.
    pub standardize_dates: bool,
    /// Turn mostly-numeric text columns into number cells.
    pub coerce_numbers: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            trim_whitespace: false,
            drop_empty: false,
            drop_duplicates: false,
            standardize_dates: false,
            coerce_numbers: false,
        }
    }
}

/// Shape of the data area (rows below the header).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableShape {
    pub rows: usize,
    pub columns: usize,
    pub empty_cells: usize,
}

impl TableShape {
    fn of(sheet: &Sheet) -> Self {
        Self {
            rows: sheet.data_row_count(),
            columns: sheet.width(),
            empty_cells: sheet.empty_data_cells(),
        }
    }
}

/// Kind of values found in a column, ignoring empty cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Empty,
    Text,
    Number,
    Boolean,
    DateTime,
    Duration,
    Mixed,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Empty => "empty",
            ColumnKind::Text => "text",
            ColumnKind::Number => "number",
            ColumnKind::Boolean => "boolean",
            ColumnKind::DateTime => "datetime",
            ColumnKind::Duration => "duration",
            ColumnKind::Mixed => "mixed",
        }
    }

    fn of_cell(cell: &CellValue) -> Option<Self> {
        match cell {
            CellValue::Empty => None,
            CellValue::Text(_) | CellValue::Error(_) => Some(ColumnKind::Text),
            CellValue::Number(_) => Some(ColumnKind::Number),
            CellValue::Boolean(_) => Some(ColumnKind::Boolean),
            CellValue::DateTime(_) => Some(ColumnKind::DateTime),
            CellValue::Duration(_) => Some(ColumnKind::Duration),
        }
    }
}

/// Per-column statistics of the cleaned data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub unique_values: usize,
    pub filled_cells: usize,
    pub kind: ColumnKind,
}

/// Counters describing what the cleanup pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanupStats {
    pub original: TableShape,
    pub cleaned: TableShape,
    pub empty_rows_removed: usize,
    pub empty_columns_removed: usize,
    pub duplicate_rows_removed: usize,
    pub cells_trimmed: usize,
    pub date_columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub cells_converted: usize,
    pub cells_filled: usize,
    pub columns: Vec<ColumnProfile>,
}

/// Result of the cleanup pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSheet {
    pub sheet: Sheet,
    /// `(row, column)` grid positions that received the placeholder.
    pub filled: BTreeSet<(usize, usize)>,
    pub stats: CleanupStats,
}

impl CleanedSheet {
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.filled.contains(&(row, col))
    }
}

/// Runs the cleanup pass over `sheet`.
pub fn clean_sheet(mut sheet: Sheet, options: &CleanupOptions) -> Result<CleanedSheet> {
    let mut stats = CleanupStats {
        original: TableShape::of(&sheet),
        ..CleanupStats::default()
    };

    if options.drop_empty {
        stats.empty_rows_removed = drop_empty_rows(&mut sheet);
        stats.empty_columns_removed = drop_empty_columns(&mut sheet);
        debug!(
            rows = stats.empty_rows_removed,
            columns = stats.empty_columns_removed,
            "removed empty rows and columns"
        );
    }

    if options.trim_whitespace {
        stats.cells_trimmed = trim_whitespace(&mut sheet);
        debug!(cells = stats.cells_trimmed, "trimmed text cells");
    }

    if options.standardize_dates {
        let conversion = convert::standardize_dates(&mut sheet)?;
        debug!(columns = ?conversion.columns, cells = conversion.cells, "standardized dates");
        stats.date_columns = conversion.columns;
        stats.cells_converted += conversion.cells;
    }

    if options.drop_duplicates {
        stats.duplicate_rows_removed = drop_duplicate_rows(&mut sheet);
        debug!(rows = stats.duplicate_rows_removed, "removed duplicate rows");
    }

    if options.coerce_numbers {
        let conversion = convert::coerce_numeric_columns(&mut sheet)?;
        debug!(columns = ?conversion.columns, cells = conversion.cells, "coerced numeric columns");
        stats.numeric_columns = conversion.columns;
        stats.cells_converted += conversion.cells;
    }

    stats.cleaned = TableShape::of(&sheet);
    let kinds = column_kinds(&sheet);

    let filled = fill_blanks(&mut sheet, &options.placeholder);
    stats.cells_filled = filled.len();
    debug!(cells = stats.cells_filled, "filled empty cells");

    stats.columns = profile_columns(&sheet, &filled, &kinds);

    Ok(CleanedSheet {
        sheet,
        filled,
        stats,
    })
}

/// Replaces every empty cell, header included, with `placeholder`.
///
/// Returns the positions that were filled.
pub fn fill_blanks(sheet: &mut Sheet, placeholder: &str) -> BTreeSet<(usize, usize)> {
    let mut filled = BTreeSet::new();
    for (row_idx, row) in sheet.rows.iter_mut().enumerate() {
        for (col_idx, cell) in row.iter_mut().enumerate() {
            if cell.is_empty() {
                *cell = CellValue::Text(placeholder.to_string());
                filled.insert((row_idx, col_idx));
            }
        }
    }
    filled
}

/// Removes data rows whose cells are all empty. The header row is kept.
pub fn drop_empty_rows(sheet: &mut Sheet) -> usize {
    let before = sheet.rows.len();
    let mut index = 0usize;
    sheet.rows.retain(|row| {
        let keep = index == 0 || row.iter().any(|cell| !cell.is_empty());
        index += 1;
        keep
    });
    before - sheet.rows.len()
}

/// Removes columns whose data cells are all empty, whatever their header.
pub fn drop_empty_columns(sheet: &mut Sheet) -> usize {
    if sheet.data_row_count() == 0 {
        return 0;
    }
    let keep: Vec<bool> = (0..sheet.width())
        .map(|col| {
            sheet
                .data_rows()
                .iter()
                .any(|row| !row[col].is_empty())
        })
        .collect();
    let removed = keep.iter().filter(|kept| !**kept).count();
    if removed == 0 {
        return 0;
    }
    for row in &mut sheet.rows {
        let mut col = 0usize;
        row.retain(|_| {
            let kept = keep[col];
            col += 1;
            kept
        });
    }
    removed
}

/// Strips surrounding whitespace from text cells. Whitespace-only text
/// becomes empty. Returns the number of cells changed.
pub fn trim_whitespace(sheet: &mut Sheet) -> usize {
    let mut changed = 0usize;
    for cell in sheet.rows.iter_mut().flatten() {
        let replacement = match cell {
            CellValue::Text(value) if value.trim().len() != value.len() => {
                match value.trim() {
                    "" => CellValue::Empty,
                    trimmed => CellValue::Text(trimmed.to_string()),
                }
            }
            _ => continue,
        };
        *cell = replacement;
        changed += 1;
    }
    changed
}

/// Removes data rows equal to an earlier data row, keeping the first.
pub fn drop_duplicate_rows(sheet: &mut Sheet) -> usize {
    let before = sheet.rows.len();
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut index = 0usize;
    sheet.rows.retain(|row| {
        let is_header = index == 0;
        index += 1;
        if is_header {
            return true;
        }
        let key: Vec<String> = row.iter().map(CellValue::identity_key).collect();
        seen.insert(key)
    });
    before - sheet.rows.len()
}

fn column_kinds(sheet: &Sheet) -> Vec<ColumnKind> {
    (0..sheet.width())
        .map(|col| {
            sheet
                .data_rows()
                .iter()
                .filter_map(|row| ColumnKind::of_cell(&row[col]))
                .fold(ColumnKind::Empty, |acc, kind| match acc {
                    ColumnKind::Empty => kind,
                    current if current == kind => current,
                    _ => ColumnKind::Mixed,
                })
        })
        .collect()
}

fn profile_columns(
    sheet: &Sheet,
    filled: &BTreeSet<(usize, usize)>,
    kinds: &[ColumnKind],
) -> Vec<ColumnProfile> {
    (0..sheet.width())
        .map(|col| {
            let name = sheet
                .cell(0, col)
                .map(CellValue::render)
                .unwrap_or_default();
            let mut unique = HashSet::new();
            let mut filled_cells = 0usize;
            for (offset, row) in sheet.data_rows().iter().enumerate() {
                if filled.contains(&(offset + 1, col)) {
                    filled_cells += 1;
                } else {
                    unique.insert(row[col].identity_key());
                }
            }
            ColumnProfile {
                name,
                unique_values: unique.len(),
                filled_cells,
                kind: kinds.get(col).copied().unwrap_or(ColumnKind::Empty),
            }
        })
        .collect()
}
