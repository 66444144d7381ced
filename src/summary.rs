use crate::clean::CleanupStats;
use crate::model::CellValue;

/// Name of the worksheet holding the summary.
pub const SUMMARY_SHEET: &str = "Summary";

/// Table materialised as the summary worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub rows: Vec<Vec<CellValue>>,
    /// Indices of rows styled as headers.
    pub header_rows: Vec<usize>,
}

impl SummaryTable {
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Lays out the before/after metrics and the per-column profile.
pub fn build_summary(stats: &CleanupStats) -> SummaryTable {
    let mut rows = Vec::new();
    let mut header_rows = Vec::new();

    header_rows.push(rows.len());
    rows.push(texts(&["Metric", "Original", "Cleaned", "Change"]));

    rows.push(metric_row(
        "Total Rows",
        stats.original.rows,
        stats.cleaned.rows,
    ));
    rows.push(metric_row(
        "Total Columns",
        stats.original.columns,
        stats.cleaned.columns,
    ));
    rows.push(metric_row("Empty Rows Removed", stats.empty_rows_removed, 0));
    rows.push(metric_row(
        "Empty Columns Removed",
        stats.empty_columns_removed,
        0,
    ));
    rows.push(metric_row(
        "Duplicate Rows Removed",
        stats.duplicate_rows_removed,
        0,
    ));
    rows.push(metric_row(
        "Total Empty Cells",
        stats.original.empty_cells,
        stats.cleaned.empty_cells,
    ));
    rows.push(vec![
        text("Cells Trimmed"),
        CellValue::Empty,
        number(stats.cells_trimmed),
        CellValue::Empty,
    ]);
    rows.push(vec![
        text("Cells Filled"),
        CellValue::Empty,
        number(stats.cells_filled),
        CellValue::Empty,
    ]);

    rows.push(Vec::new());

    header_rows.push(rows.len());
    rows.push(texts(&["Column Statistics"]));
    header_rows.push(rows.len());
    rows.push(texts(&[
        "Column Name",
        "Unique Values",
        "Filled Cells",
        "Data Type",
    ]));

    for column in &stats.columns {
        rows.push(vec![
            text(&column.name),
            number(column.unique_values),
            number(column.filled_cells),
            text(column.kind.as_str()),
        ]);
    }

    SummaryTable { rows, header_rows }
}

fn metric_row(label: &str, original: usize, cleaned: usize) -> Vec<CellValue> {
    vec![
        text(label),
        number(original),
        number(cleaned),
        CellValue::Number(cleaned as f64 - original as f64),
    ]
}

fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_string())
}

fn texts(values: &[&str]) -> Vec<CellValue> {
    values.iter().map(|value| text(value)).collect()
}

fn number(value: usize) -> CellValue {
    CellValue::Number(value as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::{ColumnKind, ColumnProfile, TableShape};

    #[test]
    fn summary_lists_metrics_and_columns() {
        let stats = CleanupStats {
            original: TableShape {
                rows: 5,
                columns: 3,
                empty_cells: 4,
            },
            cleaned: TableShape {
                rows: 4,
                columns: 3,
                empty_cells: 2,
            },
            duplicate_rows_removed: 1,
            cells_filled: 2,
            columns: vec![ColumnProfile {
                name: "Name".into(),
                unique_values: 3,
                filled_cells: 1,
                kind: ColumnKind::Text,
            }],
            ..CleanupStats::default()
        };

        let summary = build_summary(&stats);

        assert_eq!(summary.header_rows, vec![0, 10, 11]);
        assert_eq!(summary.rows[1][3], CellValue::Number(-1.0));
        assert_eq!(summary.rows[5][1], CellValue::Number(1.0));
        assert_eq!(summary.rows[12][0], CellValue::Text("Name".into()));
        assert_eq!(summary.rows[12][3], CellValue::Text("text".into()));
        assert_eq!(summary.width(), 4);
    }
}
