use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info, instrument};

use crate::clean::{CleanupOptions, CleanupStats, clean_sheet};
use crate::error::{Result, ToolError};
use crate::io::{self, excel_write};
use crate::style::ReportStyle;
use crate::summary::build_summary;

/// Input file read when none is given on the command line.
pub const DEFAULT_INPUT: &str = "data.xlsx";

/// Everything needed to produce one cleaned report.
#[derive(Debug, Clone)]
pub struct CleanupJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Worksheet to clean; the first one when `None`.
    pub sheet: Option<String>,
    /// Field delimiter for CSV input.
    pub delimiter: u8,
    pub options: CleanupOptions,
    pub highlight_placeholders: bool,
    pub include_summary: bool,
    /// Optional path receiving the statistics as pretty-printed JSON.
    pub stats_json: Option<PathBuf>,
}

impl CleanupJob {
    /// Job with default settings writing next to the input.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let output = default_output_path(&input, false);
        Self {
            input,
            output,
            sheet: None,
            delimiter: b',',
            options: CleanupOptions::default(),
            highlight_placeholders: true,
            include_summary: false,
            stats_json: None,
        }
    }

    fn style(&self) -> ReportStyle {
        if self.highlight_placeholders {
            ReportStyle::default()
        } else {
            ReportStyle::without_highlight()
        }
    }
}

/// Reads the input, runs the cleanup pass and writes the cleaned report.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %job.input.display(), output = %job.output.display())
)]
pub fn run(job: &CleanupJob) -> Result<CleanupStats> {
    if !job.input.exists() {
        return Err(ToolError::MissingInput(job.input.clone()));
    }

    let sheet = io::read_input(&job.input, job.sheet.as_deref(), job.delimiter)?;
    info!(
        sheet = %sheet.name,
        rows = sheet.height(),
        columns = sheet.width(),
        "loaded input sheet"
    );

    let cleaned = clean_sheet(sheet, &job.options)?;
    info!(
        rows = cleaned.sheet.height(),
        columns = cleaned.sheet.width(),
        filled = cleaned.stats.cells_filled,
        "cleanup complete"
    );

    let summary = job.include_summary.then(|| build_summary(&cleaned.stats));
    excel_write::write_report(&job.output, &cleaned, summary.as_ref(), &job.style())?;
    info!("cleaned report written");

    if let Some(path) = &job.stats_json {
        let json = serde_json::to_string_pretty(&cleaned.stats)?;
        fs::write(path, json)?;
        debug!(path = %path.display(), "statistics written");
    }

    Ok(cleaned.stats)
}

/// Derives `<stem>_cleaned.xlsx` beside the input, optionally suffixed with
/// the current local time.
pub fn default_output_path(input: &Path, timestamp: bool) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("data");
    let file_name = if timestamp {
        format!(
            "{stem}_cleaned_{}.xlsx",
            Local::now().format("%Y%m%d_%H%M%S")
        )
    } else {
        format!("{stem}_cleaned.xlsx")
    };
    input.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_defaults_to_cleaned_suffix() {
        assert_eq!(
            default_output_path(Path::new("data.xlsx"), false),
            PathBuf::from("data_cleaned.xlsx")
        );
        assert_eq!(
            default_output_path(Path::new("in/raw.csv"), false),
            PathBuf::from("in/raw_cleaned.xlsx")
        );
    }

    #[test]
    fn timestamped_output_keeps_stem_and_extension() {
        let path = default_output_path(Path::new("data.xlsx"), true);
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("data_cleaned_"));
        assert!(name.ends_with(".xlsx"));
        assert_eq!(name.len(), "data_cleaned_20240101_120000.xlsx".len());
    }

    #[test]
    fn missing_input_is_reported() {
        let job = CleanupJob::new("does-not-exist.xlsx");
        assert!(matches!(run(&job), Err(ToolError::MissingInput(_))));
    }
}
