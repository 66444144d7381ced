use std::path::PathBuf;

use clap::Parser;
use sheet_cleanup::clean::{CleanupOptions, DEFAULT_PLACEHOLDER};
use sheet_cleanup::report::{self, CleanupJob, DEFAULT_INPUT};
use sheet_cleanup::{Result, ToolError};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose)?;
    let job = cli.into_job();
    let stats = report::run(&job)?;
    info!(
        output = %job.output.display(),
        filled = stats.cells_filled,
        "done"
    );
    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_directive = if verbose {
        "sheet_cleanup=debug"
    } else {
        "sheet_cleanup=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Fill blank cells, style the header and resize columns of a spreadsheet."
)]
struct Cli {
    /// Input workbook or CSV file.
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Output file path. Defaults to `<input>_cleaned.xlsx` next to the input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worksheet to clean instead of the first one.
    #[arg(long)]
    sheet: Option<String>,

    /// Text written into empty cells.
    #[arg(long, default_value = DEFAULT_PLACEHOLDER)]
    placeholder: String,

    /// Strip leading and trailing whitespace from text cells.
    #[arg(long)]
    trim: bool,

    /// Remove rows and columns without any value.
    #[arg(long)]
    drop_empty: bool,

    /// Remove duplicate data rows.
    #[arg(long)]
    dedupe: bool,

    /// Convert text dates in date-like columns into date cells.
    #[arg(long)]
    standardize_dates: bool,

    /// Convert mostly-numeric text columns (`1,200`, `$5`, `40%`) into numbers.
    #[arg(long)]
    coerce_numbers: bool,

    /// Do not highlight cells that received the placeholder.
    #[arg(long)]
    no_highlight: bool,

    /// Add a summary sheet with cleanup statistics.
    #[arg(long)]
    summary: bool,

    /// Also write the cleanup statistics as JSON to this path.
    #[arg(long)]
    stats_json: Option<PathBuf>,

    /// Append the current time to the default output name.
    #[arg(long)]
    timestamp: bool,

    /// Field delimiter for CSV input.
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_job(self) -> CleanupJob {
        let output = self
            .output
            .unwrap_or_else(|| report::default_output_path(&self.input, self.timestamp));
        CleanupJob {
            input: self.input,
            output,
            sheet: self.sheet,
            delimiter: self.delimiter,
            options: CleanupOptions {
                placeholder: self.placeholder,
                trim_whitespace: self.trim,
                drop_empty: self.drop_empty,
                drop_duplicates: self.dedupe,
                standardize_dates: self.standardize_dates,
                coerce_numbers: self.coerce_numbers,
            },
            highlight_placeholders: !self.no_highlight,
            include_summary: self.summary,
            stats_json: self.stats_json,
        }
    }
}

fn parse_delimiter(value: &str) -> std::result::Result<u8, String> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(format!("delimiter must be a single ASCII character, got '{value}'")),
    }
}
