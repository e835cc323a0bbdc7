use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use pdftab::{
    ExtractOptions, OutputFormat, PageRange, create_backup, export_tables, extract_pdf_tables,
    timestamp_suffix,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pdf2table",
    version,
    about = "Extract tables from PDFs into CSV files or an XLSX workbook"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract tables and write them as CSV files or one workbook.
    ///
    /// The command has no cancellation hook of its own; Ctrl-C simply kills
    /// the process. Library callers can stop a run between pages with a
    /// `CancelToken` in `ExtractOptions`.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Output format: csv or xlsx.
    #[arg(short, long, default_value = "csv")]
    format: OutputFormat,

    /// First page to read (1-based). Defaults to the first page.
    #[arg(long)]
    start_page: Option<u32>,

    /// Last page to read (1-based, inclusive). Defaults to the last page.
    #[arg(long)]
    end_page: Option<u32>,

    /// Do not append a _YYYYMMDD_HHMMSS suffix to output file names.
    #[arg(long)]
    no_timestamp: bool,

    /// Do not copy the input PDF into a backup/ directory first.
    #[arg(long)]
    no_backup: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn base_name(input: &Path) -> Result<String> {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .with_context(|| format!("cannot derive an output name from '{}'", input.display()))
}

/// Returns the number of tables written.
fn run_extract(args: &ExtractArgs) -> Result<usize> {
    if !args.input.is_file() {
        bail!("input PDF '{}' does not exist", args.input.display());
    }
    if !args.output_dir.is_dir() {
        bail!("output directory '{}' does not exist", args.output_dir.display());
    }

    let now = Local::now().naive_local();
    if !args.no_backup {
        // A failed backup is reported but does not stop the conversion.
        if let Err(error) = create_backup(&args.input, now) {
            warn!(%error, "failed to create backup");
        }
    }

    let options = ExtractOptions {
        pages: PageRange::new(args.start_page, args.end_page),
        cancel: None,
    };
    info!(pages = %options.pages, "extracting tables");
    let result = extract_pdf_tables(&args.input, &options)
        .with_context(|| format!("failed to extract tables from '{}'", args.input.display()))?;

    if result.is_empty() {
        warn!("no table data found in the PDF");
        return Ok(0);
    }

    let suffix = if args.no_timestamp {
        String::new()
    } else {
        timestamp_suffix(now)
    };
    let written = export_tables(
        &result,
        args.format,
        &args.output_dir,
        &base_name(&args.input)?,
        &suffix,
    )
    .with_context(|| format!("failed to write output to '{}'", args.output_dir.display()))?;

    for path in &written {
        info!(path = %path.display(), "output written");
    }
    info!(
        tables = result.len(),
        rows = result.row_count(),
        "conversion finished"
    );
    Ok(result.len())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Commands::Extract(args) = &cli.command;

    let default_filter = if args.verbose {
        "pdftab=debug,pdf2table=debug"
    } else {
        "pdftab=info,pdf2table=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match run_extract(args) {
        Ok(0) => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
