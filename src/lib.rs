mod backup;
mod csv_out;
mod error;
mod extract;
mod model;
mod options;
mod pdf_reader;
mod progress;
mod source;
mod table_parse;
mod text_table;
mod xlsx_out;

use std::path::{Path, PathBuf};

pub use backup::{create_backup, timestamp_suffix};
pub use csv_out::{delimited_file_names, export_delimited};
pub use error::{ExportError, ExtractError};
pub use extract::extract_tables;
pub use model::{ExtractionResult, NamedTable, RawTable, TableBody};
pub use options::{CancelToken, ExtractOptions, OutputFormat, PageRange};
pub use pdf_reader::{PdfDocument, PdfPage};
pub use progress::{ProgressSink, TracingProgress};
pub use source::{Page, PageSource};
pub use text_table::parse_text_table;
pub use xlsx_out::{MAX_SHEET_NAME_CHARS, export_workbook, sheet_name};

/// Loads a PDF from disk and extracts its tables, logging progress via `tracing`.
pub fn extract_pdf_tables(
    input_pdf: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionResult, ExtractError> {
    let document = PdfDocument::open(input_pdf)?;
    extract_tables(&document, options, &TracingProgress)
}

/// Writes `result` in the requested format and returns the files written.
pub fn export_tables(
    result: &ExtractionResult,
    format: OutputFormat,
    output_dir: &Path,
    base_name: &str,
    timestamp_suffix: &str,
) -> Result<Vec<PathBuf>, ExportError> {
    match format {
        OutputFormat::Csv => export_delimited(result, output_dir, base_name, timestamp_suffix),
        OutputFormat::Xlsx => {
            export_workbook(result, output_dir, base_name, timestamp_suffix).map(|path| vec![path])
        }
    }
}
