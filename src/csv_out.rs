use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::info;

use crate::error::ExportError;
use crate::model::{ExtractionResult, NamedTable};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn write_table_csv(path: &Path, table: &NamedTable) -> Result<(), ExportError> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(UTF8_BOM)?;

    let mut writer = WriterBuilder::new().from_writer(file);
    for record in table.records() {
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// File names for a delimited export, in result order.
///
/// A single table is written as `<base><suffix>.csv`; several tables each get
/// `<base>_<table name><suffix>.csv`.
#[must_use]
pub fn delimited_file_names(
    result: &ExtractionResult,
    base_name: &str,
    timestamp_suffix: &str,
) -> Vec<String> {
    if result.len() == 1 {
        return vec![format!("{base_name}{timestamp_suffix}.csv")];
    }

    result
        .iter()
        .map(|table| format!("{base_name}_{}{timestamp_suffix}.csv", table.name()))
        .collect()
}

/// Writes each table as a BOM-prefixed UTF-8 CSV file under `output_dir`.
///
/// Files are written one by one; when a write fails, files already written
/// stay on disk.
pub fn export_delimited(
    result: &ExtractionResult,
    output_dir: &Path,
    base_name: &str,
    timestamp_suffix: &str,
) -> Result<Vec<PathBuf>, ExportError> {
    let names = delimited_file_names(result, base_name, timestamp_suffix);

    let mut written = Vec::with_capacity(names.len());
    for (table, name) in result.iter().zip(names) {
        let path = output_dir.join(name);
        write_table_csv(&path, table)?;
        info!(path = %path.display(), rows = table.row_count(), "CSV written");
        written.push(path);
    }

    Ok(written)
}
