use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::info;

const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `_YYYYMMDD_HHMMSS`, appended to output file names before the extension.
#[must_use]
pub fn timestamp_suffix(now: NaiveDateTime) -> String {
    format!("_{}", now.format(STAMP_FORMAT))
}

/// Copies `input` to `<input dir>/backup/<stem>_backup_<stamp><.ext>`.
pub fn create_backup(input: &Path, now: NaiveDateTime) -> io::Result<PathBuf> {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let backup_dir = parent.join("backup");
    std::fs::create_dir_all(&backup_dir)?;

    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = input
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let backup_path = backup_dir.join(format!(
        "{stem}_backup_{}{extension}",
        now.format(STAMP_FORMAT)
    ));

    std::fs::copy(input, &backup_path)?;
    info!(path = %backup_path.display(), "backup created");
    Ok(backup_path)
}
