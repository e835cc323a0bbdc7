use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("failed to read page {page}: {reason}")]
    PageRead { page: usize, reason: String },

    #[error("page index {index} is out of range (document has {total} pages)")]
    PageOutOfRange { index: usize, total: usize },

    #[error("extraction was cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook write error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("no tables to export")]
    NoTables,
}
