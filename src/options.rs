use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 1-based, inclusive page bounds. Missing bounds mean "from the first page"
/// and "to the last page".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRange {
    pub start: Option<u32>,
    pub end: Option<u32>,
}

impl PageRange {
    #[must_use]
    pub fn new(start: Option<u32>, end: Option<u32>) -> Self {
        Self { start, end }
    }

    /// The 0-based page indices to process in a document of `total_pages`.
    ///
    /// Bounds outside the document are clamped; an inverted range is empty.
    /// A bound of 0 counts as missing.
    #[must_use]
    pub fn indices(&self, total_pages: usize) -> Range<usize> {
        let start = self
            .start
            .map_or(0, |page| usize::try_from(page.saturating_sub(1)).unwrap_or(usize::MAX));
        let end = self
            .end
            .filter(|&page| page > 0)
            .map_or(total_pages, |page| usize::try_from(page).unwrap_or(usize::MAX))
            .min(total_pages);
        start..end.max(start)
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let given = |bound: Option<u32>| bound.filter(|&page| page > 0);
        match (given(self.start), given(self.end)) {
            (None, None) => write!(f, "all pages"),
            (Some(start), None) => write!(f, "{start}-end"),
            (None, Some(end)) => write!(f, "1-{end}"),
            (Some(start), Some(end)) => write!(f, "{start}-{end}"),
        }
    }
}

/// Cloneable stop flag checked between pages.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub pages: PageRange,
    pub cancel: Option<CancelToken>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Xlsx,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            other => Err(format!("unknown output format '{other}', expected csv or xlsx")),
        }
    }
}
