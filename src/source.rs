use crate::error::ExtractError;
use crate::model::RawTable;

/// A single page of a document, as seen by the table extractor.
pub trait Page {
    /// Tables the backend can recognise on this page, in reading order.
    fn extract_structured_tables(&self) -> Result<Vec<RawTable>, ExtractError>;

    /// The page's text, or `None` when the page has no text layer.
    fn extract_plain_text(&self) -> Result<Option<String>, ExtractError>;
}

impl<P: Page + ?Sized> Page for &P {
    fn extract_structured_tables(&self) -> Result<Vec<RawTable>, ExtractError> {
        (**self).extract_structured_tables()
    }

    fn extract_plain_text(&self) -> Result<Option<String>, ExtractError> {
        (**self).extract_plain_text()
    }
}

/// A fully loaded document exposing its pages by 0-based index.
pub trait PageSource {
    type Page<'a>: Page
    where
        Self: 'a;

    fn total_pages(&self) -> usize;

    /// Returns the page at `index`; `index` must be below `total_pages()`.
    fn page(&self, index: usize) -> Result<Self::Page<'_>, ExtractError>;
}
