use std::ops::Index;

/// A table as reported by a page source: rows of nullable cells, possibly ragged.
pub type RawTable = Vec<Vec<Option<String>>>;

/// Header and data rows of a table, before it is given a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBody {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A rectangular, named table. Every row has exactly `header().len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTable {
    name: String,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl NamedTable {
    /// Builds a table, padding short rows with empty cells.
    ///
    /// Rows wider than the header are never cut: the header grows with
    /// `col_<n>` labels instead and every row is padded to the new width.
    #[must_use]
    pub fn new(name: impl Into<String>, header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut header = header;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width > header.len() {
            let start = header.len() + 1;
            header.extend((start..=width).map(|index| format!("col_{index}")));
        }

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(header.len(), String::new());
                row
            })
            .collect();

        Self {
            name: name.into(),
            header,
            rows,
        }
    }

    #[must_use]
    pub fn from_body(name: impl Into<String>, body: TableBody) -> Self {
        Self::new(name, body.header, body.rows)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Header followed by data rows, the order both exporters write them in.
    pub fn records(&self) -> impl Iterator<Item = &[String]> {
        std::iter::once(self.header.as_slice()).chain(self.rows.iter().map(Vec::as_slice))
    }
}

/// Ordered tables extracted from a page range: page order, then table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    tables: Vec<NamedTable>,
}

impl ExtractionResult {
    #[must_use]
    pub fn new(tables: Vec<NamedTable>) -> Self {
        Self { tables }
    }

    #[must_use]
    pub fn tables(&self) -> &[NamedTable] {
        &self.tables
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.tables.iter().map(NamedTable::row_count).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NamedTable> {
        self.tables.iter()
    }
}

impl Index<usize> for ExtractionResult {
    type Output = NamedTable;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tables[index]
    }
}

impl<'a> IntoIterator for &'a ExtractionResult {
    type Item = &'a NamedTable;
    type IntoIter = std::slice::Iter<'a, NamedTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}
