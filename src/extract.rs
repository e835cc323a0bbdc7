use tracing::debug;

use crate::error::ExtractError;
use crate::model::{ExtractionResult, NamedTable, RawTable};
use crate::options::ExtractOptions;
use crate::progress::ProgressSink;
use crate::source::{Page, PageSource};
use crate::text_table::parse_text_table;

fn normalize_cells(raw: RawTable) -> Vec<Vec<String>> {
    raw.into_iter()
        .map(|cells| cells.into_iter().map(Option::unwrap_or_default).collect())
        .collect()
}

/// Turns one raw table into a named table. The first row is always the
/// header, so a single-row table has no data rows.
fn structured_table(page_number: usize, table_index: usize, raw: RawTable) -> Option<NamedTable> {
    let mut rows = normalize_cells(raw).into_iter();
    let header = rows.next()?;
    Some(NamedTable::new(
        format!("Page_{page_number}_Table_{table_index}"),
        header,
        rows.collect(),
    ))
}

fn extract_page<P: Page>(
    page: &P,
    page_number: usize,
    progress: &dyn ProgressSink,
) -> Result<Vec<NamedTable>, ExtractError> {
    let tables = page
        .extract_structured_tables()?
        .into_iter()
        .enumerate()
        .filter_map(|(index, raw)| structured_table(page_number, index + 1, raw))
        .inspect(|table| {
            progress.report(&format!(
                "table found: page {page_number}, {} ({} rows)",
                table.name(),
                table.row_count()
            ));
        })
        .collect::<Vec<_>>();

    if !tables.is_empty() {
        return Ok(tables);
    }

    let Some(text) = page.extract_plain_text()? else {
        debug!(page = page_number, "page has neither tables nor text");
        return Ok(Vec::new());
    };

    let Some(body) = parse_text_table(&text) else {
        debug!(page = page_number, "page text is blank");
        return Ok(Vec::new());
    };

    let table = NamedTable::from_body(format!("Page_{page_number}_Text"), body);
    progress.report(&format!(
        "text extracted: page {page_number} ({} rows)",
        table.row_count()
    ));
    Ok(vec![table])
}

/// Extracts every table in the selected page range.
///
/// Structured tables are tried first on each page; only a page without any
/// falls back to the plain-text heuristic. Raw tables with no rows do not
/// count, so a page whose backend returns only empty tables still falls back,
/// although the empty tables keep their slot in the `Table_<i>` numbering.
/// Any page source failure or a cancellation aborts the whole run.
pub fn extract_tables<S: PageSource + ?Sized>(
    source: &S,
    options: &ExtractOptions,
    progress: &dyn ProgressSink,
) -> Result<ExtractionResult, ExtractError> {
    let total_pages = source.total_pages();
    progress.report(&format!("total pages: {total_pages}"));

    let mut indices = options.pages.indices(total_pages);
    progress.report(&format!(
        "processing pages {} - {}",
        indices.start + 1,
        indices.end
    ));

    let tables = indices.try_fold(Vec::new(), |mut tables, index| {
        if options
            .cancel
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
        {
            return Err(ExtractError::Cancelled);
        }

        let page_number = index + 1;
        progress.report(&format!("processing page {page_number}..."));
        let page = source.page(index)?;
        tables.extend(extract_page(&page, page_number, progress)?);
        Ok(tables)
    })?;

    Ok(ExtractionResult::new(tables))
}
