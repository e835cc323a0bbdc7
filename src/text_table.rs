use crate::model::TableBody;
use crate::table_parse::{pad_rows, whitespace_tokens};

/// Rebuilds a table from unstructured page text.
///
/// Every non-blank line becomes a row of whitespace-separated tokens, padded
/// to the widest row. With two or more rows the first one is the header. A
/// lone row is kept as data under synthesized `col_1..col_N` labels.
#[must_use]
pub fn parse_text_table(text: &str) -> Option<TableBody> {
    let mut rows = text
        .lines()
        .map(whitespace_tokens)
        .filter(|tokens| !tokens.is_empty())
        .collect::<Vec<_>>();

    let max_cols = rows.iter().map(Vec::len).max()?;
    pad_rows(&mut rows, max_cols);

    if rows.len() == 1 {
        return Some(TableBody {
            header: (1..=max_cols).map(|index| format!("col_{index}")).collect(),
            rows,
        });
    }

    let mut rows = rows.into_iter();
    let header = rows.next()?;
    Some(TableBody {
        header,
        rows: rows.collect(),
    })
}
