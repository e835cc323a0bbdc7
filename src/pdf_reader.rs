use std::collections::BTreeMap;
use std::path::Path;

use encoding_rs::{BIG5, UTF_16BE};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::ExtractError;
use crate::model::RawTable;
use crate::source::{Page, PageSource};
use crate::table_parse::split_line_into_cells;

fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split('\u{000C}')
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

fn looks_decoding_broken(text: &str) -> bool {
    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let total = text.chars().count();
    if total == 0 {
        return false;
    }

    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();

    replacement * 8 > total || control * 5 > total
}

fn decode_pdf_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&decoded) {
        return decoded;
    }

    if bytes.starts_with(&[0xFE, 0xFF]) || bytes.starts_with(&[0xFF, 0xFE]) {
        let bytes = if bytes.len() > 2 { &bytes[2..] } else { bytes };
        let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(bytes);
        if !had_errors && !utf16.is_empty() {
            return utf16.into_owned();
        }
    }

    if let Some(name) = encoding {
        let lower = name.to_ascii_lowercase();

        if lower.contains("utf16")
            || lower.contains("ucs2")
            || lower.contains("identity-h")
            || lower.contains("unicode")
        {
            let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(bytes);
            if !had_errors && !utf16.is_empty() {
                return utf16.into_owned();
            }
        }

        if lower.contains("big5") || lower.contains("b5") || lower.contains("eten") {
            let (big5, _, had_errors) = BIG5.decode(bytes);
            if !had_errors && !big5.is_empty() {
                return big5.into_owned();
            }
        }
    }

    String::from_utf8_lossy(bytes).to_string()
}

/// Prefers text that keeps column gaps, then text with more distinct lines.
fn extraction_quality_score(text: &str) -> i64 {
    if text.trim().is_empty() {
        return i64::MIN / 4;
    }

    let mut non_empty_lines = 0_i64;
    let mut multi_cell_lines = 0_i64;
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        non_empty_lines += 1;
        if split_line_into_cells(line).len() >= 2 {
            multi_cell_lines += 1;
        }
    }

    let broken_penalty = if looks_decoding_broken(text) { 800 } else { 0 };
    multi_cell_lines * 50 + non_empty_lines - broken_penalty
}

fn choose_best_text(candidates: Vec<String>) -> Option<String> {
    candidates
        .into_iter()
        .filter(|text| !text.trim().is_empty())
        .max_by_key(|text| extraction_quality_score(text))
}

fn page_read_error(page: u32, reason: impl ToString) -> ExtractError {
    ExtractError::PageRead {
        page: page as usize,
        reason: reason.to_string(),
    }
}

fn extract_text_from_page_content(
    document: &Document,
    page_no: u32,
    page_id: ObjectId,
) -> Result<Option<String>, ExtractError> {
    fn collect_text(text: &mut String, encoding: Option<&str>, operands: &[Object]) {
        for operand in operands {
            match operand {
                Object::String(bytes, _) => {
                    text.push_str(&decode_pdf_bytes(encoding, bytes));
                }
                Object::Array(items) => {
                    collect_text(text, encoding, items);
                    text.push(' ');
                }
                Object::Integer(value) => {
                    if *value < -100 {
                        text.push(' ');
                    }
                }
                _ => {}
            }
        }
    }

    let raw_content = document
        .get_page_content(page_id)
        .map_err(|error| page_read_error(page_no, error))?;
    let content = Content::decode(&raw_content).map_err(|error| page_read_error(page_no, error))?;
    let encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect::<BTreeMap<Vec<u8>, &str>>();

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_encoding = None;
    for operation in content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                if let Some(font_name) = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                {
                    current_encoding = encodings.get(font_name).copied();
                }
            }
            "Tj" | "TJ" | "'" | "\"" => {
                collect_text(&mut current, current_encoding, &operation.operands);
            }
            "T*" | "Td" | "TD" | "ET" => {
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
            }
            _ => {}
        }
    }

    if !current.trim().is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        Ok(None)
    } else {
        Ok(Some(lines.join("\n")))
    }
}

/// Groups consecutive lines that split into two or more cells on column
/// gaps. Runs of at least two such lines form a table.
fn detect_tables_in_text(text: &str) -> Vec<RawTable> {
    let mut tables = Vec::new();
    let mut current_rows: RawTable = Vec::new();

    let flush_current = |rows: &mut RawTable, tables: &mut Vec<RawTable>| {
        if rows.len() >= 2 {
            tables.push(std::mem::take(rows));
        } else {
            rows.clear();
        }
    };

    for line in text.lines() {
        let cells = split_line_into_cells(line);
        if cells.len() >= 2 {
            current_rows.push(cells.into_iter().map(Some).collect());
        } else {
            flush_current(&mut current_rows, &mut tables);
        }
    }

    flush_current(&mut current_rows, &mut tables);
    tables
}

/// A PDF loaded with lopdf, exposing its pages to the table extractor.
pub struct PdfDocument {
    document: Document,
    pages: Vec<(u32, ObjectId)>,
    extracted_pages: Option<Vec<String>>,
}

impl PdfDocument {
    pub fn open(input_pdf: &Path) -> Result<Self, ExtractError> {
        let bytes = std::fs::read(input_pdf)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(input_pdf: &[u8]) -> Result<Self, ExtractError> {
        let document = Document::load_mem(input_pdf)?;
        let pages = document.get_pages().into_iter().collect::<Vec<_>>();

        let extracted_pages = match pdf_extract::extract_text_from_mem(input_pdf) {
            Ok(text) => {
                let split = split_text_into_pages(&text);
                (split.len() == pages.len()).then_some(split)
            }
            Err(error) => {
                debug!(%error, "pdf-extract could not read the document");
                None
            }
        };

        Ok(Self {
            document,
            pages,
            extracted_pages,
        })
    }

    fn page_text(&self, index: usize) -> Result<Option<String>, ExtractError> {
        let (page_no, page_id) = self.pages[index];

        let mut candidates = Vec::new();
        if let Some(text) = self
            .extracted_pages
            .as_ref()
            .and_then(|pages| pages.get(index).cloned())
        {
            candidates.push(text);
        }
        if let Some(text) = extract_text_from_page_content(&self.document, page_no, page_id)? {
            candidates.push(text);
        }
        if let Ok(text) = self.document.extract_text(&[page_no]) {
            candidates.push(text);
        }

        Ok(choose_best_text(candidates))
    }
}

impl PageSource for PdfDocument {
    type Page<'a> = PdfPage;

    fn total_pages(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<Self::Page<'_>, ExtractError> {
        if index >= self.pages.len() {
            return Err(ExtractError::PageOutOfRange {
                index,
                total: self.pages.len(),
            });
        }

        Ok(PdfPage {
            text: self.page_text(index)?,
        })
    }
}

/// Text of one PDF page, read once when the page is opened.
#[derive(Debug, Clone)]
pub struct PdfPage {
    text: Option<String>,
}

impl Page for PdfPage {
    fn extract_structured_tables(&self) -> Result<Vec<RawTable>, ExtractError> {
        Ok(self
            .text
            .as_deref()
            .map(detect_tables_in_text)
            .unwrap_or_default())
    }

    fn extract_plain_text(&self) -> Result<Option<String>, ExtractError> {
        Ok(self.text.clone())
    }
}
