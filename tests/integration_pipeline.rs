mod common;

use std::process::Command;

use calamine::{Reader, Xlsx, open_workbook};
use pdftab::{
    ExtractError, ExtractOptions, NamedTable, PageRange, PageSource, PdfDocument, TracingProgress,
    extract_pdf_tables, extract_tables,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const TABLE_PAGE: &[&str] = &["Name  Age  Score", "Alice  30  98", "Bob  22  87"];
const PROSE_PAGE: &[&str] = &["Quarterly summary"];

#[test]
fn column_aligned_page_becomes_structured_table() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("single.pdf");
    common::write_pdf(&input, &[TABLE_PAGE]).expect("PDF fixture should be created");

    let result =
        extract_pdf_tables(&input, &ExtractOptions::default()).expect("extraction should succeed");

    assert_eq!(result.len(), 1);
    let table = &result[0];
    assert_eq!(table.name(), "Page_1_Table_1");
    assert_eq!(table.header(), ["Name", "Age", "Score"]);
    assert_eq!(table.rows()[0], vec!["Alice", "30", "98"]);
    assert_eq!(table.rows()[1], vec!["Bob", "22", "87"]);
}

#[test]
fn prose_page_falls_back_to_text_heuristic() {
    let bytes = common::pdf_bytes(&[TABLE_PAGE, PROSE_PAGE]).expect("PDF fixture should be built");
    let document = PdfDocument::from_bytes(&bytes).expect("PDF should load");

    let result = extract_tables(&document, &ExtractOptions::default(), &TracingProgress)
        .expect("extraction should succeed");

    let names = result.iter().map(NamedTable::name).collect::<Vec<_>>();
    assert_eq!(names, vec!["Page_1_Table_1", "Page_2_Text"]);
    assert_eq!(result[1].header(), ["col_1", "col_2"]);
    assert_eq!(result[1].rows(), [vec!["Quarterly", "summary"]]);
}

#[test]
fn page_range_selects_single_page() {
    let bytes = common::pdf_bytes(&[PROSE_PAGE, TABLE_PAGE, PROSE_PAGE, PROSE_PAGE, PROSE_PAGE])
        .expect("PDF fixture should be built");
    let document = PdfDocument::from_bytes(&bytes).expect("PDF should load");
    assert_eq!(document.total_pages(), 5);

    let options = ExtractOptions {
        pages: PageRange::new(Some(2), Some(2)),
        ..ExtractOptions::default()
    };
    let result =
        extract_tables(&document, &options, &TracingProgress).expect("extraction should succeed");

    let names = result.iter().map(NamedTable::name).collect::<Vec<_>>();
    assert_eq!(names, vec!["Page_2_Table_1"]);
}

#[test]
fn blank_pages_yield_empty_result() {
    let bytes = common::pdf_bytes(&[&[], &[]]).expect("PDF fixture should be built");
    let document = PdfDocument::from_bytes(&bytes).expect("PDF should load");

    let result = extract_tables(&document, &ExtractOptions::default(), &TracingProgress)
        .expect("extraction should succeed");

    assert!(result.is_empty());
}

#[test]
fn every_table_is_rectangular_and_runs_are_deterministic() {
    let bytes = common::pdf_bytes(&[
        &["Item  Qty", "Pen  3  extra", "Book"],
        &["k v", "1 2 3", "x"],
    ])
    .expect("PDF fixture should be built");
    let document = PdfDocument::from_bytes(&bytes).expect("PDF should load");

    let first = extract_tables(&document, &ExtractOptions::default(), &TracingProgress)
        .expect("extraction should succeed");
    let second = extract_tables(&document, &ExtractOptions::default(), &TracingProgress)
        .expect("extraction should succeed");

    assert_eq!(first, second);
    assert!(!first.is_empty());
    for table in &first {
        assert!(
            table.rows().iter().all(|row| row.len() == table.header().len()),
            "ragged table: {table:?}"
        );
    }
}

#[test]
fn corrupt_input_is_an_extraction_error() {
    let err = PdfDocument::from_bytes(b"definitely not a pdf")
        .err()
        .expect("garbage should not load");
    assert!(matches!(err, ExtractError::PdfLoad(_)));
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = tempdir().expect("tempdir should be created");
    let err = extract_pdf_tables(&dir.path().join("absent.pdf"), &ExtractOptions::default())
        .expect_err("missing file should fail");
    assert!(matches!(err, ExtractError::Io(_)));
}

#[test]
fn cli_exits_with_code_2_when_no_tables() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("blank.pdf");
    common::write_pdf(&input, &[&[]]).expect("PDF fixture should be created");

    let status = Command::new(env!("CARGO_BIN_EXE_pdf2table"))
        .args([
            "extract",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &dir.path().to_string_lossy(),
            "--no-backup",
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(2));
}

#[test]
fn cli_writes_workbook_and_backup() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("report.pdf");
    let output_dir = dir.path().join("out");
    std::fs::create_dir(&output_dir).expect("output dir should be created");
    common::write_pdf(&input, &[TABLE_PAGE, PROSE_PAGE]).expect("PDF fixture should be created");

    let status = Command::new(env!("CARGO_BIN_EXE_pdf2table"))
        .args([
            "extract",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output_dir.to_string_lossy(),
            "--format",
            "xlsx",
            "--no-timestamp",
        ])
        .status()
        .expect("CLI should run");
    assert_eq!(status.code(), Some(0));

    let backups = std::fs::read_dir(dir.path().join("backup"))
        .expect("backup dir should exist")
        .count();
    assert_eq!(backups, 1);

    let mut workbook: Xlsx<_> =
        open_workbook(output_dir.join("report.xlsx")).expect("workbook should open");
    assert_eq!(workbook.sheet_names(), vec!["Page_1_Table_1", "Page_2_Text"]);
    let range = workbook
        .worksheet_range("Page_1_Table_1")
        .expect("sheet should be readable");
    let first_row = range
        .rows()
        .next()
        .expect("sheet should have rows")
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    assert_eq!(first_row, vec!["Name", "Age", "Score"]);
}

#[test]
fn cli_rejects_non_numeric_page_bounds() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("report.pdf");
    common::write_pdf(&input, &[TABLE_PAGE]).expect("PDF fixture should be created");

    let output = Command::new(env!("CARGO_BIN_EXE_pdf2table"))
        .args([
            "extract",
            "-i",
            &input.to_string_lossy(),
            "--start-page",
            "two",
        ])
        .output()
        .expect("CLI should run");

    assert!(!output.status.success());
    assert_eq!(std::fs::read_dir(dir.path()).expect("dir is readable").count(), 1);
}

#[test]
fn cli_zero_end_page_reads_whole_document() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("report.pdf");
    let output_dir = dir.path().join("out");
    std::fs::create_dir(&output_dir).expect("output dir should be created");
    common::write_pdf(&input, &[PROSE_PAGE, TABLE_PAGE]).expect("PDF fixture should be created");

    let status = Command::new(env!("CARGO_BIN_EXE_pdf2table"))
        .args([
            "extract",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output_dir.to_string_lossy(),
            "--end-page",
            "0",
            "--no-timestamp",
            "--no-backup",
        ])
        .status()
        .expect("CLI should run");
    assert_eq!(status.code(), Some(0));

    let mut written = std::fs::read_dir(&output_dir)
        .expect("output dir is readable")
        .map(|entry| {
            entry
                .expect("entry is readable")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect::<Vec<_>>();
    written.sort();
    assert_eq!(
        written,
        vec!["report_Page_1_Text.csv", "report_Page_2_Table_1.csv"]
    );
}

#[test]
fn cli_help_points_library_callers_to_cancel_token() {
    let output = Command::new(env!("CARGO_BIN_EXE_pdf2table"))
        .args(["extract", "--help"])
        .output()
        .expect("CLI should run");

    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    assert!(help.contains("CancelToken"), "help text: {help}");
}
