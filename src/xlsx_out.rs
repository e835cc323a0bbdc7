use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use quick_xml::escape::escape;
use tracing::{info, warn};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::ExportError;
use crate::model::{ExtractionResult, NamedTable};

/// Longest sheet name a workbook accepts.
pub const MAX_SHEET_NAME_CHARS: usize = 31;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const STYLES_XML: &str = concat!(
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill>"#,
    r#"<fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    r#"</styleSheet>"#,
);

/// Cuts a table name down to the first 31 characters.
#[must_use]
pub fn sheet_name(table_name: &str) -> String {
    table_name.chars().take(MAX_SHEET_NAME_CHARS).collect()
}

/// Pairs each distinct sheet name with the table it will hold.
///
/// When two table names truncate to the same sheet name, the later table
/// replaces the earlier one in the first table's position.
fn plan_sheets(result: &ExtractionResult) -> Vec<(String, &NamedTable)> {
    let mut sheets: Vec<(String, &NamedTable)> = Vec::new();
    for table in result {
        let name = sheet_name(table.name());
        if let Some(slot) = sheets.iter_mut().find(|(existing, _)| *existing == name) {
            warn!(
                sheet = %name,
                replaced = slot.1.name(),
                table = table.name(),
                "sheet name collision after truncation; later table overwrites the sheet"
            );
            slot.1 = table;
        } else {
            sheets.push((name, table));
        }
    }
    sheets
}

/// `0 -> A`, `25 -> Z`, `26 -> AA`.
fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + u8::try_from(index % 26).unwrap_or(0));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// The XML 1.0 `Char` production. Surrogates never reach a `char`.
fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..
    )
}

/// Escapes markup and drops characters XML 1.0 cannot carry.
fn xml_text(value: &str) -> String {
    let cleaned = value.chars().filter(|&ch| is_xml_char(ch)).collect::<String>();
    escape(cleaned.as_str()).into_owned()
}

#[derive(Default)]
struct SharedStrings {
    values: Vec<String>,
    index: HashMap<String, usize>,
    references: usize,
}

impl SharedStrings {
    fn intern(&mut self, value: &str) -> usize {
        self.references += 1;
        if let Some(&id) = self.index.get(value) {
            return id;
        }
        let id = self.values.len();
        self.values.push(value.to_string());
        self.index.insert(value.to_string(), id);
        id
    }

    fn to_xml(&self) -> String {
        let mut xml = String::from(XML_DECLARATION);
        let _ = write!(
            xml,
            r#"<sst xmlns="{MAIN_NS}" count="{}" uniqueCount="{}">"#,
            self.references,
            self.values.len()
        );
        for value in &self.values {
            let _ = write!(xml, r#"<si><t xml:space="preserve">{}</t></si>"#, xml_text(value));
        }
        xml.push_str("</sst>");
        xml
    }
}

fn worksheet_xml(table: &NamedTable, strings: &mut SharedStrings) -> String {
    let mut xml = String::from(XML_DECLARATION);
    let _ = write!(xml, r#"<worksheet xmlns="{MAIN_NS}"><sheetData>"#);
    for (row_index, record) in table.records().enumerate() {
        let row_number = row_index + 1;
        let _ = write!(xml, r#"<row r="{row_number}">"#);
        for (column, value) in record.iter().enumerate() {
            let id = strings.intern(value);
            let _ = write!(
                xml,
                r#"<c r="{}{row_number}" t="s"><v>{id}</v></c>"#,
                column_letters(column)
            );
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn content_types_xml(sheet_count: usize) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(concat!(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
        r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    ));
    for sheet in 1..=sheet_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/xl/worksheets/sheet{sheet}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        );
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels_xml() -> String {
    format!(
        r#"{XML_DECLARATION}<Relationships xmlns="{PACKAGE_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
    )
}

fn workbook_xml(names: &[&str]) -> String {
    let mut xml = String::from(XML_DECLARATION);
    let _ = write!(xml, r#"<workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheets>"#);
    for (index, name) in names.iter().enumerate() {
        let id = index + 1;
        let _ = write!(
            xml,
            r#"<sheet name="{}" sheetId="{id}" r:id="rId{id}"/>"#,
            xml_text(name)
        );
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut xml = String::from(XML_DECLARATION);
    let _ = write!(xml, r#"<Relationships xmlns="{PACKAGE_REL_NS}">"#);
    for id in 1..=sheet_count {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{id}" Type="{REL_NS}/worksheet" Target="worksheets/sheet{id}.xml"/>"#
        );
    }
    let _ = write!(
        xml,
        r#"<Relationship Id="rId{}" Type="{REL_NS}/sharedStrings" Target="sharedStrings.xml"/>"#,
        sheet_count + 1
    );
    let _ = write!(
        xml,
        r#"<Relationship Id="rId{}" Type="{REL_NS}/styles" Target="styles.xml"/>"#,
        sheet_count + 2
    );
    xml.push_str("</Relationships>");
    xml
}

fn write_workbook(path: &Path, sheets: &[(String, &NamedTable)]) -> Result<(), ExportError> {
    let mut strings = SharedStrings::default();
    let worksheets = sheets
        .iter()
        .map(|(_, table)| worksheet_xml(table, &mut strings))
        .collect::<Vec<_>>();
    let names = sheets.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(File::create(path)?);

    let mut parts = vec![
        ("[Content_Types].xml".to_string(), content_types_xml(sheets.len())),
        ("_rels/.rels".to_string(), root_rels_xml()),
        ("xl/workbook.xml".to_string(), workbook_xml(&names)),
        (
            "xl/_rels/workbook.xml.rels".to_string(),
            workbook_rels_xml(sheets.len()),
        ),
        (
            "xl/styles.xml".to_string(),
            format!("{XML_DECLARATION}{STYLES_XML}"),
        ),
        ("xl/sharedStrings.xml".to_string(), strings.to_xml()),
    ];
    parts.extend(
        worksheets
            .into_iter()
            .enumerate()
            .map(|(index, xml)| (format!("xl/worksheets/sheet{}.xml", index + 1), xml)),
    );

    for (name, xml) in parts {
        zip.start_file(name, options)?;
        zip.write_all(xml.as_bytes())?;
    }
    zip.finish()?;
    Ok(())
}

/// Writes all tables into one `<base><suffix>.xlsx` workbook, one sheet per
/// table in result order.
pub fn export_workbook(
    result: &ExtractionResult,
    output_dir: &Path,
    base_name: &str,
    timestamp_suffix: &str,
) -> Result<PathBuf, ExportError> {
    if result.is_empty() {
        return Err(ExportError::NoTables);
    }

    let sheets = plan_sheets(result);
    let path = output_dir.join(format!("{base_name}{timestamp_suffix}.xlsx"));
    write_workbook(&path, &sheets)?;
    info!(path = %path.display(), sheets = sheets.len(), "workbook written");
    Ok(path)
}
