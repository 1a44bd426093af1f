//! Minimal SpreadsheetML writer: inline strings, one style per row, fixed
//! column widths. Enough for Excel and LibreOffice to open the report with
//! its fills intact.

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use dbhash_core::errors::{DbHashError, ErrorInfo};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::style::{Bucket, RowStyle, ALERT_FILL, HEADER_FILL, OK_FILL, WARNING_FILL};
use crate::writer::{Cell, Sheet, Workbook};

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

fn xlsx_error(code: &str, err: impl ToString) -> DbHashError {
    DbHashError::Render(ErrorInfo::new(code, err.to_string()))
}

fn part_error(code: &str, part: &str, err: impl ToString) -> DbHashError {
    DbHashError::Render(ErrorInfo::new(code, err.to_string()).with_context("part", part))
}

/// Encodes the workbook as `.xlsx` bytes.
pub fn encode_xlsx(workbook: &Workbook) -> Result<Vec<u8>, DbHashError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut parts = vec![
        ("[Content_Types].xml".to_string(), content_types(workbook)),
        ("_rels/.rels".to_string(), root_rels()),
        ("xl/workbook.xml".to_string(), workbook_xml(workbook)),
        ("xl/_rels/workbook.xml.rels".to_string(), workbook_rels(workbook)),
        ("xl/styles.xml".to_string(), styles_xml()),
    ];
    for (idx, sheet) in workbook.sheets.iter().enumerate() {
        parts.push((
            format!("xl/worksheets/sheet{}.xml", idx + 1),
            sheet_xml(sheet),
        ));
    }

    for (name, body) in parts {
        zip.start_file(name.as_str(), options)
            .map_err(|err| part_error("report.xlsx_entry", &name, err))?;
        zip.write_all(body.as_bytes())
            .map_err(|err| part_error("report.xlsx_write", &name, err))?;
    }
    let cursor = zip
        .finish()
        .map_err(|err| xlsx_error("report.xlsx_finish", err))?;
    Ok(cursor.into_inner())
}

/// Index into `cellXfs` for a row style.
fn style_index(style: RowStyle) -> usize {
    match style {
        RowStyle::Plain => 0,
        RowStyle::Header => 1,
        RowStyle::Bucket(Bucket::Alert) => 2,
        RowStyle::Bucket(Bucket::Warning) => 3,
        RowStyle::Bucket(Bucket::Ok) => 4,
        RowStyle::Label => 5,
        RowStyle::Title => 6,
    }
}

/// Label rows bold the key in column A only; every other style covers the whole row.
fn cell_style_index(style: RowStyle, column: usize) -> usize {
    match style {
        RowStyle::Label if column > 0 => style_index(RowStyle::Plain),
        other => style_index(other),
    }
}

fn content_types(workbook: &Workbook) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
    for idx in 1..=workbook.sheets.len() {
        let _ = write!(
            xml,
            r#"<Override PartName="/xl/worksheets/sheet{idx}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        );
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
    )
}

fn workbook_xml(workbook: &Workbook) -> String {
    let mut xml = format!(r#"{XML_DECL}<workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheets>"#);
    for (idx, sheet) in workbook.sheets.iter().enumerate() {
        let _ = write!(
            xml,
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(&sheet.name),
            idx + 1,
            idx + 1
        );
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels(workbook: &Workbook) -> String {
    let mut xml = format!(r#"{XML_DECL}<Relationships xmlns="{PKG_REL_NS}">"#);
    for idx in 1..=workbook.sheets.len() {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{idx}" Type="{REL_NS}/worksheet" Target="worksheets/sheet{idx}.xml"/>"#
        );
    }
    let _ = write!(
        xml,
        r#"<Relationship Id="rId{}" Type="{REL_NS}/styles" Target="styles.xml"/>"#,
        workbook.sheets.len() + 1
    );
    xml.push_str("</Relationships>");
    xml
}

fn styles_xml() -> String {
    let mut xml = format!(r#"{XML_DECL}<styleSheet xmlns="{MAIN_NS}">"#);
    xml.push_str(r#"<fonts count="3">"#);
    xml.push_str(r#"<font><sz val="11"/><name val="Calibri"/></font>"#);
    xml.push_str(r#"<font><b/><sz val="11"/><name val="Calibri"/></font>"#);
    xml.push_str(r#"<font><b/><sz val="14"/><name val="Calibri"/></font>"#);
    xml.push_str("</fonts>");

    let fills = [HEADER_FILL, ALERT_FILL, WARNING_FILL, OK_FILL];
    let _ = write!(xml, r#"<fills count="{}">"#, fills.len() + 2);
    xml.push_str(r#"<fill><patternFill patternType="none"/></fill>"#);
    xml.push_str(r#"<fill><patternFill patternType="gray125"/></fill>"#);
    for rgb in fills {
        let _ = write!(
            xml,
            r#"<fill><patternFill patternType="solid"><fgColor rgb="FF{rgb}"/><bgColor indexed="64"/></patternFill></fill>"#
        );
    }
    xml.push_str("</fills>");
    xml.push_str(r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#);
    xml.push_str(r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#);

    // (font, fill) per style_index; fill ids are offset by the two mandatory fills.
    let xfs: [(usize, usize); 7] = [(0, 0), (1, 2), (0, 3), (0, 4), (0, 5), (1, 0), (2, 0)];
    let _ = write!(xml, r#"<cellXfs count="{}">"#, xfs.len());
    for (font, fill) in xfs {
        let _ = write!(
            xml,
            r#"<xf numFmtId="0" fontId="{font}" fillId="{fill}" borderId="0" xfId="0"{}{}/>"#,
            if font > 0 { r#" applyFont="1""# } else { "" },
            if fill > 0 { r#" applyFill="1""# } else { "" },
        );
    }
    xml.push_str("</cellXfs>");
    xml.push_str(r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#);
    xml.push_str("</styleSheet>");
    xml
}

fn sheet_xml(sheet: &Sheet) -> String {
    let mut xml = format!(r#"{XML_DECL}<worksheet xmlns="{MAIN_NS}">"#);
    if !sheet.column_widths.is_empty() {
        xml.push_str("<cols>");
        for (idx, width) in sheet.column_widths.iter().enumerate() {
            let _ = write!(
                xml,
                r#"<col min="{col}" max="{col}" width="{width}" customWidth="1"/>"#,
                col = idx + 1
            );
        }
        xml.push_str("</cols>");
    }
    xml.push_str("<sheetData>");
    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let row_number = row_idx + 1;
        let _ = write!(xml, r#"<row r="{row_number}">"#);
        for (col_idx, cell) in row.cells.iter().enumerate() {
            let style = cell_style_index(row.style, col_idx);
            let reference = format!("{}{row_number}", column_name(col_idx));
            match cell {
                Cell::Number(value) => {
                    let _ = write!(xml, r#"<c r="{reference}" s="{style}"><v>{value}</v></c>"#);
                }
                Cell::Text(value) => {
                    let _ = write!(
                        xml,
                        r#"<c r="{reference}" s="{style}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                        escape(value)
                    );
                }
                Cell::Empty => {
                    let _ = write!(xml, r#"<c r="{reference}" s="{style}"/>"#);
                }
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Spreadsheet column letters for a zero-based index: 0 → A, 25 → Z, 26 → AA.
pub fn column_name(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (idx, ch) in value.char_indices() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // A literal `_xHHHH_` would otherwise be decoded by the reader.
            '_' if starts_escape_sequence(&value[idx..]) => out.push_str("_x005F_"),
            c if forbidden_in_xml(c) => {
                let _ = write!(out, "_x{:04X}_", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out
}

fn forbidden_in_xml(c: char) -> bool {
    let control = u32::from(c) < 0x20 && !matches!(c, '\t' | '\n' | '\r');
    control || matches!(c, '\u{FFFE}' | '\u{FFFF}')
}

fn starts_escape_sequence(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    bytes.len() >= 7
        && bytes[0] == b'_'
        && matches!(bytes[1], b'x' | b'X')
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}
