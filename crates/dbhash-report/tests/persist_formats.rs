use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::{TimeZone, Utc};
use dbhash_core::{Classification, ComparisonRow, Level};
use dbhash_report::{
    default_report_name, persist_atomic, resolve_format, write_report, RenderOptions,
    ReportFormat,
};
use tempfile::tempdir;
use zip::ZipArchive;

fn rows() -> Vec<ComparisonRow> {
    vec![
        ComparisonRow {
            level: Level::Database,
            database: "sales".into(),
            collection: String::new(),
            source_digest: Some("X".into()),
            destination_digest: Some("Y".into()),
            classification: Classification::Mismatch,
            source_host: Some("src".into()),
            destination_host: Some("dst".into()),
            source_elapsed_ms: Some(3),
            destination_elapsed_ms: Some(4),
        },
        ComparisonRow {
            level: Level::Collection,
            database: "sales".into(),
            collection: "orders & <returns>".into(),
            source_digest: Some("a1".into()),
            destination_digest: Some("a1".into()),
            classification: Classification::Match,
            source_host: Some("src".into()),
            destination_host: Some("dst".into()),
            source_elapsed_ms: None,
            destination_elapsed_ms: None,
        },
    ]
}

fn read_entry(path: &Path, name: &str) -> String {
    let file = fs::File::open(path).expect("open xlsx");
    let mut archive = ZipArchive::new(file).expect("zip");
    let mut entry = archive.by_name(name).expect("entry");
    let mut body = String::new();
    entry.read_to_string(&mut body).expect("read entry");
    body
}

#[test]
fn xlsx_report_has_two_styled_sheets() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("report.xlsx");
    let opts = RenderOptions::new("2025-07-24 10:00:00");
    let summary = write_report(&rows(), &opts, &path, ReportFormat::Xlsx).expect("write");
    assert!(!summary.passed());

    let workbook = read_entry(&path, "xl/workbook.xml");
    assert!(workbook.contains(r#"name="Hash Comparison""#));
    assert!(workbook.contains(r#"name="Summary""#));

    let styles = read_entry(&path, "xl/styles.xml");
    for rgb in ["FFD9E1F2", "FFFFE6E6", "FFFFF0E6", "FFE6F7E6"] {
        assert!(styles.contains(rgb), "missing fill {rgb}");
    }

    let sheet = read_entry(&path, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<c r="A1" s="1" t="inlineStr">"#));
    // Mismatch row uses the alert style on every cell, including empty ones.
    assert!(sheet.contains(r#"<c r="A2" s="2" t="inlineStr">"#));
    assert!(sheet.contains(r#"<c r="J2" s="2"><v>4</v></c>"#));
    assert!(sheet.contains(r#"<c r="I3" s="4"/>"#));
    assert!(sheet.contains("orders &amp; &lt;returns&gt;"));
    assert!(sheet.contains(r#"<col min="1" max="1" width="12" customWidth="1"/>"#));

    let summary_sheet = read_entry(&path, "xl/worksheets/sheet2.xml");
    assert!(summary_sheet.contains(">FAIL<"));
    assert!(summary_sheet.contains(">2025-07-24 10:00:00<"));
    assert!(summary_sheet.contains(r#"<c r="A1" s="6" t="inlineStr">"#));
    assert!(summary_sheet.contains(r#"<c r="A2" s="5" t="inlineStr">"#));
    assert!(summary_sheet.contains(r#"<c r="B2" s="0" t="inlineStr">"#));
}

#[test]
fn xlsx_cells_keep_control_characters_distinct() {
    let mut rows = rows();
    let template = rows[1].clone();
    rows.truncate(1);
    for name in ["log\u{1}a", "log\u{2}a", "raw_x0041_name"] {
        rows.push(ComparisonRow {
            collection: name.into(),
            ..template.clone()
        });
    }
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("report.xlsx");
    write_report(&rows, &RenderOptions::new("ts"), &path, ReportFormat::Xlsx).expect("write");

    let sheet = read_entry(&path, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(">log_x0001_a<"));
    assert!(sheet.contains(">log_x0002_a<"));
    assert!(!sheet.contains(">loga<"));
    assert!(sheet.contains(">raw_x005F_x0041_name<"));
}

#[test]
fn csv_report_holds_table_then_summary() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("report.csv");
    write_report(&rows(), &RenderOptions::new("ts"), &path, ReportFormat::Csv).expect("write");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(&path)
        .expect("reader");
    let records: Vec<Vec<String>> = reader
        .records()
        .map(|record| record.expect("record").iter().map(str::to_string).collect())
        .collect();
    assert_eq!(records[0][0], "Type");
    assert_eq!(records[0].len(), 10);
    assert_eq!(records[1][5], "MISMATCH");
    assert_eq!(records[2][2], "orders & <returns>");
    assert!(records
        .iter()
        .any(|record| record.len() == 2 && record[0] == "Overall Status" && record[1] == "FAIL"));
}

#[test]
fn json_report_is_deterministic() {
    let dir = tempdir().expect("tempdir");
    let first = dir.path().join("a.json");
    let second = dir.path().join("b.json");
    let opts = RenderOptions::new("fixed");
    write_report(&rows(), &opts, &first, ReportFormat::Json).expect("first");
    write_report(&rows(), &opts, &second, ReportFormat::Json).expect("second");
    let bytes = fs::read(&first).expect("read");
    assert_eq!(bytes, fs::read(&second).expect("read"));
    let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(value["sheets"][0]["name"], "Hash Comparison");
    assert_eq!(value["sheets"][0]["rows"][1]["style"]["bucket"], "alert");
}

#[test]
fn failed_persist_leaves_no_artifact() {
    let dir = tempdir().expect("tempdir");
    let target = dir.path().join("occupied");
    fs::create_dir_all(target.join("child")).expect("dir");
    let err = persist_atomic(&target, b"payload").expect_err("cannot replace a non-empty dir");
    assert_eq!(err.info().code, "report.persist");
    assert!(target.is_dir());
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(leftovers.len(), 1, "staged file leaked: {leftovers:?}");
}

#[test]
fn persist_creates_missing_parent_directories() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested/out/report.json");
    persist_atomic(&path, b"{}").expect("persist");
    assert_eq!(fs::read(&path).expect("read"), b"{}");
}

#[test]
fn format_resolution_and_default_names() {
    assert_eq!(resolve_format(None, Some(Path::new("out.CSV"))), ReportFormat::Csv);
    assert_eq!(
        resolve_format(Some(ReportFormat::Json), Some(Path::new("out.xlsx"))),
        ReportFormat::Json
    );
    assert_eq!(resolve_format(None, Some(Path::new("out.txt"))), ReportFormat::Xlsx);
    assert_eq!(resolve_format(None, None), ReportFormat::Xlsx);
    assert!("parquet".parse::<ReportFormat>().is_err());
    assert_eq!("Excel".parse::<ReportFormat>().unwrap(), ReportFormat::Xlsx);

    let now = Utc.with_ymd_and_hms(2025, 7, 24, 9, 5, 3).unwrap();
    assert_eq!(
        default_report_name(&now, ReportFormat::Xlsx),
        Path::new("dbhash_comparison_20250724_090503.xlsx")
    );
}
