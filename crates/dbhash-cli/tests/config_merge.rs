use std::collections::BTreeSet;
use std::fs;

use dbhash_cli::{CompareArgs, CompareConfig, CompareSettings};
use dbhash_collect::Target;
use dbhash_core::errors::DbHashError;
use dbhash_report::ReportFormat;
use tempfile::NamedTempFile;

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn empty_document_yields_defaults() {
    let config = CompareConfig::from_yaml("").expect("empty config");
    assert_eq!(config, CompareConfig::default());
    assert_eq!(config.column_padding, 2);
    assert_eq!(config.column_cap, 50);
    assert_eq!(config.concurrency, 1);
}

#[test]
fn yaml_fields_are_read() {
    let config = CompareConfig::from_yaml(
        "exclude_databases: [scratch, tmp]\ninclude_databases: [sales]\ncolumn_cap: 80\nconcurrency: 4\nformat: csv\n",
    )
    .expect("config");
    assert_eq!(config.exclude_databases, set(&["scratch", "tmp"]));
    assert_eq!(config.include_databases, set(&["sales"]));
    assert_eq!(config.column_cap, 80);
    assert_eq!(config.column_padding, 2);
    assert_eq!(config.concurrency, 4);
    assert_eq!(config.format, Some(ReportFormat::Csv));
}

#[test]
fn unknown_report_format_in_the_file_is_rejected() {
    assert!(matches!(
        CompareConfig::from_yaml("format: pdf\n"),
        Err(DbHashError::Config(_))
    ));
    let config = CompareConfig::from_yaml("format: excel\n").expect("alias accepted");
    assert_eq!(config.format, Some(ReportFormat::Xlsx));
}

#[test]
fn unknown_keys_and_zero_concurrency_are_rejected() {
    assert!(matches!(
        CompareConfig::from_yaml("exclude: [x]\n"),
        Err(DbHashError::Config(_))
    ));
    assert!(matches!(
        CompareConfig::from_yaml("concurrency: 0\n"),
        Err(DbHashError::Config(_))
    ));
}

#[test]
fn command_line_overrides_the_file() {
    let file = NamedTempFile::new().expect("tempfile");
    fs::write(
        file.path(),
        "exclude_databases: [scratch]\ninclude_databases: [sales, hr]\nconcurrency: 4\nformat: json\ncolumn_padding: 3\n",
    )
    .expect("write config");

    let args = CompareArgs {
        source: "mongodb://u:p@src:27017".to_string(),
        destination: "snapshots/dst.json".to_string(),
        config: Some(file.path().to_path_buf()),
        concurrency: Some(2),
        include: vec!["sales".to_string()],
        format: Some("xlsx".to_string()),
        ..CompareArgs::default()
    };
    let settings = CompareSettings::resolve(&args).expect("resolve");
    assert_eq!(settings.collect.concurrency, 2);
    assert_eq!(settings.collect.include, set(&["sales"]));
    assert_eq!(settings.collect.exclude, set(&["scratch"]));
    assert_eq!(settings.format, Some(ReportFormat::Xlsx));
    assert_eq!(settings.column_padding, 3);
    assert_eq!(settings.column_cap, 50);
    assert!(matches!(settings.source, Target::Mongo(_)));
    assert!(matches!(settings.destination, Target::Snapshot(_)));
}

#[test]
fn missing_config_file_is_reported_with_its_path() {
    let args = CompareArgs {
        source: "a.json".to_string(),
        destination: "b.json".to_string(),
        config: Some("/nonexistent/dbhash.yaml".into()),
        ..CompareArgs::default()
    };
    let err = CompareSettings::resolve(&args).expect_err("missing config");
    assert_eq!(err.info().code, "config.read");
    assert_eq!(
        err.info().context.get("path").map(String::as_str),
        Some("/nonexistent/dbhash.yaml")
    );
}
