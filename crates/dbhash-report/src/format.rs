use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, TimeZone};
use dbhash_core::errors::{DbHashError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Supported report encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Office Open XML spreadsheet with styled rows and two worksheets.
    #[default]
    #[serde(alias = "excel")]
    Xlsx,
    /// Single CSV file: primary table, blank record, summary pairs.
    Csv,
    /// Canonical JSON dump of the workbook model.
    Json,
}

impl ReportFormat {
    /// Infers the format from a file extension, if it names one.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("xlsx") => Some(ReportFormat::Xlsx),
            Some("csv") => Some(ReportFormat::Csv),
            Some("json") => Some(ReportFormat::Json),
            _ => None,
        }
    }

    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = DbHashError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ReportFormat::Xlsx),
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => Err(DbHashError::Config(
                ErrorInfo::new("report.format", format!("unknown report format {other:?}"))
                    .with_hint("expected one of xlsx, csv, json"),
            )),
        }
    }
}

/// Default report file name, timestamped so earlier runs are never overwritten.
pub fn default_report_name<Tz: TimeZone>(now: &DateTime<Tz>, format: ReportFormat) -> PathBuf
where
    Tz::Offset: fmt::Display,
{
    PathBuf::from(format!(
        "dbhash_comparison_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

/// Picks the explicit format, else the one named by the path, else xlsx.
pub fn resolve_format(explicit: Option<ReportFormat>, path: Option<&Path>) -> ReportFormat {
    explicit
        .or_else(|| path.and_then(ReportFormat::from_path))
        .unwrap_or_default()
}
