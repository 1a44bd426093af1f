use std::fs;
use std::io::Write;
use std::path::Path;

use dbhash_core::errors::{DbHashError, ErrorInfo};
use dbhash_core::serde::to_canonical_json_pretty;
use dbhash_core::ComparisonRow;
use tempfile::NamedTempFile;

use crate::delimited::encode_csv;
use crate::format::ReportFormat;
use crate::render::{render_workbook, RenderOptions};
use crate::summary::Summary;
use crate::writer::Workbook;
use crate::xlsx::encode_xlsx;

fn persist_error(code: &str, message: &str, path: &Path, err: impl ToString) -> DbHashError {
    DbHashError::Render(
        ErrorInfo::new(code, message)
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

/// Serializes a workbook in the requested format.
pub fn encode(workbook: &Workbook, format: ReportFormat) -> Result<Vec<u8>, DbHashError> {
    match format {
        ReportFormat::Xlsx => encode_xlsx(workbook),
        ReportFormat::Csv => encode_csv(workbook),
        ReportFormat::Json => to_canonical_json_pretty(workbook).map_err(|err| {
            DbHashError::Render(ErrorInfo::new("report.json", err.to_string()))
        }),
    }
}

/// Writes `bytes` to `path` so that the destination either holds the complete
/// artifact or is left untouched.
///
/// The bytes go to a temporary file in the destination directory which is then
/// renamed over `path`.
pub fn persist_atomic(path: &Path, bytes: &[u8]) -> Result<(), DbHashError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|err| {
        persist_error("report.output_dir", "failed to create output directory", dir, err)
    })?;
    let mut staged = NamedTempFile::new_in(dir)
        .map_err(|err| persist_error("report.stage", "failed to stage report", dir, err))?;
    staged
        .write_all(bytes)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|err| {
            persist_error("report.stage_write", "failed to write staged report", path, err)
        })?;
    staged
        .persist(path)
        .map_err(|err| {
            persist_error("report.persist", "failed to move report into place", path, err.error)
        })?;
    Ok(())
}

/// Renders `rows`, encodes them as `format`, and writes the artifact to `path`.
///
/// This is the only place the renderer touches the filesystem, and it writes
/// exactly one file.
pub fn write_report(
    rows: &[ComparisonRow],
    opts: &RenderOptions,
    path: &Path,
    format: ReportFormat,
) -> Result<Summary, DbHashError> {
    let (workbook, summary) = render_workbook(rows, opts)?;
    let bytes = encode(&workbook, format)?;
    persist_atomic(path, &bytes)?;
    Ok(summary)
}
