use chrono::Local;
use dbhash_core::errors::{DbHashError, ErrorInfo};
use dbhash_core::ComparisonRow;
use dbhash_engine::rows_fingerprint;

use crate::style::{Bucket, RowStyle};
use crate::summary::Summary;
use crate::writer::{Cell, TabularWriter, Workbook};

/// Name of the primary view.
pub const COMPARISON_SHEET: &str = "Hash Comparison";
/// Name of the summary view.
pub const SUMMARY_SHEET: &str = "Summary";
/// Title cell of the summary view.
pub const SUMMARY_TITLE: &str = "Database Hash Comparison Summary";

/// Header of the primary view, in column order.
pub const COLUMNS: [&str; 10] = [
    "Type",
    "Database",
    "Collection",
    "Source_Hash",
    "Destination_Hash",
    "Match",
    "Source_Host",
    "Dest_Host",
    "Source_Time_ms",
    "Dest_Time_ms",
];

/// Layout knobs for [`render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Timestamp written to the summary view.
    pub generated_at: String,
    /// Characters added to the longest literal of each column.
    pub column_padding: usize,
    /// Upper bound on primary view column widths.
    pub column_cap: usize,
}

impl RenderOptions {
    /// Options with default padding (2) and cap (50).
    pub fn new(generated_at: impl Into<String>) -> Self {
        Self {
            generated_at: generated_at.into(),
            column_padding: 2,
            column_cap: 50,
        }
    }

    /// Options stamped with the current local time.
    pub fn now() -> Self {
        Self::new(Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

/// Writes the primary and summary views of `rows` into `writer`.
///
/// Rows are emitted in the given order with their classification untouched.
/// The returned summary is the one written to the summary view.
pub fn render<W: TabularWriter>(
    rows: &[ComparisonRow],
    opts: &RenderOptions,
    writer: &mut W,
) -> Result<Summary, DbHashError> {
    writer.add_sheet(COMPARISON_SHEET);
    writer.append_row(
        COLUMNS.iter().map(|column| Cell::text(*column)).collect(),
        RowStyle::Header,
    );
    for row in rows {
        writer.append_row(
            comparison_cells(row),
            RowStyle::Bucket(Bucket::for_classification(row.classification)),
        );
    }
    writer.auto_size_columns(opts.column_padding, Some(opts.column_cap));

    let summary = Summary::from_rows(rows);
    let fingerprint = rows_fingerprint(rows).map_err(|err| {
        DbHashError::Render(
            ErrorInfo::new("report.fingerprint", "failed to fingerprint comparison rows")
                .with_hint(err.to_string()),
        )
    })?;
    write_summary_sheet(writer, &summary, opts, &fingerprint);
    Ok(summary)
}

/// Renders into a fresh in-memory [`Workbook`].
pub fn render_workbook(
    rows: &[ComparisonRow],
    opts: &RenderOptions,
) -> Result<(Workbook, Summary), DbHashError> {
    let mut workbook = Workbook::new();
    let summary = render(rows, opts, &mut workbook)?;
    Ok((workbook, summary))
}

fn comparison_cells(row: &ComparisonRow) -> Vec<Cell> {
    vec![
        Cell::text(row.level.as_str()),
        Cell::text(&row.database),
        Cell::text(&row.collection),
        Cell::text(row.source_digest_or_sentinel()),
        Cell::text(row.destination_digest_or_sentinel()),
        Cell::text(row.classification.as_str()),
        Cell::text(row.source_host_or_sentinel()),
        Cell::text(row.destination_host_or_sentinel()),
        Cell::optional_number(row.source_elapsed_ms),
        Cell::optional_number(row.destination_elapsed_ms),
    ]
}

fn write_summary_sheet<W: TabularWriter>(
    writer: &mut W,
    summary: &Summary,
    opts: &RenderOptions,
    fingerprint: &str,
) {
    writer.add_sheet(SUMMARY_SHEET);
    writer.append_row(vec![Cell::text(SUMMARY_TITLE), Cell::Empty], RowStyle::Title);
    label(writer, "Generated on", Cell::text(&opts.generated_at));
    blank(writer);
    label(writer, "Total Databases Compared", count(summary.total_databases));
    label(writer, "Database Hash Mismatches", count(summary.database_mismatches));
    label(writer, "Missing Databases", count(summary.missing_databases));
    blank(writer);
    label(writer, "Total Collections Compared", count(summary.total_collections));
    label(writer, "Collection Hash Mismatches", count(summary.collection_mismatches));
    label(writer, "Missing Collections", count(summary.missing_collections));
    blank(writer);
    label(writer, "Overall Status", Cell::text(summary.overall_status.as_str()));
    label(writer, "Comparison Fingerprint", Cell::text(fingerprint));
    writer.auto_size_columns(opts.column_padding, None);
}

fn label<W: TabularWriter>(writer: &mut W, key: &str, value: Cell) {
    writer.append_row(vec![Cell::text(key), value], RowStyle::Label);
}

fn blank<W: TabularWriter>(writer: &mut W) {
    writer.append_row(vec![Cell::Empty, Cell::Empty], RowStyle::Plain);
}

fn count(value: usize) -> Cell {
    Cell::Number(value as u64)
}
