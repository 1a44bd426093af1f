use csv::WriterBuilder;
use dbhash_core::errors::{DbHashError, ErrorInfo};

use crate::writer::Workbook;

fn wrap_csv(code: &str, err: impl ToString) -> DbHashError {
    DbHashError::Render(
        ErrorInfo::new(code, "failed to encode CSV report").with_hint(err.to_string()),
    )
}

/// Encodes every sheet into one CSV document, separated by an empty record.
///
/// Styles and column widths have no CSV representation and are dropped; the
/// `Match` column still carries the classification of each row.
pub fn encode_csv(workbook: &Workbook) -> Result<Vec<u8>, DbHashError> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_writer(Vec::new());
    for (idx, sheet) in workbook.sheets.iter().enumerate() {
        if idx > 0 {
            writer
                .write_record(None::<&[u8]>)
                .map_err(|err| wrap_csv("report.csv_separator", err))?;
        }
        for row in &sheet.rows {
            writer
                .write_record(row.cells.iter().map(|cell| cell.literal()))
                .map_err(|err| wrap_csv("report.csv_row", err))?;
        }
    }
    writer
        .into_inner()
        .map_err(|err| wrap_csv("report.csv_flush", err))
}
