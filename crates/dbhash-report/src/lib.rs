#![deny(missing_docs)]
#![doc = "Turns ordered comparison rows into a styled two-view report artifact."]

mod delimited;
/// Report encodings and default file naming.
pub mod format;
/// Encoding and atomic persistence of rendered workbooks.
pub mod persist;
/// Primary and summary view rendering.
pub mod render;
/// Presentation buckets and row styles.
pub mod style;
/// Summary counters derived from comparison rows.
pub mod summary;
/// Tabular writer capability and the in-memory workbook.
pub mod writer;
pub mod xlsx;

pub use delimited::encode_csv;
pub use format::{default_report_name, resolve_format, ReportFormat};
pub use persist::{encode, persist_atomic, write_report};
pub use render::{
    render, render_workbook, RenderOptions, COLUMNS, COMPARISON_SHEET, SUMMARY_SHEET,
    SUMMARY_TITLE,
};
pub use style::{Bucket, RowStyle};
pub use summary::{OverallStatus, Summary};
pub use writer::{Cell, Row, Sheet, TabularWriter, Workbook};
pub use xlsx::encode_xlsx;
