use dbhash_core::Classification;
use serde::{Deserialize, Serialize};

/// Fill colour of the primary view header row.
pub const HEADER_FILL: &str = "D9E1F2";
/// Fill colour of rows whose digests differ.
pub const ALERT_FILL: &str = "FFE6E6";
/// Fill colour of rows where one side is missing.
pub const WARNING_FILL: &str = "FFF0E6";
/// Fill colour of matching rows.
pub const OK_FILL: &str = "E6F7E6";

/// Presentation grouping of a comparison row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    /// Digests present on both sides and different.
    Alert,
    /// Database or collection absent on one side.
    Warning,
    /// Digests present on both sides and equal.
    Ok,
}

impl Bucket {
    /// Maps a classification to its bucket.
    pub fn for_classification(classification: Classification) -> Self {
        match classification {
            Classification::Mismatch => Bucket::Alert,
            Classification::MissingDatabase | Classification::MissingCollection => {
                Bucket::Warning
            }
            Classification::Match => Bucket::Ok,
        }
    }

    /// Fill colour applied to every cell of a row in this bucket.
    pub fn fill(&self) -> &'static str {
        match self {
            Bucket::Alert => ALERT_FILL,
            Bucket::Warning => WARNING_FILL,
            Bucket::Ok => OK_FILL,
        }
    }
}

/// Style of a row. Every variant except [`RowStyle::Label`] covers all cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "bucket")]
pub enum RowStyle {
    /// No styling.
    Plain,
    /// Column header: header fill and bold font.
    Header,
    /// Sheet title: bold, larger font.
    Title,
    /// Key/value label: bold font on the key cell, value cell plain.
    Label,
    /// Data row coloured by its bucket.
    Bucket(Bucket),
}

impl RowStyle {
    /// Fill colour for the row, if any.
    pub fn fill(&self) -> Option<&'static str> {
        match self {
            RowStyle::Header => Some(HEADER_FILL),
            RowStyle::Bucket(bucket) => Some(bucket.fill()),
            RowStyle::Plain | RowStyle::Title | RowStyle::Label => None,
        }
    }
}
