use std::fmt;

use dbhash_core::{Classification, ComparisonRow, Level};
use serde::{Deserialize, Serialize};

/// Overall verdict of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    /// No mismatches and nothing missing at either level.
    Pass,
    /// At least one mismatch or absence.
    Fail,
}

impl OverallStatus {
    /// Literal written to reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Pass => "PASS",
            OverallStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate counts derived from a row sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Database-level rows.
    pub total_databases: usize,
    /// Database-level rows classified as mismatch.
    pub database_mismatches: usize,
    /// Database-level rows classified as missing.
    pub missing_databases: usize,
    /// Collection-level rows.
    pub total_collections: usize,
    /// Collection-level rows classified as mismatch.
    pub collection_mismatches: usize,
    /// Collection-level rows classified as missing.
    pub missing_collections: usize,
    /// PASS iff every counter above except the totals is zero.
    pub overall_status: OverallStatus,
}

impl Summary {
    /// Computes the summary from rows; nothing else feeds into it.
    pub fn from_rows(rows: &[ComparisonRow]) -> Self {
        let mut summary = Summary {
            total_databases: 0,
            database_mismatches: 0,
            missing_databases: 0,
            total_collections: 0,
            collection_mismatches: 0,
            missing_collections: 0,
            overall_status: OverallStatus::Pass,
        };
        for row in rows {
            let mismatch = row.classification == Classification::Mismatch;
            let missing = row.classification.is_missing();
            match row.level {
                Level::Database => {
                    summary.total_databases += 1;
                    summary.database_mismatches += usize::from(mismatch);
                    summary.missing_databases += usize::from(missing);
                }
                Level::Collection => {
                    summary.total_collections += 1;
                    summary.collection_mismatches += usize::from(mismatch);
                    summary.missing_collections += usize::from(missing);
                }
            }
        }
        if summary.divergences() > 0 {
            summary.overall_status = OverallStatus::Fail;
        }
        summary
    }

    /// Mismatches plus absences across both levels.
    pub fn divergences(&self) -> usize {
        self.database_mismatches
            + self.missing_databases
            + self.collection_mismatches
            + self.missing_collections
    }

    /// Returns true when the comparison passed.
    pub fn passed(&self) -> bool {
        self.overall_status == OverallStatus::Pass
    }
}
