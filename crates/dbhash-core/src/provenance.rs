//! Provenance recorded alongside every comparison run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Describes where the two inventories of a run came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Redacted source target (credentials stripped).
    pub source: String,
    /// Redacted destination target (credentials stripped).
    pub destination: String,
    /// Timestamp recording when the run started.
    pub started_at: String,
    /// Version map for the tools involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}

impl RunProvenance {
    /// Creates provenance for a run between two redacted targets.
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        started_at: impl Into<String>,
    ) -> Self {
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert(
            "dbhash-core".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        Self {
            source: source.into(),
            destination: destination.into(),
            started_at: started_at.into(),
            tool_versions,
        }
    }
}
