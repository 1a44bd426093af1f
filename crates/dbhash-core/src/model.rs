//! Inventories collected from a cluster and the rows produced by comparing two of them.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Rendered in place of a digest that one side does not have.
pub const ABSENT_DIGEST: &str = "MISSING";

/// Rendered in place of a host that one side does not have.
pub const ABSENT_HOST: &str = "N/A";

/// Hash results for a single database as reported by one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseRecord {
    /// Host that answered the hash command.
    pub host: String,
    /// Opaque whole-database digest, compared only by equality.
    pub aggregate_digest: String,
    /// Opaque per-collection digests keyed by collection name.
    #[serde(default)]
    pub collections: BTreeMap<String, String>,
    /// Server-side time spent computing the digests, in milliseconds.
    #[serde(default)]
    pub elapsed_ms: u64,
    /// ISO-8601 timestamp recording when the digests were captured.
    #[serde(default)]
    pub captured_at: String,
}

impl DatabaseRecord {
    /// Creates a record with no collections and no timing information.
    pub fn new(host: impl Into<String>, aggregate_digest: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            aggregate_digest: aggregate_digest.into(),
            collections: BTreeMap::new(),
            elapsed_ms: 0,
            captured_at: String::new(),
        }
    }

    /// Adds a collection digest to the record.
    pub fn with_collection(mut self, name: impl Into<String>, digest: impl Into<String>) -> Self {
        self.collections.insert(name.into(), digest.into());
        self
    }

    /// Sets the elapsed hashing time in milliseconds.
    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// Sets the capture timestamp.
    pub fn with_captured_at(mut self, captured_at: impl Into<String>) -> Self {
        self.captured_at = captured_at.into();
        self
    }
}

/// Cluster-wide snapshot mapping database names to their hash records.
///
/// A database whose hash command failed is absent from the inventory; there is
/// no error marker. Iteration is always in ascending name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterInventory {
    databases: BTreeMap<String, DatabaseRecord>,
}

impl ClusterInventory {
    /// Creates an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record for `name`.
    pub fn insert(&mut self, name: impl Into<String>, record: DatabaseRecord) {
        self.databases.insert(name.into(), record);
    }

    /// Builder form of [`ClusterInventory::insert`].
    pub fn with_database(mut self, name: impl Into<String>, record: DatabaseRecord) -> Self {
        self.insert(name, record);
        self
    }

    /// Returns the record for `name`, if that database was hashed.
    pub fn get(&self, name: &str) -> Option<&DatabaseRecord> {
        self.databases.get(name)
    }

    /// Iterates over database names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.databases.keys().map(String::as_str)
    }

    /// Iterates over `(name, record)` pairs in ascending name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, DatabaseRecord> {
        self.databases.iter()
    }

    /// Number of databases in the inventory.
    pub fn len(&self) -> usize {
        self.databases.len()
    }

    /// Returns true when no database was hashed.
    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }
}

impl FromIterator<(String, DatabaseRecord)> for ClusterInventory {
    fn from_iter<I: IntoIterator<Item = (String, DatabaseRecord)>>(iter: I) -> Self {
        Self {
            databases: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ClusterInventory {
    type Item = (&'a String, &'a DatabaseRecord);
    type IntoIter = btree_map::Iter<'a, String, DatabaseRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.databases.iter()
    }
}

/// Granularity of a comparison row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Whole-database aggregate digest comparison.
    Database,
    /// Single collection digest comparison.
    Collection,
}

impl Level {
    /// Label used in the `Type` column of reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Database => "Database",
            Level::Collection => "Collection",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing one database or collection across both clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Both digests present and equal.
    Match,
    /// Both digests present and different.
    Mismatch,
    /// The database exists on only one side.
    MissingDatabase,
    /// The collection exists on only one side of a database present on both.
    MissingCollection,
}

impl Classification {
    /// Decides the outcome for a pair of optional digests at `level`.
    ///
    /// Digests are compared as exact strings; no case folding or trimming.
    pub fn decide(level: Level, source: Option<&str>, destination: Option<&str>) -> Self {
        match (source, destination) {
            (Some(source), Some(destination)) if source == destination => Classification::Match,
            (Some(_), Some(_)) => Classification::Mismatch,
            _ => match level {
                Level::Database => Classification::MissingDatabase,
                Level::Collection => Classification::MissingCollection,
            },
        }
    }

    /// Returns true for both missing variants.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            Classification::MissingDatabase | Classification::MissingCollection
        )
    }

    /// Stable label used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Match => "MATCH",
            Classification::Mismatch => "MISMATCH",
            Classification::MissingDatabase => "MISSING_DATABASE",
            Classification::MissingCollection => "MISSING_COLLECTION",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified outcome at database or collection granularity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Granularity of the comparison.
    pub level: Level,
    /// Database the row belongs to.
    pub database: String,
    /// Collection name; empty for database-level rows.
    pub collection: String,
    /// Digest reported by the source cluster.
    pub source_digest: Option<String>,
    /// Digest reported by the destination cluster.
    pub destination_digest: Option<String>,
    /// Outcome decided by the reconciliation engine.
    pub classification: Classification,
    /// Host that produced the source digest.
    pub source_host: Option<String>,
    /// Host that produced the destination digest.
    pub destination_host: Option<String>,
    /// Source hashing time; only populated on database-level rows.
    pub source_elapsed_ms: Option<u64>,
    /// Destination hashing time; only populated on database-level rows.
    pub destination_elapsed_ms: Option<u64>,
}

impl ComparisonRow {
    /// Returns true for rows that indicate a divergence between clusters.
    pub fn is_divergent(&self) -> bool {
        self.classification != Classification::Match
    }

    /// Source digest, or [`ABSENT_DIGEST`].
    pub fn source_digest_or_sentinel(&self) -> &str {
        self.source_digest.as_deref().unwrap_or(ABSENT_DIGEST)
    }

    /// Destination digest, or [`ABSENT_DIGEST`].
    pub fn destination_digest_or_sentinel(&self) -> &str {
        self.destination_digest.as_deref().unwrap_or(ABSENT_DIGEST)
    }

    /// Source host, or [`ABSENT_HOST`].
    pub fn source_host_or_sentinel(&self) -> &str {
        self.source_host.as_deref().unwrap_or(ABSENT_HOST)
    }

    /// Destination host, or [`ABSENT_HOST`].
    pub fn destination_host_or_sentinel(&self) -> &str {
        self.destination_host.as_deref().unwrap_or(ABSENT_HOST)
    }
}

/// Identifies which cluster an inventory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    /// The cluster being replicated from.
    Source,
    /// The cluster being replicated to.
    Destination,
}

impl Side {
    /// Lower-case label used in logs and error context.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Destination => "destination",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
