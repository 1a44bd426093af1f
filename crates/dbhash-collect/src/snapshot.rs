//! Offline inventories stored as JSON.
//!
//! A snapshot mirrors the shape of `dbHash` replies so files captured from a
//! live cluster, or assembled by hand from shell output, can be compared
//! later without network access.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use dbhash_core::errors::{DbHashError, ErrorInfo};
use dbhash_core::serde::{from_json_slice, to_canonical_json_pretty};
use dbhash_core::{ClusterInventory, DatabaseRecord};
use serde::{Deserialize, Serialize};

use crate::source::InventorySource;

const UNKNOWN_HOST: &str = "unknown";

fn ok_default() -> f64 {
    1.0
}

/// One database entry, using the field names of a `dbHash` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbHashReply {
    /// Host that answered the command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Aggregate digest of the database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    /// Per-collection digests.
    #[serde(default)]
    pub collections: BTreeMap<String, String>,
    /// Server-side time spent hashing.
    #[serde(default)]
    pub time_millis: u64,
    /// When the reply was captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<String>,
    /// Command status; anything other than 1 marks a failed command.
    #[serde(default = "ok_default")]
    pub ok: f64,
    /// Server error message for failed commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errmsg: Option<String>,
}

impl From<&DatabaseRecord> for DbHashReply {
    fn from(record: &DatabaseRecord) -> Self {
        Self {
            host: Some(record.host.clone()),
            md5: Some(record.aggregate_digest.clone()),
            collections: record.collections.clone(),
            time_millis: record.elapsed_ms,
            captured_at: (!record.captured_at.is_empty()).then(|| record.captured_at.clone()),
            ok: 1.0,
            errmsg: None,
        }
    }
}

/// On-disk snapshot of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotFile {
    /// Default host for entries that do not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Default capture time for entries that do not carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<String>,
    /// Replies keyed by database name, system databases included.
    #[serde(default)]
    pub databases: BTreeMap<String, DbHashReply>,
}

impl SnapshotFile {
    /// Builds a snapshot from an already collected inventory.
    pub fn from_inventory(inventory: &ClusterInventory) -> Self {
        Self {
            host: None,
            captured_at: None,
            databases: inventory
                .iter()
                .map(|(name, record)| (name.clone(), DbHashReply::from(record)))
                .collect(),
        }
    }
}

/// Serves inventory data from a snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: PathBuf,
    snapshot: SnapshotFile,
}

impl SnapshotSource {
    /// Reads and parses the snapshot at `path`.
    ///
    /// A missing or unreadable file is reported as a connection failure,
    /// since the cluster it stands in for cannot be reached.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DbHashError> {
        let path = path.into();
        let bytes = fs::read(&path).map_err(|err| {
            DbHashError::Connection(
                ErrorInfo::new("snapshot.open", "failed to read inventory snapshot")
                    .with_context("path", path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        let snapshot: SnapshotFile = from_json_slice(&bytes).map_err(|err| {
            DbHashError::Serde(
                ErrorInfo::new("snapshot.parse", "snapshot is not a valid inventory document")
                    .with_context("path", path.display().to_string())
                    .with_hint(err.info().message.clone()),
            )
        })?;
        Ok(Self { path, snapshot })
    }

    /// Wraps an in-memory snapshot.
    pub fn from_snapshot(path: impl Into<PathBuf>, snapshot: SnapshotFile) -> Self {
        Self {
            path: path.into(),
            snapshot,
        }
    }
}

impl InventorySource for SnapshotSource {
    fn describe(&self) -> String {
        format!("snapshot {}", self.path.display())
    }

    fn list_databases(&self) -> Result<Vec<String>, DbHashError> {
        Ok(self.snapshot.databases.keys().cloned().collect())
    }

    fn hash_database(&self, name: &str) -> Result<DatabaseRecord, DbHashError> {
        let command_error = |message: String| {
            DbHashError::Command(
                ErrorInfo::new("snapshot.db_hash", message)
                    .with_context("database", name)
                    .with_context("path", self.path.display().to_string()),
            )
        };
        let reply = self
            .snapshot
            .databases
            .get(name)
            .ok_or_else(|| command_error("database not present in snapshot".to_string()))?;
        if reply.ok != 1.0 {
            return Err(command_error(
                reply
                    .errmsg
                    .clone()
                    .unwrap_or_else(|| "dbHash reported failure".to_string()),
            ));
        }
        let md5 = reply
            .md5
            .clone()
            .ok_or_else(|| command_error("reply has no md5 field".to_string()))?;
        let host = reply
            .host
            .clone()
            .or_else(|| self.snapshot.host.clone())
            .unwrap_or_else(|| UNKNOWN_HOST.to_string());
        let captured_at = reply
            .captured_at
            .clone()
            .or_else(|| self.snapshot.captured_at.clone())
            .unwrap_or_default();
        Ok(DatabaseRecord {
            host,
            aggregate_digest: md5,
            collections: reply.collections.clone(),
            elapsed_ms: reply.time_millis,
            captured_at,
        })
    }
}

/// Writes `inventory` as a snapshot readable by [`SnapshotSource::open`].
pub fn write_snapshot(inventory: &ClusterInventory, path: &Path) -> Result<(), DbHashError> {
    let bytes = to_canonical_json_pretty(&SnapshotFile::from_inventory(inventory))?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| snapshot_write_error(path, err))?;
    }
    fs::write(path, bytes).map_err(|err| snapshot_write_error(path, err))
}

fn snapshot_write_error(path: &Path, err: std::io::Error) -> DbHashError {
    DbHashError::Render(
        ErrorInfo::new("snapshot.write", "failed to write inventory snapshot")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}
