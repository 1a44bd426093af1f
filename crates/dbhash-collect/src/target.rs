use std::fmt;
use std::path::PathBuf;

use dbhash_core::errors::{DbHashError, ErrorInfo};

use crate::snapshot::SnapshotSource;
use crate::source::InventorySource;

const MONGO_SCHEMES: [&str; 2] = ["mongodb://", "mongodb+srv://"];
const SELECTION_TIMEOUT_KEY: &str = "serverSelectionTimeoutMS";

/// Default server selection timeout for live targets.
pub const DEFAULT_SERVER_SELECTION_TIMEOUT_MS: u64 = 10_000;

/// Where a side's inventory comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Live cluster connection string.
    Mongo(String),
    /// JSON snapshot on disk.
    Snapshot(PathBuf),
}

impl Target {
    /// Classifies a raw target string by scheme.
    pub fn parse(raw: &str) -> Result<Self, DbHashError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DbHashError::Config(
                ErrorInfo::new("target.empty", "target must not be empty")
                    .with_hint("pass a mongodb:// URI or a snapshot path"),
            ));
        }
        if MONGO_SCHEMES
            .iter()
            .any(|scheme| trimmed.starts_with(scheme))
        {
            Ok(Target::Mongo(trimmed.to_string()))
        } else {
            Ok(Target::Snapshot(PathBuf::from(trimmed)))
        }
    }

    /// Form of the target that is safe to log.
    pub fn redacted(&self) -> String {
        match self {
            Target::Mongo(uri) => redact_target(uri).to_string(),
            Target::Snapshot(path) => path.display().to_string(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Drops everything up to and including the last `@`.
pub fn redact_target(raw: &str) -> &str {
    raw.rsplit('@').next().unwrap_or(raw)
}

/// Adds `serverSelectionTimeoutMS` to a connection string that lacks one.
pub fn with_server_selection_timeout(uri: &str, timeout_ms: u64) -> String {
    if uri
        .to_ascii_lowercase()
        .contains(&SELECTION_TIMEOUT_KEY.to_ascii_lowercase())
    {
        return uri.to_string();
    }
    let option = format!("{SELECTION_TIMEOUT_KEY}={timeout_ms}");
    if uri.contains('?') {
        let separator = if uri.ends_with('?') || uri.ends_with('&') { "" } else { "&" };
        return format!("{uri}{separator}{option}");
    }
    let after_scheme = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);
    if after_scheme.contains('/') {
        format!("{uri}?{option}")
    } else {
        format!("{uri}/?{option}")
    }
}

/// Opens the inventory source named by `target`.
pub fn open_target(
    target: &Target,
    server_selection_timeout_ms: u64,
) -> Result<Box<dyn InventorySource>, DbHashError> {
    match target {
        Target::Snapshot(path) => Ok(Box::new(SnapshotSource::open(path.clone())?)),
        Target::Mongo(uri) => open_mongo(uri, server_selection_timeout_ms),
    }
}

#[cfg(feature = "mongodb")]
fn open_mongo(
    uri: &str,
    server_selection_timeout_ms: u64,
) -> Result<Box<dyn InventorySource>, DbHashError> {
    let source = crate::mongo::MongoSource::connect(uri, server_selection_timeout_ms)?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "mongodb"))]
fn open_mongo(
    uri: &str,
    _server_selection_timeout_ms: u64,
) -> Result<Box<dyn InventorySource>, DbHashError> {
    Err(DbHashError::Config(
        ErrorInfo::new("target.mongodb_disabled", "live cluster targets are not available")
            .with_context("target", redact_target(uri))
            .with_hint("rebuild with `--features mongodb` or pass a snapshot path"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_appended_once() {
        assert_eq!(
            with_server_selection_timeout("mongodb://h:27017", 500),
            "mongodb://h:27017/?serverSelectionTimeoutMS=500"
        );
        assert_eq!(
            with_server_selection_timeout("mongodb://h/admin", 500),
            "mongodb://h/admin?serverSelectionTimeoutMS=500"
        );
        assert_eq!(
            with_server_selection_timeout("mongodb://h/?replicaSet=rs0", 500),
            "mongodb://h/?replicaSet=rs0&serverSelectionTimeoutMS=500"
        );
        let explicit = "mongodb://h/?serverselectiontimeoutms=1";
        assert_eq!(with_server_selection_timeout(explicit, 500), explicit);
    }
}
