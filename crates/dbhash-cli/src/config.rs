use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use dbhash_collect::DEFAULT_SERVER_SELECTION_TIMEOUT_MS;
use dbhash_core::errors::{DbHashError, ErrorInfo};
use dbhash_report::ReportFormat;
use serde::Deserialize;

fn default_column_padding() -> usize {
    2
}

fn default_column_cap() -> usize {
    50
}

fn default_concurrency() -> usize {
    1
}

fn default_server_selection_timeout_ms() -> u64 {
    DEFAULT_SERVER_SELECTION_TIMEOUT_MS
}

/// Optional YAML file tuning a comparison run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareConfig {
    /// Databases skipped in addition to `admin`, `config` and `local`.
    #[serde(default)]
    pub exclude_databases: BTreeSet<String>,
    /// Allow-list; empty means every non-system database.
    #[serde(default)]
    pub include_databases: BTreeSet<String>,
    /// Characters added to each column's longest literal.
    #[serde(default = "default_column_padding")]
    pub column_padding: usize,
    /// Width ceiling on the comparison sheet.
    #[serde(default = "default_column_cap")]
    pub column_cap: usize,
    /// Databases hashed at once per side.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Report encoding, `xlsx`, `csv` or `json`.
    #[serde(default)]
    pub format: Option<ReportFormat>,
    /// Server selection timeout for live targets.
    #[serde(default = "default_server_selection_timeout_ms")]
    pub server_selection_timeout_ms: u64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            exclude_databases: BTreeSet::new(),
            include_databases: BTreeSet::new(),
            column_padding: default_column_padding(),
            column_cap: default_column_cap(),
            concurrency: default_concurrency(),
            format: None,
            server_selection_timeout_ms: default_server_selection_timeout_ms(),
        }
    }
}

impl CompareConfig {
    /// Reads a config file from disk.
    pub fn load(path: &Path) -> Result<Self, DbHashError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            config_error("config.read", "failed to read config file", path, err)
        })?;
        Self::from_yaml(&contents).map_err(|err| match err {
            DbHashError::Config(info) => {
                DbHashError::Config(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }

    /// Parses config from YAML text. An empty document yields the defaults.
    pub fn from_yaml(contents: &str) -> Result<Self, DbHashError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(contents).map_err(|err| {
            DbHashError::Config(
                ErrorInfo::new("config.parse", "invalid config file").with_hint(err.to_string()),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), DbHashError> {
        if self.concurrency == 0 {
            return Err(DbHashError::Config(
                ErrorInfo::new("config.concurrency", "concurrency must be at least 1")
                    .with_context("concurrency", "0"),
            ));
        }
        if self.column_cap == 0 {
            return Err(DbHashError::Config(ErrorInfo::new(
                "config.column_cap",
                "column_cap must be at least 1",
            )));
        }
        Ok(())
    }
}

fn config_error(code: &str, message: &str, path: &Path, err: impl ToString) -> DbHashError {
    DbHashError::Config(
        ErrorInfo::new(code, message)
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}
