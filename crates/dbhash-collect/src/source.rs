use std::collections::BTreeSet;

use dbhash_core::errors::{DbHashError, ErrorInfo};
use dbhash_core::{is_system_database, ClusterInventory, DatabaseRecord, Side};
use rayon::prelude::*;
use tracing::{debug, info, warn, Span};

/// A cluster, or a stand-in for one, that can report per-database hashes.
pub trait InventorySource: Send + Sync {
    /// Human readable description with credentials removed.
    fn describe(&self) -> String;

    /// Lists every database name on the cluster, system databases included.
    fn list_databases(&self) -> Result<Vec<String>, DbHashError>;

    /// Runs the hash command for one database.
    fn hash_database(&self, name: &str) -> Result<DatabaseRecord, DbHashError>;
}

/// Filters and parallelism applied while collecting an inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectOptions {
    /// Additional databases to skip on top of the system set.
    pub exclude: BTreeSet<String>,
    /// When non-empty, only these databases are hashed.
    pub include: BTreeSet<String>,
    /// Number of databases hashed at once.
    pub concurrency: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            exclude: BTreeSet::new(),
            include: BTreeSet::new(),
            concurrency: 1,
        }
    }
}

/// Applies the system-database rule and the configured filters.
///
/// The result is sorted and free of duplicates.
pub fn select_databases(names: Vec<String>, opts: &CollectOptions) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| !is_system_database(name))
        .filter(|name| !opts.exclude.contains(name))
        .filter(|name| opts.include.is_empty() || opts.include.contains(name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Builds the inventory for one side.
///
/// Listing failures are returned. Command failures for individual databases
/// are logged and the database is left out of the inventory; any other
/// failure while hashing ends collection for the side.
pub fn collect(
    source: &dyn InventorySource,
    side: Side,
    opts: &CollectOptions,
    span: &Span,
) -> Result<ClusterInventory, DbHashError> {
    let _entered = span.enter();
    let names = source.list_databases().map_err(|err| tag_side(err, side))?;
    let selected = select_databases(names, opts);
    info!(
        %side,
        count = selected.len(),
        databases = ?selected,
        "found non-system databases"
    );

    let results = if opts.concurrency <= 1 {
        selected
            .iter()
            .map(|name| hash_one(source, side, name))
            .collect::<Vec<_>>()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.concurrency)
            .build()
            .map_err(|err| {
                DbHashError::Config(
                    ErrorInfo::new("collect.thread_pool", "failed to start hashing pool")
                        .with_hint(err.to_string()),
                )
            })?;
        pool.install(|| {
            selected
                .par_iter()
                .map(|name| span.in_scope(|| hash_one(source, side, name)))
                .collect::<Vec<_>>()
        })
    };

    let mut inventory = ClusterInventory::new();
    let mut failed = 0usize;
    for (name, result) in results {
        match result {
            Ok(record) => inventory.insert(name, record),
            Err(err) if err.is_isolated() => {
                failed += 1;
                warn!(%side, database = %name, error = %err, "dbHash failed; database omitted");
            }
            Err(err) => {
                warn!(%side, database = %name, error = %err, "cluster lost during hashing");
                return Err(tag_side(err, side));
            }
        }
    }
    info!(
        %side,
        hashed = inventory.len(),
        failed,
        "collected hashes"
    );
    Ok(inventory)
}

fn hash_one(
    source: &dyn InventorySource,
    side: Side,
    name: &str,
) -> (String, Result<DatabaseRecord, DbHashError>) {
    debug!(%side, database = name, "running dbHash");
    let result = source.hash_database(name);
    if let Ok(record) = &result {
        info!(
            %side,
            database = name,
            elapsed_ms = record.elapsed_ms,
            collections = record.collections.len(),
            "dbHash completed"
        );
    }
    (name.to_string(), result)
}

fn tag_side(err: DbHashError, side: Side) -> DbHashError {
    match err {
        DbHashError::Connection(info) => {
            DbHashError::Connection(info.with_context("side", side.as_str()))
        }
        other => other,
    }
}
