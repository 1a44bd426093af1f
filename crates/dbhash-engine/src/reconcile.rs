use std::collections::BTreeSet;

use dbhash_core::errors::{DbHashError, ErrorInfo};
use dbhash_core::{Classification, ClusterInventory, ComparisonRow, DatabaseRecord, Level, Side};

fn reconcile_error(code: &str, message: impl Into<String>, side: Side) -> DbHashError {
    DbHashError::Reconcile(ErrorInfo::new(code, message.into()).with_context("side", side.as_str()))
}

/// Rejects inventories containing an empty database or collection name as
/// malformed input, tagging the error with the offending side.
pub fn validate_inventory(inventory: &ClusterInventory, side: Side) -> Result<(), DbHashError> {
    for (name, record) in inventory {
        if name.is_empty() {
            return Err(reconcile_error(
                "engine.empty_database_name",
                "inventory contains a database with an empty name",
                side,
            ));
        }
        if record.collections.keys().any(String::is_empty) {
            return Err(reconcile_error(
                "engine.empty_collection_name",
                format!("database {name} contains a collection with an empty name"),
                side,
            ));
        }
    }
    Ok(())
}

/// Merges two inventories into an ordered sequence of comparison rows.
///
/// Databases appear in ascending name order, each database row immediately
/// followed by its collection rows in ascending name order. Collection rows
/// are only emitted when the database exists on both sides. Inputs are not
/// modified and identical inputs always produce identical output.
pub fn reconcile(
    source: &ClusterInventory,
    destination: &ClusterInventory,
) -> Result<Vec<ComparisonRow>, DbHashError> {
    validate_inventory(source, Side::Source)?;
    validate_inventory(destination, Side::Destination)?;

    let databases: BTreeSet<&str> = source.names().chain(destination.names()).collect();
    let mut rows = Vec::with_capacity(databases.len());
    for name in databases {
        let source_record = source.get(name);
        let destination_record = destination.get(name);
        rows.push(database_row(name, source_record, destination_record));
        if let (Some(source_record), Some(destination_record)) =
            (source_record, destination_record)
        {
            push_collection_rows(&mut rows, name, source_record, destination_record);
        }
    }
    Ok(rows)
}

fn database_row(
    name: &str,
    source: Option<&DatabaseRecord>,
    destination: Option<&DatabaseRecord>,
) -> ComparisonRow {
    let source_digest = source.map(|record| record.aggregate_digest.as_str());
    let destination_digest = destination.map(|record| record.aggregate_digest.as_str());
    ComparisonRow {
        level: Level::Database,
        database: name.to_string(),
        collection: String::new(),
        source_digest: source_digest.map(str::to_string),
        destination_digest: destination_digest.map(str::to_string),
        classification: Classification::decide(Level::Database, source_digest, destination_digest),
        source_host: source.map(|record| record.host.clone()),
        destination_host: destination.map(|record| record.host.clone()),
        source_elapsed_ms: source.map(|record| record.elapsed_ms),
        destination_elapsed_ms: destination.map(|record| record.elapsed_ms),
    }
}

fn push_collection_rows(
    rows: &mut Vec<ComparisonRow>,
    database: &str,
    source: &DatabaseRecord,
    destination: &DatabaseRecord,
) {
    let collections: BTreeSet<&str> = source
        .collections
        .keys()
        .chain(destination.collections.keys())
        .map(String::as_str)
        .collect();
    for name in collections {
        let source_digest = source.collections.get(name).map(String::as_str);
        let destination_digest = destination.collections.get(name).map(String::as_str);
        rows.push(ComparisonRow {
            level: Level::Collection,
            database: database.to_string(),
            collection: name.to_string(),
            source_digest: source_digest.map(str::to_string),
            destination_digest: destination_digest.map(str::to_string),
            classification: Classification::decide(
                Level::Collection,
                source_digest,
                destination_digest,
            ),
            source_host: Some(source.host.clone()),
            destination_host: Some(destination.host.clone()),
            source_elapsed_ms: None,
            destination_elapsed_ms: None,
        });
    }
}
