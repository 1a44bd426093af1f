#![deny(missing_docs)]
#![doc = "Core data model and error types for comparing database hash inventories across two clusters."]

pub mod errors;
pub mod model;
pub mod provenance;
/// Canonical JSON helpers.
pub mod serde;

pub use errors::{DbHashError, ErrorInfo};
pub use model::{
    Classification, ClusterInventory, ComparisonRow, DatabaseRecord, Level, Side, ABSENT_DIGEST,
    ABSENT_HOST,
};
pub use provenance::RunProvenance;
pub use self::serde::{from_json_slice, to_canonical_json_bytes, to_canonical_json_pretty};

/// System databases that never take part in a comparison.
pub const SYSTEM_DATABASES: [&str; 3] = ["admin", "config", "local"];

/// Returns true when `name` is one of the cluster's internal bookkeeping databases.
pub fn is_system_database(name: &str) -> bool {
    SYSTEM_DATABASES.contains(&name)
}
