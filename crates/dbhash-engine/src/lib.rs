#![deny(missing_docs)]
#![doc = "Reconciliation of source and destination hash inventories into ordered comparison rows."]

/// Stable fingerprints over comparison outcomes.
pub mod hash;
/// The reconciliation pass itself.
pub mod reconcile;

pub use hash::{rows_fingerprint, stable_hash_string};
pub use reconcile::{reconcile, validate_inventory};
