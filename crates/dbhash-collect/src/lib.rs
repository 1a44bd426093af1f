#![deny(missing_docs)]
#![doc = "Inventory collection: per-database hashing against live clusters or JSON snapshots."]

#[cfg(feature = "mongodb")]
pub mod mongo;
pub mod snapshot;
/// Inventory sources and the collection pass.
pub mod source;
/// Target strings and redaction.
pub mod target;

pub use snapshot::{write_snapshot, DbHashReply, SnapshotFile, SnapshotSource};
pub use source::{collect, select_databases, CollectOptions, InventorySource};
pub use target::{
    open_target, redact_target, with_server_selection_timeout, Target,
    DEFAULT_SERVER_SELECTION_TIMEOUT_MS,
};
