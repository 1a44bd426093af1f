//! Live cluster source over the synchronous driver API.

use chrono::{Local, SecondsFormat};
use dbhash_core::errors::{DbHashError, ErrorInfo};
use dbhash_core::DatabaseRecord;
use mongodb::bson::{doc, Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::sync::Client;
use tracing::debug;

use crate::source::InventorySource;
use crate::target::{redact_target, with_server_selection_timeout};

/// Connected cluster.
pub struct MongoSource {
    client: Client,
    display: String,
}

impl MongoSource {
    /// Connects to `uri` and verifies the connection with `ping`.
    pub fn connect(uri: &str, server_selection_timeout_ms: u64) -> Result<Self, DbHashError> {
        let display = redact_target(uri).to_string();
        let connection_error = |code: &str, err: mongodb::error::Error| {
            DbHashError::Connection(
                ErrorInfo::new(code, "failed to connect to cluster")
                    .with_context("target", display.clone())
                    .with_hint(err.to_string()),
            )
        };
        let uri = with_server_selection_timeout(uri, server_selection_timeout_ms);
        let client =
            Client::with_uri_str(&uri).map_err(|err| connection_error("mongo.client", err))?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .map_err(|err| connection_error("mongo.ping", err))?;
        debug!(cluster = %display, "ping succeeded");
        Ok(Self { client, display })
    }
}

impl InventorySource for MongoSource {
    fn describe(&self) -> String {
        self.display.clone()
    }

    fn list_databases(&self) -> Result<Vec<String>, DbHashError> {
        self.client.list_database_names(None, None).map_err(|err| {
            DbHashError::Connection(
                ErrorInfo::new("mongo.list_databases", "failed to list databases")
                    .with_context("target", self.display.clone())
                    .with_hint(err.to_string()),
            )
        })
    }

    fn hash_database(&self, name: &str) -> Result<DatabaseRecord, DbHashError> {
        let reply = self
            .client
            .database(name)
            .run_command(doc! { "dbHash": 1 }, None)
            .map_err(|err| hash_error(&self.display, name, err))?;
        record_from_reply(name, &reply)
    }
}

fn hash_error(display: &str, database: &str, err: mongodb::error::Error) -> DbHashError {
    match err.kind.as_ref() {
        ErrorKind::Io(_)
        | ErrorKind::ServerSelection { .. }
        | ErrorKind::Authentication { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => DbHashError::Connection(
            ErrorInfo::new("mongo.connection_lost", "lost connection while hashing")
                .with_context("target", display)
                .with_context("database", database)
                .with_hint(err.to_string()),
        ),
        _ => command_error(database, err.to_string()),
    }
}

fn command_error(database: &str, message: impl Into<String>) -> DbHashError {
    DbHashError::Command(
        ErrorInfo::new("mongo.db_hash", message).with_context("database", database),
    )
}

fn record_from_reply(database: &str, reply: &Document) -> Result<DatabaseRecord, DbHashError> {
    let md5 = reply
        .get_str("md5")
        .map_err(|err| command_error(database, format!("reply has no md5: {err}")))?;
    let host = reply.get_str("host").unwrap_or("unknown");
    let elapsed_ms = match reply.get("timeMillis") {
        Some(Bson::Int32(value)) => u64::try_from(*value).unwrap_or(0),
        Some(Bson::Int64(value)) => u64::try_from(*value).unwrap_or(0),
        Some(Bson::Double(value)) if *value >= 0.0 => *value as u64,
        _ => 0,
    };
    let mut record = DatabaseRecord::new(host, md5)
        .with_elapsed_ms(elapsed_ms)
        .with_captured_at(Local::now().to_rfc3339_opts(SecondsFormat::Secs, false));
    if let Ok(collections) = reply.get_document("collections") {
        for (collection, digest) in collections {
            if let Bson::String(digest) = digest {
                record = record.with_collection(collection.clone(), digest.clone());
            }
        }
    }
    Ok(record)
}
