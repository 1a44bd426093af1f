use std::path::PathBuf;

use clap::Args;
use dbhash_collect::{
    collect, open_target, write_snapshot, CollectOptions, Target,
    DEFAULT_SERVER_SELECTION_TIMEOUT_MS,
};
use dbhash_core::errors::{DbHashError, ErrorInfo};
use dbhash_core::Side;
use tracing::{info, info_span};

#[derive(Args, Debug, Clone)]
pub struct CaptureArgs {
    /// Cluster URI or snapshot path to capture.
    #[arg(long, env = "SOURCE_MONGODB_URI")]
    pub target: String,
    /// Snapshot file to write.
    #[arg(long)]
    pub out: PathBuf,
    /// Extra databases to skip, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,
    /// Only hash these databases, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,
    /// Databases hashed at once.
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,
    /// Server selection timeout for live targets.
    #[arg(long, default_value_t = DEFAULT_SERVER_SELECTION_TIMEOUT_MS)]
    pub server_selection_timeout_ms: u64,
}

/// Hashes every selected database on the target and writes a snapshot.
///
/// Returns the number of databases captured.
pub fn run(args: &CaptureArgs) -> Result<usize, DbHashError> {
    if args.concurrency == 0 {
        return Err(DbHashError::Config(ErrorInfo::new(
            "capture.concurrency",
            "concurrency must be at least 1",
        )));
    }
    let target = Target::parse(&args.target)?;
    let span = info_span!("capture", cluster = %target);
    let source = open_target(&target, args.server_selection_timeout_ms)?;
    let opts = CollectOptions {
        exclude: args.exclude.iter().cloned().collect(),
        include: args.include.iter().cloned().collect(),
        concurrency: args.concurrency,
    };
    let inventory = collect(source.as_ref(), Side::Source, &opts, &span)?;
    write_snapshot(&inventory, &args.out)?;
    span.in_scope(|| {
        info!(
            databases = inventory.len(),
            out = %args.out.display(),
            "snapshot written"
        );
    });
    Ok(inventory.len())
}
