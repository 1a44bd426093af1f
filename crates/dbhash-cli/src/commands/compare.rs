use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};
use clap::Args;
use dbhash_collect::{collect, open_target, CollectOptions, Target};
use dbhash_core::errors::{DbHashError, ErrorInfo};
use dbhash_core::{ClusterInventory, RunProvenance, Side};
use dbhash_engine::reconcile;
use dbhash_report::{
    default_report_name, resolve_format, write_report, RenderOptions, ReportFormat, Summary,
};
use tracing::{error, info, info_span, warn, Span};

use super::{EXIT_FAIL, EXIT_NOTHING_TO_COMPARE, EXIT_PASS};
use crate::config::CompareConfig;

#[derive(Args, Debug, Clone, Default)]
pub struct CompareArgs {
    /// Source cluster URI or snapshot path.
    #[arg(long, env = "SOURCE_MONGODB_URI")]
    pub source: String,
    /// Destination cluster URI or snapshot path.
    #[arg(long, env = "DEST_MONGODB_URI")]
    pub destination: String,
    /// Report path; defaults to a timestamped name in the working directory.
    #[arg(long, env = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,
    /// Report format (xlsx, csv, json); inferred from the output extension otherwise.
    #[arg(long)]
    pub format: Option<String>,
    /// YAML file with filters and layout settings.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Databases hashed at once per side.
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Extra databases to skip, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,
    /// Only hash these databases, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,
    /// Server selection timeout for live targets.
    #[arg(long)]
    pub server_selection_timeout_ms: Option<u64>,
}

/// Fully resolved inputs of a comparison run.
#[derive(Debug, Clone)]
pub struct CompareSettings {
    pub source: Target,
    pub destination: Target,
    pub output: Option<PathBuf>,
    pub format: Option<ReportFormat>,
    pub collect: CollectOptions,
    pub column_padding: usize,
    pub column_cap: usize,
    pub server_selection_timeout_ms: u64,
}

impl CompareSettings {
    /// Merges the optional config file with command line values; the command line wins.
    pub fn resolve(args: &CompareArgs) -> Result<Self, DbHashError> {
        let config = match &args.config {
            Some(path) => CompareConfig::load(path)?,
            None => CompareConfig::default(),
        };
        let format = match args.format.as_deref() {
            Some(raw) => Some(raw.parse::<ReportFormat>()?),
            None => config.format,
        };
        let concurrency = args.concurrency.unwrap_or(config.concurrency);
        if concurrency == 0 {
            return Err(DbHashError::Config(
                ErrorInfo::new("run.concurrency", "concurrency must be at least 1")
                    .with_hint("pass --concurrency 1 for sequential hashing"),
            ));
        }
        Ok(Self {
            source: Target::parse(&args.source)?,
            destination: Target::parse(&args.destination)?,
            output: args.output.clone(),
            format,
            collect: CollectOptions {
                exclude: override_set(&args.exclude, config.exclude_databases),
                include: override_set(&args.include, config.include_databases),
                concurrency,
            },
            column_padding: config.column_padding,
            column_cap: config.column_cap,
            server_selection_timeout_ms: args
                .server_selection_timeout_ms
                .unwrap_or(config.server_selection_timeout_ms),
        })
    }
}

fn override_set(cli: &[String], file: BTreeSet<String>) -> BTreeSet<String> {
    let cli: BTreeSet<String> = cli
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    if cli.is_empty() {
        file
    } else {
        cli
    }
}

/// How a comparison run ended, short of an operational failure.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A report was written.
    Completed {
        summary: Summary,
        report: PathBuf,
        format: ReportFormat,
        provenance: RunProvenance,
    },
    /// Neither side had a database to compare; no report was written.
    NothingToCompare { provenance: RunProvenance },
}

impl RunOutcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Completed { summary, .. } if summary.passed() => EXIT_PASS,
            RunOutcome::Completed { .. } => EXIT_FAIL,
            RunOutcome::NothingToCompare { .. } => EXIT_NOTHING_TO_COMPARE,
        }
    }

    /// Short operator-facing block printed after the run.
    pub fn summary_block(&self) -> String {
        let mut out = String::new();
        match self {
            RunOutcome::Completed {
                summary, report, ..
            } => {
                let _ = writeln!(out, "=== COMPARISON SUMMARY ===");
                let _ = writeln!(out, "Total databases: {}", summary.total_databases);
                let _ = writeln!(out, "Database mismatches: {}", summary.database_mismatches);
                let _ = writeln!(out, "Missing databases: {}", summary.missing_databases);
                let _ = writeln!(out, "Total collections: {}", summary.total_collections);
                let _ = writeln!(
                    out,
                    "Collection mismatches: {}",
                    summary.collection_mismatches
                );
                let _ = writeln!(out, "Missing collections: {}", summary.missing_collections);
                let _ = writeln!(out, "Overall status: {}", summary.overall_status);
                let _ = writeln!(out, "Report: {}", report.display());
            }
            RunOutcome::NothingToCompare { .. } => {
                let _ = writeln!(out, "Nothing to compare: no databases found on either side.");
            }
        }
        out
    }
}

pub fn run(args: &CompareArgs) -> Result<RunOutcome, DbHashError> {
    let settings = CompareSettings::resolve(args)?;
    execute(&settings)
}

/// Collects both sides, reconciles them and writes the report.
pub fn execute(settings: &CompareSettings) -> Result<RunOutcome, DbHashError> {
    let started_at = Local::now();
    let provenance = RunProvenance::new(
        settings.source.redacted(),
        settings.destination.redacted(),
        started_at.to_rfc3339_opts(SecondsFormat::Secs, false),
    );
    let span = info_span!(
        "compare",
        source = %settings.source,
        destination = %settings.destination
    );
    let _entered = span.enter();
    info!(
        started_at = %provenance.started_at,
        concurrency = settings.collect.concurrency,
        "starting database hash comparison"
    );

    let (source, destination) = rayon::join(
        || collect_side(settings, &settings.source, Side::Source, &span),
        || collect_side(settings, &settings.destination, Side::Destination, &span),
    );
    let (source, destination) = settle_sides(source, destination)?;

    if source.is_empty() && destination.is_empty() {
        info!("no databases on either side; nothing to compare");
        return Ok(RunOutcome::NothingToCompare { provenance });
    }

    info!(
        source_databases = source.len(),
        destination_databases = destination.len(),
        "comparing hashes"
    );
    let rows = reconcile(&source, &destination)?;

    let format = resolve_format(settings.format, settings.output.as_deref());
    let report = settings
        .output
        .clone()
        .unwrap_or_else(|| default_report_name(&started_at, format));
    let render = RenderOptions {
        generated_at: started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        column_padding: settings.column_padding,
        column_cap: settings.column_cap,
    };
    let summary = write_report(&rows, &render, &report, format)?;
    log_summary(&summary, &report);

    Ok(RunOutcome::Completed {
        summary,
        report,
        format,
        provenance,
    })
}

fn collect_side(
    settings: &CompareSettings,
    target: &Target,
    side: Side,
    span: &Span,
) -> Result<ClusterInventory, DbHashError> {
    span.in_scope(|| {
        info!(%side, cluster = %target, "collecting hashes");
        let source = open_target(target, settings.server_selection_timeout_ms)?;
        collect(source.as_ref(), side, &settings.collect, span)
    })
}

fn settle_sides(
    source: Result<ClusterInventory, DbHashError>,
    destination: Result<ClusterInventory, DbHashError>,
) -> Result<(ClusterInventory, ClusterInventory), DbHashError> {
    for result in [&source, &destination] {
        if let Err(err @ DbHashError::Config(_)) = result {
            return Err(err.clone());
        }
    }
    match (source, destination) {
        (Err(src), Err(dst)) => {
            error!(
                source_error = %src,
                destination_error = %dst,
                "neither cluster could be collected"
            );
            Err(DbHashError::Connection(
                ErrorInfo::new("run.no_inventory", "neither cluster could be collected")
                    .with_context("source", src.info().message.clone())
                    .with_context("destination", dst.info().message.clone()),
            ))
        }
        (src, dst) => Ok((
            inventory_or_empty(src, Side::Source),
            inventory_or_empty(dst, Side::Destination),
        )),
    }
}

fn inventory_or_empty(
    result: Result<ClusterInventory, DbHashError>,
    side: Side,
) -> ClusterInventory {
    result.unwrap_or_else(|err| {
        warn!(%side, error = %err, "side could not be collected; treating it as empty");
        ClusterInventory::new()
    })
}

fn log_summary(summary: &Summary, report: &Path) {
    info!(
        total_databases = summary.total_databases,
        database_mismatches = summary.database_mismatches,
        missing_databases = summary.missing_databases,
        total_collections = summary.total_collections,
        collection_mismatches = summary.collection_mismatches,
        missing_collections = summary.missing_collections,
        overall_status = %summary.overall_status,
        report = %report.display(),
        "comparison complete"
    );
}
