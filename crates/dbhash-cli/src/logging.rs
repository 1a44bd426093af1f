use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use dbhash_core::errors::{DbHashError, ErrorInfo};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Installs the global subscriber: stdout always, plus `log_file` when given.
///
/// `RUST_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<(), DbHashError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| {
                    DbHashError::Config(
                        ErrorInfo::new("logging.file", "failed to open log file")
                            .with_context("path", path.display().to_string())
                            .with_hint(err.to_string()),
                    )
                })?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|err| {
            DbHashError::Config(
                ErrorInfo::new("logging.init", "failed to install log subscriber")
                    .with_hint(err.to_string()),
            )
        })
}
