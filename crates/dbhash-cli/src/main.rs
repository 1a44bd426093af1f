use std::path::PathBuf;
use std::process::ExitCode;

use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use dbhash_cli::commands::capture::{self, CaptureArgs};
use dbhash_cli::commands::compare::{self, CompareArgs};
use dbhash_cli::logging::init_logging;
use dbhash_cli::EXIT_OPERATIONAL;
use dbhash_core::errors::DbHashError;
use tracing::error;

#[derive(Parser, Debug)]
#[command(
    name = "dbhash-compare",
    about = "Compare per-database hashes between a source and destination cluster"
)]
struct Cli {
    /// Log at debug level.
    #[arg(long, global = true, env = "VERBOSE", value_parser = FalseyValueParser::new())]
    verbose: bool,
    /// Also append logs, without colours, to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hash both clusters and write a comparison report.
    Compare(CompareArgs),
    /// Hash one cluster and write an inventory snapshot.
    Capture(CaptureArgs),
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("{err}");
        return ExitCode::from(EXIT_OPERATIONAL);
    }

    match cli.command {
        Command::Compare(args) => match compare::run(&args) {
            Ok(outcome) => {
                print!("{}", outcome.summary_block());
                ExitCode::from(outcome.exit_code())
            }
            Err(err) => fail(err),
        },
        Command::Capture(args) => match capture::run(&args) {
            Ok(count) => {
                println!("Captured {count} databases to {}", args.out.display());
                ExitCode::SUCCESS
            }
            Err(err) => fail(err),
        },
    }
}

fn fail(err: DbHashError) -> ExitCode {
    error!(error = %err, "run failed");
    eprintln!("{err}");
    ExitCode::from(EXIT_OPERATIONAL)
}
