#![doc = "Command implementations behind the `dbhash-compare` binary."]

pub mod commands;
pub mod config;
pub mod logging;

pub use commands::compare::{CompareArgs, CompareSettings, RunOutcome};
pub use commands::{EXIT_FAIL, EXIT_NOTHING_TO_COMPARE, EXIT_OPERATIONAL, EXIT_PASS};
pub use config::CompareConfig;
