//! Meadows CLI Library
//!
//! Command-line front end for the Shady Meadows booking UI suite.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;
mod runner;

pub use commands::{
    parse_viewport, Cli, ColorArg, Commands, ConfigArgs, DatesArgs, ProfileArgs, RunArgs, SuiteArg,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
pub use runner::{prepare, run_suite, PreparedRun};
