//! Meadows CLI: run the Shady Meadows booking UI suite
//!
//! ## Usage
//!
//! ```bash
//! meadows run                          # smoke + sanity against $ENV (default QA)
//! meadows run --suite sanity -j 4      # four concurrent bookings
//! meadows dates today plus_3           # show ISO/UI renderings
//! meadows config --env QA              # print the resolved profile
//! ```

use clap::Parser;
use meadows_cli::handlers::{render_config, render_dates};
use meadows_cli::{run_suite, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<bool> {
    let cli = Cli::parse();
    let config = build_config(&cli);

    match cli.command {
        Commands::Run(ref args) => run_suite(&config, args),
        Commands::Dates(ref args) => {
            print!("{}", render_dates(args, chrono::Local::now().date_naive())?);
            Ok(true)
        }
        Commands::Config(ref args) => {
            println!("{}", render_config(args)?);
            Ok(true)
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}
