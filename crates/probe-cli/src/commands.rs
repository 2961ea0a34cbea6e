//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use meadows_probe::logging::DEFAULT_LOG_DIR;
use meadows_probe::Suite;
use std::path::PathBuf;

/// Meadows: page-object UI suite for the Shady Meadows B&B booking site
#[derive(Parser, Debug)]
#[command(name = "meadows")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the smoke and/or sanity suite
    Run(RunArgs),

    /// Print ISO and UI renderings of date tokens
    Dates(DatesArgs),

    /// Show the resolved profile
    Config(ConfigArgs),
}

/// Profile selection shared by `run` and `config`
#[derive(clap::Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Profile name (defaults to $ENV, then QA)
    #[arg(long)]
    pub env: Option<String>,

    /// Profile file
    #[arg(long, default_value = "config/config.json")]
    pub config: PathBuf,

    /// Environment file loaded before the profile is selected
    #[arg(long, default_value = "config/.env")]
    pub dotenv: PathBuf,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Suite to run
    #[arg(short, long, default_value = "all")]
    pub suite: SuiteArg,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Data workbook
    #[arg(long, default_value = "testData/testData.yaml")]
    pub data: PathBuf,

    /// Number of concurrent scenarios
    #[arg(short = 'j', long, default_value = "1")]
    pub workers: usize,

    /// Browser engine (only chromium can be driven)
    #[arg(short, long, default_value = "chromium")]
    pub browser: String,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Disable the Chromium sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Path to the Chromium binary
    #[arg(long)]
    pub chromium: Option<String>,

    /// Fixed viewport as WIDTHxHEIGHT (default: native window size)
    #[arg(long)]
    pub viewport: Option<String>,

    /// Stop scheduling scenarios after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Never take failure screenshots
    #[arg(long)]
    pub no_screenshots: bool,

    /// List the scenarios without running them
    #[arg(long)]
    pub list: bool,

    /// Output directory for results.json, results.xml and screenshots
    #[arg(short, long, default_value = "test-results")]
    pub output: PathBuf,

    /// Directory for the rotating run log
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,
}

/// Arguments for the dates command
#[derive(Parser, Debug)]
pub struct DatesArgs {
    /// Tokens to resolve (today, tomorrow, plus_N)
    #[arg(default_values_t = ["today".to_string(), "tomorrow".to_string()])]
    pub tokens: Vec<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,
}

/// Suite selection
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SuiteArg {
    /// Home page checks
    Smoke,
    /// End-to-end booking per data row
    Sanity,
    /// Smoke, then sanity
    #[default]
    All,
}

impl From<SuiteArg> for Suite {
    fn from(arg: SuiteArg) -> Self {
        match arg {
            SuiteArg::Smoke => Self::Smoke,
            SuiteArg::Sanity => Self::Sanity,
            SuiteArg::All => Self::All,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Parse `WIDTHxHEIGHT`
pub fn parse_viewport(raw: &str) -> Option<(u32, u32)> {
    let (w, h) = raw.trim().split_once(['x', 'X'])?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}
