//! The `run` command: load profile and data, launch the browser, run, report.

use crate::commands::{parse_viewport, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use meadows_probe::logging::{self, LogOptions, MAX_LOG_FILES};
use meadows_probe::{
    build_scenarios, load_dotenv, BrowserEngine, BrowserOptions, Capture, RunObserver, RunSummary, RunnerOptions,
    Scenario, SuiteConfig, Workbook,
};
use std::sync::Arc;

/// Everything resolved before a browser is launched
#[derive(Debug)]
pub struct PreparedRun {
    /// Active profile
    pub config: Arc<SuiteConfig>,
    /// Scenarios in run order
    pub scenarios: Vec<Arc<dyn Scenario>>,
    /// Browser parameters
    pub browser: BrowserOptions,
    /// Runner parameters
    pub runner: RunnerOptions,
}

/// Resolve profile, workbook and options. Fails on any fatal input error.
pub fn prepare(args: &RunArgs) -> CliResult<PreparedRun> {
    if load_dotenv(&args.profile.dotenv)? {
        tracing::debug!("Loaded {}", args.profile.dotenv.display());
    }
    let config = SuiteConfig::load(&args.profile.config, args.profile.env.as_deref())?;
    let workbook = Workbook::load(&args.data)?;
    let scenarios = build_scenarios(&workbook, args.suite.into())?;

    let capture = if args.no_screenshots {
        Capture::Never
    } else {
        Capture::OnFailure
    };

    let engine: BrowserEngine = args.browser.parse()?;
    let mut browser = BrowserOptions::default()
        .with_engine(engine)
        .with_headless(args.headless)
        .with_capture(capture);
    if let Some(ref raw) = args.viewport {
        let (w, h) = parse_viewport(raw)
            .ok_or_else(|| CliError::invalid_argument(format!("viewport '{raw}' is not WIDTHxHEIGHT")))?;
        browser = browser.with_viewport(w, h);
    }
    if let Some(ref path) = args.chromium {
        browser = browser.with_chromium_path(path.clone());
    }
    if args.no_sandbox {
        browser = browser.with_no_sandbox();
    }
    browser.validate()?;

    if args.workers == 0 {
        return Err(CliError::invalid_argument("--workers must be at least 1"));
    }
    let runner = RunnerOptions::default()
        .with_workers(args.workers)
        .with_fail_fast(args.fail_fast)
        .with_capture(capture)
        .with_artifacts_dir(args.output.clone());

    Ok(PreparedRun {
        config: Arc::new(config),
        scenarios,
        browser,
        runner,
    })
}

/// Execute the `run` command. Returns whether every scenario passed.
pub fn run_suite(config: &CliConfig, args: &RunArgs) -> CliResult<bool> {
    let use_color = config.color.should_color();
    let _guard = logging::init(
        &LogOptions::default()
            .with_level(config.verbosity.log_level())
            .with_log_dir(Some(args.log_dir.clone()))
            .with_ansi(use_color),
    )?;
    logging::prune_old_logs(&args.log_dir, MAX_LOG_FILES);

    let prepared = prepare(args)?;
    let suite_name = format!("meadows-{}", meadows_probe::Suite::from(args.suite));

    if args.list {
        for scenario in &prepared.scenarios {
            println!(
                "{}:{}\t{}",
                scenario.kind().sheet(),
                scenario.row_index() + 1,
                scenario.title()
            );
        }
        return Ok(true);
    }

    let mut reporter = ProgressReporter::new(use_color, config.verbosity.is_quiet());
    reporter.header(&format!(
        "{suite_name} on {} ({})",
        prepared.config.base_url, prepared.config.env
    ));
    if !config.verbosity.is_verbose() {
        reporter.start_progress(prepared.scenarios.len() as u64, "scenarios");
    }
    let reporter = Arc::new(reporter);

    let summary = execute(prepared, &suite_name, Arc::clone(&reporter) as Arc<dyn RunObserver>)?;

    reporter.report(&summary);
    let written = summary.write_artifacts(&args.output)?;
    for path in written {
        reporter.info(&format!("Wrote {}", path.display()));
    }
    Ok(summary.all_passed())
}

#[cfg(feature = "browser")]
fn execute(prepared: PreparedRun, suite_name: &str, observer: Arc<dyn RunObserver>) -> CliResult<RunSummary> {
    use meadows_probe::{CdpSessionFactory, ScenarioRunner};

    let factory = CdpSessionFactory::new(prepared.browser)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let runner = ScenarioRunner::with_observer(factory, prepared.config, prepared.runner, observer);
    Ok(runtime.block_on(runner.run(suite_name, prepared.scenarios)))
}

#[cfg(not(feature = "browser"))]
fn execute(_prepared: PreparedRun, _suite_name: &str, _observer: Arc<dyn RunObserver>) -> CliResult<RunSummary> {
    Err(CliError::config(
        "browser support not compiled in. Rebuild with --features browser",
    ))
}
