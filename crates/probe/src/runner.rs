//! Scenario runner.
//!
//! A fixed pool of workers pulls scenarios from a shared queue. Each scenario
//! gets its own session, starts on the home page and runs under the
//! profile's scenario timeout. The session is closed whatever the outcome,
//! including a panic inside the scenario, and every scenario gets a result.

use crate::browser::Capture;
use crate::config::SuiteConfig;
use crate::driver::{BrowserSession, SessionFactory};
use crate::logging::scenario_span;
use crate::page_object::PageObject;
use crate::pages::Pages;
use crate::reporter::{RunSummary, ScenarioResult};
use crate::result::ProbeError;
use crate::scenario::Scenario;
use crate::wait::LoadState;
use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Default artifacts directory
pub const DEFAULT_ARTIFACTS_DIR: &str = "test-results";

/// Runner settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Concurrent scenarios
    pub workers: usize,
    /// Stop scheduling after the first failure
    pub fail_fast: bool,
    /// Screenshot policy
    pub capture: Capture,
    /// Where screenshots (and reports, for the CLI) go
    pub artifacts_dir: PathBuf,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            fail_fast: false,
            capture: Capture::OnFailure,
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
        }
    }
}

impl RunnerOptions {
    /// Set worker count (at least one)
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Enable or disable fail-fast
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set screenshot policy
    #[must_use]
    pub const fn with_capture(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }

    /// Set artifacts directory
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }
}

/// Receives progress while a run is in flight
pub trait RunObserver: Send + Sync {
    /// Run is about to start
    fn on_start(&self, _total: usize) {}

    /// A scenario finished (in completion order)
    fn on_result(&self, _result: &ScenarioResult) {}
}

struct RunContext<F> {
    factory: F,
    config: Arc<SuiteConfig>,
    options: RunnerOptions,
    observer: Option<Arc<dyn RunObserver>>,
    stop: AtomicBool,
}

type Queue = Mutex<VecDeque<(usize, Arc<dyn Scenario>)>>;
type Slots = Mutex<Vec<Option<ScenarioResult>>>;

/// Runs scenarios over sessions from a [`SessionFactory`]
pub struct ScenarioRunner<F> {
    ctx: Arc<RunContext<F>>,
}

impl<F: fmt::Debug> fmt::Debug for ScenarioRunner<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioRunner")
            .field("factory", &self.ctx.factory)
            .field("config", &self.ctx.config)
            .field("options", &self.ctx.options)
            .field("observer", &self.ctx.observer.is_some())
            .finish()
    }
}

impl<F: SessionFactory + 'static> ScenarioRunner<F> {
    /// Create a runner
    #[must_use]
    pub fn new(factory: F, config: Arc<SuiteConfig>, options: RunnerOptions) -> Self {
        Self::build(factory, config, options, None)
    }

    /// Create a runner that reports progress to `observer`
    #[must_use]
    pub fn with_observer(
        factory: F,
        config: Arc<SuiteConfig>,
        options: RunnerOptions,
        observer: Arc<dyn RunObserver>,
    ) -> Self {
        Self::build(factory, config, options, Some(observer))
    }

    fn build(
        factory: F,
        config: Arc<SuiteConfig>,
        options: RunnerOptions,
        observer: Option<Arc<dyn RunObserver>>,
    ) -> Self {
        Self {
            ctx: Arc::new(RunContext {
                factory,
                config,
                options,
                observer,
                stop: AtomicBool::new(false),
            }),
        }
    }

    /// Session factory
    #[must_use]
    pub fn factory(&self) -> &F {
        &self.ctx.factory
    }

    /// Run every scenario and collect results in scenario order
    pub async fn run(&self, suite_name: &str, scenarios: Vec<Arc<dyn Scenario>>) -> RunSummary {
        let ctx = &self.ctx;
        let project = ctx.factory.project().to_string();
        let mut summary = RunSummary::new(suite_name, ctx.config.env.clone(), project.clone(), Utc::now());
        let started = Instant::now();
        let total = scenarios.len();
        let workers = ctx.options.workers.clamp(1, total.max(1));

        tracing::info!("=== Test run started ===");
        tracing::info!(
            "{total} scenario(s) on {project}, env={}, workers={workers}",
            ctx.config.env
        );
        ctx.stop.store(false, Ordering::SeqCst);
        if let Some(ref observer) = ctx.observer {
            observer.on_start(total);
        }

        let planned: Vec<_> = scenarios
            .iter()
            .map(|s| (s.title().to_string(), s.kind(), s.row_index()))
            .collect();
        let queue: Arc<Queue> = Arc::new(Mutex::new(scenarios.into_iter().enumerate().collect()));
        let slots: Arc<Slots> = Arc::new(Mutex::new((0..total).map(|_| None).collect()));
        let mut handles = Vec::new();

        for worker_id in 0..workers {
            let ctx = Arc::clone(ctx);
            let queue = Arc::clone(&queue);
            let slots = Arc::clone(&slots);
            let project = project.clone();

            handles.push(tokio::spawn(async move {
                while let Some((position, scenario)) = next(&queue) {
                    let result = if ctx.options.fail_fast && ctx.stop.load(Ordering::SeqCst) {
                        ScenarioResult::skipped(scenario.title(), scenario.kind(), scenario.row_index())
                            .on_worker(worker_id)
                    } else {
                        execute(&ctx, scenario.as_ref(), worker_id).await
                    };

                    if result.status.is_failed() {
                        ctx.stop.store(true, Ordering::SeqCst);
                    }
                    result.log(&project);
                    if let Some(ref observer) = ctx.observer {
                        observer.on_result(&result);
                    }
                    slots.lock().unwrap_or_else(PoisonError::into_inner)[position] = Some(result);
                }
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("worker task failed: {e}");
            }
        }

        let mut slots = slots.lock().unwrap_or_else(PoisonError::into_inner);
        summary.results = planned
            .into_iter()
            .zip(slots.iter_mut())
            .map(|((title, kind, row), slot)| {
                slot.take().unwrap_or_else(|| {
                    let err = ProbeError::session("scenario never reported a result");
                    let result = ScenarioResult::failed(title, kind, row, Duration::ZERO, &err);
                    result.log(&project);
                    result
                })
            })
            .collect();
        drop(slots);
        summary.duration = started.elapsed();

        tracing::info!("{}", summary.summary());
        tracing::info!("=== Test run finished ===");
        summary
    }
}

fn next(queue: &Queue) -> Option<(usize, Arc<dyn Scenario>)> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

async fn execute<F: SessionFactory>(ctx: &RunContext<F>, scenario: &dyn Scenario, worker: usize) -> ScenarioResult {
    let span = scenario_span(scenario.title(), worker);
    async move {
        let (title, kind, row) = (scenario.title(), scenario.kind(), scenario.row_index());
        let started = Instant::now();

        let session = match ctx.factory.open().await {
            Ok(session) => session,
            Err(e) => {
                return ScenarioResult::failed(title, kind, row, started.elapsed(), &e).on_worker(worker);
            }
        };

        let budget = ctx.config.scenario_timeout();
        let outcome = AssertUnwindSafe(tokio::time::timeout(budget, async {
            let pages = Pages::new(&session, &ctx.config);
            let home = &pages.home;
            home.base().navigate(home.url_pattern(), LoadState::DomContentLoaded).await?;
            tracing::debug!("Opened {} page", home.page_name());
            scenario.run(&pages).await
        }))
        .catch_unwind()
        .await;

        let mut result = match outcome {
            Ok(Ok(Ok(()))) => ScenarioResult::passed(title, kind, row, started.elapsed()),
            Ok(Ok(Err(e))) => ScenarioResult::failed(title, kind, row, started.elapsed(), &e),
            Ok(Err(_)) => ScenarioResult::timed_out(title, kind, row, budget),
            Err(payload) => {
                let err = ProbeError::session(format!("scenario panicked: {}", panic_message(payload.as_ref())));
                ScenarioResult::failed(title, kind, row, started.elapsed(), &err)
            }
        };

        if result.status.is_failed() && ctx.options.capture == Capture::OnFailure {
            if let Some(path) = capture(session.as_ref(), &ctx.options.artifacts_dir, title).await {
                result = result.with_screenshot(path);
            }
        }

        if let Err(e) = session.close().await {
            tracing::warn!("closing session failed: {e}");
        }
        result.on_worker(worker)
    }
    .instrument(span)
    .await
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Best-effort PNG of the failing page under `<dir>/screenshots/`
async fn capture(session: &dyn BrowserSession, dir: &Path, title: &str) -> Option<PathBuf> {
    let bytes = match session.screenshot().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("screenshot failed: {e}");
            return None;
        }
    };

    let shots = dir.join("screenshots");
    let path = shots.join(format!("{}.png", slug(title)));
    let written = async {
        tokio::fs::create_dir_all(&shots).await?;
        tokio::fs::write(&path, bytes).await
    }
    .await;

    match written {
        Ok(()) => {
            tracing::info!("Screenshot saved to {}", path.display());
            Some(path)
        }
        Err(e) => {
            tracing::warn!("writing screenshot failed: {e}");
            None
        }
    }
}

/// File-name-safe form of a scenario title
fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}
