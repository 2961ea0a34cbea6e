//! Meadows Probe: page-object UI suite for the Shady Meadows B&B booking site
//!
//! Drives the restful-booker demo through a browser session and checks it
//! against a data workbook: a smoke suite over the home page and a sanity
//! suite that books a room per data row.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ Workbook   │──►│ Scenarios  │──►│ Page        │──►│ Browser      │
//! │ (YAML)     │   │ smoke /    │   │ objects     │   │ session      │
//! │            │   │ sanity     │   │ home, resv. │   │ (CDP / mock) │
//! └────────────┘   └────────────┘   └─────────────┘   └──────────────┘
//!                        │
//!                        ▼
//!                  ScenarioRunner ──► RESULT lines, results.json, JUnit
//! ```
//!
//! Real browser control lives behind the `browser` feature; the [`mock`]
//! module provides a scripted site for tests.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]
mod browser;
mod config;
mod date_token;
mod driver;
#[allow(clippy::missing_errors_doc)]
mod fixture;
mod locator;
#[allow(clippy::missing_errors_doc)]
mod page_object;
mod reporter;
mod result;
mod runner;
#[allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]
mod scenario;
mod wait;

/// Run logging: console and daily-rotated file layers
pub mod logging;

/// Scripted in-memory site and sessions
#[allow(clippy::missing_panics_doc)]
pub mod mock;

/// Concrete page objects
pub mod pages;

pub use browser::{BrowserEngine, BrowserOptions, Capture};
#[cfg(feature = "browser")]
pub use browser::{CdpSession, CdpSessionFactory};
pub use config::{
    load_dotenv, selected_env, Profile, SuiteConfig, DEFAULT_ENV, DEFAULT_SCENARIO_TIMEOUT_MS,
    ENV_VAR,
};
pub use date_token::{parse_ui, resolve, resolve_now, to_iso_date, to_ui_date, DateToken, ResolvedDate};
pub use driver::{BrowserSession, ElementHandle, ElementSnapshot, PageEdge, SessionFactory};
pub use fixture::{
    require, GuestDetails, HomeRow, SanityRow, ScenarioRow, Workbook, HOME_SHEET, SANITY_SHEET,
};
pub use locator::{normalize_whitespace, Selector, TextMatcher, UrlPattern};
pub use page_object::{describe, BasePage, LocatorMap, PageObject};
pub use pages::{HomePage, Pages, ReservationPage};
pub use reporter::{
    FailureClass, FailureDetail, RunSummary, ScenarioResult, ScenarioStatus, RESULTS_JSON,
    RESULTS_XML,
};
pub use result::{ProbeError, ProbeResult};
pub use runner::{RunObserver, RunnerOptions, ScenarioRunner, DEFAULT_ARTIFACTS_DIR};
pub use scenario::{
    build_scenarios, SanityScenario, Scenario, ScenarioKind, SmokeScenario, Suite, SITE_TITLE,
    SMOKE_TITLE, WELCOME_TEXT,
};
pub use wait::{
    poll_until, ElementState, LoadState, WaitOptions, WaitOutcome, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WAIT_TIMEOUT_MS,
};
