//! Scenario results and run artifacts.
//!
//! Every finished scenario produces a [`ScenarioResult`] and one `RESULT` log
//! line. The [`RunSummary`] aggregates them and writes `results.json` and a
//! JUnit `results.xml` for CI.

use crate::result::{ProbeError, ProbeResult};
use crate::scenario::ScenarioKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// JSON summary file name
pub const RESULTS_JSON: &str = "results.json";

/// JUnit file name
pub const RESULTS_XML: &str = "results.xml";

/// Outcome of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    /// Every step succeeded
    Passed,
    /// A step failed
    Failed,
    /// Not run
    Skipped,
    /// The scenario budget elapsed
    TimedOut,
}

impl ScenarioStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Failed or timed out
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed | Self::TimedOut)
    }
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
            Self::TimedOut => "TIMEDOUT",
        };
        f.write_str(s)
    }
}

/// Whether a failure is an expected test outcome or an unexpected error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureClass {
    /// A check did not hold
    Assertion,
    /// Something broke (timeout, missing element, session failure)
    Error,
}

/// Why a scenario did not pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    /// One-line message
    pub message: String,
    /// Failure class
    pub class: FailureClass,
    /// Debug rendering of the error, for error-class failures
    pub detail: Option<String>,
}

impl FailureDetail {
    /// Classify an error
    #[must_use]
    pub fn from_error(err: &ProbeError) -> Self {
        if err.is_assertion() {
            Self {
                message: err.to_string(),
                class: FailureClass::Assertion,
                detail: None,
            }
        } else {
            Self {
                message: err.to_string(),
                class: FailureClass::Error,
                detail: Some(format!("{err:?}")),
            }
        }
    }

    /// Scenario budget exhausted
    #[must_use]
    pub fn timed_out(budget: Duration) -> Self {
        Self {
            message: format!("Scenario timed out after {}ms", budget.as_millis()),
            class: FailureClass::Error,
            detail: None,
        }
    }
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario title
    pub title: String,
    /// Scenario kind
    pub kind: ScenarioKind,
    /// Zero-based row in the source sheet
    pub row_index: usize,
    /// Worker that ran the scenario
    pub worker: usize,
    /// Outcome
    pub status: ScenarioStatus,
    /// Wall time
    pub duration: Duration,
    /// Failure, if any
    pub error: Option<FailureDetail>,
    /// Data source location (`sheet:row`)
    pub location: String,
    /// Screenshot taken on failure
    pub screenshot: Option<PathBuf>,
}

impl ScenarioResult {
    fn new(title: impl Into<String>, kind: ScenarioKind, row_index: usize) -> Self {
        Self {
            title: title.into(),
            kind,
            row_index,
            worker: 0,
            status: ScenarioStatus::Passed,
            duration: Duration::ZERO,
            error: None,
            location: format!("{}:{}", kind.sheet(), row_index + 1),
            screenshot: None,
        }
    }

    /// Create a passing result
    #[must_use]
    pub fn passed(title: impl Into<String>, kind: ScenarioKind, row_index: usize, duration: Duration) -> Self {
        Self {
            duration,
            ..Self::new(title, kind, row_index)
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn failed(
        title: impl Into<String>,
        kind: ScenarioKind,
        row_index: usize,
        duration: Duration,
        err: &ProbeError,
    ) -> Self {
        Self {
            status: ScenarioStatus::Failed,
            duration,
            error: Some(FailureDetail::from_error(err)),
            ..Self::new(title, kind, row_index)
        }
    }

    /// Create a timed-out result
    #[must_use]
    pub fn timed_out(title: impl Into<String>, kind: ScenarioKind, row_index: usize, budget: Duration) -> Self {
        Self {
            status: ScenarioStatus::TimedOut,
            duration: budget,
            error: Some(FailureDetail::timed_out(budget)),
            ..Self::new(title, kind, row_index)
        }
    }

    /// Create a skipped result
    #[must_use]
    pub fn skipped(title: impl Into<String>, kind: ScenarioKind, row_index: usize) -> Self {
        Self {
            status: ScenarioStatus::Skipped,
            ..Self::new(title, kind, row_index)
        }
    }

    /// Record the worker index
    #[must_use]
    pub const fn on_worker(mut self, worker: usize) -> Self {
        self.worker = worker;
        self
    }

    /// Attach a screenshot path
    #[must_use]
    pub fn with_screenshot(mut self, path: PathBuf) -> Self {
        self.screenshot = Some(path);
        self
    }

    /// `RESULT | STATUS | proj=.. | worker=.. | time=..ms | @ location | | title`
    #[must_use]
    pub fn log_line(&self, project: &str) -> String {
        [
            "RESULT".to_string(),
            format!("{:<10}", self.status.to_string()),
            format!("proj={project}"),
            format!("worker={}", self.worker),
            format!("time={}ms", self.duration.as_millis()),
            format!("@ {}", self.location),
            format!("| {}", self.title),
        ]
        .join(" | ")
    }

    /// Emit the RESULT line, plus detail for error-class failures
    pub fn log(&self, project: &str) {
        let line = self.log_line(project);
        match self.status {
            ScenarioStatus::Passed | ScenarioStatus::Skipped => tracing::info!("{line}"),
            ScenarioStatus::Failed | ScenarioStatus::TimedOut => {
                tracing::error!("{line}");
                if let Some(ref err) = self.error {
                    tracing::error!("{}", err.message);
                    if let Some(ref detail) = err.detail {
                        tracing::error!("{detail}");
                    }
                }
            }
        }
    }
}

/// Aggregated results of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Suite name used in the JUnit report
    pub suite_name: String,
    /// Profile name
    pub env: String,
    /// Project label (browser)
    pub project: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall time of the whole run
    pub duration: Duration,
    /// Results in scenario order
    pub results: Vec<ScenarioResult>,
}

impl RunSummary {
    /// Create a summary
    #[must_use]
    pub fn new(
        suite_name: impl Into<String>,
        env: impl Into<String>,
        project: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            suite_name: suite_name.into(),
            env: env.into(),
            project: project.into(),
            started_at,
            duration: Duration::ZERO,
            results: Vec::new(),
        }
    }

    /// Number of passing scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_passed()).count()
    }

    /// Number of failed or timed-out scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_failed()).count()
    }

    /// Number of skipped scenarios
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == ScenarioStatus::Skipped)
            .count()
    }

    /// Number of scenarios
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// Every scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.status.is_passed())
    }

    /// Failed and timed-out results
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results.iter().filter(|r| r.status.is_failed()).collect()
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {} passed, {} failed, {} skipped ({} total) in {:.2}s",
            self.suite_name,
            self.passed_count(),
            self.failed_count(),
            self.skipped_count(),
            self.total_count(),
            self.duration.as_secs_f64()
        )
    }

    /// Render JUnit XML content
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<testsuite name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}" timestamp="{}">"#,
            escape_xml(&self.suite_name),
            self.total_count(),
            self.failed_count(),
            self.skipped_count(),
            self.duration.as_secs_f64(),
            self.started_at.to_rfc3339()
        ));
        xml.push('\n');

        for result in &self.results {
            xml.push_str(&format!(
                r#"  <testcase name="{}" classname="{}.{}" time="{:.3}">"#,
                escape_xml(&result.title),
                escape_xml(&self.project),
                result.kind,
                result.duration.as_secs_f64()
            ));
            xml.push('\n');

            match (&result.status, &result.error) {
                (ScenarioStatus::Skipped, _) => xml.push_str("    <skipped/>\n"),
                (_, Some(err)) => {
                    let tag = match err.class {
                        FailureClass::Assertion => "failure",
                        FailureClass::Error => "error",
                    };
                    xml.push_str(&format!(
                        "    <{tag} message=\"{}\">{}</{tag}>\n",
                        escape_xml(&err.message),
                        escape_xml(err.detail.as_deref().unwrap_or(&err.message))
                    ));
                }
                _ => {}
            }

            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    /// Write `results.json` and `results.xml` into `dir`
    pub fn write_artifacts(&self, dir: &Path) -> ProbeResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let json_path = dir.join(RESULTS_JSON);
        std::fs::write(&json_path, serde_json::to_string_pretty(self)?)?;

        let xml_path = dir.join(RESULTS_XML);
        std::fs::write(&xml_path, self.render_junit())?;

        Ok(vec![json_path, xml_path])
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        let mut run = RunSummary::new("meadows", "QA", "Chromium", Utc::now());
        run.results.push(ScenarioResult::passed(
            "Verify Core UI elements - Smoke Test",
            ScenarioKind::Smoke,
            0,
            Duration::from_millis(1200),
        ));
        run.results.push(
            ScenarioResult::failed(
                "E2E Booking #1 (today → plus_2)",
                ScenarioKind::Sanity,
                0,
                Duration::from_millis(800),
                &ProbeError::assertion("room header 'X' contains none of [\"Single\"]"),
            )
            .on_worker(1),
        );
        run.results.push(ScenarioResult::timed_out(
            "E2E Booking #2 (tomorrow → plus_3)",
            ScenarioKind::Sanity,
            1,
            Duration::from_secs(30),
        ));
        run.results.push(ScenarioResult::skipped(
            "E2E Booking #3 (today → tomorrow)",
            ScenarioKind::Sanity,
            2,
        ));
        run
    }

    mod status_tests {
        use super::*;

        #[test]
        fn test_status_predicates() {
            assert!(ScenarioStatus::Passed.is_passed());
            assert!(ScenarioStatus::TimedOut.is_failed());
            assert!(!ScenarioStatus::Skipped.is_failed());
            assert_eq!(ScenarioStatus::TimedOut.to_string(), "TIMEDOUT");
        }

        #[test]
        fn test_failure_classification() {
            let assertion = FailureDetail::from_error(&ProbeError::assertion("x"));
            assert_eq!(assertion.class, FailureClass::Assertion);
            assert!(assertion.detail.is_none());

            let error = FailureDetail::from_error(&ProbeError::ElementNotFound {
                handle: "room_h1".into(),
            });
            assert_eq!(error.class, FailureClass::Error);
            assert!(error.detail.unwrap().contains("ElementNotFound"));
        }
    }

    mod result_line_tests {
        use super::*;

        #[test]
        fn test_log_line_layout() {
            let run = summary();
            let line = run.results[1].log_line("Chromium");
            assert_eq!(
                line,
                "RESULT | FAILED     | proj=Chromium | worker=1 | time=800ms | @ Sanity:1 | | E2E Booking #1 (today → plus_2)"
            );
        }

        #[test]
        fn test_location_uses_sheet_and_row() {
            let run = summary();
            assert_eq!(run.results[0].location, "HomePage:1");
            assert_eq!(run.results[2].location, "Sanity:2");
        }
    }

    mod summary_tests {
        use super::*;

        #[test]
        fn test_counts() {
            let run = summary();
            assert_eq!(run.passed_count(), 1);
            assert_eq!(run.failed_count(), 2);
            assert_eq!(run.skipped_count(), 1);
            assert_eq!(run.total_count(), 4);
            assert!(!run.all_passed());
            assert_eq!(run.failures().len(), 2);
            assert!(run.summary().contains("1 passed, 2 failed, 1 skipped (4 total)"));
        }

        #[test]
        fn test_empty_run_passes() {
            let run = RunSummary::new("meadows", "QA", "Mock", Utc::now());
            assert!(run.all_passed());
        }

        #[test]
        fn test_junit_rendering() {
            let xml = summary().render_junit();
            assert!(xml.starts_with("<?xml"));
            assert!(xml.contains(r#"tests="4" failures="2" skipped="1""#));
            assert!(xml.contains(r#"classname="Chromium.sanity""#));
            assert!(xml.contains("<failure message=\"Assertion failed: room header &apos;X&apos;"));
            assert!(xml.contains("<error message=\"Scenario timed out after 30000ms\">"));
            assert!(xml.contains("<skipped/>"));
        }

        #[test]
        fn test_write_artifacts() {
            let dir = tempfile::tempdir().unwrap();
            let paths = summary().write_artifacts(&dir.path().join("out")).unwrap();
            assert_eq!(paths.len(), 2);
            let json = std::fs::read_to_string(&paths[0]).unwrap();
            let back: RunSummary = serde_json::from_str(&json).unwrap();
            assert_eq!(back.total_count(), 4);
            assert_eq!(back.results[2].status, ScenarioStatus::TimedOut);
            assert!(std::fs::read_to_string(&paths[1]).unwrap().contains("<testsuite"));
        }
    }

    mod escape_xml_tests {
        use super::*;

        #[test]
        fn test_escape() {
            assert_eq!(escape_xml("a & b"), "a &amp; b");
            assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
            assert_eq!(escape_xml("\"B&B\""), "&quot;B&amp;B&quot;");
        }
    }
}
