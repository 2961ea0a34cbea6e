//! Terminal output and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use meadows_probe::{RunObserver, RunSummary, ScenarioResult, ScenarioStatus};
use std::time::Duration;

/// Progress reporter for a suite run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn line(&self, text: &str) {
        match self.progress_bar {
            Some(ref pb) => pb.println(text),
            None => {
                let _ = self.term.write_line(text);
            }
        }
    }

    fn prefixed(&self, colored: console::StyledObject<&str>, plain: &str, message: &str) -> String {
        if self.use_color {
            format!("{} {message}", colored.bold())
        } else {
            format!("{plain} {message}")
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.line(&self.prefixed(style("✓").green(), "PASS", message));
        }
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        self.line(&self.prefixed(style("✗").red(), "FAIL", message));
    }

    /// Print a skip message
    pub fn skipped(&self, message: &str) {
        if !self.quiet {
            self.line(&self.prefixed(style("-").yellow(), "SKIP", message));
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.line(&self.prefixed(style("ℹ").blue(), "INFO", message));
        }
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print run summary
    pub fn summary(&self, passed: usize, failed: usize, skipped: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");

        let total = passed + failed + skipped;
        let duration_secs = duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let skipped_style = Style::new().yellow();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} scenarios in {:.2}s ({} passed, {} failed, {} skipped)",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                skipped_style.apply_to(skipped)
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} scenarios in {duration_secs:.2}s ({passed} passed, {failed} failed, {skipped} skipped)"
            ));
        }
    }

    /// Print the summary plus one line per failure
    pub fn report(&self, run: &RunSummary) {
        self.finish();
        self.summary(
            run.passed_count(),
            run.failed_count(),
            run.skipped_count(),
            run.duration,
        );
        for failure in run.failures() {
            let reason = failure
                .error
                .as_ref()
                .map_or("", |e| e.message.as_str());
            let _ = self
                .term
                .write_line(&format!("  {} ({}): {reason}", failure.title, failure.location));
        }
    }
}

impl RunObserver for ProgressReporter {
    fn on_result(&self, result: &ScenarioResult) {
        let message = format!(
            "{} [{}ms, worker {}]",
            result.title,
            result.duration.as_millis(),
            result.worker
        );
        match result.status {
            ScenarioStatus::Passed => self.success(&message),
            ScenarioStatus::Failed | ScenarioStatus::TimedOut => self.failure(&message),
            ScenarioStatus::Skipped => self.skipped(&message),
        }
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }
    }
}
