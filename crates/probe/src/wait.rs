//! Wait mechanisms.
//!
//! Every wait in the suite is re-polled: the underlying check runs, and if it
//! is not yet satisfied the loop sleeps for the poll interval and tries again
//! until the deadline. A single immediate check is never enough on a page
//! that renders asynchronously.
//!
//! The loop only awaits `tokio::time::sleep`, so dropping the future (for
//! example when a scenario-level timeout fires) cancels it cleanly.

use crate::result::ProbeResult;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// Wait for the `load` event to fire
    Load,
    /// Wait for `DOMContentLoaded`
    #[default]
    DomContentLoaded,
}

impl LoadState {
    /// `document.readyState` values that satisfy this load state
    #[must_use]
    pub const fn ready_states(&self) -> &'static [&'static str] {
        match self {
            Self::Load => &["complete"],
            Self::DomContentLoaded => &["interactive", "complete"],
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => write!(f, "load"),
            Self::DomContentLoaded => write!(f, "domcontentloaded"),
        }
    }
}

/// Element state a wait can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementState {
    /// Attached and rendered with a non-empty box
    Visible,
    /// Detached or not rendered
    Hidden,
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible => write!(f, "visible"),
            Self::Hidden => write!(f, "hidden"),
        }
    }
}

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a wait operation
#[derive(Debug, Clone)]
pub struct WaitOutcome<T> {
    /// Whether the condition was met before the deadline
    pub satisfied: bool,
    /// The last value the check observed
    pub last: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of checks performed
    pub polls: u32,
}

/// Re-poll `check` until it reports success or the timeout elapses.
///
/// `check` returns whether the condition holds together with the value it
/// observed; the last observation is kept for error reporting. Errors from
/// `check` abort the wait immediately. The check always runs at least once.
pub async fn poll_until<T, F, Fut>(options: &WaitOptions, mut check: F) -> ProbeResult<WaitOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<(bool, T)>>,
{
    let start = Instant::now();
    let deadline = start + options.timeout();
    let mut polls = 0;

    loop {
        let (ok, last) = check().await?;
        polls += 1;

        let now = Instant::now();
        if ok || now >= deadline {
            return Ok(WaitOutcome {
                satisfied: ok,
                last,
                elapsed: now - start,
                polls,
            });
        }

        let remaining = deadline - now;
        tokio::time::sleep(options.poll_interval().min(remaining)).await;
    }
}
