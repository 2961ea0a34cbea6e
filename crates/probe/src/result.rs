//! Result and error types for the suite.

use thiserror::Error;

/// Result type for suite operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving the site
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Element never reached the requested state
    #[error("Timed out after {timeout_ms}ms waiting for {handle} to be {state}")]
    WaitTimeout {
        /// Element description
        handle: String,
        /// Requested state (visible, hidden)
        state: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Element text did not match within the timeout
    #[error("Text mismatch on {handle}: expected {expected}, got '{actual}' (after {timeout_ms}ms)")]
    TextMismatch {
        /// Element description
        handle: String,
        /// Expected text or pattern
        expected: String,
        /// Last observed text
        actual: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Input value did not match within the timeout
    #[error("Value mismatch on {handle}: expected '{expected}', got '{actual}' (after {timeout_ms}ms)")]
    ValueMismatch {
        /// Element description
        handle: String,
        /// Expected value
        expected: String,
        /// Last observed value
        actual: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Generic assertion failure with a human-readable label
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// URL never matched the expected pattern
    #[error("Navigation timed out after {timeout_ms}ms: URL '{url}' never matched {pattern}")]
    NavigationTimeout {
        /// Pattern that was awaited
        pattern: String,
        /// Last observed URL
        url: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Element could not be resolved in the current page
    #[error("Element not found: {handle}")]
    ElementNotFound {
        /// Element description
        handle: String,
    },

    /// A data row lacks a column the scenario needs
    #[error("Missing value for column '{field}' in {sheet} row")]
    MissingField {
        /// Sheet name
        sheet: String,
        /// Column name
        field: String,
    },

    /// Fixture source missing or malformed
    #[error("Data load failed: {message}")]
    DataLoad {
        /// Error message
        message: String,
    },

    /// Configuration profile missing or malformed
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Session-level failure (protocol error, closed page, script error)
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a data load error
    #[must_use]
    pub fn data_load(message: impl Into<String>) -> Self {
        Self::DataLoad {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Assertion-class failures are expected test outcomes rather than
    /// unexpected errors.
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(
            self,
            Self::TextMismatch { .. }
                | Self::ValueMismatch { .. }
                | Self::AssertionFailed { .. }
                | Self::NavigationTimeout { .. }
        )
    }

    /// Fatal errors abort the whole run before any scenario starts.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::DataLoad { .. } | Self::Config { .. })
    }
}
