//! Environment-selected suite configuration.
//!
//! `config/config.json` maps profile names to site settings:
//!
//! ```json
//! { "QA": { "baseURL": "https://automationintesting.online", "defaultTimeout": 10000 } }
//! ```
//!
//! The active profile comes from the `ENV` variable (default `QA`), which may
//! itself be set by `config/.env`. The resulting [`SuiteConfig`] is built once
//! at startup and shared read-only (`Arc<SuiteConfig>`) with every component.

use crate::result::{ProbeError, ProbeResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Environment variable selecting the profile
pub const ENV_VAR: &str = "ENV";

/// Profile used when `ENV` is unset
pub const DEFAULT_ENV: &str = "QA";

/// Default whole-scenario budget (30 seconds)
pub const DEFAULT_SCENARIO_TIMEOUT_MS: u64 = 30_000;

/// One entry of the profile file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Root URL relative navigations resolve against
    #[serde(rename = "baseURL")]
    pub base_url: String,
    /// Per-wait timeout in milliseconds
    #[serde(default)]
    pub default_timeout: Option<u64>,
    /// Whole-scenario timeout in milliseconds
    #[serde(default)]
    pub scenario_timeout: Option<u64>,
    /// Poll interval for waits in milliseconds
    #[serde(default)]
    pub poll_interval: Option<u64>,
}

/// Resolved, immutable configuration for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteConfig {
    /// Active profile name
    pub env: String,
    /// Base location
    pub base_url: String,
    /// Default wait timeout in milliseconds
    pub default_timeout_ms: u64,
    /// Whole-scenario timeout in milliseconds
    pub scenario_timeout_ms: u64,
    /// Poll interval in milliseconds
    pub poll_interval_ms: u64,
}

impl SuiteConfig {
    /// Build a configuration directly (tests, embedding)
    #[must_use]
    pub fn new(env: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            env: env.into(),
            base_url: base_url.into(),
            default_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            scenario_timeout_ms: DEFAULT_SCENARIO_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set default wait timeout
    #[must_use]
    pub const fn with_default_timeout(mut self, ms: u64) -> Self {
        self.default_timeout_ms = ms;
        self
    }

    /// Set whole-scenario timeout
    #[must_use]
    pub const fn with_scenario_timeout(mut self, ms: u64) -> Self {
        self.scenario_timeout_ms = ms;
        self
    }

    /// Set poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Load the profile named by `env`, or by `$ENV`, or [`DEFAULT_ENV`].
    pub fn load(path: &Path, env: Option<&str>) -> ProbeResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw, &selected_env(env))
    }

    /// Parse the profile file and select `env`
    pub fn from_json(raw: &str, env: &str) -> ProbeResult<Self> {
        let profiles: BTreeMap<String, Profile> = serde_json::from_str(raw)
            .map_err(|e| ProbeError::config(format!("malformed profile file: {e}")))?;
        let profile = profiles
            .get(env)
            .ok_or_else(|| ProbeError::config(format!("No config for ENV=\"{env}\"")))?;
        if profile.base_url.trim().is_empty() {
            return Err(ProbeError::config(format!("profile {env} has an empty baseURL")));
        }

        Ok(Self {
            env: env.to_string(),
            base_url: profile.base_url.clone(),
            default_timeout_ms: profile.default_timeout.unwrap_or(DEFAULT_WAIT_TIMEOUT_MS),
            scenario_timeout_ms: profile
                .scenario_timeout
                .unwrap_or(DEFAULT_SCENARIO_TIMEOUT_MS),
            poll_interval_ms: profile.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        })
    }

    /// Resolve `path` against the base location. Absolute URLs pass through.
    #[must_use]
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Wait options using `timeout_ms` or the default timeout
    #[must_use]
    pub fn wait_options(&self, timeout_ms: Option<u64>) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timeout_ms.unwrap_or(self.default_timeout_ms))
            .with_poll_interval(self.poll_interval_ms)
    }

    /// Whole-scenario budget
    #[must_use]
    pub const fn scenario_timeout(&self) -> Duration {
        Duration::from_millis(self.scenario_timeout_ms)
    }
}

/// Profile name from the argument, `$ENV`, or the default
#[must_use]
pub fn selected_env(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(ENV_VAR).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_ENV.to_string())
}

/// Load a `.env` file into the process environment if it exists.
///
/// Returns whether a file was loaded. Variables already set win.
pub fn load_dotenv(path: &Path) -> ProbeResult<bool> {
    if !path.exists() {
        return Ok(false);
    }
    dotenvy::from_path(path)
        .map(|()| true)
        .map_err(|e| ProbeError::config(format!("cannot load {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PROFILES: &str = r#"{
        "QA":   { "baseURL": "https://automationintesting.online/", "defaultTimeout": 10000 },
        "UAT":  { "baseURL": "https://uat.example.test", "defaultTimeout": 2500,
                  "scenarioTimeout": 60000, "pollInterval": 50 },
        "BAD":  { "baseURL": "  " }
    }"#;

    mod profile_tests {
        use super::*;

        #[test]
        fn test_selects_named_profile() {
            let cfg = SuiteConfig::from_json(PROFILES, "UAT").unwrap();
            assert_eq!(cfg.env, "UAT");
            assert_eq!(cfg.base_url, "https://uat.example.test");
            assert_eq!(cfg.default_timeout_ms, 2500);
            assert_eq!(cfg.scenario_timeout_ms, 60_000);
            assert_eq!(cfg.poll_interval_ms, 50);
        }

        #[test]
        fn test_defaults_for_optional_keys() {
            let cfg = SuiteConfig::from_json(PROFILES, "QA").unwrap();
            assert_eq!(cfg.default_timeout_ms, 10_000);
            assert_eq!(cfg.scenario_timeout_ms, DEFAULT_SCENARIO_TIMEOUT_MS);
            assert_eq!(cfg.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_missing_profile_is_fatal() {
            let err = SuiteConfig::from_json(PROFILES, "PROD").unwrap_err();
            assert!(err.is_fatal());
            assert!(err.to_string().contains("PROD"));
        }

        #[test]
        fn test_empty_base_url_rejected() {
            assert!(SuiteConfig::from_json(PROFILES, "BAD").is_err());
        }

        #[test]
        fn test_malformed_json_is_config_error() {
            let err = SuiteConfig::from_json("{ nope", "QA").unwrap_err();
            assert!(matches!(err, ProbeError::Config { .. }));
        }

        #[test]
        fn test_explicit_env_wins() {
            assert_eq!(selected_env(Some("UAT")), "UAT");
        }
    }

    mod file_tests {
        use super::*;

        #[test]
        fn test_load_from_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(PROFILES.as_bytes()).unwrap();
            let cfg = SuiteConfig::load(file.path(), Some("QA")).unwrap();
            assert_eq!(cfg.base_url, "https://automationintesting.online/");
        }

        #[test]
        fn test_missing_file_is_config_error() {
            let err = SuiteConfig::load(Path::new("/nonexistent/config.json"), Some("QA"))
                .unwrap_err();
            assert!(err.is_fatal());
        }

        #[test]
        fn test_missing_dotenv_is_not_an_error() {
            assert!(!load_dotenv(Path::new("/nonexistent/.env")).unwrap());
        }
    }

    mod url_tests {
        use super::*;

        #[test]
        fn test_resolve_url_joins_cleanly() {
            let cfg = SuiteConfig::new("QA", "https://site.test/");
            assert_eq!(cfg.resolve_url("/"), "https://site.test/");
            assert_eq!(cfg.resolve_url("reservation/1"), "https://site.test/reservation/1");
            assert_eq!(cfg.resolve_url("/#rooms"), "https://site.test/#rooms");
        }

        #[test]
        fn test_absolute_url_passes_through() {
            let cfg = SuiteConfig::new("QA", "https://site.test");
            assert_eq!(cfg.resolve_url("http://other.test/x"), "http://other.test/x");
        }

        #[test]
        fn test_wait_options_override() {
            let cfg = SuiteConfig::new("QA", "https://site.test")
                .with_default_timeout(1234)
                .with_poll_interval(7);
            assert_eq!(cfg.wait_options(None).timeout_ms, 1234);
            assert_eq!(cfg.wait_options(Some(50)).timeout_ms, 50);
            assert_eq!(cfg.wait_options(None).poll_interval_ms, 7);
        }
    }
}
