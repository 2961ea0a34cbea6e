//! Run logging.
//!
//! A layered `tracing` subscriber:
//! - **stderr**: human-readable, filtered by `RUST_LOG` or the requested level
//! - **file**: daily-rotated `execution.log.YYYY-MM-DD` in the log directory,
//!   written through a non-blocking appender
//!
//! [`init`] returns a [`LogGuard`] that owns the appender's worker guard.
//! Keep it alive in `main`; dropping it flushes buffered lines.

use crate::result::{ProbeError, ProbeResult};
use std::path::{Path, PathBuf};
use tracing::Span;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Default log directory, relative to the working directory
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Log file prefix; the appender adds the date suffix
pub const LOG_FILE_PREFIX: &str = "execution.log";

/// Daily files kept by [`prune_old_logs`]
pub const MAX_LOG_FILES: usize = 14;

/// Logging setup
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Console level when `RUST_LOG` is unset (error, warn, info, debug, trace)
    pub level: String,
    /// Directory for the rotating file; `None` disables the file layer
    pub log_dir: Option<PathBuf>,
    /// Colored console output
    pub ansi: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: Some(PathBuf::from(DEFAULT_LOG_DIR)),
            ansi: true,
        }
    }
}

impl LogOptions {
    /// Set console level
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set or disable the log directory
    #[must_use]
    pub fn with_log_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.log_dir = dir;
        self
    }

    /// Enable or disable colors
    #[must_use]
    pub const fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    // The file always records at least `info` so RESULT lines are kept.
    fn file_level(&self) -> &str {
        match self.level.as_str() {
            "debug" | "trace" => &self.level,
            _ => "info",
        }
    }
}

/// Keeps the file appender alive; drop to flush
#[derive(Debug)]
pub struct LogGuard {
    file: Option<WorkerGuard>,
    path: Option<PathBuf>,
}

impl LogGuard {
    /// Directory the file layer writes to, if enabled
    #[must_use]
    pub fn log_dir(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether a file layer is active
    #[must_use]
    pub const fn has_file(&self) -> bool {
        self.file.is_some()
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(options: &LogOptions) -> ProbeResult<LogGuard> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&options.level))
        .map_err(|e| ProbeError::config(format!("invalid log level '{}': {e}", options.level)))?;

    let console = fmt::layer()
        .with_target(false)
        .with_ansi(options.ansi)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let (file, guard) = match options.log_dir {
        Some(ref dir) => {
            let (layer, guard) = file_layer(dir, options.file_level())?;
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(file)
        .with(console)
        .try_init()
        .map_err(|e| ProbeError::config(format!("logging already initialized: {e}")))?;

    Ok(LogGuard {
        file: guard,
        path: options.log_dir.clone(),
    })
}

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

fn file_layer(dir: &Path, level: &str) -> ProbeResult<(BoxedLayer, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_new(level)
        .map_err(|e| ProbeError::config(format!("invalid log level '{level}': {e}")))?;

    let layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer)
        .with_filter(filter)
        .boxed();
    Ok((layer, guard))
}

/// Remove all but the newest `keep` daily files. Errors are ignored.
pub fn prune_old_logs(dir: &Path, keep: usize) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX))
        })
        .collect();

    // date suffixes sort chronologically
    files.sort();

    if files.len() > keep {
        let excess = files.len() - keep;
        for path in &files[..excess] {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Span wrapping one scenario execution
pub fn scenario_span(title: &str, worker: usize) -> Span {
    tracing::info_span!("scenario", title = title, worker = worker)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = LogOptions::default();
            assert_eq!(opts.level, "info");
            assert_eq!(opts.log_dir, Some(PathBuf::from("logs")));
        }

        #[test]
        fn test_file_level_never_drops_below_info() {
            assert_eq!(LogOptions::default().with_level("warn").file_level(), "info");
            assert_eq!(LogOptions::default().with_level("debug").file_level(), "debug");
        }
    }

    mod file_tests {
        use super::*;

        #[test]
        fn test_file_layer_writes_and_flushes_on_drop() {
            let dir = tempfile::tempdir().unwrap();
            let (layer, guard) = file_layer(dir.path(), "info").unwrap();
            let subscriber = tracing_subscriber::registry().with(layer);

            tracing::subscriber::with_default(subscriber, || {
                tracing::info!("RESULT | PASSED | unit");
                tracing::debug!("filtered out");
            });
            drop(guard);

            let entries: Vec<_> = std::fs::read_dir(dir.path())
                .unwrap()
                .filter_map(Result::ok)
                .collect();
            assert_eq!(entries.len(), 1);
            let name = entries[0].file_name().to_string_lossy().to_string();
            assert!(name.starts_with(LOG_FILE_PREFIX));

            let content = std::fs::read_to_string(entries[0].path()).unwrap();
            assert!(content.contains("RESULT | PASSED | unit"));
            assert!(!content.contains("filtered out"));
        }

        #[test]
        fn test_prune_keeps_newest() {
            let dir = tempfile::tempdir().unwrap();
            for day in ["2031-01-01", "2031-01-02", "2031-01-03"] {
                std::fs::write(dir.path().join(format!("{LOG_FILE_PREFIX}.{day}")), "x").unwrap();
            }
            std::fs::write(dir.path().join("other.txt"), "x").unwrap();

            prune_old_logs(dir.path(), 2);

            let mut left: Vec<_> = std::fs::read_dir(dir.path())
                .unwrap()
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect();
            left.sort();
            assert_eq!(
                left,
                vec![
                    "execution.log.2031-01-02".to_string(),
                    "execution.log.2031-01-03".to_string(),
                    "other.txt".to_string(),
                ]
            );
        }

        #[test]
        fn test_prune_missing_dir_is_noop() {
            prune_old_logs(Path::new("/nonexistent/logs"), 1);
        }
    }
}
