//! Logging infrastructure for loctrack.
//!
//! Provides structured logging with file output and optional console output:
//! - Writes to `~/.loctrack/logs/loctrack.log` by default (cleared on session start)
//! - Optionally prints to stdout for CLI tailing
//! - Multi-line pretty format in the file, compact on the console
//! - Configurable via RUST_LOG environment variable
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the binary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize logging system.
///
/// Creates the log directory if needed, clears the previous log file and
/// installs the global subscriber.
///
/// # Arguments
///
/// * `log_dir` - Directory for log files
/// * `log_file` - Log filename (e.g., "loctrack.log")
/// * `stdout_enabled` - Also print events to stdout
/// * `debug` - Default to DEBUG instead of INFO when RUST_LOG is not set
///
/// # Errors
///
/// Returns error if the log directory cannot be created or the log file
/// cannot be cleared.
pub fn init_logging(
    log_dir: &Path,
    log_file: &str,
    stdout_enabled: bool,
    debug: bool,
) -> Result<LoggingGuard, io::Error> {
    let log_path = prepare_log_file(log_dir, log_file)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .pretty();

    let stdout_layer = stdout_enabled.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(true)
            .compact()
    });

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    tracing::debug!(path = %log_path.display(), "Logging initialized");

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Create `log_dir` and truncate `log_file` inside it.
fn prepare_log_file(log_dir: &Path, log_file: &str) -> Result<PathBuf, io::Error> {
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(log_file);
    fs::write(&log_path, "")?;
    Ok(log_path)
}

fn default_filter(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Default log directory (`~/.loctrack/logs`, or `./logs` without a home).
pub fn default_log_dir() -> PathBuf {
    crate::config::config_directory().join("logs")
}

/// Default log file name.
pub fn default_log_file() -> &'static str {
    "loctrack.log"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_paths() {
        assert!(default_log_dir().ends_with("logs"));
        assert_eq!(default_log_file(), "loctrack.log");
    }

    #[test]
    fn test_prepare_creates_nested_directory() {
        let temp = TempDir::new().unwrap();
        let log_dir = temp.path().join("deep").join("nested");

        let path = prepare_log_file(&log_dir, "test.log").unwrap();

        assert!(log_dir.exists());
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_prepare_clears_existing_file() {
        let temp = TempDir::new().unwrap();
        let log_file = temp.path().join("test.log");
        fs::write(&log_file, "old log data").unwrap();

        prepare_log_file(temp.path(), "test.log").unwrap();

        assert_eq!(fs::read_to_string(&log_file).unwrap(), "");
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "info");
        assert_eq!(default_filter(true), "debug");
    }

    #[test]
    fn test_guard_structure() {
        use tracing_appender::non_blocking::NonBlocking;

        let (non_blocking, guard) = NonBlocking::new(std::io::sink());
        drop(non_blocking);

        let _logging_guard = LoggingGuard { _file_guard: guard };
    }

    // Actual log output needs an integration test: the global subscriber can
    // only be set once per process.
}
