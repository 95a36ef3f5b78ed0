//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading and logging initialization so command
//! handlers start from a ready environment.

use crate::error::CliError;
use tracing::info;
use loctrack::config::ConfigFile;
use loctrack::logging::{default_log_file, init_logging, LoggingGuard};

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner with optional debug logging.
    ///
    /// When stdout is a TTY, stdout logging is disabled so log lines don't
    /// interleave with the live sample output.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - When true, enables debug-level logging unless RUST_LOG is set
    pub fn with_debug(debug_mode: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| ".".into());
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| default_log_file().to_string());

        let stdout_enabled = !atty::is(atty::Stream::Stdout);

        let logging_guard = init_logging(&log_dir, &log_file, stdout_enabled, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("loctrack v{}", loctrack::VERSION);
        info!("loctrack CLI: {} command", command);
    }
}
