//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use loctrack::config::ConfigFileError;
use loctrack::tracking::ConfigError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Configuration file could not be read or is invalid
    ConfigFile(ConfigFileError),
    /// Engine rejected the configuration
    Engine(ConfigError),
    /// Failed to create the geolocation client
    Capability(String),
    /// Failed to build the async runtime
    Runtime(std::io::Error),
    /// Failed to install the Ctrl-C handler
    Signal(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::ConfigFile(ConfigFileError::InvalidValue { .. })
            | CliError::Engine(_) => {
                eprintln!();
                eprintln!("Check your configuration with: loctrack config show");
                eprintln!(
                    "Or regenerate the defaults with: loctrack config init --force"
                );
            }
            CliError::Capability(_) => {
                eprintln!();
                eprintln!("Run with --simulate to track without a geolocation service.");
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }

    /// Process exit code: 2 for configuration problems, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::ConfigFile(_) | CliError::Engine(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Engine(e) => write!(f, "Invalid tracking configuration: {}", e),
            CliError::Capability(msg) => {
                write!(f, "Failed to create geolocation client: {}", msg)
            }
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Signal(msg) => write!(f, "Failed to set signal handler: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Engine(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Engine(e)
    }
}
