//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show`, and `config init` for inspecting
//! and creating `~/.loctrack/config.ini`.

use clap::Subcommand;
use loctrack::config::{config_file_path, ConfigFile};
use loctrack::tracking::MIN_UPDATE_INTERVAL;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration (file values over defaults)
    Show,

    /// Create the configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Init { force } => run_init(force),
    }
}

/// Show the configuration file path.
fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

/// Show the effective configuration.
fn run_show() -> Result<(), CliError> {
    let path = config_file_path();
    let config = ConfigFile::load()?;

    if path.exists() {
        println!("Configuration: {}", path.display());
    } else {
        println!("Configuration: {} (not found, showing defaults)", path.display());
    }
    println!();

    for line in describe(&config) {
        println!("{}", line);
    }

    Ok(())
}

/// Create the configuration file.
fn run_init(force: bool) -> Result<(), CliError> {
    let path = config_file_path();

    if force {
        ConfigFile::default().save_to(&path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let (path, created) = ConfigFile::ensure_exists_at(path)?;
    if created {
        println!("Created {}", path.display());
    } else {
        println!("Configuration already exists at {}", path.display());
        println!("Use --force to overwrite it with defaults.");
    }
    Ok(())
}

/// Human-readable listing of every setting, grouped by section.
fn describe(config: &ConfigFile) -> Vec<String> {
    let tracking = &config.tracking;
    let interval_note = if tracking.update_interval() < MIN_UPDATE_INTERVAL {
        format!(" (raised to {}ms at start)", MIN_UPDATE_INTERVAL.as_millis())
    } else {
        String::new()
    };
    let endpoint = if config.geolocation.endpoint.is_empty() {
        "(disabled, simulation only)".to_string()
    } else {
        config.geolocation.endpoint.clone()
    };
    let api_key = match &config.geolocation.api_key {
        Some(_) => "(set)",
        None => "(not set)",
    };

    vec![
        "[tracking]".to_string(),
        format!(
            "  update_interval_ms = {}{}",
            tracking.update_interval_ms, interval_note
        ),
        format!("  simulation_mode    = {}", tracking.simulation_mode),
        format!("  max_retries        = {}", tracking.max_retries),
        format!("  backoff_base_ms    = {}", tracking.backoff_base_ms),
        format!("  backoff_max_ms     = {}", tracking.backoff_max_ms),
        format!("  read_timeout_ms    = {}", tracking.read_timeout_ms),
        format!("  simulation_start   = {}", tracking.simulation_start),
        String::new(),
        "[geolocation]".to_string(),
        format!("  endpoint = {}", endpoint),
        format!("  api_key  = {}", api_key),
        String::new(),
        "[logging]".to_string(),
        format!("  file = {}", config.logging.file.display()),
    ]
}
