//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types; conversion into runtime types lives here too
//! so callers never touch raw milliseconds.

use std::path::PathBuf;
use std::time::Duration;

use crate::tracking::{BackoffPolicy, EngineConfig, GeolocationConfig};

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    /// Sampling cadence and retry policy
    pub tracking: TrackingSettings,
    /// Network geolocation service
    pub geolocation: GeolocationSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// `[tracking]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSettings {
    /// Tick period in milliseconds.
    pub update_interval_ms: u64,
    /// Use the simulated source instead of the device.
    pub simulation_mode: bool,
    /// Reads per tick (1-10).
    pub max_retries: u32,
    /// First backoff delay in milliseconds.
    pub backoff_base_ms: u64,
    /// Backoff ceiling in milliseconds.
    pub backoff_max_ms: u64,
    /// Bounded wait for one device read in milliseconds.
    pub read_timeout_ms: u64,
    /// First waypoint index for the simulation.
    pub simulation_start: usize,
}

/// `[geolocation]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct GeolocationSettings {
    /// Service endpoint. Empty disables device reads.
    pub endpoint: String,
    /// API key, if the service needs one.
    pub api_key: Option<String>,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path.
    pub file: PathBuf,
}

impl TrackingSettings {
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            Duration::from_millis(self.backoff_base_ms),
            Duration::from_millis(self.backoff_max_ms),
        )
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl ConfigFile {
    /// Build an engine configuration from the `[tracking]` section.
    ///
    /// The result has no callbacks; the caller registers them before `init`.
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.tracking.update_interval())
            .with_simulation_mode(self.tracking.simulation_mode)
            .with_max_retries(self.tracking.max_retries)
            .with_backoff(self.tracking.backoff())
            .with_read_timeout(self.tracking.read_timeout())
            .with_simulation_start(self.tracking.simulation_start)
    }

    /// Build the geolocation client configuration.
    ///
    /// The transport timeout follows the read timeout.
    pub fn geolocation_config(&self) -> GeolocationConfig {
        GeolocationConfig {
            endpoint: self.geolocation.endpoint.clone(),
            api_key: self.geolocation.api_key.clone(),
            request_timeout: self.tracking.read_timeout(),
        }
    }
}
