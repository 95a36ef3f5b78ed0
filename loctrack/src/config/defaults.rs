//! Default values and constants for all configuration settings.
//!
//! Contains the `DEFAULT_*` constants, clamping helpers, and the `Default`
//! implementations of each settings section.

use super::file::config_directory;
use super::settings::*;
use crate::tracking::{
    DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX, DEFAULT_MAX_RETRIES, DEFAULT_READ_TIMEOUT,
    DEFAULT_UPDATE_INTERVAL, MAX_RETRIES_LIMIT,
};

// =============================================================================
// Tracking defaults
// =============================================================================

/// Default tick period (10 seconds).
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = DEFAULT_UPDATE_INTERVAL.as_millis() as u64;

/// Default reads per tick.
pub const DEFAULT_MAX_RETRIES_SETTING: u32 = DEFAULT_MAX_RETRIES;

/// Default first backoff delay.
pub const DEFAULT_BACKOFF_BASE_MS: u64 = DEFAULT_BACKOFF_BASE.as_millis() as u64;

/// Default backoff ceiling.
pub const DEFAULT_BACKOFF_MAX_MS: u64 = DEFAULT_BACKOFF_MAX.as_millis() as u64;

/// Default bounded wait for one device read.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = DEFAULT_READ_TIMEOUT.as_millis() as u64;

// =============================================================================
// Geolocation defaults
// =============================================================================

/// Default geolocation endpoint.
pub const DEFAULT_GEOLOCATION_ENDPOINT: &str = crate::tracking::capability::DEFAULT_GEOLOCATION_URL;

/// Default log file name inside the config directory's `logs/`.
pub const DEFAULT_LOG_FILE_NAME: &str = "loctrack.log";

/// Clamps max_retries to `1..=MAX_RETRIES_LIMIT` and logs a warning if clamped.
pub(super) fn clamp_max_retries(value: u32) -> u32 {
    let clamped = value.clamp(1, MAX_RETRIES_LIMIT);
    if clamped != value {
        tracing::warn!(
            requested = value,
            min = 1,
            max = MAX_RETRIES_LIMIT,
            "tracking.max_retries out of range, clamping to {}",
            clamped
        );
    }
    clamped
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            simulation_mode: false,
            max_retries: DEFAULT_MAX_RETRIES_SETTING,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            backoff_max_ms: DEFAULT_BACKOFF_MAX_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            simulation_start: 0,
        }
    }
}

impl Default for GeolocationSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOLOCATION_ENDPOINT.to_string(),
            api_key: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: config_directory().join("logs").join(DEFAULT_LOG_FILE_NAME),
        }
    }
}
