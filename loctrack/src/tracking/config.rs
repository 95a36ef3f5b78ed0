//! Engine configuration and validation.
//!
//! [`EngineConfig`] is what callers hand to
//! [`TrackingEngine::init`](super::TrackingEngine::init). Validation turns it
//! into a [`ResolvedConfig`] with required callbacks present and all values
//! clamped into their accepted ranges.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use loctrack::tracking::EngineConfig;
//!
//! let config = EngineConfig::new(Duration::from_secs(10))
//!     .with_simulation_mode(true)
//!     .with_max_retries(3)
//!     .on_update(|sample| println!("{}, {}", sample.latitude, sample.longitude))
//!     .on_error(|error| eprintln!("{}", error));
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::error::{ConfigError, TrackingError};
use super::events::TrackingEvent;
use super::retry::{BackoffPolicy, DEFAULT_MAX_RETRIES, MAX_RETRIES_LIMIT};
use super::sample::PositionSample;
use super::source::DEFAULT_READ_TIMEOUT;

/// Default tick period.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(10);

/// Floor for the tick period. Shorter intervals are raised to this value.
pub const MIN_UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// Consumer callback for successful samples.
pub type UpdateCallback = Arc<dyn Fn(PositionSample) + Send + Sync>;

/// Consumer callback for terminal per-tick failures.
pub type ErrorCallback = Arc<dyn Fn(TrackingError) + Send + Sync>;

/// Configuration supplied to `init`.
#[derive(Clone)]
pub struct EngineConfig {
    /// Tick period.
    pub update_interval: Duration,

    /// Use the simulated source instead of the device.
    pub simulation_mode: bool,

    /// Reads per tick. `None` applies [`DEFAULT_MAX_RETRIES`].
    pub max_retries: Option<u32>,

    /// Backoff between reads within one tick.
    pub backoff: BackoffPolicy,

    /// Bounded wait for one device read.
    pub read_timeout: Duration,

    /// First waypoint index for the simulated source.
    pub simulation_start: usize,

    on_update: Option<UpdateCallback>,
    on_error: Option<ErrorCallback>,
}

impl EngineConfig {
    /// Create a configuration with the given interval and default policy.
    pub fn new(update_interval: Duration) -> Self {
        Self {
            update_interval,
            simulation_mode: false,
            max_retries: None,
            backoff: BackoffPolicy::default(),
            read_timeout: DEFAULT_READ_TIMEOUT,
            simulation_start: 0,
            on_update: None,
            on_error: None,
        }
    }

    pub fn with_simulation_mode(mut self, simulation_mode: bool) -> Self {
        self.simulation_mode = simulation_mode;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_simulation_start(mut self, simulation_start: usize) -> Self {
        self.simulation_start = simulation_start;
        self
    }

    /// Register the sample callback.
    pub fn on_update<F>(mut self, callback: F) -> Self
    where
        F: Fn(PositionSample) + Send + Sync + 'static,
    {
        self.on_update = Some(Arc::new(callback));
        self
    }

    /// Register the error callback.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(TrackingError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Route both callbacks into a single-consumer event channel.
    ///
    /// Events arrive in delivery order. Sends to a closed channel are dropped.
    pub fn with_event_sender(self, tx: mpsc::UnboundedSender<TrackingEvent>) -> Self {
        let error_tx = tx.clone();
        self.on_update(move |sample| {
            let _ = tx.send(TrackingEvent::Sample(sample));
        })
        .on_error(move |error| {
            let _ = error_tx.send(TrackingEvent::Error(error));
        })
    }

    pub fn has_callbacks(&self) -> bool {
        self.on_update.is_some() && self.on_error.is_some()
    }

    /// Validate and resolve into the form the engine runs with.
    pub fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        if self.update_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.read_timeout.is_zero() {
            return Err(ConfigError::ZeroReadTimeout);
        }
        if self.backoff.base_delay.is_zero() {
            return Err(ConfigError::InvalidBackoff(
                "base delay must be greater than zero".to_string(),
            ));
        }
        if self.backoff.max_delay < self.backoff.base_delay {
            return Err(ConfigError::InvalidBackoff(format!(
                "max delay ({}ms) is below base delay ({}ms)",
                self.backoff.max_delay.as_millis(),
                self.backoff.base_delay.as_millis()
            )));
        }
        let on_update = self
            .on_update
            .ok_or(ConfigError::MissingCallback("on_update"))?;
        let on_error = self
            .on_error
            .ok_or(ConfigError::MissingCallback("on_error"))?;

        let update_interval = clamp_update_interval(self.update_interval);
        let max_retries = clamp_max_retries(self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES));

        Ok(ResolvedConfig {
            update_interval,
            simulation_mode: self.simulation_mode,
            max_retries,
            backoff: self.backoff,
            read_timeout: self.read_timeout,
            simulation_start: self.simulation_start,
            on_update,
            on_error,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_INTERVAL)
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("update_interval", &self.update_interval)
            .field("simulation_mode", &self.simulation_mode)
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .field("read_timeout", &self.read_timeout)
            .field("simulation_start", &self.simulation_start)
            .field("on_update", &self.on_update.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// A validated configuration. Immutable for the life of an initialized engine.
#[derive(Clone)]
pub struct ResolvedConfig {
    pub update_interval: Duration,
    pub simulation_mode: bool,
    pub max_retries: u32,
    pub backoff: BackoffPolicy,
    pub read_timeout: Duration,
    pub simulation_start: usize,
    pub(crate) on_update: UpdateCallback,
    pub(crate) on_error: ErrorCallback,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("update_interval", &self.update_interval)
            .field("simulation_mode", &self.simulation_mode)
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .field("read_timeout", &self.read_timeout)
            .field("simulation_start", &self.simulation_start)
            .finish_non_exhaustive()
    }
}

/// Raises intervals below the floor and logs a warning if clamped.
fn clamp_update_interval(value: Duration) -> Duration {
    if value < MIN_UPDATE_INTERVAL {
        tracing::warn!(
            requested_ms = value.as_millis() as u64,
            min_ms = MIN_UPDATE_INTERVAL.as_millis() as u64,
            "update interval below minimum, clamping"
        );
        MIN_UPDATE_INTERVAL
    } else {
        value
    }
}

/// Clamps max_retries to `1..=MAX_RETRIES_LIMIT` and logs a warning if clamped.
fn clamp_max_retries(value: u32) -> u32 {
    let clamped = value.clamp(1, MAX_RETRIES_LIMIT);
    if clamped != value {
        tracing::warn!(
            requested = value,
            min = 1,
            max = MAX_RETRIES_LIMIT,
            "max_retries out of range, clamping to {}",
            clamped
        );
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_callbacks(config: EngineConfig) -> EngineConfig {
        config.on_update(|_| {}).on_error(|_| {})
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.update_interval, Duration::from_secs(10));
        assert!(!config.simulation_mode);
        assert!(config.max_retries.is_none());
        assert_eq!(config.read_timeout, DEFAULT_READ_TIMEOUT);
        assert!(!config.has_callbacks());
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let resolved = with_callbacks(EngineConfig::default()).resolve().unwrap();
        assert_eq!(resolved.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(resolved.update_interval, DEFAULT_UPDATE_INTERVAL);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = with_callbacks(EngineConfig::new(Duration::ZERO)).resolve();
        assert!(matches!(result, Err(ConfigError::ZeroInterval)));
    }

    #[test]
    fn test_missing_callbacks_rejected() {
        let result = EngineConfig::default().on_error(|_| {}).resolve();
        assert!(matches!(
            result,
            Err(ConfigError::MissingCallback("on_update"))
        ));

        let result = EngineConfig::default().on_update(|_| {}).resolve();
        assert!(matches!(result, Err(ConfigError::MissingCallback("on_error"))));
    }

    #[test]
    fn test_interval_below_floor_clamped() {
        let resolved = with_callbacks(EngineConfig::new(Duration::from_millis(50)))
            .resolve()
            .unwrap();
        assert_eq!(resolved.update_interval, MIN_UPDATE_INTERVAL);
    }

    #[test]
    fn test_max_retries_clamped() {
        let resolved = with_callbacks(EngineConfig::default().with_max_retries(0))
            .resolve()
            .unwrap();
        assert_eq!(resolved.max_retries, 1);

        let resolved = with_callbacks(EngineConfig::default().with_max_retries(99))
            .resolve()
            .unwrap();
        assert_eq!(resolved.max_retries, MAX_RETRIES_LIMIT);
    }

    #[test]
    fn test_invalid_backoff_rejected() {
        let config = with_callbacks(EngineConfig::default().with_backoff(BackoffPolicy::new(
            Duration::from_secs(2),
            Duration::from_secs(1),
        )));
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidBackoff(_))
        ));

        let config = with_callbacks(
            EngineConfig::default()
                .with_backoff(BackoffPolicy::new(Duration::ZERO, Duration::from_secs(1))),
        );
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidBackoff(_))
        ));
    }

    #[test]
    fn test_zero_read_timeout_rejected() {
        let config = with_callbacks(EngineConfig::default().with_read_timeout(Duration::ZERO));
        assert!(matches!(config.resolve(), Err(ConfigError::ZeroReadTimeout)));
    }

    #[test]
    fn test_event_sender_wires_both_callbacks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let resolved = EngineConfig::default()
            .with_event_sender(tx)
            .resolve()
            .unwrap();

        (resolved.on_update)(PositionSample::simulated(1.0, 2.0, "A"));
        (resolved.on_error)(TrackingError::timeout("slow"));

        assert!(matches!(rx.try_recv(), Ok(TrackingEvent::Sample(_))));
        assert!(matches!(rx.try_recv(), Ok(TrackingEvent::Error(_))));
    }

    #[test]
    fn test_debug_hides_callbacks() {
        let config = with_callbacks(EngineConfig::default());
        let debug = format!("{:?}", config);
        assert!(debug.contains("on_update: true"));
    }
}
