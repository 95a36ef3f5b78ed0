//! Background location tracking.
//!
//! This module periodically samples the device position (or a deterministic
//! simulated position when real sensing is unavailable), hands each sample to
//! a single registered consumer, recovers from sampling failures, and exposes
//! a status signal for UI indicators.
//!
//! # Architecture
//!
//! ```text
//!                    ┌──────────────────────┐
//!   init/start/stop  │   TrackingEngine     │  on_update / on_error
//!  ─────────────────►│   (facade, state)    │──────────────────────►
//!                    └──────────┬───────────┘
//!                               │ owns while running
//!                    ┌──────────▼───────────┐
//!                    │  SamplingScheduler   │  tick → attempt → deliver
//!                    └──────────┬───────────┘
//!                    ┌──────────▼───────────┐
//!                    │   RetryController    │  bounded retry + backoff
//!                    └──────────┬───────────┘
//!                    ┌──────────▼───────────┐
//!                    │    TrackingSource    │  Device(capability) | Simulated
//!                    └──────────────────────┘
//! ```
//!
//! Status snapshots are published through a `watch` channel after every
//! state change; see [`TrackingEngine::subscribe_status`].
//!
//! # Usage
//!
//! ```ignore
//! use loctrack::tracking::{EngineConfig, TrackingEngine, UnsupportedCapability};
//!
//! let engine = TrackingEngine::new(UnsupportedCapability);
//! engine.init(
//!     EngineConfig::default()
//!         .on_update(|sample| println!("{:.4}, {:.4}", sample.latitude, sample.longitude))
//!         .on_error(|error| eprintln!("{}", error)),
//! )?;
//! engine.start();
//! ```
//!
//! # Components
//!
//! - `capability` - `LocationCapability` trait, HTTP geolocation client
//! - `source` - `PositionSource` trait, device and simulated sources
//! - `retry` - `RetryController` and `BackoffPolicy`
//! - `scheduler` - `SamplingScheduler` tick loop
//! - `status` - `StatusReporter` and `StatusSnapshot`
//! - `engine` - `TrackingEngine` facade

pub mod capability;
mod config;
mod engine;
mod error;
mod events;
mod logger;
pub mod retry;
mod sample;
mod scheduler;
pub mod source;
mod state;
pub mod status;

pub use capability::{
    GeolocationConfig, HttpGeolocationClient, LocationCapability, UnsupportedCapability,
};
pub use config::{
    EngineConfig, ErrorCallback, ResolvedConfig, UpdateCallback, DEFAULT_UPDATE_INTERVAL,
    MIN_UPDATE_INTERVAL,
};
pub use engine::TrackingEngine;
pub use error::{ConfigError, TrackingError, TrackingErrorKind};
pub use events::TrackingEvent;
pub use retry::{
    AttemptOutcome, BackoffPolicy, RetryController, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX,
    DEFAULT_MAX_RETRIES, MAX_RETRIES_LIMIT,
};
pub use sample::{is_valid_coordinate, Fix, PositionSample};
pub use scheduler::SchedulerStats;
pub use source::{
    DevicePositionSource, PositionSource, SimulatedPositionSource, TrackingSource, Waypoint,
    DEFAULT_READ_TIMEOUT, WAYPOINTS,
};
pub use state::{EngineState, Lifecycle, TrackingStatus};
pub use status::{StatusReporter, StatusSnapshot};

// Status logger for session review (DEBUG level only)
pub use logger::{spawn_status_logger, DEFAULT_LOG_INTERVAL};
