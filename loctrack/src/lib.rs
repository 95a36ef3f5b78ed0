//! loctrack - Background location tracking engine
//!
//! This library periodically samples the device position, delivers samples to
//! a single registered consumer, classifies and recovers from sampling
//! failures, and exposes a status signal for UI indicators.
//!
//! # High-Level API
//!
//! The [`tracking`] module provides the engine facade:
//!
//! ```ignore
//! use loctrack::tracking::{EngineConfig, HttpGeolocationClient, GeolocationConfig, TrackingEngine};
//!
//! let capability = HttpGeolocationClient::new(GeolocationConfig::default())?;
//! let engine = TrackingEngine::new(capability);
//! engine.init(EngineConfig::default().with_event_sender(tx))?;
//! engine.start();
//! ```
//!
//! Configuration can be loaded from `~/.loctrack/config.ini` via [`config`].

pub mod config;
pub mod logging;
pub mod time;
pub mod tracking;

/// Version of the loctrack library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
