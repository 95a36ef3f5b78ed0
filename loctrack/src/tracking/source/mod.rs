//! Position sources.
//!
//! A [`PositionSource`] produces one [`PositionSample`] per call and may fail.
//! Two implementations exist:
//!
//! - [`DevicePositionSource`] - reads a host [`LocationCapability`] with a bounded wait
//! - [`SimulatedPositionSource`] - cycles through a fixed list of named waypoints
//!
//! [`TrackingSource`] is the variant the engine selects at `init`. The scheduler
//! and retry controller only ever see the [`PositionSource`] trait.

mod device;
mod simulated;

use std::future::Future;

use super::capability::LocationCapability;
use super::error::TrackingError;
use super::sample::PositionSample;

pub use device::{DevicePositionSource, DEFAULT_READ_TIMEOUT};
pub use simulated::{SimulatedPositionSource, Waypoint, WAYPOINTS};

/// Trait for anything that can produce a position sample.
pub trait PositionSource: Send + Sync + 'static {
    /// Acquire one sample.
    fn sample(&self) -> impl Future<Output = Result<PositionSample, TrackingError>> + Send;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// The position source chosen at `init`.
///
/// Fixed for the lifetime of an initialized engine; switching requires
/// `reset` + `init`.
pub enum TrackingSource<C: LocationCapability> {
    /// Real device reads.
    Device(DevicePositionSource<C>),
    /// Deterministic waypoint simulation.
    Simulated(SimulatedPositionSource),
}

impl<C: LocationCapability> TrackingSource<C> {
    /// Returns true if this is the simulated variant.
    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated(_))
    }
}

impl<C: LocationCapability> PositionSource for TrackingSource<C> {
    async fn sample(&self) -> Result<PositionSample, TrackingError> {
        match self {
            Self::Device(source) => source.sample().await,
            Self::Simulated(source) => source.sample().await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Device(source) => source.name(),
            Self::Simulated(source) => source.name(),
        }
    }
}
