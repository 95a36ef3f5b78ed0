//! Host location capabilities.
//!
//! A [`LocationCapability`] is the host's one-shot "read current position"
//! operation. It returns a raw [`Fix`] or a classified [`TrackingError`]
//! (permission / unavailable / timeout / unknown).
//!
//! # Implementations
//!
//! - [`HttpGeolocationClient`] - network geolocation service over HTTPS
//! - [`UnsupportedCapability`] - environments with no location sensing
//!
//! The bounded wait for a read is enforced by
//! [`DevicePositionSource`](super::DevicePositionSource), not here, so every
//! capability gets the same timeout semantics.

mod http;
mod unsupported;

use std::future::Future;

use super::error::TrackingError;
use super::sample::Fix;

pub use http::{
    classify_response_status, GeolocationConfig, HttpGeolocationClient,
    DEFAULT_GEOLOCATION_URL, DEFAULT_HTTP_TIMEOUT,
};
pub use unsupported::UnsupportedCapability;

/// Trait for the host's location capability.
pub trait LocationCapability: Send + Sync + 'static {
    /// Request one fresh position reading.
    fn read_current_position(&self) -> impl Future<Output = Result<Fix, TrackingError>> + Send;

    /// Whether this environment can provide real positions at all.
    ///
    /// When false, the engine selects the simulated source at `init`.
    fn is_supported(&self) -> bool {
        true
    }
}
