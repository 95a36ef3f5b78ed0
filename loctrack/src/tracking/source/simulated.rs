//! Simulated position source.
//!
//! Cycles deterministically through [`WAYPOINTS`], wrapping after the last
//! entry. Used when `simulation_mode` is requested or when the host has no
//! location capability, so the scheduler keeps being exercised.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::PositionSource;
use crate::tracking::error::TrackingError;
use crate::tracking::sample::PositionSample;

/// A named, fixed coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl Waypoint {
    const fn new(name: &'static str, latitude: f64, longitude: f64) -> Self {
        Self {
            name,
            latitude,
            longitude,
        }
    }
}

/// The fixed, ordered waypoint route.
pub const WAYPOINTS: &[Waypoint] = &[
    Waypoint::new("Raffles Place", 1.284_0, 103.851_4),
    Waypoint::new("Marina Bay", 1.283_4, 103.860_7),
    Waypoint::new("Chinatown", 1.283_8, 103.844_1),
    Waypoint::new("Orchard Road", 1.304_8, 103.831_8),
    Waypoint::new("Bugis Junction", 1.299_6, 103.855_4),
    Waypoint::new("Changi Airport", 1.364_4, 103.991_5),
];

/// Deterministic waypoint generator.
pub struct SimulatedPositionSource {
    waypoints: &'static [Waypoint],
    next: AtomicUsize,
}

impl SimulatedPositionSource {
    /// Create a source starting at the first waypoint.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a source starting at `offset` (taken modulo the route length).
    pub fn starting_at(offset: usize) -> Self {
        Self {
            waypoints: WAYPOINTS,
            next: AtomicUsize::new(offset % WAYPOINTS.len()),
        }
    }

    /// Index of the waypoint the next call will return.
    pub fn next_index(&self) -> usize {
        self.next.load(Ordering::Relaxed)
    }

    /// Return the current waypoint and advance the pointer.
    fn advance(&self) -> Waypoint {
        let len = self.waypoints.len();
        let index = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |i| Some((i + 1) % len))
            .unwrap_or_default();
        self.waypoints[index % len]
    }
}

impl Default for SimulatedPositionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionSource for SimulatedPositionSource {
    async fn sample(&self) -> Result<PositionSample, TrackingError> {
        let waypoint = self.advance();

        tracing::trace!(
            waypoint = waypoint.name,
            latitude = waypoint.latitude,
            longitude = waypoint.longitude,
            "Simulated position"
        );

        Ok(PositionSample::simulated(
            waypoint.latitude,
            waypoint.longitude,
            waypoint.name,
        ))
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
