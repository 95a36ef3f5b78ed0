//! Core state types for the tracking engine.
//!
//! - [`Lifecycle`] - Engine lifecycle (uninitialized → idle → running ⇄ stopped)
//! - [`TrackingStatus`] - Four-state status shown to the UI
//! - [`EngineState`] - The single mutable value object owned by an engine
//!
//! # Invariants
//!
//! The mutators on [`EngineState`] are the only way status changes, and each
//! keeps the invariants together:
//! - `Success` implies `last_sample` is set and `consecutive_failures == 0`
//! - `Error` implies `last_error` is set

use std::fmt;

use super::error::TrackingError;
use super::sample::PositionSample;

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// `init` has not succeeded yet (or the engine was reset).
    #[default]
    Uninitialized,
    /// Configured, never started.
    Idle,
    /// Timer active.
    Running,
    /// Timer cancelled; state kept for inspection.
    Stopped,
}

impl Lifecycle {
    pub fn is_initialized(&self) -> bool {
        !matches!(self, Self::Uninitialized)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Sampling status as displayed by status indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingStatus {
    /// Before the first tick, or after stop.
    #[default]
    Idle,
    /// An attempt is in flight.
    Pending,
    /// The last attempt produced a sample.
    Success,
    /// The last attempt failed terminally.
    Error,
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Engine state snapshot.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    pub lifecycle: Lifecycle,
    pub status: TrackingStatus,
    pub consecutive_failures: u32,
    pub last_sample: Option<PositionSample>,
    pub last_error: Option<TrackingError>,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// An attempt has started.
    pub fn begin_attempt(&mut self) {
        self.status = TrackingStatus::Pending;
    }

    /// An attempt produced a sample.
    pub fn record_success(&mut self, sample: PositionSample) {
        self.last_sample = Some(sample);
        self.consecutive_failures = 0;
        self.status = TrackingStatus::Success;
    }

    /// An attempt failed terminally.
    pub fn record_failure(&mut self, error: TrackingError) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_error = Some(error);
        self.status = TrackingStatus::Error;
    }

    /// Return to idle status (stop or reset). Samples and errors are kept.
    pub fn go_idle(&mut self) {
        self.status = TrackingStatus::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = EngineState::new();
        assert_eq!(state.lifecycle, Lifecycle::Uninitialized);
        assert_eq!(state.status, TrackingStatus::Idle);
        assert_eq!(state.consecutive_failures, 0);
        assert!(state.last_sample.is_none());
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_success_resets_failures() {
        let mut state = EngineState::new();
        state.record_failure(TrackingError::timeout("1"));
        state.record_failure(TrackingError::timeout("2"));
        assert_eq!(state.consecutive_failures, 2);
        assert_eq!(state.status, TrackingStatus::Error);

        state.record_success(PositionSample::simulated(1.0, 2.0, "A"));
        assert_eq!(state.consecutive_failures, 0);
        assert_eq!(state.status, TrackingStatus::Success);
        assert!(state.last_sample.is_some());
        // Last error kept for diagnostics
        assert!(state.last_error.is_some());
    }

    #[test]
    fn test_failures_monotonic() {
        let mut state = EngineState::new();
        let mut previous = 0;
        for _ in 0..5 {
            state.record_failure(TrackingError::position_unavailable("x"));
            assert!(state.consecutive_failures > previous);
            previous = state.consecutive_failures;
        }
    }

    #[test]
    fn test_go_idle_preserves_data() {
        let mut state = EngineState::new();
        state.record_success(PositionSample::simulated(1.0, 2.0, "A"));
        state.go_idle();
        assert_eq!(state.status, TrackingStatus::Idle);
        assert!(state.last_sample.is_some());
    }

    #[test]
    fn test_display() {
        assert_eq!(Lifecycle::Running.to_string(), "running");
        assert_eq!(TrackingStatus::Pending.to_string(), "pending");
        assert!(Lifecycle::Stopped.is_initialized());
        assert!(!Lifecycle::Uninitialized.is_initialized());
    }
}
