//! Status reporter - publishes status snapshots derived from engine state.
//!
//! The reporter has no timers. The scheduler and the facade call
//! [`StatusReporter::publish`] after every state change and subscribers see
//! the latest [`StatusSnapshot`] through a `watch` channel.
//!
//! # Usage
//!
//! ```ignore
//! let mut rx = engine.subscribe_status();
//! while rx.changed().await.is_ok() {
//!     let snapshot = rx.borrow().clone();
//!     println!("{} ({:?} ago)", snapshot.status, snapshot.age());
//! }
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::error::TrackingErrorKind;
use super::state::{EngineState, TrackingStatus};

/// Observational snapshot for UI status indicators.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusSnapshot {
    pub status: TrackingStatus,

    /// Accuracy of the last sample, if any and if the sample declared one.
    pub accuracy_meters: Option<f64>,

    /// Capture instant of the last sample.
    pub last_update: Option<DateTime<Utc>>,

    pub consecutive_failures: u32,

    /// Kind of the most recent failure, kept across later successes.
    pub last_error_kind: Option<TrackingErrorKind>,
}

impl StatusSnapshot {
    /// Derive a snapshot from engine state.
    pub fn from_state(state: &EngineState) -> Self {
        Self {
            status: state.status,
            accuracy_meters: state.last_sample.as_ref().and_then(|s| s.accuracy_meters),
            last_update: state.last_sample.as_ref().map(|s| s.timestamp),
            consecutive_failures: state.consecutive_failures,
            last_error_kind: state.last_error.as_ref().map(|e| e.kind()),
        }
    }

    /// Time since the last sample was captured.
    pub fn age(&self) -> Option<Duration> {
        self.last_update.map(crate::time::elapsed_since)
    }

    /// True when the UI should offer a permission-recovery prompt.
    pub fn needs_permission(&self) -> bool {
        self.status == TrackingStatus::Error
            && self.last_error_kind == Some(TrackingErrorKind::PermissionDenied)
    }
}

/// Publishes [`StatusSnapshot`]s to any number of subscribers.
pub struct StatusReporter {
    tx: watch::Sender<StatusSnapshot>,
}

impl StatusReporter {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StatusSnapshot::default());
        Self { tx }
    }

    /// Publish the snapshot derived from `state`.
    ///
    /// Subscribers are only woken when the snapshot actually changes.
    pub fn publish(&self, state: &EngineState) {
        let snapshot = StatusSnapshot::from_state(state);
        self.tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    /// Latest snapshot.
    pub fn snapshot(&self) -> StatusSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::error::TrackingError;
    use crate::tracking::sample::{Fix, PositionSample};

    #[test]
    fn test_snapshot_from_success() {
        let mut state = EngineState::new();
        let sample = PositionSample::from_fix(Fix {
            latitude: 1.0,
            longitude: 2.0,
            accuracy_meters: 12.0,
        });
        let timestamp = sample.timestamp;
        state.record_success(sample);

        let snapshot = StatusSnapshot::from_state(&state);
        assert_eq!(snapshot.status, TrackingStatus::Success);
        assert_eq!(snapshot.accuracy_meters, Some(12.0));
        assert_eq!(snapshot.last_update, Some(timestamp));
        assert!(snapshot.age().is_some());
        assert!(!snapshot.needs_permission());
    }

    #[test]
    fn test_permission_prompt_flag() {
        let mut state = EngineState::new();
        state.record_failure(TrackingError::permission_denied("denied"));

        let snapshot = StatusSnapshot::from_state(&state);
        assert!(snapshot.needs_permission());
        assert!(snapshot.age().is_none());
    }

    #[test]
    fn test_publish_notifies_subscribers() {
        let reporter = StatusReporter::new();
        let mut rx = reporter.subscribe();
        assert!(!rx.has_changed().unwrap());

        let mut state = EngineState::new();
        state.begin_attempt();
        reporter.publish(&state);

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status, TrackingStatus::Pending);
        assert_eq!(reporter.snapshot().status, TrackingStatus::Pending);
    }

    #[test]
    fn test_publish_unchanged_does_not_notify() {
        let reporter = StatusReporter::new();
        let mut rx = reporter.subscribe();

        reporter.publish(&EngineState::new());
        assert!(!rx.has_changed().unwrap());
        let _ = rx.borrow_and_update();
    }
}
