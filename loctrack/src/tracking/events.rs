//! Tagged delivery events for channel-based consumers.
//!
//! See [`EngineConfig::with_event_sender`](super::EngineConfig::with_event_sender).

use super::error::TrackingError;
use super::sample::PositionSample;

/// One delivery from the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingEvent {
    /// A successful sample (`on_update`).
    Sample(PositionSample),
    /// A terminal failure for one tick (`on_error`).
    Error(TrackingError),
}

impl TrackingEvent {
    pub fn is_sample(&self) -> bool {
        matches!(self, Self::Sample(_))
    }

    pub fn sample(&self) -> Option<&PositionSample> {
        match self {
            Self::Sample(s) => Some(s),
            Self::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&TrackingError> {
        match self {
            Self::Sample(_) => None,
            Self::Error(e) => Some(e),
        }
    }
}
