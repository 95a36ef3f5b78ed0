//! Capability for hosts without any location sensing.

use super::LocationCapability;
use crate::tracking::error::TrackingError;
use crate::tracking::sample::Fix;

/// A capability that never produces a position.
///
/// Used when the process runs somewhere with no location service configured.
/// Engines built on it fall back to the simulated source at `init`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedCapability;

impl LocationCapability for UnsupportedCapability {
    async fn read_current_position(&self) -> Result<Fix, TrackingError> {
        Err(TrackingError::position_unavailable(
            "location capability not supported in this environment",
        ))
    }

    fn is_supported(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::error::TrackingErrorKind;

    #[tokio::test]
    async fn test_unsupported_reports_unavailable() {
        let capability = UnsupportedCapability;
        assert!(!capability.is_supported());

        let err = capability.read_current_position().await.unwrap_err();
        assert_eq!(err.kind(), TrackingErrorKind::PositionUnavailable);
    }
}
