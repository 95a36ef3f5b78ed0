//! Device position source - one fresh reading from the host capability.

use std::sync::Arc;
use std::time::Duration;

use super::PositionSource;
use crate::tracking::capability::LocationCapability;
use crate::tracking::error::TrackingError;
use crate::tracking::sample::PositionSample;

/// Default bounded wait for one device read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads the host location capability with a bounded wait.
///
/// The capability's own failure classification passes through unchanged.
/// Two failures are added here:
/// - the read exceeding `read_timeout` becomes `timeout`
/// - out-of-range coordinates become `unknown`
pub struct DevicePositionSource<C: LocationCapability> {
    capability: Arc<C>,
    read_timeout: Duration,
}

impl<C: LocationCapability> DevicePositionSource<C> {
    pub fn new(capability: Arc<C>, read_timeout: Duration) -> Self {
        Self {
            capability,
            read_timeout,
        }
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }
}

impl<C: LocationCapability> PositionSource for DevicePositionSource<C> {
    async fn sample(&self) -> Result<PositionSample, TrackingError> {
        let fix = tokio::time::timeout(self.read_timeout, self.capability.read_current_position())
            .await
            .map_err(|_| {
                TrackingError::timeout(format!(
                    "no position within {}ms",
                    self.read_timeout.as_millis()
                ))
            })??;

        let sample = PositionSample::from_fix(fix);
        if !sample.is_valid() {
            return Err(TrackingError::unknown(format!(
                "capability returned invalid position (lat={}, lon={}, accuracy={})",
                fix.latitude, fix.longitude, fix.accuracy_meters
            )));
        }

        tracing::trace!(
            latitude = sample.latitude,
            longitude = sample.longitude,
            accuracy_m = fix.accuracy_meters,
            "Device position read"
        );

        Ok(sample)
    }

    fn name(&self) -> &'static str {
        "device"
    }
}
