//! Periodic status logging daemon.
//!
//! Logs the engine's status snapshot at a fixed interval, independently of
//! the sampling cadence. Useful for reviewing a tracking session afterwards.
//!
//! # Usage
//!
//! ```ignore
//! use loctrack::tracking::{spawn_status_logger, DEFAULT_LOG_INTERVAL};
//! use tokio_util::sync::CancellationToken;
//!
//! let cancellation = CancellationToken::new();
//! let handle = spawn_status_logger(
//!     engine.subscribe_status(),
//!     cancellation.clone(),
//!     DEFAULT_LOG_INTERVAL,
//! );
//! ```
//!
//! # Output Format
//!
//! Logs are emitted at DEBUG level with structured fields:
//! - `status` - idle, pending, success or error
//! - `accuracy_m` - Accuracy of the last sample in meters
//! - `age_s` - Seconds since the last sample was captured
//! - `failures` - Consecutive failed attempts
//! - `last_error` - Kind of the most recent failure

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::status::StatusSnapshot;

/// Default logging interval (30 seconds).
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(30);

/// Spawns a background task that periodically logs the status snapshot.
///
/// Stops when the cancellation token is triggered or every status sender
/// has been dropped.
///
/// The caller should check if DEBUG logging is enabled before spawning:
///
/// ```ignore
/// if tracing::enabled!(tracing::Level::DEBUG) {
///     spawn_status_logger(engine.subscribe_status(), cancel, DEFAULT_LOG_INTERVAL);
/// }
/// ```
pub fn spawn_status_logger(
    status: watch::Receiver<StatusSnapshot>,
    cancellation: CancellationToken,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if status.has_changed().is_err() {
                        tracing::debug!("Status channel closed, logger exiting");
                        break;
                    }
                    log_status(&status.borrow());
                }
                _ = cancellation.cancelled() => {
                    tracing::debug!("Status logger stopped");
                    break;
                }
            }
        }
    })
}

fn log_status(snapshot: &StatusSnapshot) {
    match snapshot.age() {
        Some(age) => {
            tracing::debug!(
                status = %snapshot.status,
                accuracy_m = ?snapshot.accuracy_meters.map(|m| format!("{:.0}", m)),
                age_s = age.as_secs(),
                failures = snapshot.consecutive_failures,
                last_error = ?snapshot.last_error_kind,
                "Tracking status"
            );
        }
        None => {
            tracing::debug!(
                status = %snapshot.status,
                failures = snapshot.consecutive_failures,
                last_error = ?snapshot.last_error_kind,
                "Tracking status (no sample yet)"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_logger_stops_on_cancel() {
        let (_tx, rx) = watch::channel(StatusSnapshot::default());
        let cancellation = CancellationToken::new();
        let handle = spawn_status_logger(rx, cancellation.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_secs(3)).await;
        cancellation.cancel();

        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_logger_exits_when_sender_dropped() {
        let (tx, rx) = watch::channel(StatusSnapshot::default());
        let handle = spawn_status_logger(rx, CancellationToken::new(), Duration::from_secs(1));

        drop(tx);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(handle.is_finished());
    }
}
