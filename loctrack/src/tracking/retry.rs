//! Retry controller - bounded retry with exponential backoff within one tick.
//!
//! # Policy
//!
//! - Up to `max_retries` reads per tick (this is the total read count, so a
//!   value of 3 means one initial read plus two retries).
//! - Delay before retry `n` is `base_delay * 2^(n-1)`, capped at `max_delay`.
//! - `permission_denied` is terminal on the first read.
//! - Backoff never pushes an attempt into the next tick. At most half of
//!   the update interval goes to backoff sleeps, and a retry is only made
//!   when its delay plus the slowest read seen so far still ends before the
//!   next tick. Otherwise the tick ends with the last error.

use std::time::Duration;

use tokio::time::Instant;

use super::error::{TrackingError, TrackingErrorKind};
use super::sample::PositionSample;
use super::source::PositionSource;

/// Default reads per tick.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Upper bound accepted for `max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Default delay before the first retry.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Default cap for a single backoff delay.
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(5);

/// Exponential backoff curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BACKOFF_BASE,
            max_delay: DEFAULT_BACKOFF_MAX,
        }
    }
}

impl BackoffPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay,
            max_delay,
        }
    }

    /// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1).min(20));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Clamp both delays so that none exceeds `ceiling`.
    pub fn clamped_to(self, ceiling: Duration) -> Self {
        Self {
            base_delay: self.base_delay.min(ceiling),
            max_delay: self.max_delay.min(ceiling),
        }
    }
}

/// Result of one tick's attempt.
#[derive(Debug, Clone)]
pub struct AttemptOutcome {
    /// The sample, or the terminal error for this tick.
    pub result: Result<PositionSample, TrackingError>,
    /// Number of source reads performed.
    pub reads: u32,
}

/// Wraps a position source with bounded retry.
#[derive(Debug, Clone)]
pub struct RetryController {
    max_retries: u32,
    backoff: BackoffPolicy,
    /// Total backoff allowed within one tick.
    budget: Duration,
    /// Time until the next regular tick, measured from the attempt start.
    interval: Duration,
}

impl RetryController {
    /// Create a controller for the given tick interval.
    ///
    /// `max_retries` is clamped to `1..=MAX_RETRIES_LIMIT`. The backoff budget
    /// is half of `update_interval` and no single delay may exceed it.
    pub fn new(max_retries: u32, backoff: BackoffPolicy, update_interval: Duration) -> Self {
        let budget = update_interval / 2;
        Self {
            max_retries: max_retries.clamp(1, MAX_RETRIES_LIMIT),
            backoff: backoff.clamped_to(budget),
            budget,
            interval: update_interval,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff(&self) -> BackoffPolicy {
        self.backoff
    }

    /// Total backoff allowed within one tick.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Acquire one sample, retrying retryable failures.
    pub async fn attempt<S: PositionSource>(&self, source: &S) -> AttemptOutcome {
        let next_tick = Instant::now() + self.interval;
        let mut reads = 0;
        let mut slept = Duration::ZERO;
        let mut slowest_read = Duration::ZERO;

        loop {
            reads += 1;

            let read_started = Instant::now();
            let result = source.sample().await;
            slowest_read = slowest_read.max(read_started.elapsed());

            let error = match result {
                Ok(sample) => {
                    return AttemptOutcome {
                        result: Ok(sample),
                        reads,
                    }
                }
                Err(e) => e,
            };

            if error.kind() == TrackingErrorKind::Unknown {
                tracing::warn!(
                    source = source.name(),
                    read = reads,
                    error = %error.message(),
                    "Unclassified position read failure"
                );
            }

            if !error.retryable() {
                tracing::debug!(
                    source = source.name(),
                    kind = %error.kind(),
                    "Non-retryable read failure, giving up for this tick"
                );
                return AttemptOutcome {
                    result: Err(error),
                    reads,
                };
            }

            if reads >= self.max_retries {
                tracing::debug!(
                    source = source.name(),
                    reads,
                    kind = %error.kind(),
                    "Retry budget exhausted for this tick"
                );
                return AttemptOutcome {
                    result: Err(error),
                    reads,
                };
            }

            let delay = self.backoff.delay_for(reads);
            let within_budget = slept + delay <= self.budget;
            let before_next_tick = Instant::now() + delay + slowest_read < next_tick;

            if !(within_budget && before_next_tick) {
                tracing::debug!(
                    source = source.name(),
                    reads,
                    kind = %error.kind(),
                    backoff_ms = delay.as_millis() as u64,
                    slowest_read_ms = slowest_read.as_millis() as u64,
                    "Next retry would run into the next tick, giving up for this tick"
                );
                return AttemptOutcome {
                    result: Err(error),
                    reads,
                };
            }

            tracing::debug!(
                source = source.name(),
                read = reads,
                kind = %error.kind(),
                backoff_ms = delay.as_millis() as u64,
                "Retrying position read"
            );

            tokio::time::sleep(delay).await;
            slept += delay;
        }
    }
}

impl Default for RetryController {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_RETRIES,
            BackoffPolicy::default(),
            super::config::DEFAULT_UPDATE_INTERVAL,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Source that replays a script of results and counts reads.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<PositionSample, TrackingError>>>,
        reads: AtomicU32,
        latency: Duration,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<PositionSample, TrackingError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                reads: AtomicU32::new(0),
                latency: Duration::ZERO,
            }
        }

        fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        fn reads(&self) -> u32 {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl PositionSource for ScriptedSource {
        async fn sample(&self) -> Result<PositionSample, TrackingError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TrackingError::position_unavailable("script exhausted")))
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn sample() -> PositionSample {
        PositionSample::simulated(1.0, 2.0, "Test")
    }

    fn controller(max_retries: u32) -> RetryController {
        RetryController::new(
            max_retries,
            BackoffPolicy::new(Duration::from_millis(100), Duration::from_secs(1)),
            Duration::from_secs(10),
        )
    }

    #[test]
    fn test_delay_for_doubles_and_caps() {
        let policy = BackoffPolicy::new(Duration::from_millis(500), Duration::from_secs(5));
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_secs(1));
        assert_eq!(policy.delay_for(3), Duration::from_secs(2));
        assert_eq!(policy.delay_for(4), Duration::from_secs(4));
        assert_eq!(policy.delay_for(5), Duration::from_secs(5));
        assert_eq!(policy.delay_for(40), Duration::from_secs(5));
    }

    #[test]
    fn test_backoff_clamped_to_tick_budget() {
        let controller = RetryController::new(
            3,
            BackoffPolicy::new(Duration::from_secs(2), Duration::from_secs(60)),
            Duration::from_secs(5),
        );
        assert_eq!(controller.budget(), Duration::from_millis(2_500));
        assert_eq!(controller.backoff().max_delay, Duration::from_millis(2_500));
        assert_eq!(controller.backoff().base_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_max_retries_clamped() {
        assert_eq!(controller(0).max_retries(), 1);
        assert_eq!(controller(50).max_retries(), MAX_RETRIES_LIMIT);
        assert_eq!(controller(4).max_retries(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_first_read() {
        let source = ScriptedSource::new(vec![Ok(sample())]);
        let outcome = controller(3).attempt(&source).await;

        assert!(outcome.result.is_ok());
        assert_eq!(outcome.reads, 1);
        assert_eq!(source.reads(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_then_success_within_budget() {
        let source = ScriptedSource::new(vec![
            Err(TrackingError::timeout("t1")),
            Err(TrackingError::timeout("t2")),
            Ok(sample()),
        ]);
        let start = Instant::now();
        let outcome = controller(3).attempt(&source).await;

        assert!(outcome.result.is_ok());
        assert_eq!(outcome.reads, 3);
        // 100ms + 200ms of backoff
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(310));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permission_denied_short_circuits() {
        let source = ScriptedSource::new(vec![
            Err(TrackingError::permission_denied("denied")),
            Ok(sample()),
        ]);
        let outcome = controller(5).attempt(&source).await;

        let err = outcome.result.unwrap_err();
        assert_eq!(err.kind(), TrackingErrorKind::PermissionDenied);
        assert_eq!(outcome.reads, 1);
        assert_eq!(source.reads(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_surfaces_last_error() {
        let source = ScriptedSource::new(vec![
            Err(TrackingError::timeout("first")),
            Err(TrackingError::position_unavailable("second")),
            Err(TrackingError::timeout("third")),
            Ok(sample()),
        ]);
        let outcome = controller(3).attempt(&source).await;

        let err = outcome.result.unwrap_err();
        assert_eq!(err.message(), "third");
        assert_eq!(outcome.reads, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_when_budget_runs_out() {
        let source = ScriptedSource::new(Vec::new());
        let controller = RetryController::new(
            MAX_RETRIES_LIMIT,
            BackoffPolicy::new(Duration::from_secs(1), Duration::from_secs(4)),
            Duration::from_secs(5),
        );

        let start = Instant::now();
        let outcome = controller.attempt(&source).await;

        // 1s fits the 2.5s budget, the following 2s does not
        assert!(outcome.result.is_err());
        assert_eq!(outcome.reads, 2);
        assert_eq!(source.reads(), 2);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_millis(1_010));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_reads_end_before_next_tick() {
        let source = ScriptedSource::new(Vec::new()).with_latency(Duration::from_secs(4));
        let controller = RetryController::new(
            5,
            BackoffPolicy::new(Duration::from_millis(100), Duration::from_secs(1)),
            Duration::from_secs(10),
        );

        let start = Instant::now();
        let outcome = controller.attempt(&source).await;

        // 4s read + 100ms + 4s read; a third read would end at 12.3s
        assert!(outcome.result.is_err());
        assert_eq!(outcome.reads, 2);
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
