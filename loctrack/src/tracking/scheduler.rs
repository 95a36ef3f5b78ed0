//! Sampling scheduler - the tick loop.
//!
//! # Design
//!
//! - `new()` + `start()` → spawns the async loop
//! - `tokio::time::interval`: the first tick fires immediately, then every
//!   `update_interval`
//! - Each attempt runs in its own task so the loop keeps observing ticks and
//!   cancellation while a read is in flight
//! - Skip-if-busy: a tick that finds an attempt in flight is dropped, never
//!   queued. The busy flag lives in [`EngineShared`] and is cleared by the
//!   attempt task itself, so it also holds across a stop/start cycle
//! - Stop: the cancellation token fires; an in-flight attempt runs to
//!   completion but its outcome is discarded
//!
//! # Delivery gate
//!
//! Every state transition and callback invocation happens while holding the
//! engine's reentrant delivery gate, which `stop()` also takes. Once `stop()`
//! returns, no callback can fire. The gate is reentrant so a callback may call
//! back into the engine (for example to stop it after N failures).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, ReentrantMutex};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::config::{ErrorCallback, UpdateCallback};
use super::error::TrackingError;
use super::retry::{AttemptOutcome, RetryController};
use super::source::PositionSource;
use super::state::EngineState;
use super::status::StatusReporter;

/// Scheduler counters, cumulative over the life of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerStats {
    /// Ticks observed by the loop.
    pub ticks: u64,
    /// Ticks dropped because an attempt was in flight.
    pub skipped: u64,
    /// Attempts started.
    pub attempts: u64,
    /// Total source reads across all attempts, retries included.
    pub reads: u64,
}

#[derive(Debug, Default)]
struct Counters {
    ticks: AtomicU64,
    skipped: AtomicU64,
    attempts: AtomicU64,
    reads: AtomicU64,
}

/// State shared between the facade and the scheduler task.
pub(crate) struct EngineShared {
    pub(crate) state: Mutex<EngineState>,
    pub(crate) reporter: StatusReporter,
    pub(crate) delivery: ReentrantMutex<()>,
    busy: AtomicBool,
    counters: Counters,
}

impl EngineShared {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(EngineState::new()),
            reporter: StatusReporter::new(),
            delivery: ReentrantMutex::new(()),
            busy: AtomicBool::new(false),
            counters: Counters::default(),
        }
    }

    /// Apply `f` to the state and publish the derived status.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut EngineState) -> R) -> R {
        let mut state = self.state.lock();
        let result = f(&mut state);
        self.reporter.publish(&state);
        result
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub(crate) fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            ticks: self.counters.ticks.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            attempts: self.counters.attempts.load(Ordering::Relaxed),
            reads: self.counters.reads.load(Ordering::Relaxed),
        }
    }
}

/// Clears the busy flag when the attempt task ends, panics included.
struct InFlightGuard {
    shared: Arc<EngineShared>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.shared.busy.store(false, Ordering::Release);
    }
}

/// Owns the repeating timer for one running period of an engine.
pub struct SamplingScheduler<S: PositionSource> {
    source: Arc<S>,
    retry: RetryController,
    interval: Duration,
    shared: Arc<EngineShared>,
    on_update: UpdateCallback,
    on_error: ErrorCallback,
}

impl<S: PositionSource> SamplingScheduler<S> {
    pub(crate) fn new(
        source: Arc<S>,
        retry: RetryController,
        interval: Duration,
        shared: Arc<EngineShared>,
        on_update: UpdateCallback,
        on_error: ErrorCallback,
    ) -> Self {
        Self {
            source,
            retry,
            interval,
            shared,
            on_update,
            on_error,
        }
    }

    /// Start the tick loop as an async task.
    pub fn start(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run(cancel).await;
        })
    }

    /// Run the tick loop until cancelled.
    async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            source = self.source.name(),
            interval_ms = self.interval.as_millis() as u64,
            max_retries = self.retry.max_retries(),
            "Sampling scheduler started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight: Option<JoinHandle<AttemptOutcome>> = None;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                joined = join_in_flight(&mut in_flight) => {
                    in_flight = None;
                    self.deliver(flatten_join(joined), &cancel);
                }

                _ = ticker.tick() => {
                    if !self.on_tick(&mut in_flight, &cancel) {
                        break;
                    }
                }
            }
        }

        if in_flight.is_some() {
            tracing::debug!("Stopped with an attempt in flight; its result will be discarded");
        }

        tracing::info!("Sampling scheduler stopped");
    }

    /// Handle one tick. Returns false if the loop should exit.
    fn on_tick(
        &self,
        in_flight: &mut Option<JoinHandle<AttemptOutcome>>,
        cancel: &CancellationToken,
    ) -> bool {
        let _gate = self.shared.delivery.lock();
        if cancel.is_cancelled() {
            return false;
        }

        let tick = self.shared.counters.ticks.fetch_add(1, Ordering::Relaxed) + 1;

        if in_flight.is_some() || self.shared.is_busy() {
            self.shared.counters.skipped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(tick, "Attempt still in flight, skipping tick");
            return true;
        }

        self.shared.busy.store(true, Ordering::Release);
        self.shared.counters.attempts.fetch_add(1, Ordering::Relaxed);
        self.shared.update(|state| state.begin_attempt());

        tracing::trace!(tick, source = self.source.name(), "Tick: starting attempt");

        let guard = InFlightGuard {
            shared: Arc::clone(&self.shared),
        };
        let source = Arc::clone(&self.source);
        let retry = self.retry.clone();
        *in_flight = Some(tokio::spawn(async move {
            let _guard = guard;
            retry.attempt(source.as_ref()).await
        }));

        true
    }

    /// Record an attempt's outcome and invoke the matching callback.
    fn deliver(&self, outcome: AttemptOutcome, cancel: &CancellationToken) {
        let _gate = self.shared.delivery.lock();
        if cancel.is_cancelled() {
            tracing::debug!(reads = outcome.reads, "Discarding attempt result after stop");
            return;
        }

        self.shared
            .counters
            .reads
            .fetch_add(u64::from(outcome.reads), Ordering::Relaxed);

        match outcome.result {
            Ok(sample) => {
                self.shared.update(|state| state.record_success(sample.clone()));
                tracing::debug!(
                    latitude = sample.latitude,
                    longitude = sample.longitude,
                    accuracy_m = ?sample.accuracy_meters,
                    simulated = sample.simulated,
                    reads = outcome.reads,
                    "Position sample acquired"
                );
                (self.on_update)(sample);
            }
            Err(error) => {
                let consecutive_failures = self.shared.update(|state| {
                    state.record_failure(error.clone());
                    state.consecutive_failures
                });
                tracing::warn!(
                    kind = %error.kind(),
                    error = %error.message(),
                    consecutive_failures,
                    reads = outcome.reads,
                    "Position sampling failed"
                );
                (self.on_error)(error);
            }
        }
    }
}

/// Await the in-flight attempt, or never resolve if there is none.
async fn join_in_flight(
    in_flight: &mut Option<JoinHandle<AttemptOutcome>>,
) -> Result<AttemptOutcome, JoinError> {
    match in_flight {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

/// An attempt task that panicked is reported as an `unknown` failure.
fn flatten_join(joined: Result<AttemptOutcome, JoinError>) -> AttemptOutcome {
    joined.unwrap_or_else(|e| AttemptOutcome {
        result: Err(TrackingError::unknown(format!("sampling task failed: {}", e))),
        reads: 0,
    })
}
