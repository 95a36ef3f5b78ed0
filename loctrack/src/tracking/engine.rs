//! Tracking engine facade.
//!
//! [`TrackingEngine`] owns the engine state, the status reporter and at most
//! one running scheduler. It is the only type callers need:
//!
//! ```ignore
//! let engine = TrackingEngine::new(HttpGeolocationClient::new(GeolocationConfig::default())?);
//! engine.init(EngineConfig::default().with_event_sender(tx))?;
//! engine.start();
//! // ...
//! engine.stop();
//! ```
//!
//! Lifecycle: uninitialized → (init) → idle → (start) → running → (stop) →
//! stopped → (start) → running. `reset` returns to uninitialized from any
//! state.
//!
//! Every method is synchronous and safe to call from any thread, including
//! from inside an `on_update`/`on_error` callback.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::capability::LocationCapability;
use super::config::{EngineConfig, ResolvedConfig};
use super::error::ConfigError;
use super::retry::RetryController;
use super::scheduler::{EngineShared, SamplingScheduler, SchedulerStats};
use super::source::{
    DevicePositionSource, PositionSource, SimulatedPositionSource, TrackingSource,
};
use super::state::{EngineState, Lifecycle};
use super::status::StatusSnapshot;

/// Handle to one running scheduler task.
struct SchedulerHandle {
    cancel: CancellationToken,
    _task: JoinHandle<()>,
}

/// Facade-only state, guarded separately from [`EngineState`].
struct Inner<C: LocationCapability> {
    config: Option<ResolvedConfig>,
    source: Option<Arc<TrackingSource<C>>>,
    scheduler: Option<SchedulerHandle>,
}

/// Background location tracking engine.
///
/// Lock order is delivery gate → facade → state; no lock is held across an
/// await point.
pub struct TrackingEngine<C: LocationCapability> {
    capability: Arc<C>,
    shared: Arc<EngineShared>,
    inner: Mutex<Inner<C>>,
}

impl<C: LocationCapability> TrackingEngine<C> {
    /// Create an uninitialized engine over a host location capability.
    pub fn new(capability: C) -> Self {
        Self::with_shared_capability(Arc::new(capability))
    }

    /// Create an engine over a capability that is shared with other owners.
    pub fn with_shared_capability(capability: Arc<C>) -> Self {
        Self {
            capability,
            shared: Arc::new(EngineShared::new()),
            inner: Mutex::new(Inner {
                config: None,
                source: None,
                scheduler: None,
            }),
        }
    }

    /// Validate the configuration and select the position source.
    ///
    /// Calling `init` on an already initialized engine is a no-op; use
    /// [`reset`](Self::reset) first to reconfigure.
    pub fn init(&self, config: EngineConfig) -> Result<(), ConfigError> {
        let _gate = self.shared.delivery.lock();
        let mut inner = self.inner.lock();

        if self.lifecycle().is_initialized() {
            tracing::warn!("Tracking engine already initialized, ignoring init");
            return Ok(());
        }

        let resolved = config.resolve()?;
        let source = self.select_source(&resolved);

        tracing::info!(
            interval_ms = resolved.update_interval.as_millis() as u64,
            max_retries = resolved.max_retries,
            source = source.name(),
            "Tracking engine initialized"
        );

        inner.source = Some(Arc::new(source));
        inner.config = Some(resolved);
        self.shared.update(|state| state.lifecycle = Lifecycle::Idle);
        Ok(())
    }

    /// Start periodic sampling. The first tick fires immediately.
    ///
    /// After a `stop()` with a read still in flight, that first tick is
    /// skipped and sampling resumes on the following tick.
    ///
    /// Ignored before `init` or while already running. Must be called from
    /// within a Tokio runtime.
    pub fn start(&self) {
        let _gate = self.shared.delivery.lock();
        let mut inner = self.inner.lock();

        match self.lifecycle() {
            Lifecycle::Uninitialized => {
                tracing::warn!("start() called before init(), ignoring");
                return;
            }
            Lifecycle::Running => {
                tracing::debug!("Tracking engine already running");
                return;
            }
            Lifecycle::Idle | Lifecycle::Stopped => {}
        }

        let (config, source) = match (inner.config.as_ref(), inner.source.as_ref()) {
            (Some(config), Some(source)) => (config, Arc::clone(source)),
            _ => return,
        };

        if tokio::runtime::Handle::try_current().is_err() {
            tracing::error!("start() called outside a Tokio runtime, ignoring");
            return;
        }

        let retry = RetryController::new(
            config.max_retries,
            config.backoff,
            config.update_interval,
        );
        let scheduler = SamplingScheduler::new(
            source,
            retry,
            config.update_interval,
            Arc::clone(&self.shared),
            Arc::clone(&config.on_update),
            Arc::clone(&config.on_error),
        );

        let cancel = CancellationToken::new();
        let task = scheduler.start(cancel.clone());
        inner.scheduler = Some(SchedulerHandle {
            cancel,
            _task: task,
        });

        self.shared.update(|state| state.lifecycle = Lifecycle::Running);
        tracing::info!("Tracking engine started");
    }

    /// Stop periodic sampling.
    ///
    /// After this returns no callback fires until the next `start`. A read
    /// already in flight is left to finish and its result is discarded.
    pub fn stop(&self) {
        let _gate = self.shared.delivery.lock();
        let mut inner = self.inner.lock();

        if self.lifecycle() != Lifecycle::Running {
            tracing::debug!("Tracking engine not running, ignoring stop");
            return;
        }

        if let Some(handle) = inner.scheduler.take() {
            handle.cancel.cancel();
        }

        self.shared.update(|state| {
            state.lifecycle = Lifecycle::Stopped;
            state.go_idle();
        });
        tracing::info!("Tracking engine stopped");
    }

    /// Stop if running and return to the uninitialized state.
    ///
    /// Clears samples, errors and failure counts. Scheduler statistics are
    /// cumulative and survive a reset.
    pub fn reset(&self) {
        let _gate = self.shared.delivery.lock();
        self.stop();

        let mut inner = self.inner.lock();
        inner.config = None;
        inner.source = None;
        self.shared.update(|state| *state = EngineState::new());
        tracing::info!("Tracking engine reset");
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.shared.state.lock().lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle() == Lifecycle::Running
    }

    /// Copy of the current engine state.
    pub fn state(&self) -> EngineState {
        self.shared.state.lock().clone()
    }

    /// Latest status snapshot.
    pub fn status(&self) -> StatusSnapshot {
        self.shared.reporter.snapshot()
    }

    /// Subscribe to status snapshot changes.
    pub fn subscribe_status(&self) -> watch::Receiver<StatusSnapshot> {
        self.shared.reporter.subscribe()
    }

    pub fn scheduler_stats(&self) -> SchedulerStats {
        self.shared.stats()
    }

    /// The validated configuration, if initialized.
    pub fn config(&self) -> Option<ResolvedConfig> {
        self.inner.lock().config.clone()
    }

    /// Whether the selected source is the simulation. `None` before `init`.
    pub fn is_simulated(&self) -> Option<bool> {
        self.inner.lock().source.as_ref().map(|s| s.is_simulated())
    }

    fn select_source(&self, config: &ResolvedConfig) -> TrackingSource<C> {
        if config.simulation_mode {
            return TrackingSource::Simulated(SimulatedPositionSource::starting_at(
                config.simulation_start,
            ));
        }

        if !self.capability.is_supported() {
            tracing::warn!("Location capability not supported on this host, using simulation");
            return TrackingSource::Simulated(SimulatedPositionSource::starting_at(
                config.simulation_start,
            ));
        }

        TrackingSource::Device(DevicePositionSource::new(
            Arc::clone(&self.capability),
            config.read_timeout,
        ))
    }
}

impl<C: LocationCapability> Drop for TrackingEngine<C> {
    fn drop(&mut self) {
        if let Some(handle) = self.inner.get_mut().scheduler.take() {
            handle.cancel.cancel();
        }
    }
}
