//! Run command - start tracking and print samples until interrupted.

use std::time::Duration;

use chrono::Local;
use clap::Args;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use loctrack::config::ConfigFile;
use loctrack::time::format_age;
use loctrack::tracking::{
    spawn_status_logger, HttpGeolocationClient, PositionSample, SchedulerStats, StatusSnapshot,
    TrackingEngine, TrackingError, TrackingEvent, DEFAULT_LOG_INTERVAL,
};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the run command.
#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Use simulated waypoints instead of the geolocation service
    #[arg(long)]
    pub simulate: bool,

    /// Sampling interval in milliseconds (overrides config)
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Reads per tick including retries (overrides config)
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub duration_secs: Option<u64>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let runner = CliRunner::with_debug(args.debug)?;
    runner.log_startup("run");

    let config = apply_overrides(runner.config().clone(), &args)?;
    let duration = args.duration_secs.map(Duration::from_secs);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(track(config, duration))
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(mut config: ConfigFile, args: &RunArgs) -> Result<ConfigFile, CliError> {
    if args.simulate {
        config.tracking.simulation_mode = true;
    }
    if let Some(interval_ms) = args.interval_ms {
        if interval_ms == 0 {
            return Err(CliError::Config(
                "--interval-ms must be greater than zero".to_string(),
            ));
        }
        config.tracking.update_interval_ms = interval_ms;
    }
    if let Some(max_retries) = args.max_retries {
        config.tracking.max_retries = max_retries;
    }
    Ok(config)
}

async fn track(config: ConfigFile, duration: Option<Duration>) -> Result<(), CliError> {
    let capability = HttpGeolocationClient::new(config.geolocation_config())
        .map_err(|e| CliError::Capability(e.to_string()))?;
    let engine = TrackingEngine::new(capability);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    engine.init(config.to_engine_config().with_event_sender(event_tx))?;

    let shutdown = CancellationToken::new();
    let handler_token = shutdown.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .map_err(|e| CliError::Signal(e.to_string()))?;

    let status_logger = tracing::enabled!(tracing::Level::DEBUG).then(|| {
        spawn_status_logger(
            engine.subscribe_status(),
            shutdown.child_token(),
            DEFAULT_LOG_INTERVAL,
        )
    });

    print_header(&engine);
    engine.start();

    let deadline = async {
        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                println!();
                println!("Interrupted, stopping...");
                break;
            }
            _ = &mut deadline => break,
            event = event_rx.recv() => match event {
                Some(event) => println!("{}", format_event(&event, &engine.status())),
                None => break,
            },
        }
    }

    engine.stop();
    shutdown.cancel();
    if let Some(handle) = status_logger {
        let _ = handle.await;
    }

    print_summary(&engine.scheduler_stats(), &engine.status());
    Ok(())
}

fn print_header<C: loctrack::tracking::LocationCapability>(engine: &TrackingEngine<C>) {
    let source = match engine.is_simulated() {
        Some(true) => "simulated waypoints",
        _ => "geolocation service",
    };
    let interval = engine
        .config()
        .map(|c| c.update_interval)
        .unwrap_or_default();

    println!("loctrack v{}", loctrack::VERSION);
    println!(
        "Tracking via {} every {:.1}s (Ctrl-C to stop)",
        source,
        interval.as_secs_f64()
    );
    println!();
}

fn print_summary(stats: &SchedulerStats, status: &StatusSnapshot) {
    println!();
    println!("Session summary");
    println!("  Ticks:    {} ({} skipped)", stats.ticks, stats.skipped);
    println!("  Attempts: {} ({} reads)", stats.attempts, stats.reads);
    match status.age() {
        Some(age) => println!("  Last fix: {}", format_age(age)),
        None => println!("  Last fix: none"),
    }
    if let Some(kind) = status.last_error_kind {
        println!("  Last error: {}", kind);
    }
}

/// One output line for a delivered event.
fn format_event(event: &TrackingEvent, status: &StatusSnapshot) -> String {
    match event {
        TrackingEvent::Sample(sample) => format_sample(sample),
        TrackingEvent::Error(error) => format_error(error, status.consecutive_failures),
    }
}

fn format_sample(sample: &PositionSample) -> String {
    let time = sample.timestamp.with_timezone(&Local).format("%H:%M:%S");
    let accuracy = sample
        .accuracy_meters
        .map(|m| format!(" ±{:.0}m", m))
        .unwrap_or_default();
    let origin = match (&sample.location_name, sample.simulated) {
        (Some(name), _) => format!(" ({}, simulated)", name),
        (None, true) => " (simulated)".to_string(),
        (None, false) => String::new(),
    };

    format!(
        "[{}] {:.5}, {:.5}{}{}",
        time, sample.latitude, sample.longitude, accuracy, origin
    )
}

fn format_error(error: &TrackingError, consecutive_failures: u32) -> String {
    let time = Local::now().format("%H:%M:%S");
    let hint = if error.kind() == loctrack::tracking::TrackingErrorKind::PermissionDenied {
        " - check the geolocation API key"
    } else {
        ""
    };
    format!(
        "[{}] error: {} (failures: {}){}",
        time, error, consecutive_failures, hint
    )
}
