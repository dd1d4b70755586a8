//! Headless driver for the colony engine.
//!
//! Advances the colony on a fixed wall-clock cadence and reads operator
//! commands (`restart`, `dose a`, `dose b`, `stats`, `quit`) from stdin.

mod command;
mod driver;
mod telemetry;

use anyhow::Result;
use colony_core::{RunId, RunnerConfig};
use command::Command;
use driver::{Driver, FrameOutcome};
use std::io::BufRead;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = RunnerConfig::from_env()?;
    config.validate()?;

    telemetry::init_telemetry(&config.log_filter, config.otel_endpoint.as_deref())?;

    let run_id = RunId::new();
    info!(
        run_id = %run_id,
        seed = config.seed,
        dimension = config.colony.dimension,
        ticks_per_frame = config.ticks_per_frame,
        frame_interval_ms = config.frame_interval_ms,
        "Starting colony runner"
    );

    let driver = Arc::new(Driver::new(run_id, config)?);
    driver.start();

    let (stop_tx, stop_rx) = watch::channel(false);
    let stop_tx = Arc::new(stop_tx);
    let (line_tx, line_rx) = mpsc::channel(16);
    spawn_stdin_reader(line_tx);

    let handles = vec![
        tokio::spawn(run_frame_loop(driver.clone(), stop_tx.clone(), stop_rx.clone())),
        tokio::spawn(run_command_loop(
            driver.clone(),
            line_rx,
            stop_tx.clone(),
            stop_rx.clone(),
        )),
    ];

    let mut stop_rx_main = stop_rx.clone();
    tokio::select! {
        _ = shutdown_signal() => {},
        _ = stop_rx_main.wait_for(|stopped| *stopped) => {
            info!("Run finished");
        }
    }
    stop_tx.send_replace(true);

    // Wait for tasks to complete (with timeout)
    let timeout = tokio::time::sleep(Duration::from_secs(5));
    tokio::pin!(timeout);

    tokio::select! {
        results = futures::future::join_all(handles) => {
            for result in results {
                if let Err(e) = result {
                    error!("Runner task failed: {}", e);
                }
            }
        }
        _ = &mut timeout => {
            warn!("Shutdown timeout reached");
        }
    }

    let summary = driver.summary();
    info!(
        event = "run_summary",
        summary = %serde_json::to_string(&summary)?,
        "Run complete"
    );

    telemetry::shutdown_telemetry();

    Ok(())
}

async fn run_frame_loop(
    driver: Arc<Driver>,
    stop_tx: Arc<watch::Sender<bool>>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval(Duration::from_millis(driver.config().frame_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first interval tick fires immediately; skip it so frame 1 lands one period after start.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if driver.frame() == FrameOutcome::Finished {
                    stop_tx.send_replace(true);
                    return;
                }
            }
            _ = stop_rx.wait_for(|stopped| *stopped) => return,
        }
    }
}

/// Forward stdin lines from a plain thread so a pending read never holds up shutdown
fn spawn_stdin_reader(tx: mpsc::Sender<String>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });
}

async fn run_command_loop(
    driver: Arc<Driver>,
    mut lines: mpsc::Receiver<String>,
    stop_tx: Arc<watch::Sender<bool>>,
    mut stop_rx: watch::Receiver<bool>,
) {
    loop {
        let line = tokio::select! {
            line = lines.recv() => line,
            _ = stop_rx.wait_for(|stopped| *stopped) => return,
        };

        let Some(line) = line else {
            // stdin closed: keep running on the timer alone
            let _ = stop_rx.wait_for(|stopped| *stopped).await;
            return;
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => {
                info!("Quit requested");
                stop_tx.send_replace(true);
                return;
            }
            Ok(command) => driver.apply(command),
            Err(e) => warn!("Ignoring input: {}", e),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
