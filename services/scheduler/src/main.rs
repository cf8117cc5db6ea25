//! Classroom room scheduler.
//!
//! Keeps class sessions and virtual meeting rooms consistent with the wall
//! clock, serves the admin API, and runs the reconciliation worker.

use std::sync::Arc;

use anyhow::Result;
use classroom_reconcile::{Clock, Schedule, SystemClock};
use classroom_scheduler::{
    api, config, inventory, scheduler::SchedulerWorker, state::AppState, store::RoomStore,
};
use tokio::sync::{watch, Notify};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::Config::from_env()?;

    // Initialize tracing (prefer RUST_LOG, fallback to CLASSROOM_LOG_LEVEL)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting room scheduler");
    info!(
        listen_addr = %config.listen_addr,
        reconcile_interval_secs = config.reconcile_interval.as_secs(),
        inventory = ?config.inventory_path,
        "Configuration loaded"
    );

    let clock = Arc::new(SystemClock);
    let schedule = match &config.inventory_path {
        Some(path) => match inventory::load_schedule(path, clock.now()) {
            Ok(schedule) => schedule,
            Err(e) => {
                error!(error = %e, "Failed to load inventory");
                return Err(e);
            }
        },
        None => {
            info!("No inventory configured, starting empty");
            Schedule::new()
        }
    };

    let store = RoomStore::new(schedule, clock);

    // Bring the loaded inventory up to date before serving it.
    let report = store.reconcile().await;
    info!(
        sessions_expired = report.sessions_expired,
        rooms_released = report.rooms_released,
        rooms_assigned = report.rooms_assigned,
        sessions_waiting = report.sessions_waiting,
        "Initial reconciliation complete"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let wake = Arc::new(Notify::new());

    let worker = SchedulerWorker::new(store.clone(), config.reconcile_interval, wake.clone());
    let worker_handle = tokio::spawn({
        let shutdown_rx = shutdown_rx.clone();
        async move {
            worker.run(shutdown_rx).await;
        }
    });

    let state = AppState::new(store, wake, config.reconcile_interval);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Listening for connections");

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let mut shutdown_rx = shutdown_rx;
                loop {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = server_handle => {
            match result {
                Ok(Ok(())) => info!("Server exited normally"),
                Ok(Err(e)) => error!(error = %e, "Server error"),
                Err(e) => error!(error = %e, "Server task panicked"),
            }
        }
    }

    // Stop the worker on every exit path so no pass outlives the service.
    let _ = shutdown_tx.send(true);

    info!("Waiting for scheduler worker to shut down...");
    if let Err(e) = tokio::time::timeout(config.shutdown_timeout, worker_handle).await {
        warn!(error = %e, "Scheduler worker did not shut down in time");
    }

    info!("Room scheduler shutdown complete");
    Ok(())
}
