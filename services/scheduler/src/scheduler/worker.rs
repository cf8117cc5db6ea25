//! Scheduler background worker.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument};

use crate::store::RoomStore;

/// Runs reconciliation passes until shutdown is signaled.
pub struct SchedulerWorker {
    store: RoomStore,
    interval: Duration,
    wake: Arc<Notify>,
}

impl SchedulerWorker {
    pub fn new(store: RoomStore, interval: Duration, wake: Arc<Notify>) -> Self {
        Self {
            store,
            interval,
            wake,
        }
    }

    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Starting scheduler worker"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Don't immediately tick on startup - wait for first interval
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.run_pass("interval").await;
                }
                _ = self.wake.notified() => {
                    self.run_pass("wake").await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Scheduler worker shutting down");
                        break;
                    }
                }
            }
        }
    }

    async fn run_pass(&self, trigger: &'static str) {
        let report = self.store.reconcile().await;

        if report.changed() {
            info!(
                trigger,
                sessions_activated = report.sessions_activated,
                sessions_expired = report.sessions_expired,
                rooms_released = report.rooms_released,
                rooms_assigned = report.rooms_assigned,
                sessions_waiting = report.sessions_waiting,
                "Reconciliation pass complete"
            );
        } else {
            debug!(
                trigger,
                sessions_waiting = report.sessions_waiting,
                rooms_idle = report.rooms_idle,
                "Reconciliation pass made no changes"
            );
        }
    }
}
