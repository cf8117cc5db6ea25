//! Application state shared across request handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::store::RoomStore;

/// Shared application state.
///
/// This is passed to all request handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: RoomStore,
    wake: Arc<Notify>,
    reconcile_interval: Duration,
}

impl AppState {
    pub fn new(store: RoomStore, wake: Arc<Notify>, reconcile_interval: Duration) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                wake,
                reconcile_interval,
            }),
        }
    }

    pub fn store(&self) -> &RoomStore {
        &self.inner.store
    }

    pub fn reconcile_interval(&self) -> Duration {
        self.inner.reconcile_interval
    }

    /// Asks the scheduler worker for a pass after a mutation.
    pub fn wake_scheduler(&self) {
        self.inner.wake.notify_one();
    }
}
