// Application state module
// Shared by every connection task

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::logger::AccessLogFormat;
use crate::report::ReportStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: ReportStore,
    /// Parsed once from `logging.access_log_format`
    pub access_log_format: AccessLogFormat,
    /// Notified on SIGINT/SIGTERM to stop accepting connections
    pub shutdown: Arc<Notify>,
    active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = ReportStore::new(&config.reports);
        let access_log_format = AccessLogFormat::parse(&config.logging.access_log_format);
        Self {
            config,
            store,
            access_log_format,
            shutdown: Arc::new(Notify::new()),
            active_connections: AtomicUsize::new(0),
        }
    }

    /// Reserve a connection slot; `None` when `max_connections` is reached
    ///
    /// The counter is incremented first and rolled back on rejection so two
    /// concurrent accepts cannot both slip under the limit.
    pub fn try_acquire_connection(self: &Arc<Self>) -> Option<ConnectionGuard> {
        let prev = self.active_connections.fetch_add(1, Ordering::SeqCst);
        if let Some(max) = self.config.performance.max_connections {
            if prev >= usize::try_from(max).unwrap_or(usize::MAX) {
                self.active_connections.fetch_sub(1, Ordering::SeqCst);
                return None;
            }
        }
        Some(ConnectionGuard {
            state: Arc::clone(self),
        })
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}

/// Releases its connection slot on drop
pub struct ConnectionGuard {
    state: Arc<AppState>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.state.active_connections.fetch_sub(1, Ordering::SeqCst);
    }
}
