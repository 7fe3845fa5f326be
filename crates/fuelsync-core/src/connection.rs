// ── Connection status providers ──
//
// Fetches and mutations ask one provider whether the backend is reachable
// before doing anything. The probing provider re-probes on every call
// unless a TTL is configured; the static provider pins the answer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fuelsync_api::{ConnectionMonitor, ConnectionStatus};
use tokio::sync::{Mutex, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Single source of truth for backend reachability.
#[async_trait]
pub trait ConnectionStatusProvider: Send + Sync {
    /// Current status, probing the backend if needed.
    async fn status(&self) -> ConnectionStatus;

    /// Subscribe to status changes. Holds `None` until the first check.
    fn subscribe(&self) -> watch::Receiver<Option<ConnectionStatus>>;

    /// Most recent status without probing.
    fn last_known(&self) -> Option<ConnectionStatus> {
        self.subscribe().borrow().clone()
    }
}

// ── Probing provider ─────────────────────────────────────────────────

/// Probes the health endpoint, reusing a result for at most `ttl`.
pub struct ProbingStatusProvider {
    monitor: ConnectionMonitor,
    ttl: Duration,
    cached: Mutex<Option<(Instant, ConnectionStatus)>>,
    status: watch::Sender<Option<ConnectionStatus>>,
}

impl ProbingStatusProvider {
    /// Provider that probes on every call.
    pub fn new(monitor: ConnectionMonitor) -> Self {
        Self::with_ttl(monitor, Duration::ZERO)
    }

    pub fn with_ttl(monitor: ConnectionMonitor, ttl: Duration) -> Self {
        let (status, _) = watch::channel(None);
        Self {
            monitor,
            ttl,
            cached: Mutex::new(None),
            status,
        }
    }

    pub fn monitor(&self) -> &ConnectionMonitor {
        &self.monitor
    }

    fn publish(&self, next: &ConnectionStatus) {
        let previous = self.status.send_replace(Some(next.clone()));
        if previous.is_some_and(|p| p.connected == next.connected) {
            return;
        }
        if next.connected {
            info!(endpoint = %next.endpoint, latency_ms = ?next.response_time_ms, "backend reachable");
        } else {
            warn!(endpoint = %next.endpoint, "backend unreachable, switching to offline data");
        }
    }
}

#[async_trait]
impl ConnectionStatusProvider for ProbingStatusProvider {
    async fn status(&self) -> ConnectionStatus {
        // Held across the probe so concurrent callers share one request.
        let mut cached = self.cached.lock().await;
        if !self.ttl.is_zero() {
            if let Some((at, status)) = cached.as_ref() {
                if at.elapsed() < self.ttl {
                    debug!("reusing cached connection status");
                    return status.clone();
                }
            }
        }

        let status = self.monitor.probe().await;
        *cached = Some((Instant::now(), status.clone()));
        drop(cached);

        self.publish(&status);
        status
    }

    fn subscribe(&self) -> watch::Receiver<Option<ConnectionStatus>> {
        self.status.subscribe()
    }
}

// ── Static provider ──────────────────────────────────────────────────

/// Reports a fixed reachability without touching the network.
///
/// Used for `--offline` sessions and to pin the mode in tests.
pub struct StaticStatusProvider {
    connected: AtomicBool,
    endpoint: String,
    status: watch::Sender<Option<ConnectionStatus>>,
}

impl StaticStatusProvider {
    pub fn new(connected: bool, endpoint: impl Into<String>) -> Self {
        let (status, _) = watch::channel(None);
        Self {
            connected: AtomicBool::new(connected),
            endpoint: endpoint.into(),
            status,
        }
    }

    pub fn offline() -> Self {
        Self::new(false, "offline")
    }

    /// Flip the reported reachability.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectionStatusProvider for StaticStatusProvider {
    async fn status(&self) -> ConnectionStatus {
        let status = ConnectionStatus::assumed(self.connected.load(Ordering::SeqCst), &self.endpoint);
        self.status.send_replace(Some(status.clone()));
        status
    }

    fn subscribe(&self) -> watch::Receiver<Option<ConnectionStatus>> {
        self.status.subscribe()
    }
}
