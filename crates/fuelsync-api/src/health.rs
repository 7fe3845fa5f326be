// ── Backend reachability probe ──
//
// One timed GET against the health endpoint. No retries: a failed probe is
// reported immediately and the caller decides what to do about it.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Default health endpoint path, relative to the API base URL.
pub const HEALTH_PATH: &str = "health";

/// Default probe budget.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of one reachability probe. A new value is produced per probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connected: bool,
    pub last_checked: DateTime<Utc>,
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_time: Option<DateTime<Utc>>,
}

impl ConnectionStatus {
    /// A status that was not produced by a network probe.
    pub fn assumed(connected: bool, endpoint: impl Into<String>) -> Self {
        Self {
            connected,
            last_checked: Utc::now(),
            endpoint: endpoint.into(),
            response_time_ms: None,
            last_sync_time: None,
        }
    }

    /// Copy of this status stamped with the time of the last remote sync.
    pub fn with_last_sync(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.last_sync_time = at;
        self
    }
}

/// Issues health probes against `{base}/health`.
#[derive(Debug, Clone)]
pub struct ConnectionMonitor {
    http: reqwest::Client,
    health_url: Url,
    timeout: Duration,
}

impl ConnectionMonitor {
    /// Build a monitor for `base_url` joined with `health_path`.
    pub fn new(
        http: reqwest::Client,
        base_url: &Url,
        health_path: &str,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let mut health_url = base_url.clone();
        health_url
            .path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(health_path.split('/').filter(|s| !s.is_empty()));

        Ok(Self {
            http,
            health_url,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.health_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe once. Any failure (timeout, non-2xx, network error) yields
    /// `connected = false`.
    pub async fn probe(&self) -> ConnectionStatus {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.http.get(self.health_url.clone()).send()).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let connected = match outcome {
            Ok(Ok(resp)) if resp.status().is_success() => true,
            Ok(Ok(resp)) => {
                debug!(status = %resp.status(), "health probe returned non-success status");
                false
            }
            Ok(Err(e)) => {
                debug!(error = %e, "health probe failed");
                false
            }
            Err(_) => {
                debug!(timeout_ms = self.timeout.as_millis(), "health probe timed out");
                false
            }
        };

        ConnectionStatus {
            connected,
            last_checked: Utc::now(),
            endpoint: self.health_url.to_string(),
            response_time_ms: connected.then_some(elapsed_ms),
            last_sync_time: None,
        }
    }
}
