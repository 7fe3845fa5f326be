// ── Runtime sync configuration ──
//
// Describes how the console talks to the backend: where it is, how long
// to wait, how often to retry, and what to do when it is unreachable.
// Never touches disk; `fuelsync-config` builds one from a profile.

use std::time::Duration;

use fuelsync_api::{BodyPolicy, HEALTH_PATH, PROBE_TIMEOUT, REQUEST_TIMEOUT, RETRY_ATTEMPTS, RETRY_DELAY};
use serde::{Deserialize, Serialize};
use url::Url;

/// Default quiet window for filter debouncing.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed staging backends).
    DangerAcceptInvalid,
}

/// What a mutation does while the backend is unreachable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OfflineMutationPolicy {
    /// Apply to the fallback repository and rebuild the collection locally.
    /// Local changes are never reconciled with the backend.
    #[default]
    ApplyLocally,
    /// Refuse with a connectivity error.
    Reject,
}

/// Configuration for one console session.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// API base, e.g. `https://backend.example/api`.
    pub base_url: Url,
    /// Budget for one request attempt.
    pub timeout: Duration,
    /// Total attempts per call, the first included.
    pub retry_attempts: u32,
    /// Linear backoff unit.
    pub retry_delay: Duration,
    pub probe_timeout: Duration,
    pub health_path: String,
    /// How long a probe result may be reused. Zero probes on every call.
    pub status_ttl: Duration,
    pub debounce_window: Duration,
    pub body_policy: BodyPolicy,
    pub offline_policy: OfflineMutationPolicy,
    pub tls: TlsVerification,
    /// Skip the network entirely and serve the fallback datasets.
    pub offline: bool,
}

impl SyncConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: REQUEST_TIMEOUT,
            retry_attempts: RETRY_ATTEMPTS,
            retry_delay: RETRY_DELAY,
            probe_timeout: PROBE_TIMEOUT,
            health_path: HEALTH_PATH.to_owned(),
            status_ttl: Duration::ZERO,
            debounce_window: DEBOUNCE_WINDOW,
            body_policy: BodyPolicy::default(),
            offline_policy: OfflineMutationPolicy::default(),
            tls: TlsVerification::default(),
            offline: false,
        }
    }

    pub(crate) fn retry_policy(&self) -> fuelsync_api::RetryPolicy {
        fuelsync_api::RetryPolicy {
            attempts: self.retry_attempts,
            delay: self.retry_delay,
            timeout: self.timeout,
        }
    }

    pub(crate) fn transport(&self) -> fuelsync_api::TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => fuelsync_api::TlsMode::System,
            TlsVerification::CustomCa(path) => fuelsync_api::TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => fuelsync_api::TlsMode::DangerAcceptInvalid,
        };
        // Per-attempt and probe budgets are enforced above reqwest; its own
        // timeout is only a backstop.
        fuelsync_api::TransportConfig {
            tls,
            timeout: self.timeout.max(self.probe_timeout).saturating_mul(2),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_client_constants() {
        let config = SyncConfig::new(Url::parse("http://localhost:8080/api").unwrap());
        let policy = config.retry_policy();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.timeout, REQUEST_TIMEOUT);
        assert_eq!(config.debounce_window, Duration::from_millis(300));
        assert_eq!(config.status_ttl, Duration::ZERO);
        assert_eq!(config.offline_policy, OfflineMutationPolicy::ApplyLocally);
    }

    #[test]
    fn offline_policy_parses_kebab_case() {
        assert_eq!(
            "reject".parse::<OfflineMutationPolicy>().unwrap(),
            OfflineMutationPolicy::Reject
        );
        assert_eq!(OfflineMutationPolicy::ApplyLocally.to_string(), "apply-locally");
    }
}
