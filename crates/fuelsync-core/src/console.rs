// ── Console facade ──
//
// Wires one API client, one connection provider and one notification sink
// into the three managed collections. Built from a `SyncConfig`; nothing
// here reads files or the environment.

use std::sync::Arc;

use fuelsync_api::{ApiClient, ConnectionMonitor, ConnectionStatus, TokenProvider};
use tracing::debug;

use crate::config::SyncConfig;
use crate::connection::{ConnectionStatusProvider, ProbingStatusProvider, StaticStatusProvider};
use crate::error::ApiError;
use crate::fallback::InMemoryRepository;
use crate::manager::{EntityManager, SharedParts};
use crate::model::{Station, User, WashingBayEntry};
use crate::notify::NotificationSink;

/// Entry point for consumers: stations, users and washing-bay entries
/// sharing one backend session.
#[derive(Clone)]
pub struct Console {
    parts: SharedParts,
    stations: EntityManager<Station>,
    users: EntityManager<User>,
    washing_bay: EntityManager<WashingBayEntry>,
}

impl Console {
    /// Build a console from configuration.
    ///
    /// In offline mode the connection provider always reports the backend
    /// unreachable and no request is ever sent.
    pub fn new(
        config: &SyncConfig,
        tokens: Arc<dyn TokenProvider>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self, ApiError> {
        let http = config.transport().build_client()?;
        let client = ApiClient::with_client(http.clone(), config.base_url.clone(), tokens)
            .with_retry(config.retry_policy())
            .with_body_policy(config.body_policy);

        let status: Arc<dyn ConnectionStatusProvider> = if config.offline {
            debug!("offline mode, backend will not be contacted");
            Arc::new(StaticStatusProvider::offline())
        } else {
            let monitor = ConnectionMonitor::new(
                http,
                &config.base_url,
                &config.health_path,
                config.probe_timeout,
            )?;
            Arc::new(ProbingStatusProvider::with_ttl(monitor, config.status_ttl))
        };

        Ok(Self::from_parts(SharedParts {
            client: Arc::new(client),
            status,
            notifier,
            offline_policy: config.offline_policy,
            debounce_window: config.debounce_window,
        }))
    }

    /// Assemble a console from prebuilt collaborators, with seeded
    /// in-memory fallback repositories.
    pub fn from_parts(parts: SharedParts) -> Self {
        Self {
            stations: EntityManager::new(&parts, Arc::new(InMemoryRepository::<Station>::seeded())),
            users: EntityManager::new(&parts, Arc::new(InMemoryRepository::<User>::seeded())),
            washing_bay: EntityManager::new(
                &parts,
                Arc::new(InMemoryRepository::<WashingBayEntry>::seeded()),
            ),
            parts,
        }
    }

    pub fn stations(&self) -> &EntityManager<Station> {
        &self.stations
    }

    pub fn users(&self) -> &EntityManager<User> {
        &self.users
    }

    pub fn washing_bay(&self) -> &EntityManager<WashingBayEntry> {
        &self.washing_bay
    }

    pub fn client(&self) -> &ApiClient {
        &self.parts.client
    }

    /// Probe (or reuse a fresh probe of) the backend.
    pub async fn check_connection(&self) -> ConnectionStatus {
        self.parts.status.status().await
    }

    pub fn last_connection_status(&self) -> Option<ConnectionStatus> {
        self.parts.status.last_known()
    }
}
