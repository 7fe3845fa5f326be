//! CLI configuration: thin wrapper around `fuelsync_config`.
//!
//! Re-exports the shared types and adds the resolution step that applies
//! `GlobalOpts` overrides (--base-url, --token, --offline, ...).

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use fuelsync_core::{StaticToken, SyncConfig, TlsVerification, TokenProvider};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use fuelsync_config::{Config, Profile, config_path, load_config_or_default, save_config};

/// Base URL used when running `--offline` without any profile. Never contacted.
const OFFLINE_PLACEHOLDER_URL: &str = "http://localhost/api";

/// Everything needed to build a `Console` for one invocation.
pub struct Session {
    pub sync: SyncConfig,
    pub tokens: Arc<dyn TokenProvider>,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref()).to_owned()
}

/// `ProfileNotFound` listing the configured profiles.
pub fn profile_not_found(name: String, config: &Config) -> CliError {
    let mut available: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
    available.sort_unstable();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Build the session from the config file, the active profile and CLI
/// overrides. Flags win over profile values.
pub fn resolve_session(global: &GlobalOpts) -> Result<Session, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None => {
            // An explicitly requested profile must exist unless a URL is given.
            if global.profile.is_some() && global.base_url.is_none() {
                return Err(profile_not_found(profile_name, &cfg));
            }
            match (&global.base_url, global.offline) {
                (Some(url), _) => Profile::new(url.clone()),
                (None, true) => Profile::new(OFFLINE_PLACEHOLDER_URL),
                (None, false) => {
                    return Err(CliError::NoConfig {
                        path: config_path().display().to_string(),
                    });
                }
            }
        }
    };

    let mut sync = fuelsync_config::profile_to_sync_config(&profile, &cfg.defaults)?;

    if let Some(ref url) = global.base_url {
        sync.base_url = url.parse().map_err(|_| CliError::Validation {
            field: "base-url".into(),
            reason: format!("invalid URL: {url}"),
        })?;
    }
    if let Some(secs) = global.timeout {
        sync.timeout = Duration::from_secs(secs);
    }
    if global.insecure {
        sync.tls = TlsVerification::DangerAcceptInvalid;
    }
    if global.offline {
        sync.offline = true;
    }

    let tokens: Arc<dyn TokenProvider> = match global.token {
        Some(ref token) => Arc::new(StaticToken::new(SecretString::from(token.clone()))),
        None => fuelsync_config::token_provider(&profile, &profile_name),
    };

    tracing::debug!(
        profile = %profile_name,
        base_url = %sync.base_url,
        offline = sync.offline,
        "resolved session"
    );

    Ok(Session { sync, tokens })
}
