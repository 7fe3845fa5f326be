//! Profile configuration for the fuelsync console.
//!
//! TOML profiles layered with `FUELSYNC_` environment overrides, bearer
//! token resolution (env var, system keyring, plaintext), and translation to
//! [`fuelsync_core::SyncConfig`]. The CLI adds flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use fuelsync_core::{BodyPolicy, OfflineMutationPolicy, SyncConfig, TlsVerification, TokenProvider};

/// Keyring service name; entries are keyed `{profile}/token`.
pub const KEYRING_SERVICE: &str = "fuelsync";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is given on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Per-attempt request timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Filter debounce window, milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_debounce_ms() -> u64 {
    300
}

/// A named backend profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL (e.g., "https://console.example.com/api").
    pub base_url: String,

    /// Bearer token (plaintext, prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable holding the bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid certificates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override the per-attempt timeout, seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_timeout_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_path: Option<String>,

    /// Reuse a health probe result for this many seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_ttl_secs: Option<u64>,

    /// Fail on 2xx bodies that are not JSON instead of treating them as success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_bodies: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offline_policy: Option<OfflineMutationPolicy>,

    /// Never contact the backend; serve the fallback datasets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offline: Option<bool>,
}

impl Profile {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Config {
    /// Name of the profile to use: `requested`, else the configured default.
    pub fn profile_name<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "fuelsync", "fuelsync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fuelsync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` layered over defaults, then `FUELSYNC_` env vars.
///
/// Nested keys use a double underscore:
/// `FUELSYNC_PROFILES__DEFAULT__BASE_URL=https://...`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FUELSYNC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
}

/// Resolve the bearer token from the credential chain (no CLI flag step).
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token.expose_secret())?;
    Ok(())
}

/// Resolves the profile's token on every request, so a token rotated in
/// the keyring or environment is picked up without restarting.
#[derive(Debug, Clone)]
pub struct ProfileTokenProvider {
    profile_name: String,
    profile: Profile,
}

impl ProfileTokenProvider {
    pub fn new(profile: &Profile, profile_name: impl Into<String>) -> Self {
        Self {
            profile_name: profile_name.into(),
            profile: profile.clone(),
        }
    }
}

impl TokenProvider for ProfileTokenProvider {
    fn bearer_token(&self) -> Option<SecretString> {
        resolve_token(&self.profile, &self.profile_name)
            .inspect_err(|e| debug!(error = %e, "sending request without a bearer token"))
            .ok()
    }
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `SyncConfig` from a profile, with `defaults` filling the gaps.
pub fn profile_to_sync_config(profile: &Profile, defaults: &Defaults) -> Result<SyncConfig, ConfigError> {
    let base_url: url::Url = profile
        .base_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {}", profile.base_url),
        })?;

    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("unsupported scheme '{}'", base_url.scheme()),
        });
    }

    let mut config = SyncConfig::new(base_url);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.debounce_window = Duration::from_millis(defaults.debounce_ms);

    if let Some(attempts) = profile.retry_attempts {
        if attempts == 0 {
            return Err(ConfigError::Validation {
                field: "retry_attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        config.retry_attempts = attempts;
    }
    if let Some(ms) = profile.retry_delay_ms {
        config.retry_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = profile.probe_timeout_ms {
        config.probe_timeout = Duration::from_millis(ms);
    }
    if let Some(ref path) = profile.health_path {
        config.health_path.clone_from(path);
    }
    if let Some(secs) = profile.status_ttl_secs {
        config.status_ttl = Duration::from_secs(secs);
    }
    if profile.strict_bodies.unwrap_or(false) {
        config.body_policy = BodyPolicy::Strict;
    }
    if let Some(policy) = profile.offline_policy {
        config.offline_policy = policy;
    }
    config.offline = profile.offline.unwrap_or(false);

    config.tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(config)
}

/// Token provider for a profile, shared across the console.
pub fn token_provider(profile: &Profile, profile_name: &str) -> Arc<dyn TokenProvider> {
    Arc::new(ProfileTokenProvider::new(profile, profile_name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn unique_profile() -> String {
        format!("test-{}", std::process::id())
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        let mut profile = Profile::new("https://console.example.com/api");
        profile.retry_attempts = Some(5);
        profile.offline_policy = Some(OfflineMutationPolicy::Reject);
        cfg.profiles.insert("hq".into(), profile);
        cfg.default_profile = Some("hq".into());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profile_name(None), "hq");
        let hq = loaded.profile("hq").unwrap();
        assert_eq!(hq.base_url, "https://console.example.com/api");
        assert_eq!(hq.retry_attempts, Some(5));
        assert_eq!(hq.offline_policy, Some(OfflineMutationPolicy::Reject));
        assert_eq!(loaded.defaults.output, "table");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(loaded.profiles.is_empty());
        assert_eq!(loaded.profile_name(Some("night-shift")), "night-shift");
        assert!(matches!(
            loaded.profile("night-shift"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn hand_written_toml_is_understood() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "field"

[defaults]
timeout = 5
debounce_ms = 150

[profiles.field]
base_url = "http://10.0.0.5:8080/api"
offline_policy = "apply-locally"
strict_bodies = true
status_ttl_secs = 2
"#,
        )
        .unwrap();

        let loaded = load_config_from(&path).unwrap();
        let profile = loaded.profile(loaded.profile_name(None)).unwrap();
        let sync = profile_to_sync_config(profile, &loaded.defaults).unwrap();
        assert_eq!(sync.timeout, Duration::from_secs(5));
        assert_eq!(sync.debounce_window, Duration::from_millis(150));
        assert_eq!(sync.status_ttl, Duration::from_secs(2));
        assert_eq!(sync.body_policy, BodyPolicy::Strict);
        assert_eq!(sync.offline_policy, OfflineMutationPolicy::ApplyLocally);
        assert_eq!(sync.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn profile_overrides_win_over_defaults() {
        let mut profile = Profile::new("https://console.example.com/api");
        profile.timeout = Some(30);
        profile.insecure = Some(true);
        profile.offline = Some(true);
        let sync = profile_to_sync_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(sync.timeout, Duration::from_secs(30));
        assert_eq!(sync.tls, TlsVerification::DangerAcceptInvalid);
        assert!(sync.offline);
    }

    #[test]
    fn invalid_profiles_are_rejected() {
        let bad_url = Profile::new("not a url");
        assert!(matches!(
            profile_to_sync_config(&bad_url, &Defaults::default()),
            Err(ConfigError::Validation { ref field, .. }) if field == "base_url"
        ));

        let ftp = Profile::new("ftp://files.example.com");
        assert!(profile_to_sync_config(&ftp, &Defaults::default()).is_err());

        let mut zero = Profile::new("https://console.example.com/api");
        zero.retry_attempts = Some(0);
        assert!(matches!(
            profile_to_sync_config(&zero, &Defaults::default()),
            Err(ConfigError::Validation { ref field, .. }) if field == "retry_attempts"
        ));
    }

    #[test]
    fn plaintext_token_is_the_last_resort() {
        let mut profile = Profile::new("https://console.example.com/api");
        profile.token_env = Some("FUELSYNC_TEST_TOKEN_THAT_IS_NEVER_SET".into());
        profile.token = Some("plain-token".into());

        let provider = ProfileTokenProvider::new(&profile, unique_profile());
        let token = provider.bearer_token().unwrap();
        assert_eq!(token.expose_secret(), "plain-token");
    }

    #[test]
    fn missing_token_is_reported() {
        let profile = Profile::new("https://console.example.com/api");
        let name = unique_profile();
        assert!(matches!(
            resolve_token(&profile, &name),
            Err(ConfigError::NoCredentials { profile }) if profile == name
        ));
        assert!(ProfileTokenProvider::new(&profile, name).bearer_token().is_none());
    }
}
