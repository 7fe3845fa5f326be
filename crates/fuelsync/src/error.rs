//! CLI error types with miette diagnostics.
//!
//! Maps `ApiError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use fuelsync_config::ConfigError;
use fuelsync_core::{ApiError, ErrorCode};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend: {message}")]
    #[diagnostic(
        code(fuelsync::connection_failed),
        help(
            "Check the base URL and that the backend is running.\n\
             Try: fuelsync health -v\n\
             Use --offline to work with the built-in datasets."
        )
    )]
    ConnectionFailed { message: String },

    #[error("Request timed out: {message}")]
    #[diagnostic(
        code(fuelsync::timeout),
        help("Increase the per-attempt timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(fuelsync::auth_failed),
        help(
            "Verify the bearer token for this profile.\n\
             Run: fuelsync config set-token --profile <name>"
        )
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(fuelsync::not_found),
        help("Run: fuelsync {list_command} to see available records")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(fuelsync::api_error))]
    Api { code: ErrorCode, message: String },

    #[error("Another change is still being submitted")]
    #[diagnostic(code(fuelsync::busy), help("Wait for the previous change to finish and retry."))]
    Busy,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fuelsync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(fuelsync::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: fuelsync config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(fuelsync::no_config),
        help(
            "Create a profile with: fuelsync config init\n\
             Or pass --base-url, or use --offline.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(fuelsync::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(fuelsync::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Output ───────────────────────────────────────────────────────
    #[error("Could not render output: {0}")]
    #[diagnostic(code(fuelsync::render))]
    Render(String),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Api { .. } | Self::Busy => exit_code::REJECTED,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Convert an `ApiError` raised while working on `resource`.
    pub fn from_api(err: ApiError, resource: &str) -> Self {
        match err.code {
            ErrorCode::Connectivity => Self::ConnectionFailed {
                message: err.message,
            },
            ErrorCode::Timeout => Self::Timeout {
                message: err.message,
            },
            ErrorCode::Auth => Self::AuthFailed {
                message: err.message,
            },
            ErrorCode::NotFound => Self::NotFound {
                resource_type: resource.into(),
                identifier: err
                    .related_id
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
                list_command: format!("{resource} list"),
            },
            ErrorCode::Validation | ErrorCode::Unsupported => Self::Validation {
                field: "input".into(),
                reason: err.message,
            },
            code => Self::Api {
                code,
                message: err.message,
            },
        }
    }
}
