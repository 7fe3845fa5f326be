// ── Core error type ──
//
// Every failure that reaches a consumer is an `ApiError`, whether it came
// from the network layer or from local validation. The `From<fuelsync_api::Error>`
// impl classifies transport-level errors into an `ErrorCode`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::EntityId;

/// Failure classification carried by every [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Backend could not be reached.
    Connectivity,
    /// An attempt exceeded its time budget.
    Timeout,
    /// Throttling or server-side failure that survived every retry.
    Transient,
    /// Input rejected locally before any network call.
    Validation,
    /// Bearer token missing, expired or refused.
    Auth,
    /// Backend answered but refused the operation.
    Rejected,
    NotFound,
    MalformedResponse,
    /// The entity type does not support the operation.
    Unsupported,
    Internal,
}

/// Structured error retained for diagnostics and handed to the
/// notification sink.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{code}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_id: Option<EntityId>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            timestamp: Utc::now(),
            related_id: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unsupported, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    pub fn not_found(label: &str, id: &EntityId) -> Self {
        Self::new(ErrorCode::NotFound, format!("{label} {id} not found")).with_related(id.clone())
    }

    /// Attach the id of the entity the failed operation targeted.
    #[must_use]
    pub fn with_related(mut self, id: EntityId) -> Self {
        self.related_id = Some(id);
        self
    }

    /// Whether this error means the backend is out of reach.
    pub fn is_connectivity(&self) -> bool {
        matches!(self.code, ErrorCode::Connectivity | ErrorCode::Timeout)
    }

    /// Short message suitable for an end user. The structured error keeps
    /// the details.
    pub fn user_message(&self) -> &'static str {
        match self.code {
            ErrorCode::Connectivity | ErrorCode::Timeout => {
                "The server could not be reached. Please check your connection."
            }
            ErrorCode::Transient => "The server is having trouble right now. Please try again shortly.",
            ErrorCode::Validation => "Some of the provided details are invalid.",
            ErrorCode::Auth => "Your session is no longer valid. Please sign in again.",
            ErrorCode::Rejected => "The server refused the request.",
            ErrorCode::NotFound => "The requested record no longer exists.",
            ErrorCode::MalformedResponse => "The server sent a response that could not be read.",
            ErrorCode::Unsupported => "This action is not available here.",
            ErrorCode::Internal => "Something went wrong. Please try again.",
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fuelsync_api::Error> for ApiError {
    fn from(err: fuelsync_api::Error) -> Self {
        use fuelsync_api::Error as E;

        let code = match &err {
            E::Unauthorized { .. } => ErrorCode::Auth,
            E::Timeout { .. } => ErrorCode::Timeout,
            E::Transport(e) if e.is_timeout() => ErrorCode::Timeout,
            E::Transport(e) if e.is_connect() || e.is_request() => ErrorCode::Connectivity,
            E::Transport(_) => ErrorCode::Transient,
            E::Http { status: 404, .. } => ErrorCode::NotFound,
            E::Http { status, .. } if *status == 429 || *status >= 500 => ErrorCode::Transient,
            E::Http { .. } | E::Rejected { .. } => ErrorCode::Rejected,
            E::MalformedBody { .. } | E::Deserialization { .. } => ErrorCode::MalformedResponse,
            E::InvalidUrl(_) | E::InvalidHeader(_) | E::Tls(_) | E::Encode(_) => ErrorCode::Internal,
        };

        let message = match err {
            E::Rejected { message } | E::Http { message, .. } | E::Unauthorized { message, .. } => {
                message
            }
            other => other.to_string(),
        };

        Self::new(code, message)
    }
}
