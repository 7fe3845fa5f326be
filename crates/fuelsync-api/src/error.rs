use thiserror::Error;

/// Top-level error type for the `fuelsync-api` crate.
///
/// Covers every failure mode of a single backend call: transport, timeout,
/// HTTP status, envelope rejection, and body decoding. `fuelsync-core`
/// maps these into its structured `ApiError`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The backend rejected the bearer token (HTTP 401/403).
    #[error("Authentication rejected (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A single attempt exceeded its time budget.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// A header (usually the bearer token) could not be encoded.
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── HTTP ────────────────────────────────────────────────────────
    /// Non-success HTTP status other than auth failures.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The backend answered 2xx but the envelope carried `success: false`.
    #[error("Request rejected by backend: {message}")]
    Rejected { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Body was present but could not be interpreted, and the client is
    /// configured to reject ambiguous bodies.
    #[error("Malformed response body: {reason}")]
    MalformedBody { reason: String, body: String },

    /// The request body could not be encoded as JSON.
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// JSON decoding into the expected payload type failed.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Auth failures, client errors and envelope rejections never are.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the backend refused our credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` if the backend could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
