//! Async HTTP plumbing for the fuelsync management backend.
//!
//! - **[`ApiClient`]**: Bounded-retry client with bearer-token injection,
//!   per-attempt timeouts, and envelope unwrapping (`{success, data|content}`).
//! - **[`ConnectionMonitor`]**: Single-shot health probe producing a fresh
//!   [`ConnectionStatus`] every time.
//! - **[`envelope`]**: Body classification that separates genuinely empty
//!   bodies from ambiguous ones, governed by a [`BodyPolicy`].

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod health;
pub mod retry;
pub mod transport;

pub use auth::{StaticToken, TokenProvider};
pub use client::{ApiClient, Listing};
pub use envelope::{BodyPolicy, Envelope, ResponseBody};
pub use error::Error;
pub use health::{ConnectionMonitor, ConnectionStatus, HEALTH_PATH, PROBE_TIMEOUT};
pub use reqwest::Method;
pub use retry::{REQUEST_TIMEOUT, RETRY_ATTEMPTS, RETRY_DELAY, RetryPolicy};
pub use transport::{TlsMode, TransportConfig};
