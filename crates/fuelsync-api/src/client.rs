// Resilient HTTP client for the management backend.
//
// Wraps `reqwest::Client` with bearer-token injection, a per-attempt
// timeout, bounded linear-backoff retries, and envelope unwrapping.
// Resource helpers (list/create/update/...) sit on top of `call`.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::auth::TokenProvider;
use crate::envelope::{BodyPolicy, Envelope, ResponseBody};
use crate::error::Error;
use crate::retry::RetryPolicy;
use crate::transport::TransportConfig;

/// Error body shape used by the backend on non-2xx answers.
#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// A list response: entities plus the optional server-side aggregate.
#[derive(Debug, Clone)]
pub struct Listing<T, S> {
    pub items: Vec<T>,
    pub stats: Option<S>,
    pub message: Option<String>,
}

/// Async client for the management backend.
///
/// Every call runs through [`call`](Self::call): up to
/// `RetryPolicy::attempts` attempts, each bounded by `RetryPolicy::timeout`,
/// with `delay * k` between attempt k and k+1. Only transient failures are
/// retried; the last error is returned once attempts run out.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
    retry: RetryPolicy,
    body_policy: BodyPolicy,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from a base URL (e.g. `https://backend/api/v1`).
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Url::parse(base_url)?;
        Ok(Self::with_client(http, base_url, tokens))
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http,
            base_url,
            tokens,
            retry: RetryPolicy::default(),
            body_policy: BodyPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_body_policy(mut self, policy: BodyPolicy) -> Self {
        self.body_policy = policy;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// The underlying HTTP client, shared with the health monitor.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    pub fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Core call ────────────────────────────────────────────────────

    /// Execute one logical call with retries and return the unwrapped envelope.
    pub async fn call(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Envelope, Error> {
        let url = self.url(segments)?;
        let max = self.retry.max_attempts();
        let mut attempt: u32 = 1;

        loop {
            debug!(%method, %url, attempt, "sending request");
            match self.attempt(method.clone(), &url, query, body).await {
                Ok(envelope) => return Ok(envelope),
                Err(e) if e.is_transient() && attempt < max => {
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        error = %e,
                        attempt,
                        max_attempts = max,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!(error = %e, attempt, "request failed, giving up");
                    return Err(e);
                }
            }
        }
    }

    async fn attempt(
        &self,
        method: Method,
        url: &Url,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Envelope, Error> {
        let mut builder = self.http.request(method, url.clone());
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        if let Some(token) = self.tokens.bearer_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::InvalidHeader(format!("bearer token: {e}")))?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }

        let timeout = self.retry.timeout;
        let exchange = async {
            let resp = builder.send().await?;
            self.read_response(resp).await
        };

        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| Error::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })?
    }

    // ── Response handling ────────────────────────────────────────────

    async fn read_response(&self, resp: reqwest::Response) -> Result<Envelope, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let raw = resp.text().await.unwrap_or_default();
            return Err(Error::Unauthorized {
                status: status.as_u16(),
                message: error_message(&raw).unwrap_or_else(|| status.to_string()),
            });
        }

        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message: error_message(&raw).unwrap_or_else(|| {
                    if raw.is_empty() {
                        status.to_string()
                    } else {
                        crate::envelope::preview(&raw)
                    }
                }),
            });
        }

        let content_length = resp.content_length();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let raw = resp.text().await?;

        let body = ResponseBody::classify(content_length, content_type.as_deref(), raw);
        Envelope::from_body(body, self.body_policy)?.into_result()
    }

    // ━━ Resource helpers ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `GET {base}/{resource}?query` → entities and optional stats.
    pub async fn list<T, S>(&self, resource: &str, query: &[(&str, String)]) -> Result<Listing<T, S>, Error>
    where
        T: DeserializeOwned,
        S: DeserializeOwned,
    {
        let envelope = self.call(Method::GET, &[resource], query, None).await?;
        let items = match envelope.payload {
            Some(_) => envelope.payload_as::<Vec<T>>()?,
            None => Vec::new(),
        };
        let stats = envelope.stats_as::<S>()?;
        Ok(Listing {
            items,
            stats,
            message: envelope.message,
        })
    }

    /// `POST {base}/{resource}` with a JSON body. Returns the created
    /// entity when the backend echoes one.
    pub async fn create<T, B>(&self, resource: &str, body: &B) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let envelope = self.call(Method::POST, &[resource], &[], Some(&body)).await?;
        envelope.payload_as::<Option<T>>()
    }

    /// `PUT {base}/{resource}/{id}` with a JSON body.
    pub async fn update<T, B>(&self, resource: &str, id: &str, body: &B) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let envelope = self.call(Method::PUT, &[resource, id], &[], Some(&body)).await?;
        envelope.payload_as::<Option<T>>()
    }

    /// `PUT {base}/{resource}/{id}/{segment}` with a JSON body.
    pub async fn put_sub<B>(&self, resource: &str, id: &str, segment: &str, body: &B) -> Result<Envelope, Error>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.call(Method::PUT, &[resource, id, segment], &[], Some(&body))
            .await
    }

    /// `DELETE {base}/{resource}/{id}`. An empty answer is a success.
    pub async fn delete(&self, resource: &str, id: &str) -> Result<Envelope, Error> {
        self.call(Method::DELETE, &[resource, id], &[], None).await
    }

    /// `DELETE {base}/{resource}/{id}/{segment}`.
    pub async fn delete_sub(&self, resource: &str, id: &str, segment: &str) -> Result<Envelope, Error> {
        self.call(Method::DELETE, &[resource, id, segment], &[], None)
            .await
    }
}

fn error_message(raw: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(raw).ok()?;
    parsed.message.or(parsed.error)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            Arc::new(StaticToken::anonymous()),
        )
    }

    #[test]
    fn url_appends_segments_after_base_path() {
        let c = client("https://backend.example/api/v1/");
        let url = c.url(&["stations", "st-001"]).unwrap();
        assert_eq!(url.as_str(), "https://backend.example/api/v1/stations/st-001");
    }

    #[test]
    fn url_encodes_ids() {
        let c = client("https://backend.example/api");
        let url = c.url(&["users", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "https://backend.example/api/users/a%20b%2Fc");
    }

    #[test]
    fn error_message_prefers_message_field() {
        assert_eq!(
            error_message(r#"{"message":"Station not found","error":"NOT_FOUND"}"#).as_deref(),
            Some("Station not found")
        );
        assert_eq!(error_message("not json"), None);
    }
}
