// ── Response envelope & body classification ──
//
// The backend wraps payloads as `{ success, data | content, stats?, message? }`.
// Some endpoints (DELETE in particular) answer with an empty body or a
// non-JSON content type; those are classified here before the envelope is
// read, so "empty and fine" is never confused with "present but garbage".

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;

/// What to do with a 2xx body that is present but cannot be read as JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyPolicy {
    /// Synthesize `{success: true}` and log a warning.
    #[default]
    Lenient,
    /// Fail the call with [`Error::MalformedBody`].
    Strict,
}

/// Classification of a successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Zero content length or an empty/whitespace body.
    Empty,
    /// A JSON document.
    Json(Value),
    /// Something was sent, but it is not readable JSON.
    Ambiguous { reason: String, raw: String },
}

impl ResponseBody {
    /// Classify a body from its declared length, content type, and text.
    pub fn classify(content_length: Option<u64>, content_type: Option<&str>, raw: String) -> Self {
        if content_length == Some(0) || raw.trim().is_empty() {
            return Self::Empty;
        }

        if let Some(ct) = content_type {
            if !ct.to_ascii_lowercase().contains("json") {
                return Self::Ambiguous {
                    reason: format!("non-JSON content type `{ct}`"),
                    raw,
                };
            }
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Self::Json(value),
            Err(e) => Self::Ambiguous {
                reason: format!("unparseable JSON: {e}"),
                raw,
            },
        }
    }
}

/// Unwrapped backend response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    pub success: bool,
    /// `data` or, failing that, `content`.
    pub payload: Option<Value>,
    pub stats: Option<Value>,
    pub message: Option<String>,
    /// `true` when the envelope was synthesized from an empty or ambiguous body.
    pub synthesized: bool,
}

impl Envelope {
    /// Envelope used for bodies that carried nothing to read.
    pub fn synthesized_success() -> Self {
        Self {
            success: true,
            synthesized: true,
            ..Self::default()
        }
    }

    /// Interpret a JSON document. Documents without a boolean `success` field
    /// are treated as a bare payload. The remaining envelope fields are read
    /// leniently so an odd `message` never hides the flag.
    pub fn from_value(value: Value) -> Self {
        let Some(success) = value.get("success").and_then(Value::as_bool) else {
            return Self {
                success: true,
                payload: Some(value),
                ..Self::default()
            };
        };

        let field = |key: &str| value.get(key).filter(|v| !v.is_null()).cloned();
        let message = value.get("message").and_then(|m| match m {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        });

        Self {
            success,
            payload: field("data").or_else(|| field("content")),
            stats: field("stats"),
            message,
            synthesized: false,
        }
    }

    /// Turn a classified body into an envelope according to `policy`.
    pub fn from_body(body: ResponseBody, policy: BodyPolicy) -> Result<Self, Error> {
        match body {
            ResponseBody::Empty => Ok(Self::synthesized_success()),
            ResponseBody::Json(value) => Ok(Self::from_value(value)),
            ResponseBody::Ambiguous { reason, raw } => match policy {
                BodyPolicy::Lenient => {
                    tracing::warn!(%reason, "treating ambiguous response body as success");
                    Ok(Self::synthesized_success())
                }
                BodyPolicy::Strict => Err(Error::MalformedBody { reason, body: raw }),
            },
        }
    }

    /// Convert `success: false` into an error.
    pub fn into_result(self) -> Result<Self, Error> {
        if self.success {
            Ok(self)
        } else {
            Err(Error::Rejected {
                message: self
                    .message
                    .unwrap_or_else(|| "request was not successful".into()),
            })
        }
    }

    /// Decode the payload into `T`. A missing payload decodes from `null`.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let value = self.payload.clone().unwrap_or(Value::Null);
        decode(value)
    }

    /// Decode the statistics block, if the backend sent one.
    pub fn stats_as<S: DeserializeOwned>(&self) -> Result<Option<S>, Error> {
        self.stats.clone().map(decode).transpose()
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value.clone()).map_err(|e| {
        let body = value.to_string();
        Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        }
    })
}

/// First 200 characters of a body, for log and error messages.
pub(crate) fn preview(raw: &str) -> String {
    raw.chars().take(200).collect()
}
