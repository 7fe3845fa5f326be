// ── User-facing notifications ──
//
// The store and mutation coordinator report outcomes through an injected
// sink. The UI decides how to render them (toast, stderr line, ...).

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// One message for the user, with the structured error behind it if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            message: message.into(),
            error: None,
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            title: title.into(),
            message: message.into(),
            error: None,
        }
    }

    /// Error notification carrying the generic message for `err`.
    pub fn failure(title: impl Into<String>, err: ApiError) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            message: err.user_message().to_owned(),
            error: Some(err),
        }
    }
}

/// Receiver of user-facing notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, n: Notification) {
        match n.level {
            NotificationLevel::Success | NotificationLevel::Info => {
                info!(title = %n.title, "{}", n.message);
            }
            NotificationLevel::Warning => warn!(title = %n.title, "{}", n.message),
            NotificationLevel::Error => {
                error!(title = %n.title, error = ?n.error, "{}", n.message);
            }
        }
    }
}

/// Sink that keeps everything it receives, for tests and batch consumers.
#[derive(Debug, Default)]
pub struct CollectingSink {
    received: Mutex<Vec<Notification>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every notification received so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.received.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.received.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for CollectingSink {
    fn notify(&self, notification: Notification) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
