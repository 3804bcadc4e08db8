// ── Core error types ──
//
// Two layers. `classify_error` turns any `hbscope_api::Error` into an
// `ErrorKind`, and each manager renders that into the message it keeps in
// state (`Failure`). `CoreError` is what fallible core APIs return; it keeps
// the original transport error as its source.

use std::fmt;

use thiserror::Error;

use crate::store::StoreError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A backend call failed. `message` is the user-facing rendering,
    /// `source` the untouched transport error.
    #[error("{message}")]
    Request {
        message: String,
        #[source]
        source: hbscope_api::Error,
    },

    /// Session persistence failed.
    #[error("Session storage error: {0}")]
    Store(#[from] StoreError),

    /// A connection setting was rejected before any client was built.
    #[error("Configuration error in {field}: {message}")]
    Config { field: &'static str, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// The original transport error, if this came from a backend call.
    pub fn api_error(&self) -> Option<&hbscope_api::Error> {
        match self {
            Self::Request { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<hbscope_api::Error> for CoreError {
    fn from(err: hbscope_api::Error) -> Self {
        let message = classify_error(&err).describe(&Messages::GENERIC);
        Self::Request {
            message,
            source: err,
        }
    }
}

// ── Classification ───────────────────────────────────────────────────

/// What went wrong with a backend call, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The client gave up waiting.
    Timeout,
    /// The backend answered with an error status.
    Server {
        status: u16,
        reason: Option<String>,
        detail: Option<String>,
    },
    /// The request went out but no response came back.
    Unreachable,
    /// Anything else (bad URL, undecodable body, TLS setup, ...).
    Other { message: Option<String> },
}

/// Classify a transport error. Pure; every manager goes through this.
pub fn classify_error(err: &hbscope_api::Error) -> ErrorKind {
    if err.is_timeout() {
        return ErrorKind::Timeout;
    }
    if let Some(status) = err.status() {
        return ErrorKind::Server {
            status,
            reason: err.reason().map(str::to_owned),
            detail: err.detail(),
        };
    }
    if err.is_no_response() {
        return ErrorKind::Unreachable;
    }
    ErrorKind::Other {
        message: Some(err.to_string()).filter(|m| !m.is_empty()),
    }
}

/// Wording a manager uses when rendering an [`ErrorKind`].
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub timeout: &'static str,
    pub unreachable: &'static str,
    pub fallback: &'static str,
}

impl Messages {
    pub const GENERIC: Self = Self {
        timeout: "The request timed out. Please try again.",
        unreachable: "Could not reach the server. Check that the API is running.",
        fallback: "Unknown error.",
    };
}

impl ErrorKind {
    /// Render a user-facing message.
    ///
    /// Server errors prefer the backend's own `detail`/`message`, then fall
    /// back to `server error: <status>`.
    pub fn describe(&self, messages: &Messages) -> String {
        match self {
            Self::Timeout => messages.timeout.to_owned(),
            Self::Server {
                status, detail, ..
            } => detail
                .clone()
                .unwrap_or_else(|| format!("Server error: {status}")),
            Self::Unreachable => messages.unreachable.to_owned(),
            Self::Other { message } => message
                .clone()
                .unwrap_or_else(|| messages.fallback.to_owned()),
        }
    }
}

// ── Failure ──────────────────────────────────────────────────────────

/// A failed manager operation as kept in state: the classification plus
/// the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl Failure {
    pub fn from_api(err: &hbscope_api::Error, messages: &Messages) -> Self {
        let kind = classify_error(err);
        let message = kind.describe(messages);
        Self { kind, message }
    }

    /// A failure that never reached the network (e.g. a precondition).
    pub fn precondition(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: ErrorKind::Other {
                message: Some(message.clone()),
            },
            message,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Failure {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn http(status: u16, body: Option<serde_json::Value>) -> hbscope_api::Error {
        hbscope_api::Error::Http {
            status,
            reason: None,
            body,
        }
    }

    #[test]
    fn timeout_wins() {
        let err = hbscope_api::Error::Timeout { timeout_secs: 300 };
        assert_eq!(classify_error(&err), ErrorKind::Timeout);
        assert_eq!(
            classify_error(&err).describe(&Messages::GENERIC),
            Messages::GENERIC.timeout
        );
    }

    #[test]
    fn server_detail_then_message_then_status() {
        let with_detail = http(502, Some(json!({"detail": "spider failed"})));
        let with_message = http(500, Some(json!({"message": "db locked"})));
        let bare = http(503, None);

        let m = Messages::GENERIC;
        assert_eq!(classify_error(&with_detail).describe(&m), "spider failed");
        assert_eq!(classify_error(&with_message).describe(&m), "db locked");
        assert_eq!(classify_error(&bare).describe(&m), "Server error: 503");
    }

    #[test]
    fn other_errors_use_their_own_message() {
        let err = hbscope_api::Error::Deserialization {
            message: "expected value".into(),
            body: String::new(),
        };
        let described = classify_error(&err).describe(&Messages::GENERIC);
        assert!(described.contains("expected value"), "got: {described}");
    }

    #[test]
    fn other_without_message_uses_fallback() {
        let kind = ErrorKind::Other { message: None };
        assert_eq!(kind.describe(&Messages::GENERIC), "Unknown error.");
    }

    #[test]
    fn core_error_keeps_source() {
        let core: CoreError = http(404, Some(json!({"detail": "Bundle not found"}))).into();
        assert_eq!(core.to_string(), "Bundle not found");
        assert!(core.api_error().is_some_and(hbscope_api::Error::is_not_found));
    }
}
