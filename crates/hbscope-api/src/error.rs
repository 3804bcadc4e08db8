use thiserror::Error;

/// Top-level error type for the `hbscope-api` crate.
///
/// Every failure the client can produce: the request never got an answer,
/// the client gave up waiting, or the backend answered with an error status.
/// `hbscope-core` classifies these into user-facing messages.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// The request was attempted but no response arrived
    /// (connection refused, DNS failure, reset mid-flight, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The client-side timeout elapsed before the backend answered.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// A path parameter was empty or otherwise unusable; nothing was sent.
    #[error("Invalid {name}: must not be empty")]
    InvalidParameter { name: &'static str },

    // ── HTTP ────────────────────────────────────────────────────────
    /// The backend answered with a non-2xx status.
    ///
    /// `reason` is the canonical status text; `body` is the decoded JSON
    /// error body when the backend sent one.
    #[error("Backend returned HTTP {status}")]
    Http {
        status: u16,
        reason: Option<String>,
        body: Option<serde_json::Value>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status of the backend response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if the client gave up waiting for a response.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` if the request went out but nothing came back.
    pub fn is_no_response(&self) -> bool {
        match self {
            Self::Transport(e) => !e.is_builder() && e.status().is_none(),
            _ => false,
        }
    }

    /// Backend-provided error text.
    ///
    /// FastAPI-style backends put it in `detail`, others in `message`.
    /// Non-string `detail` values (validation error lists) are rendered
    /// as compact JSON.
    pub fn detail(&self) -> Option<String> {
        self.body_field("detail")
            .or_else(|| self.body_field("message"))
    }

    /// A single field of the JSON error body, if present and non-empty.
    pub fn body_field(&self, key: &str) -> Option<String> {
        let Self::Http {
            body: Some(body), ..
        } = self
        else {
            return None;
        };

        match body.get(key)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Canonical status text of the backend response (e.g. "Unauthorized").
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Http { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }
}

/// Returns `true` if `err`, or anything in its `source()` chain, is an
/// [`Error`] from this crate.
///
/// Lets callers holding a type-erased error tell backend/transport failures
/// apart from everything else.
pub fn is_api_error(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<Error>() {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn http(status: u16, body: Option<serde_json::Value>) -> Error {
        Error::Http {
            status,
            reason: Some("Bad Gateway".into()),
            body,
        }
    }

    #[test]
    fn detail_prefers_detail_over_message() {
        let err = http(502, Some(json!({"detail": "spider failed", "message": "x"})));
        assert_eq!(err.detail().as_deref(), Some("spider failed"));
    }

    #[test]
    fn detail_falls_back_to_message() {
        let err = http(500, Some(json!({"message": "boom"})));
        assert_eq!(err.detail().as_deref(), Some("boom"));
    }

    #[test]
    fn detail_skips_empty_strings() {
        let err = http(500, Some(json!({"detail": "", "message": "boom"})));
        assert_eq!(err.detail().as_deref(), Some("boom"));
        assert_eq!(http(500, None).detail(), None);
    }

    #[test]
    fn body_field_reads_one_key_only() {
        let err = http(401, Some(json!({"message": "token expired"})));
        assert_eq!(err.body_field("detail"), None);
        assert_eq!(err.body_field("message").as_deref(), Some("token expired"));
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        let err = http(422, Some(json!({"detail": [{"loc": ["body"], "msg": "missing"}]})));
        let detail = err.detail().unwrap_or_default();
        assert!(detail.contains("missing"), "got: {detail}");
    }

    #[test]
    fn not_found_and_timeout_predicates() {
        assert!(http(404, None).is_not_found());
        assert!(!http(500, None).is_not_found());
        assert!(Error::Timeout { timeout_secs: 300 }.is_timeout());
        assert!(!http(504, None).is_timeout());
    }

    #[test]
    fn api_error_predicate_walks_source_chain() {
        #[derive(Debug, thiserror::Error)]
        #[error("wrapped")]
        struct Wrapper(#[source] Error);

        let direct = Error::Timeout { timeout_secs: 10 };
        assert!(is_api_error(&direct));

        let wrapped = Wrapper(Error::Timeout { timeout_secs: 10 });
        assert!(is_api_error(&wrapped));

        let other = std::io::Error::other("disk");
        assert!(!is_api_error(&other));
    }
}
