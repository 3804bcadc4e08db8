//! CLI error types with miette diagnostics.
//!
//! Maps core failures into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use hbscope_config::ConfigError;
use hbscope_core::{CoreError, ErrorKind, Failure, classify_error};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(hbscope::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             URL: {url}\n\
             Try: hbscope health --api-url {url}"
        )
    )]
    ConnectionFailed { url: String, message: String },

    #[error("{message}")]
    #[diagnostic(
        code(hbscope::timeout),
        help("Increase the limit with --timeout (or --long-timeout for the ETL).")
    )]
    Timeout { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(hbscope::auth_failed), help("Check your username and password."))]
    AuthFailed { message: String },

    #[error("You must be authenticated to {action}")]
    #[diagnostic(code(hbscope::not_authenticated), help("Run: hbscope login"))]
    NotAuthenticated { action: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(hbscope::not_found),
        help("Run: hbscope {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(hbscope::api_error))]
    ApiError { status: Option<u16>, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hbscope::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(hbscope::config),
        help("Inspect the file printed by: hbscope config path")
    )]
    Config(#[from] ConfigError),

    #[error("{0}")]
    #[diagnostic(code(hbscope::core))]
    Core(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    #[diagnostic(code(hbscope::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    #[diagnostic(code(hbscope::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NotAuthenticated { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ApiError {
                status: Some(404), ..
            } => exit_code::NOT_FOUND,
            Self::ApiError {
                status: Some(401 | 403),
                ..
            } => exit_code::AUTH,
            Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Map a classified backend failure. `url` feeds the connection help.
    pub fn from_kind(kind: &ErrorKind, message: String, url: &str) -> Self {
        match kind {
            ErrorKind::Timeout => Self::Timeout { message },
            ErrorKind::Unreachable => Self::ConnectionFailed {
                url: url.to_owned(),
                message,
            },
            ErrorKind::Server { status, .. } => Self::ApiError {
                status: Some(*status),
                message,
            },
            ErrorKind::Other { .. } => Self::ApiError {
                status: None,
                message,
            },
        }
    }

    pub fn from_failure(failure: Failure, url: &str) -> Self {
        Self::from_kind(&failure.kind, failure.message, url)
    }

    /// Like [`from_failure`](Self::from_failure), but a 404 becomes a
    /// `NotFound` with a pointer to the matching list command.
    pub fn lookup_failure(
        failure: Failure,
        url: &str,
        resource_type: &str,
        identifier: &str,
        list_command: &str,
    ) -> Self {
        if matches!(failure.kind, ErrorKind::Server { status: 404, .. }) {
            return Self::NotFound {
                resource_type: resource_type.into(),
                identifier: identifier.into(),
                list_command: list_command.into(),
            };
        }
        Self::from_failure(failure, url)
    }

    /// Map a core error. Backend errors keep their classification; a
    /// rejected login becomes `AuthFailed`.
    pub fn from_core(err: CoreError, url: &str) -> Self {
        match err {
            CoreError::Request { message, source } => match classify_error(&source) {
                ErrorKind::Server {
                    status: 401 | 403, ..
                } => Self::AuthFailed { message },
                kind => Self::from_kind(&kind, message, url),
            },
            CoreError::Io(e) => Self::Io(e),
            CoreError::Json(e) => Self::Json(e),
            CoreError::Config { field, message } => Self::Validation {
                field: field.into(),
                reason: message,
            },
            other @ CoreError::Store(_) => Self::Core(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(kind: ErrorKind) -> Failure {
        Failure {
            message: kind.describe(&hbscope_core::Messages::GENERIC),
            kind,
        }
    }

    #[test]
    fn exit_codes_follow_classification() {
        let url = "http://127.0.0.1:5002";
        let cases = [
            (ErrorKind::Timeout, exit_code::TIMEOUT),
            (ErrorKind::Unreachable, exit_code::CONNECTION),
            (
                ErrorKind::Server {
                    status: 404,
                    reason: None,
                    detail: None,
                },
                exit_code::NOT_FOUND,
            ),
            (
                ErrorKind::Server {
                    status: 401,
                    reason: None,
                    detail: None,
                },
                exit_code::AUTH,
            ),
            (
                ErrorKind::Server {
                    status: 500,
                    reason: None,
                    detail: None,
                },
                exit_code::GENERAL,
            ),
        ];
        for (kind, code) in cases {
            let err = CliError::from_failure(failure(kind.clone()), url);
            assert_eq!(err.exit_code(), code, "{kind:?}");
        }
    }

    #[test]
    fn lookup_404_names_the_resource() {
        let err = CliError::lookup_failure(
            failure(ErrorKind::Server {
                status: 404,
                reason: None,
                detail: Some("Bundle not found".into()),
            }),
            "http://x",
            "bundle",
            "b-9",
            "bundles list",
        );
        assert_eq!(err.to_string(), "bundle 'b-9' not found");
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }
}
