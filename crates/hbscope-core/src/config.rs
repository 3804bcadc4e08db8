// ── Runtime connection configuration ──
//
// Describes *how* to reach the backend. Built by the CLI (or any other
// embedder) and handed in; core never reads config files.

use std::time::Duration;

use url::Url;

use hbscope_api::{DEFAULT_LONG_TIMEOUT, DEFAULT_TIMEOUT, TlsMode, TransportConfig};

use crate::error::CoreError;

/// Default backend location.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5002";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed development backends).
    DangerAcceptInvalid,
}

/// Configuration for one backend connection.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: Url,
    pub tls: TlsVerification,
    /// Timeout for ordinary requests.
    pub timeout: Duration,
    /// Timeout for long-running jobs (ETL).
    pub long_timeout: Duration,
}

impl BackendConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            long_timeout: DEFAULT_LONG_TIMEOUT,
        }
    }

    /// Reject unusable settings before a client is built. The long timeout
    /// may never be shorter than the ordinary one.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !matches!(self.url.scheme(), "http" | "https") {
            return Err(CoreError::Config {
                field: "url",
                message: format!("unsupported URL scheme '{}'", self.url.scheme()),
            });
        }
        if self.timeout.is_zero() || self.long_timeout.is_zero() {
            return Err(CoreError::Config {
                field: "timeout",
                message: "timeouts must be greater than zero".into(),
            });
        }
        if self.long_timeout < self.timeout {
            return Err(CoreError::Config {
                field: "long_timeout",
                message: format!(
                    "long timeout ({}s) is shorter than the request timeout ({}s)",
                    self.long_timeout.as_secs_f64(),
                    self.timeout.as_secs_f64()
                ),
            });
        }
        Ok(())
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            long_timeout: self.long_timeout,
        }
    }
}
