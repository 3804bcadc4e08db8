// Shared transport configuration for building reqwest::Client instances.
//
// The API client keeps two clients that differ only in timeout: a short one
// for ordinary reads and a long one for jobs like the ETL run. Both are built
// here so TLS and user-agent settings stay identical.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// Default timeout for ordinary requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for long-running backend jobs.
pub const DEFAULT_LONG_TIMEOUT: Duration = Duration::from_secs(300);

const USER_AGENT: &str = concat!("hbscope/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed development backends).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub long_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: DEFAULT_TIMEOUT,
            long_timeout: DEFAULT_LONG_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Build the short-timeout client.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        self.build_with_timeout(self.timeout)
    }

    /// Build the long-timeout client.
    pub fn build_long_client(&self) -> Result<reqwest::Client, Error> {
        self.build_with_timeout(self.long_timeout)
    }

    fn build_with_timeout(&self, timeout: Duration) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Override the ordinary request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the long-running job timeout.
    pub fn with_long_timeout(mut self, long_timeout: Duration) -> Self {
        self.long_timeout = long_timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_timeout_dwarfs_default() {
        let config = TransportConfig::default();
        assert!(config.long_timeout >= config.timeout * 30);
    }

    #[test]
    fn missing_ca_file_is_a_tls_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/ca.pem")),
            ..TransportConfig::default()
        };
        assert!(matches!(config.build_client(), Err(Error::Tls(_))));
    }
}
