// Backend HTTP client
//
// Wraps two `reqwest::Client`s (ordinary and long-running) behind one base
// URL and one bearer token. Endpoint methods live in sibling modules as
// inherent impls so this file stays focused on transport mechanics.

use std::sync::RwLock;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// HTTP client for the bundle backend.
///
/// Holds the base URL, a short-timeout client for ordinary calls, a
/// long-timeout client for jobs such as the ETL run, and the bearer token
/// applied to every request on both. Errors are never retried or swallowed.
pub struct ApiClient {
    http: reqwest::Client,
    http_long: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    long_timeout: Duration,
    auth_token: RwLock<Option<SecretString>>,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root, e.g. `http://127.0.0.1:5002`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            http_long: transport.build_long_client()?,
            base_url,
            timeout: transport.timeout,
            long_timeout: transport.long_timeout,
            auth_token: RwLock::new(None),
        })
    }

    /// Parse `base_url` and build a client with default transport settings.
    pub fn from_url(base_url: &str) -> Result<Self, Error> {
        let url = Url::parse(base_url)?;
        Self::new(url, &TransportConfig::default())
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Timeout applied to ordinary requests.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Timeout applied to long-running requests.
    pub fn long_timeout(&self) -> Duration {
        self.long_timeout
    }

    // ── Auth header ──────────────────────────────────────────────────

    /// Attach (`Some`) or remove (`None`) the `Authorization: Bearer` header
    /// for every subsequent request on both underlying clients.
    pub fn set_auth_token(&self, token: Option<SecretString>) {
        let mut guard = self
            .auth_token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if token.is_some() {
            debug!("setting bearer token");
        } else if guard.is_some() {
            debug!("clearing bearer token");
        }
        *guard = token;
    }

    /// Whether a bearer token is currently attached.
    pub fn has_auth_token(&self) -> bool {
        self.auth_token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self
            .auth_token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match guard.as_ref() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join an absolute API path (`/bundles`) onto the base URL, keeping any
    /// path prefix the base URL already carries.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// `GET path` on the short-timeout client.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);
        self.send(self.http.get(url), self.timeout).await
    }

    /// `POST path` with an optional JSON body on the short-timeout client.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);
        let mut builder = self.http.post(url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(builder, self.timeout).await
    }

    /// `POST path` on the long-timeout client, for jobs that run for minutes.
    pub async fn post_long<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!(timeout_secs = self.long_timeout.as_secs(), "POST (long) {}", url);
        let mut builder = self.http_long.post(url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(builder, self.long_timeout).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<T, Error> {
        let resp = self
            .apply_auth(builder)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        parse_response(resp, timeout).await
    }
}

/// Map a reqwest failure, surfacing client-side timeouts distinctly.
fn transport_error(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            timeout_secs: timeout.as_secs(),
        }
    } else {
        Error::Transport(err)
    }
}

/// Turn a response into `T`, or into `Error::Http` for non-2xx statuses.
async fn parse_response<T: DeserializeOwned>(
    resp: reqwest::Response,
    timeout: Duration,
) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(|e| transport_error(e, timeout))?;

    if !status.is_success() {
        debug!(status = status.as_u16(), "backend returned error status");
        return Err(Error::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_owned),
            body: serde_json::from_str(&body).ok(),
        });
    }

    trace!(bytes = body.len(), "response body received");
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}
