// ── Backend handle ──
//
// Wires one `ApiClient` into the three managers so they share the bearer
// token. This is the explicitly constructed replacement for process-wide
// singletons: build as many as needed, each with its own session store.

use std::sync::Arc;

use tracing::debug;

use hbscope_api::ApiClient;

use crate::bundles::BundleManager;
use crate::config::BackendConfig;
use crate::error::CoreError;
use crate::raw_data::RawDataManager;
use crate::session::{SessionManager, SessionPhase};
use crate::store::SessionStore;

/// Cheaply cloneable entry point for consumers.
#[derive(Clone)]
pub struct Backend {
    config: Arc<BackendConfig>,
    api: Arc<ApiClient>,
    session: SessionManager,
    bundles: BundleManager,
    raw_data: RawDataManager,
}

impl Backend {
    /// Validate `config`, then build the client and managers. Does NOT
    /// restore the session; call
    /// [`restore_session()`](Self::restore_session) for that.
    pub fn new(config: BackendConfig, store: Arc<dyn SessionStore>) -> Result<Self, CoreError> {
        config.validate()?;
        let api = ApiClient::new(config.url.clone(), &config.transport())?;
        Ok(Self::with_client(config, Arc::new(api), store))
    }

    /// Build around an existing client.
    pub fn with_client(
        config: BackendConfig,
        api: Arc<ApiClient>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let session = SessionManager::new(Arc::clone(&api), store);
        let bundles = BundleManager::new(Arc::clone(&api), session.clone());
        let raw_data = RawDataManager::new(Arc::clone(&api));
        debug!(url = %config.url, "backend handle created");

        Self {
            config: Arc::new(config),
            api,
            session,
            bundles,
            raw_data,
        }
    }

    /// Restore the persisted session (first call only).
    pub fn restore_session(&self) -> SessionPhase {
        self.session.restore()
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn bundles(&self) -> &BundleManager {
        &self.bundles
    }

    pub fn raw_data(&self) -> &RawDataManager {
        &self.raw_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySessionStore;
    use std::time::Duration;
    use url::Url;

    #[test]
    fn rejects_non_http_urls() {
        let url = Url::parse("ftp://127.0.0.1/").unwrap_or_else(|e| panic!("url: {e}"));
        let result = Backend::new(BackendConfig::new(url), Arc::new(MemorySessionStore::new()));
        assert!(matches!(result, Err(CoreError::Config { field: "url", .. })));
    }

    #[test]
    fn rejects_inverted_or_zero_timeouts() {
        let url = Url::parse("http://127.0.0.1:5002").unwrap_or_else(|e| panic!("url: {e}"));

        let mut inverted = BackendConfig::new(url.clone());
        inverted.timeout = Duration::from_secs(60);
        inverted.long_timeout = Duration::from_secs(1);
        let result = Backend::new(inverted, Arc::new(MemorySessionStore::new()));
        assert!(matches!(result, Err(CoreError::Config { field: "long_timeout", .. })));

        let mut zero = BackendConfig::new(url.clone());
        zero.timeout = Duration::ZERO;
        let result = Backend::new(zero, Arc::new(MemorySessionStore::new()));
        assert!(matches!(result, Err(CoreError::Config { field: "timeout", .. })));

        let mut equal = BackendConfig::new(url);
        equal.timeout = Duration::from_secs(5);
        equal.long_timeout = Duration::from_secs(5);
        assert!(Backend::new(equal, Arc::new(MemorySessionStore::new())).is_ok());
    }

    #[test]
    fn managers_share_one_client() {
        let url = Url::parse("http://127.0.0.1:5002").unwrap_or_else(|e| panic!("url: {e}"));
        let backend = Backend::new(BackendConfig::new(url), Arc::new(MemorySessionStore::new()))
            .unwrap_or_else(|e| panic!("backend: {e}"));
        assert!(Arc::ptr_eq(backend.api(), backend.session().api()));
        assert_eq!(backend.config().timeout, hbscope_api::DEFAULT_TIMEOUT);
    }
}
