// ── Bundle data manager ──
//
// Keeps the bundle list, the featured bundle and the last ETL result.
// The list fetch is authoritative; the featured fetch is best-effort.

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use hbscope_api::{ApiClient, Bundle, EtlRunResponse};

use crate::error::{Failure, Messages};
use crate::loading::LoadingGuard;
use crate::session::SessionManager;

const FETCH_MESSAGES: Messages = Messages {
    timeout: "Loading bundles timed out. Please try again.",
    unreachable: "Could not reach the server. Check that the API is running.",
    fallback: "Could not load bundle data.",
};

const ETL_MESSAGES: Messages = Messages {
    timeout: "The ETL is taking too long. Please try again.",
    unreachable: "Could not reach the server. Check that the API is running.",
    fallback: "Unknown error while running the ETL.",
};

const ETL_UNAUTHENTICATED: &str = "You must be authenticated to run the ETL.";

/// Observable bundle state.
#[derive(Debug, Clone, Default)]
pub struct BundleState {
    pub bundles: Vec<Bundle>,
    pub featured: Option<Bundle>,
    pub loading: bool,
    pub error: Option<Failure>,
    /// Newest verification timestamp across the list and the featured bundle.
    pub last_update: Option<DateTime<Utc>>,
    pub etl_result: Option<EtlRunResponse>,
}

impl BundleState {
    /// Bundles flagged active. Recomputed on every call.
    pub fn active_bundles(&self) -> Vec<&Bundle> {
        self.bundles.iter().filter(|b| b.is_active()).collect()
    }
}

/// Single-bundle lookup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleLookup {
    Id(String),
    MachineName(String),
}

#[derive(Clone)]
pub struct BundleManager {
    inner: Arc<BundleInner>,
}

struct BundleInner {
    api: Arc<ApiClient>,
    session: SessionManager,
    state: watch::Sender<BundleState>,
    in_flight: AtomicUsize,
}

impl BundleManager {
    /// The manager reads the session's authentication flag to gate ETL runs.
    pub fn new(api: Arc<ApiClient>, session: SessionManager) -> Self {
        let (state, _) = watch::channel(BundleState::default());
        Self {
            inner: Arc::new(BundleInner {
                api,
                session,
                state,
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    pub fn state(&self) -> BundleState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BundleState> {
        self.inner.state.subscribe()
    }

    /// Active bundles from the current list.
    pub fn active_bundles(&self) -> Vec<Bundle> {
        self.inner
            .state
            .borrow()
            .active_bundles()
            .into_iter()
            .cloned()
            .collect()
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// Reload the bundle list and the featured bundle.
    ///
    /// A failed list fetch is fatal: the error is recorded and the previous
    /// list and featured bundle stay in place. A missing (404) or
    /// unreachable featured bundle just leaves `featured` empty.
    pub async fn fetch_data(&self) -> Result<(), Failure> {
        let _loading =
            LoadingGuard::start(&self.inner.state, &self.inner.in_flight, |s| &mut s.loading);
        self.inner.state.send_modify(|s| s.error = None);

        let api = &self.inner.api;
        let (list, featured) = tokio::join!(api.list_bundles(), api.featured_bundle());

        let bundles = match list {
            Ok(bundles) => bundles,
            Err(err) => {
                let failure = Failure::from_api(&err, &FETCH_MESSAGES);
                warn!(error = %err, "bundle list fetch failed");
                self.record_failure(&failure);
                return Err(failure);
            }
        };

        let featured = match featured {
            Ok(bundle) => Some(bundle),
            Err(err) if err.is_not_found() => {
                debug!("no featured bundle");
                None
            }
            Err(err) => {
                warn!(error = %err, "featured bundle unavailable, continuing without it");
                None
            }
        };

        let last_update = latest_verification(&bundles, featured.as_ref());
        debug!(count = bundles.len(), featured = featured.is_some(), "bundles loaded");

        self.inner.state.send_modify(|s| {
            s.bundles = bundles;
            s.featured = featured;
            s.last_update = last_update;
        });
        Ok(())
    }

    /// Trigger the backend ETL, then reload the listing.
    ///
    /// Refuses without a network call when the session is anonymous. A
    /// failed reload after a successful run is recorded in state but does
    /// not turn the run itself into an error.
    pub async fn run_etl(&self) -> Result<EtlRunResponse, Failure> {
        if !self.inner.session.is_authenticated() {
            let failure = Failure::precondition(ETL_UNAUTHENTICATED);
            self.record_failure(&failure);
            return Err(failure);
        }

        let _loading =
            LoadingGuard::start(&self.inner.state, &self.inner.in_flight, |s| &mut s.loading);
        self.inner.state.send_modify(|s| {
            s.error = None;
            s.etl_result = None;
        });

        match self.inner.api.run_etl().await {
            Ok(result) => {
                self.inner
                    .state
                    .send_modify(|s| s.etl_result = Some(result.clone()));
                info!(bundles_processed = result.bundles_processed, "ETL completed, refreshing");
                if let Err(failure) = self.fetch_data().await {
                    warn!(error = %failure, "refresh after ETL failed");
                }
                Ok(result)
            }
            Err(err) => {
                let failure = Failure::from_api(&err, &ETL_MESSAGES);
                warn!(error = %err, "ETL run failed");
                self.record_failure(&failure);
                Err(failure)
            }
        }
    }

    /// Fetch one bundle without touching the managed list.
    pub async fn lookup(&self, key: &BundleLookup) -> Result<Bundle, Failure> {
        let result = match key {
            BundleLookup::Id(id) => self.inner.api.get_bundle(id).await,
            BundleLookup::MachineName(name) => {
                self.inner.api.get_bundle_by_machine_name(name).await
            }
        };
        result.map_err(|err| Failure::from_api(&err, &FETCH_MESSAGES))
    }

    fn record_failure(&self, failure: &Failure) {
        self.inner
            .state
            .send_modify(|s| s.error = Some(failure.clone()));
    }
}

/// Max of every parseable verification date, featured bundle included.
pub fn latest_verification(
    bundles: &[Bundle],
    featured: Option<&Bundle>,
) -> Option<DateTime<Utc>> {
    bundles
        .iter()
        .chain(featured)
        .filter_map(Bundle::verified_at)
        .max()
}
