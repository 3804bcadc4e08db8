// ── Raw data manager ──
//
// Three independent slots (list, latest, by id). Each fetch clears the
// shared error, and on failure resets only its own slot.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use tokio::sync::watch;
use tracing::{debug, warn};

use hbscope_api::{ApiClient, RawDataRecord};

use crate::error::{CoreError, Failure, Messages};
use crate::loading::LoadingGuard;

const RAW_DATA_MESSAGES: Messages = Messages {
    timeout: "Could not reach the server in time. Check that the API is running.",
    unreachable: "Could not reach the server. Check that the API is running.",
    fallback: "Unknown error while fetching raw data.",
};

#[derive(Debug, Clone, Default)]
pub struct RawDataState {
    pub list: Vec<RawDataRecord>,
    pub latest: Option<RawDataRecord>,
    pub current: Option<RawDataRecord>,
    pub loading: bool,
    pub error: Option<Failure>,
}

#[derive(Clone)]
pub struct RawDataManager {
    inner: Arc<RawDataInner>,
}

struct RawDataInner {
    api: Arc<ApiClient>,
    state: watch::Sender<RawDataState>,
    in_flight: AtomicUsize,
}

impl RawDataManager {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let (state, _) = watch::channel(RawDataState::default());
        Self {
            inner: Arc::new(RawDataInner {
                api,
                state,
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    pub fn state(&self) -> RawDataState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RawDataState> {
        self.inner.state.subscribe()
    }

    /// All scraped records, newest first. Empties the list on failure.
    pub async fn fetch_list(&self) -> Result<Vec<RawDataRecord>, Failure> {
        let api = Arc::clone(&self.inner.api);
        self.track(async move { api.list_raw_data().await }, |s, v| {
            s.list = v.unwrap_or_default();
        })
        .await
    }

    /// Most recent record. Clears `latest` on failure.
    pub async fn fetch_latest(&self) -> Result<RawDataRecord, Failure> {
        let api = Arc::clone(&self.inner.api);
        self.track(async move { api.latest_raw_data().await }, |s, v| {
            s.latest = v;
        })
        .await
    }

    /// One record by id. Clears `current` on failure.
    pub async fn fetch_by_id(&self, id: &str) -> Result<RawDataRecord, Failure> {
        let api = Arc::clone(&self.inner.api);
        let id = id.to_owned();
        self.track(async move { api.get_raw_data(&id).await }, |s, v| {
            s.current = v;
        })
        .await
    }

    async fn track<T: Clone>(
        &self,
        request: impl Future<Output = Result<T, hbscope_api::Error>>,
        store: fn(&mut RawDataState, Option<T>),
    ) -> Result<T, Failure> {
        let _loading =
            LoadingGuard::start(&self.inner.state, &self.inner.in_flight, |s| &mut s.loading);
        self.inner.state.send_modify(|s| s.error = None);

        match request.await {
            Ok(value) => {
                let kept = value.clone();
                self.inner.state.send_modify(|s| store(s, Some(kept)));
                Ok(value)
            }
            Err(err) => {
                let failure = Failure::from_api(&err, &RAW_DATA_MESSAGES);
                warn!(error = %err, "raw data fetch failed");
                self.inner.state.send_modify(|s| {
                    store(s, None);
                    s.error = Some(failure.clone());
                });
                Err(failure)
            }
        }
    }
}

/// Serialized size of a record's JSON payload, in bytes.
pub fn payload_size(record: &RawDataRecord) -> usize {
    serde_json::to_vec(&record.json_data).map_or(0, |bytes| bytes.len())
}

/// Write a record's payload, pretty-printed, to `path`. Returns bytes written.
pub fn export(record: &RawDataRecord, path: &Path) -> Result<usize, CoreError> {
    let pretty = serde_json::to_string_pretty(&record.json_data)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &pretty)?;
    debug!(id = %record.id, path = %path.display(), "raw data exported");
    Ok(pretty.len())
}
