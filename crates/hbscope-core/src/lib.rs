// hbscope-core: Session and data state between hbscope-api and consumers (CLI).

pub mod backend;
pub mod bundles;
pub mod config;
pub mod error;
mod loading;
pub mod raw_data;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::Backend;
pub use bundles::{BundleLookup, BundleManager, BundleState, latest_verification};
pub use config::{BackendConfig, DEFAULT_BASE_URL, TlsVerification};
pub use error::{CoreError, ErrorKind, Failure, Messages, classify_error};
pub use raw_data::{RawDataManager, RawDataState};
pub use session::{SessionManager, SessionPhase, SessionState};
pub use store::{FileSessionStore, MemorySessionStore, SESSION_KEY, SessionStore, StoreError};

// Wire types consumers need without a direct hbscope-api dependency.
pub use hbscope_api::{
    ApiClient, Bundle, EtlRunResponse, HealthStatus, LoginCredentials, RawDataRecord, UserInfo,
    is_api_error, parse_timestamp,
};
