// hbscope-api: Async Rust client for the bundle catalog / ETL backend

pub mod auth;
pub mod bundles;
pub mod client;
pub mod error;
pub mod etl;
pub mod models;
pub mod raw_data;
pub mod system;
pub mod transport;

pub use auth::LoginCredentials;
pub use client::ApiClient;
pub use error::{Error, is_api_error};
pub use models::{
    BookItem, Bundle, EtlRunResponse, HealthStatus, ImageInfo, Price, PriceTier, RawDataRecord,
    TokenResponse, UserInfo, parse_timestamp,
};
pub use transport::{DEFAULT_LONG_TIMEOUT, DEFAULT_TIMEOUT, TlsMode, TransportConfig};
