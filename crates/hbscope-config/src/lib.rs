//! Shared configuration for hbscope front ends.
//!
//! TOML file + `HBSCOPE_*` environment, session store selection, and
//! translation to `hbscope_core::BackendConfig`. The CLI layers its own
//! flag overrides on top.

mod keyring_store;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use hbscope_core::{
    BackendConfig, DEFAULT_BASE_URL, FileSessionStore, MemorySessionStore, SessionStore,
    TlsVerification,
};

pub use keyring_store::KeyringSessionStore;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "HBSCOPE_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub session: SessionSettings,

    /// Username offered by `login` when `-u` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// How to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Seconds, ordinary requests.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds, long-running jobs such as the ETL.
    #[serde(default = "default_long_timeout")]
    pub long_timeout: u64,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            long_timeout: default_long_timeout(),
            insecure: false,
            ca_cert: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

/// Where the login session is persisted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionSettings {
    #[serde(default)]
    pub store: StoreKind,

    /// Session file location for the `file` store. Defaults to the data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout() -> u64 {
    10
}
fn default_long_timeout() -> u64 {
    300
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "hbscope", "hbscope")
}

fn home_fallback(sub: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(sub);
    p.push("hbscope");
    p
}

/// Resolve the config file path: `$HBSCOPE_CONFIG`, then the platform
/// config dir.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || home_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Platform data dir; the default home of the session file.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HBSCOPE_").split("__").ignore(&["config"]))
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path + environment. A missing file is fine.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Build a `BackendConfig` from the `[api]` table.
    pub fn to_backend_config(&self) -> Result<BackendConfig, ConfigError> {
        let url: url::Url = self
            .api
            .base_url
            .parse()
            .map_err(|_| ConfigError::Validation {
                field: "api.base_url".into(),
                reason: format!("invalid URL: {}", self.api.base_url),
            })?;

        if self.api.timeout == 0 || self.api.long_timeout == 0 {
            return Err(ConfigError::Validation {
                field: "api.timeout".into(),
                reason: "timeouts must be at least one second".into(),
            });
        }
        if self.api.long_timeout < self.api.timeout {
            return Err(ConfigError::Validation {
                field: "api.long_timeout".into(),
                reason: format!(
                    "{}s is shorter than api.timeout ({}s)",
                    self.api.long_timeout, self.api.timeout
                ),
            });
        }

        let tls = if self.api.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.api.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        let mut backend = BackendConfig::new(url);
        backend.tls = tls;
        backend.timeout = Duration::from_secs(self.api.timeout);
        backend.long_timeout = Duration::from_secs(self.api.long_timeout);
        Ok(backend)
    }

    /// Session file location for the `file` store.
    pub fn session_path(&self) -> PathBuf {
        self.session
            .path
            .clone()
            .unwrap_or_else(|| FileSessionStore::in_dir(&data_dir()).path().to_path_buf())
    }

    /// Instantiate the configured session store.
    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        match self.session.store {
            StoreKind::File => Arc::new(FileSessionStore::new(self.session_path())),
            StoreKind::Keyring => Arc::new(KeyringSessionStore::new()),
            StoreKind::Memory => Arc::new(MemorySessionStore::new()),
        }
    }
}
