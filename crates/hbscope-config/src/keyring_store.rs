// System keyring session store.
//
// One credential under service `hbscope`, user `hb-auth-session`.

use tracing::debug;

use hbscope_core::{SESSION_KEY, SessionStore, StoreError};

const SERVICE: &str = "hbscope";

#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    service: String,
}

impl KeyringSessionStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE.into(),
        }
    }

    /// Use a different keyring service name (e.g. one per backend).
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, StoreError> {
        keyring::Entry::new(&self.service, SESSION_KEY).map_err(backend_err)
    }
}

impl Default for KeyringSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn backend_err(err: keyring::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

impl SessionStore for KeyringSessionStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match self.entry()?.get_password() {
            Ok(raw) => Ok(Some(raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(backend_err(e)),
        }
    }

    fn save(&self, raw: &str) -> Result<(), StoreError> {
        self.entry()?.set_password(raw).map_err(backend_err)?;
        debug!(service = %self.service, "session stored in keyring");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(backend_err(e)),
        }
    }
}
