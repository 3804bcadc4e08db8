// ── Session manager ──
//
// Owns the bearer token and current user, mirrors them into a
// `SessionStore`, and pushes the token into the shared `ApiClient`.
// Lifecycle: Uninitialized -> Restoring -> {Authenticated | Anonymous}.

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use hbscope_api::{ApiClient, LoginCredentials, UserInfo};

use crate::error::{CoreError, ErrorKind, classify_error};
use crate::loading::LoadingGuard;
use crate::store::SessionStore;

const LOGIN_FALLBACK: &str = "Authentication failed";

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Restoring,
    Authenticated,
    Anonymous,
}

/// Observable session state.
///
/// `token` and `current_user` are always both set or both `None`.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub token: Option<SecretString>,
    pub current_user: Option<UserInfo>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            token: None,
            current_user: None,
            loading: false,
            error: None,
        }
    }
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// On-disk / in-store shape of a session.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    token: String,
    user: UserInfo,
}

/// Authentication state container.
///
/// Cheaply cloneable; clones share state. Construct one per backend
/// session and call [`restore()`](Self::restore) once before use.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: Arc<ApiClient>,
    store: Arc<dyn SessionStore>,
    state: watch::Sender<SessionState>,
    in_flight: AtomicUsize,
}

impl SessionManager {
    pub fn new(api: Arc<ApiClient>, store: Arc<dyn SessionStore>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(SessionInner {
                api,
                store,
                state,
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.state.borrow().phase
    }

    /// True iff a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn current_user(&self) -> Option<UserInfo> {
        self.inner.state.borrow().current_user.clone()
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.inner.api
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load a previously persisted session.
    ///
    /// Only acts on the first call. A missing entry leaves the session
    /// anonymous; an unparseable one is removed from the store first.
    pub fn restore(&self) -> SessionPhase {
        let mut started = false;
        self.inner.state.send_if_modified(|s| {
            if s.phase == SessionPhase::Uninitialized {
                s.phase = SessionPhase::Restoring;
                started = true;
            }
            started
        });
        if !started {
            return self.phase();
        }

        let raw = match self.inner.store.load() {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "could not read persisted session");
                None
            }
        };

        let Some(raw) = raw else {
            debug!("no persisted session");
            return self.finish_anonymous();
        };

        match parse_session(&raw) {
            Some(persisted) => {
                let token = SecretString::from(persisted.token);
                self.inner.api.set_auth_token(Some(token.clone()));
                info!(username = %persisted.user.username, "restored session");
                self.inner.state.send_modify(|s| {
                    s.token = Some(token);
                    s.current_user = Some(persisted.user);
                    s.phase = SessionPhase::Authenticated;
                });
                SessionPhase::Authenticated
            }
            None => {
                warn!("discarding corrupt persisted session");
                if let Err(e) = self.inner.store.clear() {
                    warn!(error = %e, "could not remove corrupt session");
                }
                self.finish_anonymous()
            }
        }
    }

    fn finish_anonymous(&self) -> SessionPhase {
        self.inner.state.send_modify(|s| {
            s.token = None;
            s.current_user = None;
            s.phase = SessionPhase::Anonymous;
        });
        SessionPhase::Anonymous
    }

    /// Exchange credentials for a token.
    ///
    /// On success the token is attached to the API client and persisted.
    /// On failure the user-facing message lands in `state().error` and the
    /// original transport error is returned as the source of the
    /// `CoreError`.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<UserInfo, CoreError> {
        let _loading =
            LoadingGuard::start(&self.inner.state, &self.inner.in_flight, |s| &mut s.loading);
        self.inner.state.send_modify(|s| s.error = None);

        match self.inner.api.login(credentials).await {
            Ok(response) => {
                let token = SecretString::from(response.access_token);
                let user = response.user;
                self.inner.api.set_auth_token(Some(token.clone()));
                self.inner.state.send_modify(|s| {
                    s.token = Some(token);
                    s.current_user = Some(user.clone());
                    s.phase = SessionPhase::Authenticated;
                });
                self.persist();
                info!(username = %user.username, "logged in");
                Ok(user)
            }
            Err(err) => {
                let message = login_failure_message(&err);
                warn!(error = %err, "login failed");
                self.inner
                    .state
                    .send_modify(|s| s.error = Some(message.clone()));
                Err(CoreError::Request {
                    message,
                    source: err,
                })
            }
        }
    }

    /// Drop the session everywhere: memory, API client, store.
    pub fn logout(&self) {
        self.inner.state.send_modify(|s| {
            s.token = None;
            s.current_user = None;
            s.error = None;
            s.phase = SessionPhase::Anonymous;
        });
        self.inner.api.set_auth_token(None);
        self.persist();
        debug!("logged out");
    }

    /// Mirror the in-memory session into the store.
    fn persist(&self) {
        let snapshot = {
            let state = self.inner.state.borrow();
            match (&state.token, &state.current_user) {
                (Some(token), Some(user)) => Some(PersistedSession {
                    token: token.expose_secret().to_owned(),
                    user: user.clone(),
                }),
                _ => None,
            }
        };

        let result = match snapshot {
            Some(session) => match serde_json::to_string(&session) {
                Ok(raw) => self.inner.store.save(&raw),
                Err(e) => {
                    warn!(error = %e, "could not serialize session");
                    return;
                }
            },
            None => self.inner.store.clear(),
        };

        if let Err(e) = result {
            warn!(error = %e, "could not persist session");
        }
    }
}

fn parse_session(raw: &str) -> Option<PersistedSession> {
    serde_json::from_str::<PersistedSession>(raw)
        .ok()
        .filter(|s| !s.token.is_empty())
}

/// The body's `detail`, then HTTP status text, then a generic message.
/// A `message` field is not consulted here.
fn login_failure_message(err: &hbscope_api::Error) -> String {
    match classify_error(err) {
        ErrorKind::Server { reason, .. } => err
            .body_field("detail")
            .or(reason)
            .unwrap_or_else(|| LOGIN_FALLBACK.to_owned()),
        _ => LOGIN_FALLBACK.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_message_prefers_detail_then_reason() {
        let detail = hbscope_api::Error::Http {
            status: 401,
            reason: Some("Unauthorized".into()),
            body: Some(json!({"detail": "Invalid credentials"})),
        };
        let reason_only = hbscope_api::Error::Http {
            status: 401,
            reason: Some("Unauthorized".into()),
            body: None,
        };
        let message_only = hbscope_api::Error::Http {
            status: 401,
            reason: Some("Unauthorized".into()),
            body: Some(json!({"message": "token expired"})),
        };
        let bare = hbscope_api::Error::Timeout { timeout_secs: 10 };

        assert_eq!(login_failure_message(&detail), "Invalid credentials");
        assert_eq!(login_failure_message(&reason_only), "Unauthorized");
        assert_eq!(login_failure_message(&message_only), "Unauthorized");
        assert_eq!(login_failure_message(&bare), LOGIN_FALLBACK);
    }

    #[test]
    fn empty_token_is_corrupt() {
        let raw = json!({
            "token": "",
            "user": {"id": "u1", "username": "a", "email": "e", "created_at": "c"}
        })
        .to_string();
        assert!(parse_session(&raw).is_none());
        assert!(parse_session("{not json").is_none());
    }
}
