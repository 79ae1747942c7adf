//! The session context shared by every component that makes authorized calls.
//!
//! One `SessionManager` is built at start-up with [`SessionManager::hydrate`]
//! and handed out behind an `Arc`. Storage is always written before memory is
//! committed, so the persisted credential and the in-memory one never diverge.

use std::fmt;
use std::future::Future;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use anyhow::Result;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::models::{ProfileUpdate, UserProfile};

use super::credentials::{Credential, CredentialStore};
use super::gateway::AuthGateway;

/// Default bound on the remote logout call
const DEFAULT_LOGOUT_TIMEOUT_SECS: u64 = 5;

/// Request headers for authorized calls, derived from the current token.
#[derive(Clone)]
pub struct AuthHeader {
    headers: HeaderMap,
}

impl AuthHeader {
    pub fn bearer(token: &str) -> Result<Self, ApiError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidResponse("token is not a valid header value".to_string()))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value);
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(Self { headers })
    }

    pub fn headers(&self) -> HeaderMap {
        self.headers.clone()
    }

    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }
}

impl fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthHeader(Bearer <redacted>)")
    }
}

enum SessionState {
    Anonymous,
    Authenticated {
        credential: Credential,
        header: AuthHeader,
        /// Cancelled when this session ends; parent of every consumer token
        lifetime: CancellationToken,
    },
}

impl SessionState {
    fn authenticated(credential: Credential) -> Result<Self, ApiError> {
        let header = AuthHeader::bearer(&credential.token)?;
        Ok(SessionState::Authenticated {
            credential,
            header,
            lifetime: CancellationToken::new(),
        })
    }

    fn end(self) {
        if let SessionState::Authenticated { lifetime, .. } = self {
            lifetime.cancel();
        }
    }
}

/// Result of a call made under the best-effort policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    Acknowledged,
    Failed(String),
    /// Nothing to notify (already anonymous)
    Skipped,
}

/// Best-effort, non-blocking: the call is attempted once and bounded by
/// `limit`; its failure is logged and recorded, never raised.
pub async fn best_effort<F>(what: &str, limit: Duration, call: F) -> RemoteOutcome
where
    F: Future<Output = Result<(), ApiError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(())) => RemoteOutcome::Acknowledged,
        Ok(Err(e)) => {
            warn!(error = %e, "{} failed (ignored)", what);
            RemoteOutcome::Failed(e.to_string())
        }
        Err(_) => {
            warn!(timeout_secs = limit.as_secs(), "{} timed out (ignored)", what);
            RemoteOutcome::Failed(format!("timed out after {:?}", limit))
        }
    }
}

/// What happened during logout. Local state is anonymous in every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub remote: RemoteOutcome,
    /// Set when the persisted credential could not be removed
    pub storage_error: Option<String>,
}

impl LogoutOutcome {
    pub fn is_clean(&self) -> bool {
        self.storage_error.is_none() && !matches!(self.remote, RemoteOutcome::Failed(_))
    }
}

pub struct SessionManager {
    store: CredentialStore,
    state: RwLock<SessionState>,
    logout_timeout: Duration,
}

impl SessionManager {
    /// Build the session from persisted storage.
    ///
    /// Storage that cannot be read (e.g. a locked keychain) starts the
    /// session signed out rather than failing start-up.
    pub fn hydrate(store: CredentialStore) -> Self {
        let state = match store.load() {
            Ok(Some(credential)) => match SessionState::authenticated(credential) {
                Ok(state) => {
                    debug!("Session restored from storage");
                    state
                }
                Err(e) => {
                    warn!(error = %e, "Stored token unusable, starting signed out");
                    if let Err(e) = store.clear() {
                        warn!(error = %e, "Failed to clear unusable session");
                    }
                    SessionState::Anonymous
                }
            },
            Ok(None) => SessionState::Anonymous,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session, starting signed out");
                SessionState::Anonymous
            }
        };

        Self {
            store,
            state: RwLock::new(state),
            logout_timeout: Duration::from_secs(DEFAULT_LOGOUT_TIMEOUT_SECS),
        }
    }

    pub fn with_logout_timeout(mut self, timeout: Duration) -> Self {
        self.logout_timeout = timeout;
        self
    }

    // The guarded state is only ever swapped whole, so a poisoned lock still holds a valid value
    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start (or replace) the session. Persists first, then commits in memory.
    pub fn login(&self, credential: Credential) -> Result<()> {
        let next = SessionState::authenticated(credential.clone())?;
        let mut state = self.write();

        if let Err(e) = self.store.save(&credential) {
            self.restore_persisted(&state);
            return Err(e);
        }

        let previous = std::mem::replace(&mut *state, next);
        previous.end();
        info!(username = %credential.user.username, "Signed in");
        Ok(())
    }

    /// Bring storage back in line with memory after a failed write
    fn restore_persisted(&self, state: &SessionState) {
        let restored = match state {
            SessionState::Anonymous => self.store.clear(),
            SessionState::Authenticated { credential, .. } => self.store.save(credential),
        };
        if let Err(e) = restored {
            warn!(error = %e, "Failed to restore persisted session");
        }
    }

    /// End the session.
    ///
    /// The remote invalidation runs under [`best_effort`]: a network failure
    /// is reported in the outcome but never keeps the user signed in.
    pub async fn logout(&self, gateway: &AuthGateway) -> LogoutOutcome {
        let header = match &*self.read() {
            SessionState::Authenticated { header, .. } => Some(header.clone()),
            SessionState::Anonymous => None,
        };

        let remote = match header {
            Some(header) => {
                best_effort("Remote logout", self.logout_timeout, gateway.logout(&header)).await
            }
            None => RemoteOutcome::Skipped,
        };

        let mut state = self.write();
        let previous = std::mem::replace(&mut *state, SessionState::Anonymous);
        previous.end();

        let storage_error = match self.store.clear() {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "Failed to clear persisted session");
                Some(format!("{:#}", e))
            }
        };
        info!("Signed out");

        LogoutOutcome {
            remote,
            storage_error,
        }
    }

    /// Headers for an authorized call. Callers must be signed in.
    pub fn auth_header(&self) -> Result<AuthHeader, ApiError> {
        match &*self.read() {
            SessionState::Authenticated { header, .. } => Ok(header.clone()),
            SessionState::Anonymous => Err(ApiError::NotAuthenticated),
        }
    }

    /// Merge a locally confirmed profile edit and persist it.
    /// Does not contact the backend.
    pub fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        let mut state = self.write();
        match &mut *state {
            SessionState::Anonymous => Err(ApiError::NotAuthenticated.into()),
            SessionState::Authenticated { credential, .. } => {
                let merged = credential.user.merged(update);
                self.store.save_user(&merged)?;
                credential.user = merged.clone();
                debug!("Profile updated");
                Ok(merged)
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(&*self.read(), SessionState::Authenticated { .. })
    }

    pub fn credential(&self) -> Option<Credential> {
        match &*self.read() {
            SessionState::Authenticated { credential, .. } => Some(credential.clone()),
            SessionState::Anonymous => None,
        }
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.credential().map(|c| c.user)
    }

    /// A token cancelled when the current session ends.
    /// While signed out the returned token is already cancelled.
    pub fn cancellation(&self) -> CancellationToken {
        match &*self.read() {
            SessionState::Authenticated { lifetime, .. } => lifetime.child_token(),
            SessionState::Anonymous => {
                let token = CancellationToken::new();
                token.cancel();
                token
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::api::ApiClient;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::storage::{KeyValueStore, MemoryStore};

    /// Memory store that rejects writes of a given key while armed,
    /// optionally only when the value contains `needle`
    #[derive(Default)]
    struct FailingStore {
        inner: MemoryStore,
        reject: Mutex<Option<(&'static str, &'static str)>>,
        unreadable: bool,
    }

    impl FailingStore {
        fn reject_writes(&self, key: &'static str, needle: &'static str) {
            *self.reject.lock().unwrap() = Some((key, needle));
        }
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            if self.unreadable {
                anyhow::bail!("store locked");
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
            if let Some((k, needle)) = *self.reject.lock().unwrap() {
                if k == key && value.contains(needle) {
                    anyhow::bail!("write rejected");
                }
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> anyhow::Result<()> {
            self.inner.remove(key)
        }
    }

    fn credential(token: &str) -> Credential {
        Credential {
            token: token.to_string(),
            user: UserProfile {
                id: None,
                username: "a".to_string(),
                email: "a@b.com".to_string(),
            },
        }
    }

    fn manager() -> (SessionManager, Arc<MemoryStore>) {
        let kv = Arc::new(MemoryStore::new());
        let session = SessionManager::hydrate(CredentialStore::new(kv.clone()));
        (session, kv)
    }

    fn persisted(kv: &Arc<MemoryStore>) -> Option<Credential> {
        CredentialStore::new(kv.clone()).load().unwrap()
    }

    /// A gateway pointing at a port nothing listens on
    fn offline_gateway() -> AuthGateway {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        AuthGateway::new(
            ApiClient::with_base_url(&format!("http://{}", addr), Duration::from_secs(2)).unwrap(),
        )
    }

    #[test]
    fn test_starts_anonymous() {
        let (session, _) = manager();
        assert!(!session.is_authenticated());
        assert!(session.credential().is_none());
        assert!(matches!(session.auth_header(), Err(ApiError::NotAuthenticated)));
        assert!(session.cancellation().is_cancelled());
    }

    #[test]
    fn test_login_persists_same_credential() {
        let (session, kv) = manager();
        session.login(credential("t1")).unwrap();

        assert!(session.is_authenticated());
        assert_eq!(session.credential(), persisted(&kv));
        assert_eq!(
            session.auth_header().unwrap().authorization(),
            Some("Bearer t1")
        );
    }

    #[test]
    fn test_login_again_replaces_and_cancels_old_session() {
        let (session, kv) = manager();
        session.login(credential("t1")).unwrap();
        let old = session.cancellation();

        session.login(credential("t2")).unwrap();

        assert!(old.is_cancelled());
        assert!(!session.cancellation().is_cancelled());
        assert_eq!(persisted(&kv).map(|c| c.token).as_deref(), Some("t2"));
        assert_eq!(
            session.auth_header().unwrap().authorization(),
            Some("Bearer t2")
        );
    }

    #[test]
    fn test_hydrate_restores_persisted_session() {
        let kv = Arc::new(MemoryStore::new());
        CredentialStore::new(kv.clone()).save(&credential("t9")).unwrap();

        let session = SessionManager::hydrate(CredentialStore::new(kv));
        assert!(session.is_authenticated());
        assert_eq!(session.credential().map(|c| c.token).as_deref(), Some("t9"));
    }

    #[test]
    fn test_hydrate_discards_unusable_token() {
        let kv = Arc::new(MemoryStore::new());
        CredentialStore::new(kv.clone())
            .save(&credential("bad\ntoken"))
            .unwrap();

        let session = SessionManager::hydrate(CredentialStore::new(kv.clone()));
        assert!(!session.is_authenticated());
        assert_eq!(kv.get("token").unwrap(), None);
    }

    #[test]
    fn test_failed_login_write_keeps_previous_session() {
        let kv = Arc::new(FailingStore::default());
        let session = SessionManager::hydrate(CredentialStore::new(kv.clone()));
        session.login(credential("t1")).unwrap();

        let mut next = credential("t2");
        next.user.username = "b".to_string();
        kv.reject_writes("token", "t2");

        assert!(session.login(next).is_err());

        let held = session.credential().unwrap();
        assert_eq!(held.token, "t1");
        assert_eq!(held.user.username, "a");
        assert_eq!(Some(held), CredentialStore::new(kv).load().unwrap());
        assert_eq!(
            session.auth_header().unwrap().authorization(),
            Some("Bearer t1")
        );
    }

    #[test]
    fn test_failed_first_login_write_stays_anonymous() {
        let kv = Arc::new(FailingStore::default());
        let session = SessionManager::hydrate(CredentialStore::new(kv.clone()));
        kv.reject_writes("token", "t1");

        assert!(session.login(credential("t1")).is_err());

        assert!(!session.is_authenticated());
        assert_eq!(kv.get("token").unwrap(), None);
        assert_eq!(kv.get("user").unwrap(), None);
    }

    #[test]
    fn test_failed_profile_write_keeps_previous_profile() {
        let kv = Arc::new(FailingStore::default());
        let session = SessionManager::hydrate(CredentialStore::new(kv.clone()));
        session.login(credential("t1")).unwrap();
        kv.reject_writes("user", "renamed");

        let update = ProfileUpdate {
            username: Some("renamed".to_string()),
            email: None,
        };
        assert!(session.update_profile(&update).is_err());

        assert_eq!(session.user().map(|u| u.username).as_deref(), Some("a"));
        assert_eq!(session.credential(), CredentialStore::new(kv).load().unwrap());
    }

    #[test]
    fn test_hydrate_unreadable_store_starts_signed_out() {
        let kv = Arc::new(FailingStore {
            unreadable: true,
            ..FailingStore::default()
        });
        let session = SessionManager::hydrate(CredentialStore::new(kv));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_update_profile_merges_and_persists() {
        let (session, kv) = manager();
        session.login(credential("t1")).unwrap();

        let update = ProfileUpdate {
            username: Some("renamed".to_string()),
            email: None,
        };
        let user = session.update_profile(&update).unwrap();

        assert_eq!(user.username, "renamed");
        assert_eq!(user.email, "a@b.com");
        assert_eq!(session.credential(), persisted(&kv));
    }

    #[test]
    fn test_update_profile_requires_session() {
        let (session, kv) = manager();
        assert!(session.update_profile(&ProfileUpdate::default()).is_err());
        assert!(persisted(&kv).is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_state_when_offline() {
        let (session, kv) = manager();
        session.login(credential("t1")).unwrap();
        let token = session.cancellation();

        let outcome = session.logout(&offline_gateway()).await;

        assert!(matches!(outcome.remote, RemoteOutcome::Failed(_)));
        assert!(outcome.storage_error.is_none());
        assert!(!session.is_authenticated());
        assert!(persisted(&kv).is_none());
        assert!(kv.get("user").unwrap().is_none());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_logout_notifies_backend_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .and(header("Authorization", "Bearer t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let (session, kv) = manager();
        session.login(credential("t1")).unwrap();
        let gateway =
            AuthGateway::new(ApiClient::with_base_url(&server.uri(), Duration::from_secs(2)).unwrap());

        let outcome = session.logout(&gateway).await;

        assert_eq!(outcome.remote, RemoteOutcome::Acknowledged);
        assert!(outcome.is_clean());
        assert!(!session.is_authenticated());
        assert!(persisted(&kv).is_none());
    }

    #[tokio::test]
    async fn test_logout_server_error_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (session, kv) = manager();
        session.login(credential("t1")).unwrap();
        let gateway =
            AuthGateway::new(ApiClient::with_base_url(&server.uri(), Duration::from_secs(2)).unwrap());

        let outcome = session.logout(&gateway).await;
        assert!(!outcome.is_clean());
        assert!(!session.is_authenticated());
        assert!(persisted(&kv).is_none());
    }

    #[tokio::test]
    async fn test_logout_when_anonymous_skips_remote() {
        let (session, _) = manager();
        let outcome = session.logout(&offline_gateway()).await;
        assert_eq!(outcome.remote, RemoteOutcome::Skipped);
        assert!(outcome.is_clean());
    }

    #[tokio::test]
    async fn test_best_effort_times_out() {
        let outcome = best_effort("Slow call", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(outcome, RemoteOutcome::Failed(_)));
    }
}
