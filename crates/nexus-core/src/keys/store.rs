use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{cancellable, ActionError, ApiClient, ApiError};
use crate::auth::SessionManager;
use crate::models::{ApiKeyRecord, CreatedKey};

pub const CREATE_FAILED: &str = "Failed to create API key";

pub struct ApiKeyStore {
    api: ApiClient,
    session: Arc<SessionManager>,
    keys: Vec<ApiKeyRecord>,
    synced_at: Option<DateTime<Utc>>,
    cancel: CancellationToken,
}

impl ApiKeyStore {
    /// Bind a store to the current session. It is torn down when the
    /// session ends or the store is dropped.
    pub fn new(api: ApiClient, session: Arc<SessionManager>) -> Self {
        let cancel = session.cancellation();
        Self {
            api,
            session,
            keys: Vec::new(),
            synced_at: None,
            cancel,
        }
    }

    /// Fetch the full collection and replace the held one.
    /// On failure the previous collection is kept.
    pub async fn list(&mut self) -> Result<&[ApiKeyRecord], ApiError> {
        let auth = self.session.auth_header()?;
        let keys = cancellable(&self.cancel, self.api.list_api_keys(&auth)).await?;

        debug!(count = keys.len(), "API keys synced");
        self.keys = keys;
        self.synced_at = Some(Utc::now());
        Ok(&self.keys)
    }

    /// Create a key, then refetch the whole collection.
    ///
    /// An empty label is omitted from the request so the backend applies its
    /// default naming; any other label is sent as typed. The new record is
    /// never inserted locally.
    pub async fn create(&mut self, label: Option<&str>) -> Result<CreatedKey, ActionError> {
        let label = label.filter(|l| !l.is_empty());
        let auth = self
            .session
            .auth_header()
            .map_err(|e| e.into_action(CREATE_FAILED))?;

        let created = cancellable(&self.cancel, self.api.create_api_key(&auth, label))
            .await
            .map_err(|e| {
                warn!(error = %e, "API key creation failed");
                e.into_action(CREATE_FAILED)
            })?;
        info!("API key created");

        if let Err(e) = self.list().await {
            // The key exists on the backend; the next list picks it up
            warn!(error = %e, "Refetch after create failed");
        }
        Ok(created)
    }

    pub fn keys(&self) -> &[ApiKeyRecord] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.synced_at
    }

    /// Stop the store: in-flight requests resolve as `Cancelled` and their
    /// responses are discarded.
    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for ApiKeyStore {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::auth::{Credential, CredentialStore};
    use crate::models::UserProfile;
    use crate::storage::MemoryStore;

    fn signed_in_session() -> Arc<SessionManager> {
        let session = SessionManager::hydrate(CredentialStore::new(Arc::new(MemoryStore::new())));
        session
            .login(Credential {
                token: "t1".to_string(),
                user: UserProfile {
                    id: None,
                    username: "a".to_string(),
                    email: "a@b.com".to_string(),
                },
            })
            .unwrap();
        Arc::new(session)
    }

    fn store(server: &MockServer, session: Arc<SessionManager>) -> ApiKeyStore {
        let api = ApiClient::with_base_url(&server.uri(), Duration::from_secs(5)).unwrap();
        ApiKeyStore::new(api, session)
    }

    fn key_list(ids: &[i64]) -> serde_json::Value {
        json!(ids
            .iter()
            .map(|id| json!({"id": id, "key": format!("nx_{}", id), "label": null, "usage_count": 0}))
            .collect::<Vec<_>>())
    }

    #[tokio::test]
    async fn test_list_replaces_collection_wholesale() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api-keys"))
            .and(header("Authorization", "Bearer t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(key_list(&[3, 1, 2])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api-keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(key_list(&[5])))
            .mount(&server)
            .await;

        let mut keys = store(&server, signed_in_session());
        keys.list().await.unwrap();
        let order: Vec<String> = keys.keys().iter().map(|k| k.key.clone()).collect();
        assert_eq!(order, vec!["nx_3", "nx_1", "nx_2"]);
        assert!(keys.synced_at().is_some());

        keys.list().await.unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys.keys()[0].key, "nx_5");
    }

    #[tokio::test]
    async fn test_failed_list_keeps_previous_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api-keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(key_list(&[1, 2])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api-keys"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut keys = store(&server, signed_in_session());
        keys.list().await.unwrap();
        assert!(keys.list().await.is_err());
        assert_eq!(keys.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_list_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api-keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .mount(&server)
            .await;

        let mut keys = store(&server, signed_in_session());
        let err = keys.list().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_create_refetches_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api-keys/create"))
            .and(header("Authorization", "Bearer t1"))
            .and(body_json(json!({"username": "ci"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"key": "nx_7", "id": 7})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api-keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 7, "key": "nx_7", "label": "ci", "usage_count": 0},
                {"id": 1, "key": "nx_1", "label": null, "usage_count": 4}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let mut keys = store(&server, signed_in_session());
        let created = keys.create(Some("ci")).await.unwrap();

        assert_eq!(created.key, "nx_7");
        assert_eq!(keys.len(), 2);
        assert_eq!(keys.keys()[0].display_label(), "ci");
        assert_eq!(keys.keys()[1].usage_count, 4);
    }

    #[tokio::test]
    async fn test_create_without_label_omits_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api-keys/create"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"key": "nx_8"})))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api-keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(key_list(&[8])))
            .expect(2)
            .mount(&server)
            .await;

        let mut keys = store(&server, signed_in_session());
        keys.create(None).await.unwrap();
        keys.create(Some("")).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_sends_label_as_typed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api-keys/create"))
            .and(body_json(json!({"username": " ci "})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"key": "nx_8"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api-keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(key_list(&[8])))
            .expect(1)
            .mount(&server)
            .await;

        let mut keys = store(&server, signed_in_session());
        let created = keys.create(Some(" ci ")).await.unwrap();
        assert_eq!(created.key, "nx_8");
    }

    #[tokio::test]
    async fn test_failed_create_triggers_no_refetch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api-keys/create"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "Key limit reached"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api-keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(key_list(&[1])))
            .expect(0)
            .mount(&server)
            .await;

        let mut keys = store(&server, signed_in_session());
        let err = keys.create(Some("x")).await.unwrap_err();

        assert_eq!(err.message, "Key limit reached");
        assert!(keys.is_empty());
        assert!(keys.synced_at().is_none());
    }

    #[tokio::test]
    async fn test_create_failure_without_detail_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api-keys/create"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut keys = store(&server, signed_in_session());
        let err = keys.create(None).await.unwrap_err();
        assert_eq!(err.message, CREATE_FAILED);
    }

    #[tokio::test]
    async fn test_no_request_without_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api-keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(key_list(&[1])))
            .expect(0)
            .mount(&server)
            .await;

        let session = SessionManager::hydrate(CredentialStore::new(Arc::new(MemoryStore::new())));
        let mut keys = store(&server, Arc::new(session));

        assert!(matches!(keys.list().await, Err(ApiError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_late_response_after_teardown_is_discarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api-keys"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(key_list(&[1]))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let mut keys = store(&server, signed_in_session());
        let cancel = keys.cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        });

        let result = keys.list().await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert!(keys.is_empty());
        assert!(keys.is_torn_down());
    }

    #[tokio::test]
    async fn test_session_end_tears_down_store() {
        let server = MockServer::start().await;
        let session = signed_in_session();
        let keys = store(&server, session.clone());

        session
            .login(Credential {
                token: "t2".to_string(),
                user: UserProfile {
                    id: None,
                    username: "b".to_string(),
                    email: "b@c.com".to_string(),
                },
            })
            .unwrap();

        assert!(keys.is_torn_down());
    }
}
