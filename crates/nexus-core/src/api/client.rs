//! API client for communicating with the nexus-explorer REST API.
//!
//! Every response body is decoded into an explicit wire type; bodies that
//! do not match are reported as `ApiError::InvalidResponse` instead of being
//! passed on half-filled.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::auth::{AuthHeader, Credential};
use crate::config::Config;
use crate::models::{ApiKeyRecord, CreatedKey, Stats, UserProfile};

use super::ApiError;

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: UserProfile,
}

/// The backend names the label field `username`.
#[derive(Debug, Serialize)]
struct CreateKeyRequest<'a> {
    #[serde(rename = "username", skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ProfileRequest<'a> {
    username: &'a str,
    email: &'a str,
}

/// API client for the nexus-explorer backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the configured backend
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::with_base_url(&config.backend_url, config.request_timeout())
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Decode a successful response into `T`, rejecting bodies of the wrong shape
    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, ApiError> {
        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", what, e)))
    }

    // ===== Auth =====

    /// Create an account. Registration does not yield a session.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
        let body = RegisterRequest {
            username,
            email,
            password,
        };
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(&body)
            .send()
            .await?;

        Self::check_response(response).await?;
        debug!("Registration accepted");
        Ok(())
    }

    /// Exchange email and password for a token and profile
    pub async fn login(&self, email: &str, password: &str) -> Result<Credential, ApiError> {
        let body = LoginRequest { email, password };
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&body)
            .send()
            .await?;

        let login: LoginResponse = Self::parse(response, "login response").await?;
        if login.token.trim().is_empty() {
            return Err(ApiError::InvalidResponse(
                "login response: empty token".to_string(),
            ));
        }

        Ok(Credential {
            token: login.token,
            user: login.user,
        })
    }

    /// Invalidate the token on the server
    pub async fn logout(&self, auth: &AuthHeader) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/auth/logout"))
            .headers(auth.headers())
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// Save username and email for the signed-in account
    pub async fn update_profile(
        &self,
        auth: &AuthHeader,
        username: &str,
        email: &str,
    ) -> Result<(), ApiError> {
        let body = ProfileRequest { username, email };
        let response = self
            .client
            .patch(self.url("/me"))
            .headers(auth.headers())
            .json(&body)
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Data =====

    pub async fn fetch_stats(&self, auth: &AuthHeader) -> Result<Stats, ApiError> {
        let response = self
            .client
            .get(self.url("/stats"))
            .headers(auth.headers())
            .send()
            .await?;

        Self::parse(response, "stats response").await
    }

    /// Fetch every API key of the signed-in user, in backend order
    pub async fn list_api_keys(&self, auth: &AuthHeader) -> Result<Vec<ApiKeyRecord>, ApiError> {
        let response = self
            .client
            .get(self.url("/api-keys"))
            .headers(auth.headers())
            .send()
            .await?;

        Self::parse(response, "api key list").await
    }

    /// Request a new API key. `None` omits the label field entirely.
    pub async fn create_api_key(
        &self,
        auth: &AuthHeader,
        label: Option<&str>,
    ) -> Result<CreatedKey, ApiError> {
        let body = CreateKeyRequest { label };
        let response = self
            .client
            .post(self.url("/api-keys/create"))
            .headers(auth.headers())
            .json(&body)
            .send()
            .await?;

        Self::parse(response, "create api key response").await
    }
}
