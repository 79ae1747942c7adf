//! Network exchanges for registration, login, logout and profile edits.
//!
//! The gateway never commits a login itself: it hands the credential back
//! and the caller commits it through `SessionManager::login`.

use tracing::{info, warn};

use crate::api::{ActionError, ApiClient, ApiError};
use crate::models::{ProfileUpdate, UserProfile};

use super::credentials::Credential;
use super::session::{AuthHeader, SessionManager};

pub const REGISTER_FAILED: &str = "Registration failed";
pub const LOGIN_FAILED: &str = "Login failed";
pub const PROFILE_SAVE_FAILED: &str = "Failed to save profile";

#[derive(Clone)]
pub struct AuthGateway {
    api: ApiClient,
}

impl AuthGateway {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Create an account, then log in with the same email and password.
    /// A failed registration stops the chain.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Credential, ActionError> {
        self.api
            .register(username, email, password)
            .await
            .map_err(|e| {
                warn!(error = %e, "Registration failed");
                e.into_action(REGISTER_FAILED)
            })?;
        info!(username = %username, "Registered new account");

        self.login(email, password).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Credential, ActionError> {
        self.api.login(email, password).await.map_err(|e| {
            warn!(error = %e, "Login failed");
            e.into_action(LOGIN_FAILED)
        })
    }

    /// Single remote invalidation. Callers apply the best-effort policy.
    pub async fn logout(&self, auth: &AuthHeader) -> Result<(), ApiError> {
        self.api.logout(auth).await
    }

    /// Save the profile on the backend, then commit it to the session.
    pub async fn update_profile(
        &self,
        session: &SessionManager,
        username: &str,
        email: &str,
    ) -> Result<UserProfile, ActionError> {
        let auth = session
            .auth_header()
            .map_err(|e| e.into_action(PROFILE_SAVE_FAILED))?;

        self.api
            .update_profile(&auth, username, email)
            .await
            .map_err(|e| {
                warn!(error = %e, "Profile update rejected");
                e.into_action(PROFILE_SAVE_FAILED)
            })?;

        let update = ProfileUpdate {
            username: Some(username.to_string()),
            email: Some(email.to_string()),
        };
        session
            .update_profile(&update)
            .map_err(|e| ActionError::local(PROFILE_SAVE_FAILED, e))
    }
}
