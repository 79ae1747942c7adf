use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::UserProfile;
use crate::storage::KeyValueStore;

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

/// Token and profile of an authenticated session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    pub user: UserProfile,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Persists the session token and user profile under separate keys.
pub struct CredentialStore {
    kv: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load the persisted credential.
    /// A half-written pair (token without user or the reverse) is cleared
    /// and reported as absent.
    pub fn load(&self) -> Result<Option<Credential>> {
        let token = self.kv.get(TOKEN_KEY)?;
        let user = self.kv.get(USER_KEY)?;

        match (token, user) {
            (None, None) => Ok(None),
            (Some(token), Some(user)) if !token.trim().is_empty() => {
                match serde_json::from_str::<UserProfile>(&user) {
                    Ok(user) => Ok(Some(Credential { token, user })),
                    Err(e) => {
                        warn!(error = %e, "Stored user profile is unreadable, discarding session");
                        self.clear()?;
                        Ok(None)
                    }
                }
            }
            _ => {
                warn!("Discarding partially persisted session");
                self.clear()?;
                Ok(None)
            }
        }
    }

    pub fn save(&self, credential: &Credential) -> Result<()> {
        self.save_user(&credential.user)?;
        self.kv
            .set(TOKEN_KEY, &credential.token)
            .context("Failed to store session token")
    }

    pub fn save_user(&self, user: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.kv
            .set(USER_KEY, &json)
            .context("Failed to store user profile")
    }

    /// Remove the token first: without it the pair no longer counts as a session
    pub fn clear(&self) -> Result<()> {
        self.kv.remove(TOKEN_KEY).context("Failed to remove session token")?;
        self.kv.remove(USER_KEY).context("Failed to remove user profile")?;
        Ok(())
    }
}
