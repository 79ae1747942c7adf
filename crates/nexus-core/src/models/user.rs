use serde::{Deserialize, Serialize};

use super::ResourceId;

/// Profile of the signed-in account, as returned by the login exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    pub username: String,
    // Some backends omit the email from the login payload
    #[serde(default)]
    pub email: String,
}

/// Partial profile edit. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl UserProfile {
    /// Return a copy of this profile with the update's fields applied.
    pub fn merged(&self, update: &ProfileUpdate) -> Self {
        Self {
            id: self.id.clone(),
            username: update
                .username
                .clone()
                .unwrap_or_else(|| self.username.clone()),
            email: update.email.clone().unwrap_or_else(|| self.email.clone()),
        }
    }
}
