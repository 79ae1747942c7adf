//! Data models shared between the API client, the stores and the UI.
//!
//! - `UserProfile`, `ProfileUpdate`: the signed-in account
//! - `ApiKeyRecord`, `CreatedKey`: API-key resources
//! - `Stats`: aggregate usage counters
//! - `ResourceId`: backend identifiers (integer or string)

pub mod api_key;
pub mod stats;
pub mod user;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use api_key::{ApiKeyRecord, CreatedKey};
pub use stats::Stats;
pub use user::{ProfileUpdate, UserProfile};

/// Identifier assigned by the backend.
/// Depending on the storage engine behind the service ids arrive either as
/// JSON numbers or as strings; both are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(id) => write!(f, "{}", id),
            ResourceId::Text(id) => f.write_str(id),
        }
    }
}
