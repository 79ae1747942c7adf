//! Core library for nexus-explorer.
//!
//! Session lifecycle and resource synchronization for a client that manages
//! a user's API keys against a remote service:
//!
//! - `auth`: session manager, credential persistence, auth gateway
//! - `api`: HTTP client and error taxonomy
//! - `keys`: the API-key collection, refetched in full after every create
//! - `stats`: aggregate usage counters
//! - `state`: ephemeral UI state machines
//! - `storage`: key-value persistence backends and the theme preference

pub mod api;
pub mod auth;
pub mod config;
pub mod keys;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod utils;

pub use api::{ActionError, ApiClient, ApiError};
pub use auth::{AuthGateway, Credential, CredentialStore, SessionManager};
pub use config::Config;
pub use keys::ApiKeyStore;
pub use stats::{StatsReader, StatsView};
