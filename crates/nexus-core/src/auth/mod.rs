//! Authentication module for managing the user session and its credentials.
//!
//! This module provides:
//! - `SessionManager`: the in-memory session, its bearer header and the
//!   login/logout transitions
//! - `CredentialStore`: persistence of the token and user profile
//! - `AuthGateway`: register/login/logout/profile exchanges with the backend
//!
//! Sessions are hydrated from storage at start-up and persisted on every change.

pub mod credentials;
pub mod gateway;
pub mod session;

pub use credentials::{Credential, CredentialStore};
pub use gateway::AuthGateway;
pub use session::{AuthHeader, LogoutOutcome, RemoteOutcome, SessionManager};
