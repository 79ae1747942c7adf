//! The client-side view of the user's API keys.
//!
//! `ApiKeyStore` holds the collection exactly as the backend last returned
//! it. Writes never patch it locally; every successful create is followed
//! by a full refetch.

pub mod store;

pub use store::{ApiKeyStore, CREATE_FAILED};
