//! REST API client module for the nexus-explorer backend.
//!
//! This module provides the `ApiClient` for the auth, stats and API-key
//! endpoints. Authorized calls take an `AuthHeader` derived by the
//! session manager; the client itself holds no credentials.

pub mod client;
pub mod error;

use std::future::Future;

use tokio_util::sync::CancellationToken;

pub use client::ApiClient;
pub use error::{ActionError, ApiError};

/// Race a request against a cancellation token.
/// A response that arrives after cancellation is dropped unread.
pub async fn cancellable<T, F>(token: &CancellationToken, request: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    if token.is_cancelled() {
        return Err(ApiError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ApiError::Cancelled),
        result = request => result,
    }
}
