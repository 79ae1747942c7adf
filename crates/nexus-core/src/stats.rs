//! Read-only aggregate usage counters.
//!
//! Stats are advisory: a failed fetch resolves the loading indicator and
//! keeps whatever value was shown before.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{cancellable, ApiClient, ApiError};
use crate::auth::SessionManager;
use crate::models::Stats;

/// What the dashboard should show for the stats panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsView {
    Loading,
    Loaded(Stats),
    /// The first fetch failed; there is no value to show
    Unavailable,
}

pub struct StatsReader {
    api: ApiClient,
    session: Arc<SessionManager>,
    view: StatsView,
    cancel: CancellationToken,
}

impl StatsReader {
    pub fn new(api: ApiClient, session: Arc<SessionManager>) -> Self {
        let cancel = session.cancellation();
        Self {
            api,
            session,
            view: StatsView::Loading,
            cancel,
        }
    }

    /// Fetch the stats and replace the held value.
    /// The error is returned for logging only; the view is always resolved.
    pub async fn fetch(&mut self) -> Result<Stats, ApiError> {
        let previous = self.stats();
        self.view = StatsView::Loading;

        let result = match self.session.auth_header() {
            Ok(auth) => cancellable(&self.cancel, self.api.fetch_stats(&auth)).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(stats) => {
                debug!(total_keys = stats.total_keys, total_usage = stats.total_usage, "Stats fetched");
                self.view = StatsView::Loaded(stats);
                Ok(stats)
            }
            Err(e) => {
                warn!(error = %e, "Stats fetch failed");
                self.view = previous.map_or(StatsView::Unavailable, StatsView::Loaded);
                Err(e)
            }
        }
    }

    pub fn view(&self) -> StatsView {
        self.view
    }

    pub fn stats(&self) -> Option<Stats> {
        match self.view {
            StatsView::Loaded(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn teardown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for StatsReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
