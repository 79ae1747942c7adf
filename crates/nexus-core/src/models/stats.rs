use serde::{Deserialize, Serialize};

/// Aggregate usage counters for the signed-in user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Stats {
    pub total_keys: u64,
    pub total_usage: u64,
}
