//! Engine configuration. The core never reads environment variables or
//! files itself — that belongs to the embedding binary, which is outside
//! this crate's scope — but the type is serde-enabled so a config file
//! can be deserialized straight into it.

use serde::{Deserialize, Serialize};

/// Tunables for one `EngineRegistry`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bound on each subscriber's per-topic event queue.
    pub subscriber_queue_capacity: usize,
    /// Default depth returned by an orderbook snapshot when the caller
    /// does not specify one.
    pub default_snapshot_depth: usize,
    /// Capacity of the per-symbol recent-trades ring buffer.
    pub recent_trades_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            subscriber_queue_capacity: 1024,
            default_snapshot_depth: 20,
            recent_trades_capacity: 200,
        }
    }
}
