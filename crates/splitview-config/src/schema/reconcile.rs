//! Event reconciliation timing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Quiet period before a burst of bounds-changed events is acted on,
    /// in milliseconds (valid range: 0-2000).
    pub bounds_debounce_ms: u64,
    /// How long a bounds change the engine made itself is ignored by the
    /// bounds-changed listener, in milliseconds (valid range: 50-5000).
    pub self_move_guard_ms: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            bounds_debounce_ms: 100,
            self_move_guard_ms: 500,
        }
    }
}
