//! Suppresses bounds notifications caused by the engine's own window moves.

use std::collections::HashMap;
use std::time::Duration;

use splitview_common::WindowId;
use tokio::time::Instant;

#[derive(Debug)]
pub struct SelfMoveGuard {
    ttl: Duration,
    marks: HashMap<WindowId, Instant>,
}

impl SelfMoveGuard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            marks: HashMap::new(),
        }
    }

    /// Record that the engine is about to move `window`.
    pub fn mark(&mut self, window: WindowId) {
        self.marks.insert(window, Instant::now() + self.ttl);
    }

    /// Whether a bounds change on `window` is an echo of our own move. The
    /// mark stays until it expires, since one move can produce several
    /// notifications.
    pub fn is_self_move(&mut self, window: WindowId) -> bool {
        match self.marks.get(&window) {
            Some(expiry) if *expiry > Instant::now() => true,
            Some(_) => {
                self.marks.remove(&window);
                false
            }
            None => false,
        }
    }

    pub fn clear(&mut self, window: WindowId) {
        self.marks.remove(&window);
    }

    /// Drop expired marks.
    pub fn prune(&mut self) {
        let now = Instant::now();
        self.marks.retain(|_, expiry| *expiry > now);
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
