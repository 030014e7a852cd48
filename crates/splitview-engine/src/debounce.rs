//! Coalesces bursts of bounds notifications per window.
//!
//! Every notification pushes the window's deadline out again; work only
//! runs once a window has been quiet for the whole delay.

use std::collections::HashMap;
use std::time::Duration;

use splitview_common::{TabId, WindowId};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingWork {
    /// The parent window moved or resized: re-tile every visible controller
    /// over it.
    Retile(WindowId),
    /// The user resized one popup directly.
    MemberResized { anchor: TabId, window: WindowId },
}

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: HashMap<WindowId, (Instant, PendingWork)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    /// Schedule `work` for `window`, superseding anything already pending
    /// for it.
    pub fn schedule(&mut self, window: WindowId, work: PendingWork) {
        self.pending.insert(window, (Instant::now() + self.delay, work));
    }

    pub fn cancel(&mut self, window: WindowId) -> bool {
        self.pending.remove(&window).is_some()
    }

    /// Drop pending resizes belonging to a controller.
    pub fn cancel_anchor(&mut self, anchor: TabId) {
        self.pending
            .retain(|_, (_, work)| !matches!(work, PendingWork::MemberResized { anchor: a, .. } if *a == anchor));
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|(deadline, _)| *deadline).min()
    }

    /// Remove and return every piece of work whose deadline has passed,
    /// oldest deadline first.
    pub fn take_due(&mut self) -> Vec<PendingWork> {
        let now = Instant::now();
        let mut due: Vec<(Instant, PendingWork)> = Vec::new();
        self.pending.retain(|_, (deadline, work)| {
            if *deadline <= now {
                due.push((*deadline, *work));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|(deadline, _)| *deadline);
        due.into_iter().map(|(_, work)| work).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_one() {
        let mut debounce = Debouncer::new(Duration::from_millis(100));
        for _ in 0..5 {
            debounce.schedule(WindowId(1), PendingWork::Retile(WindowId(1)));
            tokio::time::advance(Duration::from_millis(40)).await;
            assert!(debounce.take_due().is_empty());
        }
        tokio::time::advance(Duration::from_millis(60)).await;
        assert_eq!(debounce.take_due(), vec![PendingWork::Retile(WindowId(1))]);
        assert!(debounce.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn windows_are_independent() {
        let mut debounce = Debouncer::new(Duration::from_millis(100));
        debounce.schedule(WindowId(1), PendingWork::Retile(WindowId(1)));
        tokio::time::advance(Duration::from_millis(50)).await;
        let resize = PendingWork::MemberResized {
            anchor: TabId(9),
            window: WindowId(2),
        };
        debounce.schedule(WindowId(2), resize);
        assert_eq!(debounce.next_deadline(), Some(Instant::now() + Duration::from_millis(50)));

        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(debounce.take_due(), vec![PendingWork::Retile(WindowId(1))]);
        debounce.cancel_anchor(TabId(9));
        assert!(debounce.is_empty());
    }
}
