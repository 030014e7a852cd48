//! Active member and full-page expansion.

use splitview_common::MemberId;

use super::Session;

impl Session {
    pub fn active(&self) -> Option<MemberId> {
        self.active
    }

    pub fn expanded(&self) -> Option<MemberId> {
        self.expanded
    }

    pub fn set_active(&mut self, id: MemberId) -> bool {
        if self.contains(id) {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    /// Activate the next member in visual order, wrapping around.
    pub fn focus_next(&mut self) -> bool {
        self.step_focus(1)
    }

    /// Activate the previous member in visual order, wrapping around.
    pub fn focus_prev(&mut self) -> bool {
        self.step_focus(self.members.len().saturating_sub(1))
    }

    fn step_focus(&mut self, step: usize) -> bool {
        let n = self.members.len();
        if n <= 1 {
            return false;
        }
        let current = self.active.and_then(|id| self.index_of(id)).unwrap_or(0);
        self.active = Some(self.members[(current + step) % n].id);
        true
    }

    /// Expand a member to fill the split, or collapse it if it already is.
    pub fn toggle_expand(&mut self, id: MemberId) -> bool {
        if self.members.len() <= 1 || !self.contains(id) {
            return false;
        }
        if self.expanded == Some(id) {
            self.expanded = None;
        } else {
            self.expanded = Some(id);
            self.active = Some(id);
        }
        true
    }

    pub fn collapse(&mut self) -> bool {
        self.expanded.take().is_some()
    }
}
