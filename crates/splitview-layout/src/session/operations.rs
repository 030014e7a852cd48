//! Structural and ratio mutations on a session.

use splitview_common::{MemberId, SessionError, SurfaceId};
use tracing::debug;

use super::{InsertPosition, MoveDirection, RemoveOutcome, Session, MAX_MEMBERS};
use crate::drag::GridSplit;
use crate::member::Member;
use crate::mode::{LayoutMode, RatioReset, Transition};
use crate::size::{equal_ratios, validated_ratios, RATIO_TOLERANCE};

impl Session {
    // =========================================================================
    // MEMBERSHIP
    // =========================================================================

    /// Add a member and rebalance everyone to equal shares.
    ///
    /// Reaching four members switches the session to grid.
    pub fn insert_member(
        &mut self,
        position: InsertPosition,
        url: impl Into<String>,
    ) -> Result<MemberId, SessionError> {
        let before = self.members.len();
        if before >= MAX_MEMBERS {
            return Err(SessionError::SessionFull(MAX_MEMBERS));
        }
        let index = match position {
            InsertPosition::Head => 0,
            InsertPosition::Tail => before,
            InsertPosition::After(anchor) => {
                self.index_of(anchor).ok_or(SessionError::MemberNotFound(anchor))? + 1
            }
        };

        // Keys are normalized to even numbers, so the odd slot right after
        // the left neighbour is free.
        let order = match index {
            0 => {
                for member in &mut self.members {
                    member.order += 1;
                }
                0
            }
            i => self.members[i - 1].order + 1,
        };
        let id = self.allocate_id();
        self.members.insert(index, Member::new(id, url, 0.0, order));
        self.reorder_normalize();
        self.equalize();
        self.expanded = None;

        if let Some(transition) = Transition::automatic(self.layout, self.last_linear, before, before + 1) {
            self.apply_transition(&transition);
        }
        debug!(member = %id, index, members = before + 1, "member inserted");
        Ok(id)
    }

    /// Drop a member and rebalance the rest to equal shares.
    ///
    /// Dropping below four leaves grid for the last linear mode.
    pub fn remove_member(&mut self, id: MemberId) -> Result<RemoveOutcome, SessionError> {
        let index = self.index_of(id).ok_or(SessionError::MemberNotFound(id))?;
        let before = self.members.len();
        if before <= 1 {
            return Err(SessionError::LastMember);
        }

        self.members.remove(index);
        self.reorder_normalize();
        self.equalize();
        if self.expanded == Some(id) {
            self.expanded = None;
        }
        if self.active == Some(id) {
            let next = index.min(self.members.len() - 1);
            self.active = self.members.get(next).map(|m| m.id);
        }

        let after = self.members.len();
        if let Some(transition) = Transition::automatic(self.layout, self.last_linear, before, after) {
            self.apply_transition(&transition);
        }
        debug!(member = %id, members = after, "member removed");

        Ok(match self.members.as_slice() {
            [survivor] => RemoveOutcome::SingleSurvivor(survivor.id),
            rest => RemoveOutcome::Remaining(rest.len()),
        })
    }

    /// Swap a member with its neighbour. Returns `false` at either edge.
    pub fn move_member(&mut self, id: MemberId, direction: MoveDirection) -> Result<bool, SessionError> {
        let from = self.index_of(id).ok_or(SessionError::MemberNotFound(id))?;
        let to = match direction {
            MoveDirection::Backward => from.checked_sub(1),
            MoveDirection::Forward => Some(from + 1).filter(|i| *i < self.members.len()),
        };
        let Some(to) = to else {
            return Ok(false);
        };

        let from_order = self.members[from].order;
        self.members[from].order = self.members[to].order;
        self.members[to].order = from_order;
        self.members.swap(from, to);
        Ok(true)
    }

    /// Reassign even order keys (0, 2, 4, ...) from visual position.
    pub fn reorder_normalize(&mut self) {
        self.members.sort_by_key(|m| m.order);
        for (i, member) in self.members.iter_mut().enumerate() {
            member.order = i as u32 * 2;
        }
    }

    // =========================================================================
    // CONTENT
    // =========================================================================

    pub fn replace_source(&mut self, id: MemberId, url: impl Into<String>) -> Result<(), SessionError> {
        self.member_mut(id)?.replace_source(url);
        Ok(())
    }

    /// Record where a member has navigated to.
    pub fn report_navigation(&mut self, id: MemberId, url: impl Into<String>) -> Result<(), SessionError> {
        self.member_mut(id)?.navigate(url);
        Ok(())
    }

    pub fn set_title(&mut self, id: MemberId, title: impl Into<String>) -> Result<(), SessionError> {
        self.member_mut(id)?.title = Some(title.into());
        Ok(())
    }

    pub fn bind_surface(&mut self, id: MemberId, surface: Option<SurfaceId>) -> Result<(), SessionError> {
        self.member_mut(id)?.surface = surface;
        Ok(())
    }

    // =========================================================================
    // RATIOS
    // =========================================================================

    /// Set one member's share. Refused when the session is in grid or the
    /// result would no longer sum to 100.
    pub fn set_ratio(&mut self, id: MemberId, ratio: f64) -> bool {
        if self.layout == LayoutMode::Grid || !ratio.is_finite() || ratio <= 0.0 {
            return false;
        }
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let sum = self.ratio_sum() - self.members[index].ratio + ratio;
        if (sum - 100.0).abs() > RATIO_TOLERANCE {
            return false;
        }
        self.members[index].ratio = ratio;
        true
    }

    /// Set the shares of two members at once. Their combined share must
    /// stay where it was.
    pub fn set_pair_ratios(&mut self, first: MemberId, second: MemberId, first_ratio: f64, second_ratio: f64) -> bool {
        if self.layout == LayoutMode::Grid || first == second {
            return false;
        }
        let (Some(a), Some(b)) = (self.index_of(first), self.index_of(second)) else {
            return false;
        };
        if !(first_ratio.is_finite() && second_ratio.is_finite()) || first_ratio <= 0.0 || second_ratio <= 0.0 {
            return false;
        }
        let combined = self.members[a].ratio + self.members[b].ratio;
        if (first_ratio + second_ratio - combined).abs() >= RATIO_TOLERANCE {
            return false;
        }
        self.members[a].ratio = first_ratio;
        self.members[b].ratio = second_ratio;
        true
    }

    /// Replace every share at once. Unusable input rebalances to equal
    /// shares and returns `false`.
    pub fn apply_ratios(&mut self, ratios: &[f64]) -> bool {
        let accepted = validated_ratios(ratios, self.members.len());
        let usable = accepted.as_slice() == ratios;
        for (member, ratio) in self.members.iter_mut().zip(accepted) {
            member.ratio = ratio;
        }
        usable
    }

    pub fn set_grid_split(&mut self, split: GridSplit) {
        self.grid = split.clamped();
    }

    pub(crate) fn equalize(&mut self) {
        let ratios = equal_ratios(self.members.len());
        for (member, ratio) in self.members.iter_mut().zip(ratios) {
            member.ratio = ratio;
        }
    }

    // =========================================================================
    // LAYOUT MODE
    // =========================================================================

    /// Switch mode on request. Returns `false` when already in that mode.
    pub fn set_layout_mode(&mut self, mode: LayoutMode) -> Result<bool, SessionError> {
        match Transition::requested(self.layout, mode, self.members.len())? {
            Some(transition) => {
                self.apply_transition(&transition);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Flip between horizontal and vertical. No-op in grid.
    pub fn toggle_layout(&mut self) -> bool {
        if self.layout == LayoutMode::Grid {
            return false;
        }
        let next = self.layout.toggled();
        self.apply_transition(&Transition::plan(self.layout, next, self.members.len()));
        true
    }

    pub(crate) fn apply_transition(&mut self, transition: &Transition) {
        self.layout = transition.to;
        if transition.to.is_linear() {
            self.last_linear = transition.to;
        }
        if transition.to == LayoutMode::Grid {
            self.grid = GridSplit::default();
        }
        if transition.ratios == RatioReset::Equal {
            self.equalize();
        }
        self.expanded = None;
        debug!(from = %transition.from, to = %transition.to, "layout mode changed");
    }
}
