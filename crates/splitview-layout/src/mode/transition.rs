//! Mode state machine over (mode, member count).
//!
//! Transitions are pure values; `Session` applies them. Grid is entered
//! automatically when an insert brings the session to four members and left
//! automatically, back to the last linear mode, when a removal drops it
//! below four.

use splitview_common::SessionError;

use super::LayoutMode;

/// Member count the grid layout needs.
pub const GRID_MEMBER_COUNT: usize = 4;

/// Divider arrangement for a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DividerTopology {
    /// One divider between each adjacent pair.
    Linear(usize),
    /// One column divider and one row divider.
    Cross,
}

impl DividerTopology {
    pub fn for_mode(mode: LayoutMode, members: usize) -> Self {
        match mode {
            LayoutMode::Grid => DividerTopology::Cross,
            _ => DividerTopology::Linear(members.saturating_sub(1)),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            DividerTopology::Linear(n) => *n,
            DividerTopology::Cross => 2,
        }
    }
}

/// What happens to per-member ratios across a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioReset {
    Keep,
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: LayoutMode,
    pub to: LayoutMode,
    pub ratios: RatioReset,
    pub dividers: DividerTopology,
}

impl Transition {
    pub fn plan(from: LayoutMode, to: LayoutMode, members: usize) -> Self {
        let ratios = if from.is_linear() && to.is_linear() {
            RatioReset::Keep
        } else {
            RatioReset::Equal
        };
        Self {
            from,
            to,
            ratios,
            dividers: DividerTopology::for_mode(to, members),
        }
    }

    /// A mode change asked for by the user. `Ok(None)` when already there.
    pub fn requested(
        from: LayoutMode,
        to: LayoutMode,
        members: usize,
    ) -> Result<Option<Self>, SessionError> {
        if to == LayoutMode::Grid && members != GRID_MEMBER_COUNT {
            return Err(SessionError::GridRequiresFourMembers(members));
        }
        if from == to {
            return Ok(None);
        }
        Ok(Some(Self::plan(from, to, members)))
    }

    /// The transition forced by a member count change, if any.
    pub fn automatic(
        from: LayoutMode,
        last_linear: LayoutMode,
        before: usize,
        after: usize,
    ) -> Option<Self> {
        if after == GRID_MEMBER_COUNT && before < GRID_MEMBER_COUNT && from != LayoutMode::Grid {
            Some(Self::plan(from, LayoutMode::Grid, after))
        } else if after < GRID_MEMBER_COUNT && from == LayoutMode::Grid {
            Some(Self::plan(from, last_linear, after))
        } else {
            None
        }
    }
}
