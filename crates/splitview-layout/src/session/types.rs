use serde::{Deserialize, Serialize};
use splitview_common::{MemberId, SessionError, SessionId, SurfaceId};

use crate::drag::GridSplit;
use crate::member::Member;
use crate::mode::LayoutMode;
use crate::size::{equal_ratios, ratio_sum, validated_ratios};

/// Fewest sources a new split can start from.
pub const MIN_SOURCES: usize = 2;

/// Most members a session can hold.
pub const MAX_MEMBERS: usize = 4;

// =============================================================================
// TYPES
// =============================================================================

/// Where a new member goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "at", content = "member")]
pub enum InsertPosition {
    Head,
    Tail,
    After(MemberId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Backward,
    Forward,
}

impl MoveDirection {
    /// Map a signed step (-1 or +1) onto a direction.
    pub fn from_offset(offset: i32) -> Option<Self> {
        match offset {
            -1 => Some(MoveDirection::Backward),
            1 => Some(MoveDirection::Forward),
            _ => None,
        }
    }
}

/// Result of removing a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The session still holds this many members.
    Remaining(usize),
    /// Only one member is left. The owner should tear the session down and
    /// restore this member as a regular tab.
    SingleSurvivor(MemberId),
}

/// One active split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) members: Vec<Member>,
    pub(crate) layout: LayoutMode,
    /// Linear mode to fall back to when grid is left.
    pub(crate) last_linear: LayoutMode,
    pub(crate) grid: GridSplit,
    /// The surface that stands in for the whole split (the anchor tab).
    pub(crate) anchor: Option<SurfaceId>,
    pub(crate) active: Option<MemberId>,
    pub(crate) expanded: Option<MemberId>,
    pub(crate) next_member_id: u32,
}

// =============================================================================
// CONSTRUCTION
// =============================================================================

impl Session {
    /// Start a split from 2 to 4 sources with equal ratios.
    ///
    /// Without a hint, four sources open as a grid and fewer as a horizontal
    /// row. A grid hint is ignored unless there are exactly four sources.
    pub fn create(sources: &[String], hint: Option<LayoutMode>) -> Result<Self, SessionError> {
        let n = sources.len();
        if !(MIN_SOURCES..=MAX_MEMBERS).contains(&n) {
            return Err(SessionError::InvalidSourceCount(n));
        }
        let layout = match hint {
            Some(LayoutMode::Grid) | None if n == MAX_MEMBERS => LayoutMode::Grid,
            Some(LayoutMode::Grid) | None => LayoutMode::Horizontal,
            Some(mode) => mode,
        };
        Ok(Self::build(SessionId::new(), sources, &equal_ratios(n), layout))
    }

    /// Rebuild a session from stored state. Accepts a single member, since a
    /// restored split may have lost the rest. Unusable ratios fall back to
    /// equal shares and a grid with the wrong member count becomes
    /// horizontal.
    pub fn rebuild(
        id: SessionId,
        urls: &[String],
        ratios: &[f64],
        layout: LayoutMode,
    ) -> Result<Self, SessionError> {
        let n = urls.len();
        if !(1..=MAX_MEMBERS).contains(&n) {
            return Err(SessionError::InvalidSourceCount(n));
        }
        let layout = if layout == LayoutMode::Grid && n != MAX_MEMBERS {
            LayoutMode::Horizontal
        } else {
            layout
        };
        let ratios = if layout == LayoutMode::Grid {
            equal_ratios(n)
        } else {
            validated_ratios(ratios, n)
        };
        Ok(Self::build(id, urls, &ratios, layout))
    }

    fn build(id: SessionId, urls: &[String], ratios: &[f64], layout: LayoutMode) -> Self {
        let members: Vec<Member> = urls
            .iter()
            .zip(ratios)
            .enumerate()
            .map(|(i, (url, ratio))| Member::new(MemberId(i as u32 + 1), url.clone(), *ratio, i as u32 * 2))
            .collect();
        let active = members.first().map(|m| m.id);
        Self {
            id,
            next_member_id: members.len() as u32 + 1,
            members,
            layout,
            last_linear: if layout.is_linear() {
                layout
            } else {
                LayoutMode::Horizontal
            },
            grid: GridSplit::default(),
            anchor: None,
            active,
            expanded: None,
        }
    }
}

// =============================================================================
// ACCESSORS
// =============================================================================

impl Session {
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Members in visual order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: MemberId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn last_linear(&self) -> LayoutMode {
        self.last_linear
    }

    /// Set the linear mode a grid falls back to. Grid itself is refused.
    pub fn set_last_linear(&mut self, mode: LayoutMode) -> bool {
        if !mode.is_linear() {
            return false;
        }
        self.last_linear = mode;
        true
    }

    pub fn grid(&self) -> GridSplit {
        self.grid
    }

    pub fn anchor(&self) -> Option<SurfaceId> {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Option<SurfaceId>) {
        self.anchor = anchor;
    }

    pub fn ratios(&self) -> Vec<f64> {
        self.members.iter().map(|m| m.ratio).collect()
    }

    pub fn ratio_sum(&self) -> f64 {
        ratio_sum(&self.ratios())
    }

    /// Live URL of every member where known, source URL otherwise.
    pub fn current_urls(&self) -> Vec<String> {
        self.members.iter().map(|m| m.current_url().to_string()).collect()
    }

    pub fn member_by_surface(&self, surface: SurfaceId) -> Option<MemberId> {
        self.members
            .iter()
            .find(|m| m.surface == Some(surface))
            .map(|m| m.id)
    }

    /// Member ids with their bound surfaces, in visual order.
    pub fn surfaces(&self) -> Vec<(MemberId, SurfaceId)> {
        self.members
            .iter()
            .filter_map(|m| m.surface.map(|s| (m.id, s)))
            .collect()
    }

    pub(crate) fn index_of(&self, id: MemberId) -> Option<usize> {
        self.members.iter().position(|m| m.id == id)
    }

    pub(crate) fn member_mut(&mut self, id: MemberId) -> Result<&mut Member, SessionError> {
        self.members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(SessionError::MemberNotFound(id))
    }

    pub(crate) fn allocate_id(&mut self) -> MemberId {
        let id = MemberId(self.next_member_id);
        self.next_member_id += 1;
        id
    }
}
