//! Divider dragging.
//!
//! A drag adjusts exactly the two members on either side of a divider. Their
//! combined share is preserved and neither side goes below `MIN_RATIO`; a
//! frame whose clamped result would break the pair total is dropped rather
//! than applied.

use serde::{Deserialize, Serialize};
use splitview_common::MemberId;
use tracing::trace;

use crate::dividers::{Direction, Divider, DividerKind};
use crate::session::Session;
use crate::size::{DIVIDER_THICKNESS_PX, MAX_GRID_PERCENT, MIN_RATIO, RATIO_TOLERANCE};

// =============================================================================
// GRID SPLIT
// =============================================================================

/// Column and row split of the 2x2 grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSplit {
    /// Width of the left column, in percent.
    pub column_percent: f64,
    /// Height of the top row, in percent.
    pub row_percent: f64,
}

impl Default for GridSplit {
    fn default() -> Self {
        Self {
            column_percent: 50.0,
            row_percent: 50.0,
        }
    }
}

impl GridSplit {
    pub fn clamped(self) -> Self {
        Self {
            column_percent: clamp_grid_percent(self.column_percent),
            row_percent: clamp_grid_percent(self.row_percent),
        }
    }
}

pub fn clamp_grid_percent(percent: f64) -> f64 {
    if percent.is_finite() {
        percent.clamp(MIN_RATIO, MAX_GRID_PERCENT)
    } else {
        50.0
    }
}

// =============================================================================
// PAIR ARITHMETIC
// =============================================================================

/// Convert a pointer movement into a percentage of the space the members
/// share once dividers are taken off.
pub fn delta_percent(pixel_delta: f64, container_px: f64, divider_count: usize, divider_px: f64) -> f64 {
    let effective = (container_px - divider_count as f64 * divider_px).max(1.0);
    pixel_delta / effective * 100.0
}

/// New shares for a pair after moving their divider by `delta` percent.
///
/// Returns `None` when the frame should be skipped: the pair is too small
/// to give both sides the minimum, or clamping would change the total.
pub fn drag_pair(start_first: f64, start_second: f64, delta: f64) -> Option<(f64, f64)> {
    let total = start_first + start_second;
    if !delta.is_finite() || !total.is_finite() || total < 2.0 * MIN_RATIO {
        return None;
    }
    let max = total - MIN_RATIO;
    let first = (start_first + delta).clamp(MIN_RATIO, max);
    let second = (start_second - delta).clamp(MIN_RATIO, max);
    if ((first + second) - total).abs() < RATIO_TOLERANCE {
        Some((first, second))
    } else {
        None
    }
}

// =============================================================================
// DRAG STATE
// =============================================================================

/// An in-progress divider drag. Holds the shares at drag start so every
/// frame is computed from the same origin.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub divider: Divider,
    pub start_pos: f64,
    start: (f64, f64),
    divider_count: usize,
}

impl DragState {
    pub fn begin(session: &Session, divider: Divider, x: f64, y: f64) -> Option<Self> {
        let (start, divider_count) = match divider.kind {
            DividerKind::Between { first, second } => {
                let a = session.member(first)?.ratio;
                let b = session.member(second)?.ratio;
                ((a, b), session.len().saturating_sub(1))
            }
            DividerKind::GridColumn => {
                let p = session.grid().column_percent;
                ((p, 100.0 - p), 1)
            }
            DividerKind::GridRow => {
                let p = session.grid().row_percent;
                ((p, 100.0 - p), 1)
            }
        };
        Some(Self {
            start_pos: divider.axis_coordinate(x, y),
            divider,
            start,
            divider_count,
        })
    }

    /// Apply the pointer position to the session. Returns whether anything
    /// changed.
    pub fn update(&self, session: &mut Session, x: f64, y: f64) -> bool {
        let span = match self.divider.direction {
            Direction::Horizontal => self.divider.bounds.width,
            Direction::Vertical => self.divider.bounds.height,
        };
        let pos = self.divider.axis_coordinate(x, y);
        let delta = delta_percent(pos - self.start_pos, span, self.divider_count, DIVIDER_THICKNESS_PX);

        match self.divider.kind {
            DividerKind::Between { first, second } => {
                let Some((a, b)) = drag_pair(self.start.0, self.start.1, delta) else {
                    trace!(delta, "drag frame skipped");
                    return false;
                };
                session.set_pair_ratios(first, second, a, b)
            }
            DividerKind::GridColumn => {
                let mut grid = session.grid();
                grid.column_percent = clamp_grid_percent(self.start.0 + delta);
                session.set_grid_split(grid);
                true
            }
            DividerKind::GridRow => {
                let mut grid = session.grid();
                grid.row_percent = clamp_grid_percent(self.start.0 + delta);
                session.set_grid_split(grid);
                true
            }
        }
    }

    /// The members whose shares this drag changes.
    pub fn members(&self) -> Option<(MemberId, MemberId)> {
        match self.divider.kind {
            DividerKind::Between { first, second } => Some((first, second)),
            _ => None,
        }
    }
}
