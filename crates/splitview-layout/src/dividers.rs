//! Divider placement for drag hit testing.
//!
//! Produces one `Divider` per draggable boundary in the current layout.
//! Linear layouts get one between every adjacent pair; grid gets a single
//! column divider and a single row divider shared by both columns.

use serde::{Deserialize, Serialize};
use splitview_common::{MemberId, Rect};

use crate::mode::{layout_plan, LayoutMode};
use crate::session::Session;
use crate::size::compute_size;

// =============================================================================
// TYPES
// =============================================================================

/// Arrangement across a divider. Horizontal means the members sit side by
/// side, so the divider itself is a vertical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DividerKind {
    Between { first: MemberId, second: MemberId },
    GridColumn,
    GridRow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Divider {
    pub kind: DividerKind,
    pub direction: Direction,
    /// Odd order key sitting between the two members' even keys. Grid
    /// dividers have none.
    pub order: Option<u32>,
    /// Center line in pixels (x for horizontal, y for vertical).
    pub position: f64,
    pub start: f64,
    pub end: f64,
    /// The container the divider splits.
    pub bounds: Rect,
}

impl Divider {
    /// Half-width of the hit zone on each side of the divider.
    const HIT_HALF_WIDTH: f64 = 6.0;

    pub fn hit_test(&self, x: f64, y: f64) -> bool {
        match self.direction {
            Direction::Horizontal => {
                (x - self.position).abs() <= Self::HIT_HALF_WIDTH && y >= self.start && y <= self.end
            }
            Direction::Vertical => {
                (y - self.position).abs() <= Self::HIT_HALF_WIDTH && x >= self.start && x <= self.end
            }
        }
    }

    /// The pointer coordinate that moves this divider.
    pub fn axis_coordinate(&self, x: f64, y: f64) -> f64 {
        match self.direction {
            Direction::Horizontal => x,
            Direction::Vertical => y,
        }
    }
}

// =============================================================================
// COMPUTATION
// =============================================================================

pub fn compute_dividers(session: &Session, container: Rect, divider_px: f64) -> Vec<Divider> {
    if session.expanded().is_some() {
        return Vec::new();
    }

    match session.layout() {
        LayoutMode::Grid => grid_dividers(session, container, divider_px),
        mode => {
            let direction = if mode.is_vertical() {
                Direction::Vertical
            } else {
                Direction::Horizontal
            };
            let plan = layout_plan(session);
            plan.panes
                .windows(2)
                .filter_map(|pair| {
                    let (first, geometry) = pair[0];
                    let (second, _) = pair[1];
                    let rect = geometry.resolve(container, divider_px)?;
                    let order = session.member(first).map(|m| m.order + 1);
                    let (position, start, end) = match direction {
                        Direction::Horizontal => {
                            (rect.right() + divider_px / 2.0, container.y, container.bottom())
                        }
                        Direction::Vertical => {
                            (rect.bottom() + divider_px / 2.0, container.x, container.right())
                        }
                    };
                    Some(Divider {
                        kind: DividerKind::Between { first, second },
                        direction,
                        order,
                        position,
                        start,
                        end,
                        bounds: container,
                    })
                })
                .collect()
        }
    }
}

fn grid_dividers(session: &Session, container: Rect, divider_px: f64) -> Vec<Divider> {
    let grid = session.grid();
    let left = compute_size(grid.column_percent, 1, divider_px, container.width);
    let top = compute_size(grid.row_percent, 1, divider_px, container.height);
    vec![
        Divider {
            kind: DividerKind::GridColumn,
            direction: Direction::Horizontal,
            order: None,
            position: container.x + left + divider_px / 2.0,
            start: container.y,
            end: container.bottom(),
            bounds: container,
        },
        Divider {
            kind: DividerKind::GridRow,
            direction: Direction::Vertical,
            order: None,
            position: container.y + top + divider_px / 2.0,
            start: container.x,
            end: container.right(),
            bounds: container,
        },
    ]
}

/// The divider under the pointer, if any.
pub fn divider_at(dividers: &[Divider], x: f64, y: f64) -> Option<&Divider> {
    dividers.iter().find(|d| d.hit_test(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::DIVIDER_THICKNESS_PX;

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://{i}.example")).collect()
    }

    fn container() -> Rect {
        Rect::new(0.0, 0.0, 1004.0, 600.0)
    }

    #[test]
    fn two_members_one_divider() {
        let session = Session::create(&urls(2), None).unwrap();
        let dividers = compute_dividers(&session, container(), DIVIDER_THICKNESS_PX);
        assert_eq!(dividers.len(), 1);
        let d = &dividers[0];
        assert_eq!(d.direction, Direction::Horizontal);
        assert!((d.position - 502.0).abs() < 1e-9);
        assert_eq!(d.order, Some(1));
    }

    #[test]
    fn three_members_two_dividers_on_odd_keys() {
        let session = Session::create(&urls(3), Some(LayoutMode::Vertical)).unwrap();
        let dividers = compute_dividers(&session, container(), DIVIDER_THICKNESS_PX);
        assert_eq!(dividers.len(), 2);
        assert!(dividers.iter().all(|d| d.direction == Direction::Vertical));
        assert_eq!(dividers[0].order, Some(1));
        assert_eq!(dividers[1].order, Some(3));
    }

    #[test]
    fn grid_has_cross() {
        let session = Session::create(&urls(4), None).unwrap();
        let dividers = compute_dividers(&session, container(), DIVIDER_THICKNESS_PX);
        assert_eq!(dividers.len(), 2);
        assert_eq!(dividers[0].kind, DividerKind::GridColumn);
        assert_eq!(dividers[1].kind, DividerKind::GridRow);
    }

    #[test]
    fn hit_test_within_zone() {
        let session = Session::create(&urls(2), None).unwrap();
        let dividers = compute_dividers(&session, container(), DIVIDER_THICKNESS_PX);
        assert!(divider_at(&dividers, 505.0, 100.0).is_some());
        assert!(divider_at(&dividers, 520.0, 100.0).is_none());
        assert!(divider_at(&dividers, 502.0, 700.0).is_none());
    }

    #[test]
    fn expanded_session_has_no_dividers() {
        let mut session = Session::create(&urls(3), None).unwrap();
        let id = session.members()[1].id;
        session.toggle_expand(id);
        assert!(compute_dividers(&session, container(), DIVIDER_THICKNESS_PX).is_empty());
    }
}
