use splitview_common::MemberId;

use super::{DividerTopology, LayoutMode};
use crate::session::Session;
use crate::size::{Geometry, Placement};

/// Geometry for every member of a session, in visual order.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub mode: LayoutMode,
    pub dividers: DividerTopology,
    pub panes: Vec<(MemberId, Geometry)>,
}

impl LayoutPlan {
    pub fn geometry(&self, member: MemberId) -> Option<Geometry> {
        self.panes
            .iter()
            .find(|(id, _)| *id == member)
            .map(|(_, geometry)| *geometry)
    }
}

/// Derive the current arrangement from the session store.
pub fn layout_plan(session: &Session) -> LayoutPlan {
    let mode = session.layout();
    let members = session.members();

    if let Some(expanded) = session.expanded() {
        let panes = members
            .iter()
            .map(|m| {
                let geometry = if m.id == expanded {
                    Geometry::full()
                } else {
                    Geometry::hidden()
                };
                (m.id, geometry)
            })
            .collect();
        return LayoutPlan {
            mode,
            dividers: DividerTopology::Linear(0),
            panes,
        };
    }

    let dividers = DividerTopology::for_mode(mode, members.len());
    let panes = match mode {
        LayoutMode::Grid => {
            let grid = session.grid();
            members
                .iter()
                .enumerate()
                .map(|(index, m)| {
                    let column = index / 2;
                    let row = index % 2;
                    let row_share = if row == 0 {
                        grid.row_percent
                    } else {
                        100.0 - grid.row_percent
                    };
                    let geometry = Geometry {
                        primary_axis_percent: row_share,
                        vertical: true,
                        placement: Placement::Grid {
                            column,
                            row,
                            column_percent: grid.column_percent,
                            row_percent: grid.row_percent,
                        },
                    };
                    (m.id, geometry)
                })
                .collect()
        }
        LayoutMode::Horizontal | LayoutMode::Vertical => {
            let mut leading = 0.0;
            members
                .iter()
                .enumerate()
                .map(|(index, m)| {
                    let geometry = Geometry {
                        primary_axis_percent: m.ratio,
                        vertical: mode.is_vertical(),
                        placement: Placement::Linear {
                            index,
                            dividers: dividers.count(),
                            leading_percent: leading,
                        },
                    };
                    leading += m.ratio;
                    (m.id, geometry)
                })
                .collect()
        }
    };

    LayoutPlan {
        mode,
        dividers,
        panes,
    }
}
