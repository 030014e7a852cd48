use splitview_common::Rect;

use super::compute_size;

/// Where one member sits in the current layout, independent of how the
/// binding renders it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Share of the member's own sizing axis, in percent.
    pub primary_axis_percent: f64,
    /// True when the sizing axis is the height.
    pub vertical: bool,
    pub placement: Placement,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Slot `index` of a single row or column. `leading_percent` is the summed
    /// share of every member before it.
    Linear {
        index: usize,
        dividers: usize,
        leading_percent: f64,
    },
    /// Cell of the 2x2 grid. `column_percent` is the width of the left
    /// column, `row_percent` the height of the top row.
    Grid {
        column: usize,
        row: usize,
        column_percent: f64,
        row_percent: f64,
    },
    /// Expanded to fill the whole container.
    Full,
    /// Not shown while another member is expanded.
    Hidden,
}

impl Geometry {
    pub fn full() -> Self {
        Self {
            primary_axis_percent: 100.0,
            vertical: false,
            placement: Placement::Full,
        }
    }

    pub fn hidden() -> Self {
        Self {
            primary_axis_percent: 0.0,
            vertical: false,
            placement: Placement::Hidden,
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self.placement, Placement::Hidden)
    }

    /// Absolute bounds inside `container`. Returns `None` for hidden members.
    pub fn resolve(&self, container: Rect, divider_px: f64) -> Option<Rect> {
        match self.placement {
            Placement::Hidden => None,
            Placement::Full => Some(container),
            Placement::Linear {
                index,
                dividers,
                leading_percent,
            } => {
                let axis = if self.vertical {
                    container.height
                } else {
                    container.width
                };
                let offset = compute_size(leading_percent, dividers, divider_px, axis)
                    + index as f64 * divider_px;
                let size = compute_size(self.primary_axis_percent, dividers, divider_px, axis);
                Some(if self.vertical {
                    Rect::new(container.x, container.y + offset, container.width, size)
                } else {
                    Rect::new(container.x + offset, container.y, size, container.height)
                })
            }
            Placement::Grid {
                column,
                row,
                column_percent,
                row_percent,
            } => {
                let (x, width) = grid_span(container.x, container.width, column, column_percent, divider_px);
                let (y, height) = grid_span(container.y, container.height, row, row_percent, divider_px);
                Some(Rect::new(x, y, width, height))
            }
        }
    }
}

/// Start and length of cell `slot` (0 or 1) along one grid axis.
fn grid_span(origin: f64, length: f64, slot: usize, first_percent: f64, divider_px: f64) -> (f64, f64) {
    let first = compute_size(first_percent, 1, divider_px, length);
    if slot == 0 {
        (origin, first)
    } else {
        let available = (length - divider_px).max(0.0);
        (origin + first + divider_px, (available - first).max(0.0))
    }
}
