//! Layout modes and the transitions between them.

mod plan;
mod transition;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use plan::{layout_plan, LayoutPlan};
pub use transition::{DividerTopology, RatioReset, Transition, GRID_MEMBER_COUNT};

/// How the members of a session are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Side by side.
    #[default]
    Horizontal,
    /// Stacked top to bottom.
    Vertical,
    /// 2x2, only with exactly four members.
    Grid,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Horizontal => "horizontal",
            LayoutMode::Vertical => "vertical",
            LayoutMode::Grid => "grid",
        }
    }

    pub fn is_linear(&self) -> bool {
        !matches!(self, LayoutMode::Grid)
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, LayoutMode::Vertical)
    }

    /// Horizontal and vertical swap; grid stays grid.
    pub fn toggled(&self) -> LayoutMode {
        match self {
            LayoutMode::Horizontal => LayoutMode::Vertical,
            LayoutMode::Vertical => LayoutMode::Horizontal,
            LayoutMode::Grid => LayoutMode::Grid,
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(LayoutMode::Horizontal),
            "vertical" => Ok(LayoutMode::Vertical),
            "grid" => Ok(LayoutMode::Grid),
            other => Err(format!("unknown layout mode: {other}")),
        }
    }
}
