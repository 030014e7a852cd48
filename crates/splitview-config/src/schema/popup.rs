//! Popup window tiling configuration.

use serde::{Deserialize, Serialize};

/// How popups of sessions that are not in front get out of the way.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum HideStrategy {
    /// Leave them where they are; the browser window covers them.
    #[default]
    Cover,
    /// Minimize them.
    Minimize,
}

/// Geometry used when tiling popup windows over their parent window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    /// Space kept free at the top of the parent window for its tab strip and
    /// address bar, in pixels (valid range: 0-200).
    pub inset_top: u32,
    /// Margin on the left, right and bottom edges in pixels (valid range: 0-100).
    pub margin: u32,
    /// Gap between neighbouring popups in pixels (valid range: 0-40).
    pub gap: u32,
    /// Smallest height a popup is tiled to in pixels (valid range: 50-1000).
    pub min_height: u32,
    pub hide_strategy: HideStrategy,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            inset_top: 40,
            margin: 0,
            gap: 0,
            min_height: 100,
            hide_strategy: HideStrategy::Cover,
        }
    }
}
