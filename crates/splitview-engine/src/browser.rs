//! The browser's tab and window subsystem, as the engine sees it.
//!
//! Every call is an independent asynchronous operation that may fail, most
//! commonly with `PlatformError::SurfaceGone` when the tab or window was
//! closed in the meantime.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use splitview_common::{GroupId, PlatformError, Rect, TabId, WindowId};

pub type Result<T> = std::result::Result<T, PlatformError>;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: TabId,
    pub window: WindowId,
    pub index: u32,
    /// `None` when the tab is not in a group.
    pub group: Option<GroupId>,
    pub url: String,
    pub active: bool,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
    Fullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Normal,
    Popup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub id: WindowId,
    pub bounds: Rect,
    pub state: WindowState,
    pub kind: WindowKind,
    /// URL of the window's active tab, when it has one.
    pub active_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowUpdate {
    pub bounds: Option<Rect>,
    pub state: Option<WindowState>,
    pub focused: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTab {
    pub window: WindowId,
    /// Position in the tab strip; appended when `None`.
    pub index: Option<u32>,
    pub url: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TabQuery {
    pub window: Option<WindowId>,
    pub active: Option<bool>,
    pub highlighted: Option<bool>,
}

impl TabQuery {
    pub fn matches(&self, tab: &TabInfo) -> bool {
        self.window.map_or(true, |w| w == tab.window)
            && self.active.map_or(true, |a| a == tab.active)
            && self.highlighted.map_or(true, |h| h == tab.highlighted)
    }
}

/// Lifecycle notifications delivered by the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BrowserEvent {
    TabActivated { tab: TabId, window: WindowId },
    TabRemoved { tab: TabId },
    /// The tab moved, changed group, or was attached to or detached from a
    /// window.
    TabUpdated { tab: TabId },
    /// `None` when no browser window has focus.
    WindowFocusChanged { window: Option<WindowId> },
    WindowBoundsChanged { window: WindowId, bounds: Rect },
    WindowRemoved { window: WindowId },
    /// Content inside a popup navigated.
    MemberNavigated { window: WindowId, url: String },
}

// =============================================================================
// TRAIT
// =============================================================================

#[async_trait]
pub trait Browser: Send + Sync {
    async fn get_tab(&self, tab: TabId) -> Result<TabInfo>;

    async fn query_tabs(&self, query: TabQuery) -> Result<Vec<TabInfo>>;

    async fn create_tab(&self, tab: NewTab) -> Result<TabInfo>;

    async fn remove_tab(&self, tab: TabId) -> Result<()>;

    async fn activate_tab(&self, tab: TabId) -> Result<()>;

    async fn group_tabs(&self, tabs: &[TabId], group: GroupId) -> Result<()>;

    async fn get_window(&self, window: WindowId) -> Result<WindowInfo>;

    async fn create_popup(&self, url: &str, bounds: Rect) -> Result<WindowId>;

    async fn navigate_window(&self, window: WindowId, url: &str) -> Result<()>;

    async fn update_window(&self, window: WindowId, update: WindowUpdate) -> Result<()>;

    async fn remove_window(&self, window: WindowId) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(window: u64, active: bool, highlighted: bool) -> TabInfo {
        TabInfo {
            id: TabId(1),
            window: WindowId(window),
            index: 0,
            group: None,
            url: "https://a.example".into(),
            active,
            highlighted,
        }
    }

    #[test]
    fn query_filters_are_conjunctive() {
        let q = TabQuery {
            window: Some(WindowId(1)),
            highlighted: Some(true),
            ..Default::default()
        };
        assert!(q.matches(&tab(1, false, true)));
        assert!(!q.matches(&tab(2, false, true)));
        assert!(!q.matches(&tab(1, true, false)));
        assert!(TabQuery::default().matches(&tab(9, true, true)));
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let ev: BrowserEvent =
            serde_json::from_str(r#"{"type":"window-focus-changed","window":null}"#).unwrap();
        assert_eq!(ev, BrowserEvent::WindowFocusChanged { window: None });
        let ev: BrowserEvent = serde_json::from_str(r#"{"type":"tab-removed","tab":7}"#).unwrap();
        assert_eq!(ev, BrowserEvent::TabRemoved { tab: TabId(7) });
    }
}
