//! In-memory browser.
//!
//! Keeps tabs and windows in plain maps and records every window update, so
//! engine behaviour can be driven and inspected without a real browser.
//! Used by the engine's tests and by the CLI's dry runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use splitview_common::{GroupId, PlatformError, Rect, TabId, WindowId};
use tokio::sync::Mutex;

use crate::browser::{Browser, NewTab, Result, TabInfo, TabQuery, WindowInfo, WindowKind, WindowState, WindowUpdate};

#[derive(Debug, Clone)]
struct TabRecord {
    url: String,
    group: Option<GroupId>,
    active: bool,
    highlighted: bool,
}

#[derive(Debug, Clone)]
struct WindowRecord {
    bounds: Rect,
    state: WindowState,
    kind: WindowKind,
    /// Tab strip in order. Popups hold exactly one tab.
    tabs: Vec<TabId>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    tabs: BTreeMap<TabId, TabRecord>,
    windows: BTreeMap<WindowId, WindowRecord>,
    updates: Vec<(WindowId, WindowUpdate)>,
    focused: Option<WindowId>,
}

impl State {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn window_of(&self, tab: TabId) -> Option<(WindowId, u32)> {
        self.windows.iter().find_map(|(id, w)| {
            w.tabs
                .iter()
                .position(|t| *t == tab)
                .map(|index| (*id, index as u32))
        })
    }

    fn tab_info(&self, tab: TabId) -> Option<TabInfo> {
        let record = self.tabs.get(&tab)?;
        let (window, index) = self.window_of(tab)?;
        Some(TabInfo {
            id: tab,
            window,
            index,
            group: record.group,
            url: record.url.clone(),
            active: record.active,
            highlighted: record.highlighted,
        })
    }

    fn insert_tab(&mut self, window: WindowId, index: Option<u32>, url: &str, active: bool) -> Result<TabId> {
        let id = TabId(self.allocate());
        let record = self.windows.get_mut(&window).ok_or_else(|| gone(window))?;
        let at = index.map_or(record.tabs.len(), |i| (i as usize).min(record.tabs.len()));
        record.tabs.insert(at, id);
        self.tabs.insert(
            id,
            TabRecord {
                url: url.to_string(),
                group: None,
                active: false,
                highlighted: false,
            },
        );
        if active {
            self.activate(id);
        }
        Ok(id)
    }

    fn activate(&mut self, tab: TabId) {
        let Some((window, _)) = self.window_of(tab) else {
            return;
        };
        let siblings = self.windows.get(&window).map(|w| w.tabs.clone()).unwrap_or_default();
        for sibling in siblings {
            if let Some(record) = self.tabs.get_mut(&sibling) {
                record.active = sibling == tab;
            }
        }
    }
}

fn gone(what: impl std::fmt::Display) -> PlatformError {
    PlatformError::SurfaceGone(what.to_string())
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBrowser {
    state: Arc<Mutex<State>>,
}

impl MemoryBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // SCRIPTING
    // =========================================================================

    pub async fn open_window(&self, bounds: Rect) -> WindowId {
        let mut state = self.state.lock().await;
        let id = WindowId(state.allocate());
        state.windows.insert(
            id,
            WindowRecord {
                bounds,
                state: WindowState::Normal,
                kind: WindowKind::Normal,
                tabs: Vec::new(),
            },
        );
        id
    }

    pub async fn open_tab(&self, window: WindowId, url: &str) -> Result<TabId> {
        self.state.lock().await.insert_tab(window, None, url, false)
    }

    pub async fn set_highlighted(&self, tab: TabId, highlighted: bool) {
        if let Some(record) = self.state.lock().await.tabs.get_mut(&tab) {
            record.highlighted = highlighted;
        }
    }

    pub async fn set_group(&self, tab: TabId, group: Option<GroupId>) {
        if let Some(record) = self.state.lock().await.tabs.get_mut(&tab) {
            record.group = group;
        }
    }

    /// Change a window's bounds the way the user would, without recording
    /// it as an update issued through the trait.
    pub async fn move_window(&self, window: WindowId, bounds: Rect) {
        if let Some(record) = self.state.lock().await.windows.get_mut(&window) {
            record.bounds = bounds;
        }
    }

    /// Close a window the way the user would.
    pub async fn close_window(&self, window: WindowId) {
        let mut state = self.state.lock().await;
        if let Some(record) = state.windows.remove(&window) {
            for tab in record.tabs {
                state.tabs.remove(&tab);
            }
        }
    }

    /// Close a tab the way the user would.
    pub async fn close_tab(&self, tab: TabId) {
        let mut state = self.state.lock().await;
        state.tabs.remove(&tab);
        for record in state.windows.values_mut() {
            record.tabs.retain(|t| *t != tab);
        }
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    pub async fn window(&self, window: WindowId) -> Option<WindowInfo> {
        self.get_window(window).await.ok()
    }

    pub async fn popups(&self) -> Vec<WindowId> {
        let state = self.state.lock().await;
        state
            .windows
            .iter()
            .filter(|(_, w)| w.kind == WindowKind::Popup)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Tabs of a window in strip order.
    pub async fn tabs(&self, window: WindowId) -> Vec<TabInfo> {
        let state = self.state.lock().await;
        let ids = state.windows.get(&window).map(|w| w.tabs.clone()).unwrap_or_default();
        ids.into_iter().filter_map(|t| state.tab_info(t)).collect()
    }

    /// Every update issued through `update_window`, oldest first.
    pub async fn updates(&self) -> Vec<(WindowId, WindowUpdate)> {
        self.state.lock().await.updates.clone()
    }

    pub async fn clear_updates(&self) {
        self.state.lock().await.updates.clear();
    }

    pub async fn focused(&self) -> Option<WindowId> {
        self.state.lock().await.focused
    }
}

#[async_trait]
impl Browser for MemoryBrowser {
    async fn get_tab(&self, tab: TabId) -> Result<TabInfo> {
        self.state.lock().await.tab_info(tab).ok_or_else(|| gone(tab))
    }

    async fn query_tabs(&self, query: TabQuery) -> Result<Vec<TabInfo>> {
        let state = self.state.lock().await;
        let mut tabs: Vec<TabInfo> = state
            .tabs
            .keys()
            .filter_map(|t| state.tab_info(*t))
            .filter(|t| query.matches(t))
            .collect();
        tabs.sort_by_key(|t| (t.window, t.index));
        Ok(tabs)
    }

    async fn create_tab(&self, tab: NewTab) -> Result<TabInfo> {
        let mut state = self.state.lock().await;
        let kind = state.windows.get(&tab.window).map(|w| w.kind);
        if kind != Some(WindowKind::Normal) {
            return Err(gone(tab.window));
        }
        let id = state.insert_tab(tab.window, tab.index, &tab.url, tab.active)?;
        state.tab_info(id).ok_or_else(|| gone(id))
    }

    async fn remove_tab(&self, tab: TabId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.tabs.remove(&tab).ok_or_else(|| gone(tab))?;
        for record in state.windows.values_mut() {
            record.tabs.retain(|t| *t != tab);
        }
        Ok(())
    }

    async fn activate_tab(&self, tab: TabId) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.tabs.contains_key(&tab) {
            return Err(gone(tab));
        }
        state.activate(tab);
        Ok(())
    }

    async fn group_tabs(&self, tabs: &[TabId], group: GroupId) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(missing) = tabs.iter().find(|t| !state.tabs.contains_key(*t)) {
            return Err(gone(*missing));
        }
        for tab in tabs {
            if let Some(record) = state.tabs.get_mut(tab) {
                record.group = Some(group);
            }
        }
        Ok(())
    }

    async fn get_window(&self, window: WindowId) -> Result<WindowInfo> {
        let state = self.state.lock().await;
        let record = state.windows.get(&window).ok_or_else(|| gone(window))?;
        let active_url = record
            .tabs
            .iter()
            .filter_map(|t| state.tabs.get(t))
            .find(|t| t.active || record.kind == WindowKind::Popup)
            .map(|t| t.url.clone());
        Ok(WindowInfo {
            id: window,
            bounds: record.bounds,
            state: record.state,
            kind: record.kind,
            active_url,
        })
    }

    async fn create_popup(&self, url: &str, bounds: Rect) -> Result<WindowId> {
        let mut state = self.state.lock().await;
        let id = WindowId(state.allocate());
        state.windows.insert(
            id,
            WindowRecord {
                bounds,
                state: WindowState::Normal,
                kind: WindowKind::Popup,
                tabs: Vec::new(),
            },
        );
        state.insert_tab(id, None, url, true)?;
        Ok(id)
    }

    async fn navigate_window(&self, window: WindowId, url: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let tabs = state.windows.get(&window).ok_or_else(|| gone(window))?.tabs.clone();
        let target = tabs
            .iter()
            .copied()
            .find(|t| state.tabs.get(t).is_some_and(|r| r.active))
            .or_else(|| tabs.first().copied())
            .ok_or_else(|| gone(window))?;
        if let Some(record) = state.tabs.get_mut(&target) {
            record.url = url.to_string();
        }
        Ok(())
    }

    async fn update_window(&self, window: WindowId, update: WindowUpdate) -> Result<()> {
        let mut state = self.state.lock().await;
        let record = state.windows.get_mut(&window).ok_or_else(|| gone(window))?;
        if let Some(bounds) = update.bounds {
            record.bounds = bounds;
        }
        if let Some(s) = update.state {
            record.state = s;
        }
        if update.focused == Some(true) {
            state.focused = Some(window);
        }
        state.updates.push((window, update));
        Ok(())
    }

    async fn remove_window(&self, window: WindowId) -> Result<()> {
        let mut state = self.state.lock().await;
        let record = state.windows.remove(&window).ok_or_else(|| gone(window))?;
        for tab in record.tabs {
            state.tabs.remove(&tab);
        }
        Ok(())
    }
}
