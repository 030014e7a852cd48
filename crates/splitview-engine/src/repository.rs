//! Process-wide store of controller records.
//!
//! Holds the forward map (anchor tab to controller) and the reverse index
//! (popup window to anchor tab). Both are updated together on every
//! insert and removal, so a window lookup never points at a controller that
//! no longer owns it.

use std::collections::HashMap;

use splitview_common::{SessionId, TabId, WindowId};
use tracing::debug;

use crate::controller::Controller;

#[derive(Debug, Default)]
pub struct ControllerRepository {
    controllers: HashMap<TabId, Controller>,
    by_window: HashMap<WindowId, TabId>,
}

impl ControllerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole contents, e.g. after a persistence restore.
    pub fn init(&mut self, controllers: impl IntoIterator<Item = Controller>) {
        self.clear();
        for controller in controllers {
            self.upsert(controller);
        }
    }

    pub fn get(&self, anchor: TabId) -> Option<&Controller> {
        self.controllers.get(&anchor)
    }

    /// Mutable access for changes that keep the set of windows fixed. Adding
    /// or removing windows goes through `take` and `upsert`.
    pub fn get_mut(&mut self, anchor: TabId) -> Option<&mut Controller> {
        self.controllers.get_mut(&anchor)
    }

    pub fn contains(&self, anchor: TabId) -> bool {
        self.controllers.contains_key(&anchor)
    }

    /// Insert or replace a controller and rebuild its window index.
    pub fn upsert(&mut self, controller: Controller) {
        let anchor = controller.anchor_tab;
        self.unindex(anchor);
        for window in controller.windows() {
            self.by_window.insert(window, anchor);
        }
        self.controllers.insert(anchor, controller);
    }

    /// Remove a controller together with its window index entries.
    pub fn take(&mut self, anchor: TabId) -> Option<Controller> {
        self.unindex(anchor);
        self.controllers.remove(&anchor)
    }

    pub fn delete(&mut self, anchor: TabId) -> bool {
        let removed = self.take(anchor).is_some();
        if removed {
            debug!(%anchor, "controller deleted");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.controllers.clear();
        self.by_window.clear();
    }

    pub fn anchor_for_window(&self, window: WindowId) -> Option<TabId> {
        self.by_window.get(&window).copied()
    }

    pub fn find_by_session(&self, session: &SessionId) -> Option<TabId> {
        self.controllers
            .values()
            .find(|c| c.session.id() == session)
            .map(|c| c.anchor_tab)
    }

    /// Anchors of controllers tiled over `window`.
    pub fn anchors_in_window(&self, window: WindowId) -> Vec<TabId> {
        let mut anchors: Vec<TabId> = self
            .controllers
            .values()
            .filter(|c| c.parent_window == window)
            .map(|c| c.anchor_tab)
            .collect();
        anchors.sort();
        anchors
    }

    pub fn anchors(&self) -> Vec<TabId> {
        let mut anchors: Vec<TabId> = self.controllers.keys().copied().collect();
        anchors.sort();
        anchors
    }

    /// Controllers ordered by anchor id.
    pub fn iter(&self) -> impl Iterator<Item = &Controller> {
        let mut all: Vec<&Controller> = self.controllers.values().collect();
        all.sort_by_key(|c| c.anchor_tab);
        all.into_iter()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    fn unindex(&mut self, anchor: TabId) {
        self.by_window.retain(|_, owner| *owner != anchor);
    }
}
