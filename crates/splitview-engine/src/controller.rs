use std::collections::BTreeMap;

use splitview_common::{GroupId, MemberId, SurfaceId, TabId, WindowId};
use splitview_layout::Session;

use crate::browser::TabInfo;

/// Binds one session to its anchor tab and the popup windows showing its
/// members.
#[derive(Debug, Clone, PartialEq)]
pub struct Controller {
    pub anchor_tab: TabId,
    /// The browser window holding the anchor tab. Popups tile over it.
    pub parent_window: WindowId,
    /// Last known position of the anchor tab in its strip.
    pub anchor_index: u32,
    pub group: Option<GroupId>,
    pub session: Session,
}

impl Controller {
    pub fn new(anchor: &TabInfo, mut session: Session) -> Self {
        session.set_anchor(Some(SurfaceId(anchor.id.0)));
        Self {
            anchor_tab: anchor.id,
            parent_window: anchor.window,
            anchor_index: anchor.index,
            group: anchor.group,
            session,
        }
    }

    /// Popup windows in member order.
    pub fn windows(&self) -> Vec<WindowId> {
        self.session
            .surfaces()
            .into_iter()
            .map(|(_, surface)| WindowId::from(surface))
            .collect()
    }

    pub fn member_for_window(&self, window: WindowId) -> Option<MemberId> {
        self.session.member_by_surface(SurfaceId::from(window))
    }

    /// Member shares as fractions of the parent width, keyed by window.
    pub fn width_ratios(&self) -> BTreeMap<WindowId, f64> {
        self.session
            .members()
            .iter()
            .filter_map(|m| m.surface.map(|s| (WindowId::from(s), m.ratio / 100.0)))
            .collect()
    }

    /// Take the anchor's current index, group and window from a fresh read.
    /// Returns whether anything changed.
    pub fn refresh_from(&mut self, tab: &TabInfo) -> bool {
        let before = (self.anchor_index, self.group, self.parent_window);
        self.anchor_index = tab.index;
        self.group = tab.group;
        self.parent_window = tab.window;
        before != (self.anchor_index, self.group, self.parent_window)
    }
}
