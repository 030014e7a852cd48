//! Browser event rules.

use splitview_common::{Event, SessionError, TabId, WindowId};
use splitview_layout::{GridSplit, LayoutMode, MemberLifecycle, RemoveOutcome};
use tracing::{debug, trace, warn};

use super::ReconcileEngine;
use crate::browser::{BrowserEvent, TabQuery, WindowUpdate};
use crate::controller::Controller;
use crate::debounce::PendingWork;
use crate::popup::tile_area;
use crate::resize::redistribute;

impl ReconcileEngine {
    pub async fn handle_event(&mut self, event: BrowserEvent) {
        trace!(?event, "browser event");
        match event {
            BrowserEvent::TabActivated { tab, window } => self.on_tab_activated(tab, window).await,
            BrowserEvent::TabRemoved { tab } => {
                self.restore_anchor(tab).await;
            }
            BrowserEvent::TabUpdated { tab } => self.on_tab_updated(tab).await,
            BrowserEvent::WindowFocusChanged { window } => self.on_focus_changed(window).await,
            BrowserEvent::WindowBoundsChanged { window, .. } => self.on_bounds_changed(window),
            BrowserEvent::WindowRemoved { window } => self.on_window_removed(window).await,
            BrowserEvent::MemberNavigated { window, url } => self.on_member_navigated(window, &url).await,
        }
    }

    async fn on_tab_activated(&mut self, tab: TabId, window: WindowId) {
        if self.repo.contains(tab) {
            self.refresh_anchor(tab).await;
            self.show_only(tab).await;
            return;
        }
        for anchor in self.repo.anchors_in_window(window) {
            self.hide(anchor).await;
        }
    }

    async fn on_tab_updated(&mut self, tab: TabId) {
        if !self.repo.contains(tab) {
            return;
        }
        let parent = self.repo.get(tab).map(|c| c.parent_window);
        if !self.refresh_anchor(tab).await {
            return;
        }
        let moved = parent != self.repo.get(tab).map(|c| c.parent_window);
        if moved && self.visible.contains(&tab) {
            debug!(anchor = %tab, "anchor moved to another window, retiling");
            self.retile(tab).await;
        }
        self.persist().await;
    }

    async fn on_focus_changed(&mut self, window: Option<WindowId>) {
        let previous = std::mem::replace(&mut self.last_focused, window);
        let Some(window) = window else {
            self.hide_all().await;
            return;
        };

        if let Some(anchor) = self.repo.anchor_for_window(window) {
            let from_same_session = previous.and_then(|w| self.repo.anchor_for_window(w)) == Some(anchor);
            if from_same_session {
                return;
            }
            debug!(%anchor, %window, "focus entered a split, bringing it forward");
            self.activate_anchor(anchor).await;
            self.show_only(anchor).await;
            // Tiling focuses every popup in turn; hand focus back to the one
            // the user picked.
            let refocus = WindowUpdate {
                focused: Some(true),
                ..Default::default()
            };
            if let Err(e) = self.browser.update_window(window, refocus).await {
                debug!(%window, error = %e, "could not refocus popup");
            }
            return;
        }

        let active = self
            .browser
            .query_tabs(TabQuery {
                window: Some(window),
                active: Some(true),
                ..Default::default()
            })
            .await;
        match active.ok().and_then(|tabs| tabs.into_iter().next()) {
            Some(tab) if self.repo.contains(tab.id) => self.show_only(tab.id).await,
            _ => {
                for anchor in self.repo.anchors_in_window(window) {
                    self.hide(anchor).await;
                }
            }
        }
    }

    fn on_bounds_changed(&mut self, window: WindowId) {
        if self.guard.is_self_move(window) {
            trace!(%window, "ignoring bounds change caused by tiling");
            return;
        }
        if let Some(anchor) = self.repo.anchor_for_window(window) {
            self.debounce.schedule(window, PendingWork::MemberResized { anchor, window });
            return;
        }
        let anchors = self.repo.anchors_in_window(window);
        if anchors.iter().any(|a| self.visible.contains(a)) {
            self.debounce.schedule(window, PendingWork::Retile(window));
        }
    }

    async fn on_window_removed(&mut self, window: WindowId) {
        self.guard.clear(window);
        self.debounce.cancel(window);
        if self.last_focused == Some(window) {
            self.last_focused = None;
        }
        let Some(anchor) = self.repo.anchor_for_window(window) else {
            return;
        };
        let Some(mut controller) = self.repo.take(anchor) else {
            return;
        };
        let Some(member) = controller.member_for_window(window) else {
            self.repo.upsert(controller);
            return;
        };

        let result = {
            let mut binding = self.popup_binding(&controller);
            MemberLifecycle::new(&mut controller.session, &mut binding)
                .surface_closed(member)
                .await
        };
        let session = controller.session.id().clone();
        match result {
            Ok(RemoveOutcome::Remaining(remaining)) => {
                debug!(%session, %member, remaining, "popup closed by user");
                self.repo.upsert(controller);
                self.publish(Event::MemberRemoved { session, member });
                self.persist().await;
            }
            Ok(RemoveOutcome::SingleSurvivor(survivor)) => {
                self.publish(Event::MemberRemoved { session, member });
                self.fold_survivor(controller, survivor).await;
            }
            Err(SessionError::LastMember) => self.close_orphan(controller).await,
            Err(e) => {
                warn!(%session, error = %e, "could not drop closed popup");
                self.repo.upsert(controller);
            }
        }
    }

    async fn on_member_navigated(&mut self, window: WindowId, url: &str) {
        let Some(anchor) = self.repo.anchor_for_window(window) else {
            return;
        };
        let Some(controller) = self.repo.get_mut(anchor) else {
            return;
        };
        let Some(member) = controller.member_for_window(window) else {
            return;
        };
        if controller.session.report_navigation(member, url).is_ok() {
            self.persist().await;
        }
    }

    // =========================================================================
    // DEBOUNCED WORK
    // =========================================================================

    /// Run every piece of debounced work whose quiet period has elapsed.
    pub async fn run_due(&mut self) -> usize {
        let due = self.debounce.take_due();
        let count = due.len();
        for work in due {
            match work {
                PendingWork::Retile(parent) => {
                    for anchor in self.repo.anchors_in_window(parent) {
                        if self.visible.contains(&anchor) {
                            self.retile(anchor).await;
                        }
                    }
                }
                PendingWork::MemberResized { anchor, window } => self.member_resized(anchor, window).await,
            }
        }
        self.guard.prune();
        if count > 0 {
            self.persist().await;
        }
        count
    }

    /// The user resized one popup directly. Keep its new size and fit the
    /// siblings around it.
    async fn member_resized(&mut self, anchor: TabId, window: WindowId) {
        let Some(mut controller) = self.repo.take(anchor) else {
            return;
        };
        if let Err(e) = self.adopt_popup_bounds(&mut controller, window).await {
            debug!(%anchor, %window, error = %e, "ignoring popup resize");
        }
        {
            let mut binding = self.popup_binding(&controller);
            MemberLifecycle::new(&mut controller.session, &mut binding)
                .relayout()
                .await;
        }
        self.repo.upsert(controller);
    }

    async fn adopt_popup_bounds(
        &self,
        controller: &mut Controller,
        window: WindowId,
    ) -> Result<(), splitview_common::PlatformError> {
        let session = &mut controller.session;
        if session.expanded().is_some() {
            return Ok(());
        }
        let Some(member) = session.member_by_surface(window.into()) else {
            return Ok(());
        };
        let Some(index) = session.members().iter().position(|m| m.id == member) else {
            return Ok(());
        };
        let parent = self.browser.get_window(controller.parent_window).await?;
        let popup = self.browser.get_window(window).await?;
        let area = tile_area(parent.bounds, &self.config.popup);
        if area.width <= 0.0 || area.height <= 0.0 {
            return Ok(());
        }

        match session.layout() {
            LayoutMode::Grid => {
                let width = popup.bounds.width / area.width * 100.0;
                let height = popup.bounds.height / area.height * 100.0;
                let (column, row) = (index / 2, index % 2);
                session.set_grid_split(GridSplit {
                    column_percent: if column == 0 { width } else { 100.0 - width },
                    row_percent: if row == 0 { height } else { 100.0 - height },
                });
            }
            mode => {
                let (start, size) = if mode.is_vertical() {
                    (
                        (popup.bounds.y - area.y) / area.height * 100.0,
                        popup.bounds.height / area.height * 100.0,
                    )
                } else {
                    (
                        (popup.bounds.x - area.x) / area.width * 100.0,
                        popup.bounds.width / area.width * 100.0,
                    )
                };
                if let Some(ratios) = redistribute(&session.ratios(), index, start, size) {
                    session.apply_ratios(&ratios);
                }
            }
        }
        Ok(())
    }
}
