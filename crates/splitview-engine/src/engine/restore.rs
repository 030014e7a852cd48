//! Tearing splits down into normal tabs, and bringing controllers back
//! after a restart.

use std::collections::HashSet;

use splitview_common::{Event, MemberId, SessionId, SurfaceId, TabId, WindowId};
use splitview_layout::Session;
use tracing::{debug, info, warn};

use super::{ReconcileEngine, ANCHOR_URL};
use crate::browser::NewTab;
use crate::controller::Controller;
use crate::persistence::PersistedController;

/// Outcome of turning a split back into tabs.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreReport {
    pub session: SessionId,
    /// New tabs in strip order.
    pub created: Vec<TabId>,
    /// Members whose popup was already gone or whose tab could not be
    /// created.
    pub skipped: usize,
}

impl ReconcileEngine {
    /// The anchor tab of a split was closed. Every member whose popup still
    /// exists comes back as a normal tab at the anchor's last position,
    /// then the popups and the controller go away. A member that cannot be
    /// recovered is skipped without stopping the others.
    pub async fn restore_anchor(&mut self, anchor: TabId) -> Option<RestoreReport> {
        let controller = self.repo.take(anchor)?;
        self.visible.remove(&anchor);
        self.debounce.cancel_anchor(anchor);

        let mut skipped = 0;
        let mut urls = Vec::new();
        for member in controller.session.members() {
            let Some(surface) = member.surface else {
                skipped += 1;
                continue;
            };
            match self.browser.get_window(WindowId::from(surface)).await {
                Ok(info) => urls.push(info.active_url.unwrap_or_else(|| member.current_url().to_string())),
                Err(e) => {
                    debug!(member = %member.id, error = %e, "popup gone, skipping member");
                    skipped += 1;
                }
            }
        }

        let created = self.open_tabs(&controller, &urls).await;
        skipped += urls.len() - created.len();
        self.close_popups(&controller).await;

        let session = controller.session.id().clone();
        info!(%session, %anchor, restored = created.len(), skipped, "split restored to tabs");
        self.publish(Event::SessionRestored {
            session: session.clone(),
            tabs: created.len(),
        });
        self.persist().await;
        Some(RestoreReport {
            session,
            created,
            skipped,
        })
    }

    /// Only `survivor` is left. Give it back as a normal tab in the anchor's
    /// place and close the split.
    pub(super) async fn fold_survivor(&mut self, mut controller: Controller, survivor: MemberId) -> Option<TabId> {
        let anchor = controller.anchor_tab;
        self.visible.remove(&anchor);
        self.debounce.cancel_anchor(anchor);
        if let Ok(tab) = self.browser.get_tab(anchor).await {
            controller.refresh_from(&tab);
        }

        let member = controller.session.member(survivor)?;
        let mut url = member.current_url().to_string();
        if let Some(surface) = member.surface {
            if let Ok(info) = self.browser.get_window(WindowId::from(surface)).await {
                url = info.active_url.unwrap_or(url);
            }
        }

        let created = self.open_tabs(&controller, &[url]).await;
        self.close_popups(&controller).await;
        if let Err(e) = self.browser.remove_tab(anchor).await {
            debug!(%anchor, error = %e, "anchor tab already closed");
        }

        let session = controller.session.id().clone();
        info!(%session, %anchor, "split folded into a single tab");
        self.publish(Event::SessionRestored {
            session,
            tabs: created.len(),
        });
        self.persist().await;
        created.first().copied()
    }

    /// Every popup of a controller is gone. Close the anchor tab and forget
    /// the controller.
    pub(super) async fn close_orphan(&mut self, controller: Controller) {
        let anchor = controller.anchor_tab;
        self.visible.remove(&anchor);
        self.debounce.cancel_anchor(anchor);
        if let Err(e) = self.browser.remove_tab(anchor).await {
            debug!(%anchor, error = %e, "anchor tab already closed");
        }
        let session = controller.session.id().clone();
        info!(%session, %anchor, "split has no popups left, closed");
        self.publish(Event::SessionClosed(session));
        self.persist().await;
    }

    /// Open one tab per URL starting at the anchor's last known index, then
    /// put them in the anchor's tab group.
    async fn open_tabs(&self, controller: &Controller, urls: &[String]) -> Vec<TabId> {
        let mut created = Vec::new();
        let mut index = controller.anchor_index;
        for url in urls {
            let tab = NewTab {
                window: controller.parent_window,
                index: Some(index),
                url: url.clone(),
                active: false,
            };
            match self.browser.create_tab(tab).await {
                Ok(tab) => {
                    created.push(tab.id);
                    index += 1;
                }
                Err(e) => warn!(url = %url, error = %e, "failed to restore tab"),
            }
        }
        if let Some(group) = controller.group.filter(|_| !created.is_empty()) {
            if let Err(e) = self.browser.group_tabs(&created, group).await {
                warn!(error = %e, "failed to regroup restored tabs");
            }
        }
        created
    }

    async fn close_popups(&mut self, controller: &Controller) {
        for window in controller.windows() {
            self.guard.clear(window);
            self.debounce.cancel(window);
            if let Err(e) = self.browser.remove_window(window).await {
                debug!(%window, error = %e, "popup already closed");
            }
        }
    }

    // =========================================================================
    // RESTART
    // =========================================================================

    /// Rebuild controllers from the persisted snapshot. Records whose anchor
    /// tab is gone are dropped, popups that no longer exist are dropped from
    /// their record, and a record left without popups closes its anchor.
    /// Runs once per engine; later calls return 0.
    pub async fn restore_persisted(&mut self) -> usize {
        if self.restored {
            return 0;
        }
        self.restored = true;
        let Some(storage) = self.storage.clone() else {
            return 0;
        };
        let snapshot = match storage.load().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return 0,
            Err(e) => {
                warn!(error = %e, "could not load persisted controllers");
                return 0;
            }
        };

        let mut restored = 0;
        for record in snapshot.controllers {
            if let Some(controller) = self.revive(record).await {
                self.repo.upsert(controller);
                restored += 1;
            }
        }
        info!(restored, "persisted controllers restored");
        self.persist().await;
        restored
    }

    async fn revive(&mut self, mut record: PersistedController) -> Option<Controller> {
        let anchor = match self.browser.get_tab(record.anchor_id).await {
            Ok(tab) => tab,
            Err(e) => {
                debug!(anchor = %record.anchor_id, error = %e, "anchor gone, dropping record");
                return None;
            }
        };

        record.sort_by_member_order();
        let mut alive = HashSet::new();
        let mut live_urls = Vec::new();
        for (i, window) in record.member_surface_ids.iter().enumerate() {
            if let Ok(info) = self.browser.get_window(*window).await {
                alive.insert(*window);
                let fallback = record.urls.get(i).cloned().unwrap_or_else(|| ANCHOR_URL.to_string());
                live_urls.push(info.active_url.unwrap_or(fallback));
            }
        }
        let dropped = record.retain_surfaces(&alive);
        if dropped > 0 {
            warn!(anchor = %record.anchor_id, dropped, "popups missing from persisted record");
        }
        if record.member_surface_ids.is_empty() {
            if let Err(e) = self.browser.remove_tab(record.anchor_id).await {
                debug!(anchor = %record.anchor_id, error = %e, "orphaned anchor already closed");
            }
            return None;
        }

        let id = record.session_id.clone().unwrap_or_default();
        let layout = record.layout.unwrap_or_default();
        let mut session = match Session::rebuild(id, &live_urls, &record.ratio_percents(), layout) {
            Ok(session) => session,
            Err(e) => {
                warn!(anchor = %record.anchor_id, error = %e, "unusable persisted record");
                return None;
            }
        };
        let members: Vec<MemberId> = session.members().iter().map(|m| m.id).collect();
        for (member, window) in members.into_iter().zip(&record.member_surface_ids) {
            session.bind_surface(member, Some(SurfaceId::from(*window))).ok()?;
        }
        if let Some(grid) = record.grid {
            session.set_grid_split(grid);
        }
        if let Some(mode) = record.last_linear {
            session.set_last_linear(mode);
        }
        Some(Controller::new(&anchor, session))
    }
}
