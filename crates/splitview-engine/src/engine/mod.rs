//! Event Reconciliation Engine.
//!
//! Owns the controller repository and applies browser events and user
//! commands to it. All state lives on the engine and is only touched from
//! `&mut self` methods, so one handler runs to completion before the next
//! event is looked at. Browser calls can still fail at any await point and
//! are handled where they happen.

mod handlers;
mod operations;
mod restore;
mod run;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use splitview_common::{Event, EventBus, MemberId, SessionError, SessionId, TabId, WindowId};
use splitview_config::schema::HideStrategy;
use splitview_config::SplitviewConfig;
use splitview_layout::Session;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::browser::{Browser, WindowState, WindowUpdate};
use crate::controller::Controller;
use crate::debounce::Debouncer;
use crate::guard::SelfMoveGuard;
use crate::persistence::{Snapshot, SnapshotStorage};
use crate::popup::PopupBinding;
use crate::repository::ControllerRepository;

pub use restore::RestoreReport;
pub use run::CommandRequest;

/// URL loaded into the tab that stands in for a split.
pub const ANCHOR_URL: &str = "about:blank";

pub struct ReconcileEngine {
    browser: Arc<dyn Browser>,
    storage: Option<Arc<dyn SnapshotStorage>>,
    config: SplitviewConfig,
    repo: ControllerRepository,
    guard: SelfMoveGuard,
    debounce: Debouncer,
    events: EventBus,
    /// Anchors whose popups are currently in front.
    visible: HashSet<TabId>,
    last_focused: Option<WindowId>,
    restored: bool,
}

impl ReconcileEngine {
    pub fn new(browser: Arc<dyn Browser>, config: SplitviewConfig) -> Self {
        let guard = SelfMoveGuard::new(Duration::from_millis(config.reconcile.self_move_guard_ms));
        let debounce = Debouncer::new(Duration::from_millis(config.reconcile.bounds_debounce_ms));
        Self {
            browser,
            storage: None,
            config,
            repo: ControllerRepository::new(),
            guard,
            debounce,
            events: EventBus::default(),
            visible: HashSet::new(),
            last_focused: None,
            restored: false,
        }
    }

    pub fn with_storage(mut self, storage: Arc<dyn SnapshotStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn repository(&self) -> &ControllerRepository {
        &self.repo
    }

    pub fn config(&self) -> &SplitviewConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn controller(&self, session: &SessionId) -> Option<&Controller> {
        self.repo.find_by_session(session).and_then(|anchor| self.repo.get(anchor))
    }

    pub fn session(&self, session: &SessionId) -> Option<&Session> {
        self.controller(session).map(|c| &c.session)
    }

    pub fn is_visible(&self, anchor: TabId) -> bool {
        self.visible.contains(&anchor)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn popup_binding(&mut self, controller: &Controller) -> PopupBinding<'_> {
        PopupBinding::new(
            self.browser.as_ref(),
            controller.parent_window,
            &controller.session,
            &self.config.popup,
            &mut self.guard,
        )
    }

    /// Remove a session's controller from the repository for a structural
    /// change. The caller puts it back with `upsert` or tears it down.
    fn take_controller(&mut self, session: &SessionId) -> Result<Controller, SessionError> {
        self.repo
            .find_by_session(session)
            .and_then(|anchor| self.repo.take(anchor))
            .ok_or_else(|| SessionError::SessionNotFound(session.clone()))
    }

    fn publish(&self, event: Event) {
        self.events.publish(event);
    }

    /// Write every controller record to storage. Failures are logged and
    /// otherwise ignored; the next mutation tries again.
    async fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let snapshot = Snapshot::from_controllers(self.repo.iter());
        if let Err(e) = storage.save(&snapshot).await {
            warn!(error = %e, "failed to persist controllers");
        }
    }

    /// Re-read the anchor tab and re-tile its popups over the parent window.
    async fn retile(&mut self, anchor: TabId) -> usize {
        let Some(mut controller) = self.repo.take(anchor) else {
            return 0;
        };
        if let Ok(tab) = self.browser.get_tab(anchor).await {
            controller.refresh_from(&tab);
        }
        let applied = {
            let mut binding = self.popup_binding(&controller);
            splitview_layout::MemberLifecycle::new(&mut controller.session, &mut binding)
                .relayout()
                .await
        };
        self.repo.upsert(controller);
        applied
    }

    /// Bring one controller's popups to the front and get every other
    /// controller out of the way.
    async fn show_only(&mut self, anchor: TabId) {
        let others: Vec<TabId> = self.visible.iter().copied().filter(|a| *a != anchor).collect();
        for other in others {
            self.hide(other).await;
        }
        self.retile(anchor).await;
        self.visible.insert(anchor);
        debug!(%anchor, "controller shown");
    }

    async fn hide(&mut self, anchor: TabId) {
        if !self.visible.remove(&anchor) {
            return;
        }
        if self.config.popup.hide_strategy == HideStrategy::Cover {
            return;
        }
        let Some(controller) = self.repo.get(anchor) else {
            return;
        };
        for window in controller.windows() {
            self.guard.mark(window);
            let update = WindowUpdate {
                state: Some(WindowState::Minimized),
                ..Default::default()
            };
            if let Err(e) = self.browser.update_window(window, update).await {
                debug!(%window, error = %e, "could not minimize popup");
            }
        }
    }

    async fn hide_all(&mut self) {
        let visible: Vec<TabId> = self.visible.iter().copied().collect();
        for anchor in visible {
            self.hide(anchor).await;
        }
    }

    async fn activate_anchor(&self, anchor: TabId) {
        if let Err(e) = self.browser.activate_tab(anchor).await {
            debug!(%anchor, error = %e, "could not activate anchor tab");
        }
    }

    /// Remove members whose popup could not be opened. Returns the ids
    /// dropped; the last member is always kept.
    fn drop_unbound(controller: &mut Controller) -> Vec<MemberId> {
        let unbound: Vec<MemberId> = controller
            .session
            .members()
            .iter()
            .filter(|m| m.surface.is_none())
            .map(|m| m.id)
            .collect();
        unbound
            .into_iter()
            .filter(|id| controller.session.remove_member(*id).is_ok())
            .collect()
    }
}
