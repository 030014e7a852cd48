//! Inbound calls from UI and content collaborators.

use splitview_common::{Event, MemberId, PlatformError, Result, SessionError, SessionId, TabId, WindowId};
use splitview_layout::session::MAX_MEMBERS;
use splitview_layout::{InsertPosition, LayoutMode, MemberLifecycle, MoveDirection, RemoveOutcome, Session};
use tracing::{info, warn};

use super::{ReconcileEngine, ANCHOR_URL};
use crate::browser::{NewTab, TabQuery};
use crate::controller::Controller;

impl ReconcileEngine {
    /// Open a split of `urls` in `window`: a blank anchor tab appended to
    /// the strip plus one popup per URL.
    pub async fn create_split(
        &mut self,
        window: WindowId,
        urls: &[String],
        layout: Option<LayoutMode>,
    ) -> Result<SessionId> {
        self.create_split_at(window, None, urls, layout).await
    }

    /// Turn the highlighted tabs of `window` into a split. Takes at most the
    /// first four by strip position and needs at least two. Anchor tabs of
    /// existing splits never count. The anchor tab takes the place of the
    /// first one and the source tabs are closed.
    pub async fn split_highlighted(&mut self, window: WindowId) -> Result<Option<SessionId>> {
        let mut tabs = self
            .browser
            .query_tabs(TabQuery {
                window: Some(window),
                highlighted: Some(true),
                ..Default::default()
            })
            .await?;
        tabs.retain(|t| !self.repo.contains(t.id));
        tabs.sort_by_key(|t| t.index);
        tabs.truncate(MAX_MEMBERS);
        if tabs.len() < 2 {
            info!(%window, highlighted = tabs.len(), "not enough tabs to split");
            return Ok(None);
        }

        let urls: Vec<String> = tabs.iter().map(|t| t.url.clone()).collect();
        let session = self.create_split_at(window, Some(tabs[0].index), &urls, None).await?;

        for tab in &tabs {
            if let Err(e) = self.browser.remove_tab(tab.id).await {
                warn!(tab = %tab.id, error = %e, "failed to close source tab");
            }
        }
        if let Some(anchor) = self.repo.find_by_session(&session) {
            self.refresh_anchor(anchor).await;
        }
        self.persist().await;
        Ok(Some(session))
    }

    async fn create_split_at(
        &mut self,
        window: WindowId,
        index: Option<u32>,
        urls: &[String],
        layout: Option<LayoutMode>,
    ) -> Result<SessionId> {
        let session = Session::create(urls, layout)?;
        let anchor = self
            .browser
            .create_tab(NewTab {
                window,
                index,
                url: ANCHOR_URL.to_string(),
                active: true,
            })
            .await?;

        let mut controller = Controller::new(&anchor, session);
        let created = {
            let mut binding = self.popup_binding(&controller);
            MemberLifecycle::new(&mut controller.session, &mut binding)
                .attach_all()
                .await
        };
        if created == 0 {
            if let Err(e) = self.browser.remove_tab(anchor.id).await {
                warn!(tab = %anchor.id, error = %e, "failed to close anchor tab");
            }
            return Err(PlatformError::Browser("no popup window could be opened".into()).into());
        }
        if !Self::drop_unbound(&mut controller).is_empty() {
            let mut binding = self.popup_binding(&controller);
            MemberLifecycle::new(&mut controller.session, &mut binding)
                .relayout()
                .await;
        }

        let id = controller.session.id().clone();
        info!(session = %id, anchor = %anchor.id, members = controller.session.len(), "split created");
        self.repo.upsert(controller);
        self.show_only(anchor.id).await;
        self.activate_anchor(anchor.id).await;
        self.publish(Event::SessionCreated(id.clone()));
        self.persist().await;
        Ok(id)
    }

    pub async fn insert_member(&mut self, session: &SessionId, position: InsertPosition, url: &str) -> Result<MemberId> {
        let mut controller = self.take_controller(session)?;
        let before = controller.session.layout();
        let result = {
            let mut binding = self.popup_binding(&controller);
            MemberLifecycle::new(&mut controller.session, &mut binding)
                .insert(position, url)
                .await
        };
        let result: Result<MemberId> = match result {
            Ok(member) if controller.session.member(member).is_some_and(|m| m.surface.is_some()) => Ok(member),
            Ok(_) => {
                Self::drop_unbound(&mut controller);
                Err(PlatformError::Browser(format!("no popup window for {url}")).into())
            }
            Err(e) => Err(e.into()),
        };
        let layout = controller.session.layout();
        self.repo.upsert(controller);

        let member = match result {
            Ok(member) => member,
            Err(e) => {
                // Put the remaining popups back where they belong.
                if let Some(anchor) = self.repo.find_by_session(session) {
                    self.retile(anchor).await;
                }
                return Err(e);
            }
        };
        self.publish(Event::MemberAdded {
            session: session.clone(),
            member,
        });
        self.publish_layout_change(session, before, layout);
        self.persist().await;
        Ok(member)
    }

    /// Remove a member and close its popup. When one member is left the
    /// split is folded back into a normal tab.
    pub async fn remove_member(&mut self, session: &SessionId, member: MemberId) -> Result<RemoveOutcome> {
        let mut controller = self.take_controller(session)?;
        let before = controller.session.layout();
        let result = {
            let mut binding = self.popup_binding(&controller);
            MemberLifecycle::new(&mut controller.session, &mut binding)
                .remove(member)
                .await
        };
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.repo.upsert(controller);
                return Err(e.into());
            }
        };
        self.publish(Event::MemberRemoved {
            session: session.clone(),
            member,
        });
        match outcome {
            RemoveOutcome::Remaining(_) => {
                let after = controller.session.layout();
                self.repo.upsert(controller);
                self.publish_layout_change(session, before, after);
                self.persist().await;
            }
            RemoveOutcome::SingleSurvivor(survivor) => {
                self.fold_survivor(controller, survivor).await;
            }
        }
        Ok(outcome)
    }

    pub async fn move_member(&mut self, session: &SessionId, member: MemberId, direction: MoveDirection) -> Result<bool> {
        let mut controller = self.take_controller(session)?;
        let result = {
            let mut binding = self.popup_binding(&controller);
            MemberLifecycle::new(&mut controller.session, &mut binding)
                .move_member(member, direction)
                .await
        };
        self.repo.upsert(controller);
        let moved = result?;
        if moved {
            self.persist().await;
        }
        Ok(moved)
    }

    /// Load `url` into the member right of `member`, adding one at the
    /// tail when there is none.
    pub async fn replace_right(&mut self, session: &SessionId, member: MemberId, url: &str) -> Result<MemberId> {
        let mut controller = self.take_controller(session)?;
        let count = controller.session.len();
        let before = controller.session.layout();
        let result = {
            let mut binding = self.popup_binding(&controller);
            MemberLifecycle::new(&mut controller.session, &mut binding)
                .replace_after(member, url)
                .await
        };
        let after = controller.session.layout();
        let grew = controller.session.len() > count;
        self.repo.upsert(controller);
        let target = result?;
        if grew {
            self.publish(Event::MemberAdded {
                session: session.clone(),
                member: target,
            });
            self.publish_layout_change(session, before, after);
        }
        self.persist().await;
        Ok(target)
    }

    pub async fn set_layout_mode(&mut self, session: &SessionId, mode: LayoutMode) -> Result<bool> {
        let mut controller = self.take_controller(session)?;
        let before = controller.session.layout();
        let result = {
            let mut binding = self.popup_binding(&controller);
            MemberLifecycle::new(&mut controller.session, &mut binding)
                .set_layout(mode)
                .await
        };
        self.repo.upsert(controller);
        let changed = result?;
        if changed {
            self.publish_layout_change(session, before, mode);
            self.persist().await;
        }
        Ok(changed)
    }

    /// Switch between horizontal and vertical. Grid stays put.
    pub async fn toggle_layout(&mut self, session: &SessionId) -> Result<bool> {
        let mut controller = self.take_controller(session)?;
        let before = controller.session.layout();
        let changed = {
            let mut binding = self.popup_binding(&controller);
            MemberLifecycle::new(&mut controller.session, &mut binding)
                .toggle_layout()
                .await
        };
        let after = controller.session.layout();
        self.repo.upsert(controller);
        if changed {
            self.publish_layout_change(session, before, after);
            self.persist().await;
        }
        Ok(changed)
    }

    pub async fn toggle_expand(&mut self, session: &SessionId, member: MemberId) -> Result<bool> {
        let mut controller = self.take_controller(session)?;
        let result = if controller.session.contains(member) {
            let mut binding = self.popup_binding(&controller);
            Ok(MemberLifecycle::new(&mut controller.session, &mut binding)
                .toggle_expand(member)
                .await)
        } else {
            Err(SessionError::MemberNotFound(member))
        };
        self.repo.upsert(controller);
        Ok(result?)
    }

    /// A content collaborator saw `member` navigate to `url`.
    pub async fn report_navigation(&mut self, session: &SessionId, member: MemberId, url: &str) -> Result<()> {
        let anchor = self.anchor_of(session)?;
        if let Some(controller) = self.repo.get_mut(anchor) {
            controller.session.report_navigation(member, url)?;
        }
        self.persist().await;
        Ok(())
    }

    pub fn get_current_urls(&self, session: &SessionId) -> Result<Vec<String>> {
        self.session(session)
            .map(Session::current_urls)
            .ok_or_else(|| SessionError::SessionNotFound(session.clone()).into())
    }

    fn anchor_of(&self, session: &SessionId) -> Result<TabId> {
        self.repo
            .find_by_session(session)
            .ok_or_else(|| SessionError::SessionNotFound(session.clone()).into())
    }

    /// Re-read the anchor tab's index, group and window.
    pub(super) async fn refresh_anchor(&mut self, anchor: TabId) -> bool {
        let tab = match self.browser.get_tab(anchor).await {
            Ok(tab) => tab,
            Err(_) => return false,
        };
        self.repo
            .get_mut(anchor)
            .is_some_and(|controller| controller.refresh_from(&tab))
    }

    fn publish_layout_change(&self, session: &SessionId, before: LayoutMode, after: LayoutMode) {
        if before != after {
            self.publish(Event::LayoutChanged {
                session: session.clone(),
                layout: after.to_string(),
            });
        }
    }
}
