//! Member lifecycle: keeps the store and a binding in step.
//!
//! Every operation mutates the session first, then brings the physical
//! surfaces in line with one relayout pass. Binding failures never undo a
//! store change; a surface that has vanished is treated as already gone.

use splitview_common::{MemberId, PlatformError, SessionError};
use tracing::{debug, warn};

use crate::binding::SurfaceBinding;
use crate::drag::DragState;
use crate::mode::{layout_plan, LayoutMode};
use crate::session::{InsertPosition, MoveDirection, RemoveOutcome, Session};

pub struct MemberLifecycle<'a, B: SurfaceBinding + ?Sized> {
    session: &'a mut Session,
    binding: &'a mut B,
}

impl<'a, B: SurfaceBinding + ?Sized> MemberLifecycle<'a, B> {
    pub fn new(session: &'a mut Session, binding: &'a mut B) -> Self {
        Self { session, binding }
    }

    pub fn session(&self) -> &Session {
        self.session
    }

    /// Create surfaces for every member that has none yet, then lay out.
    pub async fn attach_all(&mut self) -> usize {
        let pending: Vec<(MemberId, String)> = self
            .session
            .members()
            .iter()
            .filter(|m| m.surface.is_none())
            .map(|m| (m.id, m.current_url().to_string()))
            .collect();

        let mut created = 0;
        for (member, url) in pending {
            if self.create(member, &url).await {
                created += 1;
            }
        }
        self.relayout().await;
        created
    }

    /// Add a member. An unknown `After` anchor falls back to the tail.
    pub async fn insert(&mut self, position: InsertPosition, url: &str) -> Result<MemberId, SessionError> {
        let id = match self.session.insert_member(position, url) {
            Err(SessionError::MemberNotFound(anchor)) => {
                debug!(%anchor, "insert anchor missing, appending");
                self.session.insert_member(InsertPosition::Tail, url)?
            }
            other => other?,
        };
        self.create(id, url).await;
        self.relayout().await;
        Ok(id)
    }

    /// Remove a member and destroy its surface.
    pub async fn remove(&mut self, member: MemberId) -> Result<RemoveOutcome, SessionError> {
        let outcome = self.session.remove_member(member)?;
        if let Err(e) = self.binding.destroy_surface(member).await {
            log_binding_error(member, "destroy", &e);
        }
        self.relayout().await;
        Ok(outcome)
    }

    /// A member's surface went away on its own. Drop the member without
    /// touching the binding.
    pub async fn surface_closed(&mut self, member: MemberId) -> Result<RemoveOutcome, SessionError> {
        let outcome = self.session.remove_member(member)?;
        self.relayout().await;
        Ok(outcome)
    }

    pub async fn move_member(&mut self, member: MemberId, direction: MoveDirection) -> Result<bool, SessionError> {
        let moved = self.session.move_member(member, direction)?;
        if moved {
            self.relayout().await;
        }
        Ok(moved)
    }

    /// Load new content into an existing member.
    pub async fn replace(&mut self, member: MemberId, url: &str) -> Result<(), SessionError> {
        self.session.replace_source(member, url)?;
        if let Err(e) = self.binding.navigate_surface(member, url).await {
            log_binding_error(member, "navigate", &e);
        }
        Ok(())
    }

    /// Replace the member to the right of `member`, or append a new one when
    /// there is nothing to its right.
    pub async fn replace_after(&mut self, member: MemberId, url: &str) -> Result<MemberId, SessionError> {
        let members = self.session.members();
        let right = members
            .iter()
            .position(|m| m.id == member)
            .and_then(|i| members.get(i + 1))
            .map(|m| m.id);

        match right {
            Some(target) => {
                self.replace(target, url).await?;
                Ok(target)
            }
            None => self.insert(InsertPosition::After(member), url).await,
        }
    }

    pub async fn set_layout(&mut self, mode: LayoutMode) -> Result<bool, SessionError> {
        let changed = self.session.set_layout_mode(mode)?;
        if changed {
            self.relayout().await;
        }
        Ok(changed)
    }

    pub async fn toggle_layout(&mut self) -> bool {
        let changed = self.session.toggle_layout();
        if changed {
            self.relayout().await;
        }
        changed
    }

    pub async fn toggle_expand(&mut self, member: MemberId) -> bool {
        let changed = self.session.toggle_expand(member);
        if changed {
            self.relayout().await;
        }
        changed
    }

    /// Apply one pointer frame of a divider drag.
    pub async fn drag(&mut self, drag: &DragState, x: f64, y: f64) -> bool {
        let changed = drag.update(self.session, x, y);
        if changed {
            self.relayout().await;
        }
        changed
    }

    /// Push the current plan to every surface. Returns how many surfaces
    /// accepted their geometry.
    pub async fn relayout(&mut self) -> usize {
        if let Err(e) = self.binding.prepare().await {
            warn!(error = %e, "tile pass skipped");
            return 0;
        }
        let plan = layout_plan(self.session);
        let mut applied = 0;
        for (member, geometry) in plan.panes {
            match self.binding.apply_geometry(member, geometry).await {
                Ok(()) => applied += 1,
                Err(e) => log_binding_error(member, "apply geometry", &e),
            }
        }
        applied
    }

    async fn create(&mut self, member: MemberId, url: &str) -> bool {
        let surface = match self.binding.create_surface(member, url).await {
            Ok(surface) => surface,
            Err(e) => {
                warn!(%member, error = %e, "failed to create surface");
                return false;
            }
        };
        if let Err(e) = self.session.bind_surface(member, Some(surface)) {
            warn!(%member, error = %e, "created surface has no member, destroying it");
            if let Err(e) = self.binding.destroy_surface(member).await {
                log_binding_error(member, "destroy surface", &e);
            }
            return false;
        }
        true
    }
}

fn log_binding_error(member: MemberId, action: &str, error: &PlatformError) {
    if error.is_gone() {
        debug!(%member, action, "surface already gone");
    } else {
        warn!(%member, action, error = %error, "binding error");
    }
}
