//! In-page binding: each member is a named frame inside one host page.
//!
//! The binding keeps a model of the frame elements and the style values the
//! host page applies to them. Content scripts inside a frame report back by
//! frame name, which is how a browser-assigned frame id gets associated
//! with its member.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use splitview_common::{MemberId, PlatformError, SurfaceId};
use tracing::debug;

use super::{Result, SurfaceBinding};
use crate::size::{size_expression, Geometry, Placement, DIVIDER_THICKNESS_PX};

pub const FRAME_NAME_PREFIX: &str = "sb-iframe-";

/// Model of one frame wrapper in the host page.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameElement {
    pub member: MemberId,
    pub surface: SurfaceId,
    pub name: String,
    pub src: String,
    pub width: String,
    pub height: String,
    /// Flex order. Only set in linear layouts.
    pub order: Option<u32>,
    pub hidden: bool,
}

pub struct EmbeddedBinding {
    frames: BTreeMap<MemberId, FrameElement>,
    by_surface: HashMap<SurfaceId, MemberId>,
    divider_px: f64,
    next_frame: u64,
}

impl Default for EmbeddedBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddedBinding {
    pub fn new() -> Self {
        Self {
            frames: BTreeMap::new(),
            by_surface: HashMap::new(),
            divider_px: DIVIDER_THICKNESS_PX,
            next_frame: 0,
        }
    }

    pub fn frame(&self, member: MemberId) -> Option<&FrameElement> {
        self.frames.get(&member)
    }

    /// Frames in flex order; hidden and grid frames last, by member id.
    pub fn frames(&self) -> Vec<&FrameElement> {
        let mut frames: Vec<&FrameElement> = self.frames.values().collect();
        frames.sort_by_key(|f| (f.order.unwrap_or(u32::MAX), f.member));
        frames
    }

    pub fn member_for_surface(&self, surface: SurfaceId) -> Option<MemberId> {
        self.by_surface.get(&surface).copied()
    }

    /// Associate the frame called `name` with the id the browser assigned
    /// it. Returns the member and its new surface id.
    pub fn register_frame(&mut self, name: &str, frame_id: SurfaceId) -> Option<(MemberId, SurfaceId)> {
        let frame = self.frames.values_mut().find(|f| f.name == name)?;
        self.by_surface.remove(&frame.surface);
        frame.surface = frame_id;
        self.by_surface.insert(frame_id, frame.member);
        debug!(name, surface = %frame_id, member = %frame.member, "frame registered");
        Some((frame.member, frame_id))
    }

    fn frame_mut(&mut self, member: MemberId) -> Result<&mut FrameElement> {
        self.frames
            .get_mut(&member)
            .ok_or_else(|| PlatformError::SurfaceGone(member.to_string()))
    }
}

#[async_trait]
impl SurfaceBinding for EmbeddedBinding {
    async fn create_surface(&mut self, member: MemberId, url: &str) -> Result<SurfaceId> {
        let surface = SurfaceId(self.next_frame);
        let name = format!("{FRAME_NAME_PREFIX}{}", self.next_frame);
        self.next_frame += 1;

        self.frames.insert(
            member,
            FrameElement {
                member,
                surface,
                name,
                src: url.to_string(),
                width: "100%".into(),
                height: "100%".into(),
                order: None,
                hidden: false,
            },
        );
        self.by_surface.insert(surface, member);
        Ok(surface)
    }

    async fn navigate_surface(&mut self, member: MemberId, url: &str) -> Result<()> {
        self.frame_mut(member)?.src = url.to_string();
        Ok(())
    }

    async fn apply_geometry(&mut self, member: MemberId, geometry: Geometry) -> Result<()> {
        let px = self.divider_px;
        let frame = self.frame_mut(member)?;
        frame.hidden = geometry.is_hidden();

        match geometry.placement {
            Placement::Hidden => {}
            Placement::Full => {
                frame.width = "100%".into();
                frame.height = "100%".into();
            }
            Placement::Linear { index, dividers, .. } => {
                let primary = size_expression(geometry.primary_axis_percent, dividers, px);
                if geometry.vertical {
                    frame.width = "100%".into();
                    frame.height = primary;
                } else {
                    frame.width = primary;
                    frame.height = "100%".into();
                }
                frame.order = Some(index as u32 * 2);
            }
            Placement::Grid {
                column,
                column_percent,
                ..
            } => {
                let column_share = if column == 0 {
                    column_percent
                } else {
                    100.0 - column_percent
                };
                frame.width = size_expression(column_share, 1, px);
                frame.height = size_expression(geometry.primary_axis_percent, 1, px);
                frame.order = None;
            }
        }
        Ok(())
    }

    async fn destroy_surface(&mut self, member: MemberId) -> Result<()> {
        let frame = self
            .frames
            .remove(&member)
            .ok_or_else(|| PlatformError::SurfaceGone(member.to_string()))?;
        self.by_surface.remove(&frame.surface);
        Ok(())
    }
}
