//! Physical rendering of members.
//!
//! A binding owns whatever actually shows a member (an embedded frame, a
//! popup window) and keeps its own member-to-surface association. The
//! lifecycle manager drives it; the store never talks to it directly.

mod embedded;

use async_trait::async_trait;
use splitview_common::{MemberId, PlatformError, SurfaceId};

use crate::size::Geometry;

pub use embedded::{EmbeddedBinding, FrameElement, FRAME_NAME_PREFIX};

pub type Result<T> = std::result::Result<T, PlatformError>;

#[async_trait]
pub trait SurfaceBinding: Send {
    /// Runs once at the start of every tile pass. Bindings that place
    /// surfaces relative to something that can move re-read it here.
    async fn prepare(&mut self) -> Result<()> {
        Ok(())
    }

    async fn create_surface(&mut self, member: MemberId, url: &str) -> Result<SurfaceId>;

    async fn navigate_surface(&mut self, member: MemberId, url: &str) -> Result<()>;

    async fn apply_geometry(&mut self, member: MemberId, geometry: Geometry) -> Result<()>;

    /// Tear down a member's surface. A surface that is already gone is
    /// reported as `PlatformError::SurfaceGone`.
    async fn destroy_surface(&mut self, member: MemberId) -> Result<()>;
}
