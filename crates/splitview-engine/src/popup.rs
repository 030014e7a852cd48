//! Popup-window binding: each member is shown in its own browser popup,
//! tiled over the parent window of the controller's anchor tab.

use std::collections::HashMap;

use async_trait::async_trait;
use splitview_common::{MemberId, PlatformError, Rect, SurfaceId, WindowId};
use splitview_config::schema::{HideStrategy, PopupConfig};
use splitview_layout::binding::{Result, SurfaceBinding};
use splitview_layout::{Geometry, Session};
use tracing::debug;

use crate::browser::{Browser, WindowState, WindowUpdate};
use crate::guard::SelfMoveGuard;

/// The region popups are tiled into, below the parent's tab strip and
/// address bar.
pub fn tile_area(parent: Rect, config: &PopupConfig) -> Rect {
    let margin = config.margin as f64;
    let top = config.inset_top as f64;
    let width = (parent.width - 2.0 * margin).max(0.0);
    let height = (parent.height - top - margin).max(config.min_height as f64);
    Rect::new(parent.x + margin, parent.y + top, width, height)
}

fn rounded(rect: Rect) -> Rect {
    Rect::new(rect.x.round(), rect.y.round(), rect.width.round(), rect.height.round())
}

pub struct PopupBinding<'a> {
    browser: &'a dyn Browser,
    parent: WindowId,
    config: &'a PopupConfig,
    guard: &'a mut SelfMoveGuard,
    windows: HashMap<MemberId, WindowId>,
    area: Option<Rect>,
}

impl<'a> PopupBinding<'a> {
    /// Bind to the popups a session already has.
    pub fn new(
        browser: &'a dyn Browser,
        parent: WindowId,
        session: &Session,
        config: &'a PopupConfig,
        guard: &'a mut SelfMoveGuard,
    ) -> Self {
        let windows = session
            .surfaces()
            .into_iter()
            .map(|(member, surface)| (member, WindowId::from(surface)))
            .collect();
        Self {
            browser,
            parent,
            config,
            guard,
            windows,
            area: None,
        }
    }

    pub fn window(&self, member: MemberId) -> Option<WindowId> {
        self.windows.get(&member).copied()
    }

    fn window_or_gone(&self, member: MemberId) -> Result<WindowId> {
        self.window(member)
            .ok_or_else(|| PlatformError::SurfaceGone(format!("no popup for {member}")))
    }

    async fn area(&mut self) -> Result<Rect> {
        match self.area {
            Some(area) => Ok(area),
            None => {
                self.prepare().await?;
                self.area
                    .ok_or_else(|| PlatformError::SurfaceGone(format!("window {}", self.parent)))
            }
        }
    }

    async fn hide(&mut self, window: WindowId) -> Result<()> {
        match self.config.hide_strategy {
            HideStrategy::Cover => Ok(()),
            HideStrategy::Minimize => {
                self.guard.mark(window);
                self.browser
                    .update_window(
                        window,
                        WindowUpdate {
                            state: Some(WindowState::Minimized),
                            ..Default::default()
                        },
                    )
                    .await
            }
        }
    }
}

#[async_trait]
impl<'a> SurfaceBinding for PopupBinding<'a> {
    async fn prepare(&mut self) -> Result<()> {
        let parent = self.browser.get_window(self.parent).await?;
        self.area = Some(tile_area(parent.bounds, self.config));
        Ok(())
    }

    async fn create_surface(&mut self, member: MemberId, url: &str) -> Result<SurfaceId> {
        let area = self.area().await?;
        let window = self.browser.create_popup(url, rounded(area)).await?;
        self.guard.mark(window);
        self.windows.insert(member, window);
        debug!(%member, %window, "popup created");
        Ok(SurfaceId::from(window))
    }

    async fn navigate_surface(&mut self, member: MemberId, url: &str) -> Result<()> {
        let window = self.window_or_gone(member)?;
        self.browser.navigate_window(window, url).await
    }

    async fn apply_geometry(&mut self, member: MemberId, geometry: Geometry) -> Result<()> {
        let window = self.window_or_gone(member)?;
        let area = self.area().await?;
        let Some(bounds) = geometry.resolve(area, self.config.gap as f64) else {
            return self.hide(window).await;
        };
        self.guard.mark(window);
        self.browser
            .update_window(
                window,
                WindowUpdate {
                    bounds: Some(rounded(bounds)),
                    state: Some(WindowState::Normal),
                    focused: Some(true),
                },
            )
            .await
    }

    async fn destroy_surface(&mut self, member: MemberId) -> Result<()> {
        let window = self.window_or_gone(member)?;
        self.windows.remove(&member);
        self.guard.clear(window);
        self.browser.remove_window(window).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::memory::MemoryBrowser;
    use splitview_layout::{LayoutMode, MemberLifecycle};

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://{i}.example")).collect()
    }

    #[test]
    fn tile_area_sits_below_the_address_bar() {
        let area = tile_area(Rect::new(100.0, 50.0, 1200.0, 800.0), &PopupConfig::default());
        assert_eq!(area, Rect::new(100.0, 90.0, 1200.0, 760.0));
    }

    #[test]
    fn tile_area_keeps_min_height() {
        let config = PopupConfig {
            margin: 10,
            ..Default::default()
        };
        let area = tile_area(Rect::new(0.0, 0.0, 600.0, 120.0), &config);
        assert_eq!(area, Rect::new(10.0, 40.0, 580.0, 100.0));
    }

    #[tokio::test]
    async fn attach_tiles_popups_side_by_side() {
        let browser = MemoryBrowser::new();
        let parent = browser.open_window(Rect::new(0.0, 0.0, 1200.0, 840.0)).await;
        let config = PopupConfig::default();
        let mut guard = SelfMoveGuard::new(Duration::from_millis(500));
        let mut session = Session::create(&urls(3), None).unwrap();

        let mut binding = PopupBinding::new(&browser, parent, &session, &config, &mut guard);
        let created = MemberLifecycle::new(&mut session, &mut binding).attach_all().await;
        assert_eq!(created, 3);

        let popups = browser.popups().await;
        assert_eq!(popups.len(), 3);
        let first = browser.window(popups[0]).await.unwrap().bounds;
        let third = browser.window(popups[2]).await.unwrap().bounds;
        assert_eq!(first, Rect::new(0.0, 40.0, 400.0, 800.0));
        assert_eq!(third.x, 800.0);
        assert!(guard.is_self_move(popups[1]));
        assert_eq!(session.surfaces().len(), 3);
    }

    #[tokio::test]
    async fn grid_places_column_major() {
        let browser = MemoryBrowser::new();
        let parent = browser.open_window(Rect::new(0.0, 0.0, 1000.0, 840.0)).await;
        let config = PopupConfig::default();
        let mut guard = SelfMoveGuard::new(Duration::from_millis(500));
        let mut session = Session::create(&urls(4), Some(LayoutMode::Grid)).unwrap();

        let mut binding = PopupBinding::new(&browser, parent, &session, &config, &mut guard);
        MemberLifecycle::new(&mut session, &mut binding).attach_all().await;

        let popups = browser.popups().await;
        let second = browser.window(popups[1]).await.unwrap().bounds;
        let third = browser.window(popups[2]).await.unwrap().bounds;
        assert_eq!(second, Rect::new(0.0, 440.0, 500.0, 400.0));
        assert_eq!(third, Rect::new(500.0, 40.0, 500.0, 400.0));
    }

    #[tokio::test]
    async fn minimize_strategy_hides_non_expanded() {
        let browser = MemoryBrowser::new();
        let parent = browser.open_window(Rect::new(0.0, 0.0, 1000.0, 840.0)).await;
        let config = PopupConfig {
            hide_strategy: HideStrategy::Minimize,
            ..Default::default()
        };
        let mut guard = SelfMoveGuard::new(Duration::from_millis(500));
        let mut session = Session::create(&urls(2), None).unwrap();
        let mut binding = PopupBinding::new(&browser, parent, &session, &config, &mut guard);
        let mut lifecycle = MemberLifecycle::new(&mut session, &mut binding);
        lifecycle.attach_all().await;
        assert!(lifecycle.toggle_expand(splitview_common::MemberId(1)).await);

        let popups = browser.popups().await;
        assert_eq!(browser.window(popups[1]).await.unwrap().state, WindowState::Minimized);
        assert_eq!(
            browser.window(popups[0]).await.unwrap().bounds,
            Rect::new(0.0, 40.0, 1000.0, 800.0)
        );
    }

    #[tokio::test]
    async fn missing_parent_fails_creation() {
        let browser = MemoryBrowser::new();
        let config = PopupConfig::default();
        let mut guard = SelfMoveGuard::new(Duration::from_millis(500));
        let session = Session::create(&urls(2), None).unwrap();
        let mut binding = PopupBinding::new(&browser, WindowId(77), &session, &config, &mut guard);
        let err = binding.create_surface(MemberId(1), "https://x.example").await.unwrap_err();
        assert!(err.is_gone());
    }
}
