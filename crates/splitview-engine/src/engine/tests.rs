use std::sync::Arc;
use std::time::Duration;

use splitview_common::{Event, GroupId, MemberId, Rect, SessionError, SessionId, SplitviewError, TabId, WindowId};
use splitview_config::schema::HideStrategy;
use splitview_config::SplitviewConfig;
use splitview_layout::{InsertPosition, LayoutMode, RemoveOutcome};
use tokio::sync::{mpsc, oneshot};

use super::*;
use crate::browser::{Browser, BrowserEvent, WindowState};
use crate::commands::{CommandResponse, SplitCommand};
use crate::memory::MemoryBrowser;
use crate::persistence::{MemoryStorage, Snapshot, SnapshotStorage};

struct Harness {
    browser: MemoryBrowser,
    storage: Arc<MemoryStorage>,
    engine: ReconcileEngine,
    window: WindowId,
    start: TabId,
}

fn urls(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| format!("https://{n}.example/")).collect()
}

async fn harness_with(config: SplitviewConfig) -> Harness {
    let browser = MemoryBrowser::new();
    let window = browser.open_window(Rect::new(0.0, 0.0, 1200.0, 840.0)).await;
    let start = browser.open_tab(window, "https://start.example/").await.unwrap();
    let storage = Arc::new(MemoryStorage::new());
    let engine = ReconcileEngine::new(Arc::new(browser.clone()), config).with_storage(storage.clone());
    Harness {
        browser,
        storage,
        engine,
        window,
        start,
    }
}

async fn harness() -> Harness {
    harness_with(SplitviewConfig::default()).await
}

impl Harness {
    async fn split(&mut self, names: &[&str]) -> SessionId {
        self.engine.create_split(self.window, &urls(names), None).await.unwrap()
    }

    fn controller(&self, session: &SessionId) -> &Controller {
        self.engine.controller(session).unwrap()
    }

    async fn bounds(&self, window: WindowId) -> Rect {
        self.browser.window(window).await.unwrap().bounds
    }

    async fn tab_urls(&self) -> Vec<String> {
        self.browser.tabs(self.window).await.into_iter().map(|t| t.url).collect()
    }

    async fn snapshot(&self) -> Snapshot {
        self.storage.load().await.unwrap().unwrap()
    }
}

// =============================================================================
// CREATE
// =============================================================================

#[tokio::test]
async fn create_split_tiles_popups_below_address_bar() {
    let mut h = harness().await;
    let mut events = h.engine.subscribe();
    let session = h.split(&["a", "b", "c"]).await;

    let controller = h.controller(&session).clone();
    assert_eq!(controller.parent_window, h.window);
    assert_eq!(controller.anchor_index, 1);
    let windows = controller.windows();
    assert_eq!(windows.len(), 3);
    assert_eq!(h.bounds(windows[0]).await, Rect::new(0.0, 40.0, 400.0, 800.0));
    assert_eq!(h.bounds(windows[1]).await, Rect::new(400.0, 40.0, 400.0, 800.0));
    assert_eq!(h.bounds(windows[2]).await, Rect::new(800.0, 40.0, 400.0, 800.0));

    let tabs = h.browser.tabs(h.window).await;
    assert_eq!(tabs[1].id, controller.anchor_tab);
    assert!(tabs[1].active);
    assert!(h.engine.is_visible(controller.anchor_tab));

    assert!(matches!(events.recv().await.unwrap(), Event::SessionCreated(id) if id == session));
    assert_eq!(h.snapshot().await.controllers.len(), 1);
}

#[tokio::test]
async fn create_split_rejects_bad_source_counts() {
    let mut h = harness().await;
    let err = h.engine.create_split(h.window, &urls(&["a"]), None).await.unwrap_err();
    assert!(matches!(err, SplitviewError::Session(SessionError::InvalidSourceCount(1))));
    assert!(h.browser.popups().await.is_empty());
    assert_eq!(h.browser.tabs(h.window).await.len(), 1);
}

#[tokio::test]
async fn create_split_in_missing_window_fails() {
    let mut h = harness().await;
    let err = h.engine.create_split(WindowId(999), &urls(&["a", "b"]), None).await.unwrap_err();
    assert!(matches!(err, SplitviewError::Platform(e) if e.is_gone()));
    assert!(h.engine.repository().is_empty());
}

#[tokio::test]
async fn split_highlighted_replaces_source_tabs() {
    let mut h = harness().await;
    let a = h.browser.open_tab(h.window, "https://a.example/").await.unwrap();
    h.browser.open_tab(h.window, "https://b.example/").await.unwrap();
    let c = h.browser.open_tab(h.window, "https://c.example/").await.unwrap();
    h.browser.set_highlighted(a, true).await;
    h.browser.set_highlighted(c, true).await;

    let session = h.engine.split_highlighted(h.window).await.unwrap().unwrap();
    assert_eq!(
        h.tab_urls().await,
        vec!["https://start.example/", ANCHOR_URL, "https://b.example/"]
    );
    assert_eq!(h.controller(&session).anchor_index, 1);
    assert_eq!(
        h.engine.get_current_urls(&session).unwrap(),
        urls(&["a", "c"])
    );
}

#[tokio::test]
async fn split_highlighted_needs_two_tabs() {
    let mut h = harness().await;
    h.browser.set_highlighted(h.start, true).await;
    assert_eq!(h.engine.split_highlighted(h.window).await.unwrap(), None);
    assert!(h.browser.popups().await.is_empty());
}

#[tokio::test]
async fn split_highlighted_skips_existing_anchors() {
    let mut h = harness().await;
    let existing = h.split(&["a", "b"]).await;
    let anchor = h.controller(&existing).anchor_tab;
    h.browser.set_highlighted(anchor, true).await;
    h.browser.set_highlighted(h.start, true).await;
    let tabs_before = h.tab_urls().await;

    assert_eq!(h.engine.split_highlighted(h.window).await.unwrap(), None);
    assert_eq!(h.tab_urls().await, tabs_before);
    assert_eq!(h.engine.repository().len(), 1);
    assert_eq!(h.browser.popups().await.len(), 2);
}

// =============================================================================
// STRUCTURE
// =============================================================================

#[tokio::test]
async fn fourth_member_promotes_to_grid_and_removal_demotes() {
    let mut h = harness().await;
    let session = h.split(&["a", "b", "c"]).await;

    let added = h
        .engine
        .insert_member(&session, InsertPosition::Tail, "https://d.example/")
        .await
        .unwrap();
    assert_eq!(added, MemberId(4));
    let controller = h.controller(&session).clone();
    assert_eq!(controller.session.layout(), LayoutMode::Grid);
    let windows = controller.windows();
    assert_eq!(h.bounds(windows[1]).await, Rect::new(0.0, 440.0, 600.0, 400.0));
    assert_eq!(h.bounds(windows[2]).await, Rect::new(600.0, 40.0, 600.0, 400.0));

    let outcome = h.engine.remove_member(&session, MemberId(2)).await.unwrap();
    assert_eq!(outcome, RemoveOutcome::Remaining(3));
    let controller = h.controller(&session);
    assert_eq!(controller.session.layout(), LayoutMode::Horizontal);
    assert!(controller.session.ratios().iter().all(|r| (r - 100.0 / 3.0).abs() < 1e-9));
    assert_eq!(h.browser.popups().await.len(), 3);
}

#[tokio::test]
async fn fifth_member_is_rejected() {
    let mut h = harness().await;
    let session = h.split(&["a", "b", "c", "d"]).await;
    let err = h
        .engine
        .insert_member(&session, InsertPosition::Head, "https://e.example/")
        .await
        .unwrap_err();
    assert!(matches!(err, SplitviewError::Session(SessionError::SessionFull(4))));
    assert_eq!(h.browser.popups().await.len(), 4);
    assert!(h.engine.repository().len() == 1);
}

#[tokio::test]
async fn removing_down_to_one_member_folds_into_a_tab() {
    let mut h = harness().await;
    let session = h.split(&["a", "b"]).await;

    let outcome = h.engine.remove_member(&session, MemberId(2)).await.unwrap();
    assert_eq!(outcome, RemoveOutcome::SingleSurvivor(MemberId(1)));
    assert!(h.engine.repository().is_empty());
    assert!(h.browser.popups().await.is_empty());
    assert_eq!(h.tab_urls().await, vec!["https://start.example/", "https://a.example/"]);
    assert!(h.snapshot().await.controllers.is_empty());
}

#[tokio::test]
async fn replace_right_navigates_neighbour_or_appends() {
    let mut h = harness().await;
    let session = h.split(&["a", "b"]).await;
    let windows = h.controller(&session).windows();

    let target = h
        .engine
        .replace_right(&session, MemberId(1), "https://x.example/")
        .await
        .unwrap();
    assert_eq!(target, MemberId(2));
    let info = h.browser.window(windows[1]).await.unwrap();
    assert_eq!(info.active_url.as_deref(), Some("https://x.example/"));

    let target = h
        .engine
        .replace_right(&session, MemberId(2), "https://y.example/")
        .await
        .unwrap();
    assert_eq!(target, MemberId(3));
    assert_eq!(h.browser.popups().await.len(), 3);
}

#[tokio::test]
async fn unknown_session_is_reported() {
    let mut h = harness().await;
    let missing = SessionId::from("missing");
    let err = h.engine.set_layout_mode(&missing, LayoutMode::Vertical).await.unwrap_err();
    assert!(matches!(err, SplitviewError::Session(SessionError::SessionNotFound(_))));
}

#[tokio::test]
async fn vertical_layout_stacks_popups() {
    let mut h = harness().await;
    let session = h.split(&["a", "b"]).await;
    assert!(h.engine.set_layout_mode(&session, LayoutMode::Vertical).await.unwrap());
    let windows = h.controller(&session).windows();
    assert_eq!(h.bounds(windows[1]).await, Rect::new(0.0, 440.0, 1200.0, 400.0));

    let err = h.engine.set_layout_mode(&session, LayoutMode::Grid).await.unwrap_err();
    assert!(matches!(
        err,
        SplitviewError::Session(SessionError::GridRequiresFourMembers(2))
    ));
}

#[tokio::test]
async fn reported_navigation_updates_current_urls() {
    let mut h = harness().await;
    let session = h.split(&["a", "b"]).await;
    h.engine
        .report_navigation(&session, MemberId(2), "https://b.example/next")
        .await
        .unwrap();
    assert_eq!(
        h.engine.get_current_urls(&session).unwrap(),
        vec!["https://a.example/".to_string(), "https://b.example/next".to_string()]
    );
}

// =============================================================================
// RESTORE
// =============================================================================

#[tokio::test]
async fn closing_anchor_restores_members_in_place() {
    let mut h = harness().await;
    let session = h.split(&["a", "b", "c"]).await;
    let anchor = h.controller(&session).anchor_tab;

    h.browser.close_tab(anchor).await;
    let report = h.engine.restore_anchor(anchor).await.unwrap();

    assert_eq!(report.session, session);
    assert_eq!(report.created.len(), 3);
    assert_eq!(report.skipped, 0);
    assert_eq!(
        h.tab_urls().await,
        vec![
            "https://start.example/",
            "https://a.example/",
            "https://b.example/",
            "https://c.example/"
        ]
    );
    let restored = h.browser.get_tab(report.created[0]).await.unwrap();
    assert_eq!(restored.index, 1);
    assert!(h.engine.repository().is_empty());
    assert!(h.browser.popups().await.is_empty());
}

#[tokio::test]
async fn restore_skips_popups_that_are_already_gone() {
    let mut h = harness().await;
    let session = h.split(&["a", "b", "c"]).await;
    let controller = h.controller(&session).clone();
    h.browser.close_window(controller.windows()[1]).await;

    h.browser.close_tab(controller.anchor_tab).await;
    h.engine
        .handle_event(BrowserEvent::TabRemoved {
            tab: controller.anchor_tab,
        })
        .await;

    assert_eq!(
        h.tab_urls().await,
        vec!["https://start.example/", "https://a.example/", "https://c.example/"]
    );
    assert!(h.engine.repository().is_empty());
}

#[tokio::test]
async fn restore_prefers_live_popup_url() {
    let mut h = harness().await;
    let session = h.split(&["a", "b"]).await;
    let controller = h.controller(&session).clone();
    h.browser
        .navigate_window(controller.windows()[0], "https://a.example/deeper")
        .await
        .unwrap();

    h.browser.close_tab(controller.anchor_tab).await;
    h.engine.restore_anchor(controller.anchor_tab).await.unwrap();
    assert_eq!(h.tab_urls().await[1], "https://a.example/deeper");
}

#[tokio::test]
async fn restored_tabs_rejoin_anchor_group() {
    let mut h = harness().await;
    let session = h.split(&["a", "b"]).await;
    let anchor = h.controller(&session).anchor_tab;

    h.browser.set_group(anchor, Some(GroupId(7))).await;
    h.engine.handle_event(BrowserEvent::TabUpdated { tab: anchor }).await;
    assert_eq!(h.controller(&session).group, Some(GroupId(7)));

    h.browser.close_tab(anchor).await;
    let report = h.engine.restore_anchor(anchor).await.unwrap();
    for tab in report.created {
        assert_eq!(h.browser.get_tab(tab).await.unwrap().group, Some(GroupId(7)));
    }
}

#[tokio::test]
async fn removing_unknown_tab_is_ignored() {
    let mut h = harness().await;
    h.split(&["a", "b"]).await;
    assert!(h.engine.restore_anchor(h.start).await.is_none());
    assert_eq!(h.engine.repository().len(), 1);
}

// =============================================================================
// POPUPS CLOSED BY THE USER
// =============================================================================

#[tokio::test]
async fn closing_a_popup_retiles_the_rest() {
    let mut h = harness().await;
    let session = h.split(&["a", "b", "c"]).await;
    let windows = h.controller(&session).windows();

    h.browser.close_window(windows[1]).await;
    h.engine
        .handle_event(BrowserEvent::WindowRemoved { window: windows[1] })
        .await;

    let controller = h.controller(&session);
    assert_eq!(controller.session.len(), 2);
    assert_eq!(controller.windows(), vec![windows[0], windows[2]]);
    assert_eq!(h.bounds(windows[2]).await, Rect::new(600.0, 40.0, 600.0, 800.0));
    assert_eq!(h.snapshot().await.controllers[0].member_surface_ids.len(), 2);
    assert_eq!(h.engine.repository().anchor_for_window(windows[1]), None);
}

#[tokio::test]
async fn closing_a_popup_of_a_pair_folds_the_survivor() {
    let mut h = harness().await;
    let session = h.split(&["a", "b"]).await;
    let controller = h.controller(&session).clone();

    h.browser.close_window(controller.windows()[0]).await;
    h.engine
        .handle_event(BrowserEvent::WindowRemoved {
            window: controller.windows()[0],
        })
        .await;

    assert!(h.engine.repository().is_empty());
    assert!(h.browser.popups().await.is_empty());
    assert_eq!(h.tab_urls().await, vec!["https://start.example/", "https://b.example/"]);
}

// =============================================================================
// BOUNDS
// =============================================================================

#[tokio::test(start_paused = true)]
async fn own_moves_are_ignored() {
    let mut h = harness().await;
    let session = h.split(&["a", "b"]).await;
    for window in h.controller(&session).windows() {
        let bounds = h.bounds(window).await;
        h.engine
            .handle_event(BrowserEvent::WindowBoundsChanged { window, bounds })
            .await;
    }
    assert!(h.engine.debounce.is_empty());
}

#[tokio::test(start_paused = true)]
async fn parent_moves_are_debounced_then_retiled() {
    let mut h = harness().await;
    let session = h.split(&["a", "b", "c"]).await;
    let windows = h.controller(&session).windows();
    h.browser.clear_updates().await;

    let moved = Rect::new(100.0, 0.0, 1000.0, 840.0);
    h.browser.move_window(h.window, moved).await;
    for _ in 0..3 {
        h.engine
            .handle_event(BrowserEvent::WindowBoundsChanged {
                window: h.window,
                bounds: moved,
            })
            .await;
        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(h.engine.run_due().await, 0);
    }
    assert!(h.browser.updates().await.is_empty());

    tokio::time::advance(Duration::from_millis(50)).await;
    assert_eq!(h.engine.run_due().await, 1);
    assert_eq!(h.bounds(windows[0]).await, Rect::new(100.0, 40.0, 333.0, 800.0));
    assert_eq!(h.bounds(windows[2]).await.x, 767.0);
}

#[tokio::test(start_paused = true)]
async fn user_resize_of_a_popup_is_kept() {
    let mut h = harness().await;
    let session = h.split(&["a", "b"]).await;
    let windows = h.controller(&session).windows();
    tokio::time::advance(Duration::from_millis(600)).await;

    let resized = Rect::new(0.0, 40.0, 900.0, 800.0);
    h.browser.move_window(windows[0], resized).await;
    h.engine
        .handle_event(BrowserEvent::WindowBoundsChanged {
            window: windows[0],
            bounds: resized,
        })
        .await;
    tokio::time::advance(Duration::from_millis(100)).await;
    assert_eq!(h.engine.run_due().await, 1);

    let controller = h.controller(&session);
    assert_eq!(controller.session.ratios(), vec![75.0, 25.0]);
    assert_eq!(h.bounds(windows[1]).await, Rect::new(900.0, 40.0, 300.0, 800.0));
    let persisted = &h.snapshot().await.controllers[0];
    assert_eq!(persisted.width_ratios.get(&windows[0]), Some(&0.75));
}

// =============================================================================
// FOCUS
// =============================================================================

fn minimizing() -> SplitviewConfig {
    let mut config = SplitviewConfig::default();
    config.popup.hide_strategy = HideStrategy::Minimize;
    config
}

#[tokio::test]
async fn losing_focus_hides_popups() {
    let mut h = harness_with(minimizing()).await;
    let session = h.split(&["a", "b"]).await;
    let controller = h.controller(&session).clone();

    h.engine
        .handle_event(BrowserEvent::WindowFocusChanged { window: None })
        .await;
    assert!(!h.engine.is_visible(controller.anchor_tab));
    for window in controller.windows() {
        assert_eq!(h.browser.window(window).await.unwrap().state, WindowState::Minimized);
    }
}

#[tokio::test]
async fn switching_to_another_tab_hides_the_split() {
    let mut h = harness_with(minimizing()).await;
    let session = h.split(&["a", "b"]).await;
    let controller = h.controller(&session).clone();

    h.browser.activate_tab(h.start).await.unwrap();
    h.engine
        .handle_event(BrowserEvent::TabActivated {
            tab: h.start,
            window: h.window,
        })
        .await;
    assert!(!h.engine.is_visible(controller.anchor_tab));

    h.engine
        .handle_event(BrowserEvent::TabActivated {
            tab: controller.anchor_tab,
            window: h.window,
        })
        .await;
    assert!(h.engine.is_visible(controller.anchor_tab));
    for window in controller.windows() {
        assert_eq!(h.browser.window(window).await.unwrap().state, WindowState::Normal);
    }
}

#[tokio::test]
async fn focusing_a_popup_from_outside_brings_the_split_forward() {
    let mut h = harness_with(minimizing()).await;
    let session = h.split(&["a", "b"]).await;
    let controller = h.controller(&session).clone();
    let windows = controller.windows();

    h.browser.activate_tab(h.start).await.unwrap();
    h.engine
        .handle_event(BrowserEvent::WindowFocusChanged { window: Some(h.window) })
        .await;
    assert!(!h.engine.is_visible(controller.anchor_tab));

    h.engine
        .handle_event(BrowserEvent::WindowFocusChanged {
            window: Some(windows[0]),
        })
        .await;
    assert!(h.engine.is_visible(controller.anchor_tab));
    assert!(h.browser.get_tab(controller.anchor_tab).await.unwrap().active);
    assert_eq!(h.browser.focused().await, Some(windows[0]));

    // Moving between popups of the same split leaves everything alone.
    h.browser.clear_updates().await;
    h.engine
        .handle_event(BrowserEvent::WindowFocusChanged {
            window: Some(windows[1]),
        })
        .await;
    assert!(h.browser.updates().await.is_empty());
}

#[tokio::test]
async fn member_navigation_event_updates_session() {
    let mut h = harness().await;
    let session = h.split(&["a", "b"]).await;
    let window = h.controller(&session).windows()[0];
    h.engine
        .handle_event(BrowserEvent::MemberNavigated {
            window,
            url: "https://a.example/2".into(),
        })
        .await;
    assert_eq!(h.engine.get_current_urls(&session).unwrap()[0], "https://a.example/2");
}

// =============================================================================
// PERSISTENCE
// =============================================================================

#[tokio::test]
async fn restart_restores_controllers_without_missing_popups() {
    let mut h = harness().await;
    let session = h.split(&["a", "b", "c"]).await;
    let windows = h.controller(&session).windows();
    h.browser.close_window(windows[1]).await;

    let mut restarted =
        ReconcileEngine::new(Arc::new(h.browser.clone()), SplitviewConfig::default()).with_storage(h.storage.clone());
    assert_eq!(restarted.restore_persisted().await, 1);
    assert_eq!(restarted.restore_persisted().await, 0);

    let controller = restarted.controller(&session).unwrap();
    assert_eq!(controller.windows(), vec![windows[0], windows[2]]);
    let sum: f64 = controller.width_ratios().values().sum();
    assert!((sum - 1.0).abs() < 1e-9);
    assert_eq!(
        restarted.get_current_urls(&session).unwrap(),
        urls(&["a", "c"])
    );

    let record = &h.snapshot().await.controllers[0];
    assert_eq!(record.member_surface_ids, vec![windows[0], windows[2]]);
    let sum: f64 = record.width_ratios.values().sum();
    assert!((sum - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn restart_keeps_member_order_and_linear_fallback() {
    let mut h = harness().await;
    let session = h.engine.create_split(h.window, &urls(&["a", "b", "c"]), Some(LayoutMode::Vertical)).await.unwrap();
    h.engine
        .insert_member(&session, InsertPosition::Tail, "https://d.example/")
        .await
        .unwrap();
    assert_eq!(h.controller(&session).session.layout(), LayoutMode::Grid);

    let mut snapshot = h.snapshot().await;
    let record = &mut snapshot.controllers[0];
    assert_eq!(record.last_linear, Some(LayoutMode::Vertical));
    record.member_surface_ids.reverse();
    record.member_order.reverse();
    record.urls.reverse();
    h.storage.save(&snapshot).await.unwrap();

    let mut restarted =
        ReconcileEngine::new(Arc::new(h.browser.clone()), SplitviewConfig::default()).with_storage(h.storage.clone());
    assert_eq!(restarted.restore_persisted().await, 1);
    assert_eq!(restarted.get_current_urls(&session).unwrap(), urls(&["a", "b", "c", "d"]));

    restarted.remove_member(&session, MemberId(4)).await.unwrap();
    assert_eq!(restarted.session(&session).unwrap().layout(), LayoutMode::Vertical);
}

#[tokio::test]
async fn restart_drops_records_without_anchor_or_popups() {
    let mut h = harness().await;
    let first = h.split(&["a", "b"]).await;
    let second = h.split(&["c", "d"]).await;
    let first = h.controller(&first).clone();
    let second = h.controller(&second).clone();

    h.browser.close_tab(first.anchor_tab).await;
    for window in second.windows() {
        h.browser.close_window(window).await;
    }

    let mut restarted =
        ReconcileEngine::new(Arc::new(h.browser.clone()), SplitviewConfig::default()).with_storage(h.storage.clone());
    assert_eq!(restarted.restore_persisted().await, 0);
    assert!(restarted.repository().is_empty());
    assert!(h.browser.get_tab(second.anchor_tab).await.is_err());
    assert!(h.snapshot().await.controllers.is_empty());
}

// =============================================================================
// COMMANDS
// =============================================================================

#[tokio::test]
async fn commands_drive_the_engine() {
    let mut h = harness().await;
    let create = SplitCommand::parse(&format!(
        r#"{{"action":"create-split","window":{},"urls":["https://a.example/","https://b.example/"]}}"#,
        h.window.0
    ))
    .unwrap();
    let CommandResponse::Session(Some(session)) = create.execute(&mut h.engine).await.unwrap() else {
        panic!("expected a session");
    };

    let response = SplitCommand::GetCurrentUrls {
        session: session.clone(),
    }
    .execute(&mut h.engine)
    .await
    .unwrap();
    assert_eq!(response, CommandResponse::Urls(urls(&["a", "b"])));

    let response = SplitCommand::ToggleLayout { session }.execute(&mut h.engine).await.unwrap();
    assert_eq!(response, CommandResponse::Changed(true));
}

#[tokio::test]
async fn run_loop_serves_commands_until_channels_close() {
    let h = harness().await;
    let window = h.window;
    let (event_tx, event_rx) = mpsc::channel(8);
    let (command_tx, command_rx) = mpsc::channel(8);

    let driver = async move {
        let (reply_tx, reply_rx) = oneshot::channel::<Result<CommandResponse, SplitviewError>>();
        let command = SplitCommand::CreateSplit {
            window,
            urls: urls(&["a", "b"]),
            layout: Some(LayoutMode::Vertical),
        };
        command_tx.send((command, reply_tx)).await.unwrap();
        let response = reply_rx.await.unwrap().unwrap();
        drop(event_tx);
        drop(command_tx);
        response
    };

    let ((), response) = tokio::join!(h.engine.run(event_rx, command_rx), driver);
    assert!(matches!(response, CommandResponse::Session(Some(_))));
    assert_eq!(h.browser.popups().await.len(), 2);
}
