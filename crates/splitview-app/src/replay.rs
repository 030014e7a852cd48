//! Dry runs of the reconcile engine.
//!
//! A script is JSON lines, one step per line:
//!
//! ```text
//! {"command": {"action": "create-split", "window": 1, "urls": ["https://a.example", "https://b.example"]}}
//! {"event": {"type": "window-bounds-changed", "window": 1, "bounds": {"x": 50, "y": 0, "width": 1000, "height": 800}}}
//! {"wait": {"ms": 150}}
//! ```
//!
//! The in-memory browser starts with window 1 (1200x840) holding tab 2.
//! With persistence enabled, snapshots go to memory only.
//! Blank lines and lines starting with `#` are skipped.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use splitview_common::{Rect, Result, SplitviewError};
use splitview_config::SplitviewConfig;
use splitview_engine::{BrowserEvent, MemoryBrowser, MemoryStorage, ReconcileEngine, SnapshotStorage, SplitCommand};
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum Step {
    Command(SplitCommand),
    Event(BrowserEvent),
    /// Let time pass, then run any debounced work that came due.
    Wait { ms: u64 },
}

pub async fn replay(script: &str, config: SplitviewConfig) -> Result<Vec<String>> {
    let browser = MemoryBrowser::new();
    let window = browser.open_window(Rect::new(0.0, 0.0, 1200.0, 840.0)).await;
    browser.open_tab(window, "about:newtab").await?;
    let storage = Arc::new(MemoryStorage::new());
    let persist = config.persistence.enabled;
    let mut engine = ReconcileEngine::new(Arc::new(browser.clone()), config);
    if persist {
        engine = engine.with_storage(storage.clone());
    }

    let mut output = Vec::new();
    for (number, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step: Step = serde_json::from_str(line)
            .map_err(|e| SplitviewError::Other(format!("line {}: {e}", number + 1)))?;
        debug!(line = number + 1, ?step, "replaying");

        match step {
            Step::Command(command) => match command.execute(&mut engine).await {
                Ok(response) => output.push(
                    serde_json::to_string(&response)
                        .map_err(|e| SplitviewError::Other(format!("line {}: {e}", number + 1)))?,
                ),
                Err(e) => output.push(format!("error: {e}")),
            },
            Step::Event(event) => {
                engine.handle_event(event).await;
                output.push("event applied".to_string());
            }
            Step::Wait { ms } => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                let ran = engine.run_due().await;
                output.push(format!("ran {ran} debounced task(s)"));
            }
        }
    }

    for controller in engine.repository().iter() {
        output.push(format!(
            "session {} ({}) anchored at {}:",
            controller.session.id(),
            controller.session.layout(),
            controller.anchor_tab
        ));
        for popup in controller.windows() {
            if let Some(info) = browser.window(popup).await {
                let b = info.bounds;
                output.push(format!(
                    "  {popup} {} at ({}, {}) {}x{}",
                    info.active_url.unwrap_or_default(),
                    b.x,
                    b.y,
                    b.width,
                    b.height
                ));
            }
        }
    }
    if let Some(snapshot) = storage.load().await? {
        output.push(format!("persisted {} controller(s)", snapshot.controllers.len()));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replay_creates_and_reports() {
        let script = r#"
# two panes side by side
{"command": {"action": "create-split", "window": 1, "urls": ["https://a.example/", "https://b.example/"]}}
{"wait": {"ms": 0}}
"#;
        let lines = replay(script, SplitviewConfig::default()).await.unwrap();
        assert!(lines[0].starts_with(r#"{"result":"session""#));
        assert_eq!(lines[1], "ran 0 debounced task(s)");
        assert!(lines[2].starts_with("session "));
        assert!(lines[3].contains("https://a.example/ at (0, 40) 600x800"));
        assert!(lines[4].contains("at (600, 40) 600x800"));
        assert_eq!(lines[5], "persisted 1 controller(s)");
    }

    #[tokio::test]
    async fn command_errors_are_reported_inline() {
        let script = r#"{"command": {"action": "get-current-urls", "session": "nope"}}"#;
        let lines = replay(script, SplitviewConfig::default()).await.unwrap();
        assert_eq!(lines, vec!["error: session not found: nope".to_string()]);
    }

    #[tokio::test]
    async fn malformed_line_names_its_number() {
        let err = replay("\n{\"bogus\": 1}", SplitviewConfig::default()).await.unwrap_err();
        assert!(err.to_string().starts_with("line 2:"));
    }
}
