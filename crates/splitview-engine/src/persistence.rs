//! Controller snapshots that survive a restart of the background process.
//!
//! The whole set of controller records is written after every mutation.
//! Loading is lenient: unknown fields are ignored, missing ones take their
//! defaults and a record that cannot be read at all is dropped on its own
//! without failing the rest of the snapshot.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use splitview_common::{GroupId, PersistenceError, SessionId, TabId, WindowId};
use splitview_layout::{GridSplit, LayoutMode};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::controller::Controller;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Group id meaning "not in a tab group".
pub const NO_GROUP: i64 = -1;

// =============================================================================
// RECORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedController {
    pub anchor_id: TabId,
    #[serde(default)]
    pub parent_surface_id: Option<WindowId>,
    #[serde(default)]
    pub member_surface_ids: Vec<WindowId>,
    #[serde(default)]
    pub member_order: Vec<u32>,
    #[serde(default = "no_group")]
    pub member_group_id: i64,
    /// Each member's share of the parent width as a fraction; sums to 1.0.
    #[serde(default)]
    pub width_ratios: BTreeMap<WindowId, f64>,
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub anchor_index: u32,
    /// Member URLs aligned with `member_surface_ids`. Used only when a
    /// popup can no longer be asked for its URL.
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub layout: Option<LayoutMode>,
    #[serde(default)]
    pub grid: Option<GridSplit>,
    /// Linear mode a grid returns to when it loses a member.
    #[serde(default)]
    pub last_linear: Option<LayoutMode>,
}

fn no_group() -> i64 {
    NO_GROUP
}

impl PersistedController {
    pub fn from_controller(controller: &Controller) -> Self {
        let session = &controller.session;
        let members = session.members();
        Self {
            anchor_id: controller.anchor_tab,
            parent_surface_id: Some(controller.parent_window),
            member_surface_ids: controller.windows(),
            member_order: members.iter().filter(|m| m.surface.is_some()).map(|m| m.order).collect(),
            member_group_id: controller.group.map_or(NO_GROUP, |g| g.0),
            width_ratios: controller.width_ratios(),
            session_id: Some(session.id().clone()),
            anchor_index: controller.anchor_index,
            urls: members
                .iter()
                .filter(|m| m.surface.is_some())
                .map(|m| m.current_url().to_string())
                .collect(),
            layout: Some(session.layout()),
            grid: Some(session.grid()),
            last_linear: Some(session.last_linear()),
        }
    }

    pub fn group(&self) -> Option<GroupId> {
        (self.member_group_id >= 0).then_some(GroupId(self.member_group_id))
    }

    /// Keep only the popups in `alive`, with the aligned lists trimmed to
    /// match and the width ratios renormalized over the survivors. Returns
    /// how many popups were dropped. Applying it twice changes nothing.
    pub fn retain_surfaces(&mut self, alive: &HashSet<WindowId>) -> usize {
        let keep: Vec<bool> = self.member_surface_ids.iter().map(|w| alive.contains(w)).collect();
        let dropped = keep.iter().filter(|k| !**k).count();
        retain_aligned(&mut self.member_surface_ids, &keep);
        retain_aligned(&mut self.member_order, &keep);
        retain_aligned(&mut self.urls, &keep);
        self.width_ratios = normalized_fractions(&self.member_surface_ids, &self.width_ratios);
        dropped
    }

    /// Put the popups (and their URLs) in visual order by `member_order`.
    /// Lists that are not aligned with the popups are left as they are.
    pub fn sort_by_member_order(&mut self) {
        let n = self.member_surface_ids.len();
        if self.member_order.len() != n {
            return;
        }
        let mut positions: Vec<usize> = (0..n).collect();
        positions.sort_by_key(|&i| self.member_order[i]);
        self.member_surface_ids = positions.iter().map(|&i| self.member_surface_ids[i]).collect();
        if self.urls.len() == n {
            self.urls = positions.iter().map(|&i| self.urls[i].clone()).collect();
        }
        self.member_order = positions.iter().map(|&i| self.member_order[i]).collect();
    }

    /// Width ratios as percentages in member order.
    pub fn ratio_percents(&self) -> Vec<f64> {
        self.member_surface_ids
            .iter()
            .map(|w| self.width_ratios.get(w).copied().unwrap_or(0.0) * 100.0)
            .collect()
    }
}

/// Drop entries whose `keep` flag is false. Lists that are not aligned with
/// `keep` are left alone.
fn retain_aligned<T>(items: &mut Vec<T>, keep: &[bool]) {
    if items.len() != keep.len() {
        return;
    }
    let mut flags = keep.iter();
    items.retain(|_| flags.next().copied().unwrap_or(false));
}

fn normalized_fractions(windows: &[WindowId], ratios: &BTreeMap<WindowId, f64>) -> BTreeMap<WindowId, f64> {
    if windows.is_empty() {
        return BTreeMap::new();
    }
    let values: Option<Vec<f64>> = windows
        .iter()
        .map(|w| ratios.get(w).copied().filter(|r| r.is_finite() && *r > 0.0))
        .collect();
    let sum: f64 = values.as_ref().map_or(0.0, |v| v.iter().sum());
    match values {
        Some(values) if sum > 0.0 => windows.iter().zip(values).map(|(w, r)| (*w, r / sum)).collect(),
        _ => {
            let share = 1.0 / windows.len() as f64;
            windows.iter().map(|w| (*w, share)).collect()
        }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub version: u32,
    pub controllers: Vec<PersistedController>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            controllers: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    controllers: Vec<serde_json::Value>,
}

impl Snapshot {
    pub fn from_controllers<'a>(controllers: impl IntoIterator<Item = &'a Controller>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            controllers: controllers.into_iter().map(PersistedController::from_controller).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(self).map_err(|e| PersistenceError::Encode(e.to_string()))
    }

    /// Parse a snapshot, skipping records that cannot be read.
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let raw: RawSnapshot = serde_json::from_str(json).map_err(|e| PersistenceError::Decode(e.to_string()))?;
        let controllers = raw
            .controllers
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<PersistedController>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "dropping unreadable controller record");
                    None
                }
            })
            .collect();
        Ok(Self {
            version: raw.version.unwrap_or(SNAPSHOT_VERSION),
            controllers,
        })
    }
}

// =============================================================================
// STORAGE
// =============================================================================

#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<Snapshot>, PersistenceError>;

    async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError>;
}

/// Keeps the serialized snapshot in memory, like the browser's
/// session-scoped storage area.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    contents: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(json: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(json.into())),
        }
    }

    pub async fn contents(&self) -> Option<String> {
        self.contents.lock().await.clone()
    }
}

#[async_trait]
impl SnapshotStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        match self.contents.lock().await.as_deref() {
            Some(json) => Snapshot::from_json(json).map(Some),
            None => Ok(None),
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let json = snapshot.to_json()?;
        *self.contents.lock().await = Some(json);
        Ok(())
    }
}

/// JSON file on disk. Writes go to a sibling temp file first and are then
/// renamed over the target.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_error(path: &Path, e: std::io::Error) -> PersistenceError {
    PersistenceError::Storage(format!("{}: {e}", path.display()))
}

#[async_trait]
impl SnapshotStorage for FileStorage {
    async fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => Snapshot::from_json(&json).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot file");
                Ok(None)
            }
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let json = snapshot.to_json()?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(parent, e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(|e| storage_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| storage_error(&self.path, e))?;
        debug!(path = %self.path.display(), controllers = snapshot.controllers.len(), "snapshot saved");
        Ok(())
    }
}
