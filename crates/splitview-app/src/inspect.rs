//! Read-only inspection commands.

use std::path::PathBuf;

use serde_json::json;
use splitview_common::{Rect, Result, SplitviewError};
use splitview_config::SplitviewConfig;
use splitview_engine::{FileStorage, SnapshotStorage};
use splitview_layout::dividers::compute_dividers;
use splitview_layout::size::DIVIDER_THICKNESS_PX;
use splitview_layout::{layout_plan, EncodedState, Session};

fn decode_state(state: &str) -> Result<(EncodedState, Session)> {
    let encoded = EncodedState::parse(state).map_err(|e| SplitviewError::Other(format!("invalid state: {e}")))?;
    let session = encoded.decode()?;
    Ok((encoded, session))
}

/// The normalized form of an encoded state, as it would be re-encoded.
pub fn decode(state: &str) -> Result<serde_json::Value> {
    let (encoded, session) = decode_state(state)?;
    let mut normalized = EncodedState::from_session(&session);
    normalized.titles = encoded.titles.clone();
    Ok(json!({
        "state": normalized,
        "title": encoded.combined_title(),
    }))
}

pub fn plan(state: &str, width: f64, height: f64) -> Result<serde_json::Value> {
    let (_, session) = decode_state(state)?;
    let container = Rect::new(0.0, 0.0, width, height);
    let plan = layout_plan(&session);

    let panes: Vec<serde_json::Value> = plan
        .panes
        .iter()
        .filter_map(|(member, geometry)| {
            let bounds = geometry.resolve(container, DIVIDER_THICKNESS_PX)?;
            let url = session.member(*member).map(|m| m.current_url().to_string());
            Some(json!({ "member": member, "url": url, "bounds": bounds }))
        })
        .collect();
    let dividers: Vec<serde_json::Value> = compute_dividers(&session, container, DIVIDER_THICKNESS_PX)
        .iter()
        .map(|d| json!({ "direction": d.direction, "position": d.position, "start": d.start, "end": d.end }))
        .collect();

    Ok(json!({
        "layout": plan.mode,
        "panes": panes,
        "dividers": dividers,
    }))
}

pub async fn snapshot(path: Option<PathBuf>, config: &SplitviewConfig) -> Result<Vec<String>> {
    let path = path
        .or_else(|| config.persistence.resolved_path())
        .ok_or_else(|| SplitviewError::Other("no snapshot path configured".into()))?;
    let storage = FileStorage::new(&path);
    let Some(snapshot) = storage.load().await? else {
        return Ok(vec![format!("{}: no snapshot", path.display())]);
    };

    let mut lines = vec![format!(
        "{}: version {}, {} controller(s)",
        path.display(),
        snapshot.version,
        snapshot.controllers.len()
    )];
    for record in &snapshot.controllers {
        let ratios: Vec<String> = record
            .ratio_percents()
            .iter()
            .map(|r| format!("{r:.1}%"))
            .collect();
        lines.push(format!(
            "  anchor {} at index {}: {} popup(s), layout {}, ratios [{}]",
            record.anchor_id,
            record.anchor_index,
            record.member_surface_ids.len(),
            record.layout.unwrap_or_default(),
            ratios.join(", ")
        ));
    }
    Ok(lines)
}
