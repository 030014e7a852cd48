//! Encoded session state.
//!
//! A split that travels between processes (or inside its own address) is
//! carried as one JSON record. Decoding never fails on bad ratios or an
//! unknown layout; it falls back to equal shares and the default layout.

use serde::{Deserialize, Serialize};
use splitview_common::{SessionError, SessionId};
use url::Url;

use crate::member::Member;
use crate::mode::LayoutMode;
use crate::session::{Session, MAX_MEMBERS};
use crate::size::validated_ratios;

/// Title used when no member has anything better to offer.
pub const DEFAULT_TITLE: &str = "Split";

const TITLE_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EncodedState {
    #[serde(default)]
    pub urls: Vec<String>,
    /// Omitted in grid mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ratios: Vec<f64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub layout: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titles: Option<Vec<String>>,
}

impl EncodedState {
    pub fn from_session(session: &Session) -> Self {
        let layout = session.layout();
        let ratios = if layout == LayoutMode::Grid {
            Vec::new()
        } else {
            session.ratios()
        };
        let titles: Vec<String> = session.members().iter().map(member_title).collect();
        Self {
            urls: session.current_urls(),
            ratios,
            layout: layout.as_str().to_string(),
            titles: Some(titles),
        }
    }

    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Layout to open with. Four urls without an explicit linear layout
    /// open as a grid.
    pub fn layout_mode(&self) -> LayoutMode {
        match self.layout.parse::<LayoutMode>() {
            Ok(mode) if mode.is_linear() => mode,
            _ if self.urls.len() == MAX_MEMBERS => LayoutMode::Grid,
            _ => LayoutMode::Horizontal,
        }
    }

    /// Ratios to open with, equal shares when the stored ones are unusable.
    pub fn effective_ratios(&self) -> Vec<f64> {
        validated_ratios(&self.ratios, self.urls.len())
    }

    pub fn decode(&self) -> Result<Session, SessionError> {
        let mut session = Session::rebuild(SessionId::new(), &self.urls, &self.effective_ratios(), self.layout_mode())?;
        if let Some(titles) = &self.titles {
            let ids: Vec<_> = session.members().iter().map(|m| m.id).collect();
            for (id, title) in ids.into_iter().zip(titles) {
                if !title.trim().is_empty() {
                    session.set_title(id, title.trim())?;
                }
            }
        }
        Ok(session)
    }

    pub fn combined_title(&self) -> String {
        combine_titles(self.titles.iter().flatten().map(String::as_str))
    }
}

/// The title shown for a split: member titles joined, or `DEFAULT_TITLE`.
pub fn session_title(session: &Session) -> String {
    let titles: Vec<String> = session.members().iter().map(member_title).collect();
    combine_titles(titles.iter().map(String::as_str))
}

fn combine_titles<'a>(titles: impl Iterator<Item = &'a str>) -> String {
    let parts: Vec<&str> = titles.map(str::trim).filter(|t| !t.is_empty()).collect();
    if parts.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        parts.join(TITLE_SEPARATOR)
    }
}

/// A member's reported title, else the host of what it shows.
pub fn member_title(member: &Member) -> String {
    if let Some(title) = member.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        return title.to_string();
    }
    let url = member.current_url();
    host_of(url).unwrap_or_else(|| url.to_string())
}

fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().filter(|h| !h.is_empty()).map(str::to_string)
}
