use serde::{Deserialize, Serialize};
use splitview_common::{MemberId, SurfaceId};

/// One content source participating in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    /// The address the member was opened with.
    pub source_url: String,
    /// Where the member has navigated to since, as reported by the content
    /// side. Preferred over `source_url` whenever it is set.
    pub live_url: Option<String>,
    /// Share of the primary axis, in percent.
    pub ratio: f64,
    /// Even-spaced ordering key (0, 2, 4, ...). Odd keys belong to dividers.
    pub order: u32,
    pub surface: Option<SurfaceId>,
    pub title: Option<String>,
}

impl Member {
    pub fn new(id: MemberId, url: impl Into<String>, ratio: f64, order: u32) -> Self {
        Self {
            id,
            source_url: url.into(),
            live_url: None,
            ratio,
            order,
            surface: None,
            title: None,
        }
    }

    /// The address this member is showing right now.
    pub fn current_url(&self) -> &str {
        match self.live_url.as_deref().map(str::trim) {
            Some(live) if !live.is_empty() => live,
            _ => &self.source_url,
        }
    }

    pub fn navigate(&mut self, url: impl Into<String>) {
        self.live_url = Some(url.into());
    }

    /// Swap the content in place. Ratio, order and surface are untouched.
    pub fn replace_source(&mut self, url: impl Into<String>) {
        self.source_url = url.into();
        self.live_url = None;
        self.title = None;
    }
}
