//! Message-style calls from UI and content collaborators.
//!
//! Commands arrive as JSON objects tagged by `action`, for example
//! `{"action": "insert-member", "session": "...", "position": {"at": "tail"}, "url": "..."}`.

use serde::{Deserialize, Serialize};
use splitview_common::{MemberId, Result, SessionId, WindowId};
use splitview_layout::{InsertPosition, LayoutMode, MoveDirection, RemoveOutcome};

use crate::engine::ReconcileEngine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum SplitCommand {
    CreateSplit {
        window: WindowId,
        urls: Vec<String>,
        #[serde(default)]
        layout: Option<LayoutMode>,
    },
    SplitHighlighted {
        window: WindowId,
    },
    InsertMember {
        session: SessionId,
        position: InsertPosition,
        url: String,
    },
    RemoveMember {
        session: SessionId,
        member: MemberId,
    },
    MoveMember {
        session: SessionId,
        member: MemberId,
        direction: MoveDirection,
    },
    ReplaceRight {
        session: SessionId,
        member: MemberId,
        url: String,
    },
    SetLayoutMode {
        session: SessionId,
        mode: LayoutMode,
    },
    ToggleLayout {
        session: SessionId,
    },
    ToggleExpand {
        session: SessionId,
        member: MemberId,
    },
    ReportNavigation {
        session: SessionId,
        member: MemberId,
        url: String,
    },
    GetCurrentUrls {
        session: SessionId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", content = "value", rename_all = "kebab-case")]
pub enum CommandResponse {
    Session(Option<SessionId>),
    Member(MemberId),
    Removed { remaining: usize },
    Urls(Vec<String>),
    Changed(bool),
    Done,
}

impl SplitCommand {
    pub fn parse(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub async fn execute(self, engine: &mut ReconcileEngine) -> Result<CommandResponse> {
        let response = match self {
            SplitCommand::CreateSplit { window, urls, layout } => {
                CommandResponse::Session(Some(engine.create_split(window, &urls, layout).await?))
            }
            SplitCommand::SplitHighlighted { window } => {
                CommandResponse::Session(engine.split_highlighted(window).await?)
            }
            SplitCommand::InsertMember { session, position, url } => {
                CommandResponse::Member(engine.insert_member(&session, position, &url).await?)
            }
            SplitCommand::RemoveMember { session, member } => {
                let remaining = match engine.remove_member(&session, member).await? {
                    RemoveOutcome::Remaining(n) => n,
                    RemoveOutcome::SingleSurvivor(_) => 1,
                };
                CommandResponse::Removed { remaining }
            }
            SplitCommand::MoveMember {
                session,
                member,
                direction,
            } => CommandResponse::Changed(engine.move_member(&session, member, direction).await?),
            SplitCommand::ReplaceRight { session, member, url } => {
                CommandResponse::Member(engine.replace_right(&session, member, &url).await?)
            }
            SplitCommand::SetLayoutMode { session, mode } => {
                CommandResponse::Changed(engine.set_layout_mode(&session, mode).await?)
            }
            SplitCommand::ToggleLayout { session } => CommandResponse::Changed(engine.toggle_layout(&session).await?),
            SplitCommand::ToggleExpand { session, member } => {
                CommandResponse::Changed(engine.toggle_expand(&session, member).await?)
            }
            SplitCommand::ReportNavigation { session, member, url } => {
                engine.report_navigation(&session, member, &url).await?;
                CommandResponse::Done
            }
            SplitCommand::GetCurrentUrls { session } => CommandResponse::Urls(engine.get_current_urls(&session)?),
        };
        Ok(response)
    }
}
