use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::id::SessionId;
use crate::types::MemberId;

/// Notifications published by the engine after it has mutated a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    SessionCreated(SessionId),
    MemberAdded { session: SessionId, member: MemberId },
    MemberRemoved { session: SessionId, member: MemberId },
    LayoutChanged { session: SessionId, layout: String },
    /// The session was torn down and `tabs` members came back as normal tabs.
    SessionRestored { session: SessionId, tabs: usize },
    SessionClosed(SessionId),
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Returns how many subscribers received the event.
    pub fn publish(&self, event: Event) -> usize {
        trace!(?event, "publishing event");
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
