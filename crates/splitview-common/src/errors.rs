use std::path::PathBuf;

use crate::id::SessionId;
use crate::types::MemberId;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Rejected state transitions on a split session. These are checked at the
/// mutation boundary, so the session is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("a split needs between 2 and 4 sources, got {0}")]
    InvalidSourceCount(usize),

    #[error("session already holds the maximum of {0} members")]
    SessionFull(usize),

    #[error("cannot remove the last member of a session")]
    LastMember,

    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("grid layout requires exactly 4 members, session has {0}")]
    GridRequiresFourMembers(usize),

    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The tab, window or frame no longer exists. Callers treat this as
    /// "already gone" and carry on with the remaining work.
    #[error("surface is gone: {0}")]
    SurfaceGone(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("not supported: {0}")]
    NotSupported(String),
}

impl PlatformError {
    pub fn is_gone(&self) -> bool {
        matches!(self, PlatformError::SurfaceGone(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("snapshot encode error: {0}")]
    Encode(String),

    #[error("snapshot decode error: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SplitviewError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
