pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, PersistenceError, PlatformError, SessionError, SplitviewError};
pub use events::{Event, EventBus};
pub use id::{new_id, SessionId};
pub use types::{GroupId, MemberId, Rect, SurfaceId, TabId, WindowId};

pub type Result<T> = std::result::Result<T, SplitviewError>;
