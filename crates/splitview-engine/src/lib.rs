//! Popup-window realization of split sessions.
//!
//! Each split is owned by a [`Controller`]: an anchor tab standing in for the
//! split plus one popup window per member, tiled over the anchor's browser
//! window. The [`ReconcileEngine`] consumes browser events and keeps those
//! windows, the session store and the persisted snapshot consistent.

pub mod browser;
pub mod commands;
pub mod controller;
pub mod debounce;
pub mod engine;
pub mod guard;
pub mod memory;
pub mod persistence;
pub mod popup;
pub mod repository;
pub mod resize;

pub use browser::{Browser, BrowserEvent, NewTab, TabInfo, TabQuery, WindowInfo, WindowKind, WindowState, WindowUpdate};
pub use commands::{CommandResponse, SplitCommand};
pub use controller::Controller;
pub use engine::{CommandRequest, ReconcileEngine, RestoreReport};
pub use memory::MemoryBrowser;
pub use persistence::{FileStorage, MemoryStorage, PersistedController, Snapshot, SnapshotStorage};
pub use popup::PopupBinding;
pub use repository::ControllerRepository;
