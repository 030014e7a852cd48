//! The session store: the single source of truth for one split.
//!
//! Every mutation goes through `Session` and either applies completely or
//! returns a `SessionError` with the session untouched. Members are kept in
//! visual order and their order keys are re-derived from that order after
//! every structural change.

mod focus;
mod operations;
mod types;

pub use types::*;
