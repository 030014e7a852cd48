pub mod binding;
pub mod codec;
pub mod dividers;
pub mod drag;
pub mod lifecycle;
pub mod member;
pub mod mode;
pub mod session;
pub mod size;

pub use binding::{EmbeddedBinding, SurfaceBinding};
pub use codec::EncodedState;
pub use drag::{DragState, GridSplit};
pub use lifecycle::MemberLifecycle;
pub use member::Member;
pub use mode::{layout_plan, LayoutMode, LayoutPlan};
pub use session::{InsertPosition, MoveDirection, RemoveOutcome, Session};
pub use size::{Geometry, Placement};
