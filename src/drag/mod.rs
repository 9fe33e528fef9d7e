//! Pointer-driven drag handling.
//!
//! ## Architecture
//!
//! [`DragManager`] owns a single explicit state machine ([`DragState`]) for
//! the one in-flight drag of a scope. Every transition is published through
//! the scope's emitter as a [`DragEventKind`] carrying a [`DragSnapshot`].
//!
//! ## Modules
//!
//! - `state` - Drag state enum and session data
//! - `snapshot` - Event payload and its serializable summary
//! - `manager` - Pointer handling, intersection passes, HTML drags

mod manager;
mod snapshot;
mod state;

pub use manager::DragManager;
pub use snapshot::{DragEmitter, DragEventKind, DragSnapshot, DragSummary};
pub use state::{DragSession, DragState};
