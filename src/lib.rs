//! Humanboard drag-and-drop engine.
//!
//! Framework-agnostic hit testing, drag tracking, sibling reflow and
//! auto-scroll for nested, scrollable board layouts. The host supplies
//! view nodes through the traits in [`node`], pumps animation frames
//! through [`DndManager::run_frame`], and forwards pointer, scroll, resize
//! and visibility notifications.
//!
//! ## Architecture
//!
//! ```text
//! DndManager (one per arena)
//!   |- EntityRegistry      hitbox + scroll edge entities, by id
//!   |- DragManager         pointer state machine, intersection passes
//!   |- Emitter             drag events, global or scoped to an entity id
//!   `- Scheduler           animation frames and timers
//! EntityManager   one per draggable/droppable node
//! ScrollManager   one per scroll container, owns four edge entities
//! SortManager     one per sortable group, reflows siblings
//! ```

pub mod config;
pub mod constants;
pub mod drag;
pub mod emitter;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod managers;
pub mod node;
pub mod perf;
pub mod scheduler;
pub mod spatial_index;
pub mod types;

pub use config::DndConfig;
pub use drag::{DragEventKind, DragManager, DragSnapshot, DragState, DragSummary};
pub use emitter::{Emitter, ListenerId};
pub use entity::{Entity, EntityRef, PointerEntity};
pub use error::{DndError, DndResult};
pub use managers::{
    DndManager, EntityManager, EntityManagerOptions, ScrollManager, ScrollManagerOptions,
    ScrollStateManager, SortManager,
};
pub use node::{EntityNodes, NodeRef, ScrollNode, ScrollNodeRef, VisualNode};
pub use scheduler::{Debouncer, NodeProbe, Scheduler};
pub use types::{
    Axis, CoordinateShift, EntityData, Hitbox, Margins, ObserverKey, Point, Rect, ScrollMetrics,
    ScrollState, Side, Size, Transition,
};
