//! Stateful managers of a drag arena.
//!
//! - `dnd` - Arena aggregator: registries, scheduler, emitter, drop relay
//! - `registry` - Id-keyed hitbox and scroll edge registries
//! - `entity` - Binds a view node to a registered entity
//! - `scroll` - Scroll containers, edge strips and auto-scroll
//! - `scroll_state` - Process-wide persisted scroll offsets
//! - `sort` - Sibling reflow and drop finalization for sortable groups

pub mod dnd;
pub mod entity;
pub mod registry;
pub mod scroll;
pub mod scroll_state;
pub mod sort;

pub use dnd::DndManager;
pub use entity::{EntityManager, EntityManagerOptions};
pub use registry::EntityRegistry;
pub use scroll::{ScrollEdgeEntity, ScrollManager, ScrollManagerOptions};
pub use scroll_state::{PersistedScroll, ScrollStateManager};
pub use sort::SortManager;
