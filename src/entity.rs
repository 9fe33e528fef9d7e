//! Entities: the unit of spatial registration.
//!
//! An entity is anything the drag engine can hit test: a managed view node
//! (see [`crate::managers::EntityManager`]), one of the four edge strips of a
//! scroll container, or the throwaway entity synthesized for drags that
//! start outside the board.
//!
//! Entities are shared as [`EntityRef`] and only ever addressed by id; the
//! registries may reorder freely without invalidating a held reference.

use crate::types::{EntityData, Hitbox, Margins};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Shared handle to a registered entity.
pub type EntityRef = Rc<dyn Entity>;

/// A registered spatial unit.
pub trait Entity {
    /// Drag arena this entity belongs to
    fn scope_id(&self) -> &str;

    /// Id, unique within the scope
    fn entity_id(&self) -> &str;

    /// Hitbox in document coordinates, captured at the last measurement
    fn initial(&self) -> Hitbox;

    /// Hitbox in live viewport coordinates (initial adjusted for scroll)
    fn hitbox(&self) -> Hitbox;

    /// Sibling indices from the root of the nesting tree to this entity
    fn path(&self) -> Vec<usize>;

    /// Current data payload
    fn data(&self) -> EntityData;

    /// Re-measure `initial` from the live visual node
    fn recalc_initial(&self);

    /// Outer margins of the node that moves when dragged
    fn margins(&self) -> Margins {
        Margins::default()
    }

    fn accepts(&self, kind: &str) -> bool {
        self.data().accepts_type(kind)
    }
}

/// Identity comparison: same scope and same id.
pub fn same_entity(a: &dyn Entity, b: &dyn Entity) -> bool {
    a.scope_id() == b.scope_id() && a.entity_id() == b.entity_id()
}

impl fmt::Debug for dyn Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("scope_id", &self.scope_id())
            .field("entity_id", &self.entity_id())
            .field("initial", &self.initial())
            .finish()
    }
}

// ============================================================================
// Pointer Entity
// ============================================================================

/// Throwaway entity anchored to the pointer, used for drags that originate
/// outside the tracked entity set (files, plain text).
pub struct PointerEntity {
    scope_id: String,
    entity_id: String,
    initial: Cell<Hitbox>,
    data: RefCell<EntityData>,
}

impl PointerEntity {
    pub fn new(scope_id: impl Into<String>, entity_id: impl Into<String>, hitbox: Hitbox, data: EntityData) -> Self {
        Self {
            scope_id: scope_id.into(),
            entity_id: entity_id.into(),
            initial: Cell::new(hitbox),
            data: RefCell::new(data),
        }
    }

    /// Attach content handed over by the external drop.
    pub fn set_payload(&self, payload: Value) {
        let mut data = self.data.borrow_mut();
        match payload {
            Value::Null => {}
            Value::Object(map) => data.payload.extend(map),
            other => {
                data.payload.insert("content".to_string(), other);
            }
        }
    }
}

impl Entity for PointerEntity {
    fn scope_id(&self) -> &str {
        &self.scope_id
    }

    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn initial(&self) -> Hitbox {
        self.initial.get()
    }

    fn hitbox(&self) -> Hitbox {
        self.initial.get()
    }

    fn path(&self) -> Vec<usize> {
        Vec::new()
    }

    fn data(&self) -> EntityData {
        self.data.borrow().clone()
    }

    fn recalc_initial(&self) {}
}
