//! Live entity registries of one drag arena.
//!
//! Two id-keyed collections: drop-target hitboxes and auto-scroll edges.
//! Only Entity and Scroll Managers write them; the Drag Manager reads.

use crate::entity::EntityRef;
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct EntityRegistry {
    hitboxes: RefCell<BTreeMap<String, EntityRef>>,
    scroll: RefCell<BTreeMap<String, EntityRef>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Hitbox registry
    // ------------------------------------------------------------------

    pub fn register_hitbox(&self, id: &str, entity: EntityRef) {
        self.hitboxes.borrow_mut().insert(id.to_string(), entity);
    }

    pub fn unregister_hitbox(&self, id: &str) -> Option<EntityRef> {
        self.hitboxes.borrow_mut().remove(id)
    }

    pub fn hitbox(&self, id: &str) -> Option<EntityRef> {
        self.hitboxes.borrow().get(id).cloned()
    }

    pub fn has_hitbox(&self, id: &str) -> bool {
        self.hitboxes.borrow().contains_key(id)
    }

    pub fn hitbox_ids(&self) -> Vec<String> {
        self.hitboxes.borrow().keys().cloned().collect()
    }

    /// Hitbox entities that accept the given drag type.
    pub fn hitboxes_accepting(&self, kind: &str) -> Vec<EntityRef> {
        accepting(&self.hitboxes.borrow(), kind)
    }

    // ------------------------------------------------------------------
    // Scroll registry
    // ------------------------------------------------------------------

    pub fn register_scroll(&self, id: &str, entity: EntityRef) {
        self.scroll.borrow_mut().insert(id.to_string(), entity);
    }

    pub fn unregister_scroll(&self, id: &str) -> Option<EntityRef> {
        self.scroll.borrow_mut().remove(id)
    }

    pub fn scroll(&self, id: &str) -> Option<EntityRef> {
        self.scroll.borrow().get(id).cloned()
    }

    pub fn has_scroll(&self, id: &str) -> bool {
        self.scroll.borrow().contains_key(id)
    }

    pub fn scroll_ids(&self) -> Vec<String> {
        self.scroll.borrow().keys().cloned().collect()
    }

    /// Scroll edge entities that react to the given drag type.
    pub fn scroll_accepting(&self, kind: &str) -> Vec<EntityRef> {
        accepting(&self.scroll.borrow(), kind)
    }

    /// Every registered entity of both kinds.
    pub fn all(&self) -> Vec<EntityRef> {
        let hitboxes = self.hitboxes.borrow();
        let scroll = self.scroll.borrow();
        hitboxes.values().chain(scroll.values()).cloned().collect()
    }

    pub fn clear(&self) {
        self.hitboxes.borrow_mut().clear();
        self.scroll.borrow_mut().clear();
    }
}

fn accepting(map: &BTreeMap<String, EntityRef>, kind: &str) -> Vec<EntityRef> {
    map.values()
        .filter(|entity| entity.accepts(kind))
        .cloned()
        .collect()
}
