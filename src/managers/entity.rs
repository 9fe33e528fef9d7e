//! Entity Manager - binds one view node to a registered hitbox entity.
//!
//! Lifecycle:
//!
//! ```text
//! new()         -> wait (per frame) until the host mounts the nodes
//! nodes ready   -> measure, join parent, join sort group
//!   no scroll parent   -> visible, registered
//!   with scroll parent -> registered only while the host reports the
//!                         node intersecting the container viewport
//! destroy()     -> unregister everything, leave parent and sort group
//! ```
//!
//! Nesting forms a tree: an entity is registered only while it and every
//! ancestor are visible, and hiding an entity unregisters its subtree.

use super::dnd::DndManager;
use super::scroll::ScrollManager;
use super::sort::SortManager;
use crate::entity::{Entity, EntityRef};
use crate::geometry::{adjust_hitbox, calculate_hitbox};
use crate::node::EntityNodes;
use crate::scheduler::NodeProbe;
use crate::types::{EntityData, Hitbox, Margins, ObserverKey};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// Construction options for an [`EntityManager`].
pub struct EntityManagerOptions {
    /// Entity id, unique within the arena
    pub entity_id: String,
    /// Position among its siblings
    pub index: usize,
    /// Enclosing entity, if nested
    pub parent: Option<Rc<EntityManager>>,
    /// Nearest enclosing scroll container
    pub scroll_parent: Option<Rc<ScrollManager>>,
    /// Sortable group this entity belongs to
    pub sort_manager: Option<Rc<SortManager>>,
    /// Yields the entity and measure nodes once mounted
    pub nodes: NodeProbe<EntityNodes>,
    /// Current data payload
    pub get_data: Rc<dyn Fn() -> EntityData>,
}

pub struct EntityManager {
    dnd: Rc<DndManager>,
    entity_id: String,
    index: Cell<usize>,
    parent: Option<Rc<EntityManager>>,
    scroll_parent: Option<Rc<ScrollManager>>,
    sort_manager: Option<Rc<SortManager>>,
    get_data: Rc<dyn Fn() -> EntityData>,
    nodes: RefCell<Option<EntityNodes>>,
    entity: RefCell<Option<Rc<ManagedEntity>>>,
    children: RefCell<BTreeMap<String, Weak<EntityManager>>>,
    is_visible: Cell<bool>,
    destroyed: Cell<bool>,
    weak_self: Weak<EntityManager>,
}

impl EntityManager {
    pub fn new(dnd: &Rc<DndManager>, options: EntityManagerOptions) -> Rc<Self> {
        let EntityManagerOptions {
            entity_id,
            index,
            parent,
            scroll_parent,
            sort_manager,
            nodes,
            get_data,
        } = options;

        let manager = Rc::new_cyclic(|weak_self| Self {
            dnd: dnd.clone(),
            entity_id,
            index: Cell::new(index),
            parent,
            scroll_parent,
            sort_manager,
            get_data,
            nodes: RefCell::new(None),
            entity: RefCell::new(None),
            children: RefCell::new(BTreeMap::new()),
            is_visible: Cell::new(false),
            destroyed: Cell::new(false),
            weak_self: weak_self.clone(),
        });

        let alive = Rc::downgrade(&manager);
        let ready = Rc::downgrade(&manager);
        dnd.scheduler().when_ready(
            nodes,
            move || alive.upgrade().is_some_and(|manager| !manager.destroyed.get()),
            move |nodes| {
                if let Some(manager) = ready.upgrade() {
                    manager.init_nodes(nodes);
                }
            },
        );

        manager
    }

    fn init_nodes(&self, nodes: EntityNodes) {
        let entity = Rc::new(ManagedEntity {
            scope_id: self.dnd.scope_id().to_string(),
            entity_id: self.entity_id.clone(),
            manager: self.weak_self.clone(),
            initial: Cell::new(Hitbox::default()),
        });
        *self.nodes.borrow_mut() = Some(nodes.clone());
        *self.entity.borrow_mut() = Some(entity.clone());
        entity.recalc_initial();

        if let Some(parent) = &self.parent {
            parent
                .children
                .borrow_mut()
                .insert(self.entity_id.clone(), self.weak_self.clone());
        }
        if let Some(sort_manager) = &self.sort_manager {
            sort_manager.register_sortable(&self.entity_id, entity.clone(), nodes);
        }

        let weak = self.weak_self.clone();
        self.dnd.observe_resize(ObserverKey::entity(self.entity_id.clone()), move || {
            if let Some(manager) = weak.upgrade() {
                manager.recalc();
            }
        });

        match &self.scroll_parent {
            Some(scroll_parent) => {
                let weak = self.weak_self.clone();
                scroll_parent.observe_visibility(ObserverKey::entity(self.entity_id.clone()), move |visible| {
                    if let Some(manager) = weak.upgrade() {
                        manager.set_visibility(visible);
                    }
                });
            }
            None => self.set_visibility(true),
        }

        trace!(id = %self.entity_id, path = ?self.path(), "Entity ready");
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// The registered entity, once nodes have mounted.
    pub fn entity(&self) -> Option<EntityRef> {
        self.entity
            .borrow()
            .clone()
            .map(|entity| entity as EntityRef)
    }

    pub fn is_ready(&self) -> bool {
        self.entity.borrow().is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible.get()
    }

    /// Visible itself and through every ancestor.
    pub fn is_effectively_visible(&self) -> bool {
        self.is_visible.get()
            && self
                .parent
                .as_ref()
                .is_none_or(|parent| parent.is_effectively_visible())
    }

    /// Sibling indices from the root entity to this one.
    pub fn path(&self) -> Vec<usize> {
        let mut path = self
            .parent
            .as_ref()
            .map(|parent| parent.path())
            .unwrap_or_default();
        path.push(self.index.get());
        path
    }

    /// Host notification: the entity moved among its siblings.
    pub fn set_index(&self, index: usize) {
        self.index.set(index);
    }

    /// Current data, with the sort group's axis filled in.
    pub fn data(&self) -> EntityData {
        let mut data = (self.get_data)();
        if let Some(sort_manager) = &self.sort_manager {
            data.sort_axis = Some(sort_manager.axis());
        }
        data
    }

    pub fn children_ids(&self) -> Vec<String> {
        self.children.borrow().keys().cloned().collect()
    }

    fn live_children(&self) -> Vec<Rc<EntityManager>> {
        self.children
            .borrow()
            .values()
            .filter_map(Weak::upgrade)
            .collect()
    }

    // ========================================================================
    // Measurement
    // ========================================================================

    /// Re-measure the hitbox from the measure node.
    pub fn recalc(&self) {
        let Some(measure) = self.nodes.borrow().as_ref().map(|nodes| nodes.measure.clone()) else {
            return;
        };
        let Some(entity) = self.entity.borrow().clone() else {
            return;
        };
        let (scroll, shift) = match &self.scroll_parent {
            Some(scroll_parent) => (Some(scroll_parent.scroll_state()), Some(scroll_parent.scroll_shift())),
            None => (None, None),
        };
        entity
            .initial
            .set(calculate_hitbox(measure.bounding_rect(), scroll, shift, None));
    }

    fn live_hitbox(&self, initial: Hitbox) -> Hitbox {
        match &self.scroll_parent {
            Some(scroll_parent) => adjust_hitbox(
                initial,
                Some(scroll_parent.scroll_state()),
                Some(scroll_parent.scroll_shift()),
            ),
            None => initial,
        }
    }

    fn margins(&self) -> Margins {
        self.nodes
            .borrow()
            .as_ref()
            .map(|nodes| nodes.entity.margins())
            .unwrap_or_default()
    }

    // ========================================================================
    // Visibility & Registration
    // ========================================================================

    fn set_visibility(&self, visible: bool) {
        if self.destroyed.get() {
            return;
        }
        self.is_visible.set(visible);

        if visible {
            self.recalc();
            if self.is_effectively_visible() {
                self.register_subtree();
            }
        } else {
            self.unregister_subtree();
        }
    }

    /// Register this entity and every effectively visible descendant.
    fn register_subtree(&self) {
        if let Some(entity) = self.entity.borrow().clone() {
            self.dnd.register_hitbox_entity(&self.entity_id, entity);
        }
        for child in self.live_children() {
            if child.is_visible() {
                child.register_subtree();
            }
        }
    }

    fn unregister_subtree(&self) {
        self.dnd.unregister_hitbox_entity(&self.entity_id);
        for child in self.live_children() {
            child.unregister_subtree();
        }
    }

    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }

        if let Some(scroll_parent) = &self.scroll_parent {
            scroll_parent.unobserve_visibility(&ObserverKey::entity(self.entity_id.clone()));
        }
        self.dnd.unobserve_resize(&ObserverKey::entity(self.entity_id.clone()));
        self.dnd.unregister_hitbox_entity(&self.entity_id);
        if let Some(sort_manager) = &self.sort_manager {
            sort_manager.unregister_sortable(&self.entity_id);
        }
        if let Some(parent) = &self.parent {
            parent.children.borrow_mut().remove(&self.entity_id);
        }
        debug!(id = %self.entity_id, "Entity destroyed");
    }
}

// ============================================================================
// Managed Entity
// ============================================================================

/// The registered form of an [`EntityManager`]'s node.
struct ManagedEntity {
    scope_id: String,
    entity_id: String,
    manager: Weak<EntityManager>,
    initial: Cell<Hitbox>,
}

impl Entity for ManagedEntity {
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
        match self.manager.upgrade() {
            Some(manager) => manager.live_hitbox(self.initial.get()),
            None => self.initial.get(),
        }
    }

    fn path(&self) -> Vec<usize> {
        self.manager
            .upgrade()
            .map(|manager| manager.path())
            .unwrap_or_default()
    }

    fn data(&self) -> EntityData {
        self.manager
            .upgrade()
            .map(|manager| manager.data())
            .unwrap_or_default()
    }

    fn recalc_initial(&self) {
        if let Some(manager) = self.manager.upgrade() {
            manager.recalc();
        }
    }

    fn margins(&self) -> Margins {
        self.manager
            .upgrade()
            .map(|manager| manager.margins())
            .unwrap_or_default()
    }
}
