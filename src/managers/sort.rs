//! Sort Manager - reflow animation for one sortable group.
//!
//! Listens to the drag lifecycle and moves siblings out of the way of the
//! dragged item, sizing the group's placeholder to keep room for it.
//!
//! ## Reflow Rules
//!
//! ```text
//! drag start (own item):  hide the dragged item, shift its later siblings
//!                         by the item's outer size, grow the placeholder
//! drag enter (debounced): shift the entered item and its later siblings,
//!                         reset earlier ones
//! drag leave (debounced): reset shifts, shrink the placeholder
//! drag end:               after the drop animation, report the drop (if
//!                         this group owns the target) and reset everything
//! ```
//!
//! The placeholder is a sortable like any other but never shifts or hides.

use super::dnd::DndManager;
use crate::constants::PLACEHOLDER_TYPE;
use crate::drag::{DragEventKind, DragSnapshot};
use crate::emitter::ListenerId;
use crate::entity::EntityRef;
use crate::geometry::{SiblingDirection, drop_duration, get_sibling_direction, hitbox_dimensions};
use crate::node::EntityNodes;
use crate::scheduler::Debouncer;
use crate::types::{Axis, Point, Size, Transition};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

struct Sortable {
    entity: EntityRef,
    nodes: EntityNodes,
    is_placeholder: bool,
    listeners: [ListenerId; 2],
}

pub struct SortManager {
    dnd: Rc<DndManager>,
    id: String,
    axis: Axis,
    sortables: RefCell<BTreeMap<String, Sortable>>,
    shifted: RefCell<BTreeSet<String>>,
    hidden: RefCell<BTreeSet<String>>,
    is_sorting: Cell<bool>,
    placeholder_active: Cell<bool>,
    enter: Debouncer,
    leave: Debouncer,
    finalize: Debouncer,
    listeners: RefCell<Vec<ListenerId>>,
    weak_self: Weak<SortManager>,
}

impl SortManager {
    pub fn new(dnd: &Rc<DndManager>, id: impl Into<String>, axis: Axis) -> Rc<Self> {
        let manager = Rc::new_cyclic(|weak_self| Self {
            dnd: dnd.clone(),
            id: id.into(),
            axis,
            sortables: RefCell::new(BTreeMap::new()),
            shifted: RefCell::new(BTreeSet::new()),
            hidden: RefCell::new(BTreeSet::new()),
            is_sorting: Cell::new(false),
            placeholder_active: Cell::new(false),
            enter: Debouncer::new(),
            leave: Debouncer::new(),
            finalize: Debouncer::new(),
            listeners: RefCell::new(Vec::new()),
            weak_self: weak_self.clone(),
        });

        let emitter = dnd.emitter();
        let weak = Rc::downgrade(&manager);
        let start = emitter.on(DragEventKind::DragStart, None, move |snapshot| {
            if let Some(manager) = weak.upgrade() {
                manager.handle_drag_start(snapshot);
            }
        });
        let weak = Rc::downgrade(&manager);
        let end = emitter.on(DragEventKind::DragEnd, None, move |snapshot| {
            if let Some(manager) = weak.upgrade() {
                manager.handle_drag_end(snapshot);
            }
        });
        manager.listeners.borrow_mut().extend([start, end]);

        manager
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn is_sorting(&self) -> bool {
        self.is_sorting.get()
    }

    pub fn placeholder_active(&self) -> bool {
        self.placeholder_active.get()
    }

    pub fn shifted_ids(&self) -> Vec<String> {
        self.shifted.borrow().iter().cloned().collect()
    }

    pub fn hidden_ids(&self) -> Vec<String> {
        self.hidden.borrow().iter().cloned().collect()
    }

    pub fn sortable_ids(&self) -> Vec<String> {
        self.sortables.borrow().keys().cloned().collect()
    }

    pub fn has_sortable(&self, id: &str) -> bool {
        self.sortables.borrow().contains_key(id)
    }

    // ========================================================================
    // Registration
    // ========================================================================

    pub fn register_sortable(&self, id: &str, entity: EntityRef, nodes: EntityNodes) {
        let is_placeholder = entity.data().kind == PLACEHOLDER_TYPE;
        let emitter = self.dnd.emitter();

        let weak = self.weak_self.clone();
        let entered = id.to_string();
        let enter = emitter.on(DragEventKind::DragEnter, Some(id), move |snapshot| {
            if let Some(manager) = weak.upgrade() {
                manager.handle_drag_enter(snapshot, &entered);
            }
        });
        let weak = self.weak_self.clone();
        let leave = emitter.on(DragEventKind::DragLeave, Some(id), move |_| {
            if let Some(manager) = weak.upgrade() {
                manager.handle_drag_leave();
            }
        });

        let previous = self.sortables.borrow_mut().insert(
            id.to_string(),
            Sortable {
                entity,
                nodes,
                is_placeholder,
                listeners: [enter, leave],
            },
        );
        if let Some(previous) = previous {
            for listener in previous.listeners {
                emitter.off(listener);
            }
        }
        trace!(group = %self.id, id, is_placeholder, "Sortable registered");
    }

    pub fn unregister_sortable(&self, id: &str) {
        let Some(sortable) = self.sortables.borrow_mut().remove(id) else {
            return;
        };
        for listener in sortable.listeners {
            self.dnd.emitter().off(listener);
        }
        self.shifted.borrow_mut().remove(id);
        self.hidden.borrow_mut().remove(id);
    }

    // ========================================================================
    // Drag Lifecycle
    // ========================================================================

    fn handle_drag_start(&self, snapshot: &DragSnapshot) {
        let Some(drag_entity) = snapshot.drag_entity.clone() else {
            return;
        };
        if !self.has_sortable(drag_entity.entity_id()) {
            return;
        }
        let Some(dimensions) = self.drag_dimensions(snapshot) else {
            return;
        };

        self.finalize.cancel(self.dnd.scheduler());
        self.activate_placeholder(dimensions, Transition::None);

        let drag_path = drag_entity.path();
        let offset = self.offset_for(dimensions);
        for (id, sortable) in self.reflowable() {
            match get_sibling_direction(&drag_path, &sortable.entity.path()) {
                SiblingDirection::Same => {
                    sortable.nodes.entity.set_hidden(true);
                    self.hidden.borrow_mut().insert(id);
                }
                SiblingDirection::After => {
                    sortable.nodes.entity.set_translation(Some(offset), Transition::None);
                    self.shifted.borrow_mut().insert(id);
                }
                SiblingDirection::Before | SiblingDirection::NotSiblings => {}
            }
        }
        debug!(group = %self.id, drag = drag_entity.entity_id(), "Sort drag start");
    }

    fn handle_drag_enter(&self, snapshot: &DragSnapshot, entered_id: &str) {
        self.leave.cancel(self.dnd.scheduler());

        let weak = self.weak_self.clone();
        let snapshot = snapshot.clone();
        let entered_id = entered_id.to_string();
        self.enter
            .schedule(self.dnd.scheduler(), self.dnd.config().sort_enter_debounce(), move || {
                if let Some(manager) = weak.upgrade() {
                    manager.apply_sort(&snapshot, &entered_id);
                }
            });
    }

    /// Shift the entered sibling and everything after it.
    fn apply_sort(&self, snapshot: &DragSnapshot, entered_id: &str) {
        let Some(entered_path) = self
            .sortables
            .borrow()
            .get(entered_id)
            .map(|sortable| sortable.entity.path())
        else {
            return;
        };
        let Some(dimensions) = self.drag_dimensions(snapshot) else {
            return;
        };

        self.is_sorting.set(true);
        self.activate_placeholder(dimensions, Transition::Placeholder);

        let offset = self.offset_for(dimensions);
        let hidden = self.hidden.borrow().clone();
        for (id, sortable) in self.reflowable() {
            if hidden.contains(&id) {
                continue;
            }
            match get_sibling_direction(&entered_path, &sortable.entity.path()) {
                SiblingDirection::Same | SiblingDirection::After => {
                    sortable
                        .nodes
                        .entity
                        .set_translation(Some(offset), Transition::OutOfTheWay);
                    self.shifted.borrow_mut().insert(id);
                }
                SiblingDirection::Before | SiblingDirection::NotSiblings => {
                    if self.shifted.borrow_mut().remove(&id) {
                        sortable.nodes.entity.set_translation(None, Transition::OutOfTheWay);
                    }
                }
            }
        }
        trace!(group = %self.id, entered = entered_id, shifted = ?self.shifted.borrow(), "Sort reflow");
    }

    fn handle_drag_leave(&self) {
        self.enter.cancel(self.dnd.scheduler());
        if !self.is_sorting.get() {
            return;
        }

        let weak = self.weak_self.clone();
        self.leave
            .schedule(self.dnd.scheduler(), self.dnd.config().sort_leave_debounce(), move || {
                if let Some(manager) = weak.upgrade() {
                    manager.reset_shifted(Transition::OutOfTheWay);
                    manager.deactivate_placeholder(Transition::Placeholder);
                    manager.is_sorting.set(false);
                }
            });
    }

    fn handle_drag_end(&self, snapshot: &DragSnapshot) {
        let scheduler = self.dnd.scheduler();
        self.enter.cancel(scheduler);
        self.leave.cancel(scheduler);

        let (Some(drag_entity), Some(position)) = (snapshot.drag_entity.clone(), snapshot.drag_position)
        else {
            return;
        };

        let drop_target = snapshot.primary_intersection.clone().filter(|primary| {
            primary.entity_id() != drag_entity.entity_id() && self.has_sortable(primary.entity_id())
        });
        let owns_drag = self.has_sortable(drag_entity.entity_id());
        let has_reflow = self.is_sorting.get()
            || self.placeholder_active.get()
            || !self.shifted.borrow().is_empty()
            || !self.hidden.borrow().is_empty();

        if drop_target.is_none() && !owns_drag && !has_reflow {
            return;
        }

        let destination = match (&drop_target, snapshot.drag_origin_hitbox) {
            (Some(target), _) => target.hitbox().top_left(),
            (None, Some(origin)) => origin.top_left(),
            (None, None) => position,
        };
        let delay = drop_duration(position, destination, self.dnd.config());
        debug!(
            group = %self.id,
            drop = drop_target.as_ref().map(|target| target.entity_id()),
            delay_ms = delay.as_millis() as u64,
            "Sort drag end"
        );

        let weak = self.weak_self.clone();
        self.finalize.schedule(scheduler, delay, move || {
            let Some(manager) = weak.upgrade() else {
                return;
            };
            if let Some(target) = &drop_target {
                manager.dnd.handle_drop(&drag_entity, target);
            }
            manager.reset_all();
        });
    }

    // ========================================================================
    // Style Helpers
    // ========================================================================

    /// Outer size of the dragged item, margins included.
    fn drag_dimensions(&self, snapshot: &DragSnapshot) -> Option<Size> {
        Some(hitbox_dimensions(
            snapshot.drag_origin_hitbox?,
            snapshot.drag_entity_margin,
        ))
    }

    fn offset_for(&self, dimensions: Size) -> Point {
        match self.axis {
            Axis::Vertical => Point::new(0.0, dimensions.height),
            Axis::Horizontal => Point::new(dimensions.width, 0.0),
        }
    }

    /// Non-placeholder sortables with their node handles, detached from the
    /// registry borrow so host callbacks may re-enter.
    fn reflowable(&self) -> Vec<(String, ReflowTarget)> {
        self.sortables
            .borrow()
            .iter()
            .filter(|(_, sortable)| !sortable.is_placeholder)
            .map(|(id, sortable)| {
                (
                    id.clone(),
                    ReflowTarget {
                        entity: sortable.entity.clone(),
                        nodes: sortable.nodes.clone(),
                    },
                )
            })
            .collect()
    }

    fn placeholders(&self) -> Vec<EntityNodes> {
        self.sortables
            .borrow()
            .values()
            .filter(|sortable| sortable.is_placeholder)
            .map(|sortable| sortable.nodes.clone())
            .collect()
    }

    fn activate_placeholder(&self, dimensions: Size, transition: Transition) {
        for nodes in self.placeholders() {
            nodes.entity.set_extent(Some(dimensions), transition);
        }
        self.placeholder_active.set(true);
    }

    fn deactivate_placeholder(&self, transition: Transition) {
        if !self.placeholder_active.replace(false) {
            return;
        }
        for nodes in self.placeholders() {
            nodes.entity.set_extent(None, transition);
        }
    }

    fn reset_shifted(&self, transition: Transition) {
        let shifted = std::mem::take(&mut *self.shifted.borrow_mut());
        let targets = self.reflowable();
        for (id, target) in targets {
            if shifted.contains(&id) {
                target.nodes.entity.set_translation(None, transition);
            }
        }
    }

    /// Undo every style change and leave the sorting state.
    pub fn reset_all(&self) {
        self.reset_shifted(Transition::None);

        let hidden = std::mem::take(&mut *self.hidden.borrow_mut());
        for (id, target) in self.reflowable() {
            if hidden.contains(&id) {
                target.nodes.entity.set_hidden(false);
            }
        }

        self.deactivate_placeholder(Transition::None);
        self.is_sorting.set(false);
    }

    pub fn destroy(&self) {
        let scheduler = self.dnd.scheduler();
        self.enter.cancel(scheduler);
        self.leave.cancel(scheduler);
        self.finalize.cancel(scheduler);

        let emitter = self.dnd.emitter();
        for listener in self.listeners.borrow_mut().drain(..) {
            emitter.off(listener);
        }
        let sortables = std::mem::take(&mut *self.sortables.borrow_mut());
        for sortable in sortables.into_values() {
            for listener in sortable.listeners {
                emitter.off(listener);
            }
        }
        self.shifted.borrow_mut().clear();
        self.hidden.borrow_mut().clear();
        debug!(group = %self.id, "Sort group destroyed");
    }
}

struct ReflowTarget {
    entity: EntityRef,
    nodes: EntityNodes,
}
