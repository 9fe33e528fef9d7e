//! Scroll Manager - one per scrollable container.
//!
//! Owns four edge strip entities (top/right/bottom/left) used as auto-scroll
//! triggers, tracks the container's scroll state, and drives the
//! auto-scroll loop while the Drag Manager reports an edge intersection.
//!
//! ## Auto-scroll
//!
//! ```text
//! BeginDragScroll(edge, strength) -> side becomes active, loop starts
//! every frame: step = strength / modifier per active side, clamped to
//!              the remaining scroll range; exhausted sides drop out
//! EndDragScroll / DragEnd         -> side inactive, loop stops when none left
//! ```
//!
//! An edge whose direction is exhausted (top at offset 0, bottom at max)
//! is unregistered so it no longer wins hit tests.
//!
//! Nested containers see each other through visibility: a child container
//! or entity asks its scroll parent to observe it, and the host reports
//! viewport intersections with [`ScrollManager::report_intersections`].

use super::dnd::DndManager;
use crate::constants::SCROLL_ENTITY_TYPE;
use crate::drag::DragEventKind;
use crate::emitter::ListenerId;
use crate::entity::Entity;
use crate::geometry::{adjust_hitbox, calculate_scroll_hitbox, element_scroll_offsets};
use crate::node::ScrollNodeRef;
use crate::profile_scope;
use crate::scheduler::{NodeProbe, TaskId};
use crate::types::{CoordinateShift, EntityData, Hitbox, ObserverKey, ScrollState, Side};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

type VisibilityHandler = Rc<dyn Fn(bool)>;

/// Construction options for a [`ScrollManager`].
pub struct ScrollManagerOptions {
    /// Container id, unique within the arena
    pub id: String,
    /// Drag types that trigger auto-scroll in this container
    pub accepts: Vec<String>,
    /// Enclosing scroll container, if any
    pub parent: Option<Rc<ScrollManager>>,
    /// Yields the container node once mounted
    pub node: NodeProbe<ScrollNodeRef>,
}

pub struct ScrollManager {
    dnd: Rc<DndManager>,
    id: String,
    accepts: Vec<String>,
    parent: Option<Rc<ScrollManager>>,
    node: RefCell<Option<ScrollNodeRef>>,
    scroll_state: Cell<ScrollState>,
    edges: RefCell<BTreeMap<Side, Rc<ScrollEdgeEntity>>>,
    /// Active auto-scroll sides and their strengths
    active: RefCell<BTreeMap<Side, f64>>,
    is_visible: Cell<bool>,
    destroyed: Cell<bool>,
    scroll_frame: Cell<Option<TaskId>>,
    drag_scroll_frame: Cell<Option<TaskId>>,
    visibility_observers: RefCell<BTreeMap<ObserverKey, VisibilityHandler>>,
    listeners: RefCell<Vec<ListenerId>>,
    weak_self: Weak<ScrollManager>,
}

impl ScrollManager {
    pub fn new(dnd: &Rc<DndManager>, options: ScrollManagerOptions) -> Rc<Self> {
        let ScrollManagerOptions {
            id,
            accepts,
            parent,
            node,
        } = options;

        let manager = Rc::new_cyclic(|weak_self| Self {
            dnd: dnd.clone(),
            id,
            accepts,
            parent,
            node: RefCell::new(None),
            scroll_state: Cell::new(ScrollState::default()),
            edges: RefCell::new(BTreeMap::new()),
            active: RefCell::new(BTreeMap::new()),
            is_visible: Cell::new(false),
            destroyed: Cell::new(false),
            scroll_frame: Cell::new(None),
            drag_scroll_frame: Cell::new(None),
            visibility_observers: RefCell::new(BTreeMap::new()),
            listeners: RefCell::new(Vec::new()),
            weak_self: weak_self.clone(),
        });

        let alive = Rc::downgrade(&manager);
        let ready = Rc::downgrade(&manager);
        dnd.scheduler().when_ready(
            node,
            move || alive.upgrade().is_some_and(|manager| !manager.destroyed.get()),
            move |node| {
                if let Some(manager) = ready.upgrade() {
                    manager.init_node(node);
                }
            },
        );

        manager
    }

    fn init_node(&self, node: ScrollNodeRef) {
        if let Some(offset) = self.dnd.scroll_states().get_scroll_state(&self.id) {
            trace!(id = %self.id, x = offset.x, y = offset.y, "Restoring scroll offset");
            node.scroll_to(offset.x, offset.y);
        }
        self.scroll_state.set(element_scroll_offsets(node.scroll_metrics()));
        *self.node.borrow_mut() = Some(node);

        self.create_edges();
        self.subscribe();

        match &self.parent {
            Some(parent) => {
                let weak = self.weak_self.clone();
                parent.observe_visibility(ObserverKey::scroll(self.id.clone()), move |visible| {
                    if let Some(manager) = weak.upgrade() {
                        manager.set_visibility(visible);
                    }
                });
            }
            None => self.set_visibility(true),
        }

        let weak = self.weak_self.clone();
        self.dnd.observe_resize(ObserverKey::scroll(self.id.clone()), move || {
            if let Some(manager) = weak.upgrade() {
                manager.recalc_edges();
            }
        });

        debug!(id = %self.id, state = ?self.scroll_state.get(), "Scroll container ready");
    }

    fn create_edges(&self) {
        let mut edges = self.edges.borrow_mut();
        for side in Side::ALL {
            let edge_id = self.edge_id(side);
            let data = EntityData {
                sort_axis: Some(side.axis()),
                side: Some(side),
                ..EntityData::new(SCROLL_ENTITY_TYPE, edge_id.clone())
                    .with_accepts(self.accepts.iter().cloned())
                    .with_payload("scrollContainer", Value::String(self.id.clone()))
            };
            let edge = Rc::new(ScrollEdgeEntity {
                scope_id: self.dnd.scope_id().to_string(),
                entity_id: edge_id,
                side,
                manager: self.weak_self.clone(),
                initial: Cell::new(Hitbox::default()),
                data,
            });
            edge.recalc_initial();
            edges.insert(side, edge);
        }
    }

    fn subscribe(&self) {
        let emitter = self.dnd.emitter();
        let mut listeners = self.listeners.borrow_mut();

        for side in Side::ALL {
            let edge_id = self.edge_id(side);

            let weak = self.weak_self.clone();
            listeners.push(emitter.on(DragEventKind::BeginDragScroll, Some(&edge_id), move |snapshot| {
                if let (Some(manager), Some(strength)) = (weak.upgrade(), snapshot.scroll_strength()) {
                    manager.begin_drag_scroll(side, strength);
                }
            }));

            let weak = self.weak_self.clone();
            listeners.push(emitter.on(DragEventKind::UpdateDragScroll, Some(&edge_id), move |snapshot| {
                if let (Some(manager), Some(strength)) = (weak.upgrade(), snapshot.scroll_strength()) {
                    manager.update_drag_scroll(side, strength);
                }
            }));

            let weak = self.weak_self.clone();
            listeners.push(emitter.on(DragEventKind::EndDragScroll, Some(&edge_id), move |_| {
                if let Some(manager) = weak.upgrade() {
                    manager.end_drag_scroll(side);
                }
            }));
        }

        let weak = self.weak_self.clone();
        listeners.push(emitter.on(DragEventKind::DragEnd, None, move |_| {
            if let Some(manager) = weak.upgrade() {
                manager.stop_drag_scroll();
            }
        }));
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn edge_id(&self, side: Side) -> String {
        format!("{}-{}", self.id, side.as_str())
    }

    pub fn is_ready(&self) -> bool {
        self.node.borrow().is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible.get()
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll_state.get()
    }

    /// Accumulated scroll offset of every enclosing container.
    pub fn scroll_shift(&self) -> CoordinateShift {
        match &self.parent {
            Some(parent) => {
                let state = parent.scroll_state();
                let shift = parent.scroll_shift();
                CoordinateShift::new(state.x + shift.x, state.y + shift.y)
            }
            None => CoordinateShift::default(),
        }
    }

    /// Scroll state and shift that position this container's own box.
    fn outer_offsets(&self) -> (Option<ScrollState>, Option<CoordinateShift>) {
        match &self.parent {
            Some(parent) => (Some(parent.scroll_state()), Some(parent.scroll_shift())),
            None => (None, None),
        }
    }

    /// Whether scrolling toward `side` has reached its limit.
    pub fn is_done_scrolling(&self, side: Side) -> bool {
        let state = self.scroll_state.get();
        match side {
            Side::Top => state.y <= 0.0,
            Side::Bottom => state.y >= state.max_y,
            Side::Left => state.x <= 0.0,
            Side::Right => state.x >= state.max_x,
        }
    }

    /// Re-measure all four edge strips.
    pub fn recalc_edges(&self) {
        let edges: Vec<_> = self.edges.borrow().values().cloned().collect();
        for edge in edges {
            edge.recalc_initial();
        }
    }

    // ========================================================================
    // Visibility
    // ========================================================================

    /// Watch a child entity or container for viewport intersection changes.
    pub fn observe_visibility(&self, key: ObserverKey, handler: impl Fn(bool) + 'static) {
        self.visibility_observers.borrow_mut().insert(key, Rc::new(handler));
    }

    pub fn unobserve_visibility(&self, key: &ObserverKey) {
        self.visibility_observers.borrow_mut().remove(key);
    }

    pub fn is_observing_visibility(&self, key: &ObserverKey) -> bool {
        self.visibility_observers.borrow().contains_key(key)
    }

    /// Host notification: children entered or left this container's viewport.
    /// An id shared by a child entity and a child container reaches both.
    pub fn report_intersections<S: AsRef<str>>(&self, entries: &[(S, bool)]) {
        let handlers: Vec<(VisibilityHandler, bool)> = {
            let observers = self.visibility_observers.borrow();
            entries
                .iter()
                .flat_map(|(id, visible)| {
                    [ObserverKey::entity(id.as_ref()), ObserverKey::scroll(id.as_ref())]
                        .into_iter()
                        .filter_map(|key| observers.get(&key).cloned())
                        .map(move |handler| (handler, *visible))
                        .collect::<Vec<_>>()
                })
                .collect()
        };
        for (handler, visible) in handlers {
            handler(visible);
        }
    }

    fn set_visibility(&self, visible: bool) {
        self.is_visible.set(visible);
        if visible {
            self.recalc_edges();
            self.handle_entity_registration();
        } else {
            for side in Side::ALL {
                self.dnd.unregister_scroll_entity(&self.edge_id(side));
            }
        }
    }

    /// Register each edge unless its direction is exhausted.
    fn handle_entity_registration(&self) {
        let edges: Vec<_> = self.edges.borrow().values().cloned().collect();
        for edge in edges {
            let id = edge.entity_id().to_string();
            if self.is_done_scrolling(edge.side) {
                self.dnd.unregister_scroll_entity(&id);
            } else if !self.dnd.has_scroll_entity(&id) {
                self.dnd.register_scroll_entity(&id, edge);
            }
        }
    }

    // ========================================================================
    // Scroll Tracking
    // ========================================================================

    /// Host notification: the container scrolled. Coalesced into one update
    /// per frame.
    pub fn on_scroll(&self) {
        if self.scroll_frame.get().is_some() {
            return;
        }
        let weak = self.weak_self.clone();
        let id = self.dnd.scheduler().request_frame(move || {
            if let Some(manager) = weak.upgrade() {
                manager.scroll_frame.set(None);
                manager.update_scroll_state();
            }
        });
        self.scroll_frame.set(Some(id));
    }

    /// Re-read the container offsets, persist them and re-evaluate edges.
    pub fn update_scroll_state(&self) {
        let Some(node) = self.node.borrow().clone() else {
            return;
        };
        let state = element_scroll_offsets(node.scroll_metrics());
        self.scroll_state.set(state);
        self.dnd.scroll_states().set_scroll_state(
            self.dnd.scope_id(),
            &self.id,
            CoordinateShift::new(state.x, state.y),
        );

        if self.is_visible.get() {
            self.handle_entity_registration();
        }
    }

    // ========================================================================
    // Auto-scroll
    // ========================================================================

    pub fn begin_drag_scroll(&self, side: Side, strength: f64) {
        trace!(id = %self.id, side = side.as_str(), strength, "Begin auto-scroll");
        self.active.borrow_mut().insert(side, strength);
        self.request_drag_scroll_frame();
    }

    pub fn update_drag_scroll(&self, side: Side, strength: f64) {
        if let Some(current) = self.active.borrow_mut().get_mut(&side) {
            *current = strength;
        }
    }

    pub fn end_drag_scroll(&self, side: Side) {
        let now_idle = {
            let mut active = self.active.borrow_mut();
            active.remove(&side);
            active.is_empty()
        };
        if now_idle {
            self.cancel_drag_scroll_frame();
        }
    }

    /// Strength currently driving auto-scroll toward `side`, if active.
    pub fn drag_scroll_strength(&self, side: Side) -> Option<f64> {
        self.active.borrow().get(&side).copied()
    }

    pub fn is_drag_scrolling(&self) -> bool {
        !self.active.borrow().is_empty()
    }

    fn stop_drag_scroll(&self) {
        self.active.borrow_mut().clear();
        self.cancel_drag_scroll_frame();
    }

    fn request_drag_scroll_frame(&self) {
        if self.drag_scroll_frame.get().is_some() {
            return;
        }
        let weak = self.weak_self.clone();
        let id = self.dnd.scheduler().request_frame(move || {
            if let Some(manager) = weak.upgrade() {
                manager.drag_scroll_frame.set(None);
                manager.handle_drag_scroll();
            }
        });
        self.drag_scroll_frame.set(Some(id));
    }

    fn cancel_drag_scroll_frame(&self) {
        if let Some(id) = self.drag_scroll_frame.take() {
            self.dnd.scheduler().cancel(id);
        }
    }

    /// One auto-scroll step. Requeues itself while any side is active.
    pub fn handle_drag_scroll(&self) {
        profile_scope!("handle_drag_scroll");

        let Some(node) = self.node.borrow().clone() else {
            return;
        };
        let state = element_scroll_offsets(node.scroll_metrics());
        let modifier = self.dnd.config().scroll_strength_modifier;

        let (dx, dy) = {
            let mut active = self.active.borrow_mut();
            let (mut dx, mut dy) = (0.0, 0.0);
            active.retain(|side, strength| {
                let remaining = match side {
                    Side::Top => state.y,
                    Side::Bottom => state.max_y - state.y,
                    Side::Left => state.x,
                    Side::Right => state.max_x - state.x,
                };
                if remaining <= 0.0 {
                    return false;
                }
                let step = (*strength / modifier).clamp(0.0, remaining);
                match side {
                    Side::Top => dy -= step,
                    Side::Bottom => dy += step,
                    Side::Left => dx -= step,
                    Side::Right => dx += step,
                }
                true
            });
            (dx, dy)
        };

        if dx != 0.0 || dy != 0.0 {
            node.scroll_by(dx, dy);
        }
        self.update_scroll_state();

        if self.is_drag_scrolling() {
            self.request_drag_scroll_frame();
        }
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    pub fn destroy(&self) {
        self.destroyed.set(true);
        self.stop_drag_scroll();
        if let Some(id) = self.scroll_frame.take() {
            self.dnd.scheduler().cancel(id);
        }

        for id in self.listeners.borrow_mut().drain(..) {
            self.dnd.emitter().off(id);
        }
        for side in Side::ALL {
            self.dnd.unregister_scroll_entity(&self.edge_id(side));
        }
        if let Some(parent) = &self.parent {
            parent.unobserve_visibility(&ObserverKey::scroll(self.id.clone()));
        }
        self.dnd.unobserve_resize(&ObserverKey::scroll(self.id.clone()));
        self.visibility_observers.borrow_mut().clear();
        debug!(id = %self.id, "Scroll container destroyed");
    }
}

// ============================================================================
// Scroll Edge Entity
// ============================================================================

/// One edge strip of a scroll container.
pub struct ScrollEdgeEntity {
    scope_id: String,
    entity_id: String,
    side: Side,
    manager: Weak<ScrollManager>,
    initial: Cell<Hitbox>,
    data: EntityData,
}

impl ScrollEdgeEntity {
    pub fn side(&self) -> Side {
        self.side
    }
}

impl Entity for ScrollEdgeEntity {
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
            Some(manager) => {
                let (scroll, shift) = manager.outer_offsets();
                adjust_hitbox(self.initial.get(), scroll, shift)
            }
            None => self.initial.get(),
        }
    }

    fn path(&self) -> Vec<usize> {
        Vec::new()
    }

    fn data(&self) -> EntityData {
        self.data.clone()
    }

    fn recalc_initial(&self) {
        let Some(manager) = self.manager.upgrade() else {
            return;
        };
        let Some(node) = manager.node.borrow().clone() else {
            return;
        };
        let (scroll, shift) = manager.outer_offsets();
        self.initial.set(calculate_scroll_hitbox(
            node.bounding_rect(),
            scroll,
            shift,
            self.side,
            manager.dnd.config().scroll_edge_thickness,
        ));
    }
}
