//! Drag Manager - pointer tracking and intersection passes.
//!
//! ## Performance Notes
//!
//! Pointer moves can arrive far faster than frames. Moves only record the
//! latest position; one intersection pass runs per animation frame:
//! - accept-filter both registries by the dragged type
//! - bulk-load an R-tree per registry and query with the drag rectangle
//! - pick the best scroll edge first; only without one, the best target
//!
//! Enable profiling with `cargo build --features profiling` to see timing.

use super::snapshot::{DragEmitter, DragEventKind, DragSnapshot};
use super::state::{DragSession, DragState};
use crate::config::DndConfig;
use crate::constants::HTML_DRAG_TYPE;
use crate::entity::{EntityRef, PointerEntity, same_entity};
use crate::geometry::{adjust_hitbox_for_movement, get_best_intersect, get_scroll_intersection};
use crate::managers::registry::EntityRegistry;
use crate::perf::HitTestProfiler;
use crate::profile_scope;
use crate::scheduler::{Debouncer, Scheduler, TaskId};
use crate::spatial_index::SpatialIndex;
use crate::types::{EntityData, Hitbox, Margins, Point};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Instant;
use tracing::{debug, trace, warn};

pub struct DragManager {
    scope_id: String,
    config: Rc<DndConfig>,
    scheduler: Rc<Scheduler>,
    emitter: Rc<DragEmitter>,
    registry: Rc<EntityRegistry>,
    state: RefCell<DragState>,
    /// Latest pointer position not yet processed by a frame
    pending_position: Cell<Option<Point>>,
    frame_request: Cell<Option<TaskId>>,
    html_leave: Debouncer,
    profiler: RefCell<HitTestProfiler>,
    weak_self: Weak<DragManager>,
}

impl DragManager {
    pub fn new(
        scope_id: String,
        config: Rc<DndConfig>,
        scheduler: Rc<Scheduler>,
        emitter: Rc<DragEmitter>,
        registry: Rc<EntityRegistry>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            scope_id,
            config,
            scheduler,
            emitter,
            registry,
            state: RefCell::new(DragState::Idle),
            pending_position: Cell::new(None),
            frame_request: Cell::new(None),
            html_leave: Debouncer::new(),
            profiler: RefCell::new(HitTestProfiler::new()),
            weak_self: weak_self.clone(),
        })
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn state(&self) -> DragState {
        self.state.borrow().clone()
    }

    pub fn is_dragging(&self) -> bool {
        self.state.borrow().is_dragging()
    }

    pub fn is_html_dragging(&self) -> bool {
        self.state
            .borrow()
            .session()
            .is_some_and(DragSession::is_html)
    }

    /// Snapshot of the current session (empty when idle).
    pub fn snapshot(&self) -> DragSnapshot {
        self.state
            .borrow()
            .session()
            .map(snapshot_of)
            .unwrap_or_default()
    }

    /// Candidate counts and timing of the most recent intersection pass.
    pub fn hit_test_stats(&self) -> (usize, f64) {
        let profiler = self.profiler.borrow();
        (profiler.items_tested, profiler.last_test_ms)
    }

    // ========================================================================
    // Pointer-level API
    // ========================================================================

    /// Pointer went down on the node of `entity_id`.
    pub fn pointer_down(&self, entity_id: &str, position: Point) {
        let mut state = self.state.borrow_mut();
        if !state.is_idle() {
            warn!(scope = %self.scope_id, entity_id, "Pointer down while a drag is in progress");
            return;
        }
        *state = DragState::Armed {
            entity_id: entity_id.to_string(),
            origin: position,
        };
    }

    /// Pointer moved; arms into a drag once past the threshold.
    pub fn pointer_move(&self, position: Point) {
        let armed = match &*self.state.borrow() {
            DragState::Idle => return,
            DragState::Armed { entity_id, origin } => Some((entity_id.clone(), *origin)),
            DragState::Resolving { .. } | DragState::Dragging(_) => None,
        };

        if let Some((entity_id, origin)) = armed {
            if origin.distance_to(position) <= self.config.drag_threshold {
                return;
            }
            *self.state.borrow_mut() = DragState::Idle;
            self.drag_start(&entity_id, origin);
        }
        self.drag_move(position);
    }

    /// Pointer released: a click if the threshold was never passed.
    pub fn pointer_up(&self, position: Point) {
        let was_armed = matches!(&*self.state.borrow(), DragState::Armed { .. });
        if was_armed {
            *self.state.borrow_mut() = DragState::Idle;
            return;
        }
        self.pending_position.set(Some(position));
        self.drag_end();
    }

    /// Pointer cancelled by the platform.
    pub fn pointer_cancel(&self) {
        let was_armed = matches!(&*self.state.borrow(), DragState::Armed { .. });
        if was_armed {
            *self.state.borrow_mut() = DragState::Idle;
            return;
        }
        self.drag_end();
    }

    // ========================================================================
    // Drag API
    // ========================================================================

    /// Begin dragging `entity_id` from `origin`.
    ///
    /// If the entity has not registered yet the drag waits in `Resolving`
    /// and is retried on every move frame.
    pub fn drag_start(&self, entity_id: &str, origin: Point) {
        if !self.state.borrow().is_idle() {
            warn!(scope = %self.scope_id, entity_id, "Drag start while a drag is in progress");
            return;
        }

        match self.registry.hitbox(entity_id) {
            Some(entity) => self.begin_session(entity, origin, origin, None),
            None => {
                debug!(scope = %self.scope_id, entity_id, "Drag entity not registered yet, resolving");
                *self.state.borrow_mut() = DragState::Resolving {
                    entity_id: entity_id.to_string(),
                    origin,
                    position: origin,
                };
            }
        }
    }

    /// Record a pointer move; processed on the next animation frame.
    pub fn drag_move(&self, position: Point) {
        if !self.state.borrow().is_active() {
            return;
        }
        self.pending_position.set(Some(position));
        self.request_move_frame();
    }

    /// Finish the drag, publishing the final intersection.
    pub fn drag_end(&self) {
        self.cancel_move_frame();
        self.html_leave.cancel(&self.scheduler);

        let latest = self.pending_position.take();
        let previous = std::mem::take(&mut *self.state.borrow_mut());

        let DragState::Dragging(mut session) = previous else {
            return;
        };
        if let Some(position) = latest {
            session.position = position;
        }

        debug!(
            scope = %self.scope_id,
            entity = session.entity.entity_id(),
            drop = session.primary.as_ref().map(|entity| entity.entity_id()),
            "Drag end"
        );
        self.emitter
            .emit(DragEventKind::DragEnd, &snapshot_of(&session), None);
    }

    /// Drop all drag state without emitting anything.
    pub fn reset(&self) {
        self.cancel_move_frame();
        self.html_leave.cancel(&self.scheduler);
        self.pending_position.set(None);
        *self.state.borrow_mut() = DragState::Idle;
    }

    // ========================================================================
    // HTML Drags (from outside the board)
    // ========================================================================

    /// Start a drag for content coming from outside the tracked entities.
    pub fn drag_start_html(&self, position: Point, payload: Value) {
        if !self.state.borrow().is_idle() {
            warn!(scope = %self.scope_id, "HTML drag start while a drag is in progress");
            return;
        }

        let entity_id = format!("{}-htmldnd-{}", self.scope_id, uuid::Uuid::new_v4());
        let (width, height) = self.config.html_drag_size;
        let hitbox = Hitbox::new(position.x, position.y, position.x + width, position.y + height);
        let entity = Rc::new(PointerEntity::new(
            self.scope_id.clone(),
            entity_id.clone(),
            hitbox,
            EntityData::new(HTML_DRAG_TYPE, entity_id),
        ));
        entity.set_payload(payload.clone());

        let html_payload = (!payload.is_null()).then_some(payload);
        self.begin_session(entity.clone(), position, position, Some((entity, html_payload)));
        self.arm_html_leave();
    }

    /// Drag-over from outside; starts the HTML drag on first contact.
    pub fn drag_move_html(&self, position: Point) {
        if !self.is_html_dragging() {
            if !self.state.borrow().is_idle() {
                return;
            }
            self.drag_start_html(position, Value::Null);
        }
        self.arm_html_leave();
        self.drag_move(position);
    }

    /// External content was dropped at `position`.
    pub fn drag_end_html(&self, position: Point, payload: Value) {
        if !self.is_html_dragging() {
            return;
        }
        if let Some(session) = self.state.borrow_mut().session_mut() {
            if let Some(entity) = &session.html_entity {
                entity.set_payload(payload.clone());
            }
            if !payload.is_null() {
                session.html_payload = Some(payload);
            }
        }
        self.pending_position.set(Some(position));
        self.drag_end();
    }

    fn arm_html_leave(&self) {
        let weak = self.weak_self.clone();
        self.html_leave
            .schedule(&self.scheduler, self.config.html_leave_debounce(), move || {
                if let Some(manager) = weak.upgrade() {
                    manager.handle_html_leave();
                }
            });
    }

    /// No drag-over arrived in time: the content left the board.
    fn handle_html_leave(&self) {
        if !self.is_html_dragging() {
            return;
        }
        trace!(scope = %self.scope_id, "HTML drag left");
        self.handle_primary_intersect(None);
        self.drag_end();
    }

    // ========================================================================
    // Frame Processing
    // ========================================================================

    fn begin_session(
        &self,
        entity: EntityRef,
        origin: Point,
        position: Point,
        html: Option<(Rc<PointerEntity>, Option<Value>)>,
    ) {
        let origin_hitbox = entity.hitbox();
        let margin = if html.is_some() { Margins::default() } else { entity.margins() };
        let (html_entity, html_payload) = match html {
            Some((entity, payload)) => (Some(entity), payload),
            None => (None, None),
        };

        let session = DragSession {
            entity,
            origin,
            position,
            origin_hitbox,
            margin,
            primary: None,
            scroll: None,
            html_entity,
            html_payload,
        };

        debug!(
            scope = %self.scope_id,
            entity = session.entity.entity_id(),
            html = session.is_html(),
            "Drag start"
        );
        let snapshot = snapshot_of(&session);
        *self.state.borrow_mut() = DragState::Dragging(session);
        self.emitter.emit(DragEventKind::DragStart, &snapshot, None);
    }

    fn request_move_frame(&self) {
        if self.frame_request.get().is_some() {
            return;
        }
        let weak = self.weak_self.clone();
        let id = self.scheduler.request_frame(move || {
            if let Some(manager) = weak.upgrade() {
                manager.frame_request.set(None);
                manager.process_move();
            }
        });
        self.frame_request.set(Some(id));
    }

    fn cancel_move_frame(&self) {
        if let Some(id) = self.frame_request.take() {
            self.scheduler.cancel(id);
        }
    }

    fn process_move(&self) {
        let Some(position) = self.pending_position.take() else {
            return;
        };

        // Registration may have caught up since the drag was requested
        let resolving = match &mut *self.state.borrow_mut() {
            DragState::Resolving {
                entity_id,
                origin,
                position: last,
            } => {
                *last = position;
                Some((entity_id.clone(), *origin))
            }
            _ => None,
        };
        if let Some((entity_id, origin)) = resolving {
            let Some(entity) = self.registry.hitbox(&entity_id) else {
                trace!(scope = %self.scope_id, entity_id, "Drag entity still unresolved");
                return;
            };
            *self.state.borrow_mut() = DragState::Idle;
            self.begin_session(entity, origin, position, None);
        }

        let snapshot = {
            let mut state = self.state.borrow_mut();
            let Some(session) = state.session_mut() else {
                return;
            };
            session.position = position;
            snapshot_of(session)
        };

        self.emitter.emit(DragEventKind::DragMove, &snapshot, None);
        self.calculate_drag_intersect();
    }

    /// One intersection pass against both registries.
    pub fn calculate_drag_intersect(&self) {
        profile_scope!("calculate_drag_intersect");

        let (kind, drag_id, drag_hitbox) = {
            let state = self.state.borrow();
            let Some(session) = state.session() else {
                return;
            };
            (
                session.entity.data().kind,
                session.entity.entity_id().to_string(),
                adjust_hitbox_for_movement(session.origin_hitbox, session.origin, session.position),
            )
        };

        let start = Instant::now();
        let penalty = self.config.intersect_axis_penalty;

        let scroll_candidates = self.registry.scroll_accepting(&kind);
        let hitbox_candidates = self.registry.hitboxes_accepting(&kind);
        let tested = scroll_candidates.len() + hitbox_candidates.len();

        let scroll_hits = SpatialIndex::from_entities(scroll_candidates).query_overlapping(drag_hitbox);
        let scroll_intersection = get_scroll_intersection(
            &scroll_hits,
            drag_hitbox,
            &drag_id,
            self.config.scroll_edge_thickness,
            penalty,
        );
        let is_scrolling = scroll_intersection.is_some();
        self.handle_scroll_intersect(scroll_intersection);

        // Auto-scroll owns this frame
        if !is_scrolling {
            let hits = SpatialIndex::from_entities(hitbox_candidates).query_overlapping(drag_hitbox);
            let primary = get_best_intersect(&hits, drag_hitbox, &drag_id, penalty);
            self.handle_primary_intersect(primary);
        }

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.profiler.borrow_mut().record(tested, elapsed_ms);
    }

    /// Emit begin/update/end scroll events only on transitions.
    fn handle_scroll_intersect(&self, next: Option<(EntityRef, f64)>) {
        let previous = match self.state.borrow().session() {
            Some(session) => session.scroll.clone(),
            None => return,
        };

        match (previous, next) {
            (None, None) => {}
            (None, Some(next)) => self.begin_scroll(next),
            (Some(previous), None) => self.end_scroll(&previous.0),
            (Some(previous), Some(next)) => {
                if same_entity(previous.0.as_ref(), next.0.as_ref()) {
                    if previous.1 != next.1 {
                        let id = next.0.entity_id().to_string();
                        let snapshot = self.update_session(|session| session.scroll = Some(next));
                        if let Some(snapshot) = snapshot {
                            self.emitter
                                .emit(DragEventKind::UpdateDragScroll, &snapshot, Some(&id));
                        }
                    }
                } else {
                    self.end_scroll(&previous.0);
                    self.begin_scroll(next);
                }
            }
        }
    }

    fn begin_scroll(&self, next: (EntityRef, f64)) {
        let id = next.0.entity_id().to_string();
        trace!(scope = %self.scope_id, edge = %id, strength = next.1, "Begin drag scroll");
        if let Some(snapshot) = self.update_session(|session| session.scroll = Some(next)) {
            self.emitter
                .emit(DragEventKind::BeginDragScroll, &snapshot, Some(&id));
        }
    }

    fn end_scroll(&self, previous: &EntityRef) {
        let id = previous.entity_id().to_string();
        trace!(scope = %self.scope_id, edge = %id, "End drag scroll");
        if let Some(snapshot) = self.update_session(|session| session.scroll = None) {
            self.emitter
                .emit(DragEventKind::EndDragScroll, &snapshot, Some(&id));
        }
    }

    /// Emit enter/leave only when the primary intersection changes.
    fn handle_primary_intersect(&self, next: Option<EntityRef>) {
        let previous = match self.state.borrow().session() {
            Some(session) => session.primary.clone(),
            None => return,
        };

        match (previous, next) {
            (None, None) => {}
            (None, Some(next)) => self.enter(next),
            (Some(previous), None) => self.leave(&previous),
            (Some(previous), Some(next)) => {
                if !same_entity(previous.as_ref(), next.as_ref()) {
                    self.leave(&previous);
                    self.enter(next);
                }
            }
        }
    }

    fn enter(&self, next: EntityRef) {
        let id = next.entity_id().to_string();
        debug!(scope = %self.scope_id, target = %id, "Drag enter");
        if let Some(snapshot) = self.update_session(|session| session.primary = Some(next)) {
            self.emitter.emit(DragEventKind::DragEnter, &snapshot, Some(&id));
        }
    }

    fn leave(&self, previous: &EntityRef) {
        let id = previous.entity_id().to_string();
        debug!(scope = %self.scope_id, target = %id, "Drag leave");
        if let Some(snapshot) = self.update_session(|session| session.primary = None) {
            self.emitter.emit(DragEventKind::DragLeave, &snapshot, Some(&id));
        }
    }

    /// Mutate the session and return a snapshot, releasing the borrow
    /// before any listener runs.
    fn update_session(&self, update: impl FnOnce(&mut DragSession)) -> Option<DragSnapshot> {
        let mut state = self.state.borrow_mut();
        let session = state.session_mut()?;
        update(session);
        Some(snapshot_of(session))
    }
}

fn snapshot_of(session: &DragSession) -> DragSnapshot {
    DragSnapshot {
        drag_entity: Some(session.entity.clone()),
        drag_entity_margin: session.margin,
        drag_origin: Some(session.origin),
        drag_position: Some(session.position),
        drag_origin_hitbox: Some(session.origin_hitbox),
        primary_intersection: session.primary.clone(),
        scroll_intersection: session.scroll.clone(),
        html_payload: session.html_payload.clone(),
    }
}
