//! Engine aggregator: one instance per independent drag arena.
//!
//! Owns the arena's registries, scheduler, emitter and Drag Manager, and
//! relays the final drop decision to the host. Every Entity, Scroll and
//! Sort Manager is constructed with a handle to its aggregator; there is no
//! ambient global registry.

use crate::config::DndConfig;
use crate::drag::{DragEmitter, DragManager};
use crate::entity::EntityRef;
use crate::managers::registry::EntityRegistry;
use crate::managers::scroll_state::ScrollStateManager;
use crate::perf::{FrameMonitor, measure};
use crate::scheduler::Scheduler;
use crate::types::ObserverKey;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, trace};

type DropHandler = Box<dyn Fn(&EntityRef, &EntityRef)>;
type ResizeHandler = Rc<dyn Fn()>;

pub struct DndManager {
    scope_id: String,
    config: Rc<DndConfig>,
    scheduler: Rc<Scheduler>,
    emitter: Rc<DragEmitter>,
    registry: Rc<EntityRegistry>,
    drag_manager: Rc<DragManager>,
    scroll_states: Arc<ScrollStateManager>,
    resize_observers: RefCell<BTreeMap<ObserverKey, ResizeHandler>>,
    frames: RefCell<FrameMonitor>,
    on_drop: DropHandler,
}

impl DndManager {
    /// Create an arena backed by the process-wide scroll state store.
    pub fn new(
        scope_id: impl Into<String>,
        config: DndConfig,
        on_drop: impl Fn(&EntityRef, &EntityRef) + 'static,
    ) -> Rc<Self> {
        Self::with_scroll_states(scope_id, config, ScrollStateManager::global(), on_drop)
    }

    /// Create an arena with an explicit scroll state store.
    ///
    /// An invalid `config` is logged and replaced by the defaults.
    pub fn with_scroll_states(
        scope_id: impl Into<String>,
        config: DndConfig,
        scroll_states: Arc<ScrollStateManager>,
        on_drop: impl Fn(&EntityRef, &EntityRef) + 'static,
    ) -> Rc<Self> {
        let scope_id = scope_id.into();
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                error!(scope = %scope_id, %err, "Invalid drag config, using defaults");
                DndConfig::default()
            }
        };
        let config = Rc::new(config);
        let scheduler = Rc::new(Scheduler::new());
        let emitter = Rc::new(DragEmitter::new());
        let registry = Rc::new(EntityRegistry::new());
        let drag_manager = DragManager::new(
            scope_id.clone(),
            config.clone(),
            scheduler.clone(),
            emitter.clone(),
            registry.clone(),
        );

        debug!(scope = %scope_id, "Drag arena created");

        Rc::new(Self {
            scope_id,
            config,
            scheduler,
            emitter,
            registry,
            drag_manager,
            scroll_states,
            resize_observers: RefCell::new(BTreeMap::new()),
            frames: RefCell::new(FrameMonitor::new()),
            on_drop: Box::new(on_drop),
        })
    }

    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    pub fn config(&self) -> &DndConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Rc<Scheduler> {
        &self.scheduler
    }

    pub fn emitter(&self) -> &Rc<DragEmitter> {
        &self.emitter
    }

    pub fn drag_manager(&self) -> &Rc<DragManager> {
        &self.drag_manager
    }

    pub fn scroll_states(&self) -> &Arc<ScrollStateManager> {
        &self.scroll_states
    }

    /// Pump one animation frame: due timers, then queued frame tasks.
    pub fn run_frame(&self, now: Duration) {
        let ((), elapsed_ms) = measure(|| self.scheduler.run_frame(now));
        self.frames.borrow_mut().record(elapsed_ms);
    }

    /// Rolling cost of the frames pumped through [`Self::run_frame`].
    pub fn frame_stats(&self) -> (u64, f64) {
        let frames = self.frames.borrow();
        (frames.total_frames(), frames.average_ms())
    }

    // ========================================================================
    // Registries
    // ========================================================================

    pub fn register_hitbox_entity(&self, id: &str, entity: EntityRef) {
        trace!(scope = %self.scope_id, id, "Register hitbox entity");
        self.registry.register_hitbox(id, entity);
    }

    pub fn unregister_hitbox_entity(&self, id: &str) {
        if self.registry.unregister_hitbox(id).is_some() {
            trace!(scope = %self.scope_id, id, "Unregister hitbox entity");
        }
    }

    pub fn register_scroll_entity(&self, id: &str, entity: EntityRef) {
        trace!(scope = %self.scope_id, id, "Register scroll entity");
        self.registry.register_scroll(id, entity);
    }

    pub fn unregister_scroll_entity(&self, id: &str) {
        if self.registry.unregister_scroll(id).is_some() {
            trace!(scope = %self.scope_id, id, "Unregister scroll entity");
        }
    }

    pub fn hitbox_entity(&self, id: &str) -> Option<EntityRef> {
        self.registry.hitbox(id)
    }

    pub fn scroll_entity(&self, id: &str) -> Option<EntityRef> {
        self.registry.scroll(id)
    }

    pub fn has_hitbox_entity(&self, id: &str) -> bool {
        self.registry.has_hitbox(id)
    }

    pub fn has_scroll_entity(&self, id: &str) -> bool {
        self.registry.has_scroll(id)
    }

    pub fn hitbox_ids(&self) -> Vec<String> {
        self.registry.hitbox_ids()
    }

    pub fn scroll_ids(&self) -> Vec<String> {
        self.registry.scroll_ids()
    }

    // ========================================================================
    // Size Observation
    // ========================================================================

    /// Run `handler` whenever the host reports the node of `key` resized.
    pub fn observe_resize(&self, key: ObserverKey, handler: impl Fn() + 'static) {
        self.resize_observers.borrow_mut().insert(key, Rc::new(handler));
    }

    pub fn unobserve_resize(&self, key: &ObserverKey) {
        self.resize_observers.borrow_mut().remove(key);
    }

    pub fn is_observing_resize(&self, key: &ObserverKey) -> bool {
        self.resize_observers.borrow().contains_key(key)
    }

    /// Host notification: these nodes changed size. Every observer of a
    /// matching id runs, entity and scroll container alike.
    pub fn report_resized<S: AsRef<str>>(&self, ids: &[S]) {
        let handlers: Vec<ResizeHandler> = {
            let observers = self.resize_observers.borrow();
            observers
                .iter()
                .filter(|(key, _)| ids.iter().any(|id| id.as_ref() == key.id()))
                .map(|(_, handler)| handler.clone())
                .collect()
        };
        for handler in handlers {
            handler();
        }
    }

    /// Re-measure every registered entity (e.g. after a window resize).
    pub fn recalc_all(&self) {
        let entities = self.registry.all();
        debug!(scope = %self.scope_id, count = entities.len(), "Recalculating all hitboxes");
        for entity in entities {
            entity.recalc_initial();
        }
    }

    // ========================================================================
    // Drop
    // ========================================================================

    /// Hand a completed drop to the host.
    pub fn handle_drop(&self, drag_entity: &EntityRef, drop_entity: &EntityRef) {
        debug!(
            scope = %self.scope_id,
            drag = drag_entity.entity_id(),
            drop = drop_entity.entity_id(),
            "Drop"
        );
        (self.on_drop)(drag_entity, drop_entity);
    }

    /// Tear the arena down: cancel deferred work, drop listeners and
    /// registrations, and release this scope's persisted scroll offsets.
    pub fn destroy(&self) {
        self.drag_manager.reset();
        self.scheduler.clear();
        self.emitter.clear();
        self.registry.clear();
        self.resize_observers.borrow_mut().clear();
        let pruned = self.scroll_states.unmount_scope(&self.scope_id);
        debug!(scope = %self.scope_id, pruned, "Drag arena destroyed");
    }
}
