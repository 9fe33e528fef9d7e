//! Test helpers: mock view nodes, arena builders and an event recorder.
//!
//! This module provides:
//! - `MockNode` / `MockScrollNode` - in-memory view nodes that record the
//!   style changes the engine applies
//! - `TestArena` - a drag arena with an isolated scroll state store, a drop
//!   log and frame pumping helpers
//! - `EventLog` - records every drag event with its summary

use humanboard_dnd::drag::{DragEventKind, DragSummary};
use humanboard_dnd::{
    DndConfig, DndManager, EntityData, EntityManager, EntityManagerOptions, EntityNodes, Margins,
    NodeProbe, Point, Rect, ScrollManager, ScrollManagerOptions, ScrollMetrics, ScrollNode,
    ScrollNodeRef, ScrollStateManager, Size, SortManager, Transition, VisualNode,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

/// Frame interval used when pumping the scheduler
pub const FRAME: Duration = Duration::from_millis(16);

// ============================================================================
// Mock Nodes
// ============================================================================

/// Visual node with a fixed rect that records applied styles.
#[derive(Default)]
pub struct MockNode {
    pub rect: Cell<Rect>,
    pub margins: Cell<Margins>,
    pub translation: Cell<Option<Point>>,
    pub last_transition: Cell<Option<Transition>>,
    pub hidden: Cell<bool>,
    pub extent: Cell<Option<Size>>,
}

impl MockNode {
    pub fn new(rect: Rect) -> Rc<Self> {
        Rc::new(Self {
            rect: Cell::new(rect),
            ..Self::default()
        })
    }
}

impl VisualNode for MockNode {
    fn bounding_rect(&self) -> Rect {
        self.rect.get()
    }

    fn margins(&self) -> Margins {
        self.margins.get()
    }

    fn set_translation(&self, offset: Option<Point>, transition: Transition) {
        self.translation.set(offset);
        self.last_transition.set(Some(transition));
    }

    fn set_hidden(&self, hidden: bool) {
        self.hidden.set(hidden);
    }

    fn set_extent(&self, extent: Option<Size>, transition: Transition) {
        self.extent.set(extent);
        self.last_transition.set(Some(transition));
    }
}

/// Scroll container whose offsets clamp like a real one.
#[derive(Default)]
pub struct MockScrollNode {
    pub rect: Cell<Rect>,
    pub metrics: Cell<ScrollMetrics>,
    pub scroll_calls: Cell<usize>,
}

impl MockScrollNode {
    /// A container of `rect`'s size over content of `content_width x content_height`.
    pub fn new(rect: Rect, content_width: f64, content_height: f64) -> Rc<Self> {
        Rc::new(Self {
            rect: Cell::new(rect),
            metrics: Cell::new(ScrollMetrics {
                scroll_left: 0.0,
                scroll_top: 0.0,
                scroll_width: content_width,
                scroll_height: content_height,
                client_width: rect.width,
                client_height: rect.height,
            }),
            scroll_calls: Cell::new(0),
        })
    }

    pub fn scroll_top(&self) -> f64 {
        self.metrics.get().scroll_top
    }

    pub fn scroll_left(&self) -> f64 {
        self.metrics.get().scroll_left
    }
}

impl VisualNode for MockScrollNode {
    fn bounding_rect(&self) -> Rect {
        self.rect.get()
    }
}

impl ScrollNode for MockScrollNode {
    fn scroll_metrics(&self) -> ScrollMetrics {
        self.metrics.get()
    }

    fn scroll_by(&self, dx: f64, dy: f64) {
        let metrics = self.metrics.get();
        self.scroll_calls.set(self.scroll_calls.get() + 1);
        self.scroll_to(metrics.scroll_left + dx, metrics.scroll_top + dy);
    }

    fn scroll_to(&self, x: f64, y: f64) {
        let mut metrics = self.metrics.get();
        let max_x = (metrics.scroll_width - metrics.client_width).max(0.0);
        let max_y = (metrics.scroll_height - metrics.client_height).max(0.0);
        metrics.scroll_left = x.clamp(0.0, max_x);
        metrics.scroll_top = y.clamp(0.0, max_y);
        self.metrics.set(metrics);
    }
}

// ============================================================================
// Probes
// ============================================================================

/// Probe that is ready immediately.
pub fn ready<T: Clone + 'static>(value: T) -> NodeProbe<T> {
    Rc::new(move || Some(value.clone()))
}

/// Probe backed by a slot the test fills later ("mounting" the node).
pub fn slot<T: Clone + 'static>() -> (NodeProbe<T>, Rc<RefCell<Option<T>>>) {
    let cell: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
    let reader = cell.clone();
    (Rc::new(move || reader.borrow().clone()), cell)
}

pub fn item_data(id: &str) -> Rc<dyn Fn() -> EntityData> {
    let id = id.to_string();
    Rc::new(move || EntityData::new("item", id.clone()).with_accepts(["item"]))
}

// ============================================================================
// Test Arena
// ============================================================================

/// A drag arena with an isolated scroll state store and a drop log.
pub struct TestArena {
    pub dnd: Rc<DndManager>,
    pub store: Arc<ScrollStateManager>,
    pub drops: Rc<RefCell<Vec<(String, String)>>>,
}

impl TestArena {
    pub fn new(scope: &str) -> Self {
        Self::with_config(scope, DndConfig::default())
    }

    pub fn with_config(scope: &str, config: DndConfig) -> Self {
        let store = Arc::new(ScrollStateManager::new());
        let drops = Rc::new(RefCell::new(Vec::new()));
        let log = drops.clone();
        let dnd = DndManager::with_scroll_states(scope, config, store.clone(), move |drag, drop| {
            log.borrow_mut()
                .push((drag.entity_id().to_string(), drop.entity_id().to_string()));
        });
        Self { dnd, store, drops }
    }

    pub fn now(&self) -> Duration {
        self.dnd.scheduler().now()
    }

    /// Pump a single frame, one frame interval after the last.
    pub fn frame(&self) {
        self.dnd.run_frame(self.now() + FRAME);
    }

    pub fn frames(&self, count: usize) {
        for _ in 0..count {
            self.frame();
        }
    }

    /// Pump frames until `ms` milliseconds have passed.
    pub fn advance_ms(&self, ms: u64) {
        let until = self.now() + Duration::from_millis(ms);
        self.dnd.scheduler().run_until(until, FRAME);
    }

    pub fn drops(&self) -> Vec<(String, String)> {
        self.drops.borrow().clone()
    }

    /// Mount a plain sortable item at `rect`.
    pub fn item(
        &self,
        id: &str,
        index: usize,
        rect: Rect,
        sort: Option<&Rc<SortManager>>,
        scroll_parent: Option<&Rc<ScrollManager>>,
    ) -> (Rc<EntityManager>, Rc<MockNode>) {
        let node = MockNode::new(rect);
        let manager = EntityManager::new(
            &self.dnd,
            EntityManagerOptions {
                entity_id: id.to_string(),
                index,
                parent: None,
                scroll_parent: scroll_parent.cloned(),
                sort_manager: sort.cloned(),
                nodes: ready(EntityNodes::single(node.clone())),
                get_data: item_data(id),
            },
        );
        (manager, node)
    }

    /// Mount a scroll container at `rect` over content of the given size.
    pub fn scroll_container(
        &self,
        id: &str,
        rect: Rect,
        content: (f64, f64),
        parent: Option<&Rc<ScrollManager>>,
    ) -> (Rc<ScrollManager>, Rc<MockScrollNode>) {
        let node = MockScrollNode::new(rect, content.0, content.1);
        let scroll_node: ScrollNodeRef = node.clone();
        let manager = ScrollManager::new(
            &self.dnd,
            ScrollManagerOptions {
                id: id.to_string(),
                accepts: vec!["item".to_string()],
                parent: parent.cloned(),
                node: ready(scroll_node),
            },
        );
        (manager, node)
    }
}

// ============================================================================
// Event Recording
// ============================================================================

const ALL_EVENTS: [DragEventKind; 8] = [
    DragEventKind::DragStart,
    DragEventKind::DragMove,
    DragEventKind::DragEnd,
    DragEventKind::DragEnter,
    DragEventKind::DragLeave,
    DragEventKind::BeginDragScroll,
    DragEventKind::UpdateDragScroll,
    DragEventKind::EndDragScroll,
];

/// Records every drag event of an arena.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<(DragEventKind, DragSummary)>>>,
}

impl EventLog {
    pub fn attach(dnd: &DndManager) -> Self {
        let log = Self::default();
        for kind in ALL_EVENTS {
            let events = log.events.clone();
            dnd.emitter().on(kind, None, move |snapshot| {
                events.borrow_mut().push((kind, snapshot.summary()));
            });
        }
        log
    }

    pub fn kinds(&self) -> Vec<DragEventKind> {
        self.events.borrow().iter().map(|(kind, _)| *kind).collect()
    }

    /// Event kinds other than the per-frame `DragMove`.
    pub fn transitions(&self) -> Vec<DragEventKind> {
        self.kinds()
            .into_iter()
            .filter(|kind| *kind != DragEventKind::DragMove)
            .collect()
    }

    pub fn last(&self, kind: DragEventKind) -> Option<DragSummary> {
        self.events
            .borrow()
            .iter()
            .rev()
            .find(|(event, _)| *event == kind)
            .map(|(_, summary)| summary.clone())
    }

    /// Summaries of every event of `kind`, oldest first.
    pub fn all(&self, kind: DragEventKind) -> Vec<DragSummary> {
        self.events
            .borrow()
            .iter()
            .filter(|(event, _)| *event == kind)
            .map(|(_, summary)| summary.clone())
            .collect()
    }

    pub fn count(&self, kind: DragEventKind) -> usize {
        self.events.borrow().iter().filter(|(event, _)| *event == kind).count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}
