//! Drag lifecycle: thresholds, late registration, external drags, teardown.

use crate::helpers::{EventLog, MockNode, TestArena, item_data, slot};
use humanboard_dnd::drag::DragEventKind;
use humanboard_dnd::{
    Axis, DndConfig, DragState, EntityData, EntityManager, EntityManagerOptions, EntityNodes,
    Point, Rect, SortManager,
};
use serde_json::json;
use std::rc::Rc;

#[test]
fn test_click_below_threshold_is_not_a_drag() {
    let arena = TestArena::new("board");
    let _item = arena.item("card", 0, Rect::new(0.0, 0.0, 100.0, 40.0), None, None);
    let events = EventLog::attach(&arena.dnd);
    let drag = arena.dnd.drag_manager();

    drag.pointer_down("card", Point::new(10.0, 10.0));
    drag.pointer_move(Point::new(13.0, 13.0));
    arena.frame();
    drag.pointer_up(Point::new(13.0, 13.0));

    assert!(events.kinds().is_empty());
    assert!(matches!(drag.state(), DragState::Idle));
}

#[test]
fn test_threshold_uses_configured_distance() {
    let config = DndConfig {
        drag_threshold: 20.0,
        ..DndConfig::default()
    };
    let arena = TestArena::with_config("board", config);
    let _item = arena.item("card", 0, Rect::new(0.0, 0.0, 100.0, 40.0), None, None);
    let drag = arena.dnd.drag_manager();

    drag.pointer_down("card", Point::new(0.0, 0.0));
    drag.pointer_move(Point::new(12.0, 12.0));
    assert!(!drag.is_dragging());
    drag.pointer_move(Point::new(15.0, 15.0));
    assert!(drag.is_dragging());
}

#[test]
fn test_move_before_registration_resolves_later() {
    let arena = TestArena::new("board");
    let events = EventLog::attach(&arena.dnd);
    let (reader, mount) = slot::<EntityNodes>();
    let _late = EntityManager::new(
        &arena.dnd,
        EntityManagerOptions {
            entity_id: "late".to_string(),
            index: 0,
            parent: None,
            scroll_parent: None,
            sort_manager: None,
            nodes: reader,
            get_data: item_data("late"),
        },
    );
    let drag = arena.dnd.drag_manager();

    drag.drag_start("late", Point::new(10.0, 10.0));
    assert!(matches!(drag.state(), DragState::Resolving { .. }));
    drag.drag_move(Point::new(10.0, 40.0));
    arena.frame();
    assert!(events.kinds().is_empty());

    // The view layer mounts the node; registration happens on the next poll
    *mount.borrow_mut() = Some(EntityNodes::single(MockNode::new(Rect::new(0.0, 0.0, 100.0, 40.0))));
    arena.frame();
    assert!(arena.dnd.has_hitbox_entity("late"));
    assert!(events.kinds().is_empty());

    drag.drag_move(Point::new(10.0, 45.0));
    arena.frame();
    assert_eq!(
        events.kinds(),
        vec![DragEventKind::DragStart, DragEventKind::DragMove]
    );
    let start = events.last(DragEventKind::DragStart).expect("start");
    assert_eq!(start.drag_origin, Some(Point::new(10.0, 10.0)));
    assert!(drag.is_dragging());
}

#[test]
fn test_moves_are_coalesced_per_frame() {
    let arena = TestArena::new("board");
    let _item = arena.item("card", 0, Rect::new(0.0, 0.0, 100.0, 40.0), None, None);
    let events = EventLog::attach(&arena.dnd);
    let drag = arena.dnd.drag_manager();

    drag.drag_start("card", Point::new(0.0, 0.0));
    for step in 1..=10 {
        drag.drag_move(Point::new(step as f64, 0.0));
    }
    arena.frame();

    assert_eq!(events.count(DragEventKind::DragMove), 1);
    let moved = events.last(DragEventKind::DragMove).expect("move");
    assert_eq!(moved.drag_position, Some(Point::new(10.0, 0.0)));
    assert_eq!(moved.drag_hitbox.map(|hitbox| hitbox.min_x), Some(10.0));
}

#[test]
fn test_enter_and_leave_fire_only_on_change() {
    let arena = TestArena::new("board");
    let _a = arena.item("a", 0, Rect::new(0.0, 0.0, 100.0, 40.0), None, None);
    let _b = arena.item("b", 1, Rect::new(0.0, 100.0, 100.0, 40.0), None, None);
    let events = EventLog::attach(&arena.dnd);
    let drag = arena.dnd.drag_manager();

    drag.drag_start("a", Point::new(50.0, 20.0));
    for y in [110.0, 112.0, 114.0] {
        drag.drag_move(Point::new(50.0, y));
        arena.frame();
    }
    drag.drag_move(Point::new(50.0, 400.0));
    arena.frame();

    assert_eq!(
        events.transitions(),
        vec![
            DragEventKind::DragStart,
            DragEventKind::DragEnter,
            DragEventKind::DragLeave,
        ]
    );
}

#[test]
fn test_scoped_listener_only_sees_its_entity() {
    let arena = TestArena::new("board");
    let _a = arena.item("a", 0, Rect::new(0.0, 0.0, 100.0, 40.0), None, None);
    let _b = arena.item("b", 1, Rect::new(0.0, 100.0, 100.0, 40.0), None, None);
    let _c = arena.item("c", 2, Rect::new(0.0, 200.0, 100.0, 40.0), None, None);

    let entered = Rc::new(std::cell::Cell::new(0));
    let counter = entered.clone();
    arena
        .dnd
        .emitter()
        .on(DragEventKind::DragEnter, Some("c"), move |_| counter.set(counter.get() + 1));

    let drag = arena.dnd.drag_manager();
    drag.drag_start("a", Point::new(50.0, 20.0));
    drag.drag_move(Point::new(50.0, 120.0));
    arena.frame();
    assert_eq!(entered.get(), 0);

    drag.drag_move(Point::new(50.0, 220.0));
    arena.frame();
    assert_eq!(entered.get(), 1);
}

#[test]
fn test_accept_filter_excludes_foreign_types() {
    let arena = TestArena::new("board");
    let _item = arena.item("card", 0, Rect::new(0.0, 0.0, 100.0, 40.0), None, None);
    let node = MockNode::new(Rect::new(0.0, 100.0, 100.0, 40.0));
    let _lane = EntityManager::new(
        &arena.dnd,
        EntityManagerOptions {
            entity_id: "lane".to_string(),
            index: 1,
            parent: None,
            scroll_parent: None,
            sort_manager: None,
            nodes: crate::helpers::ready(EntityNodes::single(node)),
            get_data: Rc::new(|| EntityData::new("lane", "lane").with_accepts(["lane"])),
        },
    );
    let events = EventLog::attach(&arena.dnd);
    let drag = arena.dnd.drag_manager();

    drag.drag_start("card", Point::new(50.0, 20.0));
    drag.drag_move(Point::new(50.0, 120.0));
    arena.frame();

    assert_eq!(events.count(DragEventKind::DragEnter), 0);
}

#[test]
fn test_html_drag_leaves_after_silence() {
    let arena = TestArena::new("board");
    let _item = arena.item("card", 0, Rect::new(0.0, 0.0, 200.0, 100.0), None, None);
    let events = EventLog::attach(&arena.dnd);
    let drag = arena.dnd.drag_manager();

    drag.drag_move_html(Point::new(10.0, 10.0));
    assert!(drag.is_html_dragging());
    let start = events.last(DragEventKind::DragStart).expect("start");
    let id = start.drag_entity_id.expect("entity id");
    assert!(id.starts_with("board-htmldnd-"));
    assert_eq!(
        start.drag_origin_hitbox.map(|hitbox| hitbox.to_array()),
        Some([10.0, 10.0, 160.0, 60.0])
    );

    // Drag-over keeps arriving
    for _ in 0..4 {
        drag.drag_move_html(Point::new(12.0, 12.0));
        arena.advance_ms(40);
    }
    assert!(drag.is_html_dragging());

    // Then stops
    arena.advance_ms(150);
    assert!(!drag.is_html_dragging());
    assert!(matches!(drag.state(), DragState::Idle));
    let end = events.last(DragEventKind::DragEnd).expect("end");
    assert_eq!(end.primary_intersection_id, None);
}

#[test]
fn test_html_drop_hands_payload_to_target() {
    let arena = TestArena::new("board");
    let sort = SortManager::new(&arena.dnd, "inbox", Axis::Vertical);
    let node = MockNode::new(Rect::new(0.0, 0.0, 200.0, 100.0));
    let _target = EntityManager::new(
        &arena.dnd,
        EntityManagerOptions {
            entity_id: "inbox-item".to_string(),
            index: 0,
            parent: None,
            scroll_parent: None,
            sort_manager: Some(sort.clone()),
            nodes: crate::helpers::ready(EntityNodes::single(node)),
            get_data: Rc::new(|| EntityData::new("item", "inbox-item").with_accepts(["html-dnd"])),
        },
    );

    let payloads = Rc::new(std::cell::RefCell::new(Vec::new()));
    let seen = payloads.clone();
    arena.dnd.emitter().on(DragEventKind::DragEnd, None, move |snapshot| {
        let data = snapshot.drag_entity.as_ref().map(|entity| entity.data());
        seen.borrow_mut().push((snapshot.html_payload.clone(), data));
    });

    let drag = arena.dnd.drag_manager();
    drag.drag_move_html(Point::new(20.0, 20.0));
    drag.drag_move_html(Point::new(30.0, 30.0));
    arena.frame();
    drag.drag_end_html(Point::new(30.0, 30.0), json!({ "files": ["notes.md"] }));

    let (payload, data) = payloads.borrow()[0].clone();
    assert_eq!(payload, Some(json!({ "files": ["notes.md"] })));
    let data = data.expect("drag entity");
    assert_eq!(data.kind, "html-dnd");
    assert_eq!(data.payload.get("files"), Some(&json!(["notes.md"])));

    arena.advance_ms(600);
    let drops = arena.drops();
    assert_eq!(drops.len(), 1);
    assert!(drops[0].0.starts_with("board-htmldnd-"));
    assert_eq!(drops[0].1, "inbox-item");
}

#[test]
fn test_destroy_tears_down_arena() {
    let arena = TestArena::new("board");
    let (_lane, _node) = arena.scroll_container("lane", Rect::new(0.0, 0.0, 200.0, 300.0), (200.0, 900.0), None);
    let _item = arena.item("card", 0, Rect::new(0.0, 0.0, 100.0, 40.0), None, None);
    arena.store.set_scroll_state("board", "lane", humanboard_dnd::CoordinateShift::new(0.0, 40.0));
    arena.store.set_scroll_state("other", "lane-2", humanboard_dnd::CoordinateShift::new(0.0, 10.0));

    let drag = arena.dnd.drag_manager();
    drag.drag_start("card", Point::new(5.0, 5.0));
    drag.drag_move(Point::new(5.0, 50.0));

    arena.dnd.destroy();

    assert!(arena.dnd.hitbox_ids().is_empty());
    assert!(arena.dnd.scroll_ids().is_empty());
    assert_eq!(arena.dnd.emitter().listener_count(), 0);
    assert_eq!(arena.dnd.scheduler().pending_frame_tasks(), 0);
    assert!(!drag.is_dragging());
    assert_eq!(arena.store.get_scroll_state("lane"), None);
    assert!(arena.store.get_scroll_state("lane-2").is_some());
}
