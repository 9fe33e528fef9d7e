//! Unit tests for persisted scroll offsets.

use humanboard_dnd::{CoordinateShift, ScrollStateManager};

#[test]
fn test_json_round_trip_restores_offsets() {
    let store = ScrollStateManager::new();
    store.set_scroll_state("board-a", "lane-1", CoordinateShift::new(0.0, 240.0));
    store.set_scroll_state("board-a", "board", CoordinateShift::new(120.0, 0.0));

    let json = store.to_json().expect("serialize");
    let restored = ScrollStateManager::new();
    restored.restore_json(&json).expect("restore");

    assert_eq!(restored.snapshot(), store.snapshot());
    assert_eq!(
        restored.get_scroll_state("lane-1"),
        Some(CoordinateShift::new(0.0, 240.0))
    );
}

#[test]
fn test_shared_record_survives_one_unmount() {
    let store = ScrollStateManager::new();
    store.set_scroll_state("main", "inbox", CoordinateShift::new(0.0, 10.0));
    store.set_scroll_state("popout", "inbox", CoordinateShift::new(0.0, 30.0));

    assert_eq!(store.unmount_scope("popout"), 0);
    let record = store.snapshot().remove("inbox").expect("kept");
    assert_eq!(record.offset, CoordinateShift::new(0.0, 30.0));
    assert_eq!(record.scopes.into_iter().collect::<Vec<_>>(), vec!["main"]);
}

#[test]
fn test_global_store_is_shared() {
    let a = ScrollStateManager::global();
    let b = ScrollStateManager::global();
    assert!(std::sync::Arc::ptr_eq(&a, &b));
}
