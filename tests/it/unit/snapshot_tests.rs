//! Snapshot tests using the insta crate.
//!
//! To update snapshots after intentional changes:
//! ```sh
//! cargo insta test --accept
//! ```

use crate::helpers::TestArena;
use humanboard_dnd::{Point, Rect};
use serde_json::json;

#[test]
fn snapshot_drag_summary_over_target() {
    let arena = TestArena::new("board");
    let _a = arena.item("a", 0, Rect::new(0.0, 0.0, 100.0, 40.0), None, None);
    let _b = arena.item("b", 1, Rect::new(0.0, 100.0, 100.0, 40.0), None, None);
    let drag = arena.dnd.drag_manager();

    drag.drag_start("a", Point::new(50.0, 20.0));
    drag.drag_move(Point::new(50.0, 120.0));
    arena.frame();

    let summary = drag.snapshot().summary();
    let json = serde_json::to_string_pretty(&summary).expect("serialize");
    insta::assert_snapshot!(json, @r#"
    {
      "drag_entity_id": "a",
      "drag_origin": {
        "x": 50.0,
        "y": 20.0
      },
      "drag_position": {
        "x": 50.0,
        "y": 120.0
      },
      "drag_origin_hitbox": {
        "min_x": 0.0,
        "min_y": 0.0,
        "max_x": 100.0,
        "max_y": 40.0
      },
      "drag_hitbox": {
        "min_x": 0.0,
        "min_y": 100.0,
        "max_x": 100.0,
        "max_y": 140.0
      },
      "primary_intersection_id": "b",
      "scroll_intersection": null
    }
    "#);
}

#[test]
fn snapshot_html_drag_entity_data() {
    let arena = TestArena::new("board");
    let drag = arena.dnd.drag_manager();
    drag.drag_start_html(Point::new(0.0, 0.0), json!({ "files": ["notes.md"] }));

    let data = drag
        .snapshot()
        .drag_entity
        .expect("html entity")
        .data();
    insta::assert_json_snapshot!(data, { ".id" => "[id]" }, @r#"
    {
      "type": "html-dnd",
      "id": "[id]",
      "accepts": [],
      "payload": {
        "files": [
          "notes.md"
        ]
      }
    }
    "#);
}
