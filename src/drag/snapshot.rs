//! Drag event payloads.

use crate::emitter::Emitter;
use crate::entity::EntityRef;
use crate::geometry::adjust_hitbox_for_movement;
use crate::types::{Hitbox, Margins, Point};
use serde::Serialize;
use serde_json::Value;

/// Events published by the Drag Manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DragEventKind {
    DragStart,
    DragMove,
    DragEnd,
    DragEnter,
    DragLeave,
    BeginDragScroll,
    UpdateDragScroll,
    EndDragScroll,
}

/// Emitter type shared by every manager in a scope.
pub type DragEmitter = Emitter<DragEventKind, DragSnapshot>;

/// Snapshot of the drag session at the moment an event fired.
#[derive(Clone, Default)]
pub struct DragSnapshot {
    pub drag_entity: Option<EntityRef>,
    pub drag_entity_margin: Margins,
    pub drag_origin: Option<Point>,
    pub drag_position: Option<Point>,
    pub drag_origin_hitbox: Option<Hitbox>,
    pub primary_intersection: Option<EntityRef>,
    pub scroll_intersection: Option<(EntityRef, f64)>,
    pub html_payload: Option<Value>,
}

impl DragSnapshot {
    pub fn drag_entity_id(&self) -> Option<&str> {
        self.drag_entity.as_ref().map(|entity| entity.entity_id())
    }

    /// Current dragged rectangle: the origin hitbox moved with the pointer.
    pub fn drag_hitbox(&self) -> Option<Hitbox> {
        Some(adjust_hitbox_for_movement(
            self.drag_origin_hitbox?,
            self.drag_origin?,
            self.drag_position?,
        ))
    }

    pub fn scroll_strength(&self) -> Option<f64> {
        self.scroll_intersection.as_ref().map(|(_, strength)| *strength)
    }

    /// Serializable view for overlays, logging and tests.
    pub fn summary(&self) -> DragSummary {
        DragSummary {
            drag_entity_id: self.drag_entity_id().map(str::to_string),
            drag_origin: self.drag_origin,
            drag_position: self.drag_position,
            drag_origin_hitbox: self.drag_origin_hitbox,
            drag_hitbox: self.drag_hitbox(),
            primary_intersection_id: self
                .primary_intersection
                .as_ref()
                .map(|entity| entity.entity_id().to_string()),
            scroll_intersection: self
                .scroll_intersection
                .as_ref()
                .map(|(entity, strength)| (entity.entity_id().to_string(), *strength)),
        }
    }
}

/// Id-only, serializable form of a [`DragSnapshot`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DragSummary {
    pub drag_entity_id: Option<String>,
    pub drag_origin: Option<Point>,
    pub drag_position: Option<Point>,
    pub drag_origin_hitbox: Option<Hitbox>,
    pub drag_hitbox: Option<Hitbox>,
    pub primary_intersection_id: Option<String>,
    pub scroll_intersection: Option<(String, f64)>,
}
