//! Drag state machine - one explicit state instead of scattered fields.
//!
//! ## State Transitions
//!
//! ```text
//! Idle      -> Armed       (pointer down on an entity)
//! Armed     -> Idle        (pointer up before the threshold: a click)
//! Armed     -> Dragging    (pointer moved past the threshold)
//! Armed     -> Resolving   (threshold passed but the entity is not registered yet)
//! Resolving -> Dragging    (entity registered; resolved on the next move frame)
//! Idle      -> Dragging    (HTML drag-over from outside the board)
//!
//! Any -> Idle              (drag end / cancel)
//! ```

use crate::entity::{EntityRef, PointerEntity};
use crate::types::{Hitbox, Margins, Point};
use serde_json::Value;
use std::rc::Rc;

/// Everything known about the in-flight drag.
#[derive(Clone)]
pub struct DragSession {
    /// Entity being dragged
    pub entity: EntityRef,
    /// Pointer position when the drag started
    pub origin: Point,
    /// Latest processed pointer position
    pub position: Point,
    /// Live hitbox of the entity at drag start
    pub origin_hitbox: Hitbox,
    /// Outer margins of the dragged node
    pub margin: Margins,
    /// Current best drop target
    pub primary: Option<EntityRef>,
    /// Current auto-scroll edge and its strength
    pub scroll: Option<(EntityRef, f64)>,
    /// Synthetic entity when the drag came from outside the board
    pub html_entity: Option<Rc<PointerEntity>>,
    /// Payload handed over by an external drop
    pub html_payload: Option<Value>,
}

impl DragSession {
    pub fn is_html(&self) -> bool {
        self.html_entity.is_some()
    }
}

/// State of the scope's single drag.
#[derive(Clone, Default)]
pub enum DragState {
    /// No pointer interaction
    #[default]
    Idle,

    /// Pointer is down on an entity but has not moved far enough
    Armed { entity_id: String, origin: Point },

    /// Drag requested for an entity that has not finished registering
    Resolving {
        entity_id: String,
        origin: Point,
        position: Point,
    },

    /// Drag in progress
    Dragging(DragSession),
}

impl DragState {
    /// Returns true while a drag session exists
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging(_))
    }

    /// Returns true if the engine owes the host a drag (dragging or resolving)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Dragging(_) | Self::Resolving { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn session(&self) -> Option<&DragSession> {
        match self {
            Self::Dragging(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut DragSession> {
        match self {
            Self::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// Id of the entity the pointer went down on, in any non-idle state
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Armed { entity_id, .. } | Self::Resolving { entity_id, .. } => Some(entity_id),
            Self::Dragging(session) => Some(session.entity.entity_id()),
        }
    }
}
