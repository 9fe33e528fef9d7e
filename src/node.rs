//! View-layer node contracts.
//!
//! The engine never owns real UI nodes. The host wraps its own node type in
//! these traits so managers can measure it and apply the small set of style
//! changes the reflow animation needs. Style mutators default to no-ops for
//! hosts that render the reflow themselves from emitted events.

use crate::types::{Margins, Point, Rect, ScrollMetrics, Size, Transition};
use std::rc::Rc;

/// A mounted visual node.
pub trait VisualNode {
    /// Border box in viewport coordinates.
    fn bounding_rect(&self) -> Rect;

    /// Outer margins, used to size the drag ghost and placeholder.
    fn margins(&self) -> Margins {
        Margins::default()
    }

    /// Translate the node visually without affecting layout.
    fn set_translation(&self, _offset: Option<Point>, _transition: Transition) {}

    /// Suppress or restore the node's display.
    fn set_hidden(&self, _hidden: bool) {}

    /// Force the node's extent (placeholder sizing); `None` restores it.
    fn set_extent(&self, _extent: Option<Size>, _transition: Transition) {}
}

/// A scrollable container node.
pub trait ScrollNode: VisualNode {
    fn scroll_metrics(&self) -> ScrollMetrics;

    fn scroll_by(&self, dx: f64, dy: f64);

    fn scroll_to(&self, x: f64, y: f64);
}

pub type NodeRef = Rc<dyn VisualNode>;
pub type ScrollNodeRef = Rc<dyn ScrollNode>;

/// The node pair an entity needs: the node that moves during reflow and
/// the node that is measured for the hitbox.
#[derive(Clone)]
pub struct EntityNodes {
    pub entity: NodeRef,
    pub measure: NodeRef,
}

impl EntityNodes {
    pub fn new(entity: NodeRef, measure: NodeRef) -> Self {
        Self { entity, measure }
    }

    /// Use the same node for both roles.
    pub fn single(node: NodeRef) -> Self {
        Self {
            entity: node.clone(),
            measure: node,
        }
    }
}
