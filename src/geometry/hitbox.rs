//! Hitbox arithmetic and intersection heuristics.
//!
//! Hitboxes are stored in document coordinates (`initial`) and translated to
//! live viewport coordinates with the owning container's scroll state and
//! the accumulated ancestor shift. Nothing here touches a visual node.

use crate::constants::MOVEMENT_PRECISION;
use crate::entity::{Entity, EntityRef};
use crate::types::{
    CoordinateShift, Hitbox, Margins, Point, Rect, ScrollMetrics, ScrollState, Side, Size,
};

/// Round to the engine's movement precision to avoid subpixel jitter.
#[inline]
fn to_precision(value: f64) -> f64 {
    let factor = 10f64.powi(MOVEMENT_PRECISION);
    (value * factor).round() / factor
}

#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

// ============================================================================
// Hitbox Construction
// ============================================================================

/// Convert a viewport rect into a document-space hitbox.
///
/// Adds the container scroll offset and ancestor shift, and grows the box
/// by `margins` when given.
pub fn calculate_hitbox(
    rect: Rect,
    scroll: Option<ScrollState>,
    shift: Option<CoordinateShift>,
    margins: Option<Margins>,
) -> Hitbox {
    let scroll = scroll.unwrap_or_default();
    let shift = shift.unwrap_or_default();
    let margins = margins.unwrap_or_default();

    let min_x = rect.left + scroll.x + shift.x - margins.left;
    let min_y = rect.top + scroll.y + shift.y - margins.top;
    let max_x = min_x + rect.width + margins.left + margins.right;
    let max_y = min_y + rect.height + margins.top + margins.bottom;

    Hitbox::new(min_x, min_y, max_x, max_y)
}

/// Hitbox of one edge strip of a scroll container.
pub fn calculate_scroll_hitbox(
    rect: Rect,
    scroll: Option<ScrollState>,
    shift: Option<CoordinateShift>,
    side: Side,
    thickness: f64,
) -> Hitbox {
    let full = calculate_hitbox(rect, scroll, shift, None);
    let thickness = thickness.min(full.width()).min(full.height()).max(0.0);

    match side {
        Side::Top => Hitbox::new(full.min_x, full.min_y, full.max_x, full.min_y + thickness),
        Side::Right => Hitbox::new(full.max_x - thickness, full.min_y, full.max_x, full.max_y),
        Side::Bottom => Hitbox::new(full.min_x, full.max_y - thickness, full.max_x, full.max_y),
        Side::Left => Hitbox::new(full.min_x, full.min_y, full.min_x + thickness, full.max_y),
    }
}

/// Translate a stored hitbox into live coordinates.
pub fn adjust_hitbox(
    initial: Hitbox,
    scroll: Option<ScrollState>,
    shift: Option<CoordinateShift>,
) -> Hitbox {
    let scroll = scroll.unwrap_or_default();
    let shift = shift.unwrap_or_default();
    initial.translate(-(scroll.x + shift.x), -(scroll.y + shift.y))
}

/// Translate a hitbox by the pointer's displacement since drag start.
pub fn adjust_hitbox_for_movement(hitbox: Hitbox, origin: Point, position: Point) -> Hitbox {
    let dx = finite_or_zero(position.x - origin.x);
    let dy = finite_or_zero(position.y - origin.y);

    Hitbox::new(
        to_precision(hitbox.min_x + dx),
        to_precision(hitbox.min_y + dy),
        to_precision(hitbox.max_x + dx),
        to_precision(hitbox.max_y + dy),
    )
}

/// Outer size of a hitbox including margins.
pub fn hitbox_dimensions(hitbox: Hitbox, margins: Margins) -> Size {
    Size::new(
        hitbox.width() + margins.left + margins.right,
        hitbox.height() + margins.top + margins.bottom,
    )
}

/// Derive scroll offsets and their maxima from raw container metrics.
pub fn element_scroll_offsets(metrics: ScrollMetrics) -> ScrollState {
    let max_x = (metrics.scroll_width - metrics.client_width).max(0.0);
    let max_y = (metrics.scroll_height - metrics.client_height).max(0.0);

    ScrollState {
        x: metrics.scroll_left.clamp(0.0, max_x),
        y: metrics.scroll_top.clamp(0.0, max_y),
        max_x,
        max_y,
    }
}

// ============================================================================
// Intersection
// ============================================================================

/// Overlap area divided by the union area. Zero for disjoint or
/// edge-touching rectangles.
pub fn intersection_ratio(a: Hitbox, b: Hitbox) -> f64 {
    let overlap_w = a.max_x.min(b.max_x) - a.min_x.max(b.min_x);
    let overlap_h = a.max_y.min(b.max_y) - a.min_y.max(b.min_y);

    if overlap_w <= 0.0 || overlap_h <= 0.0 {
        return 0.0;
    }

    let overlap = overlap_w * overlap_h;
    let union = a.area() + b.area() - overlap;
    if union <= 0.0 { 0.0 } else { overlap / union }
}

/// Weighted distance of one candidate to the drag rectangle.
///
/// Top-left to top-left distance, plus `penalty` once the drag's top-left
/// has moved past the candidate's center along its sort axis.
fn intersect_score(entity: &dyn Entity, drag_top_left: Point, drag_id: &str, penalty: f64) -> f64 {
    if entity.entity_id() == drag_id {
        return f64::INFINITY;
    }

    let hitbox = entity.hitbox();
    let axis = entity.data().sort_axis.unwrap_or_default();
    let modifier = if drag_top_left.along(axis) > hitbox.center().along(axis) {
        penalty
    } else {
        0.0
    };

    hitbox.top_left().distance_to(drag_top_left) + modifier
}

/// Pick the best drop target among already-intersecting candidates.
///
/// The dragged entity itself is never returned.
pub fn get_best_intersect(
    hits: &[EntityRef],
    drag_hitbox: Hitbox,
    drag_id: &str,
    penalty: f64,
) -> Option<EntityRef> {
    let drag_top_left = drag_hitbox.top_left();

    hits.iter()
        .map(|entity| (intersect_score(entity.as_ref(), drag_top_left, drag_id, penalty), entity))
        .filter(|(score, _)| score.is_finite())
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, entity)| entity.clone())
}

/// Pick the best scroll edge and compute how deep the drag penetrates it.
///
/// Strength is `thickness - distance from the drag edge to the container
/// edge`, clamped to `[0, thickness]`.
pub fn get_scroll_intersection(
    hits: &[EntityRef],
    drag_hitbox: Hitbox,
    drag_id: &str,
    thickness: f64,
    penalty: f64,
) -> Option<(EntityRef, f64)> {
    let best = get_best_intersect(hits, drag_hitbox, drag_id, penalty)?;
    let side = best.data().side?;
    let edge = best.hitbox();

    let distance = match side {
        Side::Top => drag_hitbox.min_y - edge.min_y,
        Side::Right => edge.max_x - drag_hitbox.max_x,
        Side::Bottom => edge.max_y - drag_hitbox.max_y,
        Side::Left => drag_hitbox.min_x - edge.min_x,
    };
    let strength = (thickness - distance).clamp(0.0, thickness);

    Some((best, strength))
}

/// Candidate whose center is closest to the drag rectangle's center.
pub fn closest_center(hits: &[EntityRef], drag_hitbox: Hitbox, drag_id: &str) -> Option<EntityRef> {
    let drag_center = drag_hitbox.center();

    hits.iter()
        .filter(|entity| entity.entity_id() != drag_id)
        .map(|entity| (entity.hitbox().center().distance_to(drag_center), entity))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, entity)| entity.clone())
}
