//! Pure geometry helpers for hit testing, sibling ordering and animation
//! timing. Stateless and free of any host dependency.

pub mod hitbox;
pub mod path;
pub mod timing;

pub use hitbox::{
    adjust_hitbox, adjust_hitbox_for_movement, calculate_hitbox, calculate_scroll_hitbox,
    closest_center, element_scroll_offsets, get_best_intersect, get_scroll_intersection,
    hitbox_dimensions, intersection_ratio,
};
pub use path::{get_sibling_direction, SiblingDirection};
pub use timing::{drop_duration, drop_duration_for_distance};
