//! Drop animation timing.
//!
//! The same duration drives the overlay's snap-into-place animation and the
//! Sort Manager's finalize delay, so both finish on the same frame.

use crate::config::DndConfig;
use crate::types::Point;
use std::time::Duration;

/// Duration for a drop whose pointer is `distance` away from the target.
///
/// Linear between the configured minimum (distance 0) and maximum
/// (distance >= `drop_duration_max_distance`).
pub fn drop_duration_for_distance(distance: f64, config: &DndConfig) -> Duration {
    let span = config.drop_duration_max_ms - config.drop_duration_min_ms;
    let progress = if distance.is_nan() {
        0.0
    } else {
        (distance / config.drop_duration_max_distance).clamp(0.0, 1.0)
    };
    let ms = config.drop_duration_min_ms + span * progress;
    Duration::from_micros((ms.max(0.0) * 1000.0).round() as u64)
}

/// Duration for a drop released at `position` onto a target whose top-left
/// corner is `destination`.
pub fn drop_duration(position: Point, destination: Point, config: &DndConfig) -> Duration {
    drop_duration_for_distance(position.distance_to(destination), config)
}
