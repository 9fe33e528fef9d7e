//! Engine configuration.
//!
//! Every tunable defaults to the value in [`crate::constants`]. Hosts may
//! override a subset from JSON; missing fields keep their defaults.

use crate::constants::*;
use crate::error::{DndError, DndResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for drag detection, hit testing, auto-scroll and animation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DndConfig {
    /// Pointer travel before a pointer-down turns into a drag
    pub drag_threshold: f64,
    /// Thickness of the auto-scroll edge strips
    pub scroll_edge_thickness: f64,
    /// Strength divisor for auto-scroll speed
    pub scroll_strength_modifier: f64,
    /// Penalty for candidates the drag has moved past
    pub intersect_axis_penalty: f64,
    /// Size of the synthetic entity for drags from outside (width, height)
    pub html_drag_size: (f64, f64),
    pub html_leave_debounce_ms: u64,
    pub sort_enter_debounce_ms: u64,
    pub sort_leave_debounce_ms: u64,
    pub drop_duration_min_ms: f64,
    pub drop_duration_max_ms: f64,
    pub drop_duration_max_distance: f64,
}

impl Default for DndConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DRAG_THRESHOLD,
            scroll_edge_thickness: SCROLL_EDGE_THICKNESS,
            scroll_strength_modifier: SCROLL_STRENGTH_MODIFIER,
            intersect_axis_penalty: INTERSECT_AXIS_PENALTY,
            html_drag_size: (HTML_DRAG_WIDTH, HTML_DRAG_HEIGHT),
            html_leave_debounce_ms: HTML_LEAVE_DEBOUNCE_MS,
            sort_enter_debounce_ms: SORT_ENTER_DEBOUNCE_MS,
            sort_leave_debounce_ms: SORT_LEAVE_DEBOUNCE_MS,
            drop_duration_min_ms: DROP_DURATION_MIN_MS,
            drop_duration_max_ms: DROP_DURATION_MAX_MS,
            drop_duration_max_distance: DROP_DURATION_MAX_DISTANCE,
        }
    }
}

impl DndConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> DndResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break hit testing or animation math.
    pub fn validate(&self) -> DndResult<()> {
        if !(self.drag_threshold >= 0.0) {
            return Err(invalid("drag_threshold", "must be >= 0"));
        }
        if !(self.scroll_edge_thickness > 0.0) {
            return Err(invalid("scroll_edge_thickness", "must be > 0"));
        }
        if !(self.scroll_strength_modifier > 0.0) {
            return Err(invalid("scroll_strength_modifier", "must be > 0"));
        }
        if !(self.intersect_axis_penalty >= 0.0) {
            return Err(invalid("intersect_axis_penalty", "must be >= 0"));
        }
        if !(self.html_drag_size.0 > 0.0 && self.html_drag_size.1 > 0.0) {
            return Err(invalid("html_drag_size", "must be positive"));
        }
        if !(self.drop_duration_min_ms >= 0.0) {
            return Err(invalid("drop_duration_min_ms", "must be >= 0"));
        }
        if self.drop_duration_min_ms > self.drop_duration_max_ms {
            return Err(invalid("drop_duration_max_ms", "must be >= drop_duration_min_ms"));
        }
        if !(self.drop_duration_max_distance > 0.0) {
            return Err(invalid("drop_duration_max_distance", "must be > 0"));
        }
        Ok(())
    }

    pub fn html_leave_debounce(&self) -> Duration {
        Duration::from_millis(self.html_leave_debounce_ms)
    }

    pub fn sort_enter_debounce(&self) -> Duration {
        Duration::from_millis(self.sort_enter_debounce_ms)
    }

    pub fn sort_leave_debounce(&self) -> Duration {
        Duration::from_millis(self.sort_leave_debounce_ms)
    }
}

fn invalid(field: &'static str, reason: &'static str) -> DndError {
    DndError::InvalidConfig { field, reason }
}
