//! Engine-wide constants.
//!
//! Centralizes magic numbers for hit testing, auto-scroll and animation so
//! the defaults in [`crate::config::DndConfig`] have a single source.

// ============================================================================
// Drag Detection
// ============================================================================

/// Pointer travel (in pixels) required before a pointer-down becomes a drag
pub const DRAG_THRESHOLD: f64 = 5.0;

/// Decimal places kept when translating the dragged hitbox
pub const MOVEMENT_PRECISION: i32 = 2;

// ============================================================================
// Hit Testing
// ============================================================================

/// Penalty added to candidates the drag has already moved past
pub const INTERSECT_AXIS_PENALTY: f64 = 1000.0;

/// Width of the synthetic hitbox used for drags from outside the board
pub const HTML_DRAG_WIDTH: f64 = 150.0;

/// Height of the synthetic hitbox used for drags from outside the board
pub const HTML_DRAG_HEIGHT: f64 = 50.0;

/// Entity type reported by the synthetic HTML drag entity
pub const HTML_DRAG_TYPE: &str = "html-dnd";

// ============================================================================
// Auto-scroll
// ============================================================================

/// Thickness of each scroll edge strip in pixels
pub const SCROLL_EDGE_THICKNESS: f64 = 35.0;

/// Divisor applied to edge strength to get pixels scrolled per frame
pub const SCROLL_STRENGTH_MODIFIER: f64 = 8.0;

/// Entity type reported by scroll edge entities
pub const SCROLL_ENTITY_TYPE: &str = "scroll";

// ============================================================================
// Sorting & Animation
// ============================================================================

/// Entity type marking the placeholder slot of a sortable group
pub const PLACEHOLDER_TYPE: &str = "placeholder";

/// Debounce before a drag enter reflows siblings
pub const SORT_ENTER_DEBOUNCE_MS: u64 = 10;

/// Debounce before a drag leave resets siblings
pub const SORT_LEAVE_DEBOUNCE_MS: u64 = 100;

/// Time without a drag-over before an HTML drag counts as left
pub const HTML_LEAVE_DEBOUNCE_MS: u64 = 100;

/// Drop animation duration at zero distance
pub const DROP_DURATION_MIN_MS: f64 = 330.0;

/// Drop animation duration at or beyond [`DROP_DURATION_MAX_DISTANCE`]
pub const DROP_DURATION_MAX_MS: f64 = 550.0;

/// Distance at which the drop animation reaches its maximum duration
pub const DROP_DURATION_MAX_DISTANCE: f64 = 1500.0;

// ============================================================================
// Logging
// ============================================================================

/// Environment variable read by [`crate::logging::init`]
pub const LOG_ENV_VAR: &str = "HUMANBOARD_DND_LOG";

/// Filter used when [`LOG_ENV_VAR`] is unset
pub const DEFAULT_LOG_FILTER: &str = "warn";
