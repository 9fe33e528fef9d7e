//! Core types for the drag-and-drop engine.
//!
//! This module defines the geometric primitives shared by every manager,
//! plus the data payload that entities expose to hit testing and sorting.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Geometry Primitives
// ============================================================================

/// A point in document or viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Coordinate along an axis
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }
}

/// Width and height of a box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Length along an axis
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

/// A rectangle as reported by the view layer (viewport coordinates).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Outer margins of a visual node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

// ============================================================================
// Hitbox
// ============================================================================

/// Axis-aligned rectangle `[min_x, min_y, max_x, max_y]`.
///
/// Constructors normalize the corners so `min <= max` always holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Hitbox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    pub fn from_array(corners: [f64; 4]) -> Self {
        Self::new(corners[0], corners[1], corners[2], corners[3])
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Shift by a delta without resizing
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// True when the rectangles share a region of positive area
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }
}

// ============================================================================
// Scroll Types
// ============================================================================

/// Current scroll offsets of a container and their maxima.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollState {
    pub x: f64,
    pub y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Accumulated ancestor scroll offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinateShift {
    pub x: f64,
    pub y: f64,
}

impl CoordinateShift {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Raw scroll measurements read from a scroll container node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_left: f64,
    pub scroll_top: f64,
    pub scroll_width: f64,
    pub scroll_height: f64,
    pub client_width: f64,
    pub client_height: f64,
}

/// One of the four edges of a scroll container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }

    /// Axis along which scrolling toward this side happens
    pub fn axis(&self) -> Axis {
        match self {
            Side::Top | Side::Bottom => Axis::Vertical,
            Side::Left | Side::Right => Axis::Horizontal,
        }
    }

    /// Whether scrolling toward this side increases the offset
    pub fn increases_offset(&self) -> bool {
        matches!(self, Side::Right | Side::Bottom)
    }
}

/// Owner of a resize or visibility observer.
///
/// Entity ids and scroll container ids live in separate namespaces and may
/// coincide (a lane entity and the lane's own scroller), so observers are
/// keyed by kind as well as id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObserverKey {
    Entity(String),
    Scroll(String),
}

impl ObserverKey {
    pub fn entity(id: impl Into<String>) -> Self {
        Self::Entity(id.into())
    }

    pub fn scroll(id: impl Into<String>) -> Self {
        Self::Scroll(id.into())
    }

    /// Host-facing node id
    pub fn id(&self) -> &str {
        match self {
            Self::Entity(id) | Self::Scroll(id) => id,
        }
    }
}

// ============================================================================
// Entity Data
// ============================================================================

/// Direction along which a sortable group lays out its items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    #[default]
    Vertical,
}

/// How a style change should animate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Apply immediately
    None,
    /// Animate siblings moving out of the way
    OutOfTheWay,
    /// Animate the placeholder growing or shrinking
    Placeholder,
}

/// Data payload exposed by an entity to hit testing and sorting.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityData {
    /// Drag type of this entity (e.g. "item", "lane", "placeholder")
    #[serde(rename = "type")]
    pub kind: String,
    /// Host-level identifier of the underlying content
    pub id: String,
    /// Drag types this entity accepts as a drop target
    pub accepts: Vec<String>,
    /// Axis of the sortable group this entity belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_axis: Option<Axis>,
    /// Scroll edge side, set only on scroll edge entities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    /// Free-form host payload
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub payload: Map<String, Value>,
}

impl EntityData {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_accepts<I, S>(mut self, accepts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepts = accepts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_payload(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    pub fn accepts_type(&self, kind: &str) -> bool {
        self.accepts.iter().any(|accepted| accepted == kind)
    }
}
