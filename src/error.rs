//! Error types for the fallible edges of the engine.
//!
//! Drag handling itself never fails: missing nodes or ids make the current
//! frame a no-op. Errors only surface from configuration and scroll-state
//! import/export.

use thiserror::Error;

/// Errors that can occur while loading configuration or persisted state
#[derive(Error, Debug)]
pub enum DndError {
    /// JSON parsing or serialization error from serde_json
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of range
    #[error("Invalid config: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },

    /// Generic error message
    #[error("{0}")]
    Other(String),
}

/// Result type alias for engine operations
pub type DndResult<T> = Result<T, DndError>;
