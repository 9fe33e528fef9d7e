//! Unit tests for the drag engine.

mod emitter_tests;
mod scheduler_tests;
mod scroll_state_tests;
mod snapshot_tests;
