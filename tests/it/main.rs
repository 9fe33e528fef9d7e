//! Single test binary entry point.
//!
//! This consolidates all tests into a single binary following matklad's best practices,
//! reducing linking overhead.
//!
//! Structure:
//! - helpers: Mock view nodes, arena builder, event recorder
//! - integration: Multi-manager drag workflows driven frame by frame
//! - unit: Single-component unit and property tests

mod helpers;
mod unit;
