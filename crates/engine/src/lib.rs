//! Gesture planning: turn "put piece (row, col) in place" into the pointer
//! gesture a human would perform, and optionally apply it.
//!
//! Used by the JSON adapter's `place` command mode and by tests that want to
//! drive a session without computing coordinates by hand.

pub mod place;

pub use fullkit_core as core;
pub use fullkit_types as types;

pub use place::{apply_place, plan_placement, PlacementPlan, PlanError};
