//! Terminal input module (engine-facing).
//!
//! This module is independent of any UI framework. It maps `crossterm` key
//! events into [`MenuCommand`]s and mouse events into the
//! [`crate::types::PointerEvent`]s a session consumes, converting screen cells
//! into piece-geometry units.

pub mod map;
pub mod pointer;

pub use fullkit_types as types;

pub use map::{handle_key_event, should_quit, MenuCommand};
pub use pointer::{PointerBatch, PointerTracker};
