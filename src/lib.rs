//! fullkit (workspace facade crate).
//!
//! Re-exports the member crates as `fullkit::{core,adapter,term,input,engine,types}`
//! so integration tests, benches and the binary share one import path.

pub use fullkit_adapter as adapter;
pub use fullkit_core as core;
pub use fullkit_engine as engine;
pub use fullkit_input as input;
pub use fullkit_term as term;
pub use fullkit_types as types;
