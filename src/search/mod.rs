//! Search module - polling template search
//!
//! Retries the matcher against fresh screenshots until a match or timeout,
//! optionally keeping every screenshot for debugging.

mod controller;
mod debug;

pub use controller::{SearchController, SearchState, DEFAULT_POLL_INTERVAL};
pub use debug::{debug_timestamp, DebugArtifacts};
