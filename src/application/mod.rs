//! Application layer sitting between the grid and whatever displays it.
//!
//! The session here applies edits, tracks the rendered value of every cell
//! from change notifications, and reports the outcome of save and load.

pub mod state;

pub use state::*;
