//! Infrastructure layer for storing sheets outside the process.
//!
//! Sheets are written as XML documents of cell names and their raw text;
//! values are never stored and are recomputed when a document is read back.

pub mod persistence;

pub use persistence::*;
