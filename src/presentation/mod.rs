//! Presentation layer: the command-line shell around the engine.
//!
//! This module parses command-line arguments with clap and prints sheet
//! contents and expression results to stdout.

pub mod args;
pub mod commands;

pub use args::*;
pub use commands::*;
