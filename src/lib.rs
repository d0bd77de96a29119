//! cellgrid - Cell Grid Formula Engine
//!
//! A fixed-size grid of named cells with single-hop `=REF` resolution, plus a
//! standalone arithmetic expression engine with variables, built in Rust.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
