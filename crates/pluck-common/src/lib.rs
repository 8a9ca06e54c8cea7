//! Common utilities for pluck.
//!
//! This crate provides shared infrastructure used by the other pluck crates:
//! - **Warning System** - colored terminal output for selector text that is
//!   accepted but partly ignored

pub mod warning;
