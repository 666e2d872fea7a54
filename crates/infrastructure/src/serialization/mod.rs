//! Deterministic JSON serialization for the session files.
//!
//! - Fields in declaration order
//! - 2-space indentation
//! - Trailing newline

mod json;

pub use json::*;
