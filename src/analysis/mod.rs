//! Analysis result types
//!
//! The structured output consumed by persistence and transport layers
//! outside this crate.

pub mod result;
