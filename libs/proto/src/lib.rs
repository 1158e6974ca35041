//! Overmark annotation and document tree definitions
//!
//! This crate defines the core data structures for:
//! - Annotations over a flat run of text, and the non-overlapping segments
//!   they resolve into
//! - A platform-agnostic document tree the engine rebuilds with highlight
//!   wrappers spliced in

pub mod annotation;
pub mod tree;

pub use annotation::*;
pub use tree::*;
