//! # Configuration Hierarchy
//!
//! Layered configuration for applications.
//!
//! This crate provides:
//! - `Hierarchy`: overrides, named sources and defaults behind one
//!   case-insensitive view
//! - Scoped views (`Hierarchy::sub`) over a dotted namespace
//! - Decoding the resolved configuration into serde types
//! - `HierarchyBuilder`: the standard flags > env > URLs > files stack
//!
//! Sources themselves live in the `adapters` crate.

pub mod builder;
pub mod hierarchy;

pub use builder::HierarchyBuilder;
pub use hierarchy::Hierarchy;
pub use strata_core::{Configurable, Snapshot, Source, Value, Writable};
