//! # Strata Core
//!
//! Building blocks shared by every strata crate.
//!
//! This crate provides:
//! - `Value`, the configuration value model, and its coercions
//! - `KeyStore`, a case-insensitive flat store
//! - Flattening of nested values into dotted keys (and back)
//! - Namespace resolution for env var and flag names
//! - The `Configurable`, `Source` and `Writable` traits
//! - A weakly typed serde decoder for `Value` trees

pub mod cast;
pub mod de;
pub mod flatten;
pub mod namespace;
pub mod store;
pub mod traits;
pub mod types;

pub use de::from_value;
pub use store::KeyStore;
pub use traits::{Configurable, Source, Writable, save_source};
pub use types::{Snapshot, Value, format_duration};
