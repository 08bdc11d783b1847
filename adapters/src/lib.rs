//! # Adapters
//!
//! Concrete configuration sources. Each one owns a `KeyStore` and knows how
//! to fill it from one kind of origin:
//!
//! - `MemorySource`: nothing to load, values are set programmatically
//! - `EnvSource`: process environment variables
//! - `FlagSource`: parsed command-line flags
//! - `JsonSource`: a JSON file on disk (also writable)
//! - `UrlSource`: a JSON document fetched over HTTP

pub mod env;
pub mod flag;
pub mod json;
pub mod memory;
pub mod url;

pub use env::EnvSource;
pub use flag::FlagSource;
pub use json::JsonSource;
pub use memory::MemorySource;
pub use url::UrlSource;
