//! Shared test fixtures for the strata workspace.
//!
//! - `JsonFixture`: JSON documents written into a private temp directory
//! - `config_server`: a mock HTTP server answering with a JSON document

mod fixtures;

pub use fixtures::*;
