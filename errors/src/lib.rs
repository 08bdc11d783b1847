//! # Strata Errors
//!
//! Error taxonomy shared by every strata crate.
//!
//! - `Io`: a file or network resource could not be read or written
//! - `Parse`: a resource was reachable but its content was not usable
//! - `Decode`: a resolved value could not be coerced into a caller's type
//!
//! Typed accessors never surface these; only source loading/saving and
//! `unmarshal` do.

use std::fmt::Display;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O failure on {resource}: {reason}")]
    Io { resource: String, reason: String },

    #[error("Failed to parse {resource}: {reason}")]
    Parse { resource: String, reason: String },

    #[error("Failed to decode configuration: {reason}")]
    Decode { reason: String }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    pub fn io(resource: impl Display, reason: impl Display) -> Self {
        Self::Io {
            resource: resource.to_string(),
            reason: reason.to_string()
        }
    }

    pub fn parse(resource: impl Display, reason: impl Display) -> Self {
        Self::Parse {
            resource: resource.to_string(),
            reason: reason.to_string()
        }
    }

    pub fn decode(reason: impl Display) -> Self {
        Self::Decode {
            reason: reason.to_string()
        }
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

impl serde::de::Error for ConfigError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::decode(msg)
    }
}
