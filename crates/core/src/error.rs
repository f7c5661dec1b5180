//! Error types for cyberrag
//!
//! This module defines the error taxonomy shared by every retrieval stage.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Only two kinds are ever surfaced to callers of a search:
//! configuration problems (at construction time) and persistence problems
//! (when loading or saving an index). Source failures are recovered by the
//! component that observed them and only logged.

use std::io;
use thiserror::Error;

/// Result type alias for cyberrag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cyberrag
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing fusion/rerank/index parameters
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An external collaborator (vector store, scoring model) failed
    #[error("Source unavailable: {source_name}: {reason}")]
    SourceUnavailable {
        /// Which collaborator failed
        source_name: String,
        /// Human-readable failure description
        reason: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Persisted data failed validation (bad magic, unsupported version)
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// I/O error (index files, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Build a `Configuration` error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Build a `SourceUnavailable` error
    pub fn source_unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Configuration(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
