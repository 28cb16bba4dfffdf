//! Error types for APDU operations
//!
//! This module provides the core error type shared by command and response
//! handling, plus a small context-propagation helper.

use thiserror::Error;

use crate::transport::TransportError;

/// Result type for core APDU operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for core APDU operations
#[derive(Debug, Error)]
pub enum Error {
    /// Command buffer too short or inconsistent with its length fields
    #[error("invalid command length: {0}")]
    InvalidCommandLength(usize),

    /// Response buffer shorter than the two-byte status word
    #[error("invalid response length: {0}")]
    InvalidResponseLength(usize),

    /// Transport-level failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Context with source error
    #[error("{context}: {source}")]
    Context {
        /// Contextual message
        context: String,
        /// Source error
        source: Box<Self>,
    },

    /// Other error with dynamic message
    #[error("{0}")]
    Message(String),

    /// Other error with static message
    #[error("{0}")]
    Other(&'static str),
}

impl Error {
    /// Create a new error with context information
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a new error with a static message
    pub const fn other(message: &'static str) -> Self {
        Self::Other(message)
    }

    /// Create a new error with a dynamic message
    pub fn message<S: Into<String>>(message: S) -> Self {
        Self::Message(message.into())
    }
}

/// Extension trait for Result with context addition
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, context: S) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context<S: Into<String>>(self, context: S) -> Self {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_chain() {
        let err: Result<()> = Err(Error::other("device gone"));
        let err = err.context("selecting applet").unwrap_err();
        assert_eq!(err.to_string(), "selecting applet: device gone");
    }
}
