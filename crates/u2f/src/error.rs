//! Error types for U2F operations
//!
//! Device-reported status words are mapped onto a closed set of variants so
//! callers can match exhaustively and pick differentiated recovery: re-prompt
//! the user on `PresenceRequired`, abort on `InsNotSupported`, and so on.

use hardkey_apdu_core::StatusWord;
use hardkey_apdu_core::transport::TransportError;
use thiserror::Error;

use crate::constants::sw;

/// Result type for U2F operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for U2F operations
#[derive(Debug, Error)]
pub enum Error {
    /// The user must touch or otherwise confirm the security key
    ///
    /// Retryable: the caller may prompt for presence and invoke the
    /// operation again.
    #[error("test of user presence required")]
    PresenceRequired,

    /// The key handle does not belong to this device
    #[error("key handle does not match this security key")]
    WrongKeyHandle,

    /// The addressed file or applet was not found
    ///
    /// Handled internally during discovery; surfaced to a caller it means an
    /// unexpected applet-selection failure.
    #[error("applet or file not found")]
    AppletFileNotFound,

    /// The device rejects the command class
    #[error("command class not supported by security key")]
    ClaNotSupported,

    /// The device rejects the instruction
    #[error("instruction not supported by security key")]
    InsNotSupported,

    /// The request length was invalid and the bounded length retry did not
    /// resolve it
    #[error("wrong request length")]
    WrongRequestLength,

    /// Any other non-success status word, carried for diagnostics
    #[error("security key returned status {0}")]
    UnknownStatus(StatusWord),

    /// No AID candidate selected successfully during discovery
    #[error("no matching applet found after trying {} candidate AIDs", .attempted.len())]
    NoMatchingApplet {
        /// The AIDs that were attempted, in order
        attempted: Vec<Vec<u8>>,
    },

    /// The applet answered with something other than the U2F version string
    #[error("applet replied with incorrect version string: {actual:?}")]
    VersionMismatch {
        /// What the applet actually answered (lossy ASCII)
        actual: String,
    },

    /// A non-final frame of a chained command was rejected
    #[error("failed to chain apdu ({index}/{last}, last SW: {status})")]
    ChainingFailed {
        /// Zero-based index of the failed frame
        index: usize,
        /// Zero-based index of the final frame
        last: usize,
        /// Status word the failed frame returned
        status: StatusWord,
    },

    /// Caller-supplied argument violates a structural precondition
    ///
    /// Raised before any I/O occurs and never retried automatically.
    #[error("{parameter} must be {expected} bytes long, got {actual}")]
    InvalidParameterLength {
        /// Name of the offending parameter
        parameter: &'static str,
        /// Required length in bytes
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// Transport-level failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Core APDU error (frame construction or parsing)
    #[error(transparent)]
    Core(#[from] hardkey_apdu_core::Error),
}

impl Error {
    /// Map a terminal non-success status word to its typed error
    ///
    /// Total over all status words: everything outside the U2F table maps to
    /// [`Error::UnknownStatus`] carrying the raw value unchanged.
    pub fn from_status(status: StatusWord) -> Self {
        match status.to_u16() {
            sw::TEST_OF_USER_PRESENCE_REQUIRED => Self::PresenceRequired,
            sw::WRONG_KEY_HANDLE => Self::WrongKeyHandle,
            sw::FILE_NOT_FOUND => Self::AppletFileNotFound,
            sw::CLA_NOT_SUPPORTED => Self::ClaNotSupported,
            sw::INS_NOT_SUPPORTED => Self::InsNotSupported,
            sw::WRONG_REQUEST_LENGTH => Self::WrongRequestLength,
            _ => Self::UnknownStatus(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_is_total() {
        assert!(matches!(
            Error::from_status(StatusWord::from_u16(0x6985)),
            Error::PresenceRequired
        ));
        assert!(matches!(
            Error::from_status(StatusWord::from_u16(0x6A80)),
            Error::WrongKeyHandle
        ));
        assert!(matches!(
            Error::from_status(StatusWord::from_u16(0x6A82)),
            Error::AppletFileNotFound
        ));
        assert!(matches!(
            Error::from_status(StatusWord::from_u16(0x6E00)),
            Error::ClaNotSupported
        ));
        assert!(matches!(
            Error::from_status(StatusWord::from_u16(0x6D00)),
            Error::InsNotSupported
        ));
        assert!(matches!(
            Error::from_status(StatusWord::from_u16(0x6700)),
            Error::WrongRequestLength
        ));

        // Everything else carries the raw status word unchanged
        match Error::from_status(StatusWord::from_u16(0x6F42)) {
            Error::UnknownStatus(sw) => assert_eq!(sw.to_u16(), 0x6F42),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
