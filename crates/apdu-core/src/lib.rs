//! Core types for APDU (Application Protocol Data Unit) operations
//!
//! This crate provides the foundational types for working with smart card
//! APDU commands and responses according to ISO/IEC 7816-4.
//!
//! ## Overview
//!
//! APDU (Application Protocol Data Unit) is the communication format used by
//! smart cards and smartcard-like security keys. This crate provides
//! abstractions for:
//!
//! - Creating and serializing APDU commands (short and extended encodings)
//! - Parsing APDU responses and status words
//! - Communicating with devices through pluggable transport layers
//! - Error handling and context propagation
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

// Main modules
pub mod command;
pub mod error;
pub mod response;
pub mod transport;

pub use command::{Command, ExpectedLength};
pub use error::{Error, ResultExt};
pub use response::Response;
pub use response::status::StatusWord;
pub use transport::{CardTransport, TransportError, TransportKind};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    // Core types
    pub use crate::{Bytes, BytesMut, Error, ResultExt};

    // Command related
    pub use crate::command::{Command, ExpectedLength};

    // Response related
    pub use crate::response::Response;
    pub use crate::response::status::{StatusWord, common as status};

    // Transport layer
    pub use crate::transport::{CardTransport, TransportError, TransportKind};
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    // Test the basic types are re-exported correctly
    #[test]
    fn test_reexports() {
        let cmd = Command::new(0x00, 0xA4, 0x04, 0x00);
        assert_eq!(cmd.cla, 0x00);
        assert_eq!(cmd.ins, 0xA4);

        let data = Bytes::from_static(&[0x01, 0x02, 0x03]);
        let resp = Response::success(Some(data.clone()));
        assert!(resp.is_success());
        assert_eq!(resp.payload(), data.as_ref());
        assert_eq!(resp.status, StatusWord::new(0x90, 0x00));
    }
}
