//! APDU response definitions
//!
//! This module provides the response type for APDU exchanges according to
//! ISO/IEC 7816-4. Every response frame ends in a two-byte status word; the
//! payload stored here always excludes those two trailing bytes.

pub mod status;

use bytes::{BufMut, Bytes, BytesMut};

use crate::Error;
use status::StatusWord;

/// Generic APDU response structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response payload, excluding the trailing status word
    pub data: Option<Bytes>,
    /// Status word (SW1-SW2)
    pub status: StatusWord,
}

impl Response {
    /// Create a new response from payload and status word
    pub const fn new(data: Option<Bytes>, status: StatusWord) -> Self {
        Self { data, status }
    }

    /// Create a successful (0x9000) response with optional payload
    pub const fn success(data: Option<Bytes>) -> Self {
        Self::new(data, StatusWord::SUCCESS)
    }

    /// Parse a response from raw bytes
    ///
    /// The final two bytes are the status word; anything before them is the
    /// payload.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < 2 {
            return Err(Error::InvalidResponseLength(bytes.len()));
        }

        let (payload, trailer) = bytes.split_at(bytes.len() - 2);
        let data = if payload.is_empty() {
            None
        } else {
            Some(Bytes::copy_from_slice(payload))
        };

        Ok(Self::new(data, StatusWord::new(trailer[0], trailer[1])))
    }

    /// Response payload as a slice, empty when no data was returned
    pub fn payload(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Take ownership of the payload, empty when no data was returned
    pub fn into_payload(self) -> Bytes {
        self.data.unwrap_or_else(Bytes::new)
    }

    /// Whether the status word reports success (0x9000)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Serialize back to raw bytes (payload followed by SW1, SW2)
    pub fn to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(self.payload().len() + 2);
        buffer.put_slice(self.payload());
        buffer.put_u8(self.status.sw1);
        buffer.put_u8(self.status.sw2);
        buffer.freeze()
    }
}

impl From<Response> for Bytes {
    fn from(response: Response) -> Self {
        response.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_splits_status_word() {
        let response = Response::from_bytes(&[0x01, 0x02, 0x03, 0x90, 0x00]).unwrap();
        assert_eq!(response.payload(), &[0x01, 0x02, 0x03]);
        assert_eq!(response.status, StatusWord::new(0x90, 0x00));
        assert!(response.is_success());
    }

    #[test]
    fn test_from_bytes_status_only() {
        let response = Response::from_bytes(&[0x69, 0x85]).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.status.to_u16(), 0x6985);
        assert!(!response.is_success());
    }

    #[test]
    fn test_from_bytes_too_short() {
        assert!(Response::from_bytes(&[]).is_err());
        assert!(Response::from_bytes(&[0x90]).is_err());
    }

    #[test]
    fn test_round_trip() {
        let response = Response::from_bytes(&[0xAA, 0xBB, 0x61, 0x10]).unwrap();
        assert_eq!(response.to_bytes().as_ref(), &[0xAA, 0xBB, 0x61, 0x10]);
    }
}
