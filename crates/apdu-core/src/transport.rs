//! Transport layer abstraction
//!
//! This module defines the seam between protocol logic and the physical
//! channel (USB HID, NFC, PC/SC, ...). A transport moves raw bytes; framing
//! decisions such as APDU chaining live above it.

use std::fmt;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, trace};

/// Error type for transport operations
#[derive(Debug, Error)]
pub enum TransportError {
    /// No device connection is currently available
    #[error("transport is not connected")]
    NotConnected,

    /// The transport was released and can no longer be used
    #[error("transport has been released")]
    Released,

    /// Transmission to or from the device failed
    #[error("transmission failed: {0}")]
    Transmission(String),

    /// Underlying I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Physical kind of a transport
///
/// Some transports implicitly select their applet: a USB HID keyed protocol
/// routes every frame to the FIDO application, so no SELECT is needed there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// USB HID keyed transport (implicit applet selection)
    UsbHid,
    /// Contactless or other ISO 7816 transport (explicit SELECT required)
    Contactless,
}

/// Trait for card transports
///
/// Implementations own the physical session for their lifetime. Calls may
/// block on device I/O; invoke them from a context that tolerates blocking.
pub trait CardTransport: fmt::Debug + Send {
    /// Transmit a raw command and return the raw response
    ///
    /// This is the public transmission method; it wraps [`Self::do_transmit_raw`]
    /// with trace logging of both directions.
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        trace!(command = %hex::encode(command), "transmitting raw command");
        let response = self.do_transmit_raw(command);
        match &response {
            Ok(bytes) => trace!(response = %hex::encode(bytes), "received raw response"),
            Err(err) => debug!(error = %err, "error during raw transmission"),
        }
        response
    }

    /// Internal implementation of transmit_raw
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError>;

    /// Physical kind of this transport
    fn transport_kind(&self) -> TransportKind;

    /// Whether the transport can carry extended-length APDU frames
    fn is_extended_length_supported(&self) -> bool;

    /// Whether a device connection is currently established
    fn is_connected(&self) -> bool;

    /// Release the underlying device handle
    ///
    /// After release the transport is unusable; a fresh transport must be
    /// acquired for a new session.
    fn release(&mut self);
}

/// Scripted transport for tests
///
/// Replays a queue of canned responses and records every frame sent to it,
/// so protocol logic can be exercised without hardware.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: std::collections::VecDeque<Bytes>,
    sent: Vec<Bytes>,
    kind: Option<TransportKind>,
    extended_length: bool,
    released: bool,
}

impl MockTransport {
    /// Create a mock that replies to every command with the same response
    pub fn with_response(response: Bytes) -> Self {
        Self::with_responses(vec![response])
    }

    /// Create a mock that replays the given responses in order
    pub fn with_responses(responses: Vec<Bytes>) -> Self {
        Self {
            responses: responses.into(),
            sent: Vec::new(),
            kind: None,
            extended_length: false,
            released: false,
        }
    }

    /// Set the reported transport kind (defaults to contactless)
    pub fn set_kind(&mut self, kind: TransportKind) -> &mut Self {
        self.kind = Some(kind);
        self
    }

    /// Set whether extended-length frames are advertised
    pub fn set_extended_length_supported(&mut self, supported: bool) -> &mut Self {
        self.extended_length = supported;
        self
    }

    /// Frames transmitted so far, in order
    pub fn sent(&self) -> &[Bytes] {
        &self.sent
    }

    /// Whether the transport has been released
    pub const fn is_released(&self) -> bool {
        self.released
    }
}

impl CardTransport for MockTransport {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        if self.released {
            return Err(TransportError::Released);
        }
        self.sent.push(Bytes::copy_from_slice(command));
        self.responses
            .pop_front()
            .ok_or_else(|| TransportError::Transmission("no scripted response left".into()))
    }

    fn transport_kind(&self) -> TransportKind {
        self.kind.unwrap_or(TransportKind::Contactless)
    }

    fn is_extended_length_supported(&self) -> bool {
        self.extended_length
    }

    fn is_connected(&self) -> bool {
        !self.released
    }

    fn release(&mut self) {
        self.released = true;
    }
}
