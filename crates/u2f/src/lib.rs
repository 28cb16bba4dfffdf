//! FIDO U2F protocol engine over ISO/IEC 7816-4 transports
//!
//! This crate talks to a FIDO U2F security key (a smartcard-like applet)
//! over any byte-oriented transport implementing
//! [`hardkey_apdu_core::CardTransport`] — USB HID, NFC, PC/SC and similar.
//! It selects the correct on-device application, exchanges command/response
//! APDUs while transparently handling payloads too large for a single frame
//! (command chaining, extended-length negotiation, GET RESPONSE
//! continuation), and translates raw device status codes into a typed error
//! model callers can act on.
//!
//! ## Layers
//!
//! - [`U2fAppletConnection`] — owns one transport, drives applet discovery
//!   and the transceive algorithm; the single entry point is
//!   [`U2fAppletConnection::communicate`].
//! - [`U2fCommandFactory`] — stateless builder for the U2F command frames,
//!   shared by the connection and by operation-layer callers.
//! - [`operations`] — thin protocol clients (register, authenticate, version
//!   query) that build payloads and hand them to the connection.
//!
//! Calls may block on physical I/O, including waiting for a user touch;
//! run them on a context that tolerates blocking, one logical operation at
//! a time per connection.
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

pub mod connection;
pub mod constants;
pub mod error;
pub mod factory;
pub mod operations;

pub use connection::U2fAppletConnection;
pub use error::{Error, Result};
pub use factory::U2fCommandFactory;
pub use operations::{AuthenticateControl, AuthenticateOp, RegisterOp, VersionOp};

pub use constants::{FIDO_AID_CANDIDATES, U2F_VERSION_STRING};
