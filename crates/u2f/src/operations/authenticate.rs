//! U2F authentication operation

use bytes::{BufMut, Bytes, BytesMut};
use hardkey_apdu_core::transport::CardTransport;

use super::register::check_parameter;
use super::{APPLICATION_PARAMETER_LENGTH, CHALLENGE_PARAMETER_LENGTH};
use crate::connection::U2fAppletConnection;
use crate::error::{Error, Result};

/// Control byte of an authentication request (P1)
///
/// "FIDO U2F Raw Message Formats", Section 5.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticateControl {
    /// Check whether the key handle was created by this device, without
    /// signing or requiring user presence
    CheckOnly = 0x07,
    /// Sign, requiring a test of user presence
    EnforceUserPresenceAndSign = 0x03,
    /// Sign without requiring user presence
    DontEnforceUserPresenceAndSign = 0x08,
}

/// Authentication request ("FIDO U2F Raw Message Formats", Section 5.1)
#[derive(Debug)]
pub struct AuthenticateOp<'a, T: CardTransport> {
    connection: &'a mut U2fAppletConnection<T>,
}

impl<'a, T: CardTransport> AuthenticateOp<'a, T> {
    /// Create an authentication operation on the given connection
    pub fn new(connection: &'a mut U2fAppletConnection<T>) -> Self {
        Self { connection }
    }

    /// Authenticate with this security key
    ///
    /// `challenge` and `application` must be exactly 32 bytes each; the key
    /// handle must fit its one-byte length prefix. All validation happens
    /// before any I/O.
    ///
    /// Returns the raw authentication response message. May block on device
    /// I/O; an [`Error::PresenceRequired`] result means the caller should
    /// prompt for presence and retry, an [`Error::WrongKeyHandle`] result
    /// means the handle belongs to a different device.
    pub fn authenticate(
        &mut self,
        control: AuthenticateControl,
        challenge: &[u8],
        application: &[u8],
        key_handle: &[u8],
    ) -> Result<Bytes> {
        check_parameter("challenge parameter", challenge, CHALLENGE_PARAMETER_LENGTH)?;
        check_parameter(
            "application parameter",
            application,
            APPLICATION_PARAMETER_LENGTH,
        )?;
        if key_handle.is_empty() || key_handle.len() > u8::MAX as usize {
            return Err(Error::InvalidParameterLength {
                parameter: "key handle",
                expected: u8::MAX as usize,
                actual: key_handle.len(),
            });
        }

        self.connection.connect_if_necessary()?;

        let payload = prepare_payload(challenge, application, key_handle);
        let command = self
            .connection
            .command_factory()
            .authentication(control as u8, payload);
        let response = self.connection.communicate(&command)?;

        Ok(response.into_payload())
    }
}

/// `challenge || application || len(key_handle) || key_handle`
fn prepare_payload(challenge: &[u8], application: &[u8], key_handle: &[u8]) -> Bytes {
    let mut payload =
        BytesMut::with_capacity(challenge.len() + application.len() + 1 + key_handle.len());
    payload.put_slice(challenge);
    payload.put_slice(application);
    payload.put_u8(key_handle.len() as u8);
    payload.put_slice(key_handle);
    payload.freeze()
}
