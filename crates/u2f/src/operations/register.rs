//! U2F registration operation

use bytes::{BufMut, Bytes, BytesMut};
use hardkey_apdu_core::transport::CardTransport;

use super::{APPLICATION_PARAMETER_LENGTH, CHALLENGE_PARAMETER_LENGTH};
use crate::connection::U2fAppletConnection;
use crate::error::{Error, Result};

/// Registration request ("FIDO U2F Raw Message Formats", Section 4.1)
#[derive(Debug)]
pub struct RegisterOp<'a, T: CardTransport> {
    connection: &'a mut U2fAppletConnection<T>,
}

impl<'a, T: CardTransport> RegisterOp<'a, T> {
    /// Create a registration operation on the given connection
    pub fn new(connection: &'a mut U2fAppletConnection<T>) -> Self {
        Self { connection }
    }

    /// Register this security key
    ///
    /// `challenge` is the SHA-256 hash of the client data; `application` is
    /// the SHA-256 hash of the application identity. Both must be exactly 32
    /// bytes; anything else fails before any I/O occurs.
    ///
    /// Returns the raw registration response message. May block on device
    /// I/O, including waiting for the user to touch the key; a
    /// [`Error::PresenceRequired`] result means the caller should prompt for
    /// presence and retry.
    pub fn register(&mut self, challenge: &[u8], application: &[u8]) -> Result<Bytes> {
        check_parameter("challenge parameter", challenge, CHALLENGE_PARAMETER_LENGTH)?;
        check_parameter(
            "application parameter",
            application,
            APPLICATION_PARAMETER_LENGTH,
        )?;

        self.connection.connect_if_necessary()?;

        let payload = prepare_payload(challenge, application);
        let command = self.connection.command_factory().registration(payload);
        let response = self.connection.communicate(&command)?;

        Ok(response.into_payload())
    }
}

/// The challenge parameter followed by the application parameter
fn prepare_payload(challenge: &[u8], application: &[u8]) -> Bytes {
    let mut payload = BytesMut::with_capacity(challenge.len() + application.len());
    payload.put_slice(challenge);
    payload.put_slice(application);
    payload.freeze()
}

pub(super) fn check_parameter(
    parameter: &'static str,
    value: &[u8],
    expected: usize,
) -> Result<()> {
    if value.len() != expected {
        return Err(Error::InvalidParameterLength {
            parameter,
            expected,
            actual: value.len(),
        });
    }
    Ok(())
}
