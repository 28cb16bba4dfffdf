//! U2F version query operation

use hardkey_apdu_core::transport::CardTransport;

use crate::connection::U2fAppletConnection;
use crate::error::{Error, Result};

/// GetVersion request ("FIDO U2F Raw Message Formats", Section 6.1)
#[derive(Debug)]
pub struct VersionOp<'a, T: CardTransport> {
    connection: &'a mut U2fAppletConnection<T>,
}

impl<'a, T: CardTransport> VersionOp<'a, T> {
    /// Create a version query operation on the given connection
    pub fn new(connection: &'a mut U2fAppletConnection<T>) -> Self {
        Self { connection }
    }

    /// Query the protocol version the security key implements
    ///
    /// A U2F_V2 device answers `"U2F_V2"`. May block on device I/O.
    pub fn version(&mut self) -> Result<String> {
        self.connection.connect_if_necessary()?;

        let command = self.connection.command_factory().version();
        let response = self.connection.communicate(&command)?;

        String::from_utf8(response.into_payload().to_vec()).map_err(|err| {
            Error::VersionMismatch {
                actual: String::from_utf8_lossy(err.as_bytes()).into_owned(),
            }
        })
    }
}
