//! U2F applet connection
//!
//! This module owns the session with a single security key: applet
//! discovery over the configured transport, the ISO/IEC 7816-4 transceive
//! algorithm with chaining and extended-length handling, response
//! continuation, and the mapping of terminal status words onto typed errors.

use bytes::BytesMut;
use hardkey_apdu_core::command::{Command, ExpectedLength, NE_EXTENDED_MAX};
use hardkey_apdu_core::response::Response;
use hardkey_apdu_core::response::status::StatusWord;
use hardkey_apdu_core::transport::{CardTransport, TransportKind};
use tracing::debug;

use crate::constants::{FIDO_AID_CANDIDATES, U2F_VERSION_STRING, sw};
use crate::error::{Error, Result};
use crate::factory::U2fCommandFactory;

/// Applet-selection state of a connection
///
/// The only transition is `Disconnected -> Connected`, taken once discovery
/// succeeds. Communication failures after that point do not transition back;
/// callers detect a broken session through failed [`U2fAppletConnection::communicate`]
/// calls and reconnect with a fresh transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionState {
    Disconnected,
    Connected,
}

/// Outcome of attempting to select one AID candidate
///
/// "Not found" is normal control flow during discovery, not an error: the
/// next candidate is simply tried.
enum SelectOutcome {
    Selected,
    NotFound,
}

/// Connection to the FIDO U2F applet on a security key
///
/// Owns its transport exclusively for the connection's lifetime. Calls may
/// block on physical I/O, including waiting for a user touch; invoke them
/// from a context that tolerates blocking. A connection is not meant for
/// concurrent use — callers must serialize access to one instance.
#[derive(Debug)]
pub struct U2fAppletConnection<T: CardTransport> {
    transport: T,
    factory: U2fCommandFactory,
    state: ConnectionState,
}

impl<T: CardTransport> U2fAppletConnection<T> {
    /// Create a connection over the given transport
    ///
    /// No I/O happens until [`Self::connect_if_necessary`] or
    /// [`Self::communicate`] is called.
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            factory: U2fCommandFactory::new(),
            state: ConnectionState::Disconnected,
        }
    }

    /// The shared command factory, for building operation payload frames
    pub const fn command_factory(&self) -> &U2fCommandFactory {
        &self.factory
    }

    /// Whether the transport currently has a device connection
    ///
    /// This reflects the transport only; applet selection may not have run
    /// yet.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    // region connection management

    /// Ensure the U2F applet is selected, performing discovery if needed
    ///
    /// No-op when already connected. On any failure during discovery the
    /// transport is released before the error propagates, so a failed
    /// session start never leaks a device handle.
    pub fn connect_if_necessary(&mut self) -> Result<()> {
        if self.state == ConnectionState::Connected {
            return Ok(());
        }

        self.connect_to_applet()
    }

    fn connect_to_applet(&mut self) -> Result<()> {
        match self.discover_applet() {
            Ok(()) => {
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Err(err) => {
                self.transport.release();
                Err(err)
            }
        }
    }

    fn discover_applet(&mut self) -> Result<()> {
        match self.transport.transport_kind() {
            TransportKind::UsbHid => {
                debug!("USB HID transport implicitly selects the applet, skipping AID selection");
                let version = self.read_version()?;
                check_version(&version)
            }
            TransportKind::Contactless => self.select_applet_from_candidates(),
        }
    }

    fn select_applet_from_candidates(&mut self) -> Result<()> {
        for aid in FIDO_AID_CANDIDATES {
            match self.select_applet(aid)? {
                SelectOutcome::Selected => {
                    debug!(aid = %hex::encode(aid), "connected to U2F applet");
                    return Ok(());
                }
                SelectOutcome::NotFound => continue,
            }
        }

        Err(Error::NoMatchingApplet {
            attempted: FIDO_AID_CANDIDATES.iter().map(|aid| aid.to_vec()).collect(),
        })
    }

    fn select_applet(&mut self, aid: &[u8]) -> Result<SelectOutcome> {
        let select = self.factory.select_file(aid);
        match self.communicate(&select) {
            // The authenticator replies to a successful SELECT with its
            // version string ("FIDO U2F NFC protocol", Section 5)
            Ok(response) => {
                check_version(response.payload())?;
                Ok(SelectOutcome::Selected)
            }
            Err(Error::AppletFileNotFound) => Ok(SelectOutcome::NotFound),
            Err(err) => Err(err),
        }
    }

    /// Query the applet's protocol version string
    fn read_version(&mut self) -> Result<bytes::Bytes> {
        let version = self.factory.version();
        let response = self.communicate(&version)?;
        Ok(response.into_payload())
    }

    // endregion

    // region communication

    /// Exchange a command with the applet
    ///
    /// Either returns a response whose status word is 0x9000 or fails with a
    /// typed error; callers never see a raw non-success status word. May
    /// block on device I/O.
    pub fn communicate(&mut self, command: &Command) -> Result<Response> {
        let response = self.transceive(command)?;

        if response.is_success() {
            return Ok(response);
        }

        Err(Error::from_status(response.status))
    }

    // ISO/IEC 7816-4
    fn transceive(&mut self, command: &Command) -> Result<Response> {
        let mut response = self.transceive_with_chaining(command)?;

        // A 0x6C SW1 reports the exact available length in SW2; reissue
        // once with the corrected Ne. Together with the compatibility
        // fallback inside transceive_with_chaining this bounds corrective
        // retries per exchange at two.
        if response.status.is_wrong_length() && response.status.sw2 != 0 {
            let reissued = command.clone().with_ne(response.status.sw2 as ExpectedLength);
            response = self.transceive_with_chaining(&reissued)?;
        }

        self.read_chained_response_if_available(response)
    }

    // ISO/IEC 7816-4
    fn transceive_with_chaining(&mut self, command: &Command) -> Result<Response> {
        // An Ne of 65536 forces APDU case 4e, coercing an extended-length
        // response frame for the register and authenticate commands.
        if self.transport.is_extended_length_supported()
            && self.factory.is_suitable_for_extended_apdu(command)
        {
            let extended = command.clone().with_ne(NE_EXTENDED_MAX);
            let response = self.transmit(&extended)?;
            if rejects_extended_framing(response.status) {
                // Some devices advertise extended length but reject the
                // frames; fall back to a short encoding once.
                debug!(status = %response.status, "wrong length for extended apdu, retrying with short encoding");
                let short = self.factory.short_apdu(command);
                return self.transmit(&short);
            }
            return Ok(response);
        }

        if self.factory.is_suitable_for_short_apdu(command) {
            let short = self.factory.short_apdu(command);
            return self.transmit(&short);
        }

        let frames = self.factory.chained_apdus(command);
        let last = frames.len() - 1;
        let mut response = None;

        for (index, frame) in frames.iter().enumerate() {
            let current = self.transmit(frame)?;

            if index < last && !current.is_success() {
                return Err(Error::ChainingFailed {
                    index,
                    last,
                    status: current.status,
                });
            }

            response = Some(current);
        }

        // chained_apdus always yields at least one frame
        response.ok_or(Error::Core(hardkey_apdu_core::Error::Other(
            "chained apdu sequence was empty",
        )))
    }

    // GET RESPONSE, ISO/IEC 7816-4 par. 7.6.1
    fn read_chained_response_if_available(&mut self, last: Response) -> Result<Response> {
        if !last.status.has_more_data() {
            return Ok(last);
        }

        let mut assembled = BytesMut::from(last.payload());
        let mut status = last.status;

        loop {
            let get_response = self.factory.get_response(status.sw2);
            let next = self.transmit(&get_response)?;
            assembled.extend_from_slice(next.payload());
            status = next.status;

            if !status.has_more_data() {
                break;
            }
        }

        let data = if assembled.is_empty() {
            None
        } else {
            Some(assembled.freeze())
        };
        Ok(Response::new(data, status))
    }

    fn transmit(&mut self, command: &Command) -> Result<Response> {
        let raw = self.transport.transmit_raw(&command.to_bytes())?;
        Response::from_bytes(&raw).map_err(Error::from)
    }

    // endregion
}

/// Whether a status word means the device refused the extended framing
const fn rejects_extended_framing(status: StatusWord) -> bool {
    status.to_u16() == sw::WRONG_REQUEST_LENGTH || (status.is_wrong_length() && status.sw2 != 0)
}

fn check_version(version: &[u8]) -> Result<()> {
    if version == U2F_VERSION_STRING {
        debug!("U2F applet answered with version U2F_V2");
        Ok(())
    } else {
        Err(Error::VersionMismatch {
            actual: String::from_utf8_lossy(version).into_owned(),
        })
    }
}
