//! U2F command factory
//!
//! Builds the APDU frames the applet connection sends: SELECT, version
//! query, GET RESPONSE, the U2F register/authenticate requests, and the
//! short/chained re-encodings of arbitrary commands. The factory is
//! stateless and shared read-only, so any number of connections can use the
//! same instance concurrently.

use bytes::Bytes;
use hardkey_apdu_core::command::{Command, ExpectedLength, LC_EXTENDED_MAX, LC_SHORT_MAX, NE_SHORT_MAX};

use crate::constants::*;

/// Factory for U2F command APDUs
#[derive(Debug, Default, Clone, Copy)]
pub struct U2fCommandFactory;

impl U2fCommandFactory {
    /// Create a new command factory
    pub const fn new() -> Self {
        Self
    }

    /// SELECT FILE by AID (ISO 7816-4)
    pub fn select_file(&self, aid: &[u8]) -> Command {
        Command::new_with_data_and_ne(
            CLA,
            INS_SELECT_FILE,
            P1_SELECT_BY_NAME,
            0x00,
            Bytes::copy_from_slice(aid),
            NE_SHORT_MAX,
        )
    }

    /// U2F_VERSION query
    pub const fn version(&self) -> Command {
        Command::new_with_ne(CLA, INS_VERSION, 0x00, 0x00, NE_SHORT_MAX)
    }

    /// GET RESPONSE for continued response data (ISO 7816-4 par. 7.6.1)
    ///
    /// `available` is the SW2 of the preceding 0x61xx response; zero means
    /// 256 or more bytes remain.
    pub const fn get_response(&self, available: u8) -> Command {
        let ne = if available == 0 {
            NE_SHORT_MAX
        } else {
            available as ExpectedLength
        };
        Command::new_with_ne(CLA, INS_GET_RESPONSE, 0x00, 0x00, ne)
    }

    /// U2F_REGISTER request carrying `challenge || application` parameters
    pub fn registration(&self, payload: Bytes) -> Command {
        Command::new_with_data_and_ne(CLA, INS_REGISTER, 0x00, 0x00, payload, NE_SHORT_MAX)
    }

    /// U2F_AUTHENTICATE request with the given control byte in P1
    pub fn authentication(&self, control: u8, payload: Bytes) -> Command {
        Command::new_with_data_and_ne(CLA, INS_AUTHENTICATE, control, 0x00, payload, NE_SHORT_MAX)
    }

    /// Whether the command's payload fits an extended-length frame
    pub fn is_suitable_for_extended_apdu(&self, command: &Command) -> bool {
        command.data_len() <= LC_EXTENDED_MAX
    }

    /// Whether the command's payload fits a single short frame
    pub fn is_suitable_for_short_apdu(&self, command: &Command) -> bool {
        command.data_len() <= LC_SHORT_MAX
    }

    /// Re-encode a command as a single short APDU
    ///
    /// The payload must already fit (see [`Self::is_suitable_for_short_apdu`]);
    /// Ne is clamped to the short maximum of 256.
    pub fn short_apdu(&self, command: &Command) -> Command {
        let mut short = command.clone();
        short.ne = short.ne.map(|ne| ne.min(NE_SHORT_MAX));
        short
    }

    /// Split a command into an ordered sequence of chained short APDUs
    ///
    /// Every frame except the last carries the chaining class bit and at
    /// most 255 bytes of payload; the last frame carries the (clamped)
    /// expected length.
    pub fn chained_apdus(&self, command: &Command) -> Vec<Command> {
        let data = command.data.clone().unwrap_or_else(Bytes::new);
        if data.len() <= LC_SHORT_MAX {
            return vec![self.short_apdu(command)];
        }

        let chunks: Vec<Bytes> = (0..data.len())
            .step_by(LC_SHORT_MAX)
            .map(|offset| data.slice(offset..data.len().min(offset + LC_SHORT_MAX)))
            .collect();
        let last = chunks.len() - 1;

        chunks
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| {
                if index < last {
                    Command::new_with_data(
                        command.cla | CLA_CHAINING_BIT,
                        command.ins,
                        command.p1,
                        command.p2,
                        chunk,
                    )
                } else {
                    let mut frame = Command::new_with_data(
                        command.cla,
                        command.ins,
                        command.p1,
                        command.p2,
                        chunk,
                    );
                    frame.ne = command.ne.map(|ne| ne.min(NE_SHORT_MAX));
                    frame
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_file_frame() {
        let factory = U2fCommandFactory::new();
        let aid = FIDO_AID_CANDIDATES[0];
        let bytes = factory.select_file(aid).to_bytes();

        assert_eq!(&bytes[..4], &[0x00, 0xA4, 0x04, 0x00]);
        assert_eq!(bytes[4] as usize, aid.len());
        assert_eq!(&bytes[5..5 + aid.len()], aid);
        assert_eq!(bytes[bytes.len() - 1], 0x00); // Le (Ne 256)
    }

    #[test]
    fn test_version_and_get_response_frames() {
        let factory = U2fCommandFactory::new();

        let version = factory.version().to_bytes();
        assert_eq!(version.as_ref(), &[0x00, 0x03, 0x00, 0x00, 0x00]);

        let get_response = factory.get_response(0x05).to_bytes();
        assert_eq!(get_response.as_ref(), &[0x00, 0xC0, 0x00, 0x00, 0x05]);

        // SW2 of zero means 256 or more bytes remain
        let get_response = factory.get_response(0x00).to_bytes();
        assert_eq!(get_response.as_ref(), &[0x00, 0xC0, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_short_apdu_clamps_ne() {
        let factory = U2fCommandFactory::new();
        let command = factory.registration(Bytes::from(vec![0x01; 64])).with_ne(65536);

        let short = factory.short_apdu(&command);
        assert_eq!(short.ne, Some(256));
        assert!(!short.requires_extended());
        assert_eq!(short.data, command.data);
    }

    #[test]
    fn test_suitability_predicates() {
        let factory = U2fCommandFactory::new();

        let small = Command::new_with_data(0x00, 0x01, 0x00, 0x00, vec![0u8; 255]);
        assert!(factory.is_suitable_for_short_apdu(&small));
        assert!(factory.is_suitable_for_extended_apdu(&small));

        let medium = Command::new_with_data(0x00, 0x01, 0x00, 0x00, vec![0u8; 256]);
        assert!(!factory.is_suitable_for_short_apdu(&medium));
        assert!(factory.is_suitable_for_extended_apdu(&medium));

        let huge = Command::new_with_data(0x00, 0x01, 0x00, 0x00, vec![0u8; 65536]);
        assert!(!factory.is_suitable_for_extended_apdu(&huge));
    }

    #[test]
    fn test_chained_apdus_split_and_flags() {
        let factory = U2fCommandFactory::new();
        let command =
            Command::new_with_data_and_ne(0x00, 0x01, 0x00, 0x00, vec![0xCD; 600], 65536);

        let frames = factory.chained_apdus(&command);
        assert_eq!(frames.len(), 3);

        // Non-final frames carry the chaining bit and no Ne
        assert_eq!(frames[0].cla, 0x10);
        assert_eq!(frames[0].data_len(), 255);
        assert!(frames[0].ne.is_none());
        assert_eq!(frames[1].cla, 0x10);
        assert_eq!(frames[1].data_len(), 255);

        // Final frame carries the remainder and the clamped Ne
        assert_eq!(frames[2].cla, 0x00);
        assert_eq!(frames[2].data_len(), 90);
        assert_eq!(frames[2].ne, Some(256));

        // Reassembling the chunks yields the original payload
        let reassembled: Vec<u8> = frames
            .iter()
            .flat_map(|frame| frame.data.as_ref().unwrap().to_vec())
            .collect();
        assert_eq!(reassembled, vec![0xCD; 600]);
    }
}
