//! APDU command definitions
//!
//! This module provides the generic command type for working with APDU
//! commands according to ISO/IEC 7816-4, covering both the short and the
//! extended encodings.

use bytes::{BufMut, Bytes, BytesMut};

use crate::Error;

/// Expected response length (Ne) for APDU commands.
///
/// Ne is a count of bytes, not a wire field: 256 encodes as a short Le of
/// `0x00`, and 65536 encodes as an extended Le of `0x00 0x00`.
pub type ExpectedLength = u32;

/// Maximum Ne encodable in a short APDU
pub const NE_SHORT_MAX: ExpectedLength = 256;
/// Maximum Ne encodable in an extended APDU
pub const NE_EXTENDED_MAX: ExpectedLength = 65536;
/// Maximum data length encodable in a short APDU
pub const LC_SHORT_MAX: usize = 255;
/// Maximum data length encodable in an extended APDU
pub const LC_EXTENDED_MAX: usize = 65535;

/// Generic APDU command structure
///
/// Commands are immutable values: the builder-style methods return new
/// instances, so every variant of a command (chained, length-adjusted, ...)
/// stays independently inspectable and safe to retransmit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data (optional)
    pub data: Option<Bytes>,
    /// Expected response length (optional)
    pub ne: Option<ExpectedLength>,
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            ne: None,
        }
    }

    /// Create a new command with expected response length (Ne)
    pub const fn new_with_ne(cla: u8, ins: u8, p1: u8, p2: u8, ne: ExpectedLength) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            ne: Some(ne),
        }
    }

    /// Create a new command with data payload
    pub fn new_with_data<T: Into<Bytes>>(cla: u8, ins: u8, p1: u8, p2: u8, data: T) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Some(data.into()),
            ne: None,
        }
    }

    /// Create a new command with both data and expected length
    pub fn new_with_data_and_ne<T: Into<Bytes>>(
        cla: u8,
        ins: u8,
        p1: u8,
        p2: u8,
        data: T,
        ne: ExpectedLength,
    ) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Some(data.into()),
            ne: Some(ne),
        }
    }

    /// Return a copy of this command with the given data payload
    pub fn with_data<T: Into<Bytes>>(mut self, data: T) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Return a copy of this command with the given expected length
    pub fn with_ne(mut self, ne: ExpectedLength) -> Self {
        self.ne = Some(ne);
        self
    }

    /// Length of the data payload, zero when absent
    pub fn data_len(&self) -> usize {
        self.data.as_ref().map_or(0, Bytes::len)
    }

    /// Whether serialization of this command requires the extended encoding
    ///
    /// A command is extended as soon as either field overflows its short
    /// form; ISO/IEC 7816-4 does not allow mixing short and extended fields
    /// within one frame.
    pub fn requires_extended(&self) -> bool {
        self.data_len() > LC_SHORT_MAX || self.ne.is_some_and(|ne| ne > NE_SHORT_MAX)
    }

    /// Convert to raw APDU bytes
    pub fn to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(self.command_length());
        let extended = self.requires_extended();

        // Header: CLA, INS, P1, P2
        buffer.put_u8(self.cla);
        buffer.put_u8(self.ins);
        buffer.put_u8(self.p1);
        buffer.put_u8(self.p2);

        // Lc and data
        if let Some(data) = &self.data {
            if extended {
                buffer.put_u8(0x00);
                buffer.put_u16(data.len() as u16);
            } else {
                buffer.put_u8(data.len() as u8);
            }
            buffer.put_slice(data);
        }

        // Le
        if let Some(ne) = self.ne {
            if extended {
                if self.data.is_none() {
                    buffer.put_u8(0x00);
                }
                // Ne of 65536 encodes as 0x0000
                buffer.put_u16((ne % NE_EXTENDED_MAX) as u16);
            } else {
                // Ne of 256 encodes as 0x00
                buffer.put_u8((ne % NE_SHORT_MAX) as u8);
            }
        }

        buffer.freeze()
    }

    /// Calculate length of serialized command
    pub fn command_length(&self) -> usize {
        // Header (CLA, INS, P1, P2) is always 4 bytes
        let mut length = 4;
        let extended = self.requires_extended();

        if let Some(data) = &self.data {
            length += if extended { 3 } else { 1 } + data.len();
        }

        if self.ne.is_some() {
            length += if extended {
                if self.data.is_none() { 3 } else { 2 }
            } else {
                1
            };
        }

        length
    }

    /// Parse a short-encoded command from raw bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        if data.len() < 4 {
            return Err(Error::InvalidCommandLength(data.len()));
        }

        let mut command = Self::new(data[0], data[1], data[2], data[3]);

        if data.len() > 4 {
            let lc = data[4] as usize;

            if data.len() == 5 {
                // Only Le present, no data
                command.ne = Some(data[4] as ExpectedLength);
            } else if data.len() >= 5 + lc {
                if lc > 0 {
                    command.data = Some(Bytes::copy_from_slice(&data[5..5 + lc]));
                }

                // Check for Le
                if data.len() > 5 + lc {
                    if data.len() == 5 + lc + 1 {
                        command.ne = Some(data[5 + lc] as ExpectedLength);
                    } else {
                        return Err(Error::InvalidCommandLength(data.len()));
                    }
                }
            } else {
                return Err(Error::InvalidCommandLength(data.len()));
            }
        }

        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let data = Bytes::from_static(&[0xA0, 0x00, 0x00, 0x01, 0x51, 0x00]);
        let cmd = Command::new_with_data_and_ne(0x00, 0xA4, 0x04, 0x00, data, 256);
        let bytes = cmd.to_bytes();

        assert_eq!(bytes[0], 0x00); // CLA
        assert_eq!(bytes[1], 0xA4); // INS
        assert_eq!(bytes[2], 0x04); // P1
        assert_eq!(bytes[3], 0x00); // P2
        assert_eq!(bytes[4], 0x06); // Lc (data length)
        assert_eq!(&bytes[5..11], &[0xA0, 0x00, 0x00, 0x01, 0x51, 0x00]);
        assert_eq!(bytes[11], 0x00); // Le (Ne 256)
    }

    #[test]
    fn test_extended_serialization_forced_by_ne() {
        let data = Bytes::from_static(&[0x01, 0x02, 0x03]);
        let cmd = Command::new_with_data_and_ne(0x00, 0x01, 0x03, 0x00, data, 65536);

        assert!(cmd.requires_extended());
        let bytes = cmd.to_bytes();
        // Header, Lc = 00 00 03, data, Le = 00 00
        assert_eq!(
            bytes.as_ref(),
            &[0x00, 0x01, 0x03, 0x00, 0x00, 0x00, 0x03, 0x01, 0x02, 0x03, 0x00, 0x00]
        );
    }

    #[test]
    fn test_extended_serialization_forced_by_data() {
        let data = Bytes::from(vec![0xAB; 300]);
        let cmd = Command::new_with_data(0x00, 0x01, 0x00, 0x00, data);

        assert!(cmd.requires_extended());
        let bytes = cmd.to_bytes();
        assert_eq!(bytes.len(), 4 + 3 + 300);
        assert_eq!(&bytes[4..7], &[0x00, 0x01, 0x2C]); // Lc = 300
    }

    #[test]
    fn test_extended_le_without_data() {
        let cmd = Command::new_with_ne(0x00, 0xB0, 0x00, 0x00, 1024);
        let bytes = cmd.to_bytes();
        assert_eq!(bytes.as_ref(), &[0x00, 0xB0, 0x00, 0x00, 0x00, 0x04, 0x00]);
    }

    #[test]
    fn test_command_length() {
        let cmd1 = Command::new(0x00, 0xB0, 0x00, 0x00);
        assert_eq!(cmd1.command_length(), 4);

        let cmd2 = Command::new_with_ne(0x00, 0xB0, 0x00, 0x00, 0xFF);
        assert_eq!(cmd2.command_length(), 5);

        let data = Bytes::from_static(&[0x01, 0x02, 0x03]);
        let cmd3 = Command::new_with_data(0x00, 0xD6, 0x00, 0x00, data.clone());
        assert_eq!(cmd3.command_length(), 8);

        let cmd4 = Command::new_with_data_and_ne(0x00, 0xD6, 0x00, 0x00, data.clone(), 0xFF);
        assert_eq!(cmd4.command_length(), 9);

        let cmd5 = Command::new_with_data_and_ne(0x00, 0xD6, 0x00, 0x00, data, 65536);
        assert_eq!(cmd5.command_length(), 4 + 3 + 3 + 2);
    }

    #[test]
    fn test_variants_leave_original_untouched() {
        let original = Command::new_with_data(0x00, 0x01, 0x00, 0x00, vec![0x01, 0x02]);
        let adjusted = original.clone().with_ne(5);

        assert!(original.ne.is_none());
        assert_eq!(adjusted.ne, Some(5));
        assert_eq!(adjusted.data, original.data);
    }

    #[test]
    fn test_command_from_bytes() {
        // Simple command with no data or Le
        let cmd = Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00]).unwrap();
        assert_eq!(cmd.cla, 0x00);
        assert_eq!(cmd.ins, 0xA4);
        assert!(cmd.data.is_none());
        assert!(cmd.ne.is_none());

        // Command with data but no Le
        let cmd = Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00, 0x03, 0x01, 0x02, 0x03]).unwrap();
        assert_eq!(cmd.data.as_ref().unwrap().as_ref(), &[0x01, 0x02, 0x03]);
        assert!(cmd.ne.is_none());

        // Command with data and Le
        let cmd =
            Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00, 0x03, 0x01, 0x02, 0x03, 0xFF]).unwrap();
        assert_eq!(cmd.data.as_ref().unwrap().as_ref(), &[0x01, 0x02, 0x03]);
        assert_eq!(cmd.ne, Some(0xFF));

        // Command with no data but with Le
        let cmd = Command::from_bytes(&[0x00, 0xB0, 0x00, 0x00, 0xFF]).unwrap();
        assert!(cmd.data.is_none());
        assert_eq!(cmd.ne, Some(0xFF));

        // Truncated header
        assert!(Command::from_bytes(&[0x00, 0xA4]).is_err());
    }
}
