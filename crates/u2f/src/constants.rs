//! Protocol constants for FIDO U2F over ISO 7816-4
//!
//! All values come from the FIDO U2F raw message format and NFC protocol
//! specifications. Everything here is process-wide constant data, safe to
//! share across connections without synchronization.

/// Applet identifiers to try during discovery, in priority order
///
/// Earlier entries win: discovery stops at the first AID that selects
/// successfully and answers with the correct version string.
pub const FIDO_AID_CANDIDATES: &[&[u8]] = &[
    // "FIDO U2F NFC protocol", Section 5. Applet selection
    b"\xA0\x00\x00\x06\x47\x2F\x00\x01",
    // Workaround for Solokey, which registers the AID with a trailing byte
    b"\xA0\x00\x00\x06\x47\x2F\x00\x01\x00",
    // old Yubico demo applet AID
    b"\xA0\x00\x00\x05\x27\x10\x02",
];

/// Version string a U2F applet must answer with
pub const U2F_VERSION_STRING: &[u8] = b"U2F_V2";

/// Command class byte
pub const CLA: u8 = 0x00;
/// Class bit marking a non-final frame of a chained command
pub const CLA_CHAINING_BIT: u8 = 0x10;

/// SELECT FILE instruction (ISO 7816-4)
pub const INS_SELECT_FILE: u8 = 0xA4;
/// U2F_REGISTER instruction
pub const INS_REGISTER: u8 = 0x01;
/// U2F_AUTHENTICATE instruction
pub const INS_AUTHENTICATE: u8 = 0x02;
/// U2F_VERSION instruction
pub const INS_VERSION: u8 = 0x03;
/// GET RESPONSE instruction (ISO 7816-4 par. 7.6.1)
pub const INS_GET_RESPONSE: u8 = 0xC0;

/// P1 for SELECT FILE: select by DF name (AID)
pub const P1_SELECT_BY_NAME: u8 = 0x04;

/// Status words reported by U2F devices
///
/// "FIDO U2F Raw Message Formats", Section 3.3 Status Codes.
pub mod sw {
    /// Test-of-user-presence required
    pub const TEST_OF_USER_PRESENCE_REQUIRED: u16 = 0x6985;
    /// The key handle does not belong to this device
    pub const WRONG_KEY_HANDLE: u16 = 0x6A80;
    /// File or application not found
    pub const FILE_NOT_FOUND: u16 = 0x6A82;
    /// Class byte not supported
    pub const CLA_NOT_SUPPORTED: u16 = 0x6E00;
    /// Instruction not supported
    pub const INS_NOT_SUPPORTED: u16 = 0x6D00;
    /// The length of the request was invalid
    pub const WRONG_REQUEST_LENGTH: u16 = 0x6700;
}
