//! Status word (SW1-SW2) handling
//!
//! Every APDU response ends in a two-byte status word. This module provides
//! the `StatusWord` type plus the ISO/IEC 7816-4 classifications the
//! transceive logic cares about.

use std::fmt;

/// A two-byte APDU status word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord {
    /// First status byte (SW1)
    pub sw1: u8,
    /// Second status byte (SW2)
    pub sw2: u8,
}

impl StatusWord {
    /// Normal processing, no further qualification (0x9000)
    pub const SUCCESS: Self = Self::new(0x90, 0x00);

    /// SW1 signalling that more response data is available (GET RESPONSE)
    pub const SW1_MORE_DATA_AVAILABLE: u8 = 0x61;
    /// SW1 signalling a wrong Le field, SW2 carries the exact length
    pub const SW1_WRONG_LENGTH: u8 = 0x6C;

    /// Create a status word from its two bytes
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// Create a status word from a combined u16 value
    pub const fn from_u16(sw: u16) -> Self {
        Self::new((sw >> 8) as u8, (sw & 0xFF) as u8)
    }

    /// Combined status word value (`SW1 << 8 | SW2`)
    pub const fn to_u16(self) -> u16 {
        ((self.sw1 as u16) << 8) | (self.sw2 as u16)
    }

    /// Whether this is the success status (0x9000)
    pub const fn is_success(self) -> bool {
        self.to_u16() == 0x9000
    }

    /// Whether SW1 reports more response data available (0x61xx)
    pub const fn has_more_data(self) -> bool {
        self.sw1 == Self::SW1_MORE_DATA_AVAILABLE
    }

    /// Whether SW1 reports an incorrect Le field (0x6Cxx)
    pub const fn is_wrong_length(self) -> bool {
        self.sw1 == Self::SW1_WRONG_LENGTH
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.to_u16())
    }
}

impl From<u16> for StatusWord {
    fn from(sw: u16) -> Self {
        Self::from_u16(sw)
    }
}

impl From<StatusWord> for u16 {
    fn from(sw: StatusWord) -> Self {
        sw.to_u16()
    }
}

/// Common ISO/IEC 7816-4 status words
pub mod common {
    /// Normal processing
    pub const SW_NO_ERROR: u16 = 0x9000;
    /// Wrong length (Lc or Le)
    pub const SW_WRONG_LENGTH: u16 = 0x6700;
    /// Conditions of use not satisfied
    pub const SW_CONDITIONS_NOT_SATISFIED: u16 = 0x6985;
    /// Wrong data in the command field
    pub const SW_WRONG_DATA: u16 = 0x6A80;
    /// File or application not found
    pub const SW_FILE_NOT_FOUND: u16 = 0x6A82;
    /// Instruction code not supported or invalid
    pub const SW_INS_NOT_SUPPORTED: u16 = 0x6D00;
    /// Class byte not supported
    pub const SW_CLA_NOT_SUPPORTED: u16 = 0x6E00;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let sw = StatusWord::new(0x61, 0x05);
        assert_eq!(sw.to_u16(), 0x6105);
        assert_eq!(StatusWord::from_u16(0x6105), sw);
        assert_eq!(u16::from(sw), 0x6105);
    }

    #[test]
    fn test_classification() {
        assert!(StatusWord::SUCCESS.is_success());
        assert!(StatusWord::new(0x61, 0x05).has_more_data());
        assert!(StatusWord::new(0x6C, 0x05).is_wrong_length());
        assert!(!StatusWord::new(0x69, 0x85).is_success());
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusWord::new(0x6A, 0x82).to_string(), "6A82");
    }
}
