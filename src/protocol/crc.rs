//! # CRC16/CCITT Implementation
//!
//! CRC-16/CCITT checksum for Iliad downlink frames.
//!
//! **Polynomial**: 0x1021 (x^16 + x^12 + x^5 + 1)
//! **Initial Value**: 0x0000, no reflection, no final XOR (the XMODEM
//! parameterisation, which is what the flight software calls "CCITT").
//!
//! The wire footer is 4 bytes wide. The 16-bit result is zero-extended into
//! the low half of a big-endian `u32` on encode, and the full 32-bit footer is
//! compared against the zero-extended recomputed value on decode, so a footer
//! with anything in its upper half never verifies.

use crc::{Crc, CRC_16_XMODEM};

/// CRC16/CCITT calculator
const CRC16_CCITT: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Calculate CRC16/CCITT over a byte slice
///
/// # Arguments
///
/// * `data` - Bytes to checksum (mask + timestamp + payload)
///
/// # Examples
///
/// ```
/// use iliad_downlink::protocol::crc::crc16_ccitt;
///
/// assert_eq!(crc16_ccitt(b"123456789"), 0x31C3);
/// ```
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    CRC16_CCITT.checksum(data)
}

/// Widen a CRC16 into the 4-byte footer value
pub fn footer_value(crc: u16) -> u32 {
    u32::from(crc)
}

/// Check a received footer against the bytes it covers
///
/// # Returns
///
/// * `true` if the zero-extended CRC of `data` equals `footer`
pub fn verify(data: &[u8], footer: u32) -> bool {
    footer_value(crc16_ccitt(data)) == footer
}
