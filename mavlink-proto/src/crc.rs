//! CRC-16/MCRF4XX (X.25) checksum used by MAVLink frames.

use crc::{Crc, CRC_16_MCRF4XX};

const X25: Crc<u16> = Crc::<u16>::new(&CRC_16_MCRF4XX);

/// Checksum `data` (frame bytes after the start marker) followed by the
/// message's CRC_EXTRA seed.
#[inline]
#[must_use]
pub fn frame_crc(data: &[u8], crc_extra: u8) -> u16 {
    let mut digest = X25.digest();
    digest.update(data);
    digest.update(&[crc_extra]);
    digest.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference bytewise accumulator from the MAVLink C library.
    fn crc_accumulate(byte: u8, crc: u16) -> u16 {
        let tmp: u8 = byte ^ (crc as u8);
        let tmp = u16::from(tmp ^ (tmp << 4));
        (crc >> 8) ^ (tmp << 8) ^ (tmp << 3) ^ (tmp >> 4)
    }

    #[test]
    fn test_frame_crc_matches_reference_accumulator() {
        let data = [0x09, 0x00, 0x01, 0x01, 0x00, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        let mut expected = 0xFFFF;
        for &b in &data {
            expected = crc_accumulate(b, expected);
        }
        expected = crc_accumulate(50, expected);

        assert_eq!(frame_crc(&data, 50), expected);
    }

    #[test]
    fn test_crc_extra_changes_checksum() {
        assert_ne!(frame_crc(&[0x00], 0), frame_crc(&[0x00], 1));
    }
}
