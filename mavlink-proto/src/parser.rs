//! Byte-at-a-time MAVLink frame parser.
//!
//! Accepts both MAVLink 1 and MAVLink 2 framing. Frames whose message ID is
//! not known to [`message_info`] are reported as [`MavMessage::Unknown`]
//! without CRC verification, since their CRC_EXTRA seed is not available.

use crate::crc::frame_crc;
use crate::messages::{message_info, MavMessage};

/// MAVLink 1 start byte.
pub const MAVLINK_STX_V1: u8 = 0xFE;

/// MAVLink 2 start byte.
pub const MAVLINK_STX_V2: u8 = 0xFD;

/// Maximum MAVLink frame size (v2 header, 255-byte payload, CRC, signature).
pub const MAX_FRAME_SIZE: usize = 280;

/// Largest payload a frame can carry.
pub const MAX_PAYLOAD_SIZE: usize = 255;

/// MAVLink 1 header length including the start byte.
pub const HEADER_LEN_V1: usize = 6;

/// MAVLink 2 header length including the start byte.
pub const HEADER_LEN_V2: usize = 10;

/// MAVLink 2 signature block length.
const SIGNATURE_LEN: usize = 13;

/// MAVLink 2 incompat flag: frame is signed.
const INCOMPAT_FLAG_SIGNED: u8 = 0x01;

/// Routing header of a received frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MavHeader {
    pub sequence: u8,
    pub system_id: u8,
    pub component_id: u8,
}

/// Parser error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// MAVLink 1 payload shorter than the message definition.
    Incomplete,
    /// Header announced a frame that cannot fit the frame buffer.
    InvalidStart,
    /// CRC mismatch.
    CrcError,
    /// MAVLink 2 incompat flags this parser does not understand.
    Unsupported,
}

/// MAVLink frame parser.
pub struct MavlinkParser {
    buffer: [u8; MAX_FRAME_SIZE],
    pos: usize,
    state: ParserState,
    last_header: MavHeader,
}

#[derive(Clone, Copy)]
enum ParserState {
    WaitingForStart,
    ReadingHeader,
    ReadingPayload { expected_len: usize },
}

impl MavlinkParser {
    /// Create a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: [0u8; MAX_FRAME_SIZE],
            pos: 0,
            state: ParserState::WaitingForStart,
            last_header: MavHeader::default(),
        }
    }

    /// Reset parser state.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.state = ParserState::WaitingForStart;
    }

    /// Header of the most recently completed frame.
    #[must_use]
    pub fn last_header(&self) -> MavHeader {
        self.last_header
    }

    /// Feed a byte to the parser.
    ///
    /// Returns `Some(message)` if a complete valid message was parsed.
    pub fn push_byte(&mut self, byte: u8) -> Result<Option<MavMessage>, ParseError> {
        match self.state {
            ParserState::WaitingForStart => {
                if byte == MAVLINK_STX_V1 || byte == MAVLINK_STX_V2 {
                    self.buffer[0] = byte;
                    self.pos = 1;
                    self.state = ParserState::ReadingHeader;
                }
                Ok(None)
            }
            ParserState::ReadingHeader => {
                self.buffer[self.pos] = byte;
                self.pos += 1;

                let is_v2 = self.buffer[0] == MAVLINK_STX_V2;
                let header_size = if is_v2 { HEADER_LEN_V2 } else { HEADER_LEN_V1 };

                if self.pos >= header_size {
                    let payload_len = self.buffer[1] as usize;
                    let mut expected_len = header_size + payload_len + 2;

                    if is_v2 {
                        let incompat = self.buffer[2];
                        if incompat & !INCOMPAT_FLAG_SIGNED != 0 {
                            self.reset();
                            return Err(ParseError::Unsupported);
                        }
                        if incompat & INCOMPAT_FLAG_SIGNED != 0 {
                            expected_len += SIGNATURE_LEN;
                        }
                    }

                    if expected_len > MAX_FRAME_SIZE {
                        self.reset();
                        return Err(ParseError::InvalidStart);
                    }

                    self.state = ParserState::ReadingPayload { expected_len };
                }
                Ok(None)
            }
            ParserState::ReadingPayload { expected_len } => {
                self.buffer[self.pos] = byte;
                self.pos += 1;

                if self.pos >= expected_len {
                    let result = self.parse_frame();
                    self.reset();
                    result
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Parse a complete frame.
    fn parse_frame(&mut self) -> Result<Option<MavMessage>, ParseError> {
        let is_v2 = self.buffer[0] == MAVLINK_STX_V2;
        let payload_len = self.buffer[1] as usize;

        let (msg_id, payload_start, header) = if is_v2 {
            // MAVLink 2: msgid is 3 bytes at offset 7-9
            let id = (self.buffer[7] as u32)
                | ((self.buffer[8] as u32) << 8)
                | ((self.buffer[9] as u32) << 16);
            let header = MavHeader {
                sequence: self.buffer[4],
                system_id: self.buffer[5],
                component_id: self.buffer[6],
            };
            (id, HEADER_LEN_V2, header)
        } else {
            // MAVLink 1: msgid is 1 byte at offset 5
            let header = MavHeader {
                sequence: self.buffer[2],
                system_id: self.buffer[3],
                component_id: self.buffer[4],
            };
            (self.buffer[5] as u32, HEADER_LEN_V1, header)
        };
        self.last_header = header;

        let Some((crc_extra, full_len)) = message_info(msg_id) else {
            return Ok(Some(MavMessage::Unknown(msg_id)));
        };

        // CRC covers header (excluding STX) + payload, then CRC_EXTRA
        let crc_start = payload_start + payload_len;
        let calculated_crc = frame_crc(&self.buffer[1..crc_start], crc_extra);
        let received_crc =
            u16::from_le_bytes([self.buffer[crc_start], self.buffer[crc_start + 1]]);

        if calculated_crc != received_crc {
            return Err(ParseError::CrcError);
        }

        // MAVLink 2 strips trailing zero bytes; MAVLink 1 must be complete
        if !is_v2 && payload_len < full_len {
            return Err(ParseError::Incomplete);
        }

        let mut payload = [0u8; MAX_PAYLOAD_SIZE];
        let copied = payload_len.min(full_len);
        payload[..copied].copy_from_slice(&self.buffer[payload_start..payload_start + copied]);

        Ok(Some(MavMessage::decode(msg_id, &payload[..full_len])))
    }
}

impl Default for MavlinkParser {
    fn default() -> Self {
        Self::new()
    }
}
