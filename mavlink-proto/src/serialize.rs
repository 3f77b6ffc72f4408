//! MAVLink 1 frame serialization for messages the bridge transmits.

use crate::crc::frame_crc;
use crate::messages::{
    message_info, RcChannelsOverride, MSG_ID_RC_CHANNELS_OVERRIDE, RC_OVERRIDE_PAYLOAD_LEN,
};
use crate::parser::{HEADER_LEN_V1, MAVLINK_STX_V1};

/// Size of an encoded RC_CHANNELS_OVERRIDE MAVLink 1 frame.
pub const RC_OVERRIDE_FRAME_SIZE: usize = HEADER_LEN_V1 + RC_OVERRIDE_PAYLOAD_LEN + 2;

/// Error type for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerializeError {
    /// Output buffer too small for the frame.
    BufferTooSmall,
    /// Payload longer than 255 bytes.
    PayloadTooLarge,
    /// No CRC_EXTRA is known for the message ID.
    UnknownMessage,
}

/// Encode a MAVLink 1 frame around `payload`.
///
/// Returns the number of bytes written to `buf`.
pub fn encode_frame_v1(
    buf: &mut [u8],
    sequence: u8,
    system_id: u8,
    component_id: u8,
    msg_id: u8,
    payload: &[u8],
) -> Result<usize, SerializeError> {
    let (crc_extra, _) = message_info(msg_id as u32).ok_or(SerializeError::UnknownMessage)?;
    let payload_len = u8::try_from(payload.len()).map_err(|_| SerializeError::PayloadTooLarge)?;
    let total = HEADER_LEN_V1 + payload.len() + 2;
    if buf.len() < total {
        return Err(SerializeError::BufferTooSmall);
    }

    buf[0] = MAVLINK_STX_V1;
    buf[1] = payload_len;
    buf[2] = sequence;
    buf[3] = system_id;
    buf[4] = component_id;
    buf[5] = msg_id;
    buf[HEADER_LEN_V1..HEADER_LEN_V1 + payload.len()].copy_from_slice(payload);

    let crc_pos = HEADER_LEN_V1 + payload.len();
    let crc = frame_crc(&buf[1..crc_pos], crc_extra);
    buf[crc_pos..crc_pos + 2].copy_from_slice(&crc.to_le_bytes());

    Ok(total)
}

/// Encode an RC_CHANNELS_OVERRIDE frame.
pub fn encode_rc_override(
    buf: &mut [u8],
    msg: &RcChannelsOverride,
    sequence: u8,
    system_id: u8,
    component_id: u8,
) -> Result<usize, SerializeError> {
    let mut payload = [0u8; RC_OVERRIDE_PAYLOAD_LEN];
    let len = msg.encode(&mut payload);
    encode_frame_v1(
        buf,
        sequence,
        system_id,
        component_id,
        MSG_ID_RC_CHANNELS_OVERRIDE as u8,
        &payload[..len],
    )
}

/// Stateful frame writer that stamps a rolling sequence number.
#[derive(Debug, Clone, Copy)]
pub struct FrameWriter {
    system_id: u8,
    component_id: u8,
    sequence: u8,
}

impl FrameWriter {
    /// Create a writer sending as `system_id`/`component_id`.
    #[must_use]
    pub const fn new(system_id: u8, component_id: u8) -> Self {
        Self {
            system_id,
            component_id,
            sequence: 0,
        }
    }

    /// Encode an RC_CHANNELS_OVERRIDE frame and advance the sequence number.
    pub fn rc_override(
        &mut self,
        buf: &mut [u8],
        msg: &RcChannelsOverride,
    ) -> Result<usize, SerializeError> {
        let len = encode_rc_override(buf, msg, self.sequence, self.system_id, self.component_id)?;
        self.sequence = self.sequence.wrapping_add(1);
        Ok(len)
    }
}
