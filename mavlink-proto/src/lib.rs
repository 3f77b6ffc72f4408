//! MAVLink frame parsing and serialization for the ArduPilot bridge.
//!
//! This crate provides a chip-agnostic MAVLink codec covering the telemetry
//! messages an ArduPilot autopilot streams to a companion computer, and the
//! RC_CHANNELS_OVERRIDE command sent back. It is designed to be fed from any
//! byte transport (UART, UDP, a pub/sub bus).
//!
//! # Features
//!
//! - Byte-at-a-time parser for MAVLink 1 and MAVLink 2 frames
//! - CRC-16/MCRF4XX verification with per-message CRC_EXTRA
//! - No heap allocation, `no_std` by default
//!
//! # Example
//!
//! ```ignore
//! use mavlink_proto::{MavlinkParser, MavMessage};
//!
//! let mut parser = MavlinkParser::new();
//!
//! for byte in datagram {
//!     if let Ok(Some(msg)) = parser.push_byte(byte) {
//!         if let MavMessage::GpsRawInt(gps) = msg {
//!             // Use gps...
//!         }
//!     }
//! }
//! ```
//!
//! # MAVLink Message Types
//!
//! Decoded: HEARTBEAT (0), GPS_RAW_INT (24), RAW_IMU (27), SCALED_PRESSURE (29),
//! ATTITUDE (30), GLOBAL_POSITION_INT (33), SERVO_OUTPUT_RAW (36),
//! RC_CHANNELS_OVERRIDE (70), BATTERY_STATUS (147), STATUSTEXT (253).
//! Everything else surfaces as [`MavMessage::Unknown`].

#![cfg_attr(not(feature = "std"), no_std)]

pub mod crc;
pub mod messages;
pub mod parser;
pub mod serialize;

pub use messages::{
    message_info, Attitude, BatteryStatus, GlobalPositionInt, GpsRawInt, Heartbeat, MavMessage,
    RawImu, RcChannelsOverride, ScaledPressure, ServoOutputRaw, StatusText, CHANNEL_COUNT,
    MSG_ID_ATTITUDE, MSG_ID_BATTERY_STATUS, MSG_ID_GLOBAL_POSITION_INT, MSG_ID_GPS_RAW_INT,
    MSG_ID_HEARTBEAT, MSG_ID_RAW_IMU, MSG_ID_RC_CHANNELS_OVERRIDE, MSG_ID_SCALED_PRESSURE,
    MSG_ID_SERVO_OUTPUT_RAW, MSG_ID_STATUSTEXT, RC_OVERRIDE_PAYLOAD_LEN, STATUSTEXT_LEN,
};
pub use parser::{
    MavHeader, MavlinkParser, ParseError, MAVLINK_STX_V1, MAVLINK_STX_V2, MAX_FRAME_SIZE,
};
pub use serialize::{
    encode_frame_v1, encode_rc_override, FrameWriter, SerializeError, RC_OVERRIDE_FRAME_SIZE,
};
