//! MAVLink message payloads consumed and produced by the bridge.
//!
//! Field layouts follow MAVLink wire ordering (fields sorted by type size,
//! largest first). All multi-byte values are little-endian.

/// HEARTBEAT message ID.
pub const MSG_ID_HEARTBEAT: u32 = 0;
/// GPS_RAW_INT message ID.
pub const MSG_ID_GPS_RAW_INT: u32 = 24;
/// RAW_IMU message ID.
pub const MSG_ID_RAW_IMU: u32 = 27;
/// SCALED_PRESSURE message ID.
pub const MSG_ID_SCALED_PRESSURE: u32 = 29;
/// ATTITUDE message ID.
pub const MSG_ID_ATTITUDE: u32 = 30;
/// GLOBAL_POSITION_INT message ID.
pub const MSG_ID_GLOBAL_POSITION_INT: u32 = 33;
/// SERVO_OUTPUT_RAW message ID.
pub const MSG_ID_SERVO_OUTPUT_RAW: u32 = 36;
/// RC_CHANNELS_OVERRIDE message ID.
pub const MSG_ID_RC_CHANNELS_OVERRIDE: u32 = 70;
/// BATTERY_STATUS message ID (legacy per-cell layout).
pub const MSG_ID_BATTERY_STATUS: u32 = 147;
/// STATUSTEXT message ID.
pub const MSG_ID_STATUSTEXT: u32 = 253;

/// Length of the STATUSTEXT text field.
pub const STATUSTEXT_LEN: usize = 50;

/// Number of RC override / servo output channels carried by MAVLink 1 messages.
pub const CHANNEL_COUNT: usize = 8;

/// RC_CHANNELS_OVERRIDE payload length.
pub const RC_OVERRIDE_PAYLOAD_LEN: usize = 18;

/// Per-message CRC_EXTRA seed and full (untruncated) payload length.
///
/// Returns `None` for message IDs this crate does not decode.
#[must_use]
pub const fn message_info(msg_id: u32) -> Option<(u8, usize)> {
    match msg_id {
        MSG_ID_HEARTBEAT => Some((50, 9)),
        MSG_ID_GPS_RAW_INT => Some((24, 30)),
        MSG_ID_RAW_IMU => Some((144, 26)),
        MSG_ID_SCALED_PRESSURE => Some((115, 14)),
        MSG_ID_ATTITUDE => Some((39, 28)),
        MSG_ID_GLOBAL_POSITION_INT => Some((104, 28)),
        MSG_ID_SERVO_OUTPUT_RAW => Some((222, 21)),
        MSG_ID_RC_CHANNELS_OVERRIDE => Some((124, RC_OVERRIDE_PAYLOAD_LEN)),
        MSG_ID_BATTERY_STATUS => Some((42, 16)),
        MSG_ID_STATUSTEXT => Some((83, 51)),
        _ => None,
    }
}

/// HEARTBEAT (ID 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Heartbeat {
    pub custom_mode: u32,
    pub mav_type: u8,
    pub autopilot: u8,
    pub base_mode: u8,
    pub system_status: u8,
    pub mavlink_version: u8,
}

/// RAW_IMU (ID 27): raw sensor values, milli-g and milli-rad/s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawImu {
    /// Device timestamp in microseconds.
    pub time_usec: u64,
    pub xacc: i16,
    pub yacc: i16,
    pub zacc: i16,
    pub xgyro: i16,
    pub ygyro: i16,
    pub zgyro: i16,
    pub xmag: i16,
    pub ymag: i16,
    pub zmag: i16,
}

/// ATTITUDE (ID 30): Euler angles in radians, rates in rad/s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Attitude {
    pub time_boot_ms: u32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub rollspeed: f32,
    pub pitchspeed: f32,
    pub yawspeed: f32,
}

/// GLOBAL_POSITION_INT (ID 33): fused position estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlobalPositionInt {
    pub time_boot_ms: u32,
    /// Latitude in degrees * 1e7.
    pub lat: i32,
    /// Longitude in degrees * 1e7.
    pub lon: i32,
    /// Altitude MSL in millimeters.
    pub alt: i32,
    /// Altitude above home in millimeters.
    pub relative_alt: i32,
    pub vx: i16,
    pub vy: i16,
    pub vz: i16,
    /// Heading in centidegrees.
    pub hdg: u16,
}

/// GPS_RAW_INT (ID 24): raw GPS fix as reported by the receiver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpsRawInt {
    pub time_usec: u64,
    /// Latitude in degrees * 1e7.
    pub lat: i32,
    /// Longitude in degrees * 1e7.
    pub lon: i32,
    /// Altitude MSL in millimeters.
    pub alt: i32,
    /// Horizontal dilution in cm. 65535 if unknown.
    pub eph: u16,
    /// Vertical dilution in cm. 65535 if unknown.
    pub epv: u16,
    /// Ground speed in cm/s.
    pub vel: u16,
    /// Course over ground in centidegrees.
    pub cog: u16,
    /// 0-1: no fix, 2: 2D fix, 3: 3D fix.
    pub fix_type: u8,
    pub satellites_visible: u8,
}

/// SCALED_PRESSURE (ID 29).
///
/// The autopilot firmware this bridge talks to repurposes `press_abs` as
/// airspeed and `press_diff` as barometric altitude.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScaledPressure {
    pub time_boot_ms: u32,
    pub press_abs: f32,
    pub press_diff: f32,
    /// Temperature in centidegrees Celsius.
    pub temperature: i16,
}

/// RC_CHANNELS_OVERRIDE (ID 70).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RcChannelsOverride {
    pub target_system: u8,
    pub target_component: u8,
    /// Channel pulse widths in microseconds, channel 1 first.
    pub channels: [u16; CHANNEL_COUNT],
}

/// BATTERY_STATUS (ID 147), legacy layout with per-cell voltages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryStatus {
    /// Cell voltages in millivolts, cell 1 first.
    pub voltage_cells: [u16; 6],
    /// Battery current in centiamps.
    pub current_battery: i16,
    pub accu_id: u8,
    /// Remaining capacity in percent, -1 if unknown.
    pub battery_remaining: i8,
}

/// SERVO_OUTPUT_RAW (ID 36).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoOutputRaw {
    pub time_usec: u32,
    pub port: u8,
    /// Servo pulse widths in microseconds, servo 1 first.
    pub servo_raw: [u16; CHANNEL_COUNT],
}

impl ServoOutputRaw {
    /// Raw value of a 1-based servo channel, 0 if out of range.
    #[inline]
    #[must_use]
    pub fn channel(&self, number: usize) -> u16 {
        number
            .checked_sub(1)
            .and_then(|i| self.servo_raw.get(i))
            .copied()
            .unwrap_or(0)
    }
}

/// STATUSTEXT (ID 253).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusText {
    pub severity: u8,
    /// NUL-padded text bytes.
    pub text: [u8; STATUSTEXT_LEN],
}

impl StatusText {
    /// Text up to the first NUL, truncated at the first invalid UTF-8 byte.
    #[must_use]
    pub fn as_str(&self) -> &str {
        let end = self
            .text
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(STATUSTEXT_LEN);
        let bytes = &self.text[..end];
        match core::str::from_utf8(bytes) {
            Ok(s) => s,
            // Valid prefix is guaranteed by `valid_up_to`
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
        }
    }
}

impl Default for StatusText {
    fn default() -> Self {
        Self {
            severity: 0,
            text: [0u8; STATUSTEXT_LEN],
        }
    }
}

/// Decoded MAVLink message.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MavMessage {
    Heartbeat(Heartbeat),
    RawImu(RawImu),
    Attitude(Attitude),
    GlobalPositionInt(GlobalPositionInt),
    GpsRawInt(GpsRawInt),
    ScaledPressure(ScaledPressure),
    RcChannelsOverride(RcChannelsOverride),
    BatteryStatus(BatteryStatus),
    ServoOutputRaw(ServoOutputRaw),
    StatusText(StatusText),
    /// Any message ID not listed above.
    Unknown(u32),
}

impl MavMessage {
    /// MAVLink message ID of this message.
    #[must_use]
    pub fn message_id(&self) -> u32 {
        match self {
            MavMessage::Heartbeat(_) => MSG_ID_HEARTBEAT,
            MavMessage::RawImu(_) => MSG_ID_RAW_IMU,
            MavMessage::Attitude(_) => MSG_ID_ATTITUDE,
            MavMessage::GlobalPositionInt(_) => MSG_ID_GLOBAL_POSITION_INT,
            MavMessage::GpsRawInt(_) => MSG_ID_GPS_RAW_INT,
            MavMessage::ScaledPressure(_) => MSG_ID_SCALED_PRESSURE,
            MavMessage::RcChannelsOverride(_) => MSG_ID_RC_CHANNELS_OVERRIDE,
            MavMessage::BatteryStatus(_) => MSG_ID_BATTERY_STATUS,
            MavMessage::ServoOutputRaw(_) => MSG_ID_SERVO_OUTPUT_RAW,
            MavMessage::StatusText(_) => MSG_ID_STATUSTEXT,
            MavMessage::Unknown(id) => *id,
        }
    }

    /// Decode a payload for `msg_id`.
    ///
    /// `payload` must already be zero-extended to the full message length
    /// (see [`message_info`]). Unknown IDs decode to [`MavMessage::Unknown`].
    #[must_use]
    pub fn decode(msg_id: u32, payload: &[u8]) -> Self {
        let mut r = Reader::new(payload);
        match msg_id {
            MSG_ID_HEARTBEAT => MavMessage::Heartbeat(Heartbeat {
                custom_mode: r.u32(),
                mav_type: r.u8(),
                autopilot: r.u8(),
                base_mode: r.u8(),
                system_status: r.u8(),
                mavlink_version: r.u8(),
            }),
            MSG_ID_RAW_IMU => MavMessage::RawImu(RawImu {
                time_usec: r.u64(),
                xacc: r.i16(),
                yacc: r.i16(),
                zacc: r.i16(),
                xgyro: r.i16(),
                ygyro: r.i16(),
                zgyro: r.i16(),
                xmag: r.i16(),
                ymag: r.i16(),
                zmag: r.i16(),
            }),
            MSG_ID_ATTITUDE => MavMessage::Attitude(Attitude {
                time_boot_ms: r.u32(),
                roll: r.f32(),
                pitch: r.f32(),
                yaw: r.f32(),
                rollspeed: r.f32(),
                pitchspeed: r.f32(),
                yawspeed: r.f32(),
            }),
            MSG_ID_GLOBAL_POSITION_INT => MavMessage::GlobalPositionInt(GlobalPositionInt {
                time_boot_ms: r.u32(),
                lat: r.i32(),
                lon: r.i32(),
                alt: r.i32(),
                relative_alt: r.i32(),
                vx: r.i16(),
                vy: r.i16(),
                vz: r.i16(),
                hdg: r.u16(),
            }),
            MSG_ID_GPS_RAW_INT => MavMessage::GpsRawInt(GpsRawInt {
                time_usec: r.u64(),
                lat: r.i32(),
                lon: r.i32(),
                alt: r.i32(),
                eph: r.u16(),
                epv: r.u16(),
                vel: r.u16(),
                cog: r.u16(),
                fix_type: r.u8(),
                satellites_visible: r.u8(),
            }),
            MSG_ID_SCALED_PRESSURE => MavMessage::ScaledPressure(ScaledPressure {
                time_boot_ms: r.u32(),
                press_abs: r.f32(),
                press_diff: r.f32(),
                temperature: r.i16(),
            }),
            MSG_ID_RC_CHANNELS_OVERRIDE => {
                let channels = r.u16_array::<CHANNEL_COUNT>();
                MavMessage::RcChannelsOverride(RcChannelsOverride {
                    channels,
                    target_system: r.u8(),
                    target_component: r.u8(),
                })
            }
            MSG_ID_BATTERY_STATUS => MavMessage::BatteryStatus(BatteryStatus {
                voltage_cells: r.u16_array::<6>(),
                current_battery: r.i16(),
                accu_id: r.u8(),
                battery_remaining: r.u8() as i8,
            }),
            MSG_ID_SERVO_OUTPUT_RAW => MavMessage::ServoOutputRaw(ServoOutputRaw {
                time_usec: r.u32(),
                servo_raw: r.u16_array::<CHANNEL_COUNT>(),
                port: r.u8(),
            }),
            MSG_ID_STATUSTEXT => {
                let severity = r.u8();
                let mut text = [0u8; STATUSTEXT_LEN];
                for b in text.iter_mut() {
                    *b = r.u8();
                }
                MavMessage::StatusText(StatusText { severity, text })
            }
            other => MavMessage::Unknown(other),
        }
    }
}

impl RcChannelsOverride {
    /// Write the wire payload into `buf`, returning the payload length.
    pub fn encode(&self, buf: &mut [u8; RC_OVERRIDE_PAYLOAD_LEN]) -> usize {
        let (channels, targets) = buf.split_at_mut(2 * CHANNEL_COUNT);
        for (out, ch) in channels.chunks_exact_mut(2).zip(self.channels) {
            out.copy_from_slice(&ch.to_le_bytes());
        }
        targets[0] = self.target_system;
        targets[1] = self.target_component;
        RC_OVERRIDE_PAYLOAD_LEN
    }
}

/// Little-endian cursor over a zero-extended payload.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Take `N` bytes, reading zeros past the end of the buffer.
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        for (i, b) in out.iter_mut().enumerate() {
            *b = self.buf.get(self.pos + i).copied().unwrap_or(0);
        }
        self.pos += N;
        out
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    fn i16(&mut self) -> i16 {
        i16::from_le_bytes(self.take())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }

    fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take())
    }

    fn f32(&mut self) -> f32 {
        f32::from_le_bytes(self.take())
    }

    fn u16_array<const N: usize>(&mut self) -> [u16; N] {
        let mut out = [0u16; N];
        for v in out.iter_mut() {
            *v = self.u16();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_gps_raw_int() {
        let mut payload = [0u8; 30];
        payload[0..8].copy_from_slice(&123_456u64.to_le_bytes());
        payload[8..12].copy_from_slice(&377_749_250i32.to_le_bytes());
        payload[12..16].copy_from_slice(&(-1_224_194_150i32).to_le_bytes());
        payload[16..20].copy_from_slice(&100_000i32.to_le_bytes());
        payload[20..22].copy_from_slice(&150u16.to_le_bytes());
        payload[22..24].copy_from_slice(&65535u16.to_le_bytes());
        payload[24..26].copy_from_slice(&1234u16.to_le_bytes());
        payload[26..28].copy_from_slice(&9000u16.to_le_bytes());
        payload[28] = 3;
        payload[29] = 11;

        let MavMessage::GpsRawInt(gps) = MavMessage::decode(MSG_ID_GPS_RAW_INT, &payload) else {
            panic!("expected GPS_RAW_INT");
        };
        assert_eq!(gps.time_usec, 123_456);
        assert_eq!(gps.lat, 377_749_250);
        assert_eq!(gps.lon, -1_224_194_150);
        assert_eq!(gps.alt, 100_000);
        assert_eq!(gps.eph, 150);
        assert_eq!(gps.epv, 65535);
        assert_eq!(gps.vel, 1234);
        assert_eq!(gps.cog, 9000);
        assert_eq!(gps.fix_type, 3);
        assert_eq!(gps.satellites_visible, 11);
    }

    #[test]
    fn test_decode_truncated_payload_zero_extends() {
        // Only time_usec and servo1 present
        let mut payload = [0u8; 6];
        payload[0..4].copy_from_slice(&42u32.to_le_bytes());
        payload[4..6].copy_from_slice(&1100u16.to_le_bytes());

        let MavMessage::ServoOutputRaw(servo) =
            MavMessage::decode(MSG_ID_SERVO_OUTPUT_RAW, &payload)
        else {
            panic!("expected SERVO_OUTPUT_RAW");
        };
        assert_eq!(servo.time_usec, 42);
        assert_eq!(servo.channel(1), 1100);
        assert_eq!(servo.channel(2), 0);
        assert_eq!(servo.port, 0);
    }

    #[test]
    fn test_servo_channel_out_of_range() {
        let servo = ServoOutputRaw::default();
        assert_eq!(servo.channel(0), 0);
        assert_eq!(servo.channel(9), 0);
    }

    #[test]
    fn test_decode_battery_status_legacy_layout() {
        let mut payload = [0u8; 16];
        payload[0..2].copy_from_slice(&12_000u16.to_le_bytes());
        payload[10..12].copy_from_slice(&4_500u16.to_le_bytes());
        payload[12..14].copy_from_slice(&250i16.to_le_bytes());
        payload[14] = 2;
        payload[15] = 87;

        let MavMessage::BatteryStatus(bat) = MavMessage::decode(MSG_ID_BATTERY_STATUS, &payload)
        else {
            panic!("expected BATTERY_STATUS");
        };
        assert_eq!(bat.voltage_cells[0], 12_000);
        assert_eq!(bat.voltage_cells[5], 4_500);
        assert_eq!(bat.current_battery, 250);
        assert_eq!(bat.accu_id, 2);
        assert_eq!(bat.battery_remaining, 87);
    }

    #[test]
    fn test_status_text_stops_at_nul() {
        let mut text = StatusText::default();
        text.text[..7].copy_from_slice(b"ARMING\0");
        text.text[8] = b'x';
        assert_eq!(text.as_str(), "ARMING");
    }

    #[test]
    fn test_status_text_invalid_utf8_truncated() {
        let mut text = StatusText::default();
        text.text[..4].copy_from_slice(&[b'o', b'k', 0xFF, b'!']);
        assert_eq!(text.as_str(), "ok");
    }

    #[test]
    fn test_rc_override_payload_layout() {
        let msg = RcChannelsOverride {
            target_system: 1,
            target_component: 200,
            channels: [1000, 1003, 1765, 1000, 1000, 1000, 1000, 1000],
        };
        let mut buf = [0u8; RC_OVERRIDE_PAYLOAD_LEN];
        assert_eq!(msg.encode(&mut buf), RC_OVERRIDE_PAYLOAD_LEN);
        assert_eq!(message_info(MSG_ID_RC_CHANNELS_OVERRIDE), Some((124, buf.len())));
        assert_eq!(u16::from_le_bytes([buf[2], buf[3]]), 1003);
        assert_eq!(buf[16], 1);
        assert_eq!(buf[17], 200);
        assert_eq!(
            MavMessage::decode(MSG_ID_RC_CHANNELS_OVERRIDE, &buf),
            MavMessage::RcChannelsOverride(msg)
        );
    }

    #[test]
    fn test_unknown_id() {
        assert_eq!(MavMessage::decode(999, &[]), MavMessage::Unknown(999));
        assert_eq!(MavMessage::Unknown(999).message_id(), 999);
        assert!(message_info(999).is_none());
    }
}
