//! Actuator command to RC_CHANNELS_OVERRIDE translation.

use mavlink_proto::{RcChannelsOverride, CHANNEL_COUNT};

use crate::types::ActuatorCommand;

/// Neutral pulse width for channels the bridge does not drive (us).
pub const NEUTRAL_PULSE_US: u16 = 1000;

/// Pulse-width increment per 8-bit step.
///
/// Integer division: 200 / 51 evaluates to 3, so full scale is 1765 us
/// rather than 2000 us.
pub const PULSE_STEP_US: u16 = 200 / 51;

/// System ID the override frame is addressed to.
pub const TARGET_SYSTEM: u8 = 1;

/// Component ID the override frame is addressed to.
pub const TARGET_COMPONENT: u8 = 200;

/// Map an 8-bit actuator value to a servo pulse width in microseconds.
#[inline]
#[must_use]
pub const fn eight_bit_to_pulse(value: u8) -> u16 {
    PULSE_STEP_US * value as u16 + NEUTRAL_PULSE_US
}

/// Build the override frame for `cmd`.
///
/// Channels: 1 elevon left, 2 elevon right, 3 throttle; 4-8 held neutral.
#[must_use]
pub fn translate(cmd: &ActuatorCommand) -> RcChannelsOverride {
    let mut channels = [NEUTRAL_PULSE_US; CHANNEL_COUNT];
    channels[0] = eight_bit_to_pulse(cmd.elevon_left);
    channels[1] = eight_bit_to_pulse(cmd.elevon_right);
    channels[2] = eight_bit_to_pulse(cmd.throttle);

    RcChannelsOverride {
        target_system: TARGET_SYSTEM,
        target_component: TARGET_COMPONENT,
        channels,
    }
}
