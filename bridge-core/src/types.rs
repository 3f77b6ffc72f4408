//! Local-bus message types published and consumed by the bridge.
//!
//! Timestamps are microseconds. A message takes its timestamp either from
//! the autopilot's device clock or from the local capture clock, never a mix.

/// Fixed origin of the local tangent-plane frame.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeodeticOrigin {
    /// Degrees.
    pub latitude: f64,
    /// Degrees.
    pub longitude: f64,
    /// Meters above MSL.
    pub elevation: f64,
}

impl GeodeticOrigin {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }
}

/// GPS fix quality as reported in GPS_RAW_INT `fix_type`.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GpsLock {
    #[default]
    NoFix,
    Fix2d,
    Fix3d,
    /// DGPS, RTK and other augmented fixes. Not projected to the local frame.
    Augmented,
}

impl GpsLock {
    /// Map the raw fix type (0-1: none, 2: 2D, 3: 3D, above 3: augmented).
    #[must_use]
    pub const fn from_fix_type(fix_type: u8) -> Self {
        match fix_type {
            0 | 1 => GpsLock::NoFix,
            2 => GpsLock::Fix2d,
            3 => GpsLock::Fix3d,
            _ => GpsLock::Augmented,
        }
    }
}

/// Inertial sample built from RAW_IMU.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InertialSample {
    /// Local capture time.
    pub utime: i64,
    /// Autopilot timestamp from the wire.
    pub device_time: i64,
    pub gyro: [f64; 3],
    /// m/s^2.
    pub accel: [f64; 3],
    /// Raw magnetometer counts.
    pub mag: [f64; 3],
    /// Unused, always zero.
    pub quat: [f64; 4],
    /// Filled in by another component, always zero here.
    pub pressure: f64,
    /// Filled in by another component, always zero here.
    pub rel_alt: f64,
}

/// Attitude from the autopilot's own estimator.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttitudeSample {
    pub timestamp: i64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub rollspeed: f64,
    pub pitchspeed: f64,
    pub yawspeed: f64,
}

/// GPS fix with local planar position.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpsFix {
    pub utime: i64,
    pub lock_quality: GpsLock,
    /// Degrees.
    pub latitude: f64,
    /// Degrees.
    pub longitude: f64,
    /// Meters above MSL.
    pub elevation_msl: f64,
    /// As reported (cm).
    pub horizontal_accuracy: f64,
    /// As reported (cm).
    pub vertical_accuracy: f64,
    /// m/s.
    pub ground_speed: f64,
    /// Degrees, direction of travel.
    pub course_over_ground: f64,
    pub satellites_visible: u8,
    /// East, north, up in meters relative to the origin.
    pub local_xyz: [f64; 3],
}

/// Airspeed and barometric altitude.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaroAirspeed {
    pub utime: i64,
    pub airspeed: f64,
    pub baro_altitude: f64,
    pub temperature: f64,
}

/// Battery state.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatteryStatus {
    pub timestamp: i64,
    /// Volts.
    pub voltage: f64,
    /// Amps.
    pub amps_now: f64,
    pub milliamp_hours_total: f64,
    pub percent_remaining: i8,
}

/// Servo outputs as executed by the autopilot.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServoFeedback {
    pub timestamp: i64,
    /// Raw pulse width (us).
    pub elevon_left: u16,
    /// Raw pulse width (us).
    pub elevon_right: u16,
    /// Raw pulse width (us).
    pub throttle: u16,
    pub is_autonomous: bool,
    pub video_record: bool,
}

/// Stereo camera start/stop request.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StereoControlEvent {
    pub timestamp: i64,
    pub stereo_on: bool,
    pub rec_on: bool,
}

/// Actuator command from local software, 8-bit normalized.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActuatorCommand {
    pub elevon_left: u8,
    pub elevon_right: u8,
    pub throttle: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gps_lock_from_fix_type() {
        assert_eq!(GpsLock::from_fix_type(0), GpsLock::NoFix);
        assert_eq!(GpsLock::from_fix_type(1), GpsLock::NoFix);
        assert_eq!(GpsLock::from_fix_type(2), GpsLock::Fix2d);
        assert_eq!(GpsLock::from_fix_type(3), GpsLock::Fix3d);
        for fix_type in [4, 5, 6, 8] {
            assert_eq!(GpsLock::from_fix_type(fix_type), GpsLock::Augmented);
        }
    }
}
