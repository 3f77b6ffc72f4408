//! Wire-encoding to SI conversions.
//!
//! Each function mirrors one field scaling used by the autopilot firmware.
//! Operation order (divide, then multiply) is fixed so results are
//! bit-for-bit reproducible.

/// Standard gravity, m/s^2. Matches the ArduPilot definition.
pub const GRAVITY_MSS: f64 = 9.80665;

/// Servo pulse above which a two-position switch reads as "on" (us).
pub const SWITCH_THRESHOLD_US: u16 = 1500;

/// milli-rad/s to rad/s.
#[inline]
#[must_use]
pub fn gyro_from_milli(raw: i16) -> f64 {
    raw as f64 / 1000.0
}

/// milli-g to m/s^2.
#[inline]
#[must_use]
pub fn accel_from_milli_g(raw: i16) -> f64 {
    raw as f64 / 1000.0 * GRAVITY_MSS
}

/// Degrees * 1e7 to degrees.
#[inline]
#[must_use]
pub fn degrees_from_e7(raw: i32) -> f64 {
    raw as f64 / 1e7
}

/// Millimeters to meters.
#[inline]
#[must_use]
pub fn meters_from_mm(raw: i32) -> f64 {
    raw as f64 / 1e3
}

/// cm/s to m/s.
#[inline]
#[must_use]
pub fn speed_from_cm_s(raw: u16) -> f64 {
    raw as f64 / 100.0
}

/// Centidegrees to degrees.
#[inline]
#[must_use]
pub fn degrees_from_centi(raw: u16) -> f64 {
    raw as f64 / 100.0
}

/// Millivolts to volts.
#[inline]
#[must_use]
pub fn volts_from_mv(raw: u16) -> f64 {
    raw as f64 / 1000.0
}

/// Centiamps to amps.
#[inline]
#[must_use]
pub fn amps_from_centi(raw: i16) -> f64 {
    raw as f64 / 100.0
}

/// Two-position switch state from a servo pulse width.
#[inline]
#[must_use]
pub const fn switch_on(pulse_us: u16) -> bool {
    pulse_us > SWITCH_THRESHOLD_US
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gyro_scaling() {
        assert_eq!(gyro_from_milli(0), 0.0);
        assert_eq!(gyro_from_milli(1500), 1.5);
        assert_eq!(gyro_from_milli(-250), -0.25);
    }

    #[test]
    fn test_accel_scaling() {
        assert_eq!(accel_from_milli_g(0), 0.0);
        assert_eq!(accel_from_milli_g(1000), GRAVITY_MSS);
        assert_eq!(accel_from_milli_g(-1000), -GRAVITY_MSS);
        assert_eq!(accel_from_milli_g(500), 500.0 / 1000.0 * 9.80665);
    }

    #[test]
    fn test_position_scaling() {
        assert!((degrees_from_e7(377_749_250) - 37.774925).abs() < 1e-12);
        assert!((degrees_from_e7(-1_224_194_150) + 122.419415).abs() < 1e-12);
        assert_eq!(meters_from_mm(100_000), 100.0);
        assert_eq!(meters_from_mm(-1_500), -1.5);
    }

    #[test]
    fn test_speed_and_course_scaling() {
        assert_eq!(speed_from_cm_s(1234), 12.34);
        assert_eq!(degrees_from_centi(35_999), 359.99);
    }

    #[test]
    fn test_battery_scaling() {
        assert_eq!(volts_from_mv(12_000), 12.0);
        assert_eq!(amps_from_centi(250), 2.5);
        assert_eq!(amps_from_centi(-100), -1.0);
    }

    #[test]
    fn test_switch_threshold_is_exclusive() {
        assert!(!switch_on(1000));
        assert!(!switch_on(1500));
        assert!(switch_on(1501));
        assert!(switch_on(2000));
    }
}
