//! Autopilot telemetry to local-bus translation.
//!
//! [`InboundTranslator`] owns the only per-process state of the telemetry
//! path: the GPS linearizer, the origin elevation and the stereo edge
//! detector. Each call to [`InboundTranslator::translate`] handles exactly one
//! wire message and returns the publications it produced, in publish order.

use heapless::Vec;
use log::{debug, error, info, trace, warn};
use mavlink_proto::{
    Attitude, BatteryStatus as MavBattery, GpsRawInt, MavMessage, RawImu, ScaledPressure,
    ServoOutputRaw, StatusText,
};

use crate::clock::TimestampSource;
use crate::edge::{EdgeState, StereoEdgeDetector};
use crate::geo::{GeodeticLinearizer, LinearizerError};
use crate::output::Publication;
use crate::types::{
    AttitudeSample, BaroAirspeed, BatteryStatus, GeodeticOrigin, GpsFix, GpsLock, InertialSample,
    ServoFeedback, StereoControlEvent,
};
use crate::units::{
    accel_from_milli_g, amps_from_centi, degrees_from_centi, degrees_from_e7, gyro_from_milli,
    meters_from_mm, speed_from_cm_s, switch_on, volts_from_mv,
};

/// Most publications a single wire message can produce.
pub const MAX_PUBLICATIONS: usize = 2;

/// Publications produced by one wire message.
pub type Publications = Vec<Publication, MAX_PUBLICATIONS>;

/// Stateful translator for inbound wire messages.
#[derive(Debug, Clone, Default)]
pub struct InboundTranslator {
    linearizer: GeodeticLinearizer,
    origin_elevation: f64,
    stereo: StereoEdgeDetector,
}

impl InboundTranslator {
    /// Create a translator. With no origin, planar positions stay at zero
    /// and elevations are relative to 0 m.
    #[must_use]
    pub fn new(origin: Option<GeodeticOrigin>) -> Self {
        match origin {
            Some(origin) => Self {
                linearizer: GeodeticLinearizer::with_origin(&origin),
                origin_elevation: origin.elevation,
                stereo: StereoEdgeDetector::new(),
            },
            None => Self::default(),
        }
    }

    #[must_use]
    pub fn linearizer(&self) -> &GeodeticLinearizer {
        &self.linearizer
    }

    #[must_use]
    pub fn origin_elevation(&self) -> f64 {
        self.origin_elevation
    }

    /// Last observed video-record switch state.
    #[must_use]
    pub fn stereo_state(&self) -> EdgeState {
        self.stereo.state()
    }

    /// Translate one wire message.
    pub fn translate<C: TimestampSource>(
        &mut self,
        msg: &MavMessage,
        clock: &mut C,
    ) -> Publications {
        let mut out = Publications::new();

        match msg {
            MavMessage::Heartbeat(hb) => {
                info!(
                    "got a heartbeat (type {}, status {})",
                    hb.mav_type, hb.system_status
                );
            }
            MavMessage::RawImu(imu) => {
                push(&mut out, Publication::Inertial(inertial_sample(imu, clock.now_micros())));
            }
            MavMessage::Attitude(att) => {
                // Attitude comes from the onboard estimator fed by RAW_IMU instead
                let sample = attitude_sample(att, clock.now_micros());
                trace!("attitude not published: {:?}", sample);
            }
            MavMessage::GlobalPositionInt(_) => {
                trace!("ignoring GLOBAL_POSITION_INT");
            }
            MavMessage::GpsRawInt(gps) => {
                push(&mut out, Publication::Gps(self.gps_fix(gps)));
            }
            MavMessage::ScaledPressure(pressure) => {
                let sample = self.baro_airspeed(pressure, clock.now_micros());
                push(&mut out, Publication::BaroAirspeed(sample));
            }
            MavMessage::RcChannelsOverride(_) => {
                // Our own override frame echoed back by the link
            }
            MavMessage::BatteryStatus(bat) => {
                push(&mut out, Publication::Battery(battery_status(bat, clock.now_micros())));
            }
            MavMessage::ServoOutputRaw(servo) => {
                let feedback = servo_feedback(servo, clock.now_micros());
                if self.stereo.observe(feedback.video_record) {
                    push(
                        &mut out,
                        Publication::StereoControl(StereoControlEvent {
                            timestamp: feedback.timestamp,
                            stereo_on: feedback.video_record,
                            rec_on: feedback.video_record,
                        }),
                    );
                }
                push(&mut out, Publication::ServoFeedback(feedback));
            }
            MavMessage::StatusText(text) => log_status_text(text),
            MavMessage::Unknown(id) => {
                debug!("unknown message id = {}", id);
            }
        }

        out
    }

    /// GPS fix with planar position relative to the origin.
    ///
    /// Planar (x, y) is only filled with a plain 3D lock (`fix_type == 3`)
    /// and an initialized origin. 2D and augmented fixes stay at (0, 0).
    #[must_use]
    pub fn gps_fix(&self, gps: &GpsRawInt) -> GpsFix {
        let latitude = degrees_from_e7(gps.lat);
        let longitude = degrees_from_e7(gps.lon);
        let elevation_msl = meters_from_mm(gps.alt);
        let lock_quality = GpsLock::from_fix_type(gps.fix_type);

        let (x, y) = match lock_quality {
            GpsLock::Fix3d => match self.linearizer.project(latitude, longitude) {
                Ok(xy) => xy,
                // No origin configured
                Err(LinearizerError::NotInitialized) => (0.0, 0.0),
                Err(e) => {
                    debug_assert!(false, "projection failed: {e:?}");
                    error!("GPS projection failed: {e:?}");
                    (0.0, 0.0)
                }
            },
            _ => (0.0, 0.0),
        };

        GpsFix {
            utime: gps.time_usec as i64,
            lock_quality,
            latitude,
            longitude,
            elevation_msl,
            horizontal_accuracy: gps.eph as f64,
            vertical_accuracy: gps.epv as f64,
            ground_speed: speed_from_cm_s(gps.vel),
            course_over_ground: degrees_from_centi(gps.cog),
            satellites_visible: gps.satellites_visible,
            local_xyz: [x, y, elevation_msl - self.origin_elevation],
        }
    }

    /// Airspeed and barometric altitude.
    ///
    /// The firmware sends airspeed in `press_abs` and altitude above the
    /// launch point in `press_diff`. Readings under ~1.5 m/s are unreliable
    /// but are passed through unmodified.
    #[must_use]
    pub fn baro_airspeed(&self, pressure: &ScaledPressure, utime: i64) -> BaroAirspeed {
        BaroAirspeed {
            utime,
            airspeed: pressure.press_abs as f64,
            baro_altitude: pressure.press_diff as f64 + self.origin_elevation,
            temperature: pressure.temperature as f64,
        }
    }
}

/// Inertial sample from RAW_IMU.
#[must_use]
pub fn inertial_sample(imu: &RawImu, utime: i64) -> InertialSample {
    InertialSample {
        utime,
        device_time: imu.time_usec as i64,
        gyro: [
            gyro_from_milli(imu.xgyro),
            gyro_from_milli(imu.ygyro),
            gyro_from_milli(imu.zgyro),
        ],
        accel: [
            accel_from_milli_g(imu.xacc),
            accel_from_milli_g(imu.yacc),
            accel_from_milli_g(imu.zacc),
        ],
        mag: [imu.xmag as f64, imu.ymag as f64, imu.zmag as f64],
        quat: [0.0; 4],
        pressure: 0.0,
        rel_alt: 0.0,
    }
}

/// Attitude sample from ATTITUDE. Computed but not published.
#[must_use]
pub fn attitude_sample(att: &Attitude, timestamp: i64) -> AttitudeSample {
    AttitudeSample {
        timestamp,
        roll: att.roll as f64,
        pitch: att.pitch as f64,
        yaw: att.yaw as f64,
        rollspeed: att.rollspeed as f64,
        pitchspeed: att.pitchspeed as f64,
        yawspeed: att.yawspeed as f64,
    }
}

/// Battery status from BATTERY_STATUS.
///
/// The firmware reports consumed mAh * 100 in the cell 6 voltage slot.
#[must_use]
pub fn battery_status(bat: &MavBattery, timestamp: i64) -> BatteryStatus {
    BatteryStatus {
        timestamp,
        voltage: volts_from_mv(bat.voltage_cells[0]),
        amps_now: amps_from_centi(bat.current_battery),
        milliamp_hours_total: bat.voltage_cells[5] as f64 / 100.0,
        percent_remaining: bat.battery_remaining,
    }
}

/// Servo feedback from SERVO_OUTPUT_RAW.
///
/// Output channels: 1 elevon L, 2 elevon R, 3 throttle, 5 autonomous switch,
/// 6 video record switch.
#[must_use]
pub fn servo_feedback(servo: &ServoOutputRaw, timestamp: i64) -> ServoFeedback {
    ServoFeedback {
        timestamp,
        elevon_left: servo.channel(1),
        elevon_right: servo.channel(2),
        throttle: servo.channel(3),
        is_autonomous: switch_on(servo.channel(5)),
        video_record: switch_on(servo.channel(6)),
    }
}

/// Log STATUSTEXT at a level matching its MAV_SEVERITY.
fn log_status_text(text: &StatusText) {
    match text.severity {
        0..=3 => error!("status text: {}", text.as_str()),
        4 => warn!("status text: {}", text.as_str()),
        5 | 6 => info!("status text: {}", text.as_str()),
        _ => debug!("status text: {}", text.as_str()),
    }
}

fn push(out: &mut Publications, publication: Publication) {
    let pushed = out.push(publication).is_ok();
    debug_assert!(pushed, "more than {} publications", MAX_PUBLICATIONS);
}
