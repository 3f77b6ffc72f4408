//! Output sink trait and error types.

use core::future::Future;
use mavlink_proto::RcChannelsOverride;

use crate::types::{
    BaroAirspeed, BatteryStatus, GpsFix, InertialSample, ServoFeedback, StereoControlEvent,
};

/// One message leaving the bridge.
///
/// Every variant except [`Publication::RcOverride`] goes to its own local-bus
/// channel; `RcOverride` is a wire frame for the autopilot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Publication {
    Inertial(InertialSample),
    Gps(GpsFix),
    BaroAirspeed(BaroAirspeed),
    Battery(BatteryStatus),
    ServoFeedback(ServoFeedback),
    StereoControl(StereoControlEvent),
    RcOverride(RcChannelsOverride),
}

/// Error type for output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// Socket / bus I/O error.
    Io,
    /// Message could not be encoded.
    Encode,
    /// Transport not ready (e.g. not yet joined).
    NotReady,
}

/// Async trait for publication sinks.
///
/// Implementations route each [`Publication`] to its channel. Publishing is
/// expected to be non-blocking or bounded-latency.
pub trait OutputSink {
    /// Publish one message.
    fn send(&mut self, publication: &Publication) -> impl Future<Output = Result<(), OutputError>>;

    /// Check if the sink is ready to accept data.
    fn is_ready(&self) -> bool;
}
