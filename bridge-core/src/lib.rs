//! Platform-agnostic telemetry translation for an ArduPilot autopilot link.
//!
//! This crate holds everything between the wire codec and the transport:
//! unit conversions, the GPS tangent-plane projection, the stereo switch
//! edge detector and the bridge loop. It has no platform-specific
//! dependencies and can be used both in embedded `no_std` environments and
//! on host.
//!
//! # Overview
//!
//! - [`types`]: Local-bus message types ([`GpsFix`], [`InertialSample`], ...)
//! - [`units`]: Wire encoding to SI conversions
//! - [`geo`]: Geodetic to local planar projection ([`GeodeticLinearizer`])
//! - [`edge`]: Video-record switch change detection ([`StereoEdgeDetector`])
//! - [`clock`]: Capture timestamps ([`TimestampSource`])
//! - [`inbound`]: Telemetry translation ([`InboundTranslator`])
//! - [`outbound`]: Actuator command to RC override translation
//! - [`input`] / [`output`]: Transport traits ([`InputSource`], [`OutputSink`])
//! - [`bridge`]: Orchestrates the two directions ([`TelemetryBridge`])
//!
//! # Example
//!
//! ```rust
//! use bridge_core::{outbound, ActuatorCommand};
//!
//! let frame = outbound::translate(&ActuatorCommand {
//!     elevon_left: 0,
//!     elevon_right: 128,
//!     throttle: 255,
//! });
//! assert_eq!(frame.channels[..3], [1000, 1384, 1765]);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (system clock, host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//! - **`serde`**: Derive `Serialize`/`Deserialize` for bus message types

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod bridge;
pub mod clock;
pub mod edge;
pub mod geo;
pub mod inbound;
pub mod input;
pub mod outbound;
pub mod output;
pub mod types;
pub mod units;

// Re-export main types at crate root
pub use bridge::{BridgeError, TelemetryBridge};
pub use clock::{Monotonic, TimestampSource};
#[cfg(feature = "std")]
pub use clock::{unix_micros, SystemClock};
pub use edge::{EdgeState, StereoEdgeDetector};
pub use geo::{GeodeticLinearizer, LinearizerError};
pub use inbound::{InboundTranslator, Publications, MAX_PUBLICATIONS};
pub use input::{Inbound, InputError, InputSource};
pub use output::{OutputError, OutputSink, Publication};
pub use types::{
    ActuatorCommand, AttitudeSample, BaroAirspeed, BatteryStatus, GeodeticOrigin, GpsFix,
    GpsLock, InertialSample, ServoFeedback, StereoControlEvent,
};
