//! Host side of the ArduPilot bridge: configuration, GPS origin loading and
//! the UDP multicast bus transport.
//!
//! The translation itself lives in [`bridge_core`]; this crate only supplies
//! the [`InputSource`](bridge_core::InputSource) and
//! [`OutputSink`](bridge_core::OutputSink) implementations that connect it
//! to a real bus.

pub mod config;
pub mod error;
pub mod input;
pub mod lcm;
pub mod output;

pub use config::{load_origin, parse_args, BridgeConfig, ChannelNames, Command, JsonParamFile};
pub use error::{Error, Result};
pub use input::LcmInputSource;
pub use output::LcmOutputSink;
