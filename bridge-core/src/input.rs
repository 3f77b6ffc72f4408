//! Input source trait and error types.

use core::future::Future;
use mavlink_proto::{MavMessage, ParseError};

use crate::types::ActuatorCommand;

/// One delivery from either subscription.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Inbound {
    /// Decoded frame from the autopilot link.
    Wire(MavMessage),
    /// Actuator command from local software.
    Command(ActuatorCommand),
}

/// Error type for input operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// Socket / bus I/O error.
    Io,
    /// Malformed local-bus message.
    Parse,
    /// Wire frame checksum mismatch.
    Checksum,
    /// Wire frame could not be decoded.
    Frame,
    /// Transport closed.
    Disconnected,
}

impl From<ParseError> for InputError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::CrcError => InputError::Checksum,
            ParseError::Incomplete | ParseError::InvalidStart | ParseError::Unsupported => {
                InputError::Frame
            }
        }
    }
}

/// Async trait for inbound message sources.
///
/// Delivers wire frames and actuator commands one at a time, in arrival
/// order, as a single stream.
pub trait InputSource {
    /// Wait for and receive the next message.
    fn receive(&mut self) -> impl Future<Output = Result<Inbound, InputError>>;

    /// Check if the input source is connected/ready.
    fn is_connected(&self) -> bool;
}
