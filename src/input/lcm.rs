use std::collections::VecDeque;

use bridge_core::{ActuatorCommand, Inbound, InputError, InputSource};
use log::{trace, warn};
use mavlink_proto::MavlinkParser;
use tokio::net::UdpSocket;

use crate::config::ChannelNames;
use crate::error::{Error, Result};
use crate::lcm::{decode_datagram, open_receiver, BusUrl, MAX_DATAGRAM_SIZE};

/// Bus subscriber for the wire-frame and actuator-command channels.
///
/// Datagrams on the wire-frame channel are fed byte by byte through one
/// [`MavlinkParser`], so a datagram may carry any number of frames and a
/// frame may span datagrams. Actuator commands are JSON objects. Datagrams on
/// any other channel are dropped.
pub struct LcmInputSource {
    socket: UdpSocket,
    mavlink_channel: String,
    command_channel: String,
    parser: MavlinkParser,
    /// Decoded deliveries not yet handed out, in arrival order.
    pending: VecDeque<core::result::Result<Inbound, InputError>>,
    buffer: Vec<u8>,
}

impl LcmInputSource {
    /// Wrap an already bound socket.
    pub fn new(socket: UdpSocket, channels: &ChannelNames) -> Self {
        Self {
            socket,
            mavlink_channel: channels.mavlink.clone(),
            command_channel: channels.actuator_command.clone(),
            parser: MavlinkParser::new(),
            pending: VecDeque::new(),
            buffer: vec![0u8; MAX_DATAGRAM_SIZE],
        }
    }

    /// Join the bus group at `url`.
    pub fn open(url: &BusUrl, channels: &ChannelNames) -> Result<Self> {
        let socket = open_receiver(url).map_err(|e| {
            Error::TransportUnavailable(format!("cannot join {url} for receive: {e}"))
        })?;
        Ok(Self::new(socket, channels))
    }

    /// Route one received datagram into the pending queue.
    fn handle_datagram(&mut self, len: usize) {
        let Self {
            buffer,
            parser,
            pending,
            mavlink_channel,
            command_channel,
            ..
        } = self;

        let Some(datagram) = decode_datagram(&buffer[..len]) else {
            trace!("dropping {len}-byte datagram without a short-message header");
            return;
        };

        if datagram.channel == mavlink_channel.as_str() {
            for &byte in datagram.payload {
                match parser.push_byte(byte) {
                    Ok(Some(msg)) => pending.push_back(Ok(Inbound::Wire(msg))),
                    Ok(None) => {}
                    Err(e) => pending.push_back(Err(e.into())),
                }
            }
        } else if datagram.channel == command_channel.as_str() {
            match serde_json::from_slice::<ActuatorCommand>(datagram.payload) {
                Ok(cmd) => pending.push_back(Ok(Inbound::Command(cmd))),
                Err(e) => {
                    warn!("bad actuator command on {}: {e}", datagram.channel);
                    pending.push_back(Err(InputError::Parse));
                }
            }
        } else {
            trace!("ignoring channel {}", datagram.channel);
        }
    }
}

impl InputSource for LcmInputSource {
    async fn receive(&mut self) -> core::result::Result<Inbound, InputError> {
        loop {
            if let Some(next) = self.pending.pop_front() {
                return next;
            }

            let len = self.socket.recv(&mut self.buffer).await.map_err(|e| {
                warn!("bus receive failed: {e}");
                InputError::Io
            })?;
            self.handle_datagram(len);
        }
    }

    fn is_connected(&self) -> bool {
        // Multicast has no peer to lose
        true
    }
}
