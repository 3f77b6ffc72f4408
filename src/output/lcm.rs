use std::net::{SocketAddr, SocketAddrV4};

use bridge_core::{OutputError, OutputSink, Publication};
use log::{trace, warn};
use mavlink_proto::{FrameWriter, RC_OVERRIDE_FRAME_SIZE};
use serde::Serialize;
use tokio::net::UdpSocket;

use crate::config::ChannelNames;
use crate::error::{Error, Result};
use crate::lcm::{encode_datagram, open_sender, BusUrl};

/// Component ID of override frames sent by the bridge.
pub const SENDER_COMPONENT_ID: u8 = 200;

/// Bus publisher.
///
/// Typed messages go out as JSON on their own channel; override frames go
/// out as raw wire bytes on the transmit channel.
pub struct LcmOutputSink {
    socket: UdpSocket,
    destination: SocketAddr,
    channels: ChannelNames,
    sequence: u32,
    writer: FrameWriter,
    datagram: Vec<u8>,
}

impl LcmOutputSink {
    /// Wrap an already bound socket sending to `destination`.
    pub fn new(
        socket: UdpSocket,
        destination: SocketAddr,
        channels: ChannelNames,
        system_id: u8,
    ) -> Self {
        Self {
            socket,
            destination,
            channels,
            sequence: 0,
            writer: FrameWriter::new(system_id, SENDER_COMPONENT_ID),
            datagram: Vec::new(),
        }
    }

    /// Open a socket publishing to the bus group at `url`.
    pub async fn open(url: &BusUrl, channels: ChannelNames, system_id: u8) -> Result<Self> {
        let socket = open_sender(url).await.map_err(|e| {
            Error::TransportUnavailable(format!("cannot open {url} for publish: {e}"))
        })?;
        let destination = SocketAddr::V4(SocketAddrV4::new(*url.group().ip(), url.port()));
        Ok(Self::new(socket, destination, channels, system_id))
    }

    /// Channel and encoded payload for `publication`.
    fn encode(
        &mut self,
        publication: &Publication,
    ) -> core::result::Result<(&str, Vec<u8>), OutputError> {
        let c = &self.channels;
        Ok(match publication {
            Publication::Inertial(m) => (c.attitude.as_str(), json(m)?),
            Publication::Gps(m) => (c.gps.as_str(), json(m)?),
            Publication::BaroAirspeed(m) => (c.baro_airspeed.as_str(), json(m)?),
            Publication::Battery(m) => (c.battery_status.as_str(), json(m)?),
            Publication::ServoFeedback(m) => (c.servo_output.as_str(), json(m)?),
            Publication::StereoControl(m) => (c.stereo_control.as_str(), json(m)?),
            Publication::RcOverride(m) => {
                let mut frame = [0u8; RC_OVERRIDE_FRAME_SIZE];
                let len = self
                    .writer
                    .rc_override(&mut frame, m)
                    .map_err(|_| OutputError::Encode)?;
                (c.mavlink_tx.as_str(), frame[..len].to_vec())
            }
        })
    }
}

fn json<T: Serialize>(msg: &T) -> core::result::Result<Vec<u8>, OutputError> {
    serde_json::to_vec(msg).map_err(|e| {
        warn!("cannot encode message: {e}");
        OutputError::Encode
    })
}

impl OutputSink for LcmOutputSink {
    async fn send(&mut self, publication: &Publication) -> core::result::Result<(), OutputError> {
        let sequence = self.sequence;
        let (channel, payload) = self.encode(publication)?;
        let channel = channel.to_owned();

        self.datagram.clear();
        encode_datagram(&mut self.datagram, sequence, &channel, &payload).map_err(|e| {
            warn!("{e}");
            OutputError::Encode
        })?;
        self.sequence = self.sequence.wrapping_add(1);

        trace!("publishing {} bytes on {channel}", payload.len());
        self.socket
            .send_to(&self.datagram, self.destination)
            .await
            .map_err(|e| {
                warn!("bus send on {channel} failed: {e}");
                OutputError::Io
            })?;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcm::decode_datagram;
    use bridge_core::{BatteryStatus, StereoControlEvent};
    use mavlink_proto::{MavMessage, MavlinkParser, RcChannelsOverride};

    async fn pair() -> (LcmOutputSink, UdpSocket) {
        let rx = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let tx = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sink = LcmOutputSink::new(tx, rx.local_addr().unwrap(), ChannelNames::default(), 42);
        (sink, rx)
    }

    async fn next(rx: &UdpSocket) -> (u32, String, Vec<u8>) {
        let mut buf = vec![0u8; 4096];
        let len = rx.recv(&mut buf).await.unwrap();
        let d = decode_datagram(&buf[..len]).unwrap();
        (d.sequence, d.channel.to_owned(), d.payload.to_vec())
    }

    #[tokio::test]
    async fn test_typed_messages_as_json() {
        let (mut sink, rx) = pair().await;
        let battery = BatteryStatus {
            timestamp: 5,
            voltage: 12.0,
            amps_now: 2.5,
            milliamp_hours_total: 450.0,
            percent_remaining: 64,
        };
        let stereo = StereoControlEvent {
            timestamp: 6,
            stereo_on: true,
            rec_on: true,
        };

        sink.send(&Publication::Battery(battery)).await.unwrap();
        sink.send(&Publication::StereoControl(stereo)).await.unwrap();

        let (seq, channel, payload) = next(&rx).await;
        assert_eq!((seq, channel.as_str()), (0, "battery-status"));
        assert_eq!(serde_json::from_slice::<BatteryStatus>(&payload).unwrap(), battery);

        let (seq, channel, payload) = next(&rx).await;
        assert_eq!((seq, channel.as_str()), (1, "stereo-control"));
        assert_eq!(
            serde_json::from_slice::<StereoControlEvent>(&payload).unwrap(),
            stereo
        );
    }

    #[tokio::test]
    async fn test_override_as_wire_frame() {
        let (mut sink, rx) = pair().await;
        let msg = RcChannelsOverride {
            target_system: 1,
            target_component: 200,
            channels: [1000, 1384, 1765, 1000, 1000, 1000, 1000, 1000],
        };
        sink.send(&Publication::RcOverride(msg)).await.unwrap();
        sink.send(&Publication::RcOverride(msg)).await.unwrap();

        let mut parser = MavlinkParser::new();
        for expected_seq in [0, 1] {
            let (_, channel, payload) = next(&rx).await;
            assert_eq!(channel, "MAVLINK_TX");

            let decoded: Vec<_> = payload
                .iter()
                .filter_map(|&b| parser.push_byte(b).unwrap())
                .collect();
            assert_eq!(decoded, [MavMessage::RcChannelsOverride(msg)]);

            let header = parser.last_header();
            assert_eq!(header.sequence, expected_seq);
            assert_eq!(header.system_id, 42);
            assert_eq!(header.component_id, SENDER_COMPONENT_ID);
        }
    }
}
