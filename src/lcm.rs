//! LCM-style UDP multicast framing.
//!
//! Every datagram is a single small message:
//!
//! ```text
//! "LC02" | sequence (u32, big-endian) | channel name | 0x00 | payload
//! ```
//!
//! Fragmented messages (`"LC03"`) are not produced and are ignored on
//! receive.

use std::fmt;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

use crate::error::{Error, Result};

/// Short-message magic, `"LC02"`.
pub const MAGIC_SHORT: u32 = 0x4c43_3032;

/// Magic plus sequence number.
pub const HEADER_LEN: usize = 8;

/// Longest channel name accepted.
pub const MAX_CHANNEL_LEN: usize = 63;

/// Largest datagram sent or received.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// `udpm://<group>:<port>?ttl=<n>` bus address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusUrl {
    group: SocketAddrV4,
    ttl: u32,
}

impl BusUrl {
    pub fn new(group: SocketAddrV4, ttl: u32) -> Result<Self> {
        if !group.ip().is_multicast() {
            return Err(Error::InvalidArgument(format!(
                "{} is not a multicast address",
                group.ip()
            )));
        }
        Ok(Self { group, ttl })
    }

    pub fn group(&self) -> SocketAddrV4 {
        self.group
    }

    pub fn port(&self) -> u16 {
        self.group.port()
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }
}

impl Default for BusUrl {
    fn default() -> Self {
        Self {
            group: SocketAddrV4::new(Ipv4Addr::new(239, 255, 76, 67), 7667),
            ttl: 1,
        }
    }
}

impl FromStr for BusUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |why: &str| Error::InvalidArgument(format!("bad bus URL {s:?}: {why}"));

        let rest = s
            .strip_prefix("udpm://")
            .ok_or_else(|| invalid("expected udpm:// scheme"))?;
        let (addr, query) = rest.split_once('?').unwrap_or((rest, ""));
        let group: SocketAddrV4 = addr.parse().map_err(|_| invalid("bad group address"))?;

        let mut ttl = 0;
        for option in query.split('&').filter(|o| !o.is_empty()) {
            match option.split_once('=') {
                Some(("ttl", value)) => {
                    ttl = value.parse().map_err(|_| invalid("bad ttl"))?;
                }
                // recv_buf_size and friends only tune the socket
                Some((_, _)) => {}
                None => return Err(invalid("option without value")),
            }
        }

        Self::new(group, ttl)
    }
}

impl fmt::Display for BusUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "udpm://{}?ttl={}", self.group, self.ttl)
    }
}

/// Append a framed datagram for `channel` to `out`.
pub fn encode_datagram(
    out: &mut Vec<u8>,
    sequence: u32,
    channel: &str,
    payload: &[u8],
) -> Result<()> {
    if channel.is_empty() || channel.len() > MAX_CHANNEL_LEN || channel.contains('\0') {
        return Err(Error::InvalidArgument(format!("bad channel name {channel:?}")));
    }
    let total = HEADER_LEN + channel.len() + 1 + payload.len();
    if total > MAX_DATAGRAM_SIZE {
        return Err(Error::InvalidArgument(format!(
            "message on {channel} too large: {total} bytes"
        )));
    }

    out.reserve(total);
    out.extend_from_slice(&MAGIC_SHORT.to_be_bytes());
    out.extend_from_slice(&sequence.to_be_bytes());
    out.extend_from_slice(channel.as_bytes());
    out.push(0);
    out.extend_from_slice(payload);
    Ok(())
}

/// One received short message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datagram<'a> {
    pub sequence: u32,
    pub channel: &'a str,
    pub payload: &'a [u8],
}

/// Split a datagram into its parts. `None` for fragments and garbage.
pub fn decode_datagram(data: &[u8]) -> Option<Datagram<'_>> {
    let magic = u32::from_be_bytes(data.get(0..4)?.try_into().ok()?);
    if magic != MAGIC_SHORT {
        return None;
    }
    let sequence = u32::from_be_bytes(data.get(4..8)?.try_into().ok()?);
    let body = &data[HEADER_LEN..];
    let nul = body.iter().take(MAX_CHANNEL_LEN + 1).position(|&b| b == 0)?;
    let channel = std::str::from_utf8(&body[..nul]).ok()?;

    Some(Datagram {
        sequence,
        channel,
        payload: &body[nul + 1..],
    })
}

/// Socket joined to the bus group for receiving.
///
/// Address reuse is enabled so other bus clients on the same host can bind
/// the same port.
pub fn open_receiver(url: &BusUrl) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    let bind: SocketAddr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, url.port()).into();
    socket.bind(&bind.into())?;
    socket.join_multicast_v4(url.group().ip(), &Ipv4Addr::UNSPECIFIED)?;
    socket.set_nonblocking(true)?;
    UdpSocket::from_std(socket.into())
}

/// Socket for publishing to the bus group.
pub async fn open_sender(url: &BusUrl) -> io::Result<UdpSocket> {
    let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_multicast_ttl_v4(url.ttl())?;
    socket.set_multicast_loop_v4(true)?;
    Ok(socket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_url() {
        let url: BusUrl = "udpm://239.255.76.67:7667?ttl=1".parse().unwrap();
        assert_eq!(url, BusUrl::default());
        assert_eq!(url.to_string(), "udpm://239.255.76.67:7667?ttl=1");
    }

    #[test]
    fn test_parse_url_options() {
        let url: BusUrl = "udpm://239.1.2.3:9000".parse().unwrap();
        assert_eq!(url.ttl(), 0);
        assert_eq!(url.port(), 9000);

        let url: BusUrl = "udpm://239.1.2.3:9000?recv_buf_size=4096&ttl=3"
            .parse()
            .unwrap();
        assert_eq!(url.ttl(), 3);
    }

    #[test]
    fn test_parse_url_rejects() {
        for bad in [
            "udp://239.1.2.3:9000",
            "udpm://239.1.2.3",
            "udpm://10.0.0.1:9000",
            "udpm://239.1.2.3:9000?ttl=x",
            "udpm://239.1.2.3:9000?ttl",
        ] {
            assert!(bad.parse::<BusUrl>().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_datagram_layout() {
        let mut out = Vec::new();
        encode_datagram(&mut out, 0x0102_0304, "gps", b"{}").unwrap();
        assert_eq!(
            out,
            [b'L', b'C', b'0', b'2', 1, 2, 3, 4, b'g', b'p', b's', 0, b'{', b'}']
        );

        let d = decode_datagram(&out).unwrap();
        assert_eq!(d.sequence, 0x0102_0304);
        assert_eq!(d.channel, "gps");
        assert_eq!(d.payload, b"{}");
    }

    #[test]
    fn test_empty_payload() {
        let mut out = Vec::new();
        encode_datagram(&mut out, 7, "MAVLINK", &[]).unwrap();
        let d = decode_datagram(&out).unwrap();
        assert_eq!(d.channel, "MAVLINK");
        assert!(d.payload.is_empty());
    }

    #[test]
    fn test_bad_channel_names() {
        let mut out = Vec::new();
        assert!(encode_datagram(&mut out, 0, "", b"x").is_err());
        assert!(encode_datagram(&mut out, 0, "a\0b", b"x").is_err());
        assert!(encode_datagram(&mut out, 0, &"c".repeat(64), b"x").is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode_datagram(b""), None);
        assert_eq!(decode_datagram(b"LC02\0\0\0"), None);
        // No channel terminator
        assert_eq!(decode_datagram(b"LC02\0\0\0\x01gps"), None);
        // Fragment
        assert_eq!(decode_datagram(b"LC03\0\0\0\x01gps\0{}"), None);
        assert_eq!(decode_datagram(b"XXXX\0\0\0\x01gps\0{}"), None);
    }
}
