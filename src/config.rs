//! Runtime configuration: channel names, bus URL, GPS origin source.

use std::fs;
use std::path::{Path, PathBuf};

use bridge_core::GeodeticOrigin;
use log::{info, warn};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::lcm::BusUrl;

/// Default local-bus URL.
pub const DEFAULT_URL: &str = "udpm://239.255.76.67:7667?ttl=1";

/// System ID the bridge sends override frames as.
pub const DEFAULT_SYSTEM_ID: u8 = 255;

/// Parameter key holding `[latitude, longitude]` of the GPS origin.
pub const ORIGIN_LATLON_KEY: &str = "gps_origin.latlon";

/// Parameter key holding the GPS origin elevation in meters.
pub const ORIGIN_ELEVATION_KEY: &str = "gps_origin.elevation";

/// Local-bus channel names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelNames {
    /// Wire frames from the autopilot.
    pub mavlink: String,
    /// Inertial samples.
    pub attitude: String,
    pub baro_airspeed: String,
    pub gps: String,
    pub battery_status: String,
    /// Actuator commands from local software.
    pub actuator_command: String,
    /// Servo feedback.
    pub servo_output: String,
    pub stereo_control: String,
    /// Wire frames to the autopilot.
    pub mavlink_tx: String,
}

impl Default for ChannelNames {
    fn default() -> Self {
        Self {
            mavlink: "MAVLINK".into(),
            attitude: "attitude".into(),
            baro_airspeed: "baro-airspeed".into(),
            gps: "gps".into(),
            battery_status: "battery-status".into(),
            actuator_command: "deltawing_u".into(),
            servo_output: "servo_out".into(),
            stereo_control: "stereo-control".into(),
            mavlink_tx: "MAVLINK_TX".into(),
        }
    }
}

impl ChannelNames {
    /// Build from the eight positional arguments, in usage order.
    fn from_positional(names: &[String]) -> Self {
        Self {
            mavlink: names[0].clone(),
            attitude: names[1].clone(),
            baro_airspeed: names[2].clone(),
            gps: names[3].clone(),
            battery_status: names[4].clone(),
            actuator_command: names[5].clone(),
            servo_output: names[6].clone(),
            stereo_control: names[7].clone(),
            ..Self::default()
        }
    }
}

/// Number of positional channel arguments.
pub const POSITIONAL_CHANNELS: usize = 8;

/// Complete bridge configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    pub channels: ChannelNames,
    pub url: BusUrl,
    pub system_id: u8,
    /// Parameter file with the GPS origin, if any.
    pub params: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            channels: ChannelNames::default(),
            url: BusUrl::default(),
            system_id: DEFAULT_SYSTEM_ID,
            params: None,
        }
    }
}

impl BridgeConfig {
    /// Log every subscribed and published channel.
    pub fn log_summary(&self) {
        let c = &self.channels;
        info!("Bus: {}", self.url);
        info!("Receiving:");
        info!("    Mavlink: {}", c.mavlink);
        info!("    Actuator commands: {}", c.actuator_command);
        info!("Publishing:");
        info!("    Attitude: {}", c.attitude);
        info!("    Barometric altitude and airspeed: {}", c.baro_airspeed);
        info!("    GPS: {}", c.gps);
        info!("    Battery status: {}", c.battery_status);
        info!("    Servo outputs: {}", c.servo_output);
        info!("    Stereo control: {}", c.stereo_control);
        info!("    Mavlink TX: {}", c.mavlink_tx);
    }
}

/// Result of command-line parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(BridgeConfig),
    Help,
}

/// Parse command-line arguments (without the program name).
///
/// Either no positional channel names (all defaults) or exactly eight.
pub fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut config = BridgeConfig::default();
    let mut positional = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--params" => {
                config.params = Some(PathBuf::from(require_value(&mut args, "params")?));
            }
            "--url" => {
                config.url = require_value(&mut args, "url")?.parse()?;
            }
            "--system-id" => {
                let value = require_value(&mut args, "system-id")?;
                config.system_id = value.parse().map_err(|_| {
                    Error::InvalidArgument(format!("invalid value for --system-id: {value}"))
                })?;
            }
            "--tx-channel" => {
                config.channels.mavlink_tx = require_value(&mut args, "tx-channel")?;
            }
            other if other.starts_with('-') => {
                return Err(Error::InvalidArgument(format!("unknown option: {other}")));
            }
            _ => positional.push(arg),
        }
    }

    match positional.len() {
        0 => {}
        POSITIONAL_CHANNELS => config.channels = ChannelNames::from_positional(&positional),
        n => {
            return Err(Error::InvalidArgument(format!(
                "expected {POSITIONAL_CHANNELS} channel names, got {n}"
            )));
        }
    }

    Ok(Command::Run(config))
}

fn require_value<I: Iterator<Item = String>>(args: &mut I, name: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| Error::InvalidArgument(format!("--{name} requires a value")))
}

/// Usage text.
pub fn usage() -> &'static str {
    "Usage: ardupilot-bridge [OPTIONS] [mavlink attitude baro-airspeed gps \
     battery-status input-servo output-servo stereo-control]\n\
     \n\
     Channels:\n\
     \x20 mavlink         channel with wire frames from the autopilot\n\
     \x20 attitude        channel to publish inertial samples on\n\
     \x20 baro-airspeed   channel to publish barometric altitude and airspeed on\n\
     \x20 gps             channel to publish GPS fixes on\n\
     \x20 battery-status  channel to publish battery status on\n\
     \x20 input-servo     channel to listen for actuator commands on\n\
     \x20 output-servo    channel to publish executed servo outputs on\n\
     \x20 stereo-control  channel to publish stereo control events on\n\
     \n\
     Options:\n\
     \x20 --params <FILE>      JSON parameter file with gps_origin\n\
     \x20 --url <URL>          bus URL (default: udpm://239.255.76.67:7667?ttl=1)\n\
     \x20 --system-id <N>      system ID for outgoing frames (default: 255)\n\
     \x20 --tx-channel <NAME>  channel for outgoing frames (default: MAVLINK_TX)\n\
     \x20 -h, --help           show this help\n\
     \n\
     Example:\n\
     \x20 ardupilot-bridge MAVLINK attitude baro-airspeed gps battery-status \
     deltawing_u servo_out stereo-control"
}

/// Read-only key/value parameter store.
pub trait ParameterSource {
    /// Array of exactly `len` numbers stored at `key`.
    fn get_double_array(&self, key: &str, len: usize) -> Option<Vec<f64>>;

    /// Number stored at `key`.
    fn get_double(&self, key: &str) -> Option<f64>;
}

/// Parameters loaded from a JSON document. Dotted keys address nested
/// objects, so `gps_origin.latlon` is `{"gps_origin": {"latlon": ...}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonParamFile {
    root: Value,
}

impl JsonParamFile {
    pub fn open(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::ConfigurationMissing(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(Self {
            root: serde_json::from_str(text)?,
        })
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        let pointer: String = key.split('.').flat_map(|part| ["/", part]).collect();
        self.root.pointer(&pointer)
    }
}

impl ParameterSource for JsonParamFile {
    fn get_double_array(&self, key: &str, len: usize) -> Option<Vec<f64>> {
        let values = self.lookup(key)?.as_array()?;
        if values.len() != len {
            return None;
        }
        values.iter().map(Value::as_f64).collect()
    }

    fn get_double(&self, key: &str) -> Option<f64> {
        self.lookup(key)?.as_f64()
    }
}

/// Fetch the GPS origin.
///
/// - no source: warn, run without an origin
/// - source without `gps_origin.latlon`: [`Error::ConfigurationMissing`]
/// - source without `gps_origin.elevation`: warn, elevation 0
pub fn load_origin<P: ParameterSource>(source: Option<&P>) -> Result<Option<GeodeticOrigin>> {
    let Some(source) = source else {
        warn!("no parameter source, no {ORIGIN_LATLON_KEY}; GPS linearization disabled");
        return Ok(None);
    };

    let latlon = source.get_double_array(ORIGIN_LATLON_KEY, 2).ok_or_else(|| {
        Error::ConfigurationMissing(format!("unable to get {ORIGIN_LATLON_KEY}"))
    })?;
    info!("Initializing gps origin at {},{}", latlon[0], latlon[1]);

    let elevation = source.get_double(ORIGIN_ELEVATION_KEY).unwrap_or_else(|| {
        let degraded = Error::ConfigurationDegraded(format!(
            "unable to get {ORIGIN_ELEVATION_KEY}, using 0"
        ));
        warn!("{degraded}");
        0.0
    });

    Ok(Some(GeodeticOrigin::new(latlon[0], latlon[1], elevation)))
}
