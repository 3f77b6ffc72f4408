//! ArduPilot wire-protocol to local-bus bridge.
//!
//! Usage:
//!   ardupilot-bridge [OPTIONS] [mavlink attitude baro-airspeed gps
//!                    battery-status input-servo output-servo stereo-control]
//!
//! Log level comes from `RUST_LOG` (default `info`).

use std::env;
use std::process;

use ardupilot_bridge::config::usage;
use ardupilot_bridge::{
    load_origin, parse_args, BridgeConfig, Command, JsonParamFile, LcmInputSource, LcmOutputSink,
    Result,
};
use bridge_core::{BridgeError, InboundTranslator, InputError, SystemClock, TelemetryBridge};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{error, info, warn};

/// Signal the bridge to stop on Ctrl-C, then idle.
async fn watch_ctrl_c(shutdown: &Signal<CriticalSectionRawMutex, ()>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for Ctrl-C: {e}");
    } else {
        info!("Closing...");
        shutdown.signal(());
    }
    core::future::pending::<()>().await;
}

async fn run(config: BridgeConfig) -> Result<()> {
    let params = config
        .params
        .as_deref()
        .map(JsonParamFile::open)
        .transpose()?;
    let origin = load_origin(params.as_ref())?;

    let input = LcmInputSource::open(&config.url, &config.channels)?;
    let output = LcmOutputSink::open(&config.url, config.channels.clone(), config.system_id).await?;
    config.log_summary();

    let mut bridge = TelemetryBridge::new(
        input,
        output,
        SystemClock::system(),
        InboundTranslator::new(origin),
    );

    let shutdown = Signal::<CriticalSectionRawMutex, ()>::new();
    match select(bridge.run(&shutdown), watch_ctrl_c(&shutdown)).await {
        Either::First(Ok(())) => info!("done."),
        Either::First(Err(BridgeError::Input(InputError::Disconnected))) => {
            warn!("bus closed, exiting");
        }
        Either::First(Err(e)) => warn!("bridge stopped: {e:?}"),
        Either::Second(()) => {}
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match parse_args(env::args().skip(1)) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            eprintln!("{}", usage());
            return;
        }
        Err(e) => {
            eprintln!("Error: {e}\n\n{}", usage());
            process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        error!("{e}");
        process::exit(1);
    }
}
