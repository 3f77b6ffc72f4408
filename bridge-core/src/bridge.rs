//! TelemetryBridge: connects the bus subscriptions to the publishers.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use log::warn;

use crate::clock::TimestampSource;
use crate::inbound::InboundTranslator;
use crate::input::{Inbound, InputError, InputSource};
use crate::outbound;
use crate::output::{OutputError, OutputSink, Publication};

/// Forwards autopilot telemetry to the local bus and actuator commands to
/// the autopilot.
///
/// Deliveries are handled one at a time, so translator state is never
/// touched concurrently.
///
/// # Error Handling
///
/// Input and output errors are logged and reported from
/// [`TelemetryBridge::process_one`]; [`TelemetryBridge::run`] keeps going
/// until shutdown or until the input disconnects.
pub struct TelemetryBridge<I, O, C> {
    input: I,
    output: O,
    clock: C,
    translator: InboundTranslator,
}

impl<I: InputSource, O: OutputSink, C: TimestampSource> TelemetryBridge<I, O, C> {
    pub fn new(input: I, output: O, clock: C, translator: InboundTranslator) -> Self {
        Self {
            input,
            output,
            clock,
            translator,
        }
    }

    /// Run until `shutdown` is signaled or the input disconnects.
    ///
    /// The shutdown signal is checked between deliveries; a delivery that
    /// has started is always completed.
    pub async fn run<M: RawMutex>(&mut self, shutdown: &Signal<M, ()>) -> Result<(), BridgeError> {
        loop {
            if shutdown.signaled() {
                return Ok(());
            }

            let inbound = match select(self.input.receive(), shutdown.wait()).await {
                Either::First(inbound) => inbound,
                Either::Second(()) => return Ok(()),
            };

            // Other errors are already logged by dispatch
            if let Err(e @ BridgeError::Input(InputError::Disconnected)) =
                self.dispatch(inbound).await
            {
                return Err(e);
            }
        }
    }

    /// Receive and handle a single delivery.
    pub async fn process_one(&mut self) -> Result<(), BridgeError> {
        let inbound = self.input.receive().await;
        self.dispatch(inbound).await
    }

    async fn dispatch(&mut self, inbound: Result<Inbound, InputError>) -> Result<(), BridgeError> {
        match inbound {
            Ok(Inbound::Wire(msg)) => {
                let publications = self.translator.translate(&msg, &mut self.clock);
                let mut result = Ok(());
                // Keep publishing the rest even if one fails
                for publication in publications.iter() {
                    if let Err(e) = self.publish(publication).await {
                        result = Err(e);
                    }
                }
                result
            }
            Ok(Inbound::Command(cmd)) => {
                let frame = outbound::translate(&cmd);
                self.publish(&Publication::RcOverride(frame)).await
            }
            Err(e) => {
                warn!("input error: {:?}", e);
                Err(BridgeError::Input(e))
            }
        }
    }

    async fn publish(&mut self, publication: &Publication) -> Result<(), BridgeError> {
        self.output.send(publication).await.map_err(|e| {
            warn!("publish failed: {:?}", e);
            BridgeError::Output(e)
        })
    }

    /// Get a reference to the translator.
    pub fn translator(&self) -> &InboundTranslator {
        &self.translator
    }

    /// Get a reference to the input source.
    pub fn input(&self) -> &I {
        &self.input
    }
}

/// Error type for bridge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// Error from the input source.
    Input(InputError),
    /// Error from the output sink.
    Output(OutputError),
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::clock::Monotonic;
    use crate::types::{ActuatorCommand, GeodeticOrigin};
    use core::future::Future;
    use core::pin::Pin;
    use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use mavlink_proto::{GpsRawInt, MavMessage, RcChannelsOverride, ServoOutputRaw};
    use std::sync::{Arc, Mutex};
    use std::vec;
    use std::vec::Vec;

    struct MockInput {
        items: Vec<Result<Inbound, InputError>>,
        index: usize,
    }

    impl MockInput {
        fn new(items: Vec<Result<Inbound, InputError>>) -> Self {
            Self { items, index: 0 }
        }
    }

    impl InputSource for MockInput {
        fn receive(&mut self) -> impl Future<Output = Result<Inbound, InputError>> {
            let result = if self.index < self.items.len() {
                let r = self.items[self.index];
                self.index += 1;
                r
            } else {
                Err(InputError::Disconnected)
            };
            core::future::ready(result)
        }

        fn is_connected(&self) -> bool {
            self.index < self.items.len()
        }
    }

    struct MockOutput {
        sent: Arc<Mutex<Vec<Publication>>>,
        fail: bool,
    }

    impl MockOutput {
        fn new() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            }
        }
    }

    impl OutputSink for MockOutput {
        fn send(&mut self, publication: &Publication) -> impl Future<Output = Result<(), OutputError>> {
            self.sent.lock().unwrap().push(*publication);
            core::future::ready(if self.fail { Err(OutputError::Io) } else { Ok(()) })
        }

        fn is_ready(&self) -> bool {
            true
        }
    }

    fn clock() -> Monotonic<fn() -> i64> {
        fn fixed() -> i64 {
            1_000
        }
        Monotonic::new(fixed as fn() -> i64)
    }

    // Helper to run a future to completion (simple blocking executor)
    fn block_on<F: Future>(mut f: F) -> F::Output {
        fn noop_raw_waker() -> RawWaker {
            fn noop(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                noop_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
            RawWaker::new(core::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
        let mut cx = Context::from_waker(&waker);

        // SAFETY: We don't move f after pinning
        let mut f = unsafe { Pin::new_unchecked(&mut f) };

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {
                    panic!("Mock future returned Pending unexpectedly");
                }
            }
        }
    }

    fn servo(ch6: u16) -> Inbound {
        Inbound::Wire(MavMessage::ServoOutputRaw(ServoOutputRaw {
            time_usec: 0,
            port: 0,
            servo_raw: [1000, 1000, 1000, 1000, 1000, ch6, 1000, 1000],
        }))
    }

    #[test]
    fn test_bridge_forwards_command_as_override() {
        let cmd = ActuatorCommand {
            elevon_left: 0,
            elevon_right: 128,
            throttle: 255,
        };
        let input = MockInput::new(vec![Ok(Inbound::Command(cmd))]);
        let output = MockOutput::new();
        let sent_ref = output.sent.clone();

        let mut bridge =
            TelemetryBridge::new(input, output, clock(), InboundTranslator::new(None));
        assert!(block_on(bridge.process_one()).is_ok());

        let sent = sent_ref.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let Publication::RcOverride(RcChannelsOverride {
            target_system,
            target_component,
            channels,
        }) = sent[0]
        else {
            panic!("expected override frame");
        };
        assert_eq!((target_system, target_component), (1, 200));
        assert_eq!(channels[..3], [1000, 1384, 1765]);
    }

    #[test]
    fn test_bridge_publishes_stereo_before_feedback() {
        let input = MockInput::new(vec![Ok(servo(1000)), Ok(servo(1000)), Ok(servo(1900))]);
        let output = MockOutput::new();
        let sent_ref = output.sent.clone();

        let mut bridge =
            TelemetryBridge::new(input, output, clock(), InboundTranslator::new(None));
        for _ in 0..3 {
            assert!(block_on(bridge.process_one()).is_ok());
        }

        let sent = sent_ref.lock().unwrap();
        let kinds: Vec<&str> = sent
            .iter()
            .map(|p| match p {
                Publication::StereoControl(_) => "stereo",
                Publication::ServoFeedback(_) => "servo",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, ["stereo", "servo", "servo", "stereo", "servo"]);
    }

    #[test]
    fn test_bridge_uses_origin() {
        let origin = GeodeticOrigin::new(37.774925, -122.419415, 16.0);
        let gps = GpsRawInt {
            lat: 377_749_250,
            lon: -1_224_194_150,
            alt: 100_000,
            fix_type: 3,
            ..Default::default()
        };
        let input = MockInput::new(vec![Ok(Inbound::Wire(MavMessage::GpsRawInt(gps)))]);
        let output = MockOutput::new();
        let sent_ref = output.sent.clone();

        let mut bridge =
            TelemetryBridge::new(input, output, clock(), InboundTranslator::new(Some(origin)));
        assert!(block_on(bridge.process_one()).is_ok());
        assert!(bridge.translator().linearizer().is_initialized());

        let sent = sent_ref.lock().unwrap();
        let Publication::Gps(fix) = sent[0] else {
            panic!("expected GPS fix");
        };
        assert!((fix.local_xyz[2] - 84.0).abs() < 1e-9);
    }

    #[test]
    fn test_bridge_reports_input_error_without_publishing() {
        let input = MockInput::new(vec![Err(InputError::Checksum)]);
        let output = MockOutput::new();
        let sent_ref = output.sent.clone();

        let mut bridge =
            TelemetryBridge::new(input, output, clock(), InboundTranslator::new(None));
        let result = block_on(bridge.process_one());
        assert_eq!(result, Err(BridgeError::Input(InputError::Checksum)));
        assert!(sent_ref.lock().unwrap().is_empty());
    }

    #[test]
    fn test_bridge_output_error_still_publishes_rest() {
        let input = MockInput::new(vec![Ok(servo(2000))]);
        let mut output = MockOutput::new();
        output.fail = true;
        let sent_ref = output.sent.clone();

        let mut bridge =
            TelemetryBridge::new(input, output, clock(), InboundTranslator::new(None));
        let result = block_on(bridge.process_one());
        assert_eq!(result, Err(BridgeError::Output(OutputError::Io)));
        assert_eq!(sent_ref.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_run_skips_bad_frames_until_disconnect() {
        let input = MockInput::new(vec![
            Err(InputError::Frame),
            Ok(Inbound::Wire(MavMessage::Unknown(12))),
            Ok(servo(1000)),
        ]);
        let output = MockOutput::new();
        let sent_ref = output.sent.clone();
        let shutdown = Signal::<NoopRawMutex, ()>::new();

        let mut bridge =
            TelemetryBridge::new(input, output, clock(), InboundTranslator::new(None));
        let result = block_on(bridge.run(&shutdown));
        assert_eq!(result, Err(BridgeError::Input(InputError::Disconnected)));
        assert_eq!(sent_ref.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_run_stops_on_shutdown() {
        let input = MockInput::new(vec![Ok(servo(1000))]);
        let output = MockOutput::new();
        let sent_ref = output.sent.clone();
        let shutdown = Signal::<NoopRawMutex, ()>::new();
        shutdown.signal(());

        let mut bridge =
            TelemetryBridge::new(input, output, clock(), InboundTranslator::new(None));
        assert_eq!(block_on(bridge.run(&shutdown)), Ok(()));
        assert!(sent_ref.lock().unwrap().is_empty());
        assert!(bridge.input().is_connected());
    }
}
