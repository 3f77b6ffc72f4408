mod lcm;

pub use bridge_core::{OutputError, OutputSink, Publication};
pub use lcm::{LcmOutputSink, SENDER_COMPONENT_ID};
