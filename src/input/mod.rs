mod lcm;

pub use bridge_core::{Inbound, InputError, InputSource};
pub use lcm::LcmInputSource;
