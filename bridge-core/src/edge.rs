//! Edge detector for the stereo camera record switch.

/// Last observed switch position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeState {
    /// Nothing observed yet; the next observation always fires.
    #[default]
    Uninitialized,
    Off,
    On,
}

impl EdgeState {
    const fn from_bool(on: bool) -> Self {
        if on {
            EdgeState::On
        } else {
            EdgeState::Off
        }
    }
}

/// Fires once per change of the video-record switch.
///
/// The first observation after startup always fires, so consumers learn the
/// initial switch position without waiting for the pilot to flip it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StereoEdgeDetector {
    state: EdgeState,
}

impl StereoEdgeDetector {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: EdgeState::Uninitialized,
        }
    }

    /// Record `on` and return `true` if it differs from the previous value.
    #[must_use]
    pub fn observe(&mut self, on: bool) -> bool {
        let next = EdgeState::from_bool(on);
        let changed = self.state != next;
        self.state = next;
        changed
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> EdgeState {
        self.state
    }
}
