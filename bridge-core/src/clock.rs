//! Capture timestamps for locally stamped messages.

/// Source of microsecond capture timestamps.
pub trait TimestampSource {
    /// Current time in microseconds. Never smaller than a previous result.
    fn now_micros(&mut self) -> i64;
}

/// Wraps a raw clock and clamps it so readings never go backwards.
#[derive(Debug, Clone, Copy)]
pub struct Monotonic<F> {
    read: F,
    last: i64,
}

impl<F: FnMut() -> i64> Monotonic<F> {
    pub const fn new(read: F) -> Self {
        Self {
            read,
            last: i64::MIN,
        }
    }
}

impl<F: FnMut() -> i64> TimestampSource for Monotonic<F> {
    fn now_micros(&mut self) -> i64 {
        let now = (self.read)();
        if now > self.last {
            self.last = now;
        }
        self.last
    }
}

/// Wall-clock microseconds since the Unix epoch.
#[cfg(feature = "std")]
pub fn unix_micros() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

/// Monotonic wall clock for host builds.
#[cfg(feature = "std")]
pub type SystemClock = Monotonic<fn() -> i64>;

#[cfg(feature = "std")]
impl SystemClock {
    #[must_use]
    pub fn system() -> Self {
        Monotonic::new(unix_micros as fn() -> i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clamps_backwards_steps() {
        let readings = [100, 200, 150, 300];
        let mut i = 0;
        let mut clock = Monotonic::new(|| {
            let r = readings[i];
            i += 1;
            r
        });

        assert_eq!(clock.now_micros(), 100);
        assert_eq!(clock.now_micros(), 200);
        assert_eq!(clock.now_micros(), 200);
        assert_eq!(clock.now_micros(), 300);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_system_clock_non_decreasing() {
        let mut clock = SystemClock::system();
        let a = clock.now_micros();
        let b = clock.now_micros();
        assert!(a > 0);
        assert!(b >= a);
    }
}
