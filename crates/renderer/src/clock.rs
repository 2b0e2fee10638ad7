use std::time::Instant;

/// Abstraction over where the per-frame timestamp originates from.
///
/// The clock yields raw milliseconds; the uniform path owns the scaling to
/// seconds. Samples are consumed each tick and never stored.
pub trait FrameClock {
    /// Milliseconds elapsed since the clock's origin.
    fn now_millis(&mut self) -> f64;
}

/// Frame clock backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemFrameClock {
    origin: Instant,
}

impl SystemFrameClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemFrameClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl FrameClock for SystemFrameClock {
    fn now_millis(&mut self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Deterministic clock that advances a fixed step per sample.
#[derive(Debug, Clone, Copy)]
pub struct FixedStepClock {
    current: f64,
    step: f64,
}

impl FixedStepClock {
    pub fn new(step_millis: f64) -> Self {
        Self {
            current: 0.0,
            step: step_millis,
        }
    }
}

impl FrameClock for FixedStepClock {
    fn now_millis(&mut self) -> f64 {
        let sample = self.current;
        self.current += self.step;
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn system_clock_is_monotonic() {
        let mut clock = SystemFrameClock::new();
        let first = clock.now_millis();
        std::thread::sleep(Duration::from_millis(2));
        let second = clock.now_millis();
        assert!(first >= 0.0);
        assert!(second >= first);
    }

    #[test]
    fn fixed_step_clock_advances_per_sample() {
        let mut clock = FixedStepClock::new(16.0);
        assert_eq!(clock.now_millis(), 0.0);
        assert_eq!(clock.now_millis(), 16.0);
        assert_eq!(clock.now_millis(), 32.0);
    }
}
