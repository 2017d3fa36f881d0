use std::time::Instant;

/// Monotonic source of elapsed seconds since the clock started.
pub trait Clock {
    /// Seconds since start. Never decreases between calls.
    fn elapsed_seconds(&self) -> f64;
}

/// Wall clock backed by [`Instant`], started on construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn elapsed_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for tests, headless simulation and replay.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    elapsed: f64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward. Negative or non-finite steps are ignored.
    pub fn advance(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.elapsed += seconds;
        }
    }

    /// Jump to an absolute time. Never moves backwards.
    pub fn set(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds > self.elapsed {
            self.elapsed = seconds;
        }
    }
}

impl Clock for ManualClock {
    fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_starts_at_zero() {
        assert_eq!(ManualClock::new().elapsed_seconds(), 0.0);
    }

    #[test]
    fn manual_clock_is_monotonic() {
        let mut clock = ManualClock::new();
        clock.advance(1.5);
        clock.advance(-1.0);
        clock.advance(f64::NAN);
        assert_eq!(clock.elapsed_seconds(), 1.5);
        clock.set(1.0);
        assert_eq!(clock.elapsed_seconds(), 1.5);
        clock.set(10.0);
        assert_eq!(clock.elapsed_seconds(), 10.0);
    }

    #[test]
    fn system_clock_does_not_go_backwards() {
        let clock = SystemClock::start();
        let a = clock.elapsed_seconds();
        let b = clock.elapsed_seconds();
        assert!(b >= a);
        assert!(a >= 0.0);
    }
}
