//! Round timers and clocks.

use std::cell::Cell;

use crate::types::Clock;

/// A time-limited window: `started_at + limit`.
///
/// Expiry uses `elapsed >= limit`, so a tick landing exactly on the
/// boundary is a timeout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTimer {
    started_at: f64,
    limit: f64,
}

impl RoundTimer {
    pub fn start(now: f64, limit: f64) -> Self {
        Self {
            started_at: now,
            limit,
        }
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.started_at).max(0.0)
    }

    pub fn remaining(&self, now: f64) -> f64 {
        (self.limit - self.elapsed(now)).max(0.0)
    }

    pub fn expired(&self, now: f64) -> bool {
        self.elapsed(now) >= self.limit
    }

    /// Fraction of the window still left, 1.0 at start and 0.0 at expiry.
    pub fn fraction_left(&self, now: f64) -> f64 {
        if self.limit <= 0.0 {
            return 0.0;
        }
        (1.0 - self.elapsed(now) / self.limit).clamp(0.0, 1.0)
    }

    /// Restart the window at `now` with the same limit.
    pub fn restart(&mut self, now: f64) {
        self.started_at = now;
    }

    /// Move the window later by `dt` (time spent suspended).
    pub fn shift(&mut self, dt: f64) {
        self.started_at += dt;
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, dt: f64) {
        self.now.set(self.now.get() + dt.max(0.0));
    }

    pub fn set(&self, now: f64) {
        if now >= self.now.get() {
            self.now.set(now);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_counts_as_timeout() {
        let timer = RoundTimer::start(10.0, 2.0);
        assert!(!timer.expired(11.999));
        assert!(timer.expired(12.0));
    }

    #[test]
    fn test_shift_preserves_remaining_time() {
        let mut timer = RoundTimer::start(0.0, 5.0);
        let remaining = timer.remaining(2.0);
        // Suspended from t=2 to t=9.
        timer.shift(7.0);
        assert_eq!(timer.remaining(9.0), remaining);
        assert!(!timer.expired(11.9));
        assert!(timer.expired(12.0));
    }

    #[test]
    fn test_fraction_left() {
        let timer = RoundTimer::start(0.0, 2.0);
        assert_eq!(timer.fraction_left(0.0), 1.0);
        assert_eq!(timer.fraction_left(0.5), 0.75);
        assert_eq!(timer.fraction_left(3.0), 0.0);
    }

    #[test]
    fn test_manual_clock_never_goes_back() {
        let clock = ManualClock::new(1.0);
        clock.advance(0.5);
        clock.set(0.2);
        assert_eq!(clock.now(), 1.5);
    }
}
