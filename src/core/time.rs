//! Match Time
//!
//! Monotonic millisecond instants and the clock capability that feeds them.
//! Everything in the simulation reads time through [`Clock`] so tests and
//! replays can drive it by hand.

use std::fmt;
use std::ops::{Add, Sub};
use std::time::{Duration, Instant};

use serde::{Serialize, Deserialize};

/// A point on the match's monotonic timeline, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameInstant(u64);

impl GameInstant {
    /// Start of the timeline.
    pub const ZERO: Self = Self(0);

    /// Create from raw milliseconds.
    #[inline]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Raw milliseconds.
    #[inline]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is in the future.
    #[inline]
    pub fn saturating_since(self, earlier: GameInstant) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// Time remaining until `later`, or zero if it already passed.
    #[inline]
    pub fn saturating_until(self, later: GameInstant) -> Duration {
        later.saturating_since(self)
    }
}

impl Add<Duration> for GameInstant {
    type Output = GameInstant;

    fn add(self, rhs: Duration) -> GameInstant {
        GameInstant(self.0.saturating_add(rhs.as_millis() as u64))
    }
}

impl Sub<GameInstant> for GameInstant {
    type Output = Duration;

    fn sub(self, rhs: GameInstant) -> Duration {
        self.saturating_since(rhs)
    }
}

impl fmt::Display for GameInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{}ms", self.0)
    }
}

/// Monotonic time source.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> GameInstant;
}

/// Clock advanced by hand. Used by tests, replays and the demo driver.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: GameInstant,
}

impl ManualClock {
    /// Create a clock sitting at `start`.
    pub fn new(start: GameInstant) -> Self {
        Self { now: start }
    }

    /// Move the clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now = self.now + by;
    }

    /// Jump to an absolute instant. Never moves backwards.
    pub fn set(&mut self, to: GameInstant) {
        self.now = self.now.max(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> GameInstant {
        self.now
    }
}

/// Wall clock measured from construction.
#[derive(Clone, Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Start measuring now.
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> GameInstant {
        GameInstant::from_millis(self.start.elapsed().as_millis() as u64)
    }
}

/// Format a duration as `MM:SS`, rounding partial seconds up.
///
/// Minutes are not capped at 59 so long countdowns stay readable.
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.as_millis().div_ceil(1000) as u64;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_since() {
        let a = GameInstant::from_millis(1_000);
        let b = GameInstant::from_millis(2_500);
        assert_eq!(b.saturating_since(a), Duration::from_millis(1_500));
        assert_eq!(a.saturating_since(b), Duration::ZERO);
        assert_eq!(b - a, Duration::from_millis(1_500));
    }

    #[test]
    fn test_manual_clock_never_rewinds() {
        let mut clock = ManualClock::new(GameInstant::from_millis(500));
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now().as_millis(), 750);

        clock.set(GameInstant::from_millis(100));
        assert_eq!(clock.now().as_millis(), 750);
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(Duration::ZERO), "00:00");
        assert_eq!(format_countdown(Duration::from_millis(59_001)), "01:00");
        assert_eq!(format_countdown(Duration::from_secs(125)), "02:05");
        assert_eq!(format_countdown(Duration::from_secs(3_600)), "60:00");
    }
}
