//! Simulation time model.
//!
//! # Design
//!
//! The loop advances a `Tick` counter; each tick spans a fixed number of
//! milliseconds held by `SimClock`.  Simulated instants are `SimTime`
//! values in whole milliseconds so lease expiry and stall timers compare
//! exactly, with no floating-point drift across long runs.
//!
//! Spans between instants are plain `std::time::Duration`s.

use std::fmt;
use std::time::Duration;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimTime ──────────────────────────────────────────────────────────────────

/// A simulated instant, in milliseconds since simulation start.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    #[inline]
    pub fn from_millis(ms: u64) -> SimTime {
        SimTime(ms)
    }

    /// Round `secs` to the nearest millisecond.  Negative input clamps to 0.
    #[inline]
    pub fn from_secs_f64(secs: f64) -> SimTime {
        SimTime((secs.max(0.0) * 1000.0).round() as u64)
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Span from `earlier` to `self`, or zero if `earlier` is later.
    #[inline]
    pub fn saturating_since(self, earlier: SimTime) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl std::ops::Add<Duration> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: Duration) -> SimTime {
        SimTime(self.0 + rhs.as_millis() as u64)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}s", self.as_secs_f64())
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Maps tick counts to simulated instants.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Simulated milliseconds per tick.  Default: 100.
    pub tick_ms:      u32,
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_ms: u32) -> Self {
        Self { tick_ms, current_tick: Tick::ZERO }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Instant of the current tick.
    #[inline]
    pub fn now(&self) -> SimTime {
        SimTime(self.current_tick.0 * self.tick_ms as u64)
    }

    #[inline]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_millis(self.tick_ms as u64)
    }

    /// How many ticks span `d`?  Rounds up.
    #[inline]
    pub fn ticks_for(&self, d: Duration) -> u64 {
        (d.as_millis() as u64).div_ceil(self.tick_ms.max(1) as u64)
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(100)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.current_tick, self.now())
    }
}

// ── Cadence ───────────────────────────────────────────────────────────────────

/// Fires at most once per `interval` of simulated time.
///
/// The first firing happens once `interval` has elapsed since time zero.
#[derive(Clone, Debug)]
pub struct Cadence {
    interval: Duration,
    last:     SimTime,
}

impl Cadence {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: SimTime::ZERO }
    }

    /// `true` (and re-arms) if at least `interval` has passed since the last
    /// firing.
    pub fn is_due(&mut self, now: SimTime) -> bool {
        if now.saturating_since(self.last) < self.interval {
            return false;
        }
        self.last = now;
        true
    }

    pub fn reset(&mut self) {
        self.last = SimTime::ZERO;
    }
}
