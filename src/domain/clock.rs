//! Interview clock timestamps

use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration as StdDuration;

/// Monotonic point in time, in milliseconds since the interview clock origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`, saturating at zero.
    pub fn saturating_since(&self, earlier: Timestamp) -> StdDuration {
        StdDuration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add<StdDuration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: StdDuration) -> Self::Output {
        Timestamp(self.0.saturating_add(rhs.as_millis() as u64))
    }
}

impl Sub for Timestamp {
    type Output = StdDuration;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        self.saturating_since(rhs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Source of interview timestamps.
///
/// Built on `tokio::time::Instant`, so paused test runtimes drive it too.
#[derive(Debug, Clone, Copy)]
pub struct InterviewClock {
    origin: tokio::time::Instant,
}

impl InterviewClock {
    pub fn start() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp(self.origin.elapsed().as_millis() as u64)
    }
}

impl Default for InterviewClock {
    fn default() -> Self {
        Self::start()
    }
}
