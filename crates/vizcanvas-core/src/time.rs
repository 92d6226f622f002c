use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Non-negative span of playback time, stored as fractional milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Duration {
    millis: f64,
}

impl Duration {
    /// Create a duration from milliseconds. Negative and NaN inputs clamp to zero.
    pub fn from_millis(ms: f64) -> Self {
        Self {
            millis: if ms.is_finite() { ms.max(0.0) } else { 0.0 },
        }
    }

    /// Create a zero duration.
    pub fn zero() -> Self {
        Self { millis: 0.0 }
    }

    /// Get duration as milliseconds.
    pub fn as_millis(&self) -> f64 {
        self.millis
    }

    /// Get duration as seconds.
    pub fn as_seconds(&self) -> f64 {
        self.millis / 1000.0
    }

    /// Wrap into `[0, period]` the way a looping timeline does: a value
    /// strictly greater than `period` is reduced modulo `period`, anything
    /// else is returned unchanged.
    pub fn wrap(self, period_ms: u64) -> Self {
        if period_ms == 0 {
            return self;
        }
        let period = period_ms as f64;
        if self.millis > period {
            Self::from_millis(self.millis % period)
        } else {
            self
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Duration::zero()
    }
}

impl Add for Duration {
    type Output = Duration;
    fn add(self, rhs: Duration) -> Duration {
        Duration::from_millis(self.millis + rhs.millis)
    }
}

impl Sub for Duration {
    type Output = Duration;
    fn sub(self, rhs: Duration) -> Duration {
        Duration::from_millis(self.millis - rhs.millis)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.millis < 1000.0 {
            write!(f, "{:.0}ms", self.millis)
        } else {
            write!(f, "{:.2}s", self.as_seconds())
        }
    }
}

/// A host refresh timestamp in milliseconds (e.g. `performance.now()`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Timestamp {
    millis: f64,
}

impl Timestamp {
    pub fn from_millis(ms: f64) -> Self {
        Self { millis: ms }
    }

    pub fn as_millis(&self) -> f64 {
        self.millis
    }

    /// Time elapsed since `earlier`, clamped into `[0, max_ms]`.
    ///
    /// Host clocks can go backwards or jump forward after a tab resumes;
    /// neither may move the playback clock by more than one frame budget.
    pub fn delta_since(&self, earlier: Timestamp, max_ms: f64) -> Duration {
        let delta = self.millis - earlier.millis;
        if !delta.is_finite() {
            return Duration::zero();
        }
        Duration::from_millis(delta.clamp(0.0, max_ms.max(0.0)))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_ms = self.millis.max(0.0) as u64;
        let minutes = total_ms / 60_000;
        let secs = (total_ms % 60_000) / 1_000;
        let ms = total_ms % 1_000;
        write!(f, "{:02}:{:02}.{:03}", minutes, secs, ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_from_millis() {
        let d = Duration::from_millis(2500.0);
        assert!((d.as_seconds() - 2.5).abs() < 0.001);
        assert_eq!(Duration::from_millis(-5.0), Duration::zero());
        assert_eq!(Duration::from_millis(f64::NAN), Duration::zero());
    }

    #[test]
    fn test_duration_wrap() {
        assert_eq!(Duration::from_millis(4500.0).wrap(4000).as_millis(), 500.0);
        assert_eq!(Duration::from_millis(4000.0).wrap(4000).as_millis(), 4000.0);
        assert_eq!(Duration::from_millis(120.0).wrap(4000).as_millis(), 120.0);
        assert_eq!(Duration::from_millis(9000.0).wrap(0).as_millis(), 9000.0);
    }

    #[test]
    fn test_duration_arithmetic() {
        let a = Duration::from_millis(1000.0);
        let b = Duration::from_millis(500.0);
        assert!(((a + b).as_millis() - 1500.0).abs() < 0.001);
        assert!(((a - b).as_millis() - 500.0).abs() < 0.001);
        assert_eq!(b - a, Duration::zero());
    }

    #[test]
    fn test_duration_display() {
        assert_eq!(format!("{}", Duration::from_millis(2500.0)), "2.50s");
        assert_eq!(format!("{}", Duration::from_millis(500.0)), "500ms");
    }

    #[test]
    fn test_timestamp_delta_is_clamped() {
        let a = Timestamp::from_millis(1000.0);
        assert_eq!(
            Timestamp::from_millis(1016.0).delta_since(a, 100.0).as_millis(),
            16.0
        );
        assert_eq!(
            Timestamp::from_millis(9000.0).delta_since(a, 100.0).as_millis(),
            100.0
        );
        assert_eq!(
            Timestamp::from_millis(900.0).delta_since(a, 100.0),
            Duration::zero()
        );
    }

    #[test]
    fn test_timestamp_display() {
        assert_eq!(format!("{}", Timestamp::from_millis(61_500.0)), "01:01.500");
    }
}
