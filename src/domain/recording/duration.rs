//! Human-friendly duration value object (`300ms`, `30s`, `2m30s`)

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

pub const DEFAULT_RECORDING_LIMIT_SECS: u64 = 60;
pub const DEFAULT_ABSENCE_THRESHOLD_MS: u64 = 3_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 300;

/// Units in the order they must appear, largest first
const UNITS: [(&str, u64); 3] = [("m", 60_000), ("s", 1_000), ("ms", 1)];

/// A strictly positive span of time, parsed from and displayed as `1m30s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(StdDuration);

impl Duration {
    pub const fn from_millis(ms: u64) -> Self {
        Self(StdDuration::from_millis(ms))
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(StdDuration::from_secs(secs))
    }

    pub const fn default_recording_limit() -> Self {
        Self::from_secs(DEFAULT_RECORDING_LIMIT_SECS)
    }

    pub const fn default_absence_threshold() -> Self {
        Self::from_millis(DEFAULT_ABSENCE_THRESHOLD_MS)
    }

    pub const fn default_poll_interval() -> Self {
        Self::from_millis(DEFAULT_POLL_INTERVAL_MS)
    }

    /// Whole seconds, rounded down
    pub const fn as_secs(&self) -> u64 {
        self.0.as_secs()
    }

    pub const fn as_millis(&self) -> u64 {
        self.0.as_millis() as u64
    }

    pub const fn as_std(&self) -> StdDuration {
        self.0
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason| DurationParseError {
            input: s.to_string(),
            reason,
        };

        let input = s.trim().to_ascii_lowercase();
        if input.is_empty() {
            return Err(fail("empty value"));
        }

        let mut rest = input.as_str();
        let mut next_unit = 0;
        let mut total_ms: u64 = 0;

        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            if digits == 0 {
                return Err(fail("expected a number"));
            }
            let value: u64 = rest[..digits].parse().map_err(|_| fail("number too large"))?;
            rest = &rest[digits..];

            let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
            if unit_len == 0 {
                return Err(fail("missing unit"));
            }
            let unit = &rest[..unit_len];
            rest = &rest[unit_len..];

            let offset = UNITS[next_unit..]
                .iter()
                .position(|(name, _)| *name == unit)
                .ok_or_else(|| {
                    if UNITS.iter().any(|(name, _)| *name == unit) {
                        fail("units out of order")
                    } else {
                        fail("unknown unit")
                    }
                })?;
            let (_, scale) = UNITS[next_unit + offset];
            next_unit += offset + 1;

            total_ms = value
                .checked_mul(scale)
                .and_then(|ms| total_ms.checked_add(ms))
                .ok_or_else(|| fail("number too large"))?;
        }

        if total_ms == 0 {
            return Err(fail("must be greater than zero"));
        }
        Ok(Self::from_millis(total_ms))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.as_millis();
        if ms % 1_000 != 0 {
            return write!(f, "{ms}ms");
        }
        match (ms / 60_000, (ms / 1_000) % 60) {
            (0, secs) => write!(f, "{secs}s"),
            (mins, 0) => write!(f, "{mins}m"),
            (mins, secs) => write!(f, "{mins}m{secs}s"),
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_recording_limit()
    }
}

impl From<Duration> for StdDuration {
    fn from(d: Duration) -> Self {
        d.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(input: &str) -> u64 {
        input.parse::<Duration>().unwrap().as_millis()
    }

    fn reason(input: &str) -> &'static str {
        input.parse::<Duration>().unwrap_err().reason
    }

    #[test]
    fn parses_single_units() {
        assert_eq!(ms("30s"), 30_000);
        assert_eq!(ms("2m"), 120_000);
        assert_eq!(ms("300ms"), 300);
    }

    #[test]
    fn parses_compound_values() {
        assert_eq!(ms("2m30s"), 150_000);
        assert_eq!(ms("1s500ms"), 1_500);
        assert_eq!(ms("1m0s250ms"), 60_250);
    }

    #[test]
    fn ignores_case_and_padding() {
        assert_eq!(ms("1M30S"), 90_000);
        assert_eq!(ms("  30s  "), 30_000);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(reason(""), "empty value");
        assert_eq!(reason("30"), "missing unit");
        assert_eq!(reason("ms"), "expected a number");
        assert_eq!(reason("30x"), "unknown unit");
        assert_eq!(reason("30s1m"), "units out of order");
        assert_eq!(reason("1s1s"), "units out of order");
    }

    #[test]
    fn rejects_zero() {
        for input in ["0s", "0m0s", "0ms"] {
            assert_eq!(reason(input), "must be greater than zero", "{input}");
        }
    }

    #[test]
    fn rejects_overflow() {
        assert_eq!(reason("99999999999999999999s"), "number too large");
        assert_eq!(reason("18446744073709551615m"), "number too large");
    }

    #[test]
    fn error_message_names_the_input() {
        let err = "forever".parse::<Duration>().unwrap_err();
        assert!(err.to_string().starts_with("Invalid duration \"forever\""));
    }

    #[test]
    fn displays_compactly() {
        assert_eq!(Duration::from_secs(30).to_string(), "30s");
        assert_eq!(Duration::from_secs(120).to_string(), "2m");
        assert_eq!(Duration::from_secs(150).to_string(), "2m30s");
        assert_eq!(Duration::from_millis(1_500).to_string(), "1500ms");
    }

    #[test]
    fn display_parses_back() {
        for d in [Duration::from_millis(300), Duration::from_secs(3_725)] {
            assert_eq!(d.to_string().parse::<Duration>().unwrap(), d);
        }
    }

    #[test]
    fn defaults() {
        assert_eq!(Duration::default().as_std(), StdDuration::from_secs(60));
        assert_eq!(Duration::default_absence_threshold().as_millis(), 3_000);
        assert_eq!(Duration::default_poll_interval().as_millis(), 300);
    }
}
