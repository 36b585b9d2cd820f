//! Clock periods with unit parsing and display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A target clock period stored in nanoseconds.
///
/// Parses from strings like "3.33ns", "3330ps", "300MHz", "0.3GHz" and bare
/// numbers (interpreted as ns). Frequencies are converted to their period.
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClockPeriod(f64);

impl ClockPeriod {
    /// Creates a clock period from a value in nanoseconds.
    pub fn from_ns(ns: f64) -> Self {
        Self(ns)
    }

    /// Returns the period in nanoseconds.
    pub fn ns(&self) -> f64 {
        self.0
    }

    /// Returns the corresponding frequency in MHz.
    pub fn mhz(&self) -> f64 {
        1_000.0 / self.0
    }

    /// Returns the slower (longer) of two periods.
    pub fn max(self, other: Self) -> Self {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }
}

impl Default for ClockPeriod {
    fn default() -> Self {
        Self(3.33)
    }
}

impl fmt::Debug for ClockPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockPeriod({self})")
    }
}

impl fmt::Display for ClockPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

/// Error type for parsing clock period strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid clock period: '{input}'")]
pub struct ParseClockPeriodError {
    /// The input string that failed to parse.
    pub input: String,
}

impl FromStr for ClockPeriod {
    type Err = ParseClockPeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseClockPeriodError {
            input: s.to_string(),
        };
        let number = |num: &str| -> Result<f64, ParseClockPeriodError> {
            let val: f64 = num.trim().parse().map_err(|_| err())?;
            if val.is_finite() && val > 0.0 {
                Ok(val)
            } else {
                Err(err())
            }
        };

        let lower = s.to_ascii_lowercase();
        if let Some(num) = lower.strip_suffix("ghz") {
            return Ok(ClockPeriod(1.0 / number(num)?));
        }
        if let Some(num) = lower.strip_suffix("mhz") {
            return Ok(ClockPeriod(1_000.0 / number(num)?));
        }
        if let Some(num) = lower.strip_suffix("ps") {
            return Ok(ClockPeriod(number(num)? / 1_000.0));
        }
        if let Some(num) = lower.strip_suffix("ns") {
            return Ok(ClockPeriod(number(num)?));
        }

        Ok(ClockPeriod(number(&lower)?))
    }
}
