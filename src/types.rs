//! Common Types Module
//!
//! Shared types used by the universe, the history collaborators and the
//! selection pipeline.

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a tradable instrument (e.g., "SPY", "BTC-USD").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Sampling granularity of historical bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Tick,
    Second,
    Minute,
    Hour,
    Daily,
}

impl Resolution {
    /// Daily bars are aligned on calendar dates rather than exact instants.
    pub fn is_daily(&self) -> bool {
        matches!(self, Resolution::Daily)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resolution::Tick => "tick",
            Resolution::Second => "second",
            Resolution::Minute => "minute",
            Resolution::Hour => "hour",
            Resolution::Daily => "daily",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tick" => Ok(Self::Tick),
            "second" | "s" => Ok(Self::Second),
            "minute" | "m" | "1m" => Ok(Self::Minute),
            "hour" | "h" | "1h" => Ok(Self::Hour),
            "daily" | "day" | "d" | "1d" => Ok(Self::Daily),
            _ => Err(format!(
                "Unknown resolution: '{}'. Use tick, second, minute, hour or daily",
                s
            )),
        }
    }
}

/// A single historical bar close as reported by the history feed.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceObservation {
    pub symbol: Symbol,
    /// Bar end time in the exchange's local time.
    pub end_time: NaiveDateTime,
    pub price: f64,
    /// Exchange time zone of `symbol`.
    pub time_zone: Tz,
}

/// Observations sharing one originating sampling instant.
///
/// May hold fewer observations than the tracked universe when some
/// instruments did not trade at that instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSlice {
    pub observations: Vec<PriceObservation>,
}

impl PriceSlice {
    pub fn new(observations: Vec<PriceObservation>) -> Self {
        Self { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// The currently selected pair. Orientation is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPair {
    pub first: Symbol,
    pub second: Symbol,
    /// Pearson correlation of the two log-return series
    pub correlation: f64,
}

impl fmt::Display for BestPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({:.4})", self.first, self.second, self.correlation)
    }
}
