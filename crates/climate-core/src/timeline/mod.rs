//! Year timeline: bounded cursor, step/seek navigation and timed playback.

mod controller;
mod location;
mod range;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use controller::{
    DEFAULT_PLAYBACK_INTERVAL, PlaybackState, TimelineController, TimelineSnapshot,
};
pub use location::Location;
pub use range::{DEFAULT_START_YEAR, YearRange, current_year};

/// Aggregate statistics the viewer can display per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Min,
    Mean,
    Max,
}

impl Statistic {
    /// Returns all supported statistics in display order.
    pub fn all() -> &'static [Statistic] {
        &[Statistic::Min, Statistic::Mean, Statistic::Max]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Min => "min",
            Statistic::Mean => "mean",
            Statistic::Max => "max",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Statistic {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "min" => Ok(Self::Min),
            "mean" => Ok(Self::Mean),
            "max" => Ok(Self::Max),
            _ => Err(format!("Unknown statistic: {value}")),
        }
    }
}

/// Errors raised by timeline operations given values outside their domain.
///
/// Reaching either end of the range while stepping is not an error; the
/// step operations report it through their `bool` result.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineError {
    /// Year is not part of the available range
    OutOfRange { year: i32, first: i32, last: i32 },
    /// Location coordinates are non-finite or out of bounds
    InvalidLocation { reason: String },
    /// Range bounds are inverted
    EmptyRange { first: i32, last: i32 },
}

impl fmt::Display for TimelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineError::OutOfRange { year, first, last } => {
                write!(f, "Year {year} is outside the available range {first}..={last}")
            }
            TimelineError::InvalidLocation { reason } => write!(f, "Invalid location: {reason}"),
            TimelineError::EmptyRange { first, last } => {
                write!(f, "Empty year range: first year {first} is after {last}")
            }
        }
    }
}

impl std::error::Error for TimelineError {}
