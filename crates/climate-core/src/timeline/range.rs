//! Contiguous, ascending range of selectable years.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::TimelineError;

/// First year with reanalysis data available.
pub const DEFAULT_START_YEAR: i32 = 1940;

/// Inclusive year range backing the timeline.
///
/// Construction guarantees `first <= last`, so the range is never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawYearRange")]
pub struct YearRange {
    first: i32,
    last: i32,
}

/// Unchecked wire form; converted through `YearRange::new`.
#[derive(Deserialize)]
struct RawYearRange {
    first: i32,
    last: i32,
}

impl TryFrom<RawYearRange> for YearRange {
    type Error = TimelineError;

    fn try_from(raw: RawYearRange) -> Result<Self, Self::Error> {
        Self::new(raw.first, raw.last)
    }
}

impl YearRange {
    /// Creates a range covering `first..=last`.
    ///
    /// # Errors
    /// Returns `TimelineError::EmptyRange` if `first > last`.
    pub fn new(first: i32, last: i32) -> Result<Self, TimelineError> {
        if first > last {
            return Err(TimelineError::EmptyRange { first, last });
        }
        Ok(Self { first, last })
    }

    /// Creates a range from `first` up to the current local calendar year.
    ///
    /// # Errors
    /// Returns `TimelineError::EmptyRange` if `first` lies in the future.
    pub fn through_current_year(first: i32) -> Result<Self, TimelineError> {
        Self::new(first, current_year())
    }

    pub fn first(&self) -> i32 {
        self.first
    }

    pub fn last(&self) -> i32 {
        self.last
    }

    pub fn len(&self) -> usize {
        (self.first.abs_diff(self.last) as usize).saturating_add(1)
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.first..=self.last).contains(&year)
    }

    /// Year following `year`, if both are inside the range.
    pub fn next(&self, year: i32) -> Option<i32> {
        (self.contains(year) && year < self.last).then(|| year + 1)
    }

    /// Year preceding `year`, if both are inside the range.
    pub fn previous(&self, year: i32) -> Option<i32> {
        (self.contains(year) && year > self.first).then(|| year - 1)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = i32> {
        self.first..=self.last
    }

    /// Materializes the range as a vector, oldest first.
    pub fn to_vec(&self) -> Vec<i32> {
        self.iter().collect()
    }
}

/// Current calendar year in the local timezone.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}
