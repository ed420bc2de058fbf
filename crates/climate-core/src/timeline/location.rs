//! Location selection carried alongside the timeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::TimelineError;

/// A named place the viewer can focus on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, country: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            lat,
            lng,
        }
    }

    /// Checks that coordinates are finite and within WGS84 bounds.
    ///
    /// # Errors
    /// Returns `TimelineError::InvalidLocation` describing the first bad coordinate.
    pub fn validate(&self) -> Result<(), TimelineError> {
        check_coordinate("lat", self.lat, 90.0)?;
        check_coordinate("lng", self.lng, 180.0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} ({:.4}, {:.4})",
            self.name, self.country, self.lat, self.lng
        )
    }
}

fn check_coordinate(field: &'static str, value: f64, limit: f64) -> Result<(), TimelineError> {
    if !value.is_finite() {
        return Err(TimelineError::InvalidLocation {
            reason: format!("{field} must be a finite number, got {value}"),
        });
    }
    if value.abs() > limit {
        return Err(TimelineError::InvalidLocation {
            reason: format!("{field} must be within [-{limit}, {limit}], got {value}"),
        });
    }
    Ok(())
}
