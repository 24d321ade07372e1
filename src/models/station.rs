//! Station model for reporting points and their coordinates

use serde::{Deserialize, Serialize};

use crate::{FlightWxError, Result};

/// Geographic coordinate in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Reject NaN, infinite and out-of-range coordinates
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(FlightWxError::validation(format!(
                "Latitude {} is outside [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(FlightWxError::validation(format!(
                "Longitude {} is outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Format as "lat, lon" with four decimals
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// An airport or other weather-reporting point
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Station {
    /// Unique station code (ICAO or GPS code)
    pub id: String,
    /// Display name
    pub name: String,
    pub coordinate: Coordinate,
    /// Published field elevation in feet MSL, used to normalize MSL cloud bases
    pub elevation_ft: Option<i32>,
}

impl Station {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coordinate: Coordinate::new(latitude, longitude),
            elevation_ft: None,
        }
    }

    #[must_use]
    pub fn with_elevation(mut self, elevation_ft: i32) -> Self {
        self.elevation_ft = Some(elevation_ft);
        self
    }
}
