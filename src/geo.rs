//! Geographic index over the station catalog
//!
//! Great-circle distances in nautical miles and radius / proximity ordering
//! of stations. The index owns the station reference data and is read-only
//! once built.

use std::collections::HashSet;

use crate::models::{Coordinate, Station};
use crate::{FlightWxError, Result};

/// Kilometres per international nautical mile
pub const KM_PER_NM: f64 = 1.852;

/// A station paired with its distance from some reference point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyStation<'a> {
    pub station: &'a Station,
    pub distance_nm: f64,
}

/// Read-only station index
#[derive(Debug, Clone)]
pub struct GeoIndex {
    stations: Vec<Station>,
}

impl GeoIndex {
    /// Build an index, rejecting malformed coordinates and duplicate ids
    pub fn new(stations: Vec<Station>) -> Result<Self> {
        let mut seen = HashSet::new();
        for station in &stations {
            station.coordinate.validate().map_err(|e| {
                FlightWxError::validation(format!("Station {}: {}", station.id, e))
            })?;
            if !seen.insert(station.id.as_str()) {
                return Err(FlightWxError::validation(format!(
                    "Duplicate station id {} in catalog",
                    station.id
                )));
            }
        }
        Ok(Self { stations })
    }

    /// Great-circle distance between two coordinates in nautical miles
    pub fn distance(a: &Coordinate, b: &Coordinate) -> Result<f64> {
        a.validate()?;
        b.validate()?;
        Ok(haversine_nm(a, b))
    }

    #[must_use]
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|station| station.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Stations within `radius_nm` of `center`, nearest first.
    ///
    /// Ties keep catalog order.
    pub fn stations_within(&self, center: &Coordinate, radius_nm: f64) -> Result<Vec<NearbyStation<'_>>> {
        center.validate()?;
        if !radius_nm.is_finite() || radius_nm < 0.0 {
            return Err(FlightWxError::validation(format!(
                "Search radius {radius_nm} NM must be a non-negative number"
            )));
        }

        let mut nearby: Vec<NearbyStation<'_>> = self
            .stations
            .iter()
            .map(|station| NearbyStation {
                station,
                distance_nm: haversine_nm(center, &station.coordinate),
            })
            .filter(|nearby| nearby.distance_nm <= radius_nm)
            .collect();

        nearby.sort_by(|a, b| a.distance_nm.total_cmp(&b.distance_nm));
        Ok(nearby)
    }

    /// `pool` ordered by distance from `station`, excluding `station` itself
    #[must_use]
    pub fn candidates_for<'a>(&self, station: &Station, pool: &[&'a Station]) -> Vec<NearbyStation<'a>> {
        let mut candidates: Vec<NearbyStation<'a>> = pool
            .iter()
            .filter(|candidate| candidate.id != station.id)
            .map(|candidate| NearbyStation {
                station: candidate,
                distance_nm: haversine_nm(&station.coordinate, &candidate.coordinate),
            })
            .collect();

        candidates.sort_by(|a, b| a.distance_nm.total_cmp(&b.distance_nm));
        candidates
    }
}

fn haversine_nm(a: &Coordinate, b: &Coordinate) -> f64 {
    let km = haversine::distance(
        haversine::Location {
            latitude: a.latitude,
            longitude: a.longitude,
        },
        haversine::Location {
            latitude: b.latitude,
            longitude: b.longitude,
        },
        haversine::Units::Kilometers,
    );
    km / KM_PER_NM
}
