//! Nearest-available forecast fallback
//!
//! Many small fields publish observations but no TAF. For those the
//! governing cloud base is borrowed from the nearest station whose forecast
//! does yield one.

use std::collections::HashMap;

use tracing::debug;

use crate::extractor::governing_cloud_base;
use crate::geo::NearbyStation;
use crate::models::{DecisionWindow, ForecastRecord, Resolution, Station};

/// Resolves a governing cloud base per station from a set of fetched forecasts
pub struct TafResolver<'a> {
    forecasts: &'a HashMap<String, ForecastRecord>,
}

impl<'a> TafResolver<'a> {
    /// `forecasts` is keyed by station id; stations without an entry had no
    /// forecast available.
    #[must_use]
    pub fn new(forecasts: &'a HashMap<String, ForecastRecord>) -> Self {
        Self { forecasts }
    }

    /// Own forecast first, then the first candidate with data.
    ///
    /// `candidates` must be sorted by ascending distance from `station` and
    /// must not contain it. Scanning stops at the first candidate whose
    /// forecast yields a base; altitudes are never compared across candidates.
    #[must_use]
    pub fn resolve(
        &self,
        station: &Station,
        window: &DecisionWindow,
        candidates: &[NearbyStation<'_>],
    ) -> Option<Resolution> {
        if let Some(cloud_base_ft) = self.base_for(station, window) {
            return Some(Resolution {
                source_station_id: station.id.clone(),
                distance_nm: 0.0,
                cloud_base_ft,
            });
        }

        let resolution = candidates.iter().find_map(|candidate| {
            self.base_for(candidate.station, window)
                .map(|cloud_base_ft| Resolution {
                    source_station_id: candidate.station.id.clone(),
                    distance_nm: candidate.distance_nm,
                    cloud_base_ft,
                })
        });

        match &resolution {
            Some(found) => debug!(
                "{} has no usable forecast, using {} ({:.1} NM away)",
                station.id, found.source_station_id, found.distance_nm
            ),
            None => debug!(
                "{} unresolved: none of {} candidates has a ceiling in the window",
                station.id,
                candidates.len()
            ),
        }

        resolution
    }

    fn base_for(&self, station: &Station, window: &DecisionWindow) -> Option<i32> {
        self.forecasts
            .get(&station.id)
            .and_then(|record| governing_cloud_base(record, window, station.elevation_ft))
    }
}
