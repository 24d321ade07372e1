//! Station catalog loading
//!
//! Reads an airports CSV in the OurAirports column layout and keeps the
//! airports that carry a station identifier.

use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::models::Station;
use crate::{FlightWxError, Result};

const AIRPORT_TYPES: [&str; 3] = ["small_airport", "medium_airport", "large_airport"];

#[derive(Debug, Deserialize)]
struct AirportRow {
    #[serde(default)]
    gps_code: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    latitude_deg: f64,
    longitude_deg: f64,
    #[serde(default)]
    elevation_ft: Option<i32>,
    #[serde(default)]
    iso_country: String,
}

/// Load stations from a CSV file, optionally restricted to one ISO country
pub fn load_stations(path: &Path, country: Option<&str>) -> Result<Vec<Station>> {
    let file = std::fs::File::open(path)
        .map_err(|e| FlightWxError::catalog(format!("Cannot open {}: {e}", path.display())))?;
    let stations = read_stations(file, country)?;
    info!("Loaded {} stations from {}", stations.len(), path.display());
    Ok(stations)
}

/// Parse stations from any CSV reader.
///
/// The first row for an identifier wins; later duplicates are dropped.
pub fn read_stations<R: Read>(reader: R, country: Option<&str>) -> Result<Vec<Station>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut seen = HashSet::new();
    let mut stations = Vec::new();

    for (line, result) in rdr.deserialize::<AirportRow>().enumerate() {
        let row = result.map_err(|e| FlightWxError::catalog(format!("Row {}: {e}", line + 2)))?;

        let id = row.gps_code.trim().to_ascii_uppercase();
        if id.is_empty() || !AIRPORT_TYPES.contains(&row.kind.as_str()) {
            continue;
        }
        if country.is_some_and(|country| !row.iso_country.eq_ignore_ascii_case(country)) {
            continue;
        }
        if !seen.insert(id.clone()) {
            warn!("Duplicate station {} in catalog, keeping the first entry", id);
            continue;
        }

        let mut station = Station::new(id, row.name, row.latitude_deg, row.longitude_deg);
        station.elevation_ft = row.elevation_ft;
        stations.push(station);
    }

    debug!("Catalog filter kept {} stations", stations.len());
    Ok(stations)
}
