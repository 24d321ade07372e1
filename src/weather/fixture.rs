//! Recorded weather replayed from a JSON file

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

use super::{FetchError, FetchResult, WeatherSource};
use crate::models::{ForecastRecord, ObservationRecord};
use crate::{FlightWxError, Result};

/// On-disk layout: two flat lists keyed by their `station_id`
#[derive(Debug, Default, Serialize, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    observations: Vec<ObservationRecord>,
    #[serde(default)]
    forecasts: Vec<ForecastRecord>,
}

/// In-memory weather source, used for offline runs and tests
#[derive(Debug, Clone, Default)]
pub struct RecordedWeather {
    observations: HashMap<String, ObservationRecord>,
    forecasts: HashMap<String, ForecastRecord>,
}

impl RecordedWeather {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a fixture file; later entries for the same station win
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| FlightWxError::fixture(format!("Cannot read {}: {e}", path.display())))?;
        let file: FixtureFile = serde_json::from_str(&content)
            .map_err(|e| FlightWxError::fixture(format!("Cannot parse {}: {e}", path.display())))?;

        let recorded = file
            .observations
            .into_iter()
            .fold(Self::new(), Self::with_observation);
        let recorded = file
            .forecasts
            .into_iter()
            .fold(recorded, Self::with_forecast);

        info!(
            "Loaded {} observations and {} forecasts from {}",
            recorded.observations.len(),
            recorded.forecasts.len(),
            path.display()
        );
        Ok(recorded)
    }

    #[must_use]
    pub fn with_observation(mut self, observation: ObservationRecord) -> Self {
        self.observations
            .insert(observation.station_id.clone(), observation);
        self
    }

    #[must_use]
    pub fn with_forecast(mut self, forecast: ForecastRecord) -> Self {
        self.forecasts.insert(forecast.station_id.clone(), forecast);
        self
    }
}

#[async_trait]
impl WeatherSource for RecordedWeather {
    async fn fetch_observation(&self, station_id: &str) -> FetchResult<ObservationRecord> {
        self.observations
            .get(station_id)
            .cloned()
            .ok_or_else(|| FetchError::NotAvailable(station_id.to_string()))
    }

    async fn fetch_forecast(&self, station_id: &str) -> FetchResult<ForecastRecord> {
        self.forecasts
            .get(station_id)
            .cloned()
            .ok_or_else(|| FetchError::NotAvailable(station_id.to_string()))
    }
}
