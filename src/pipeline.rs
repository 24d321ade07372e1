//! Go/No-Go decision service
//!
//! One run: select stations around the target, fetch their weather
//! concurrently, then resolve, decide and aggregate in station order.

use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::FlightWxConfig;
use crate::decision::DecisionEngine;
use crate::geo::{GeoIndex, NearbyStation};
use crate::models::{DecisionWindow, ForecastRecord, ObservationRecord, Station};
use crate::report::{GoNoGoReport, ReportAssembler};
use crate::resolver::TafResolver;
use crate::weather::{FetchError, FetchResult, WeatherSource};
use crate::{FlightWxError, Result};

/// Weather fetched for one run, keyed by station id.
///
/// Stations absent from a map had no usable data.
#[derive(Debug, Default)]
pub struct WeatherSnapshot {
    pub observations: HashMap<String, ObservationRecord>,
    pub forecasts: HashMap<String, ForecastRecord>,
}

/// Runs the full decision pipeline against a weather source
pub struct GoNoGoService {
    index: GeoIndex,
    source: Arc<dyn WeatherSource>,
    engine: DecisionEngine,
    radius_nm: f64,
    fetch_timeout: Duration,
    max_concurrent_requests: usize,
}

impl GoNoGoService {
    /// Build a service from validated configuration.
    ///
    /// A single fetch may spend its whole retry budget before it is cut off.
    pub fn new(config: &FlightWxConfig, index: GeoIndex, source: Arc<dyn WeatherSource>) -> Result<Self> {
        Ok(Self {
            index,
            source,
            engine: DecisionEngine::new(config.flight.collection_altitude_ft, config.flight.clearance_margin_ft)?,
            radius_nm: config.target.radius_nm,
            fetch_timeout: config.weather.fetch_budget(),
            max_concurrent_requests: config.weather.max_concurrent_requests.max(1) as usize,
        })
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Decide for every station within the radius of `target_id`.
    ///
    /// Fails only on invalid input; weather failures degrade single stations.
    pub async fn run(&self, target_id: &str, window: &DecisionWindow) -> Result<GoNoGoReport> {
        let target = self
            .index
            .get(target_id)
            .ok_or_else(|| FlightWxError::validation(format!("Unknown target station {target_id}")))?;

        let nearby = self.index.stations_within(&target.coordinate, self.radius_nm)?;
        info!(
            "Deciding for {} stations within {} NM of {} ({})",
            nearby.len(),
            self.radius_nm,
            target.id,
            target.coordinate.format_coordinates()
        );

        let snapshot = self.fetch_all(&nearby).await;
        info!(
            "Fetched {} observations and {} forecasts",
            snapshot.observations.len(),
            snapshot.forecasts.len()
        );

        let pool: Vec<&Station> = nearby.iter().map(|n| n.station).collect();
        let resolver = TafResolver::new(&snapshot.forecasts);
        let decisions = nearby
            .iter()
            .map(|near| {
                let candidates = self.index.candidates_for(near.station, &pool);
                let resolution = resolver.resolve(near.station, window, &candidates);
                self.engine.decide(near.station, resolution.as_ref())
            })
            .collect();

        let fleet = DecisionEngine::aggregate(decisions);
        info!(
            "Overall {} ({} of {} stations blocking)",
            fleet.status,
            fleet.blocking().count(),
            fleet.decisions.len()
        );

        Ok(ReportAssembler::new(target, self.radius_nm, self.engine.threshold_ft(), *window).assemble(
            fleet,
            &nearby,
            &snapshot.observations,
        ))
    }

    /// Fetch observation and forecast for every station, bounded in flight
    pub async fn fetch_all(&self, nearby: &[NearbyStation<'_>]) -> WeatherSnapshot {
        let results: Vec<_> = stream::iter(nearby.iter().map(|n| n.station.id.as_str()))
            .map(|id| async move {
                let (observation, forecast) = futures::join!(
                    self.guarded(id, "observation", self.source.fetch_observation(id)),
                    self.guarded(id, "forecast", self.source.fetch_forecast(id)),
                );
                (id, observation, forecast)
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect()
            .await;

        let mut snapshot = WeatherSnapshot::default();
        for (id, observation, forecast) in results {
            if let Some(observation) = observation {
                snapshot.observations.insert(id.to_string(), observation);
            }
            if let Some(forecast) = forecast {
                snapshot.forecasts.insert(id.to_string(), forecast);
            }
        }
        snapshot
    }

    async fn guarded<T>(&self, id: &str, kind: &str, fetch: impl Future<Output = FetchResult<T>>) -> Option<T> {
        let outcome = tokio::time::timeout(self.fetch_timeout, fetch)
            .await
            .unwrap_or_else(|_| {
                Err(FetchError::Timeout {
                    station: id.to_string(),
                    seconds: self.fetch_timeout.as_secs(),
                })
            });

        match outcome {
            Ok(record) => Some(record),
            Err(e) if e.is_not_available() => {
                debug!("No {} for {}", kind, id);
                None
            }
            Err(e) => {
                warn!("Treating {} for {} as unavailable: {}", kind, id, e);
                None
            }
        }
    }
}
