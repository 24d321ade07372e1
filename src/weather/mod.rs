//! Weather data sources
//!
//! The decision pipeline only sees the [`WeatherSource`] trait. The live
//! adapter talks to the aviationweather.gov data API; the recorded adapter
//! replays a JSON fixture for offline runs and tests.

use async_trait::async_trait;

use crate::models::{ForecastRecord, ObservationRecord};

pub mod aviation_weather;
pub mod error;
pub mod fixture;

pub use aviation_weather::AviationWeatherClient;
pub use error::{FetchError, FetchResult};
pub use fixture::RecordedWeather;

/// Per-station observation and forecast provider.
///
/// Calls for different stations are independent and may run concurrently.
/// A station without data yields [`FetchError::NotAvailable`].
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_observation(&self, station_id: &str) -> FetchResult<ObservationRecord>;

    async fn fetch_forecast(&self, station_id: &str) -> FetchResult<ForecastRecord>;
}
