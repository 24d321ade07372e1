//! aviationweather.gov data API client
//!
//! Fetches decoded METARs and TAFs as JSON. Cloud bases in this API are
//! reported in feet above ground level.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{FetchError, FetchResult, WeatherSource};
use crate::config::{RETRY_BACKOFF_MAX, RETRY_BACKOFF_MIN, WeatherConfig};
use crate::models::{
    CloudBase, CloudCover, CloudLayer, FlightCategory, ForecastPeriod, ForecastRecord, ObservationRecord,
};
use crate::{FlightWxError, Result};

/// Live weather source backed by aviationweather.gov
pub struct AviationWeatherClient {
    client: ClientWithMiddleware,
    base_url: String,
    timeout_seconds: u64,
}

/// METAR entry of the `/metar?format=json` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMetar {
    icao_id: String,
    raw_ob: Option<String>,
    flt_cat: Option<String>,
    obs_time: Option<i64>,
    clouds: Option<Vec<ApiCloud>>,
}

/// TAF entry of the `/taf?format=json` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTaf {
    icao_id: String,
    issue_time: Option<String>,
    #[serde(rename = "rawTAF")]
    raw_taf: Option<String>,
    fcsts: Option<Vec<ApiTafPeriod>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTafPeriod {
    time_from: i64,
    time_to: i64,
    fcst_change: Option<String>,
    clouds: Option<Vec<ApiCloud>>,
}

#[derive(Debug, Deserialize)]
struct ApiCloud {
    cover: String,
    base: Option<i32>,
}

impl AviationWeatherClient {
    /// Create a client with per-request timeout and transient-failure retries
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FlightWxError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(RETRY_BACKOFF_MIN, RETRY_BACKOFF_MAX)
            .build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_seconds: config.timeout_seconds.into(),
        })
    }

    fn metar_url(&self, station_id: &str) -> String {
        format!(
            "{}/metar?ids={}&format=json",
            self.base_url,
            urlencoding::encode(station_id)
        )
    }

    fn taf_url(&self, station_id: &str) -> String {
        format!(
            "{}/taf?ids={}&format=json",
            self.base_url,
            urlencoding::encode(station_id)
        )
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_body(&self, url: &str, station_id: &str) -> FetchResult<String> {
        let response = self.client.get(url).send().await.map_err(|e| match e {
            reqwest_middleware::Error::Reqwest(ref inner) if inner.is_timeout() => FetchError::Timeout {
                station: station_id.to_string(),
                seconds: self.timeout_seconds,
            },
            _ => FetchError::Network(format!("Request for {station_id} failed: {e}")),
        })?;

        let status = response.status();
        debug!("aviationweather.gov answered {} for {}", status, station_id);

        if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotAvailable(station_id.to_string()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FetchError::Network(format!(
                "aviationweather.gov error {status} for {station_id}: {error_text}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to read response for {station_id}: {e}")))
    }
}

#[async_trait]
impl WeatherSource for AviationWeatherClient {
    async fn fetch_observation(&self, station_id: &str) -> FetchResult<ObservationRecord> {
        let body = self.get_body(&self.metar_url(station_id), station_id).await?;
        parse_metar(&body, station_id)
    }

    async fn fetch_forecast(&self, station_id: &str) -> FetchResult<ForecastRecord> {
        let body = self.get_body(&self.taf_url(station_id), station_id).await?;
        parse_taf(&body, station_id)
    }
}

/// First entry of a JSON array payload; empty bodies and arrays mean no data
fn first_entry<T: DeserializeOwned>(body: &str, station_id: &str) -> FetchResult<T> {
    if body.trim().is_empty() {
        return Err(FetchError::NotAvailable(station_id.to_string()));
    }

    let entries: Vec<T> = serde_json::from_str(body)
        .map_err(|e| FetchError::Parse(format!("Malformed payload for {station_id}: {e}")))?;

    entries
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::NotAvailable(station_id.to_string()))
}

fn parse_metar(body: &str, station_id: &str) -> FetchResult<ObservationRecord> {
    let metar: ApiMetar = first_entry(body, station_id)?;

    Ok(ObservationRecord {
        station_id: metar.icao_id,
        raw_text: metar.raw_ob.unwrap_or_default(),
        flight_category: metar.flt_cat.as_deref().and_then(FlightCategory::from_label),
        observed_at: metar.obs_time.and_then(|secs| DateTime::from_timestamp(secs, 0)),
        clouds: convert_clouds(metar.clouds),
    })
}

fn parse_taf(body: &str, station_id: &str) -> FetchResult<ForecastRecord> {
    let taf: ApiTaf = first_entry(body, station_id)?;

    let periods = taf
        .fcsts
        .unwrap_or_default()
        .into_iter()
        .map(|period| {
            let from = timestamp(period.time_from, station_id)?;
            let to = timestamp(period.time_to, station_id)?;
            let mut converted = ForecastPeriod::new(from, to, convert_clouds(period.clouds));
            converted.change = period.fcst_change;
            Ok(converted)
        })
        .collect::<FetchResult<Vec<_>>>()?;

    Ok(ForecastRecord {
        station_id: taf.icao_id,
        issue_time: taf
            .issue_time
            .as_deref()
            .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
            .map(|issued| issued.with_timezone(&Utc)),
        raw_text: taf.raw_taf,
        periods,
    })
}

fn timestamp(secs: i64, station_id: &str) -> FetchResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| FetchError::Parse(format!("Invalid period timestamp {secs} for {station_id}")))
}

fn convert_clouds(clouds: Option<Vec<ApiCloud>>) -> Vec<CloudLayer> {
    clouds
        .unwrap_or_default()
        .into_iter()
        .map(|cloud| CloudLayer::new(CloudCover::from_code(&cloud.cover), cloud.base.map(CloudBase::Agl)))
        .collect()
}
