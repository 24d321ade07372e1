//! Configuration management for `FlightWx`
//!
//! Handles loading configuration from files and environment variables,
//! and validates every setting before a decision run starts.

use crate::decision::DecisionEngine;
use crate::models::DecisionWindow;
use crate::{FlightWxError, Result};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Shortest backoff before a retried weather request
pub const RETRY_BACKOFF_MIN: std::time::Duration = std::time::Duration::from_millis(500);
/// Longest backoff before a retried weather request
pub const RETRY_BACKOFF_MAX: std::time::Duration = std::time::Duration::from_secs(2);

/// Root configuration structure for `FlightWx`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightWxConfig {
    /// Station the flight is planned around
    #[serde(default)]
    pub target: TargetConfig,
    /// Altitude band of the flight
    #[serde(default)]
    pub flight: FlightConfig,
    /// When the flight is planned
    #[serde(default)]
    pub window: WindowConfig,
    /// Weather data source settings
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Station catalog settings
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Target station and candidate search radius
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Station identifier of the primary field
    #[serde(default = "default_target_station")]
    pub station: String,
    /// Candidate radius in nautical miles
    #[serde(default = "default_radius_nm")]
    pub radius_nm: f64,
}

/// Altitude requirements of the flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightConfig {
    /// Planned collection altitude in feet
    #[serde(default = "default_collection_altitude")]
    pub collection_altitude_ft: i32,
    /// Required clearance between the collection altitude and the ceiling
    #[serde(default = "default_clearance_margin")]
    pub clearance_margin_ft: i32,
}

/// Decision window settings
///
/// Either `start`/`end` as RFC 3339 timestamps, or local wall-clock times
/// `day_offset` days after today in `timezone`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// IANA timezone of the local times
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Local start time (HH:MM)
    #[serde(default = "default_start_time")]
    pub start_time: String,
    /// Local end time (HH:MM)
    #[serde(default = "default_end_time")]
    pub end_time: String,
    /// Days after today, 0 = today
    #[serde(default = "default_day_offset")]
    pub day_offset: u32,
    /// Explicit window start overriding the local times
    #[serde(default)]
    pub start: Option<String>,
    /// Explicit window end overriding the local times
    #[serde(default)]
    pub end: Option<String>,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the aviation weather data API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Per-fetch timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Retries per fetch on transient failures (0 or 1)
    #[serde(default = "default_weather_max_retries")]
    pub max_retries: u32,
    /// Fetches in flight at once
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: u32,
    /// User-Agent header sent to the API
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Station catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to an OurAirports style airports CSV
    #[serde(default = "default_catalog_path")]
    pub path: String,
    /// Only keep stations in this ISO country
    #[serde(default)]
    pub country: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_target_station() -> String {
    "KVYS".to_string()
}

fn default_radius_nm() -> f64 {
    50.0
}

fn default_collection_altitude() -> i32 {
    8000
}

fn default_clearance_margin() -> i32 {
    500
}

fn default_timezone() -> String {
    "America/Chicago".to_string()
}

fn default_start_time() -> String {
    "08:00".to_string()
}

fn default_end_time() -> String {
    "18:00".to_string()
}

fn default_day_offset() -> u32 {
    1
}

fn default_weather_base_url() -> String {
    "https://aviationweather.gov/api/data".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_weather_max_retries() -> u32 {
    1
}

fn default_max_concurrent_requests() -> u32 {
    8
}

fn default_user_agent() -> String {
    format!("FlightWx/{}", env!("CARGO_PKG_VERSION"))
}

fn default_catalog_path() -> String {
    "data/stations.csv".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            station: default_target_station(),
            radius_nm: default_radius_nm(),
        }
    }
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            collection_altitude_ft: default_collection_altitude(),
            clearance_margin_ft: default_clearance_margin(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            start_time: default_start_time(),
            end_time: default_end_time(),
            day_offset: default_day_offset(),
            start: None,
            end: None,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            max_retries: default_weather_max_retries(),
            max_concurrent_requests: default_max_concurrent_requests(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            country: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl WeatherConfig {
    /// Upper bound on one fetch: every attempt may use its full timeout,
    /// plus the backoff sleep before each retry
    #[must_use]
    pub fn fetch_budget(&self) -> std::time::Duration {
        let attempts = self.max_retries + 1;
        std::time::Duration::from_secs(u64::from(self.timeout_seconds)) * attempts
            + RETRY_BACKOFF_MAX * self.max_retries
    }
}

impl FlightWxConfig {
    /// Load configuration from specified path.
    ///
    /// Environment variables override the file, e.g.
    /// `FLIGHTWX_TARGET__STATION=KPIA`.
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("FLIGHTWX")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build().map_err(|e| {
            FlightWxError::config(format!(
                "Failed to build configuration from {}: {e}",
                config_file.display()
            ))
        })?;

        let mut config: FlightWxConfig = settings
            .try_deserialize()
            .map_err(|e| FlightWxError::config(format!("Failed to deserialize configuration: {e}")))?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("flightwx").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.target.station.trim().is_empty() {
            self.target.station = default_target_station();
        }
        self.target.station = self.target.station.trim().to_ascii_uppercase();
        if self.window.timezone.is_empty() {
            self.window.timezone = default_timezone();
        }
        if self.window.start_time.is_empty() {
            self.window.start_time = default_start_time();
        }
        if self.window.end_time.is_empty() {
            self.window.end_time = default_end_time();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.weather.max_concurrent_requests == 0 {
            self.weather.max_concurrent_requests = default_max_concurrent_requests();
        }
        if self.weather.user_agent.is_empty() {
            self.weather.user_agent = default_user_agent();
        }
        if self.catalog.path.is_empty() {
            self.catalog.path = default_catalog_path();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_window()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if !self.target.radius_nm.is_finite() || self.target.radius_nm <= 0.0 {
            return Err(FlightWxError::validation("Candidate radius must be a positive number of NM"));
        }

        if self.target.radius_nm > 500.0 {
            return Err(FlightWxError::validation("Candidate radius cannot exceed 500 NM"));
        }

        if self.flight.collection_altitude_ft < 0 || self.flight.clearance_margin_ft < 0 {
            return Err(FlightWxError::validation(
                "Collection altitude and clearance margin cannot be negative",
            ));
        }

        if self.flight.collection_altitude_ft > 60_000 {
            return Err(FlightWxError::validation("Collection altitude cannot exceed 60000 ft"));
        }

        if self.flight.clearance_margin_ft > 10_000 {
            return Err(FlightWxError::validation("Clearance margin cannot exceed 10000 ft"));
        }

        DecisionEngine::new(self.flight.collection_altitude_ft, self.flight.clearance_margin_ft)?;

        if self.weather.timeout_seconds > 120 {
            return Err(FlightWxError::validation("Weather API timeout cannot exceed 120 seconds"));
        }

        if self.weather.max_retries > 1 {
            return Err(FlightWxError::validation("Weather API max retries cannot exceed 1"));
        }

        if self.weather.max_concurrent_requests > 64 {
            return Err(FlightWxError::validation("Concurrent weather requests cannot exceed 64"));
        }

        if self.window.day_offset > 7 {
            return Err(FlightWxError::validation(
                "Decision window cannot be more than 7 days ahead",
            ));
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        if !self
            .target
            .station
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
        {
            return Err(FlightWxError::validation(format!(
                "Invalid target station '{}'",
                self.target.station
            )));
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(FlightWxError::validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(FlightWxError::validation(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            )));
        }

        if !self.weather.base_url.starts_with("http://") && !self.weather.base_url.starts_with("https://") {
            return Err(FlightWxError::validation(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            ));
        }

        Ok(())
    }

    fn validate_window(&self) -> Result<()> {
        // Any fixed instant exercises timezone and time parsing
        self.decision_window(DateTime::<Utc>::UNIX_EPOCH).map(|_| ())
    }

    /// Build the decision window relative to `now`
    pub fn decision_window(&self, now: DateTime<Utc>) -> Result<DecisionWindow> {
        match (&self.window.start, &self.window.end) {
            (Some(start), Some(end)) => DecisionWindow::new(parse_instant(start)?, parse_instant(end)?),
            (None, None) => {
                let tz: Tz = self.window.timezone.parse().map_err(|_| {
                    FlightWxError::validation(format!("Unknown timezone '{}'", self.window.timezone))
                })?;
                let start = parse_time_of_day(&self.window.start_time)?;
                let end = parse_time_of_day(&self.window.end_time)?;
                let date = now.with_timezone(&tz).date_naive()
                    + Duration::days(i64::from(self.window.day_offset));
                DecisionWindow::for_local_day(date, start, end, tz)
            }
            _ => Err(FlightWxError::validation(
                "Window start and end must be given together",
            )),
        }
    }
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| FlightWxError::validation(format!("Invalid timestamp '{value}': {e}")))
}

fn parse_time_of_day(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| FlightWxError::validation(format!("Invalid time of day '{value}': {e}")))
}
