//! Integration tests for the FlightWx decision pipeline and CLI

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use flightwx::models::{CloudCover, CloudLayer, ForecastPeriod, ForecastRecord, ObservationRecord};
use flightwx::weather::FetchResult;
use flightwx::{
    DecisionWindow, FetchError, FlightWxConfig, FlightWxError, GeoIndex, GoNoGo, GoNoGoService, RecordedWeather,
    WeatherSource, catalog,
};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn data_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 14, 0, 0, 0).unwrap() + chrono::Duration::hours(i64::from(hour))
}

/// 08:00 to 18:00 CDT on 2025-06-14
fn window() -> DecisionWindow {
    DecisionWindow::new(at(13), at(23)).unwrap()
}

fn index() -> GeoIndex {
    let stations = catalog::load_stations(&data_path("data/stations.csv"), Some("US")).unwrap();
    GeoIndex::new(stations).unwrap()
}

fn taf(id: &str, periods: Vec<(u32, u32, Vec<CloudLayer>)>) -> ForecastRecord {
    ForecastRecord::new(
        id,
        periods
            .into_iter()
            .map(|(from, to, clouds)| ForecastPeriod::new(at(from), at(to), clouds))
            .collect(),
    )
}

fn all_day(id: &str, cover: CloudCover, base: i32) -> ForecastRecord {
    taf(id, vec![(12, 36, vec![CloudLayer::agl(cover, base)])])
}

/// Test double with per-station failure modes
#[derive(Default)]
struct ScriptedSource {
    forecasts: HashMap<String, ForecastRecord>,
    hanging: HashSet<String>,
    failing: HashSet<String>,
    hanging_observations: HashSet<String>,
    failing_observations: HashSet<String>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn with_forecast(mut self, forecast: ForecastRecord) -> Self {
        self.forecasts.insert(forecast.station_id.clone(), forecast);
        self
    }

    fn hanging(mut self, id: &str) -> Self {
        self.hanging.insert(id.to_string());
        self
    }

    fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    fn hanging_observation(mut self, id: &str) -> Self {
        self.hanging_observations.insert(id.to_string());
        self
    }

    fn failing_observation(mut self, id: &str) -> Self {
        self.failing_observations.insert(id.to_string());
        self
    }
}

#[async_trait]
impl WeatherSource for ScriptedSource {
    async fn fetch_observation(&self, station_id: &str) -> FetchResult<ObservationRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hanging_observations.contains(station_id) {
            std::future::pending::<()>().await;
        }
        if self.failing_observations.contains(station_id) {
            return Err(FetchError::Network(format!("connection reset fetching {station_id}")));
        }
        Ok(ObservationRecord {
            station_id: station_id.to_string(),
            raw_text: format!("{station_id} 141255Z AUTO 20009KT 10SM CLR 22/14 A3002"),
            flight_category: None,
            observed_at: None,
            clouds: vec![],
        })
    }

    async fn fetch_forecast(&self, station_id: &str) -> FetchResult<ForecastRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hanging.contains(station_id) {
            std::future::pending::<()>().await;
        }
        if self.failing.contains(station_id) {
            return Err(FetchError::Network(format!("connection reset fetching {station_id}")));
        }
        self.forecasts
            .get(station_id)
            .cloned()
            .ok_or_else(|| FetchError::NotAvailable(station_id.to_string()))
    }
}

fn service(source: Arc<dyn WeatherSource>) -> GoNoGoService {
    GoNoGoService::new(&FlightWxConfig::default(), index(), source)
        .unwrap()
        .with_fetch_timeout(Duration::from_millis(200))
}

#[tokio::test]
async fn test_lowest_overlapping_ceiling_decides() {
    let source = ScriptedSource::default().with_forecast(taf(
        "KVYS",
        vec![
            (11, 15, vec![CloudLayer::agl(CloudCover::Overcast, 9000)]),
            (15, 25, vec![CloudLayer::agl(CloudCover::Broken, 7000)]),
        ],
    ));
    let report = service(Arc::new(source)).run("KVYS", &window()).await.unwrap();

    let kvys = report.station("KVYS").unwrap();
    assert_eq!(kvys.decision.cloud_base_ft, Some(7000));
    assert_eq!(kvys.decision.status, GoNoGo::NoGo);
    assert_eq!(report.status, GoNoGo::NoGo);
}

#[tokio::test]
async fn test_fallback_skips_candidate_without_ceiling() {
    let source = ScriptedSource::default()
        .with_forecast(all_day("KVYS", CloudCover::Scattered, 4000))
        .with_forecast(all_day("KPIA", CloudCover::Overcast, 9000));
    let report = service(Arc::new(source)).run("KVYS", &window()).await.unwrap();

    let kc75 = report.station("KC75").unwrap();
    assert_eq!(kc75.decision.source_station_id.as_deref(), Some("KPIA"));
    assert_eq!(kc75.decision.cloud_base_ft, Some(9000));
    let distance = kc75.decision.source_distance_nm.unwrap();
    assert!((distance - 25.5).abs() < 0.5, "got {distance}");
    assert_eq!(kc75.decision.status, GoNoGo::Go);
}

#[tokio::test]
async fn test_threshold_is_inclusive_for_the_fleet() {
    let source = ScriptedSource::default().with_forecast(all_day("KPIA", CloudCover::Broken, 8500));
    let report = service(Arc::new(source)).run("KVYS", &window()).await.unwrap();

    assert_eq!(report.status, GoNoGo::Go);
    assert_eq!(report.stations.len(), 8);
    assert!(report.stations.iter().all(|row| row.decision.cloud_base_ft == Some(8500)));
}

#[tokio::test]
async fn test_hanging_fetch_degrades_only_that_station() {
    let source = ScriptedSource::default()
        .with_forecast(all_day("KVYS", CloudCover::Overcast, 3000))
        .with_forecast(all_day("KPIA", CloudCover::Overcast, 9500))
        .hanging("KVYS");
    let report = service(Arc::new(source)).run("KVYS", &window()).await.unwrap();

    // KVYS's own low forecast never arrived, so it borrows from KPIA
    let kvys = report.station("KVYS").unwrap();
    assert_eq!(kvys.decision.source_station_id.as_deref(), Some("KPIA"));
    assert_eq!(kvys.decision.cloud_base_ft, Some(9500));
    assert_eq!(report.stations.len(), 8);
    assert_eq!(report.status, GoNoGo::Go);
}

#[tokio::test]
async fn test_network_failure_is_treated_as_unavailable() {
    let source = ScriptedSource::default()
        .with_forecast(all_day("KPIA", CloudCover::Overcast, 9500))
        .failing("KPIA");
    let report = service(Arc::new(source)).run("KVYS", &window()).await.unwrap();

    assert!(report.stations.iter().all(|row| !row.decision.is_resolved()));
    assert!(report.stations.iter().all(|row| row.taf_used() == "No TAF available"));
    assert_eq!(report.status, GoNoGo::NoGo);
}

#[tokio::test]
async fn test_observation_failures_leave_decisions_unchanged() {
    let forecasts = || {
        ScriptedSource::default()
            .with_forecast(all_day("KVYS", CloudCover::Overcast, 9000))
            .with_forecast(all_day("KPIA", CloudCover::Broken, 7000))
    };
    let baseline = service(Arc::new(forecasts())).run("KVYS", &window()).await.unwrap();
    assert!(baseline.primary_observation.is_some());

    let degraded_source = forecasts().hanging_observation("KVYS").failing_observation("KPIA");
    let degraded = service(Arc::new(degraded_source)).run("KVYS", &window()).await.unwrap();

    assert!(degraded.primary_observation.is_none());
    assert_eq!(degraded.status, baseline.status);
    assert_eq!(degraded.stations.len(), baseline.stations.len());
    for (row, expected) in degraded.stations.iter().zip(&baseline.stations) {
        assert_eq!(row.decision, expected.decision);
    }
    assert_eq!(degraded.station("KPIA").unwrap().decision.cloud_base_ft, Some(7000));
}

#[tokio::test]
async fn test_only_stations_in_radius_are_fetched() {
    let source = Arc::new(ScriptedSource::default());
    let report = service(source.clone()).run("KVYS", &window()).await.unwrap();

    assert!(report.station("KMLI").is_none());
    assert!(report.station("KBMI").is_none());
    assert_eq!(source.calls.load(Ordering::SeqCst), 2 * report.stations.len());
    let distances: Vec<f64> = report.stations.iter().map(|row| row.distance_nm).collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_unknown_target_fails_before_fetching() {
    let source = Arc::new(ScriptedSource::default());
    let err = service(source.clone()).run("KXXX", &window()).await.unwrap_err();
    assert!(matches!(err, FlightWxError::Validation { .. }));
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_sample_fixture_run() {
    let recorded = RecordedWeather::load(&data_path("data/fixtures/sample_weather.json")).unwrap();
    let report = service(Arc::new(recorded)).run("KVYS", &window()).await.unwrap();

    assert_eq!(report.status, GoNoGo::Go);
    assert!(report.stations.iter().all(|row| row.decision.cloud_base_ft == Some(9000)));
    assert!(report.primary_observation.as_deref().unwrap().starts_with("KVYS"));
    assert_eq!(report.station("KVYS").unwrap().observed_ceiling_ft, Some(9500));
}

fn cli_config(collection_altitude_ft: i32) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[flight]
collection_altitude_ft = {collection_altitude_ft}

[window]
start = "2025-06-14T08:00:00-05:00"
end = "2025-06-14T18:00:00-05:00"

[catalog]
path = "{}"

[logging]
level = "warn"
"#,
        data_path("data/stations.csv").display()
    )
    .unwrap();
    file
}

fn run_cli(config: &tempfile::NamedTempFile) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_flightwx"))
        .arg("--config")
        .arg(config.path())
        .arg("--fixture")
        .arg(data_path("data/fixtures/sample_weather.json"))
        .arg("--json")
        .output()
        .expect("Failed to execute flightwx")
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_flightwx"))
        .arg("--help")
        .output()
        .expect("Failed to execute flightwx");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Go/No-Go"));
    assert!(stdout.contains("--fixture"));
}

#[test]
fn test_cli_go_exits_zero_with_json_report() {
    let config = cli_config(8000);
    let output = run_cli(&config);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"], "GO");
    assert_eq!(report["target_id"], "KVYS");
    assert_eq!(report["stations"].as_array().unwrap().len(), 8);
}

#[test]
fn test_cli_no_go_exits_two() {
    let config = cli_config(9000);
    let output = run_cli(&config);

    assert_eq!(output.status.code(), Some(2));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"], "NO-GO");
    assert_eq!(report["threshold_ft"], 9500);
}

#[test]
fn test_cli_invalid_config_exits_one() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[target]\nradius_nm = -5").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_flightwx"))
        .arg("--config")
        .arg(file.path())
        .output()
        .expect("Failed to execute flightwx");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("radius"));
}
