//! FlightWx CLI
//!
//! Prints a cloud ceiling Go/No-Go report for the configured target field.
//!
//! Usage:
//!   flightwx --station KVYS --radius-nm 50
//!   flightwx --fixture data/fixtures/sample_weather.json --json
//!
//! Exit status: 0 on GO, 2 on NO-GO, 1 on error.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use flightwx::config::LoggingConfig;
use flightwx::{
    AviationWeatherClient, FlightWxConfig, FlightWxError, GeoIndex, GoNoGo, GoNoGoService, RecordedWeather,
    WeatherSource, catalog,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(
    name = "flightwx",
    version,
    about = "Cloud ceiling Go/No-Go for aerial collection flights"
)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target station identifier, overrides the configuration
    #[arg(short, long)]
    station: Option<String>,

    /// Candidate radius in nautical miles, overrides the configuration
    #[arg(short, long)]
    radius_nm: Option<f64>,

    /// Replay recorded weather from a JSON file instead of the live API
    #[arg(short, long)]
    fixture: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(GoNoGo::Go) => ExitCode::SUCCESS,
        Ok(GoNoGo::NoGo) => ExitCode::from(2),
        Err(e) => {
            match e.downcast_ref::<FlightWxError>() {
                Some(err) => eprintln!("{}\n  caused by: {e:#}", err.user_message()),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> Result<GoNoGo> {
    let mut config = FlightWxConfig::load_from_path(args.config).context("Failed to load configuration")?;
    if let Some(station) = args.station {
        config.target.station = station;
    }
    if let Some(radius_nm) = args.radius_nm {
        config.target.radius_nm = radius_nm;
    }
    if args.verbose {
        config.logging.level = "debug".to_string();
    }
    config.apply_defaults();
    config.validate()?;

    init_logging(&config.logging);

    let window = config.decision_window(Utc::now())?;
    info!(
        "Decision window {} to {} ({} h)",
        window.start,
        window.end,
        window.duration().num_hours()
    );

    let stations = catalog::load_stations(Path::new(&config.catalog.path), config.catalog.country.as_deref())
        .context("Failed to load station catalog")?;
    let index = GeoIndex::new(stations)?;
    if index.is_empty() {
        return Err(FlightWxError::catalog(format!("No usable stations in {}", config.catalog.path)).into());
    }
    info!("Indexed {} stations", index.len());

    let source: Arc<dyn WeatherSource> = match &args.fixture {
        Some(path) => Arc::new(RecordedWeather::load(path)?),
        None => Arc::new(AviationWeatherClient::new(&config.weather)?),
    };

    let service = GoNoGoService::new(&config, index, source)?;
    let report = service.run(&config.target.station, &window).await?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
    }

    Ok(report.status)
}

/// Logs go to stderr; `RUST_LOG` takes precedence over the configured level
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer).init();
    }
}
