//! `FlightWx` - cloud ceiling Go/No-Go decisions for aerial collection flights
//!
//! This library selects the weather stations around a target field, finds
//! the governing forecast cloud base for each of them (borrowing the nearest
//! available TAF when a station has none) and reduces the results to a
//! single fail-closed Go/No-Go decision.

pub mod catalog;
pub mod config;
pub mod decision;
pub mod error;
pub mod extractor;
pub mod geo;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod weather;

// Re-export core types for public API
pub use config::FlightWxConfig;
pub use decision::DecisionEngine;
pub use error::FlightWxError;
pub use extractor::governing_cloud_base;
pub use geo::{GeoIndex, NearbyStation};
pub use models::{DecisionWindow, FleetDecision, GoNoGo, Station, StationDecision};
pub use pipeline::GoNoGoService;
pub use report::{GoNoGoReport, ReportAssembler};
pub use resolver::TafResolver;
pub use weather::{AviationWeatherClient, FetchError, RecordedWeather, WeatherSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, FlightWxError>;
