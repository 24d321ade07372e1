//! Data models for the FlightWx engine
//!
//! This module contains the core domain models organized by concern:
//! - Station: reporting points and their coordinates
//! - Clouds: cloud layers, cover categories and base normalization
//! - Forecast: TAF periods, records and the decision window
//! - Observation: METAR records and flight categories
//! - Decision: per-station and fleet-wide Go/No-Go results

pub mod clouds;
pub mod decision;
pub mod forecast;
pub mod observation;
pub mod station;

// Re-export all public types for convenient access
pub use clouds::{CloudBase, CloudCover, CloudLayer};
pub use decision::{FleetDecision, GoNoGo, Resolution, StationDecision};
pub use forecast::{DecisionWindow, ForecastPeriod, ForecastRecord};
pub use observation::{FlightCategory, ObservationRecord};
pub use station::{Coordinate, Station};
