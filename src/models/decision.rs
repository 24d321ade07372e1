//! Go/No-Go decision values handed to the report boundary

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary flight decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoNoGo {
    #[serde(rename = "GO")]
    Go,
    #[serde(rename = "NO-GO")]
    NoGo,
}

impl GoNoGo {
    #[must_use]
    pub fn is_go(self) -> bool {
        matches!(self, GoNoGo::Go)
    }

    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            GoNoGo::Go => "✅",
            GoNoGo::NoGo => "❌",
        }
    }
}

impl fmt::Display for GoNoGo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoNoGo::Go => write!(f, "GO"),
            GoNoGo::NoGo => write!(f, "NO-GO"),
        }
    }
}

/// Governing cloud base found for a station, and where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Station whose forecast produced the altitude
    pub source_station_id: String,
    /// Distance to the source station in NM, 0 for the station itself
    pub distance_nm: f64,
    /// Governing cloud base in feet AGL at the source station
    pub cloud_base_ft: i32,
}

/// Decision for a single station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationDecision {
    pub station_id: String,
    pub cloud_base_ft: Option<i32>,
    pub source_station_id: Option<String>,
    pub source_distance_nm: Option<f64>,
    pub status: GoNoGo,
}

impl StationDecision {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.cloud_base_ft.is_some()
    }

    /// True when the governing base came from another station's forecast
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.source_station_id
            .as_deref()
            .is_some_and(|source| source != self.station_id)
    }
}

/// Aggregate decision over every station in the region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetDecision {
    pub status: GoNoGo,
    pub decisions: Vec<StationDecision>,
}

impl FleetDecision {
    /// Stations that failed the threshold or could not be resolved
    pub fn blocking(&self) -> impl Iterator<Item = &StationDecision> {
        self.decisions.iter().filter(|d| !d.status.is_go())
    }
}
