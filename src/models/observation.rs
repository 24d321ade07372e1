//! Current-conditions observation (METAR) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::CloudLayer;
use super::clouds::lowest_ceiling;

/// FAA flight category reported alongside a METAR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlightCategory {
    Vfr,
    Mvfr,
    Ifr,
    Lifr,
}

impl FlightCategory {
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "VFR" => Some(FlightCategory::Vfr),
            "MVFR" => Some(FlightCategory::Mvfr),
            "IFR" => Some(FlightCategory::Ifr),
            "LIFR" => Some(FlightCategory::Lifr),
            _ => None,
        }
    }
}

impl fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightCategory::Vfr => write!(f, "VFR"),
            FlightCategory::Mvfr => write!(f, "MVFR"),
            FlightCategory::Ifr => write!(f, "IFR"),
            FlightCategory::Lifr => write!(f, "LIFR"),
        }
    }
}

/// Routine observation for one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub station_id: String,
    pub raw_text: String,
    #[serde(default)]
    pub flight_category: Option<FlightCategory>,
    #[serde(default)]
    pub observed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub clouds: Vec<CloudLayer>,
}

impl ObservationRecord {
    /// Lowest observed ceiling in feet AGL, display only
    #[must_use]
    pub fn observed_ceiling(&self, elevation_ft: Option<i32>) -> Option<i32> {
        lowest_ceiling(&self.clouds, elevation_ft)
    }
}
