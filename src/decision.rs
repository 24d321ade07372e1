//! Threshold decision per station and fail-closed aggregation

use serde::{Deserialize, Serialize};

use crate::models::{FleetDecision, GoNoGo, Resolution, Station, StationDecision};
use crate::{FlightWxError, Result};

/// Applies the cloud-base threshold to resolved stations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionEngine {
    threshold_ft: i32,
}

impl DecisionEngine {
    /// Threshold is the collection altitude plus the required clearance margin
    pub fn new(collection_altitude_ft: i32, clearance_margin_ft: i32) -> Result<Self> {
        let threshold_ft = collection_altitude_ft
            .checked_add(clearance_margin_ft)
            .ok_or_else(|| {
                FlightWxError::validation(format!(
                    "Collection altitude {collection_altitude_ft} ft plus margin {clearance_margin_ft} ft is out of range"
                ))
            })?;
        Ok(Self { threshold_ft })
    }

    #[must_use]
    pub fn with_threshold(threshold_ft: i32) -> Self {
        Self { threshold_ft }
    }

    #[must_use]
    pub fn threshold_ft(&self) -> i32 {
        self.threshold_ft
    }

    /// GO only when a base was resolved and it is at or above the threshold
    #[must_use]
    pub fn decide(&self, station: &Station, resolution: Option<&Resolution>) -> StationDecision {
        let status = match resolution {
            Some(resolved) if resolved.cloud_base_ft >= self.threshold_ft => GoNoGo::Go,
            _ => GoNoGo::NoGo,
        };

        StationDecision {
            station_id: station.id.clone(),
            cloud_base_ft: resolution.map(|r| r.cloud_base_ft),
            source_station_id: resolution.map(|r| r.source_station_id.clone()),
            source_distance_nm: resolution.map(|r| r.distance_nm),
            status,
        }
    }

    /// GO iff there is at least one decision and every decision is GO
    #[must_use]
    pub fn aggregate(decisions: Vec<StationDecision>) -> FleetDecision {
        let all_go = !decisions.is_empty() && decisions.iter().all(|d| d.status.is_go());
        FleetDecision {
            status: if all_go { GoNoGo::Go } else { GoNoGo::NoGo },
            decisions,
        }
    }
}
