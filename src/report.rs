//! Decision report for presentation
//!
//! Packages the fleet decision with display-only context (observed
//! conditions, distances, forecast provenance). No decision logic lives here.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::geo::NearbyStation;
use crate::models::{
    DecisionWindow, FleetDecision, FlightCategory, GoNoGo, ObservationRecord, Station, StationDecision,
};

/// One station line of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRow {
    pub name: String,
    /// Distance from the target station
    pub distance_nm: f64,
    pub flight_category: Option<FlightCategory>,
    /// Lowest BKN/OVC base in the current observation, feet AGL
    pub observed_ceiling_ft: Option<i32>,
    #[serde(flatten)]
    pub decision: StationDecision,
}

impl StationRow {
    /// Which forecast governed this station
    #[must_use]
    pub fn taf_used(&self) -> String {
        match (&self.decision.source_station_id, self.decision.source_distance_nm) {
            (Some(source), _) if *source == self.decision.station_id => "Own TAF".to_string(),
            (Some(source), Some(distance)) => format!("{source} ({distance:.0} NM away)"),
            (Some(source), None) => source.clone(),
            (None, _) => "No TAF available".to_string(),
        }
    }
}

/// Full result of one Go/No-Go run
#[derive(Debug, Clone, Serialize)]
pub struct GoNoGoReport {
    pub generated_at: DateTime<Utc>,
    pub target_id: String,
    pub target_name: String,
    pub radius_nm: f64,
    pub threshold_ft: i32,
    pub window: DecisionWindow,
    /// Raw METAR of the target station, if one was fetched
    pub primary_observation: Option<String>,
    pub status: GoNoGo,
    pub stations: Vec<StationRow>,
}

impl GoNoGoReport {
    #[must_use]
    pub fn station(&self, id: &str) -> Option<&StationRow> {
        self.stations.iter().find(|row| row.decision.station_id == id)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Builds a [`GoNoGoReport`] around a target station
pub struct ReportAssembler<'a> {
    target: &'a Station,
    radius_nm: f64,
    threshold_ft: i32,
    window: DecisionWindow,
}

impl<'a> ReportAssembler<'a> {
    #[must_use]
    pub fn new(target: &'a Station, radius_nm: f64, threshold_ft: i32, window: DecisionWindow) -> Self {
        Self {
            target,
            radius_nm,
            threshold_ft,
            window,
        }
    }

    /// Rows follow the order of `fleet.decisions`.
    ///
    /// `nearby` carries names and distances from the target; stations missing
    /// from it keep their id as name.
    #[must_use]
    pub fn assemble(
        &self,
        fleet: FleetDecision,
        nearby: &[NearbyStation<'_>],
        observations: &HashMap<String, ObservationRecord>,
    ) -> GoNoGoReport {
        let by_id: HashMap<&str, &NearbyStation<'_>> =
            nearby.iter().map(|n| (n.station.id.as_str(), n)).collect();

        let stations = fleet
            .decisions
            .into_iter()
            .map(|decision| {
                let near = by_id.get(decision.station_id.as_str());
                let observation = observations.get(&decision.station_id);
                StationRow {
                    name: near.map_or_else(|| decision.station_id.clone(), |n| n.station.name.clone()),
                    distance_nm: near.map_or(0.0, |n| n.distance_nm),
                    flight_category: observation.and_then(|o| o.flight_category),
                    observed_ceiling_ft: observation
                        .and_then(|o| o.observed_ceiling(near.and_then(|n| n.station.elevation_ft))),
                    decision,
                }
            })
            .collect();

        GoNoGoReport {
            generated_at: Utc::now(),
            target_id: self.target.id.clone(),
            target_name: self.target.name.clone(),
            radius_nm: self.radius_nm,
            threshold_ft: self.threshold_ft,
            window: self.window,
            primary_observation: observations
                .get(&self.target.id)
                .map(|o| o.raw_text.clone())
                .filter(|raw| !raw.is_empty()),
            status: fleet.status,
            stations,
        }
    }
}

fn feet(value: Option<i32>) -> String {
    value.map_or_else(|| "-".to_string(), |ft| ft.to_string())
}

impl fmt::Display for GoNoGoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cloud ceiling Go/No-Go for {} ({})", self.target_id, self.target_name)?;
        writeln!(
            f,
            "Window: {} to {}",
            self.window.start.format("%Y-%m-%d %H:%M UTC"),
            self.window.end.format("%Y-%m-%d %H:%M UTC")
        )?;
        writeln!(
            f,
            "Required cloud base: {} ft AGL, stations within {:.0} NM",
            self.threshold_ft, self.radius_nm
        )?;
        if let Some(raw) = &self.primary_observation {
            writeln!(f, "Current METAR: {raw}")?;
        }
        writeln!(f)?;
        writeln!(f, "Overall: {} {}", self.status.emoji(), self.status)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<6} {:<28} {:>6} {:<5} {:>9} {:>9}  {:<22} {}",
            "ID", "Name", "NM", "Cat", "Obs ceil", "Fcst base", "TAF used", "Status"
        )?;
        for row in &self.stations {
            let name: String = row.name.chars().take(28).collect();
            writeln!(
                f,
                "{:<6} {:<28} {:>6.1} {:<5} {:>9} {:>9}  {:<22} {}",
                row.decision.station_id,
                name,
                row.distance_nm,
                row.flight_category.map_or_else(|| "-".to_string(), |c| c.to_string()),
                feet(row.observed_ceiling_ft),
                feet(row.decision.cloud_base_ft),
                row.taf_used(),
                row.decision.status
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::DecisionEngine;
    use crate::models::{CloudCover, CloudLayer, Resolution};
    use chrono::TimeZone;

    fn window() -> DecisionWindow {
        DecisionWindow::new(
            Utc.with_ymd_and_hms(2025, 6, 14, 13, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 14, 23, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn stations() -> (Station, Station) {
        (
            Station::new("KVYS", "Illinois Valley Regional", 41.3519, -89.1531).with_elevation(654),
            Station::new("KC75", "Marshall County", 41.0193, -89.3864),
        )
    }

    fn report() -> GoNoGoReport {
        let (kvys, kc75) = stations();
        let engine = DecisionEngine::new(8000, 500).unwrap();
        let own = Resolution {
            source_station_id: "KVYS".to_string(),
            distance_nm: 0.0,
            cloud_base_ft: 9000,
        };
        let borrowed = Resolution {
            source_station_id: "KPIA".to_string(),
            distance_nm: 24.6,
            cloud_base_ft: 7000,
        };
        let fleet = DecisionEngine::aggregate(vec![
            engine.decide(&kvys, Some(&own)),
            engine.decide(&kc75, Some(&borrowed)),
        ]);
        let nearby = vec![
            NearbyStation {
                station: &kvys,
                distance_nm: 0.0,
            },
            NearbyStation {
                station: &kc75,
                distance_nm: 21.3,
            },
        ];
        let observations: HashMap<String, ObservationRecord> = [(
            "KVYS".to_string(),
            ObservationRecord {
                station_id: "KVYS".to_string(),
                raw_text: "KVYS 141753Z AUTO 21008KT 10SM BKN065 24/14 A3001".to_string(),
                flight_category: Some(FlightCategory::Vfr),
                observed_at: None,
                clouds: vec![CloudLayer::agl(CloudCover::Broken, 6500)],
            },
        )]
        .into_iter()
        .collect();

        ReportAssembler::new(&kvys, 50.0, engine.threshold_ft(), window()).assemble(fleet, &nearby, &observations)
    }

    #[test]
    fn test_rows_keep_decision_order_and_context() {
        let report = report();
        assert_eq!(report.status, GoNoGo::NoGo);
        assert_eq!(report.stations.len(), 2);
        assert_eq!(report.stations[0].decision.station_id, "KVYS");
        assert_eq!(report.stations[0].flight_category, Some(FlightCategory::Vfr));
        assert_eq!(report.stations[0].observed_ceiling_ft, Some(6500));
        assert_eq!(report.stations[1].name, "Marshall County");
        assert_eq!(report.stations[1].distance_nm, 21.3);
        assert_eq!(report.stations[1].flight_category, None);
        assert!(report.primary_observation.as_deref().unwrap().starts_with("KVYS"));
    }

    #[test]
    fn test_taf_used_text() {
        let report = report();
        assert_eq!(report.station("KVYS").unwrap().taf_used(), "Own TAF");
        assert_eq!(report.station("KC75").unwrap().taf_used(), "KPIA (25 NM away)");

        let mut unresolved = report.stations[1].clone();
        unresolved.decision.source_station_id = None;
        unresolved.decision.source_distance_nm = None;
        assert_eq!(unresolved.taf_used(), "No TAF available");
    }

    #[test]
    fn test_text_rendering() {
        let text = report().to_string();
        assert!(text.contains("Cloud ceiling Go/No-Go for KVYS"));
        assert!(text.contains("Required cloud base: 8500 ft AGL"));
        assert!(text.contains("Current METAR: KVYS 141753Z"));
        assert!(text.contains("NO-GO"));
        assert!(text.contains("KPIA (25 NM away)"));
    }

    #[test]
    fn test_json_rendering() {
        let json: serde_json::Value = serde_json::from_str(&report().to_json().unwrap()).unwrap();
        assert_eq!(json["status"], "NO-GO");
        assert_eq!(json["threshold_ft"], 8500);
        assert_eq!(json["stations"][1]["station_id"], "KC75");
        assert_eq!(json["stations"][1]["source_station_id"], "KPIA");
        assert_eq!(json["stations"][0]["flight_category"], "VFR");
    }
}
