//! Terminal forecast model and the flight decision window

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::CloudLayer;
use crate::{FlightWxError, Result};

/// Half-open interval `[start, end)` during which the flight is planned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DecisionWindow {
    /// Create a window, rejecting empty or inverted intervals
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(FlightWxError::validation(format!(
                "Decision window start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window between two local wall-clock times on `date` in `tz`
    pub fn for_local_day(date: NaiveDate, start: NaiveTime, end: NaiveTime, tz: Tz) -> Result<Self> {
        let to_utc = |time: NaiveTime| {
            tz.from_local_datetime(&date.and_time(time))
                .earliest()
                .map(|local| local.with_timezone(&Utc))
                .ok_or_else(|| {
                    FlightWxError::validation(format!(
                        "Local time {date} {time} does not exist in {tz}"
                    ))
                })
        };
        Self::new(to_utc(start)?, to_utc(end)?)
    }

    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

/// One forecast group of a TAF, valid over `[from, to)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Change indicator (FM, BECMG, TEMPO, PROB30, ...), display only
    #[serde(default)]
    pub change: Option<String>,
    #[serde(default)]
    pub clouds: Vec<CloudLayer>,
}

impl ForecastPeriod {
    #[must_use]
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>, clouds: Vec<CloudLayer>) -> Self {
        Self {
            from,
            to,
            change: None,
            clouds,
        }
    }

    /// Half-open overlap test; periods that only touch the window do not overlap
    #[must_use]
    pub fn overlaps(&self, window: &DecisionWindow) -> bool {
        self.to > window.start && self.from < window.end
    }
}

/// Terminal aerodrome forecast for one station.
///
/// `periods` is treated as a set: feeds do not guarantee chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub station_id: String,
    pub issue_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub raw_text: Option<String>,
    #[serde(default)]
    pub periods: Vec<ForecastPeriod>,
}

impl ForecastRecord {
    #[must_use]
    pub fn new(station_id: impl Into<String>, periods: Vec<ForecastPeriod>) -> Self {
        Self {
            station_id: station_id.into(),
            issue_time: None,
            raw_text: None,
            periods,
        }
    }

    /// Periods whose validity overlaps `window`
    pub fn periods_in<'a>(
        &'a self,
        window: &'a DecisionWindow,
    ) -> impl Iterator<Item = &'a ForecastPeriod> + 'a {
        self.periods.iter().filter(move |period| period.overlaps(window))
    }
}
