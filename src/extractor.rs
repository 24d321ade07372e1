//! Governing cloud base of a forecast within the decision window

use crate::models::clouds::lowest_ceiling;
use crate::models::{DecisionWindow, ForecastRecord};

/// Lowest ceiling-forming base (feet AGL) forecast during `window`.
///
/// Considers every period overlapping the half-open window, regardless of
/// the order periods appear in the record. MSL bases are normalized with
/// `reporting_elevation_ft`, the field elevation of the station that issued
/// the forecast. `None` means undetermined, not clear sky.
#[must_use]
pub fn governing_cloud_base(
    record: &ForecastRecord,
    window: &DecisionWindow,
    reporting_elevation_ft: Option<i32>,
) -> Option<i32> {
    lowest_ceiling(
        record.periods_in(window).flat_map(|period| period.clouds.iter()),
        reporting_elevation_ft,
    )
}
