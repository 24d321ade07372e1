//! Cloud layer model and altitude normalization

use serde::{Deserialize, Serialize};

/// Sky cover category of a single cloud layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudCover {
    /// SKC, CLR, NSC, NCD, CAVOK
    Clear,
    /// FEW (1-2 oktas)
    Few,
    /// SCT (3-4 oktas)
    Scattered,
    /// BKN (5-7 oktas)
    Broken,
    /// OVC (8 oktas)
    Overcast,
    /// VV / OVX, sky obscured
    Obscured,
    /// Anything the feed reports that we do not recognise
    Unknown,
}

impl CloudCover {
    /// Map a METAR/TAF cover code to a category
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "SKC" | "CLR" | "NSC" | "NCD" | "CAVOK" => CloudCover::Clear,
            "FEW" => CloudCover::Few,
            "SCT" => CloudCover::Scattered,
            "BKN" => CloudCover::Broken,
            "OVC" => CloudCover::Overcast,
            "VV" | "OVX" => CloudCover::Obscured,
            _ => CloudCover::Unknown,
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            CloudCover::Clear => "CLR",
            CloudCover::Few => "FEW",
            CloudCover::Scattered => "SCT",
            CloudCover::Broken => "BKN",
            CloudCover::Overcast => "OVC",
            CloudCover::Obscured => "VV",
            CloudCover::Unknown => "UNK",
        }
    }

    /// Only broken and overcast layers form a ceiling
    #[must_use]
    pub fn forms_ceiling(self) -> bool {
        matches!(self, CloudCover::Broken | CloudCover::Overcast)
    }
}

/// Reported height of a cloud base, tagged with its reference datum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reference", content = "feet", rename_all = "lowercase")]
pub enum CloudBase {
    /// Feet above ground level at the reporting station
    Agl(i32),
    /// Feet above mean sea level
    Msl(i32),
}

impl CloudBase {
    /// Normalize to feet AGL using the reporting station's field elevation.
    ///
    /// An MSL base cannot be normalized without an elevation, or when the
    /// difference is out of range, and yields `None`.
    #[must_use]
    pub fn to_agl(self, elevation_ft: Option<i32>) -> Option<i32> {
        match self {
            CloudBase::Agl(feet) => Some(feet),
            CloudBase::Msl(feet) => elevation_ft.and_then(|elevation| feet.checked_sub(elevation)),
        }
    }
}

/// A single cloud layer from an observation or forecast period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudLayer {
    pub cover: CloudCover,
    /// Base of the layer, absent when the report does not give one
    pub base: Option<CloudBase>,
}

impl CloudLayer {
    #[must_use]
    pub fn new(cover: CloudCover, base: Option<CloudBase>) -> Self {
        Self { cover, base }
    }

    /// Layer with a base reported in feet AGL
    #[must_use]
    pub fn agl(cover: CloudCover, feet: i32) -> Self {
        Self::new(cover, Some(CloudBase::Agl(feet)))
    }

    /// AGL base of this layer if it forms a ceiling and the base is known
    #[must_use]
    pub fn ceiling_agl(&self, elevation_ft: Option<i32>) -> Option<i32> {
        if !self.cover.forms_ceiling() {
            return None;
        }
        self.base.and_then(|base| base.to_agl(elevation_ft))
    }
}

/// Lowest ceiling-forming base (feet AGL) among `layers`
pub fn lowest_ceiling<'a, I>(layers: I, elevation_ft: Option<i32>) -> Option<i32>
where
    I: IntoIterator<Item = &'a CloudLayer>,
{
    layers
        .into_iter()
        .filter_map(|layer| layer.ceiling_agl(elevation_ft))
        .min()
}
