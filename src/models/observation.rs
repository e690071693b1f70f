//! Ground-station observation model

use serde::{Deserialize, Serialize};

/// Flag value the ground-station network uses for a normal reading
pub const QUALITY_NORMAL: i64 = 0;

/// A `[value, qualityFlag]` pair as published in observation snapshots
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct TaggedValue(pub Option<f64>, pub Option<i64>);

impl TaggedValue {
    /// Value regardless of its flag
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.0
    }

    /// Value only when its flag marks a normal reading
    #[must_use]
    pub fn trusted_value(&self) -> Option<f64> {
        match self.1 {
            Some(QUALITY_NORMAL) | None => self.0,
            Some(_) => None,
        }
    }
}

/// One station's record in an observation snapshot map
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StationReading {
    pub temp: Option<TaggedValue>,
    pub wind: Option<TaggedValue>,
    pub snow: Option<TaggedValue>,
    #[serde(rename = "precipitation24h")]
    pub precipitation_24h: Option<TaggedValue>,
}

impl StationReading {
    /// Extract the four fields of interest.
    ///
    /// With `honor_quality_flags` unset the flag is discarded and any present
    /// value is used; otherwise flagged values are treated as missing.
    #[must_use]
    pub fn to_snapshot(&self, honor_quality_flags: bool) -> ObservationSnapshot {
        let pick = |tagged: &Option<TaggedValue>| {
            tagged.and_then(|t| {
                if honor_quality_flags {
                    t.trusted_value()
                } else {
                    t.value()
                }
            })
        };

        ObservationSnapshot {
            temperature_c: pick(&self.temp),
            wind_speed_ms: pick(&self.wind),
            snow_depth_cm: pick(&self.snow),
            precipitation_24h_mm: pick(&self.precipitation_24h),
        }
    }
}

/// Latest reading of the nearest ground station; every field may be absent
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct ObservationSnapshot {
    /// Air temperature in Celsius
    pub temperature_c: Option<f64>,
    /// Mean wind speed in m/s
    pub wind_speed_ms: Option<f64>,
    /// Snow depth in cm
    pub snow_depth_cm: Option<f64>,
    /// Precipitation over the last 24 hours in mm
    pub precipitation_24h_mm: Option<f64>,
}
