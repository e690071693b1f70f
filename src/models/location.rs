//! Coordinate and ground-station directory models

use serde::{Deserialize, Serialize};

/// Geographic coordinate in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components present and non-zero; a zero component marks a resort
    /// whose coordinates were never filled in.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.latitude != 0.0
            && self.longitude != 0.0
            && self.latitude.is_finite()
            && self.longitude.is_finite()
    }

    /// Format coordinate as a short string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Degree-minute pair as published in the station directory, e.g. `[36, 41.5]`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct DegreeMinutes(pub f64, pub f64);

impl DegreeMinutes {
    /// Convert to decimal degrees (`deg + min / 60`)
    #[must_use]
    pub fn to_decimal(self) -> f64 {
        self.0 + self.1 / 60.0
    }
}

/// One entry of the ground-station directory
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StationRecord {
    /// Station identifier, the directory key
    #[serde(default)]
    pub id: String,
    /// Station name
    #[serde(rename = "kjName", alias = "name", default)]
    pub name: String,
    /// Latitude as `[deg, min]`
    pub lat: DegreeMinutes,
    /// Longitude as `[deg, min]`
    pub lon: DegreeMinutes,
}

impl StationRecord {
    /// Station position in decimal degrees
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat.to_decimal(), self.lon.to_decimal())
    }
}
