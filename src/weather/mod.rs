//! Upstream weather sources
//!
//! Two independent sources feed the fusion step: the ground-station network
//! ([`amedas`]) and a global forecast model ([`open_meteo`]). Each is reached
//! through a trait so the service can be driven by stubs in tests.

use crate::Result;
use crate::models::{Coordinate, DailyOutlook, ForecastSnapshot, ObservationSnapshot};

pub mod amedas;
pub mod open_meteo;

pub use amedas::ObservationFetcher;
pub use open_meteo::ForecastFetcher;

/// Latest ground observation near a coordinate
pub trait ObservationSource {
    async fn latest_observation(&self, at: &Coordinate) -> Result<ObservationSnapshot>;
}

/// Current conditions and daily outlook from a forecast model
pub trait ForecastSource {
    async fn current(&self, at: &Coordinate) -> Result<ForecastSnapshot>;

    /// Exactly `days` daily values starting today, or an error
    async fn daily(&self, at: &Coordinate, days: usize) -> Result<Vec<DailyOutlook>>;
}

/// True for WMO codes that report falling snow
#[must_use]
pub fn is_snowfall_code(code: u8) -> bool {
    matches!(code, 71..=77 | 85 | 86)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_snowfall_code() {
        assert!(is_snowfall_code(73));
        assert!(is_snowfall_code(86));
        assert!(!is_snowfall_code(3));
        assert!(!is_snowfall_code(61));
    }
}
