//! Field-level fusion of ground observations and model forecasts
//!
//! Each output field takes the primary source when it carries a value and
//! falls back to the secondary source otherwise. Temperature and wind are
//! mandatory: if either stays unresolved no record is produced.

use tracing::debug;

use crate::models::{
    FusedWeather, ForecastSnapshot, ObservationSnapshot, SnowQuality, Visibility,
};

/// WMO code used when no source reports one ("overcast")
pub const DEFAULT_WEATHER_CODE: u8 = 3;

const KMH_PER_MS: f64 = 3.6;

/// Round half toward positive infinity to `decimals` places
#[must_use]
pub fn round_half_up(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

fn round_to_int(value: f64) -> i32 {
    round_half_up(value, 0) as i32
}

/// Stateless fusion of one observation and one forecast
#[derive(Debug, Clone, Copy, Default)]
pub struct FusionEngine;

impl FusionEngine {
    /// Merge the two sources into one record, or `None` when temperature or wind
    /// cannot be resolved from either.
    #[must_use]
    pub fn fuse(
        observation: Option<&ObservationSnapshot>,
        forecast: Option<&ForecastSnapshot>,
    ) -> Option<FusedWeather> {
        let temp_c = observation
            .and_then(|o| o.temperature_c)
            .or_else(|| forecast.and_then(|f| f.temperature_c))
            .map(round_to_int);

        let wind_ms = observation
            .and_then(|o| o.wind_speed_ms)
            .or_else(|| forecast.and_then(|f| f.wind_speed_kmh).map(|kmh| kmh / KMH_PER_MS))
            .map(|ms| round_half_up(ms, 1));

        let (Some(temp_c), Some(wind_ms)) = (temp_c, wind_ms) else {
            debug!(
                "Mandatory field unresolved (temp: {:?}, wind: {:?})",
                temp_c, wind_ms
            );
            return None;
        };

        let base_depth_cm = observation
            .and_then(|o| o.snow_depth_cm)
            .or_else(|| forecast.and_then(|f| f.snow_depth_cm))
            .map(round_to_int)
            .unwrap_or(0);

        // Ground precipitation only counts as snow below freezing
        let new_snow_cm = observation
            .and_then(|o| o.precipitation_24h_mm)
            .filter(|_| temp_c < 0)
            .or_else(|| forecast.and_then(|f| f.snowfall_today_cm))
            .map(|cm| round_half_up(cm, 1))
            .unwrap_or(0.0);

        let weather_code = forecast
            .and_then(|f| f.weather_code)
            .unwrap_or(DEFAULT_WEATHER_CODE);

        Some(FusedWeather {
            temp_c,
            new_snow_cm,
            base_depth_cm,
            wind_ms,
            visibility: categorize_visibility(wind_ms, new_snow_cm),
            snow_quality: categorize_snow_quality(temp_c, new_snow_cm),
            weather_code,
        })
    }
}

/// First matching rule wins; the order is significant.
#[must_use]
pub fn categorize_snow_quality(temp_c: i32, new_snow_cm: f64) -> SnowQuality {
    if temp_c > 0 {
        SnowQuality::Slushy
    } else if temp_c < -8 && new_snow_cm > 5.0 {
        SnowQuality::Powder
    } else if temp_c < -5 {
        SnowQuality::Packed
    } else if temp_c > -2 {
        SnowQuality::Icy
    } else {
        SnowQuality::Packed
    }
}

/// First matching rule wins; the order is significant.
#[must_use]
pub fn categorize_visibility(wind_ms: f64, new_snow_cm: f64) -> Visibility {
    if wind_ms > 10.0 && new_snow_cm > 5.0 {
        Visibility::Poor
    } else if wind_ms > 15.0 {
        Visibility::Poor
    } else if wind_ms > 8.0 || new_snow_cm > 10.0 {
        Visibility::Moderate
    } else {
        Visibility::Good
    }
}
