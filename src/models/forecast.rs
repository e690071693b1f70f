//! Forecast-provider models and the daily forecast series

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Current conditions from the global forecast model; every field may be absent
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct ForecastSnapshot {
    /// Air temperature at 2 m in Celsius
    pub temperature_c: Option<f64>,
    /// Wind speed at 10 m in km/h
    pub wind_speed_kmh: Option<f64>,
    /// WMO weather interpretation code
    pub weather_code: Option<u8>,
    /// Snowfall sum for today in cm
    pub snowfall_today_cm: Option<f64>,
    /// Snow depth at the first forecast hour in cm
    pub snow_depth_cm: Option<f64>,
}

/// Coarse daily condition shown in the 7-day strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DailyCondition {
    Clear,
    Cloudy,
    Rain,
    Snow,
}

impl DailyCondition {
    /// All conditions, in the order the synthetic generator draws from
    pub const ALL: [DailyCondition; 4] = [
        DailyCondition::Clear,
        DailyCondition::Cloudy,
        DailyCondition::Snow,
        DailyCondition::Rain,
    ];

    /// Tiered mapping from a WMO weather code; first matching tier wins
    #[must_use]
    pub fn from_weather_code(code: i32) -> Self {
        if code == 0 {
            Self::Clear
        } else if code <= 3 {
            Self::Cloudy
        } else if (51..=67).contains(&code) {
            Self::Rain
        } else if (71..=77).contains(&code) {
            Self::Snow
        } else if code >= 80 {
            Self::Rain
        } else {
            Self::Cloudy
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Rain => "rain",
            Self::Snow => "snow",
        }
    }
}

/// One day of the 7-day forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecastEntry {
    /// Calendar date in the provider timezone
    pub date: NaiveDate,
    /// Weekday label for `date`
    pub day_of_week: String,
    /// Daily maximum temperature in Celsius, rounded
    pub temp_high: i32,
    /// Daily minimum temperature in Celsius, rounded
    pub temp_low: i32,
    /// Snowfall sum in cm, one decimal
    pub snowfall_cm: f64,
    pub condition: DailyCondition,
}

/// Raw per-day values from the forecast provider, before rounding
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct DailyOutlook {
    pub date: NaiveDate,
    pub temp_max_c: Option<f64>,
    pub temp_min_c: Option<f64>,
    pub snowfall_cm: Option<f64>,
    pub weather_code: Option<i32>,
}

/// Where a forecast series came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSource {
    /// Built from the forecast provider's response
    Provider,
    /// Generated locally because the provider failed
    Synthetic,
}

/// A forecast series together with its provenance
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastSeries {
    pub entries: Vec<DailyForecastEntry>,
    pub source: SeriesSource,
}

impl ForecastSeries {
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.source == SeriesSource::Synthetic
    }
}
