//! Fused per-resort weather snapshot

use serde::{Deserialize, Serialize};

/// Visibility judgement derived from wind and fresh snow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Good,
    Moderate,
    Poor,
}

/// Snow surface judgement derived from temperature and fresh snow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnowQuality {
    Powder,
    Packed,
    Slushy,
    Icy,
}

/// Canonical weather record for one resort.
///
/// Temperature and wind are always present: when either cannot be resolved
/// no record is produced at all.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FusedWeather {
    /// Temperature in Celsius, rounded to an integer
    pub temp_c: i32,
    /// Fresh snow in cm, one decimal
    pub new_snow_cm: f64,
    /// Base snow depth in cm, rounded to an integer
    pub base_depth_cm: i32,
    /// Wind speed in m/s, one decimal
    pub wind_ms: f64,
    pub visibility: Visibility,
    pub snow_quality: SnowQuality,
    /// WMO weather interpretation code
    pub weather_code: u8,
}

impl FusedWeather {
    /// Human-readable description of the weather code
    #[must_use]
    pub fn description(&self) -> &'static str {
        weather_code_to_description(self.weather_code)
    }

    #[must_use]
    pub fn is_snowing(&self) -> bool {
        crate::weather::is_snowfall_code(self.weather_code)
    }
}

/// Convert a WMO weather code to a human-readable description
#[must_use]
pub fn weather_code_to_description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description() {
        assert_eq!(weather_code_to_description(0), "Clear sky");
        assert_eq!(weather_code_to_description(3), "Overcast");
        assert_eq!(weather_code_to_description(73), "Moderate snow fall");
        assert_eq!(weather_code_to_description(42), "Unknown");
    }

    #[test]
    fn test_fused_weather_json_shape() {
        let weather = FusedWeather {
            temp_c: -9,
            new_snow_cm: 6.5,
            base_depth_cm: 210,
            wind_ms: 3.2,
            visibility: Visibility::Moderate,
            snow_quality: SnowQuality::Powder,
            weather_code: 73,
        };
        let json = serde_json::to_value(&weather).unwrap();
        assert_eq!(json["tempC"], -9);
        assert_eq!(json["newSnowCm"], 6.5);
        assert_eq!(json["baseDepthCm"], 210);
        assert_eq!(json["windMs"], 3.2);
        assert_eq!(json["visibility"], "moderate");
        assert_eq!(json["snowQuality"], "powder");
        assert_eq!(weather.description(), "Moderate snow fall");
    }
}
