//! Configuration management for `SkiWeather`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::SkiWeatherError;
use crate::forecast_series::WeekdayLabels;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SkiWeatherConfig {
    /// Ground-station network endpoints
    #[serde(default)]
    pub observation: ObservationConfig,
    /// Global forecast model endpoint
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Coordinate fallback tables
    #[serde(default)]
    pub resolver: ResolverConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ground-station network settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationConfig {
    /// Station directory (JSON map of station id to record)
    #[serde(default = "default_station_table_url")]
    pub station_table_url: String,
    /// Plain-text pointer to the latest observation time
    #[serde(default = "default_latest_time_url")]
    pub latest_time_url: String,
    /// Directory holding `<timestamp>.json` snapshot maps
    #[serde(default = "default_map_base_url")]
    pub map_base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Drop readings whose quality flag is not "normal"
    #[serde(default)]
    pub honor_quality_flags: bool,
}

/// Forecast provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Forecast endpoint
    #[serde(default = "default_forecast_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// IANA timezone used for daily aggregation and weekday labels
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Days requested alongside current conditions
    #[serde(default = "default_current_forecast_days")]
    pub current_forecast_days: u32,
    /// Weekday label language (ja or en)
    #[serde(default = "default_weekday_labels")]
    pub weekday_labels: String,
}

/// Coordinate resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Optional JSON file replacing the embedded prefecture table
    #[serde(default)]
    pub prefecture_table: Option<PathBuf>,
    /// Optional JSON file replacing the embedded resort catalog
    #[serde(default)]
    pub resort_table: Option<PathBuf>,
    /// Last-resort latitude
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,
    /// Last-resort longitude
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_station_table_url() -> String {
    "https://www.jma.go.jp/bosai/amedas/const/amedastable.json".to_string()
}

fn default_latest_time_url() -> String {
    "https://www.jma.go.jp/bosai/amedas/data/latest_time.txt".to_string()
}

fn default_map_base_url() -> String {
    "https://www.jma.go.jp/bosai/amedas/data/map".to_string()
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_timeout() -> u32 {
    5
}

fn default_timezone() -> String {
    "Asia/Tokyo".to_string()
}

fn default_current_forecast_days() -> u32 {
    3
}

fn default_weekday_labels() -> String {
    "ja".to_string()
}

fn default_latitude() -> f64 {
    36.7
}

fn default_longitude() -> f64 {
    137.85
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ObservationConfig {
    fn default() -> Self {
        Self {
            station_table_url: default_station_table_url(),
            latest_time_url: default_latest_time_url(),
            map_base_url: default_map_base_url(),
            timeout_seconds: default_timeout(),
            honor_quality_flags: false,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: default_forecast_base_url(),
            timeout_seconds: default_timeout(),
            timezone: default_timezone(),
            current_forecast_days: default_current_forecast_days(),
            weekday_labels: default_weekday_labels(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            prefecture_table: None,
            resort_table: None,
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ObservationConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl ForecastConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    /// Parsed timezone; falls back to Asia/Tokyo for an unparseable value
    #[must_use]
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(chrono_tz::Asia::Tokyo)
    }
}

impl SkiWeatherConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides: SKIWEATHER_FORECAST__TIMEZONE=Asia/Tokyo
        builder = builder.add_source(
            Environment::with_prefix("SKIWEATHER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: SkiWeatherConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skiweather").join("config.toml"))
    }

    /// Apply default values to empty or zeroed fields
    pub fn apply_defaults(&mut self) {
        if self.observation.station_table_url.is_empty() {
            self.observation.station_table_url = default_station_table_url();
        }
        if self.observation.latest_time_url.is_empty() {
            self.observation.latest_time_url = default_latest_time_url();
        }
        if self.observation.map_base_url.is_empty() {
            self.observation.map_base_url = default_map_base_url();
        }
        if self.observation.timeout_seconds == 0 {
            self.observation.timeout_seconds = default_timeout();
        }
        if self.forecast.base_url.is_empty() {
            self.forecast.base_url = default_forecast_base_url();
        }
        if self.forecast.timeout_seconds == 0 {
            self.forecast.timeout_seconds = default_timeout();
        }
        if self.forecast.timezone.is_empty() {
            self.forecast.timezone = default_timezone();
        }
        if self.forecast.current_forecast_days == 0 {
            self.forecast.current_forecast_days = default_current_forecast_days();
        }
        if self.forecast.weekday_labels.is_empty() {
            self.forecast.weekday_labels = default_weekday_labels();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        for (name, timeout) in [
            ("Observation", self.observation.timeout_seconds),
            ("Forecast", self.forecast.timeout_seconds),
        ] {
            if !(1..=60).contains(&timeout) {
                return Err(SkiWeatherError::config(format!(
                    "{name} timeout must be between 1 and 60 seconds"
                ))
                .into());
            }
        }

        if !(1..=16).contains(&self.forecast.current_forecast_days) {
            return Err(
                SkiWeatherError::config("Forecast days must be between 1 and 16").into(),
            );
        }

        if !(-90.0..=90.0).contains(&self.resolver.default_latitude)
            || !(-180.0..=180.0).contains(&self.resolver.default_longitude)
        {
            return Err(SkiWeatherError::config("Default coordinate is out of range").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SkiWeatherError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SkiWeatherError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        WeekdayLabels::from_code(&self.forecast.weekday_labels)?;

        if self.forecast.timezone.parse::<Tz>().is_err() {
            return Err(SkiWeatherError::config(format!(
                "Unknown timezone '{}'",
                self.forecast.timezone
            ))
            .into());
        }

        for url in [
            &self.observation.station_table_url,
            &self.observation.latest_time_url,
            &self.observation.map_base_url,
            &self.forecast.base_url,
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SkiWeatherError::config(format!(
                    "Provider URL must be a valid HTTP or HTTPS URL: {url}"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SkiWeatherConfig::default();
        assert_eq!(config.forecast.base_url, "https://api.open-meteo.com/v1/forecast");
        assert_eq!(config.forecast.timeout_seconds, 5);
        assert_eq!(config.observation.timeout_seconds, 5);
        assert_eq!(config.forecast.tz(), chrono_tz::Asia::Tokyo);
        assert_eq!(config.logging.level, "info");
        assert!(!config.observation.honor_quality_flags);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = SkiWeatherConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_timeout_range() {
        let mut config = SkiWeatherConfig::default();
        config.forecast.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout must be between"));
    }

    #[test]
    fn test_config_validation_timezone() {
        let mut config = SkiWeatherConfig::default();
        config.forecast.timezone = "Mars/Olympus".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults_fills_zeroes() {
        let mut config = SkiWeatherConfig::default();
        config.observation.timeout_seconds = 0;
        config.forecast.timezone.clear();
        config.apply_defaults();
        assert_eq!(config.observation.timeout_seconds, 5);
        assert_eq!(config.forecast.timezone, "Asia/Tokyo");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[forecast]\nbase_url = \"http://localhost:9000/v1/forecast\"\ntimeout_seconds = 3\n\n[observation]\nhonor_quality_flags = true\n"
        )
        .unwrap();

        let config = SkiWeatherConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.forecast.base_url, "http://localhost:9000/v1/forecast");
        assert_eq!(config.forecast.timeout_seconds, 3);
        assert!(config.observation.honor_quality_flags);
        assert_eq!(config.resolver.default_latitude, 36.7);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = SkiWeatherConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("skiweather"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
