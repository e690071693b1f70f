//! `SkiWeather` - weather acquisition and fusion for ski resorts
//!
//! Combines the nearest ground-station observation with a global forecast
//! model into a single per-resort snapshot, and produces a 7-day outlook
//! that falls back to a synthetic series when the provider is unreachable.

pub mod config;
pub mod error;
pub mod forecast_series;
pub mod fusion;
pub mod logging;
pub mod models;
pub mod resolver;
pub mod service;
pub mod stations;
pub mod weather;

// Re-export core types for public API
pub use config::SkiWeatherConfig;
pub use error::SkiWeatherError;
pub use forecast_series::{ForecastSeriesBuilder, SyntheticForecastGenerator, WeekdayLabels};
pub use fusion::FusionEngine;
pub use models::{
    Coordinate, DailyCondition, DailyForecastEntry, DailySnapshot, ForecastSeries, FusedWeather,
    SeriesSource, SnowQuality, Visibility,
};
pub use resolver::{CoordinateResolver, ResolutionTier};
pub use service::ResortWeatherService;
pub use stations::{DistanceMetric, HaversineDistance, PlanarDistance, StationLocator};
pub use weather::{ForecastFetcher, ForecastSource, ObservationFetcher, ObservationSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SkiWeatherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
