//! Data models for the SkiWeather engine
//!
//! This module contains the domain models organized by concern:
//! - Location: coordinates and the ground-station directory
//! - Observation: ground-station readings
//! - Forecast: forecast-provider snapshots and the daily series
//! - Weather: the fused per-resort record
//! - Snapshot: date-keyed records for caller-side caching

pub mod forecast;
pub mod location;
pub mod observation;
pub mod snapshot;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{
    DailyCondition, DailyForecastEntry, DailyOutlook, ForecastSeries, ForecastSnapshot, SeriesSource,
};
pub use location::{Coordinate, DegreeMinutes, StationRecord};
pub use observation::{ObservationSnapshot, StationReading, TaggedValue};
pub use snapshot::{DailySnapshot, needs_refresh, today_in};
pub use weather::{FusedWeather, SnowQuality, Visibility, weather_code_to_description};
