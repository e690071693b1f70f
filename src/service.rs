//! Resort weather service
//!
//! Ties coordinate resolution, the two upstream sources, fusion and the
//! 7-day series together. None of the operations here return an error: a
//! failing source is logged and treated as absent.

use std::collections::HashMap;

use chrono_tz::Tz;
use futures::future::join_all;
use tracing::{error, info, instrument, warn};

use crate::Result;
use crate::config::SkiWeatherConfig;
use crate::forecast_series::{
    ForecastSeriesBuilder, SERIES_DAYS, SyntheticForecastGenerator, WeekdayLabels,
};
use crate::fusion::FusionEngine;
use crate::models::{
    Coordinate, DailyForecastEntry, DailySnapshot, ForecastSeries, FusedWeather, SeriesSource,
    needs_refresh, today_in,
};
use crate::resolver::CoordinateResolver;
use crate::weather::{ForecastFetcher, ForecastSource, ObservationFetcher, ObservationSource};

/// Per-resort weather operations over an observation and a forecast source
#[derive(Debug, Clone)]
pub struct ResortWeatherService<O = ObservationFetcher, F = ForecastFetcher> {
    resolver: CoordinateResolver,
    observations: O,
    forecasts: F,
    series: ForecastSeriesBuilder,
    synthetic: SyntheticForecastGenerator,
    timezone: Tz,
}

impl ResortWeatherService<ObservationFetcher, ForecastFetcher> {
    /// Build the service with the HTTP clients described by `config`
    pub fn from_config(config: &SkiWeatherConfig) -> Result<Self> {
        let labels = WeekdayLabels::from_code(&config.forecast.weekday_labels)?;
        Ok(Self::new(
            CoordinateResolver::from_config(&config.resolver)?,
            ObservationFetcher::new(&config.observation)?,
            ForecastFetcher::new(&config.forecast)?,
            labels,
            config.forecast.tz(),
        ))
    }
}

impl<O: ObservationSource, F: ForecastSource> ResortWeatherService<O, F> {
    #[must_use]
    pub fn new(
        resolver: CoordinateResolver,
        observations: O,
        forecasts: F,
        labels: WeekdayLabels,
        timezone: Tz,
    ) -> Self {
        Self {
            resolver,
            observations,
            forecasts,
            series: ForecastSeriesBuilder::new(labels),
            synthetic: SyntheticForecastGenerator::new(labels),
            timezone,
        }
    }

    /// Current fused conditions for a resort, or `None` when temperature or
    /// wind is unavailable from both sources.
    #[instrument(skip(self))]
    pub async fn fetch_weather_data(
        &self,
        resort: &str,
        coordinate: Option<Coordinate>,
        prefecture: Option<&str>,
    ) -> Option<FusedWeather> {
        let at = self.resolver.resolve(resort, coordinate, prefecture).coordinate;

        let (observation, forecast) = tokio::join!(
            self.observations.latest_observation(&at),
            self.forecasts.current(&at)
        );
        let observation = degrade(resort, "observation", observation);
        let forecast = degrade(resort, "forecast", forecast);

        let fused = FusionEngine::fuse(observation.as_ref(), forecast.as_ref());
        match &fused {
            Some(weather) => info!(
                resort,
                temp_c = weather.temp_c,
                wind_ms = weather.wind_ms,
                observed = observation.is_some(),
                "Fused weather ready"
            ),
            None => warn!(resort, "Weather unavailable: temperature or wind missing from every source"),
        }
        fused
    }

    /// Seven daily entries for a resort. Never empty: provider failures are
    /// replaced by a synthetic series.
    pub async fn fetch_7day_forecast(
        &self,
        resort: &str,
        coordinate: Option<Coordinate>,
        prefecture: Option<&str>,
    ) -> Vec<DailyForecastEntry> {
        self.fetch_7day_forecast_with_source(resort, coordinate, prefecture)
            .await
            .entries
    }

    /// Like [`fetch_7day_forecast`](Self::fetch_7day_forecast), also reporting
    /// whether the entries are real or synthetic.
    #[instrument(skip(self))]
    pub async fn fetch_7day_forecast_with_source(
        &self,
        resort: &str,
        coordinate: Option<Coordinate>,
        prefecture: Option<&str>,
    ) -> ForecastSeries {
        let at = self.resolver.resolve(resort, coordinate, prefecture).coordinate;

        let built = match self.forecasts.daily(&at, SERIES_DAYS).await {
            Ok(days) => self.series.build(&days),
            Err(e) => Err(e),
        };

        match built {
            Ok(entries) => ForecastSeries {
                entries,
                source: SeriesSource::Provider,
            },
            Err(e) => {
                warn!(resort, error = %e, "7-day forecast unavailable, substituting synthetic series");
                ForecastSeries {
                    entries: self.synthetic.generate_from_entropy(today_in(self.timezone)),
                    source: SeriesSource::Synthetic,
                }
            }
        }
    }

    /// Fused conditions for several resorts, resolved by name alone.
    /// Resorts without a result are omitted.
    #[instrument(skip(self, resort_ids), fields(count = resort_ids.len()))]
    pub async fn fetch_multiple_weather_data(
        &self,
        resort_ids: &[String],
    ) -> HashMap<String, FusedWeather> {
        let results = join_all(resort_ids.iter().map(|id| async move {
            (id, self.fetch_weather_data(id, None, None).await)
        }))
        .await;

        let fused: HashMap<String, FusedWeather> = results
            .into_iter()
            .filter_map(|(id, weather)| weather.map(|w| (id.clone(), w)))
            .collect();

        info!("Weather ready for {}/{} resorts", fused.len(), resort_ids.len());
        fused
    }

    /// Today's snapshot for a resort, reusing `cached` when it is still
    /// current and fetching otherwise.
    pub async fn refresh_daily_snapshot(
        &self,
        resort_id: &str,
        coordinate: Option<Coordinate>,
        prefecture: Option<&str>,
        cached: Option<&DailySnapshot>,
    ) -> Option<DailySnapshot> {
        let today = today_in(self.timezone);
        if !needs_refresh(cached, today) {
            return cached.cloned();
        }

        self.fetch_weather_data(resort_id, coordinate, prefecture)
            .await
            .map(|weather| DailySnapshot::new(resort_id, today, weather))
    }
}

fn degrade<T>(resort: &str, source: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_degradable() => {
            warn!(resort, source, error = %e, "Source unavailable, continuing without it");
            None
        }
        Err(e) => {
            error!(resort, source, error = %e, "Source misconfigured, continuing without it");
            None
        }
    }
}
