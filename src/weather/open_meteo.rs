//! Global forecast model client (Open-Meteo)

use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::ForecastSource;
use crate::config::ForecastConfig;
use crate::models::{Coordinate, DailyOutlook, ForecastSnapshot};
use crate::{Result, SkiWeatherError};

const SOURCE_NAME: &str = "forecast provider";

const CURRENT_FIELDS: &str = "temperature_2m,wind_speed_10m,weather_code";
const DAILY_SERIES_FIELDS: &str = "temperature_2m_max,temperature_2m_min,snowfall_sum,weather_code";

/// Open-Meteo reports snow depth in meters
const CM_PER_M: f64 = 100.0;

/// Response structures for the forecast endpoint
mod response {
    use super::NaiveDate;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        pub current: Option<CurrentBlock>,
        pub daily: Option<SnowfallBlock>,
        pub hourly: Option<SnowDepthBlock>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentBlock {
        #[serde(rename = "temperature_2m")]
        pub temperature: Option<f64>,
        #[serde(rename = "wind_speed_10m")]
        pub wind_speed: Option<f64>,
        pub weather_code: Option<i64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct SnowfallBlock {
        #[serde(default)]
        pub snowfall_sum: Vec<Option<f64>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct SnowDepthBlock {
        #[serde(default)]
        pub snow_depth: Vec<Option<f64>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct DailyResponse {
        pub daily: Option<DailyBlock>,
    }

    #[derive(Debug, Deserialize)]
    pub struct DailyBlock {
        pub time: Vec<NaiveDate>,
        #[serde(rename = "temperature_2m_max")]
        pub temperature_max: Vec<Option<f64>>,
        #[serde(rename = "temperature_2m_min")]
        pub temperature_min: Vec<Option<f64>>,
        pub snowfall_sum: Vec<Option<f64>>,
        pub weather_code: Vec<Option<i64>>,
    }
}

/// Client for the global forecast model
#[derive(Debug, Clone)]
pub struct ForecastFetcher {
    client: Client,
    base_url: String,
    timezone: String,
    current_forecast_days: u32,
}

impl ForecastFetcher {
    pub fn new(config: &ForecastConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("skiweather/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            timezone: config.timezone.clone(),
            current_forecast_days: config.current_forecast_days,
        })
    }

    fn request_url(&self, at: &Coordinate, params: &[(&str, &str)], days: usize) -> Result<Url> {
        let latitude = at.latitude.to_string();
        let longitude = at.longitude.to_string();
        let days = days.to_string();

        let mut query = vec![
            ("latitude", latitude.as_str()),
            ("longitude", longitude.as_str()),
        ];
        query.extend_from_slice(params);
        query.push(("timezone", self.timezone.as_str()));
        query.push(("forecast_days", days.as_str()));

        Url::parse_with_params(&self.base_url, &query)
            .map_err(|e| SkiWeatherError::config(format!("invalid forecast URL '{}': {e}", self.base_url)))
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            SkiWeatherError::source_unavailable(SOURCE_NAME, format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SkiWeatherError::source_unavailable(
                SOURCE_NAME,
                format!("{} returned HTTP {status}", url.path()),
            ));
        }

        let body = response.text().await.map_err(|e| {
            SkiWeatherError::source_unavailable(SOURCE_NAME, format!("reading response failed: {e}"))
        })?;

        serde_json::from_str(&body)
            .map_err(|e| SkiWeatherError::parse(format!("unexpected forecast payload: {e}")))
    }
}

impl ForecastSource for ForecastFetcher {
    #[instrument(skip(self), fields(lat = at.latitude, lon = at.longitude))]
    async fn current(&self, at: &Coordinate) -> Result<ForecastSnapshot> {
        let url = self.request_url(
            at,
            &[
                ("current", CURRENT_FIELDS),
                ("daily", "snowfall_sum"),
                ("hourly", "snow_depth"),
            ],
            self.current_forecast_days as usize,
        )?;
        let body: response::CurrentResponse = self.get(url).await?;

        let current = body.current.as_ref();
        let snapshot = ForecastSnapshot {
            temperature_c: current.and_then(|c| c.temperature),
            wind_speed_kmh: current.and_then(|c| c.wind_speed),
            weather_code: current
                .and_then(|c| c.weather_code)
                .and_then(|code| u8::try_from(code).ok()),
            snowfall_today_cm: body
                .daily
                .and_then(|d| d.snowfall_sum.first().copied().flatten()),
            snow_depth_cm: body
                .hourly
                .and_then(|h| h.snow_depth.first().copied().flatten())
                .map(|m| m * CM_PER_M),
        };

        debug!(?snapshot, "Forecast extracted");
        Ok(snapshot)
    }

    #[instrument(skip(self), fields(lat = at.latitude, lon = at.longitude))]
    async fn daily(&self, at: &Coordinate, days: usize) -> Result<Vec<DailyOutlook>> {
        let url = self.request_url(at, &[("daily", DAILY_SERIES_FIELDS)], days)?;
        let body: response::DailyResponse = self.get(url).await?;

        let daily = body
            .daily
            .ok_or_else(|| SkiWeatherError::parse("forecast response has no daily block"))?;
        daily_outlook(&daily, days)
    }
}

fn daily_outlook(daily: &response::DailyBlock, days: usize) -> Result<Vec<DailyOutlook>> {
    let shortest = [
        daily.time.len(),
        daily.temperature_max.len(),
        daily.temperature_min.len(),
        daily.snowfall_sum.len(),
        daily.weather_code.len(),
    ]
    .into_iter()
    .min()
    .unwrap_or(0);

    if shortest < days {
        return Err(SkiWeatherError::parse(format!(
            "daily arrays hold {shortest} days, expected {days}"
        )));
    }

    Ok((0..days)
        .map(|i| DailyOutlook {
            date: daily.time[i],
            temp_max_c: daily.temperature_max[i],
            temp_min_c: daily.temperature_min[i],
            snowfall_cm: daily.snowfall_sum[i],
            weather_code: daily.weather_code[i].and_then(|code| i32::try_from(code).ok()),
        })
        .collect())
}
