//! Ground-station observation client
//!
//! An observation is assembled in four sequential requests: the station
//! directory, the nearest station, the latest-time pointer and the snapshot
//! map for that time. Any failing step aborts the whole observation.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use super::ObservationSource;
use crate::config::ObservationConfig;
use crate::models::{Coordinate, ObservationSnapshot, StationReading, StationRecord};
use crate::stations::{StationDirectory, StationLocator};
use crate::{Result, SkiWeatherError};

const SOURCE_NAME: &str = "ground-station network";

/// Client for the ground-station observation network
#[derive(Debug, Clone)]
pub struct ObservationFetcher {
    client: Client,
    station_table_url: String,
    latest_time_url: String,
    map_base_url: String,
    honor_quality_flags: bool,
    locator: StationLocator,
}

impl ObservationFetcher {
    pub fn new(config: &ObservationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("skiweather/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            station_table_url: config.station_table_url.clone(),
            latest_time_url: config.latest_time_url.clone(),
            map_base_url: config.map_base_url.trim_end_matches('/').to_string(),
            honor_quality_flags: config.honor_quality_flags,
            locator: StationLocator::new(),
        })
    }

    /// Fetch the full station directory, keyed by station id
    pub async fn fetch_station_directory(&self) -> Result<StationDirectory> {
        let raw: HashMap<String, StationRecord> = self.get_json(&self.station_table_url).await?;
        let directory: StationDirectory = raw
            .into_iter()
            .map(|(id, mut record)| {
                record.id.clone_from(&id);
                (id, record)
            })
            .collect();

        debug!("Station directory holds {} stations", directory.len());
        Ok(directory)
    }

    /// Fetch the timestamp of the most recent published snapshot
    pub async fn fetch_latest_time(&self) -> Result<DateTime<FixedOffset>> {
        let body = self.get_text(&self.latest_time_url).await?;
        parse_latest_time(&body)
    }

    /// Fetch every station's reading for the snapshot `key`
    pub async fn fetch_snapshot_map(&self, key: &str) -> Result<HashMap<String, StationReading>> {
        let url = format!("{}/{key}.json", self.map_base_url);
        self.get_json(&url).await
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            SkiWeatherError::source_unavailable(SOURCE_NAME, format!("request to {url} failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SkiWeatherError::source_unavailable(
                SOURCE_NAME,
                format!("{url} returned HTTP {status}"),
            ));
        }

        response.text().await.map_err(|e| {
            SkiWeatherError::source_unavailable(SOURCE_NAME, format!("reading {url} failed: {e}"))
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body)
            .map_err(|e| SkiWeatherError::parse(format!("unexpected payload from {url}: {e}")))
    }
}

impl ObservationSource for ObservationFetcher {
    #[instrument(skip(self), fields(lat = at.latitude, lon = at.longitude))]
    async fn latest_observation(&self, at: &Coordinate) -> Result<ObservationSnapshot> {
        let directory = self.fetch_station_directory().await?;

        let station = self
            .locator
            .nearest_in(at, &directory)
            .ok_or(SkiWeatherError::StationNotFound {
                latitude: at.latitude,
                longitude: at.longitude,
            })?;
        info!(
            station = station.id.as_str(),
            "Using ground station {} at distance {:.4}", station.name, station.distance
        );

        let latest = self.fetch_latest_time().await?;
        let key = snapshot_key(&latest);
        let readings = self.fetch_snapshot_map(&key).await?;

        let reading = readings.get(&station.id).ok_or_else(|| {
            SkiWeatherError::parse(format!("station {} missing from snapshot {key}", station.id))
        })?;

        let snapshot = reading.to_snapshot(self.honor_quality_flags);
        debug!(?snapshot, "Observation extracted");
        Ok(snapshot)
    }
}

/// Parse the plain-text latest-time pointer, with or without seconds
pub fn parse_latest_time(body: &str) -> Result<DateTime<FixedOffset>> {
    let text = body.trim();
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M%:z"))
        .map_err(|e| SkiWeatherError::parse(format!("invalid latest-time pointer '{text}': {e}")))
}

/// Compact snapshot key: local date and minute with separators stripped and a
/// zero seconds field appended, e.g. `20250112093000`.
#[must_use]
pub fn snapshot_key(time: &DateTime<FixedOffset>) -> String {
    format!("{}00", time.format("%Y%m%d%H%M"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ObservationConfig {
        ObservationConfig {
            station_table_url: format!("{}/const/amedastable.json", server.uri()),
            latest_time_url: format!("{}/data/latest_time.txt", server.uri()),
            map_base_url: format!("{}/data/map/", server.uri()),
            timeout_seconds: 1,
            ..ObservationConfig::default()
        }
    }

    async fn mount_directory(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/const/amedastable.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "48401": {"kjName": "白馬", "lat": [36, 41.9], "lon": [137, 51.7], "alt": 703},
                "54157": {"kjName": "十日町", "lat": [37, 7.9], "lon": [138, 45.8], "alt": 170}
            })))
            .mount(server)
            .await;
    }

    async fn mount_latest_time(server: &MockServer, body: &str) {
        Mock::given(method("GET"))
            .and(path("/data/latest_time.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[rstest::rstest]
    #[case("2025-01-12T09:30:00+09:00", "20250112093000")]
    #[case("2025-01-12T09:30+09:00\n", "20250112093000")]
    #[case("2024-12-31T23:50+09:00", "20241231235000")]
    fn test_snapshot_key(#[case] pointer: &str, #[case] expected: &str) {
        let time = parse_latest_time(pointer).unwrap();
        assert_eq!(snapshot_key(&time), expected);
    }

    #[test]
    fn test_invalid_pointer() {
        assert!(matches!(
            parse_latest_time("not a time"),
            Err(SkiWeatherError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_latest_observation() {
        let server = MockServer::start().await;
        mount_directory(&server).await;
        mount_latest_time(&server, "2025-01-12T09:30:00+09:00").await;

        Mock::given(method("GET"))
            .and(path("/data/map/20250112093000.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "48401": {
                    "temp": [-6.3, 0],
                    "wind": [2.4, 0],
                    "snow": [142, 0],
                    "precipitation24h": [11.5, 0]
                },
                "54157": {"temp": [1.2, 0], "wind": [5.0, 0]}
            })))
            .mount(&server)
            .await;

        let fetcher = ObservationFetcher::new(&config_for(&server)).unwrap();
        let snapshot = fetcher
            .latest_observation(&Coordinate::new(36.6975, 137.8311))
            .await
            .unwrap();

        assert_eq!(snapshot.temperature_c, Some(-6.3));
        assert_eq!(snapshot.wind_speed_ms, Some(2.4));
        assert_eq!(snapshot.snow_depth_cm, Some(142.0));
        assert_eq!(snapshot.precipitation_24h_mm, Some(11.5));
    }

    #[tokio::test]
    async fn test_flagged_values_dropped_when_honored() {
        let server = MockServer::start().await;
        mount_directory(&server).await;
        mount_latest_time(&server, "2025-01-12T09:30+09:00").await;

        Mock::given(method("GET"))
            .and(path("/data/map/20250112093000.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "48401": {"temp": [-6.3, 0], "wind": [2.4, 5], "snow": [142, 0]}
            })))
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.honor_quality_flags = true;
        let fetcher = ObservationFetcher::new(&config).unwrap();
        let snapshot = fetcher
            .latest_observation(&Coordinate::new(36.6975, 137.8311))
            .await
            .unwrap();

        assert_eq!(snapshot.temperature_c, Some(-6.3));
        assert_eq!(snapshot.wind_speed_ms, None);
        assert_eq!(snapshot.precipitation_24h_mm, None);
    }

    #[tokio::test]
    async fn test_directory_failure_is_source_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/const/amedastable.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = ObservationFetcher::new(&config_for(&server)).unwrap();
        let err = fetcher
            .latest_observation(&Coordinate::new(36.6975, 137.8311))
            .await
            .unwrap_err();
        assert!(matches!(err, SkiWeatherError::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_station_missing_from_snapshot() {
        let server = MockServer::start().await;
        mount_directory(&server).await;
        mount_latest_time(&server, "2025-01-12T09:30+09:00").await;

        Mock::given(method("GET"))
            .and(path("/data/map/20250112093000.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "54157": {"temp": [1.2, 0]}
            })))
            .mount(&server)
            .await;

        let fetcher = ObservationFetcher::new(&config_for(&server)).unwrap();
        let err = fetcher
            .latest_observation(&Coordinate::new(36.6975, 137.8311))
            .await
            .unwrap_err();
        assert!(matches!(err, SkiWeatherError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_empty_directory_finds_no_station() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/const/amedastable.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let fetcher = ObservationFetcher::new(&config_for(&server)).unwrap();
        let err = fetcher
            .latest_observation(&Coordinate::new(36.6975, 137.8311))
            .await
            .unwrap_err();
        assert!(matches!(err, SkiWeatherError::StationNotFound { .. }));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/const/amedastable.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let fetcher = ObservationFetcher::new(&config_for(&server)).unwrap();
        let err = fetcher.fetch_station_directory().await.unwrap_err();
        assert!(matches!(err, SkiWeatherError::SourceUnavailable { .. }));
    }
}
