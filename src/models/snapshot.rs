//! Date-keyed snapshot used by callers that cache fused weather per day

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::FusedWeather;

/// One fused record for a (resort, date) pair
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailySnapshot {
    pub resort_id: String,
    pub date: NaiveDate,
    pub weather: FusedWeather,
}

impl DailySnapshot {
    #[must_use]
    pub fn new(resort_id: impl Into<String>, date: NaiveDate, weather: FusedWeather) -> Self {
        Self {
            resort_id: resort_id.into(),
            date,
            weather,
        }
    }

    /// A snapshot is stale as soon as its date differs from today
    #[must_use]
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.date != today
    }

    /// Upsert key for the caller's store
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("weather:{}:{}", self.resort_id, self.date)
    }
}

/// Whether the engine has to be invoked for a resort given its cached record
#[must_use]
pub fn needs_refresh(cached: Option<&DailySnapshot>, today: NaiveDate) -> bool {
    cached.is_none_or(|snapshot| snapshot.is_stale(today))
}

/// Current calendar date in the given timezone
#[must_use]
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SnowQuality, Visibility};

    fn weather() -> FusedWeather {
        FusedWeather {
            temp_c: -3,
            new_snow_cm: 0.0,
            base_depth_cm: 120,
            wind_ms: 2.0,
            visibility: Visibility::Good,
            snow_quality: SnowQuality::Packed,
            weather_code: 2,
        }
    }

    #[test]
    fn test_staleness() {
        let day = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let snapshot = DailySnapshot::new("hakuba-happo", day, weather());
        assert!(!snapshot.is_stale(day));
        assert!(snapshot.is_stale(day.succ_opt().unwrap()));
        assert_eq!(snapshot.cache_key(), "weather:hakuba-happo:2025-02-01");
    }

    #[test]
    fn test_needs_refresh() {
        let day = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let snapshot = DailySnapshot::new("nozawa-onsen", day, weather());
        assert!(needs_refresh(None, day));
        assert!(!needs_refresh(Some(&snapshot), day));
        assert!(needs_refresh(Some(&snapshot), day.pred_opt().unwrap()));
    }
}
