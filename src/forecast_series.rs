//! Seven-day forecast series
//!
//! [`ForecastSeriesBuilder`] maps provider daily values onto display entries.
//! [`SyntheticForecastGenerator`] produces a plausible placeholder series for
//! when the provider cannot be reached, so the series is never empty.

use chrono::{Datelike, Days, NaiveDate};
use rand::RngExt;

use crate::fusion::round_half_up;
use crate::models::{DailyCondition, DailyForecastEntry, DailyOutlook};
use crate::{Result, SkiWeatherError};

/// Number of days in every series
pub const SERIES_DAYS: usize = 7;

const JA_WEEKDAYS: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];
const EN_WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Language of the weekday label attached to each entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekdayLabels {
    #[default]
    Japanese,
    English,
}

impl WeekdayLabels {
    /// Parse a configured label set; `ja` or `en`
    pub fn from_code(code: &str) -> Result<Self> {
        match code.to_lowercase().as_str() {
            "ja" => Ok(Self::Japanese),
            "en" => Ok(Self::English),
            other => Err(SkiWeatherError::config(format!(
                "Unknown weekday label set '{other}'. Valid values: ja, en"
            ))),
        }
    }

    #[must_use]
    pub fn label(self, date: NaiveDate) -> &'static str {
        let index = date.weekday().num_days_from_sunday() as usize;
        match self {
            Self::Japanese => JA_WEEKDAYS[index],
            Self::English => EN_WEEKDAYS[index],
        }
    }
}

/// Maps provider daily values to [`DailyForecastEntry`] values
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastSeriesBuilder {
    labels: WeekdayLabels,
}

impl ForecastSeriesBuilder {
    #[must_use]
    pub fn new(labels: WeekdayLabels) -> Self {
        Self { labels }
    }

    /// Build a full series; fewer than [`SERIES_DAYS`] days is an error
    pub fn build(&self, days: &[DailyOutlook]) -> Result<Vec<DailyForecastEntry>> {
        if days.len() < SERIES_DAYS {
            return Err(SkiWeatherError::parse(format!(
                "provider returned {} days, expected {SERIES_DAYS}",
                days.len()
            )));
        }

        Ok(days
            .iter()
            .take(SERIES_DAYS)
            .map(|day| self.entry(day))
            .collect())
    }

    fn entry(&self, day: &DailyOutlook) -> DailyForecastEntry {
        DailyForecastEntry {
            date: day.date,
            day_of_week: self.labels.label(day.date).to_string(),
            temp_high: round_half_up(day.temp_max_c.unwrap_or(0.0), 0) as i32,
            temp_low: round_half_up(day.temp_min_c.unwrap_or(0.0), 0) as i32,
            snowfall_cm: round_half_up(day.snowfall_cm.unwrap_or(0.0), 1),
            condition: day
                .weather_code
                .map_or(DailyCondition::Cloudy, DailyCondition::from_weather_code),
        }
    }
}

/// Placeholder series used when the forecast provider fails
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticForecastGenerator {
    labels: WeekdayLabels,
}

impl SyntheticForecastGenerator {
    #[must_use]
    pub fn new(labels: WeekdayLabels) -> Self {
        Self { labels }
    }

    /// Seven consecutive days starting at `start`, drawn from `rng`.
    ///
    /// Highs fall in [-5, 5], lows in [-15, -5] and snowfall in [0, 15] cm.
    pub fn generate<R: RngExt>(&self, rng: &mut R, start: NaiveDate) -> Vec<DailyForecastEntry> {
        (0..SERIES_DAYS)
            .map(|offset| {
                let date = start
                    .checked_add_days(Days::new(offset as u64))
                    .unwrap_or(start);
                let high: f64 = rng.random();
                let low: f64 = rng.random();
                let snow: f64 = rng.random();
                let condition = DailyCondition::ALL[rng.random_range(0..DailyCondition::ALL.len())];

                DailyForecastEntry {
                    date,
                    day_of_week: self.labels.label(date).to_string(),
                    temp_high: round_half_up(high * 10.0 - 5.0, 0) as i32,
                    temp_low: round_half_up(low * 10.0 - 15.0, 0) as i32,
                    snowfall_cm: round_half_up(snow * 15.0, 1),
                    condition,
                }
            })
            .collect()
    }

    /// Same as [`generate`](Self::generate) using the thread-local generator
    #[must_use]
    pub fn generate_from_entropy(&self, start: NaiveDate) -> Vec<DailyForecastEntry> {
        self.generate(&mut rand::rng(), start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 12).unwrap()
    }

    fn outlook(offset: u64, max: f64, min: f64, snow: Option<f64>, code: Option<i32>) -> DailyOutlook {
        DailyOutlook {
            date: sunday() + Days::new(offset),
            temp_max_c: Some(max),
            temp_min_c: Some(min),
            snowfall_cm: snow,
            weather_code: code,
        }
    }

    fn week() -> Vec<DailyOutlook> {
        vec![
            outlook(0, -1.5, -9.0, Some(3.26), Some(73)),
            outlook(1, 0.5, -8.4, None, Some(3)),
            outlook(2, 2.0, -6.5, Some(0.0), Some(0)),
            outlook(3, -3.0, -12.0, Some(12.04), Some(75)),
            outlook(4, -4.4, -13.0, Some(20.1), Some(86)),
            outlook(5, 1.0, -7.0, Some(0.0), None),
            outlook(6, 0.0, -8.0, Some(1.2), Some(61)),
        ]
    }

    #[test]
    fn test_build_maps_each_day() {
        let entries = ForecastSeriesBuilder::default().build(&week()).unwrap();
        assert_eq!(entries.len(), SERIES_DAYS);

        assert_eq!(entries[0].day_of_week, "日");
        assert_eq!(entries[0].snowfall_cm, 3.3);
        assert_eq!(entries[0].temp_high, -1);
        assert_eq!(entries[0].condition, DailyCondition::Snow);

        assert_eq!(entries[1].snowfall_cm, 0.0);
        assert_eq!(entries[1].temp_high, 1);
        assert_eq!(entries[1].temp_low, -8);
        assert_eq!(entries[1].day_of_week, "月");

        assert_eq!(entries[3].snowfall_cm, 12.0);
        assert_eq!(entries[4].condition, DailyCondition::Rain);
        assert_eq!(entries[5].condition, DailyCondition::Cloudy);
        assert_eq!(entries[6].day_of_week, "土");
    }

    #[test]
    fn test_build_defaults_null_temperature_to_zero() {
        let mut days = week();
        days[2].temp_max_c = None;
        days[2].temp_min_c = None;
        let entries = ForecastSeriesBuilder::default().build(&days).unwrap();
        assert_eq!(entries[2].temp_high, 0);
        assert_eq!(entries[2].temp_low, 0);
        assert_eq!(entries[3].temp_low, -12);
    }

    #[test]
    fn test_build_rejects_short_series() {
        let mut days = week();
        days.truncate(5);
        assert!(ForecastSeriesBuilder::default().build(&days).is_err());
    }

    #[test]
    fn test_build_truncates_long_series() {
        let mut days = week();
        days.push(outlook(7, 0.0, -1.0, None, None));
        let entries = ForecastSeriesBuilder::default().build(&days).unwrap();
        assert_eq!(entries.len(), SERIES_DAYS);
    }

    #[rstest]
    #[case(WeekdayLabels::Japanese, 0, "日")]
    #[case(WeekdayLabels::Japanese, 3, "水")]
    #[case(WeekdayLabels::English, 0, "Sun")]
    #[case(WeekdayLabels::English, 6, "Sat")]
    fn test_weekday_labels(#[case] labels: WeekdayLabels, #[case] offset: u64, #[case] expected: &str) {
        assert_eq!(labels.label(sunday() + Days::new(offset)), expected);
    }

    #[test]
    fn test_weekday_label_codes() {
        assert_eq!(WeekdayLabels::from_code("EN").unwrap(), WeekdayLabels::English);
        assert!(WeekdayLabels::from_code("fr").is_err());
    }

    #[test]
    fn test_synthetic_series_ranges() {
        let generator = SyntheticForecastGenerator::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let entries = generator.generate(&mut rng, sunday());
            assert_eq!(entries.len(), SERIES_DAYS);

            for (offset, entry) in entries.iter().enumerate() {
                assert_eq!(entry.date, sunday() + Days::new(offset as u64));
                assert!((-5..=5).contains(&entry.temp_high), "high {}", entry.temp_high);
                assert!((-15..=-5).contains(&entry.temp_low), "low {}", entry.temp_low);
                assert!((0.0..=15.0).contains(&entry.snowfall_cm));
                let tenths = entry.snowfall_cm * 10.0;
                assert!((tenths - tenths.round()).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_synthetic_series_is_seed_deterministic() {
        let generator = SyntheticForecastGenerator::new(WeekdayLabels::English);
        let a = generator.generate(&mut StdRng::seed_from_u64(42), sunday());
        let b = generator.generate(&mut StdRng::seed_from_u64(42), sunday());
        assert_eq!(a, b);
        assert_eq!(a[0].day_of_week, "Sun");
    }

    #[test]
    fn test_generate_from_entropy() {
        let entries = SyntheticForecastGenerator::default().generate_from_entropy(sunday());
        assert_eq!(entries.len(), SERIES_DAYS);
    }
}
