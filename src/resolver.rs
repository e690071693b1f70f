//! Coordinate Resolution Module
//!
//! Resolves a usable coordinate for a resort through a fixed fallback order:
//! explicit coordinate, prefecture default, known-resort catalog, and finally
//! a single hardcoded default. Resolution never fails.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::Result;
use crate::config::ResolverConfig;
use crate::models::Coordinate;

const EMBEDDED_PREFECTURES: &str = include_str!("../data/prefectures.json");
const EMBEDDED_RESORTS: &str = include_str!("../data/resorts.json");
const EMBEDDED_RESORT_KEYWORDS: &str = include_str!("../data/resort_keywords.json");

/// Which fallback tier produced a coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    Explicit,
    Prefecture,
    ResortCatalog,
    Default,
}

/// A coordinate together with the tier that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCoordinate {
    pub coordinate: Coordinate,
    pub tier: ResolutionTier,
}

/// Representative coordinate and station-area codes for one prefecture
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrefectureDefault {
    /// Japanese name, e.g. "長野県"
    pub name: String,
    /// English name, e.g. "Nagano"
    pub name_en: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Forecast-office area codes covering the prefecture
    #[serde(default)]
    pub area_codes: Vec<String>,
}

impl PrefectureDefault {
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    fn matches(&self, key: &str) -> bool {
        self.name == key || self.name_en.eq_ignore_ascii_case(key)
    }
}

/// Prefecture name to default coordinate mapping; first match wins
#[derive(Debug, Clone, Default)]
pub struct PrefectureTable {
    entries: Vec<PrefectureDefault>,
}

impl PrefectureTable {
    /// Table shipped with the crate
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_PREFECTURES)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<PrefectureDefault> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Look up by Japanese or (case-insensitive) English name
    #[must_use]
    pub fn lookup(&self, prefecture: &str) -> Option<&PrefectureDefault> {
        let key = prefecture.trim();
        if key.is_empty() {
            return None;
        }
        self.entries.iter().find(|entry| entry.matches(key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A known resort with every name it is referred to by
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResortEntry {
    pub names: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Catalog of resorts with surveyed coordinates
#[derive(Debug, Clone, Default)]
pub struct ResortCatalog {
    entries: Vec<ResortEntry>,
    /// Area keywords tried in order once every name match has failed
    keywords: Vec<String>,
}

impl ResortCatalog {
    /// Catalog and area keywords shipped with the crate
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_RESORTS)?.with_embedded_keywords()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<ResortEntry> = serde_json::from_str(json)?;
        Ok(Self {
            entries,
            keywords: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_embedded_keywords(self) -> Result<Self> {
        let keywords: Vec<String> = serde_json::from_str(EMBEDDED_RESORT_KEYWORDS)?;
        Ok(self.with_keywords(keywords))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Find a resort by exact name, then normalized name, then by containment
    /// in either direction, then by area keyword.
    ///
    /// The keyword step takes the first keyword found in the input and
    /// returns the first entry with a name containing that keyword, so
    /// "白馬コルチナ" lands on the first 白馬 resort in catalog order.
    #[must_use]
    pub fn lookup(&self, resort: &str) -> Option<Coordinate> {
        let names = || {
            self.entries
                .iter()
                .flat_map(|entry| entry.names.iter().map(move |name| (name, entry)))
        };

        if let Some((_, entry)) = names().find(|(name, _)| name.as_str() == resort) {
            return Some(Coordinate::new(entry.latitude, entry.longitude));
        }

        let input = normalize_name(resort);
        if input.is_empty() {
            return None;
        }

        if let Some((_, entry)) = names().find(|(name, _)| normalize_name(name) == input) {
            return Some(Coordinate::new(entry.latitude, entry.longitude));
        }

        if let Some((name, entry)) = names().find(|(name, _)| {
            let key = normalize_name(name);
            input.contains(&key) || key.contains(&input)
        }) {
            debug!("Partial resort match '{}' for '{}'", name, resort);
            return Some(Coordinate::new(entry.latitude, entry.longitude));
        }

        self.keywords
            .iter()
            .map(|keyword| normalize_name(keyword))
            .filter(|keyword| !keyword.is_empty() && input.contains(keyword.as_str()))
            .find_map(|keyword| {
                names()
                    .find(|(name, _)| normalize_name(name).contains(&keyword))
                    .map(|(name, entry)| {
                        debug!("Keyword '{}' matched resort '{}' for '{}'", keyword, name, resort);
                        Coordinate::new(entry.latitude, entry.longitude)
                    })
            })
    }
}

/// Full-width ASCII letters and digits to half-width, whitespace removed,
/// lower-cased.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            'Ａ'..='Ｚ' | 'ａ'..='ｚ' | '０'..='９' => {
                char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
            }
            _ => c,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Service for resolving a resort to a coordinate
#[derive(Debug, Clone)]
pub struct CoordinateResolver {
    prefectures: PrefectureTable,
    resorts: ResortCatalog,
    default: Coordinate,
}

impl CoordinateResolver {
    #[must_use]
    pub fn new(prefectures: PrefectureTable, resorts: ResortCatalog, default: Coordinate) -> Self {
        Self {
            prefectures,
            resorts,
            default,
        }
    }

    /// Build from configuration, preferring table files over the embedded data
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let prefectures = match &config.prefecture_table {
            Some(path) => PrefectureTable::from_file(path)?,
            None => PrefectureTable::embedded()?,
        };
        let resorts = match &config.resort_table {
            Some(path) => ResortCatalog::from_file(path)?.with_embedded_keywords()?,
            None => ResortCatalog::embedded()?,
        };
        let default = Coordinate::new(config.default_latitude, config.default_longitude);
        Ok(Self::new(prefectures, resorts, default))
    }

    /// Resolve a coordinate for a resort. Never fails.
    #[must_use]
    pub fn resolve(
        &self,
        resort: &str,
        explicit: Option<Coordinate>,
        prefecture: Option<&str>,
    ) -> ResolvedCoordinate {
        if let Some(coordinate) = explicit.filter(Coordinate::is_usable) {
            debug!(resort, "Using explicit coordinate {}", coordinate.format_coordinates());
            return ResolvedCoordinate {
                coordinate,
                tier: ResolutionTier::Explicit,
            };
        }

        if let Some(entry) = prefecture.and_then(|p| self.prefectures.lookup(p)) {
            info!(
                resort,
                prefecture = entry.name_en.as_str(),
                area_codes = ?entry.area_codes,
                "No explicit coordinate, using prefecture default"
            );
            return ResolvedCoordinate {
                coordinate: entry.coordinate(),
                tier: ResolutionTier::Prefecture,
            };
        }

        if let Some(coordinate) = self.resorts.lookup(resort) {
            info!(resort, "No explicit coordinate, using resort catalog entry");
            return ResolvedCoordinate {
                coordinate,
                tier: ResolutionTier::ResortCatalog,
            };
        }

        warn!(
            resort,
            "No coordinate source matched, using hardcoded default {}",
            self.default.format_coordinates()
        );
        ResolvedCoordinate {
            coordinate: self.default,
            tier: ResolutionTier::Default,
        }
    }
}
