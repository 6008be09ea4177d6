//! Administrative geography lookups (province → city → commune → quartier)
//! and GPS coordinate parsing.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

static COORDINATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*[,;\s]\s*(-?\d+(?:\.\d+)?)\s*$")
        .expect("coordinate pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Reads `"lat, lng"` (comma, semicolon or whitespace separated).
    pub fn parse(raw: &str) -> Option<Self> {
        let captures = COORDINATES.captures(raw)?;
        let latitude = captures[1].parse::<f64>().ok()?;
        let longitude = captures[2].parse::<f64>().ok()?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub province: String,
}

/// Reference tables for manual location entry. Unknown keys yield empty lists.
pub trait GeoDirectory {
    fn provinces(&self) -> Vec<String>;
    fn cities_of(&self, province: &str) -> Vec<City>;
    fn communes_of(&self, province: &str, city: &str) -> Vec<String>;
    fn quartiers_of(&self, province: &str, city: &str, commune: &str) -> Vec<String>;
}

type Communes = IndexMap<String, Vec<String>>;

/// In-memory tables shaped `{province: {city: {commune: [quartier, ...]}}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticGeoDirectory {
    provinces: IndexMap<String, IndexMap<String, Communes>>,
}

impl StaticGeoDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, province: &str, city: &str, commune: &str, quartiers: &[&str]) {
        self.provinces
            .entry(province.to_string())
            .or_default()
            .entry(city.to_string())
            .or_default()
            .entry(commune.to_string())
            .or_default()
            .extend(quartiers.iter().map(|q| q.to_string()));
    }

    fn communes(&self, province: &str, city: &str) -> Option<&Communes> {
        self.provinces.get(province)?.get(city)
    }
}

impl GeoDirectory for StaticGeoDirectory {
    fn provinces(&self) -> Vec<String> {
        self.provinces.keys().cloned().collect()
    }

    fn cities_of(&self, province: &str) -> Vec<City> {
        self.provinces
            .get(province)
            .map(|cities| {
                cities
                    .keys()
                    .map(|name| City {
                        name: name.clone(),
                        province: province.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn communes_of(&self, province: &str, city: &str) -> Vec<String> {
        self.communes(province, city)
            .map(|communes| communes.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn quartiers_of(&self, province: &str, city: &str, commune: &str) -> Vec<String> {
        self.communes(province, city)
            .and_then(|communes| communes.get(commune))
            .cloned()
            .unwrap_or_default()
    }
}
