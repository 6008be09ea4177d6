use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;

use crate::domain::FieldDescriptor;
use crate::form::DEFAULT_DEBOUNCE;

/// Matches `geolocalisation`, `géolocalisation`, `geolocalization`, any case.
pub const DEFAULT_GEOLOCATION_PATTERN: &str = "(?i)g[ée]olocali[sz]ation";

pub const DEFAULT_MANUAL_LOCATION_PARTS: [&str; 4] = ["province", "city", "commune", "quartier"];

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Quiet period before a buffered edit is committed.
    pub debounce: Duration,
    /// Fields whose id or label match must carry a location before submission.
    pub geolocation_pattern: Regex,
    /// Companion answers (`{field_id}.{part}`) that together stand in for
    /// coordinates when the location was entered by hand.
    pub manual_location_parts: Vec<String>,
    pub validate_constraints: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            geolocation_pattern: Regex::new(DEFAULT_GEOLOCATION_PATTERN)
                .expect("default geolocation pattern compiles"),
            manual_location_parts: DEFAULT_MANUAL_LOCATION_PARTS
                .iter()
                .map(|part| part.to_string())
                .collect(),
            validate_constraints: true,
        }
    }
}

impl EngineOptions {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_geolocation_regex(mut self, pattern: Regex) -> Self {
        self.geolocation_pattern = pattern;
        self
    }

    pub fn with_geolocation_pattern(self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("invalid geolocation pattern '{pattern}'"))?;
        Ok(self.with_geolocation_regex(regex))
    }

    pub fn with_manual_location_parts<I, S>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manual_location_parts = parts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_constraint_validation(mut self, enabled: bool) -> Self {
        self.validate_constraints = enabled;
        self
    }

    pub fn is_geolocation_field(&self, field: &FieldDescriptor) -> bool {
        !field.field_type.is_display_only()
            && (self.geolocation_pattern.is_match(&field.id)
                || self.geolocation_pattern.is_match(&field.label))
    }

    pub fn manual_location_ids(&self, field_id: &str) -> Vec<String> {
        self.manual_location_parts
            .iter()
            .map(|part| format!("{field_id}.{part}"))
            .collect()
    }
}
