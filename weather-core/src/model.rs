use serde::Deserialize;
use std::fmt;

use crate::{error::ErrorReport, icon::Icon};

/// Celsius reading exactly as the provider wrote it.
///
/// Kept as a JSON number so `11.0` stays `11.0` and `11` stays `11` when shown.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Temperature(serde_json::Number);

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Current conditions as reported by the weather provider for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Location name the provider resolved the query to.
    pub location_name: String,
    pub temperature_c: Temperature,
    pub condition: String,
    /// Scheme-relative icon URL, e.g. `//cdn.weatherapi.com/weather/64x64/day/113.png`.
    pub icon: String,
}

impl CurrentConditions {
    /// Case-insensitive comparison of the resolved location with the user's query.
    pub fn matches_query(&self, query: &str) -> bool {
        self.location_name.to_lowercase() == query.to_lowercase()
    }
}

/// What a successful lookup puts on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSummary {
    /// Temperature with its Celsius suffix, e.g. `21.4℃`.
    pub temperature: String,
    pub icon: Option<Icon>,
    pub description: String,
    /// Advice text, an inline `AI Error: ...` string, or empty when no advice
    /// service is configured.
    pub advice: String,
}

/// Outcome of one lookup. Superseded by the next one.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Weather(WeatherSummary),
    Failed(ErrorReport),
}

impl LookupOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LookupOutcome::Weather(_))
    }
}

pub fn format_temperature(temperature_c: &Temperature) -> String {
    format!("{temperature_c}℃")
}
