use std::fmt;

use crate::{
    error::ErrorReport,
    icon::Icon,
    model::{LookupOutcome, WeatherSummary},
};

/// The four display fields of the weather panel.
///
/// An error takes the temperature field and clears everything else, so a
/// failed lookup never leaves the previous city's icon or advice on screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherPanel {
    pub temperature: String,
    pub icon: Option<Icon>,
    pub description: String,
    pub advice: String,
    pub is_error: bool,
}

impl WeatherPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, outcome: &LookupOutcome) {
        match outcome {
            LookupOutcome::Weather(summary) => self.show_weather(summary),
            LookupOutcome::Failed(report) => self.show_error(report),
        }
    }

    pub fn show_weather(&mut self, summary: &WeatherSummary) {
        self.temperature = summary.temperature.clone();
        self.icon = summary.icon.clone();
        self.description = summary.description.clone();
        self.advice = summary.advice.clone();
        self.is_error = false;
    }

    pub fn show_error(&mut self, report: &ErrorReport) {
        self.temperature = report.to_string();
        self.icon = None;
        self.description.clear();
        self.advice.clear();
        self.is_error = true;
    }
}

impl fmt::Display for WeatherPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.temperature)?;

        if let Some(icon) = self.icon.as_ref().filter(|i| i.is_image()) {
            match (icon.format, icon.dimensions) {
                (Some(format), Some((w, h))) => writeln!(f, "[icon {format} {w}x{h}] {}", icon.url)?,
                (Some(format), None) => writeln!(f, "[icon {format}] {}", icon.url)?,
                _ => {}
            }
        }

        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
        }

        if !self.advice.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.advice)?;
        }

        Ok(())
    }
}
