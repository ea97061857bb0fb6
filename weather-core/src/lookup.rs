//! The lookup flow: weather, then icon, then (optionally) advice.

use anyhow::Result;
use tracing::Instrument;

use crate::{
    advice::{AdviceService, GeminiAdvisor},
    config::{Config, ServiceId},
    error::LookupError,
    model::{LookupOutcome, Temperature, WeatherSummary, format_temperature},
    provider::{WeatherApiProvider, WeatherProvider},
};

/// One city query in, one display outcome out.
///
/// Calls are sequential and never retried. [`WeatherLookup::lookup`] does not
/// fail: every error becomes [`LookupOutcome::Failed`].
#[derive(Debug)]
pub struct WeatherLookup {
    provider: Option<Box<dyn WeatherProvider>>,
    advisor: Option<Box<dyn AdviceService>>,
}

impl WeatherLookup {
    /// `provider` is `None` when no weather credential is configured.
    pub fn new(
        provider: Option<Box<dyn WeatherProvider>>,
        advisor: Option<Box<dyn AdviceService>>,
    ) -> Self {
        Self { provider, advisor }
    }

    /// Build the weatherapi.com provider and, when a Gemini key exists, the advisor.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = match config.api_key(ServiceId::WeatherApi) {
            Some(key) => {
                let mut provider = WeatherApiProvider::new(key.to_owned());
                if let Some(base) = &config.weather_base_url {
                    provider = provider.with_base_url(base);
                }
                if let Some(timeout) = config.timeout() {
                    provider = provider.with_timeout(timeout)?;
                }
                Some(Box::new(provider) as Box<dyn WeatherProvider>)
            }
            None => None,
        };

        let advisor = match config.api_key(ServiceId::Gemini) {
            Some(key) => {
                let mut advisor = GeminiAdvisor::new(key);
                if let Some(model) = &config.gemini_model {
                    advisor = advisor.with_model(model);
                }
                if let Some(base) = &config.gemini_base_url {
                    advisor = advisor.with_base_url(base);
                }
                if let Some(timeout) = config.timeout() {
                    advisor = advisor.with_timeout(timeout)?;
                }
                Some(Box::new(advisor) as Box<dyn AdviceService>)
            }
            None => None,
        };

        Ok(Self::new(provider, advisor))
    }

    /// Drop the advice step for this instance.
    pub fn without_advice(mut self) -> Self {
        self.advisor = None;
        self
    }

    pub async fn lookup(&self, city: &str) -> LookupOutcome {
        let span = tracing::info_span!("lookup", city);

        async {
            match self.fetch_weather(city).await {
                Ok(summary) => {
                    tracing::info!(temperature = %summary.temperature, "weather displayed");
                    LookupOutcome::Weather(summary)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "lookup failed");
                    LookupOutcome::Failed(err.report())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn fetch_weather(&self, city: &str) -> Result<WeatherSummary, LookupError> {
        let provider = self.provider.as_ref().ok_or(LookupError::MissingApiKey)?;

        let current = provider.current(city).await?;
        if !current.matches_query(city) {
            return Err(LookupError::NameMismatch {
                requested: city.to_string(),
                resolved: current.location_name,
            });
        }

        let icon = provider.icon(&current.icon).await?;
        let advice = self.advice(&current.temperature_c, &current.condition).await;

        Ok(WeatherSummary {
            temperature: format_temperature(&current.temperature_c),
            icon: Some(icon),
            description: current.condition,
            advice,
        })
    }

    async fn advice(&self, temperature_c: &Temperature, condition: &str) -> String {
        let Some(advisor) = &self.advisor else {
            return String::new();
        };

        match advisor.advise(temperature_c, condition).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "advice unavailable");
                format!("AI Error: {err}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{AdviceError, ErrorReport},
        icon::{Icon, tests::png_header},
        model::CurrentConditions,
    };
    use async_trait::async_trait;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug, Default)]
    struct Calls {
        current: AtomicUsize,
        icon: AtomicUsize,
        advice: AtomicUsize,
    }

    #[derive(Debug)]
    enum Reply {
        Conditions(&'static str, &'static str, &'static str),
        ProviderError(i64, &'static str),
    }

    #[derive(Debug)]
    struct FakeProvider {
        reply: Reply,
        calls: Arc<Calls>,
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current(&self, _city: &str) -> Result<CurrentConditions, LookupError> {
            self.calls.current.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Reply::Conditions(name, temp, text) => Ok(CurrentConditions {
                    location_name: name.to_string(),
                    temperature_c: serde_json::from_str(temp).expect("JSON number"),
                    condition: text.to_string(),
                    icon: "//cdn.weatherapi.com/weather/64x64/day/113.png".to_string(),
                }),
                Reply::ProviderError(code, message) => Err(LookupError::from_provider(code, message)),
            }
        }

        async fn icon(&self, reference: &str) -> Result<Icon, LookupError> {
            self.calls.icon.fetch_add(1, Ordering::SeqCst);
            Ok(Icon::decode(format!("http:{reference}"), png_header(64, 64)))
        }
    }

    #[derive(Debug)]
    struct FakeAdvisor {
        fail: bool,
        calls: Arc<Calls>,
    }

    #[async_trait]
    impl AdviceService for FakeAdvisor {
        async fn advise(
            &self,
            temperature_c: &Temperature,
            condition: &str,
        ) -> Result<String, AdviceError> {
            self.calls.advice.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AdviceError::Empty)
            } else {
                Ok(format!("{condition} at {temperature_c}: wear a hat"))
            }
        }
    }

    fn lookup_with(reply: Reply, advisor: Option<bool>) -> (WeatherLookup, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let provider = FakeProvider { reply, calls: calls.clone() };
        let advisor = advisor.map(|fail| {
            Box::new(FakeAdvisor { fail, calls: calls.clone() }) as Box<dyn AdviceService>
        });
        (WeatherLookup::new(Some(Box::new(provider)), advisor), calls)
    }

    fn city_not_found() -> LookupOutcome {
        LookupOutcome::Failed(ErrorReport::new("Not Found", "City not found"))
    }

    #[tokio::test]
    async fn missing_key_makes_no_call() {
        let lookup = WeatherLookup::new(None, None);
        let outcome = lookup.lookup("London").await;
        assert_eq!(
            outcome,
            LookupOutcome::Failed(ErrorReport::new("API key not found", "Check your .env file"))
        );
    }

    #[tokio::test]
    async fn from_config_without_keys_reports_missing_key() {
        let lookup = WeatherLookup::from_config(&Config::default()).expect("build");
        let outcome = lookup.lookup("London").await;
        assert_eq!(
            outcome,
            LookupOutcome::Failed(ErrorReport::new("API key not found", "Check your .env file"))
        );
    }

    #[tokio::test]
    async fn matching_name_renders_weather_and_advice() {
        let (lookup, calls) = lookup_with(Reply::Conditions("London", "11.2", "Partly cloudy"), Some(false));

        let LookupOutcome::Weather(summary) = lookup.lookup("london").await else {
            panic!("expected weather");
        };

        assert_eq!(summary.temperature, "11.2℃");
        assert_eq!(summary.description, "Partly cloudy");
        assert_eq!(summary.advice, "Partly cloudy at 11.2: wear a hat");
        assert_eq!(summary.icon.as_ref().and_then(|i| i.dimensions), Some((64, 64)));
        assert_eq!(calls.icon.load(Ordering::SeqCst), 1);
        assert_eq!(calls.advice.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn name_mismatch_is_city_not_found_and_skips_icon() {
        let (lookup, calls) = lookup_with(Reply::Conditions("Parisot", "20.0", "Sunny"), Some(false));

        assert_eq!(lookup.lookup("Paris").await, city_not_found());
        assert_eq!(calls.icon.load(Ordering::SeqCst), 0);
        assert_eq!(calls.advice.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn provider_1006_is_city_not_found() {
        let (lookup, _) = lookup_with(Reply::ProviderError(1006, "No matching location found."), None);
        assert_eq!(lookup.lookup("Atlantis").await, city_not_found());
    }

    #[tokio::test]
    async fn other_provider_errors_are_verbatim() {
        let (lookup, _) = lookup_with(Reply::ProviderError(2008, "API key has been disabled."), None);
        assert_eq!(
            lookup.lookup("London").await,
            LookupOutcome::Failed(ErrorReport::new("API Error 2008", "API key has been disabled."))
        );
    }

    #[tokio::test]
    async fn advice_failure_is_inline() {
        let (lookup, _) = lookup_with(Reply::Conditions("Oslo", "-4.0", "Snow"), Some(true));

        let LookupOutcome::Weather(summary) = lookup.lookup("Oslo").await else {
            panic!("expected weather");
        };
        assert_eq!(summary.temperature, "-4.0℃");
        assert_eq!(summary.advice, "AI Error: response contained no text");
    }

    #[tokio::test]
    async fn no_advisor_leaves_advice_empty() {
        let (lookup, calls) = lookup_with(Reply::Conditions("Oslo", "-4.0", "Snow"), None);

        let LookupOutcome::Weather(summary) = lookup.lookup("Oslo").await else {
            panic!("expected weather");
        };
        assert!(summary.advice.is_empty());
        assert_eq!(calls.advice.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn without_advice_skips_advisor() {
        let (lookup, calls) = lookup_with(Reply::Conditions("Oslo", "-4.0", "Snow"), Some(false));
        let lookup = lookup.without_advice();

        assert!(lookup.lookup("Oslo").await.is_success());
        assert_eq!(calls.advice.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn repeated_lookup_is_identical() {
        let (lookup, calls) = lookup_with(Reply::Conditions("Rome", "25.0", "Clear"), Some(false));

        let first = lookup.lookup("Rome").await;
        let second = lookup.lookup("Rome").await;
        assert_eq!(first, second);
        assert_eq!(calls.current.load(Ordering::SeqCst), 2);
    }
}
