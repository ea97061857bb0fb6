use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::LookupError,
    icon::{Icon, icon_url},
    model::{CurrentConditions, Temperature},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com";

/// weatherapi.com client for current conditions.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http: Client::new() }
    }

    /// Point the client at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LookupError> {
        self.http = Client::builder().timeout(timeout).build().map_err(LookupError::Request)?;
        Ok(self)
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response, LookupError> {
        self.http.get(url).query(query).send().await.map_err(LookupError::from_transport)
    }
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    error: WaError,
}

#[derive(Debug, Deserialize)]
struct WaError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: Temperature,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

/// Turn a current.json body into conditions or a classified error.
///
/// An `error` payload wins over the HTTP status: weatherapi.com sends
/// "no matching location" (1006) together with a 400.
fn parse_current(
    status_error: Option<reqwest::Error>,
    body: &str,
) -> Result<CurrentConditions, LookupError> {
    if let Ok(payload) = serde_json::from_str::<WaErrorBody>(body) {
        return Err(LookupError::from_provider(payload.error.code, payload.error.message));
    }

    if let Some(err) = status_error {
        return Err(LookupError::from_transport(err));
    }

    let parsed: WaResponse = serde_json::from_str(body)?;

    Ok(CurrentConditions {
        location_name: parsed.location.name,
        temperature_c: parsed.current.temp_c,
        condition: parsed.current.condition.text,
        icon: parsed.current.condition.icon,
    })
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn current(&self, city: &str) -> Result<CurrentConditions, LookupError> {
        let url = format!("{}/v1/current.json", self.base_url);

        let res = self
            .get(&url, &[("key", self.api_key.as_str()), ("q", city), ("aqi", "no")])
            .await?;

        let status_error = res.error_for_status_ref().err();
        tracing::debug!(status = %res.status(), "weatherapi responded");

        let body = res.text().await.map_err(LookupError::from_transport)?;
        parse_current(status_error, &body)
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn icon(&self, reference: &str) -> Result<Icon, LookupError> {
        let url = icon_url(reference);

        // A non-2xx icon response is not fatal; its body just won't decode.
        let res = self.get(&url, &[]).await?;
        tracing::debug!(status = %res.status(), "icon responded");
        let bytes = res.bytes().await.map_err(LookupError::from_transport)?;

        let icon = Icon::decode(url, bytes.to_vec());
        if !icon.is_image() {
            tracing::warn!(url = %icon.url, len = icon.bytes.len(), "icon is not a recognised image");
        }
        Ok(icon)
    }
}
