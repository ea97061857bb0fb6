//! Optional short advice from Gemini, based on the current conditions.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, time::Duration};

use crate::{error::AdviceError, model::Temperature};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Text-in/text-out service producing a suggestion for the day.
#[async_trait]
pub trait AdviceService: Send + Sync + Debug {
    async fn advise(
        &self,
        temperature_c: &Temperature,
        condition: &str,
    ) -> Result<String, AdviceError>;
}

pub fn advice_prompt(temperature_c: &Temperature, condition: &str) -> String {
    format!(
        "The current temperature is {temperature_c}°C and the weather is '{condition}'. \
         Give a short, friendly advice for today."
    )
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiAdvisor {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiAdvisor {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, AdviceError> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    async fn generate(&self, prompt: String) -> Result<String, AdviceError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);

        let request = GenerateContentRequest {
            contents: vec![Content { role: "user".to_string(), parts: vec![Part { text: prompt }] }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AdviceError::Status { status: status.as_u16(), body: truncate_body(&body) });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        parsed.text().ok_or(AdviceError::Empty)
    }
}

#[async_trait]
impl AdviceService for GeminiAdvisor {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn advise(
        &self,
        temperature_c: &Temperature,
        condition: &str,
    ) -> Result<String, AdviceError> {
        self.generate(advice_prompt(temperature_c, condition)).await
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().filter_map(|p| p.text.as_deref()).collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_temperature_and_condition() {
        assert_eq!(
            advice_prompt(&serde_json::from_str("18.5").unwrap(), "Light rain"),
            "The current temperature is 18.5°C and the weather is 'Light rain'. \
             Give a short, friendly advice for today."
        );
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Take an umbrella"}, {"text": " and smile."}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text().as_deref(), Some("Take an umbrella and smile."));
    }

    #[test]
    fn response_without_text_is_empty() {
        let parsed: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(parsed.text(), None);

        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert_eq!(parsed.text(), None);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let long = "°".repeat(300);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
