use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;

use super::RecommendationProvider;

const API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Google Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    api_key: Option<String>,
    model: String,
    base_url: String,
    http: Client,
}

impl GeminiProvider {
    /// Without an API key every call fails with [`AdvisorError::NotConfigured`].
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self::with_base_url(api_key, model, API_URL.to_string())
    }

    pub fn with_base_url(api_key: Option<String>, model: String, base_url: String) -> Self {
        Self { api_key, model, base_url, http: Client::new() }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
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
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();

        if text.is_empty() { None } else { Some(text) }
    }
}

#[async_trait]
impl RecommendationProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, AdvisorError> {
        let api_key = self.api_key.as_deref().ok_or(AdvisorError::NotConfigured)?;
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let req = GenerateRequest {
            contents: vec![Content { parts: vec![RequestPart { text: prompt }] }],
        };

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&req)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AdvisorError::Api { status: status.as_u16(), message });
        }

        let text = response.text().await?;
        let body: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| AdvisorError::Malformed(e.to_string()))?;

        body.into_text().ok_or(AdvisorError::EmptyResponse)
    }
}
