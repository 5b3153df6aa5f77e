//! Gemini backend
//!
//! generateContent endpoint; second in the dispatch priority order.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::RemoteExtractor;
use crate::config::Config;
use crate::error::{MagnoError, MagnoResult};

pub struct GeminiBackend {
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: String,
}

impl GeminiBackend {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.gemini_url.clone(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            timeout: Duration::from_secs(config.request_timeout),
        }
    }
}

#[async_trait]
impl RemoteExtractor for GeminiBackend {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    async fn extract(&self, prompt: &str) -> MagnoResult<String> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let client = reqwest::Client::new();
        let response = client
            .post(&url)
            .json(&serde_json::json!({
                "contents": [{
                    "parts": [{ "text": prompt }]
                }],
                "generationConfig": {
                    "temperature": 0.1,
                    "maxOutputTokens": 300
                }
            }))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| MagnoError::Backend(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MagnoError::Backend(format!("unreadable response body: {}", e)))?;

        if !status.is_success() {
            warn!("Gemini API error ({}): {}", status, body);
            return Err(MagnoError::Backend(format!("API error: {}", status)));
        }

        debug!("Gemini raw body: {}", body);

        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| MagnoError::Backend("response had no candidates".to_string()))
    }
}
