//! Groq backend
//!
//! OpenAI-style chat completions endpoint. First in the dispatch priority
//! order because it is the fastest and most stable of the two providers.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::RemoteExtractor;
use crate::config::Config;
use crate::error::{MagnoError, MagnoResult};

pub struct GroqBackend {
    url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

impl GroqBackend {
    pub fn new(config: &Config) -> Self {
        Self {
            url: config.groq_url.clone(),
            api_key: config.groq_api_key.clone(),
            model: config.groq_model.clone(),
            timeout: Duration::from_secs(config.request_timeout),
        }
    }
}

#[async_trait]
impl RemoteExtractor for GroqBackend {
    fn name(&self) -> &'static str {
        "Groq"
    }

    async fn extract(&self, prompt: &str) -> MagnoResult<String> {
        let client = reqwest::Client::new();
        let response = client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "system",
                        "content": "Você é um extrator de dados. Retorne APENAS JSON puro, sem markdown ou explicações."
                    },
                    {
                        "role": "user",
                        "content": prompt
                    }
                ],
                "temperature": 0.2,
                "max_tokens": 500
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
            warn!("Groq API error ({}): {}", status, body);
            return Err(MagnoError::Backend(format!("API error: {}", status)));
        }

        debug!("Groq raw body: {}", body);

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| MagnoError::Backend("response had no choices".to_string()))
    }
}
