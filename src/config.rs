use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Remote extraction backends
    pub groq_api_key: String,
    pub groq_model: String,
    pub groq_url: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_url: String,
    pub request_timeout: u64,

    // Data
    pub db_path: String,

    // Meta
    pub log_level: String,

    // Voice corrections applied before classification
    pub voice_corrections: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groq_api_key: "".to_string(),
            groq_model: "llama-3.3-70b-versatile".to_string(),
            groq_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            gemini_api_key: "".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            gemini_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            request_timeout: 10,
            db_path: dirs::data_dir()
                .unwrap_or_default()
                .join("magno/magno.db")
                .to_string_lossy()
                .to_string(),
            log_level: "INFO".to_string(),
            voice_corrections: HashMap::from([
                ("plaque".to_string(), "placa".to_string()),
                ("cambio".to_string(), "câmbio".to_string()),
                ("onda civic".to_string(), "honda civic".to_string()),
            ]),
        }
    }
}

impl Config {
    /// Load config from file or create default
    pub fn load() -> Result<Self> {
        let config_path = config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            match serde_json::from_str::<Config>(&content) {
                Ok(config) => Ok(config.with_env_keys()),
                Err(e) => {
                    // Graceful degradation: log warning and use defaults
                    tracing::warn!("Config file corrupted or invalid, using defaults: {}", e);
                    // Backup corrupt file for debugging
                    let backup_path = config_path.with_extension("json.corrupt");
                    let _ = std::fs::rename(&config_path, &backup_path);
                    Ok(Self::default().with_env_keys())
                }
            }
        } else {
            Ok(Self::default().with_env_keys())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let config_path = config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Environment variables override file keys when present
    fn with_env_keys(mut self) -> Self {
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            if !key.is_empty() {
                self.groq_api_key = key;
            }
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                self.gemini_api_key = key;
            }
        }
        self
    }

    /// A key counts as configured only when it looks like a real key
    pub fn has_groq(&self) -> bool {
        self.groq_api_key.len() > 20
    }

    pub fn has_gemini(&self) -> bool {
        self.gemini_api_key.len() > 20
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("magno")
        .join("config.json")
}
