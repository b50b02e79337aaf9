use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding `tts_api_key`
pub const TTS_API_KEY_ENV: &str = "LINGOCHAMP_TTS_API_KEY";
/// Environment variable overriding `gemini_api_key`
pub const GEMINI_API_KEY_ENV: &str = "LINGOCHAMP_GEMINI_API_KEY";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Speech output
    pub language: String,
    pub tts_endpoint: String,
    pub tts_api_key: String,
    pub premium_voice: String,
    pub speaking_rate: f32,
    pub fallback_rate: f32,
    pub audio_enabled: bool,

    // Hints
    pub gemini_endpoint: String,
    pub gemini_api_key: String,

    // Speech input
    pub recognizer: String,
    pub wyoming_host: String,
    pub wyoming_port: u16,
    pub listen_seconds: u64,
    pub input_device: Option<usize>,

    // Meta
    pub data_dir: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            tts_endpoint: "https://texttospeech.googleapis.com/v1/text:synthesize".to_string(),
            tts_api_key: String::new(),
            premium_voice: "en-US-Neural2-F".to_string(),
            speaking_rate: 0.9,
            fallback_rate: 0.8,
            audio_enabled: true,
            gemini_endpoint:
                "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
                    .to_string(),
            gemini_api_key: String::new(),
            recognizer: "console".to_string(),
            wyoming_host: "localhost".to_string(),
            wyoming_port: 10300,
            listen_seconds: 4,
            input_device: None,
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("lingochamp")
                .to_string_lossy()
                .to_string(),
            log_level: "INFO".to_string(),
        }
    }
}

impl Config {
    /// Load config from file (or defaults), then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&config_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load config from a specific path, falling back to defaults
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                let backup_path = path.with_extension("json.corrupt");
                let _ = std::fs::rename(path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Override API keys from the environment. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(TTS_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.tts_api_key = key;
        }
        if let Some(key) = lookup(GEMINI_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.gemini_api_key = key;
        }
    }

    /// Directory holding persisted state (test history)
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lingochamp")
        .join("config.json")
}
