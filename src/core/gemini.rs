//! Gemini Hint Generator
//!
//! Asks a generative-text model for one example sentence using a word.
//! Every failure path returns [`FALLBACK_SENTENCE`].

use crate::config::Config;
use crate::error::{LingoError, LingoResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Returned whenever no sentence could be generated
pub const FALLBACK_SENTENCE: &str =
    "Sorry, I couldn't come up with an example sentence right now. Please try again later.";

/// Source of example sentences
#[async_trait]
pub trait HintSource: Send + Sync {
    async fn example_sentence(&self, word: &str) -> String;
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Gemini `generateContent` client
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.gemini_endpoint.clone(),
            api_key: config.gemini_api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    fn build_prompt(word: &str) -> String {
        format!(
            "Write one short, natural English sentence for a language learner that uses the word \"{word}\". \
Reply with the sentence only."
        )
    }

    fn request_body(word: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "parts": [{ "text": Self::build_prompt(word) }]
            }],
            "generationConfig": {
                "temperature": 0.7,
                "topP": 0.8,
                "topK": 40,
                "maxOutputTokens": 150
            }
        })
    }

    /// The generated sentence, or an error describing why there is none
    pub async fn generate(&self, word: &str) -> LingoResult<String> {
        if !self.is_configured() {
            return Err(LingoError::Hint("no Gemini API key configured".to_string()));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(word))
            .timeout(Duration::from_secs(15))
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            warn!("❌ Gemini API Error ({}): {}", status, body_text);
            return Err(LingoError::Hint(format!("request failed with {}", status)));
        }

        debug!("🧠 Gemini raw body: {}", body_text);
        parse_sentence(&body_text)
    }
}

/// Trimmed text of the first candidate
fn parse_sentence(body: &str) -> LingoResult<String> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| LingoError::Hint("response had no candidates".to_string()))
}

#[async_trait]
impl HintSource for GeminiClient {
    async fn example_sentence(&self, word: &str) -> String {
        match self.generate(word).await {
            Ok(sentence) => sentence,
            Err(e) => {
                warn!("⚠️ No example sentence for '{}': {}", word, e);
                FALLBACK_SENTENCE.to_string()
            }
        }
    }
}
